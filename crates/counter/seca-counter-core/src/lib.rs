//! SECA Counter Core (host-agnostic)
//!
//! Animated numeric counters for the SECA site: stat labels ("85%", "7km",
//! "24/7") count up with a cubic ease-out, `data-count` magnitudes with an
//! exponential ease-out. The core never touches a page. Hosts feed it frame
//! timestamps and visibility reports and apply the text writes it returns.

pub mod board;
pub mod config;
pub mod easing;
pub mod engine;
pub mod error;
pub mod format;
pub mod ids;
pub mod label;
pub mod outputs;
pub mod run;

// Re-exports for consumers (adapters)
pub use board::{CounterBoard, SinkSource, VisibilityTrigger};
pub use config::Config;
pub use easing::{ease_out_cubic, ease_out_expo, Easing};
pub use engine::CounterEngine;
pub use error::CounterError;
pub use format::Format;
pub use ids::RunId;
pub use label::{parse_count, parse_label, CounterLabel};
pub use outputs::{Change, CounterEvent, DisplaySurface, Outputs};
pub use run::{CounterRun, Frame, RunKind};

/// Counter core result type
pub type Result<T> = core::result::Result<T, CounterError>;
