//! Board: the page-level caller that pairs sinks with a visibility trigger.
//!
//! Every registered sink is observed once. Its first activation starts the
//! run and unobserves it, so a sink is animated at most once per page load no
//! matter how often the host reports it visible.

use hashbrown::HashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::CounterEngine;
use crate::ids::RunId;
use crate::outputs::Outputs;

/// Host visibility observer (an IntersectionObserver in a browser).
pub trait VisibilityTrigger {
    /// Report `sink` once at least `threshold` of it is visible.
    fn observe(&mut self, sink: &str, threshold: f32);
    fn unobserve(&mut self, sink: &str);
}

/// Where a sink's target comes from, read once at registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SinkSource {
    /// Initial label text ("85%", "7km", "24/7").
    Stat { label: String },
    /// Raw `data-count` attribute.
    Magnitude { count: String },
}

#[derive(Debug)]
struct Registered {
    source: SinkSource,
    activated: bool,
}

#[derive(Debug)]
pub struct CounterBoard {
    engine: CounterEngine,
    sinks: HashMap<String, Registered>,
    // registration order, for deterministic observe calls
    order: Vec<String>,
}

impl CounterBoard {
    pub fn new(cfg: Config) -> Self {
        Self {
            engine: CounterEngine::new(cfg),
            sinks: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn register_stat(&mut self, sink: &str, label: &str) -> bool {
        self.register(
            sink,
            SinkSource::Stat {
                label: label.to_string(),
            },
        )
    }

    pub fn register_magnitude(&mut self, sink: &str, count: &str) -> bool {
        self.register(
            sink,
            SinkSource::Magnitude {
                count: count.to_string(),
            },
        )
    }

    /// Returns false when `sink` was already registered; the first source wins.
    pub fn register(&mut self, sink: &str, source: SinkSource) -> bool {
        if self.sinks.contains_key(sink) {
            debug!("counter sink {sink} registered twice; keeping the first source");
            return false;
        }
        self.sinks.insert(
            sink.to_string(),
            Registered {
                source,
                activated: false,
            },
        );
        self.order.push(sink.to_string());
        true
    }

    /// Observe every registered sink that has not activated yet.
    pub fn attach<T: VisibilityTrigger + ?Sized>(&mut self, trigger: &mut T) {
        let threshold = self.engine.config().visibility_threshold;
        for sink in &self.order {
            if self.sinks.get(sink).is_some_and(|r| !r.activated) {
                trigger.observe(sink, threshold);
            }
        }
    }

    /// Visibility callback. Only the first report for a sink starts a run;
    /// repeats and unknown sinks are ignored.
    pub fn on_visible<T: VisibilityTrigger + ?Sized>(
        &mut self,
        sink: &str,
        trigger: &mut T,
    ) -> Option<RunId> {
        let Some(entry) = self.sinks.get_mut(sink) else {
            debug!("visibility report for unknown counter sink {sink}");
            return None;
        };
        if entry.activated {
            return None;
        }
        entry.activated = true;
        trigger.unobserve(sink);
        match &entry.source {
            SinkSource::Stat { label } => self.engine.start_stat(sink, label),
            SinkSource::Magnitude { count } => self.engine.start_magnitude(sink, count),
        }
    }

    pub fn update(&mut self, now_ms: f64) -> &Outputs {
        self.engine.update(now_ms)
    }

    pub fn is_idle(&self) -> bool {
        self.engine.is_idle()
    }

    pub fn is_activated(&self, sink: &str) -> bool {
        self.sinks.get(sink).is_some_and(|r| r.activated)
    }

    pub fn sinks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn engine(&self) -> &CounterEngine {
        &self.engine
    }
}

impl Default for CounterBoard {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
