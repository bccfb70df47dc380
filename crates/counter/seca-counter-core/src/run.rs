//! A single counter animation run.
//!
//! A run is created when its sink becomes visible and is advanced by frame
//! timestamps. The clock starts at the first tick, not at construction, so
//! scheduling latency before the first frame does not eat into the duration.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::CounterError;
use crate::format::Format;
use crate::Result;

/// What a run writes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RunKind {
    /// Eased interpolation from `from` to `to`, written on every tick.
    Eased {
        from: f64,
        to: f64,
        easing: Easing,
        format: Format,
    },
    /// Placeholder on the first tick, then the literal once the hold elapses.
    /// Nothing in between.
    Hold { placeholder: String, literal: String },
}

/// One write produced by a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub text: String,
    pub progress: f64,
    /// Last frame of the run; no further frames follow.
    pub terminal: bool,
}

#[derive(Clone, Debug)]
pub struct CounterRun {
    kind: RunKind,
    duration_ms: u32,
    started_at: Option<f64>,
    progress: f64,
    finished: bool,
}

impl CounterRun {
    pub fn eased(
        from: f64,
        to: f64,
        duration_ms: u32,
        easing: Easing,
        format: Format,
    ) -> Result<Self> {
        for value in [from, to] {
            if !value.is_finite() {
                return Err(CounterError::NonFiniteValue { value });
            }
        }
        Self::new(
            RunKind::Eased {
                from,
                to,
                easing,
                format,
            },
            duration_ms,
        )
    }

    pub fn hold(
        placeholder: impl Into<String>,
        literal: impl Into<String>,
        hold_ms: u32,
    ) -> Result<Self> {
        Self::new(
            RunKind::Hold {
                placeholder: placeholder.into(),
                literal: literal.into(),
            },
            hold_ms,
        )
    }

    fn new(kind: RunKind, duration_ms: u32) -> Result<Self> {
        if duration_ms == 0 {
            return Err(CounterError::InvalidDuration { duration_ms });
        }
        Ok(Self {
            kind,
            duration_ms,
            started_at: None,
            progress: 0.0,
            finished: false,
        })
    }

    pub fn kind(&self) -> &RunKind {
        &self.kind
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Text of the terminal frame.
    pub fn final_text(&self) -> String {
        match &self.kind {
            RunKind::Eased { to, format, .. } => format.render(*to),
            RunKind::Hold { literal, .. } => literal.clone(),
        }
    }

    /// Advance to `now_ms`. Returns the write for this tick, if any.
    pub fn tick(&mut self, now_ms: f64) -> Option<Frame> {
        if self.finished || !now_ms.is_finite() {
            return None;
        }
        let first_tick = self.started_at.is_none();
        let started_at = *self.started_at.get_or_insert(now_ms);
        let duration = f64::from(self.duration_ms);
        let elapsed = (now_ms - started_at).clamp(0.0, duration);
        // Progress never moves backwards, even if the host clock does.
        self.progress = self.progress.max(elapsed / duration).min(1.0);
        let terminal = self.progress >= 1.0;

        let text = match &self.kind {
            RunKind::Eased {
                from,
                to,
                easing,
                format,
            } => {
                let value = if terminal {
                    *to
                } else {
                    from + (to - from) * easing.apply(self.progress)
                };
                format.render(value)
            }
            RunKind::Hold {
                placeholder,
                literal,
            } => {
                if terminal {
                    literal.clone()
                } else if first_tick {
                    placeholder.clone()
                } else {
                    return None;
                }
            }
        };

        self.finished = terminal;
        Some(Frame {
            text,
            progress: self.progress,
            terminal,
        })
    }
}
