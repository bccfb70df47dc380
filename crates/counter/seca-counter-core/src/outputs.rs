//! Output contracts from the counter engine.
//!
//! Outputs carry the text writes for this tick, keyed by sink handle, and a
//! separate list of lifecycle events. Adapters apply the writes to the host.

use serde::{Deserialize, Serialize};

use crate::ids::RunId;

/// One text write for a sink this tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub sink: String,
    pub run: RunId,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CounterEvent {
    Started { sink: String, run: RunId },
    Finished { sink: String, run: RunId, text: String },
    /// The target could not be read, so the sink stays static; `reason` is
    /// the rendered error.
    Skipped { sink: String, reason: String },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    pub changes: Vec<Change>,
    pub events: Vec<CounterEvent>,
}

impl Outputs {
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Apply every change in order.
    pub fn apply<S: DisplaySurface + ?Sized>(&self, surface: &mut S) {
        for change in &self.changes {
            surface.write_text(&change.sink, &change.text);
        }
    }
}

/// Host surface that owns the sinks' writable text.
pub trait DisplaySurface {
    fn write_text(&mut self, sink: &str, text: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<(String, String)>);

    impl DisplaySurface for Recorder {
        fn write_text(&mut self, sink: &str, text: &str) {
            self.0.push((sink.to_string(), text.to_string()));
        }
    }

    #[test]
    fn apply_preserves_order() {
        let out = Outputs {
            changes: vec![
                Change {
                    sink: "a".into(),
                    run: RunId(0),
                    text: "1".into(),
                },
                Change {
                    sink: "b".into(),
                    run: RunId(1),
                    text: "2".into(),
                },
            ],
            events: vec![],
        };
        let mut rec = Recorder::default();
        out.apply(&mut rec);
        assert_eq!(
            rec.0,
            vec![("a".into(), "1".into()), ("b".into(), "2".into())]
        );
    }
}
