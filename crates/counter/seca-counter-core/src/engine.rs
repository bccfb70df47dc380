//! Engine: owns every in-flight counter run and advances them per frame.
//!
//! Methods:
//! - new, start, start_stat, start_magnitude, update (tick every run → Outputs)

use log::{debug, trace, warn};

use crate::config::Config;
use crate::easing::Easing;
use crate::error::CounterError;
use crate::format::Format;
use crate::ids::{IdAllocator, RunId};
use crate::label::{parse_count, parse_label, CounterLabel};
use crate::outputs::{Change, CounterEvent, Outputs};
use crate::run::CounterRun;
use crate::Result;

#[derive(Debug)]
struct ActiveRun {
    id: RunId,
    sink: String,
    run: CounterRun,
}

/// Host-agnostic counter engine. The host calls `update` once per frame with
/// its high-resolution timestamp and applies the returned changes.
#[derive(Debug)]
pub struct CounterEngine {
    cfg: Config,
    ids: IdAllocator,
    runs: Vec<ActiveRun>,
    // Events raised between ticks, flushed with the next update.
    pending: Vec<CounterEvent>,
    outputs: Outputs,
}

impl CounterEngine {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            runs: Vec::new(),
            pending: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Start `run` against `sink`. At most one run may target a sink.
    pub fn start(&mut self, sink: &str, run: CounterRun) -> Result<RunId> {
        if self.runs.iter().any(|active| active.sink == sink) {
            warn!("counter sink {sink} already animating; start rejected");
            return Err(CounterError::SinkBusy {
                sink: sink.to_string(),
            });
        }
        let id = self.ids.alloc_run();
        debug!(
            "counter run {:?} started on {sink} ({}ms, ends at {:?})",
            id,
            run.duration_ms(),
            run.final_text()
        );
        self.pending.push(CounterEvent::Started {
            sink: sink.to_string(),
            run: id,
        });
        self.runs.push(ActiveRun {
            id,
            sink: sink.to_string(),
            run,
        });
        Ok(id)
    }

    /// Start a stat counter from the sink's label text. Unusable labels leave
    /// the sink untouched.
    pub fn start_stat(&mut self, sink: &str, label: &str) -> Option<RunId> {
        let built =
            parse_label(label, &self.cfg.distance_unit).and_then(|l| self.stat_run(&l));
        self.start_or_skip(sink, built)
    }

    /// Start a magnitude counter from the sink's `data-count` attribute.
    pub fn start_magnitude(&mut self, sink: &str, count: &str) -> Option<RunId> {
        let built = parse_count(count).and_then(|target| {
            CounterRun::eased(
                0.0,
                target,
                self.cfg.magnitude_duration_ms,
                Easing::ExpoOut,
                Format::magnitude(target, self.cfg.magnitude_whole_threshold),
            )
        });
        self.start_or_skip(sink, built)
    }

    fn stat_run(&self, label: &CounterLabel) -> Result<CounterRun> {
        let unit = &self.cfg.distance_unit;
        match label.target() {
            Some(target) => CounterRun::eased(
                0.0,
                target as f64,
                self.cfg.stat_duration_ms,
                Easing::CubicOut,
                Format::whole(label.suffix(unit)),
            ),
            None => CounterRun::hold(
                self.cfg.ratio_placeholder.clone(),
                label.literal(unit),
                self.cfg.ratio_hold_ms,
            ),
        }
    }

    fn start_or_skip(&mut self, sink: &str, built: Result<CounterRun>) -> Option<RunId> {
        let err = match built.and_then(|run| self.start(sink, run)) {
            Ok(id) => return Some(id),
            Err(err) => err,
        };
        // A busy sink is mid-animation, not static; start() already warned.
        if matches!(err, CounterError::SinkBusy { .. }) {
            return None;
        }
        debug!("counter sink {sink} skipped ({}): {err}", err.category());
        self.pending.push(CounterEvent::Skipped {
            sink: sink.to_string(),
            reason: err.to_string(),
        });
        None
    }

    /// Advance every run to `now_ms`. Finished runs are dropped after their
    /// terminal write.
    pub fn update(&mut self, now_ms: f64) -> &Outputs {
        self.outputs.clear();
        self.outputs.events.append(&mut self.pending);

        for active in self.runs.iter_mut() {
            let Some(frame) = active.run.tick(now_ms) else {
                continue;
            };
            trace!(
                "counter {:?} on {} progress={:.3} text={}",
                active.id,
                active.sink,
                frame.progress,
                frame.text
            );
            if frame.terminal {
                debug!("counter run {:?} finished on {}", active.id, active.sink);
                self.outputs.events.push(CounterEvent::Finished {
                    sink: active.sink.clone(),
                    run: active.id,
                    text: frame.text.clone(),
                });
            }
            self.outputs.changes.push(Change {
                sink: active.sink.clone(),
                run: active.id,
                text: frame.text,
            });
        }

        self.runs.retain(|active| !active.run.is_finished());
        &self.outputs
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// No run needs another frame.
    pub fn is_idle(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn active_runs(&self) -> usize {
        self.runs.len()
    }

    pub fn is_animating(&self, sink: &str) -> bool {
        self.runs.iter().any(|active| active.sink == sink)
    }
}

impl Default for CounterEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(out: &Outputs) -> Vec<&str> {
        out.changes.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn started_event_is_flushed_with_first_update() {
        let mut eng = CounterEngine::default();
        let id = eng.start_stat("s", "85%").unwrap();
        let out = eng.update(0.0);
        assert_eq!(
            out.events,
            vec![CounterEvent::Started {
                sink: "s".into(),
                run: id
            }]
        );
        assert_eq!(texts(out), vec!["0%"]);
    }

    #[test]
    fn busy_sink_is_rejected() {
        let mut eng = CounterEngine::default();
        eng.start_stat("s", "85%").unwrap();
        assert_eq!(eng.start_stat("s", "85%"), None);
        assert_eq!(eng.active_runs(), 1);
        let run = CounterRun::hold("0/0", "24/7", 1000).unwrap();
        assert_eq!(
            eng.start("s", run).unwrap_err(),
            CounterError::SinkBusy { sink: "s".into() }
        );
        let out = eng.update(0.0);
        assert!(!out
            .events
            .iter()
            .any(|e| matches!(e, CounterEvent::Skipped { .. })));
        assert_eq!(out.changes.len(), 1);
    }

    #[test]
    fn unparsable_label_is_skipped_quietly() {
        let mut eng = CounterEngine::default();
        assert_eq!(eng.start_stat("s", "Always on"), None);
        assert!(eng.is_idle());
        let out = eng.update(0.0);
        assert!(out.changes.is_empty());
        assert!(matches!(
            out.events.as_slice(),
            [CounterEvent::Skipped { sink, .. }] if sink == "s"
        ));
    }

    #[test]
    fn runs_are_dropped_after_terminal_write() {
        let mut eng = CounterEngine::default();
        eng.start_magnitude("m", "45.7").unwrap();
        eng.update(0.0);
        assert!(!eng.is_idle());
        let out = eng.update(3_000.0);
        assert_eq!(texts(out), vec!["45.7"]);
        assert!(eng.is_idle());
        assert!(eng.update(3_100.0).is_empty());
    }

    #[test]
    fn sink_is_free_again_after_finish() {
        let mut eng = CounterEngine::default();
        eng.start_stat("s", "24/7").unwrap();
        eng.update(0.0);
        eng.update(1_000.0);
        assert!(!eng.is_animating("s"));
        assert!(eng.start_stat("s", "24/7").is_some());
    }
}
