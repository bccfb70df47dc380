//! Core configuration for seca-counter-core.

use serde::{Deserialize, Serialize};

/// Timing and formatting constants shared by every counter on a page.
///
/// Durations are part of the visible behaviour; keep the defaults unless the
/// page design changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Duration of percentage, distance and plain stat counters.
    pub stat_duration_ms: u32,
    /// Duration of `data-count` magnitude counters.
    pub magnitude_duration_ms: u32,
    /// How long a ratio label shows its placeholder before snapping.
    pub ratio_hold_ms: u32,
    pub ratio_placeholder: String,
    /// Unit annotation recognised on distance stats.
    pub distance_unit: String,
    /// Fraction of a sink that must be visible before it activates.
    pub visibility_threshold: f32,
    /// Magnitude targets at or above this render as whole numbers.
    pub magnitude_whole_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stat_duration_ms: 2000,
            magnitude_duration_ms: 3000,
            ratio_hold_ms: 1000,
            ratio_placeholder: "0/0".to_string(),
            distance_unit: "km".to_string(),
            visibility_threshold: 0.5,
            magnitude_whole_threshold: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "distance_unit": "mi" }"#).unwrap();
        assert_eq!(cfg.distance_unit, "mi");
        assert_eq!(cfg.stat_duration_ms, 2000);
        assert_eq!(cfg.magnitude_duration_ms, 3000);
        assert_eq!(cfg.ratio_placeholder, "0/0");
    }
}
