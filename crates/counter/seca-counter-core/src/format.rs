//! Rendering of interpolated values into display text.
//!
//! Rounding follows the browser (`Math.round`, `Number#toFixed`) rather than
//! Rust's defaults: halves round toward positive infinity and `-0` never shows.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Format {
    /// Whole number followed by a unit suffix ("85%", "7km", "120").
    Whole { suffix: String },
    /// Whole number when `whole`, otherwise one fixed decimal ("45.7").
    Magnitude { whole: bool },
}

impl Format {
    pub fn whole(suffix: impl Into<String>) -> Self {
        Format::Whole {
            suffix: suffix.into(),
        }
    }

    /// Magnitude format for `target`; targets at or above `whole_threshold`
    /// drop the decimal.
    pub fn magnitude(target: f64, whole_threshold: f64) -> Self {
        Format::Magnitude {
            whole: target >= whole_threshold,
        }
    }

    pub fn render(&self, value: f64) -> String {
        match self {
            Format::Whole { suffix } => format!("{}{}", whole_text(value), suffix),
            Format::Magnitude { whole: true } => whole_text(value),
            Format::Magnitude { whole: false } => to_fixed_1(value),
        }
    }
}

/// Round half toward positive infinity.
#[inline]
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    };
    // normalise -0
    rounded + 0.0
}

fn whole_text(value: f64) -> String {
    format!("{}", round_half_up(value))
}

/// One-decimal fixed-point text, never scientific.
///
/// Rounds the exact binary value, so 0.35 (stored just below the half) gives
/// "0.3". Exact ties such as 0.25 go to the larger magnitude and the sign is
/// reapplied afterwards, as `toFixed` does.
pub fn to_fixed_1(value: f64) -> String {
    let abs = value.abs();
    let scaled = abs * 10.0;
    // abs * 10 is an exact tie only when abs is a multiple of 1/4.
    let exact_tie = (abs * 4.0).fract() == 0.0 && scaled.fract() == 0.5;
    let digits = if exact_tie {
        let tenths = scaled.floor() + 1.0;
        let int_part = (tenths / 10.0).trunc();
        format!("{}.{}", int_part, tenths - int_part * 10.0)
    } else {
        format!("{abs:.1}")
    };
    if value < 0.0 && digits != "0.0" {
        format!("-{digits}")
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_matches_the_browser() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(4.046875), 4.0);
        assert_eq!(round_half_up(-0.2).to_string(), "0");
    }

    #[test]
    fn whole_with_suffix() {
        assert_eq!(Format::whole("%").render(85.0), "85%");
        assert_eq!(Format::whole("km").render(4.046875), "4km");
        assert_eq!(Format::whole("").render(119.6), "120");
    }

    #[test]
    fn magnitude_policy() {
        assert_eq!(Format::magnitude(45.7, 100.0).render(45.7), "45.7");
        assert_eq!(Format::magnitude(230.0, 100.0).render(230.0), "230");
        assert_eq!(Format::magnitude(230.0, 100.0).render(114.4), "114");
        assert_eq!(Format::magnitude(45.7, 100.0).render(0.0), "0.0");
        assert_eq!(Format::magnitude(100.0, 100.0), Format::Magnitude { whole: true });
    }

    #[test]
    fn fixed_point_never_goes_scientific() {
        assert_eq!(to_fixed_1(0.04), "0.0");
        assert_eq!(to_fixed_1(0.05), "0.1");
        assert_eq!(to_fixed_1(12.0), "12.0");
        assert_eq!(to_fixed_1(-3.25), "-3.3");
        assert_eq!(to_fixed_1(-0.01), "0.0");
        assert_eq!(to_fixed_1(1.0e-7), "0.0");
    }

    #[test]
    fn fixed_point_rounds_the_stored_value() {
        assert_eq!(to_fixed_1(0.35), "0.3");
        assert_eq!(to_fixed_1(1.45), "1.4");
        assert_eq!(to_fixed_1(0.25), "0.3");
        assert_eq!(to_fixed_1(8.05), "8.1");
        assert_eq!(to_fixed_1(-0.25), "-0.3");
        assert_eq!(to_fixed_1(2.75), "2.8");
        assert_eq!(to_fixed_1(45.7), "45.7");
    }
}
