//! Counter label parsing.
//!
//! Stat sinks carry their target in their initial text ("85%", "7km", "24/7");
//! magnitude sinks carry it in a `data-count` attribute. Parsing happens once,
//! before a run starts, and mirrors the browser's `parseInt`/`parseFloat`
//! prefix rules so page markup behaves the same as it always has.

use serde::{Deserialize, Serialize};

use crate::error::CounterError;
use crate::Result;

/// Typed reading of a stat label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CounterLabel {
    Percent(i64),
    Distance(i64),
    /// Left and right side of a ratio such as "24/7". Never interpolated.
    Ratio(String, String),
    Plain(i64),
}

impl CounterLabel {
    /// Text the sink shows once its run has finished.
    pub fn literal(&self, distance_unit: &str) -> String {
        match self {
            CounterLabel::Percent(n) => format!("{n}%"),
            CounterLabel::Distance(n) => format!("{n}{distance_unit}"),
            CounterLabel::Ratio(a, b) => format!("{a}/{b}"),
            CounterLabel::Plain(n) => n.to_string(),
        }
    }

    /// Numeric target for labels that animate; ratios have none.
    pub fn target(&self) -> Option<i64> {
        match self {
            CounterLabel::Percent(n) | CounterLabel::Distance(n) | CounterLabel::Plain(n) => {
                Some(*n)
            }
            CounterLabel::Ratio(..) => None,
        }
    }

    /// Suffix appended to every interpolated value.
    pub fn suffix<'a>(&self, distance_unit: &'a str) -> &'a str {
        match self {
            CounterLabel::Percent(_) => "%",
            CounterLabel::Distance(_) => distance_unit,
            _ => "",
        }
    }
}

fn unparsable(text: &str) -> CounterError {
    CounterError::UnparsableTarget {
        text: text.to_string(),
    }
}

/// Parse a stat label. `%` wins over the distance unit, which wins over `/`.
pub fn parse_label(text: &str, distance_unit: &str) -> Result<CounterLabel> {
    if text.contains('%') {
        return parse_int_prefix(text)
            .map(CounterLabel::Percent)
            .ok_or_else(|| unparsable(text));
    }
    if !distance_unit.is_empty() && text.contains(distance_unit) {
        return parse_int_prefix(text)
            .map(CounterLabel::Distance)
            .ok_or_else(|| unparsable(text));
    }
    if let Some((a, b)) = text.split_once('/') {
        return Ok(CounterLabel::Ratio(a.to_string(), b.to_string()));
    }
    // Unannotated labels animate only when they are a bare integer, so
    // decorated text ("500+", "Q3") is left alone.
    text.trim()
        .parse::<i64>()
        .map(CounterLabel::Plain)
        .map_err(|_| unparsable(text))
}

/// Parse the `data-count` attribute of a magnitude sink.
pub fn parse_count(attr: &str) -> Result<f64> {
    match parse_float_prefix(attr) {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(unparsable(attr)),
    }
}

/// Leading integer of `text`: optional whitespace, optional sign, digits.
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, digits) = split_sign(s);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Leading decimal number of `text`, with optional fraction and exponent.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        mantissa_digits += j - frac_start;
        if mantissa_digits > 0 {
            i = j;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    s[..i].parse().ok()
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_and_distance_take_leading_integer() {
        assert_eq!(parse_label("85%", "km").unwrap(), CounterLabel::Percent(85));
        assert_eq!(parse_label(" 98.6%", "km").unwrap(), CounterLabel::Percent(98));
        assert_eq!(parse_label("7km", "km").unwrap(), CounterLabel::Distance(7));
        assert_eq!(parse_label("12 km", "km").unwrap(), CounterLabel::Distance(12));
    }

    #[test]
    fn percent_takes_precedence_over_slash() {
        assert_eq!(parse_label("50%/yr", "km").unwrap(), CounterLabel::Percent(50));
    }

    #[test]
    fn ratio_keeps_both_sides() {
        let label = parse_label("24/7", "km").unwrap();
        assert_eq!(label, CounterLabel::Ratio("24".into(), "7".into()));
        assert_eq!(label.literal("km"), "24/7");
        assert_eq!(label.target(), None);
    }

    #[test]
    fn plain_requires_a_bare_integer() {
        assert_eq!(parse_label(" 120 ", "km").unwrap(), CounterLabel::Plain(120));
        assert!(parse_label("500+", "km").is_err());
        assert!(parse_label("Q3", "km").is_err());
    }

    #[test]
    fn annotated_label_without_digits_is_unparsable() {
        let err = parse_label("~%", "km").unwrap_err();
        assert_eq!(
            err,
            CounterError::UnparsableTarget {
                text: "~%".into()
            }
        );
    }

    #[test]
    fn custom_distance_unit() {
        assert_eq!(parse_label("3mi", "mi").unwrap(), CounterLabel::Distance(3));
        assert_eq!(CounterLabel::Distance(3).literal("mi"), "3mi");
        assert_eq!(CounterLabel::Distance(3).suffix("mi"), "mi");
    }

    #[test]
    fn count_attribute_prefix_rules() {
        assert_eq!(parse_count("45.7").unwrap(), 45.7);
        assert_eq!(parse_count("230 tonnes").unwrap(), 230.0);
        assert_eq!(parse_count(".5").unwrap(), 0.5);
        assert_eq!(parse_count("1e3").unwrap(), 1000.0);
        assert_eq!(parse_count("2e").unwrap(), 2.0);
        assert_eq!(parse_count("-3.25").unwrap(), -3.25);
        assert!(parse_count("").is_err());
        assert!(parse_count("abc").is_err());
        assert!(parse_count(".").is_err());
    }

    #[test]
    fn int_prefix_rules() {
        assert_eq!(parse_int_prefix("-42abc"), Some(-42));
        assert_eq!(parse_int_prefix("+7"), Some(7));
        assert_eq!(parse_int_prefix("x7"), None);
        assert_eq!(parse_int_prefix("-"), None);
    }
}
