//! Error types for the counter core

use serde::{Deserialize, Serialize};

/// Errors raised while building or scheduling a counter run.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CounterError {
    /// The label or attribute does not encode a usable number
    #[error("Unparsable counter target: {text:?}")]
    UnparsableTarget { text: String },

    /// A run endpoint is NaN or infinite
    #[error("Non-finite counter value: {value}")]
    NonFiniteValue { value: f64 },

    /// Runs need a positive duration
    #[error("Invalid duration: {duration_ms}ms")]
    InvalidDuration { duration_ms: u32 },

    /// A run already targets this sink
    #[error("Sink {sink} already has a run in flight")]
    SinkBusy { sink: String },

    /// The sink was never registered with the board
    #[error("Unknown sink: {sink}")]
    UnknownSink { sink: String },
}

impl CounterError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnparsableTarget { .. } => "parse",
            Self::NonFiniteValue { .. } | Self::InvalidDuration { .. } => "validation",
            Self::SinkBusy { .. } | Self::UnknownSink { .. } => "sink",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let err = CounterError::UnparsableTarget {
            text: "n/a".into(),
        };
        assert_eq!(err.category(), "parse");
        assert_eq!(
            CounterError::InvalidDuration { duration_ms: 0 }.category(),
            "validation"
        );
        assert_eq!(
            CounterError::SinkBusy { sink: "s".into() }.category(),
            "sink"
        );
    }

    #[test]
    fn display_names_the_offending_text() {
        let err = CounterError::UnparsableTarget {
            text: "soon".into(),
        };
        assert_eq!(err.to_string(), "Unparsable counter target: \"soon\"");
    }

    #[test]
    fn serialization() {
        let err = CounterError::SinkBusy {
            sink: "stat-0".into(),
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: CounterError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
