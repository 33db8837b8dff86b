//! Error taxonomy for the inference pipeline

use thiserror::Error;

/// Errors surfaced by loading, normalization and prediction.
///
/// `Clone` because a single load outcome is handed to every caller that
/// was waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// The caller passed a feature vector of the wrong length.
    #[error("invalid input shape: expected {expected} features, got {actual}")]
    InputShape { expected: usize, actual: usize },

    /// The model artifact could not be read or parsed.
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// No session was available after a load attempt completed.
    #[error("inference session unavailable")]
    SessionUnavailable,

    /// The backend rejected the input or failed during the forward pass.
    #[error("inference failed: {0}")]
    InferenceExecution(String),

    /// A load or a forward pass did not finish within its configured limit.
    #[error("{stage} timed out after {after_ms}ms")]
    Timeout { stage: &'static str, after_ms: u64 },

    /// Custom normalization statistics were malformed.
    #[error("invalid normalization statistics: {0}")]
    InvalidStatistics(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_shape_message_names_both_lengths() {
        let err = InferenceError::InputShape {
            expected: 32,
            actual: 31,
        };
        let msg = err.to_string();
        assert!(msg.contains("32"));
        assert!(msg.contains("31"));
    }

    #[test]
    fn test_timeout_message() {
        let err = InferenceError::Timeout {
            stage: "load",
            after_ms: 250,
        };
        assert_eq!(err.to_string(), "load timed out after 250ms");
    }
}
