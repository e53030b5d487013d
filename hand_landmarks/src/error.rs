use thiserror::Error;

/// Reasons a detection line or landmark list is rejected.
///
/// None of these are fatal: callers skip the offending frame.
#[derive(Debug, Error)]
pub enum LandmarkError {
    #[error("malformed detection line: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected} landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("detector reported an error: {0}")]
    Detector(String),

    #[error("invalid frame timestamp {0}")]
    InvalidTimestamp(f64),
}
