use thiserror::Error;

pub type MatchResult<T> = Result<T, MatchError>;

/// Errors surfaced by the matching engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// Rejected input or configuration. Never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A single profile could not be turned into a feature vector.
    /// The ranking engine records these as diagnostics instead of failing.
    #[error("Feature extraction failed for '{user_id}': {reason}")]
    FeatureExtraction { user_id: String, reason: String },

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Ranking request was cancelled")]
    Cancelled,

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl MatchError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        MatchError::InvalidArgument(message.into())
    }

    /// Whether a caller should treat this as a client error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MatchError::InvalidArgument(_) | MatchError::ProfileNotFound(_)
        )
    }
}
