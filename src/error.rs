use session_store::SessionManagerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    /// Caller input rejected before anything was recorded.
    #[error("invalid input to {operation}: {reason}")]
    InvalidInput {
        operation: &'static str,
        reason: &'static str,
    },

    /// Failure reported by the attached session manager, passed through as-is.
    #[error(transparent)]
    Manager(#[from] SessionManagerError),
}

impl TranscriptError {
    #[must_use]
    pub fn invalid_input(operation: &'static str, reason: &'static str) -> Self {
        Self::InvalidInput { operation, reason }
    }

    /// Returns the collaborator error when this failure originated there.
    #[must_use]
    pub fn as_manager_error(&self) -> Option<&SessionManagerError> {
        match self {
            Self::Manager(error) => Some(error),
            Self::InvalidInput { .. } => None,
        }
    }
}
