use thiserror::Error;

use crate::AreaKey;
use crate::calculations::CostEstimateError;
use crate::db::RepositoryError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    InvalidInput(#[from] CostEstimateError),

    /// The store rejected a load or save. Form state is untouched.
    #[error("failed to persist inspection: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("inspection is still loading")]
    LoadInProgress,

    #[error("inspection is already loaded")]
    AlreadyLoaded,

    #[error("no area with key {}", .0.0)]
    UnknownArea(AreaKey),
}

impl SessionError {
    /// Whether repeating the same call may succeed without changing input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::LoadInProgress)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn persistence_errors_are_retryable() {
        let err = SessionError::from(RepositoryError::Connection("timeout".to_string()));

        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "failed to persist inspection: Connection error: timeout");
    }

    #[test]
    fn invalid_input_is_not_retryable() {
        let err = SessionError::from(CostEstimateError::InvalidInput {
            field: "subfloor_hours",
            value: dec!(-1),
        });

        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "invalid subfloor_hours: -1 (must be non-negative)");
    }

    #[test]
    fn hours_over_limit_names_the_limit() {
        let err = SessionError::from(CostEstimateError::HoursOverLimit {
            field: "non_demo_hours",
            value: dec!(2500),
            max: dec!(2000),
        });

        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "invalid non_demo_hours: 2500 (must be at most 2000)");
    }

    #[test]
    fn second_load_is_not_retryable() {
        assert!(!SessionError::AlreadyLoaded.is_retryable());
    }
}
