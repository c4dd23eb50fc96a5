//! Error types
//!
//! `VoidError` is what the controller surfaces to the page; each variant maps
//! to exactly one user-facing message. An empty void is not an error (see
//! `ListenOutcome::Silent`).

use crate::store::StoreError;

/// Content rejected before it reaches storage
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("thought is empty")]
    Empty,
    #[error("thought is {len} characters, limit is {max}")]
    TooLong { max: usize, len: usize },
    #[error("thought contains a disallowed word")]
    Disallowed,
}

/// Failures surfaced by the controller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoidError {
    #[error("invalid thought: {0}")]
    Validation(#[from] ValidationError),
    #[error("no identity yet")]
    NotSignedIn,
    #[error("posting too frequently")]
    RateLimited,
    #[error("a request is already in flight")]
    Busy,
    #[error("storage error: {0}")]
    TransientStorage(String),
    #[error("authentication failed: {0}")]
    AuthFailure(String),
}

impl From<StoreError> for VoidError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RateLimited => VoidError::RateLimited,
            other => VoidError::TransientStorage(other.to_string()),
        }
    }
}

impl VoidError {
    /// Text shown to the user
    pub fn user_message(&self) -> String {
        match self {
            VoidError::Validation(ValidationError::TooLong { max, .. }) => {
                format!("Your thought is too long for the void ({} characters at most).", max)
            }
            VoidError::Validation(_) => {
                "Your thought is empty or contains invalid words.".to_string()
            }
            VoidError::NotSignedIn => {
                "The void is not listening yet. Please wait a moment.".to_string()
            }
            VoidError::RateLimited => "You are posting too frequently. Please wait.".to_string(),
            VoidError::Busy => "The void is still busy. Please wait.".to_string(),
            VoidError::TransientStorage(_) => {
                "Your thought was lost in the ether. Please try again.".to_string()
            }
            VoidError::AuthFailure(_) => "Connection Lost".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_taxonomy() {
        assert_eq!(VoidError::from(StoreError::RateLimited), VoidError::RateLimited);
        assert!(matches!(
            VoidError::from(StoreError::Unavailable("offline".into())),
            VoidError::TransientStorage(msg) if msg.contains("offline")
        ));
    }

    #[test]
    fn test_validation_messages() {
        let empty = VoidError::from(ValidationError::Empty);
        assert_eq!(
            empty.user_message(),
            "Your thought is empty or contains invalid words."
        );
        let long = VoidError::from(ValidationError::TooLong { max: 1000, len: 1200 });
        assert!(long.user_message().contains("1000"));
    }
}
