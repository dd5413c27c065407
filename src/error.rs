use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Failed to connect to Chrome: {0}")]
    ConnectionFailed(String),

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Stale, detached or non-interactable element.
    #[error("Element interaction failed: {0}")]
    Interaction(String),

    #[error("Timed out after {waited:?} waiting for {what} (last observed: {last_observed})")]
    Timeout {
        what: String,
        waited: Duration,
        last_observed: String,
    },

    #[error("No content found: {0}")]
    NoContent(String),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No page available")]
    NoPage,

    #[error("CDP error: {0}")]
    CdpError(#[from] chromiumoxide::error::CdpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl E2eError {
    /// Errors a polling loop or a scan may absorb and retry past.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ElementNotFound(_) | Self::Interaction(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, E2eError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(E2eError::ElementNotFound("a".to_string()).is_transient());
        assert!(E2eError::Interaction("stale".to_string()).is_transient());
        assert!(!E2eError::Assertion("wrong url".to_string()).is_transient());
        assert!(!E2eError::NoPage.is_transient());
    }

    #[test]
    fn test_timeout_message_carries_last_observed() {
        let err = E2eError::Timeout {
            what: "for-you href".to_string(),
            waited: Duration::from_secs(10),
            last_observed: "/player/home/for-you".to_string(),
        };
        assert!(err.is_timeout());
        let msg = err.to_string();
        assert!(msg.contains("for-you href"));
        assert!(msg.contains("last observed: /player/home/for-you"));
    }
}
