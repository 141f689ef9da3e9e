use crate::state::SessionState;

/// Errors a session controller returns to its caller.
///
/// Failures of the call itself never show up here; they arrive as events and
/// reset the session to `idle`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// One or both required configuration values are absent. Nothing was
    /// sent to the voice service.
    #[error(
        "{} missing. Check your environment and restart the server.",
        .missing.join(" and ")
    )]
    MissingConfiguration { missing: Vec<&'static str> },
    /// A start was requested while a call is being set up or is live.
    #[error("A session is already {0}.")]
    AlreadyActive(SessionState),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configuration_display() {
        let err = SessionError::MissingConfiguration {
            missing: vec!["API Key", "Assistant ID"],
        };
        assert_eq!(
            err.to_string(),
            "API Key and Assistant ID missing. Check your environment and restart the server."
        );
    }

    #[test]
    fn test_already_active_display() {
        let err = SessionError::AlreadyActive(SessionState::Listening);
        assert_eq!(err.to_string(), "A session is already listening.");
    }
}
