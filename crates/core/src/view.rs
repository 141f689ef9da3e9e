use crate::state::SessionState;
use serde::Serialize;

/// What the page renders for the current session.
///
/// Derived from the state on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub status: SessionState,
    pub status_label: String,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub start_label: &'static str,
    pub agent_status: &'static str,
}

impl SessionView {
    pub fn new(state: SessionState, agent_configured: bool) -> Self {
        Self {
            status: state,
            status_label: state.display_label(),
            start_enabled: state.can_start(),
            stop_enabled: state.can_stop(),
            start_label: match state {
                SessionState::Connecting => "Initializing...",
                _ => "Start Interview",
            },
            agent_status: if agent_configured {
                "Configured"
            } else {
                "Not Found"
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connecting_view() {
        let view = SessionView::new(SessionState::Connecting, true);
        assert!(!view.start_enabled);
        assert!(!view.stop_enabled);
        assert_eq!(view.start_label, "Initializing...");
        assert_eq!(view.status_label, "CONNECTING");
    }

    #[test]
    fn test_listening_view() {
        let view = SessionView::new(SessionState::Listening, true);
        assert!(!view.start_enabled);
        assert!(view.stop_enabled);
        assert_eq!(view.start_label, "Start Interview");
    }

    #[test]
    fn test_view_serialization() {
        let view = SessionView::new(SessionState::Idle, false);
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "status": "idle",
                "status_label": "IDLE",
                "start_enabled": true,
                "stop_enabled": false,
                "start_label": "Start Interview",
                "agent_status": "Not Found",
            })
        );
    }
}
