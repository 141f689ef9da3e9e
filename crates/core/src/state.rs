use serde::{Deserialize, Serialize};
use std::fmt;

/// The connection status of the voice session shown on the page.
///
/// Exactly one value holds at a time. The only way to move between them is
/// [`SessionState::next`], driven by [`SessionEvent`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Listening,
    Stopped,
}

/// Everything that can move the session state.
///
/// User requests come from the page; the rest are delivered by the voice
/// client (or by the controller's own start task) through the controller's
/// event queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The user asked to start a conversation and configuration is complete.
    StartRequested,
    /// The user asked to end the conversation.
    StopRequested,
    /// The client reports the call is live.
    CallStarted,
    /// The client reports the call has ended.
    CallEnded,
    /// The client rejected the start request.
    StartFailed(String),
    /// The client reported an error at any point of the call lifecycle.
    Error(String),
}

impl SessionState {
    pub const ALL: [SessionState; 4] = [
        SessionState::Idle,
        SessionState::Connecting,
        SessionState::Listening,
        SessionState::Stopped,
    ];

    /// Applies an event and returns the resulting state.
    ///
    /// Pairs without a defined transition leave the state unchanged. Errors
    /// and start failures always win and reset to `Idle`.
    pub fn next(self, event: &SessionEvent) -> SessionState {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (_, E::Error(_)) | (_, E::StartFailed(_)) => S::Idle,
            (S::Idle | S::Stopped, E::StartRequested) => S::Connecting,
            (S::Connecting, E::CallStarted) => S::Listening,
            (S::Listening, E::CallEnded | E::StopRequested) => S::Stopped,
            (state, _) => state,
        }
    }

    /// Lowercase label, as carried on the wire.
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Listening => "listening",
            SessionState::Stopped => "stopped",
        }
    }

    /// Label for the status badge.
    pub fn display_label(self) -> String {
        self.label().to_uppercase()
    }

    /// A call is being set up or is live.
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Listening)
    }

    /// Whether the Start control is enabled.
    pub fn can_start(self) -> bool {
        !self.is_active()
    }

    /// Whether the End control is enabled.
    pub fn can_stop(self) -> bool {
        self == SessionState::Listening
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_events() -> Vec<SessionEvent> {
        vec![
            SessionEvent::StartRequested,
            SessionEvent::StopRequested,
            SessionEvent::CallStarted,
            SessionEvent::CallEnded,
            SessionEvent::StartFailed("rejected".into()),
            SessionEvent::Error("boom".into()),
        ]
    }

    #[test]
    fn test_initial_state_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn test_happy_path_transitions() {
        let state = SessionState::Idle
            .next(&SessionEvent::StartRequested)
            .next(&SessionEvent::CallStarted);
        assert_eq!(state, SessionState::Listening);

        let state = state.next(&SessionEvent::CallEnded);
        assert_eq!(state, SessionState::Stopped);
    }

    #[test]
    fn test_user_stop_while_listening() {
        assert_eq!(
            SessionState::Listening.next(&SessionEvent::StopRequested),
            SessionState::Stopped
        );
    }

    #[test]
    fn test_error_resets_every_state() {
        for state in SessionState::ALL {
            assert_eq!(
                state.next(&SessionEvent::Error("network".into())),
                SessionState::Idle,
                "error from {state}"
            );
            assert_eq!(
                state.next(&SessionEvent::StartFailed("auth".into())),
                SessionState::Idle,
                "start failure from {state}"
            );
        }
    }

    #[test]
    fn test_no_direct_connecting_to_stopped() {
        assert_eq!(
            SessionState::Connecting.next(&SessionEvent::CallEnded),
            SessionState::Connecting
        );
        assert_eq!(
            SessionState::Connecting.next(&SessionEvent::StopRequested),
            SessionState::Connecting
        );
    }

    #[test]
    fn test_stop_outside_listening_is_ignored() {
        for state in [
            SessionState::Idle,
            SessionState::Connecting,
            SessionState::Stopped,
        ] {
            assert_eq!(state.next(&SessionEvent::StopRequested), state);
        }
    }

    #[test]
    fn test_restart_after_stopped() {
        assert_eq!(
            SessionState::Stopped.next(&SessionEvent::StartRequested),
            SessionState::Connecting
        );
    }

    #[test]
    fn test_call_started_only_from_connecting() {
        for state in [SessionState::Idle, SessionState::Stopped] {
            assert_eq!(state.next(&SessionEvent::CallStarted), state);
        }
    }

    #[test]
    fn test_every_sequence_stays_in_the_four_states() {
        // Walk every sequence of three events from every starting state.
        let events = all_events();
        for start in SessionState::ALL {
            for a in &events {
                for b in &events {
                    for c in &events {
                        let end = start.next(a).next(b).next(c);
                        assert!(SessionState::ALL.contains(&end));
                    }
                }
            }
        }
    }

    #[test]
    fn test_button_enablement() {
        assert!(SessionState::Idle.can_start());
        assert!(SessionState::Stopped.can_start());
        assert!(!SessionState::Connecting.can_start());
        assert!(!SessionState::Listening.can_start());

        assert!(SessionState::Listening.can_stop());
        for state in [
            SessionState::Idle,
            SessionState::Connecting,
            SessionState::Stopped,
        ] {
            assert!(!state.can_stop(), "stop should be disabled in {state}");
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(SessionState::Connecting.to_string(), "connecting");
        assert_eq!(SessionState::Listening.display_label(), "LISTENING");
        assert_eq!(
            serde_json::to_string(&SessionState::Stopped).unwrap(),
            "\"stopped\""
        );
    }
}
