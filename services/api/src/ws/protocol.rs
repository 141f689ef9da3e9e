//! Defines the WebSocket message protocol between the page and the server.

use parley_core::SessionView;
use serde::{Deserialize, Serialize};

/// Messages sent from the page to the server.
#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The Start control was pressed.
    Start,
    /// The End control was pressed.
    Stop,
}

/// Messages sent from the server to the page.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full view to render. Sent on connect and after every change.
    Status {
        #[serde(flatten)]
        view: SessionView,
    },
    /// A blocking notice for the user, shown as a browser alert.
    Alert { message: String },
}

impl ServerMessage {
    pub fn status(view: SessionView) -> Self {
        Self::Status { view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::SessionState;
    use serde_json::json;

    #[test]
    fn test_client_message_parsing() {
        let start: ClientMessage = serde_json::from_str(r#"{"type":"start"}"#).unwrap();
        let stop: ClientMessage = serde_json::from_str(r#"{"type":"stop"}"#).unwrap();
        assert_eq!(start, ClientMessage::Start);
        assert_eq!(stop, ClientMessage::Stop);
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"dance"}"#).is_err());
    }

    #[test]
    fn test_status_message_is_flat() {
        let msg = ServerMessage::status(SessionView::new(SessionState::Listening, true));
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "status",
                "status": "listening",
                "status_label": "LISTENING",
                "start_enabled": false,
                "stop_enabled": true,
                "start_label": "Start Interview",
                "agent_status": "Configured",
            })
        );
    }

    #[test]
    fn test_alert_message() {
        let msg = ServerMessage::Alert {
            message: "missing".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({ "type": "alert", "message": "missing" })
        );
    }
}
