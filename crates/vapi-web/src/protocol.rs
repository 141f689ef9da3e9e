//! Wire types for call creation and the call channel's control messages.

use serde::{Deserialize, Serialize};

/// Transport provider that hands back a WebSocket call channel.
pub const WEBSOCKET_TRANSPORT: &str = "vapi.websocket";

/// Body of `POST {api_base}/call`.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateCallRequest<'a> {
    pub assistant_id: &'a str,
    pub transport: TransportRequest,
}

#[derive(Serialize, Debug)]
pub struct TransportRequest {
    pub provider: &'static str,
}

impl<'a> CreateCallRequest<'a> {
    pub fn websocket(assistant_id: &'a str) -> Self {
        Self {
            assistant_id,
            transport: TransportRequest {
                provider: WEBSOCKET_TRANSPORT,
            },
        }
    }
}

/// The parts of the created call this client reads.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CallResponse {
    pub id: String,
    #[serde(default)]
    pub transport: Option<CallTransport>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CallTransport {
    #[serde(default)]
    pub websocket_call_url: Option<String>,
}

impl CallResponse {
    pub fn call_url(&self) -> Option<&str> {
        self.transport
            .as_ref()
            .and_then(|t| t.websocket_call_url.as_deref())
    }
}

/// Control messages sent on the call channel.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlMessage {
    EndCall,
}

/// Text messages received on the call channel. Only errors matter here.
#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChannelEvent {
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// Extracts the error message from a channel text frame, if it carries one.
pub fn error_message(text: &str) -> Option<String> {
    match serde_json::from_str::<ChannelEvent>(text) {
        Ok(ChannelEvent::Error { message }) => {
            Some(message.unwrap_or_else(|| "unspecified call error".to_string()))
        }
        _ => None,
    }
}
