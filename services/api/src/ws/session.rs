//! Binds one page connection to one session controller.
//!
//! The socket opening mounts the controller; the socket closing unmounts it,
//! which stops the voice client whatever the session state.

use super::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use parley_core::{SessionController, SessionError, VoiceSessionClient};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use vapi_web::VapiWebClient;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual page connection.
#[instrument(name = "ws_session", skip_all, fields(connection_id = %Uuid::new_v4()))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    info!("Page connected. Mounting session controller...");

    let api_base = state.config.api_base.clone();
    let mut controller = SessionController::mount(state.config.session.clone(), |key| {
        Ok(VapiWebClient::new(key.clone(), &api_base)?)
    });

    let (mut socket_tx, socket_rx) = socket.split();
    run_session(&mut controller, &mut socket_tx, socket_rx).await;

    controller.unmount();
    info!("Page disconnected. Session controller unmounted.");
}

/// The event loop for a mounted controller.
///
/// Page messages and controller events are handled one at a time; the page is
/// sent a fresh status after each. The loop ends when the page closes the
/// connection or can no longer be written to.
async fn run_session<C, S, R>(
    controller: &mut SessionController<C>,
    socket_tx: &mut S,
    mut socket_rx: R,
) where
    C: VoiceSessionClient,
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    if !deliver(socket_tx, ServerMessage::status(controller.view())).await {
        return;
    }

    loop {
        tokio::select! {
            msg_result = socket_rx.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => {
                                for reply in handle_client_message(controller, msg) {
                                    if !deliver(socket_tx, reply).await {
                                        return;
                                    }
                                }
                            }
                            Err(e) => warn!(error = %e, "Ignoring malformed message from page."),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Page closed the connection.");
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("Error receiving from page WebSocket: {:?}", e);
                        return;
                    }
                }
            },
            Some(event) = controller.next_event() => {
                if controller.handle_event(event)
                    && !deliver(socket_tx, ServerMessage::status(controller.view())).await
                {
                    return;
                }
            },
        }
    }
}

/// Applies a page request to the controller and returns the replies to send.
///
/// Configuration errors become an alert; every request is answered with the
/// current status.
pub fn handle_client_message<C: VoiceSessionClient>(
    controller: &mut SessionController<C>,
    msg: ClientMessage,
) -> Vec<ServerMessage> {
    let mut replies = Vec::new();
    match msg {
        ClientMessage::Start => match controller.start_conversation() {
            Ok(()) => {}
            Err(e @ SessionError::MissingConfiguration { .. }) => {
                replies.push(ServerMessage::Alert {
                    message: e.to_string(),
                });
            }
            Err(e) => warn!(error = %e, "Start request ignored."),
        },
        ClientMessage::Stop => controller.stop_conversation(),
    }
    replies.push(ServerMessage::status(controller.view()));
    replies
}

/// Sends a message, returning `false` once the page is gone.
async fn deliver<S>(socket_tx: &mut S, msg: ServerMessage) -> bool
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    match send_msg(socket_tx, msg).await {
        Ok(()) => true,
        Err(e) => {
            info!(error = %e, "Page went away. Ending session.");
            false
        }
    }
}

/// A helper function to serialize and send a `ServerMessage` to the page.
pub(crate) async fn send_msg<S>(socket_tx: &mut S, msg: ServerMessage) -> Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
