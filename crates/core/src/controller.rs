//! Session Controller
//!
//! Owns the voice client handle for the lifetime of one mounted page and is
//! the only place the session state changes. User requests are applied
//! immediately; client notifications and the outcome of the start call are
//! queued and applied one at a time, in delivery order, via
//! [`SessionController::next_event`] and [`SessionController::handle_event`].

use crate::{
    client::{ClientEvents, VoiceSessionClient},
    config::SessionConfig,
    error::SessionError,
    state::{SessionEvent, SessionState},
    view::SessionView,
};
use secrecy::SecretString;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, warn};

pub struct SessionController<C: VoiceSessionClient> {
    config: SessionConfig,
    client: Option<Arc<C>>,
    state: SessionState,
    events: ClientEvents,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    torn_down: bool,
}

impl<C: VoiceSessionClient> SessionController<C> {
    /// Mounts a controller in the `Idle` state.
    ///
    /// The client is built with `connect` only when a public key is
    /// configured, and is subscribed to this controller's event queue. A
    /// client that fails to build is logged and left absent; later start
    /// requests then fail back to `Idle`.
    pub fn mount<F>(config: SessionConfig, connect: F) -> Self
    where
        F: FnOnce(&SecretString) -> anyhow::Result<C>,
    {
        let (events, events_rx) = ClientEvents::channel();

        let client = match config.public_key() {
            Some(key) => match connect(key) {
                Ok(client) => {
                    client.subscribe(events.clone());
                    info!("Voice session client created.");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    error!(error = ?e, "Failed to create voice session client.");
                    None
                }
            },
            None => {
                warn!("No public key configured; voice session client not created.");
                None
            }
        };

        Self {
            config,
            client,
            state: SessionState::Idle,
            events,
            events_rx,
            torn_down: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn has_client(&self) -> bool {
        self.client.is_some()
    }

    pub fn view(&self) -> SessionView {
        SessionView::new(self.state, self.config.agent_configured())
    }

    /// Starts a conversation with the configured agent.
    ///
    /// With incomplete configuration nothing is attempted and the state stays
    /// put. Otherwise the state moves to `Connecting` and the client's start
    /// runs in the background; if it fails, a `StartFailed` event is queued.
    pub fn start_conversation(&mut self) -> Result<(), SessionError> {
        let agent_id = match self.config.require() {
            Ok(agent_id) => agent_id.to_owned(),
            Err(e) => {
                warn!(error = %e, "Refusing to start: configuration incomplete.");
                return Err(e);
            }
        };
        if self.state.is_active() {
            debug!(state = %self.state, "Ignoring start request: session already active.");
            return Err(SessionError::AlreadyActive(self.state));
        }

        self.apply(&SessionEvent::StartRequested);

        match &self.client {
            Some(client) => {
                let client = Arc::clone(client);
                let events = self.events.clone();
                tokio::spawn(
                    async move {
                        if let Err(e) = client.start(&agent_id).await {
                            error!(error = ?e, %agent_id, "Failed to start voice call.");
                            events.start_failed(format!("{e:#}"));
                        }
                    }
                    .in_current_span(),
                );
            }
            None => {
                error!("Cannot start voice call: no voice session client.");
                self.events.start_failed("voice session client unavailable");
            }
        }
        Ok(())
    }

    /// Asks the client to end the call.
    ///
    /// Safe in any state. While `Listening` this also moves to `Stopped`
    /// without waiting for the client's call-ended notification.
    pub fn stop_conversation(&mut self) {
        match &self.client {
            Some(client) => client.stop(),
            None => debug!("Stop requested without a voice session client."),
        }
        self.apply(&SessionEvent::StopRequested);
    }

    /// Waits for the next queued event.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Applies a queued event. Returns whether the state changed.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match &event {
            SessionEvent::CallStarted => info!("Call started."),
            SessionEvent::CallEnded => info!("Call ended."),
            SessionEvent::Error(message) => error!(%message, "Voice client error."),
            SessionEvent::StartFailed(message) => error!(%message, "Voice call failed to start."),
            SessionEvent::StartRequested | SessionEvent::StopRequested => {}
        }
        self.apply(&event)
    }

    /// Stops the client and consumes the controller.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn apply(&mut self, event: &SessionEvent) -> bool {
        let next = self.state.next(event);
        if next == self.state {
            debug!(state = %self.state, ?event, "Event left session state unchanged.");
            return false;
        }
        info!(from = %self.state, to = %next, "Session state changed.");
        self.state = next;
        true
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Some(client) = &self.client {
            info!(state = %self.state, "Unmounting: stopping voice session client.");
            client.stop();
        }
    }
}

impl<C: VoiceSessionClient> Drop for SessionController<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
