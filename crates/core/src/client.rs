//! The seam between the session controller and the hosted voice service.
//!
//! The controller never talks to the service directly. It drives a
//! [`VoiceSessionClient`] and learns about the call through the three
//! notifications on [`ClientEvents`].

use crate::state::SessionEvent;
use async_trait::async_trait;
use std::fmt::Display;
use tokio::sync::mpsc;
use tracing::warn;

/// A client for a hosted voice-agent service.
///
/// Implementations own all audio transport and agent communication. They are
/// constructed once per controller from the access credential.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceSessionClient: Send + Sync + 'static {
    /// Starts a call with the agent identified by `agent_id`.
    ///
    /// Returning an error means the call never started. A successful return
    /// does not mean the call is live; that is signalled by
    /// [`ClientEvents::call_started`].
    async fn start(&self, agent_id: &str) -> anyhow::Result<()>;

    /// Asks the service to end the active call. Idempotent, and a no-op when
    /// there is no call.
    fn stop(&self);

    /// Registers the notification sink. Called once, right after construction.
    fn subscribe(&self, events: ClientEvents);
}

/// Notification sink handed to a [`VoiceSessionClient`].
///
/// Every notification lands in the owning controller's event queue, in the
/// order it was raised.
#[derive(Clone, Debug)]
pub struct ClientEvents {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ClientEvents {
    /// Creates a sink together with the receiving end of its queue.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn call_started(&self) {
        self.emit(SessionEvent::CallStarted);
    }

    pub fn call_ended(&self) {
        self.emit(SessionEvent::CallEnded);
    }

    /// Reports an error. The message is only used for logging.
    pub fn error(&self, error: impl Display) {
        self.emit(SessionEvent::Error(error.to_string()));
    }

    pub(crate) fn start_failed(&self, error: impl Display) {
        self.emit(SessionEvent::StartFailed(error.to_string()));
    }

    fn emit(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            warn!("Dropped voice client notification: session controller is gone.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_arrive_in_order() {
        let (events, mut rx) = ClientEvents::channel();
        events.call_started();
        events.error("socket reset");
        events.call_ended();

        assert_eq!(rx.try_recv().unwrap(), SessionEvent::CallStarted);
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Error("socket reset".to_string())
        );
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::CallEnded);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_after_receiver_dropped_does_not_panic() {
        let (events, rx) = ClientEvents::channel();
        drop(rx);
        events.call_ended();
        events.error(anyhow::anyhow!("late"));
    }
}
