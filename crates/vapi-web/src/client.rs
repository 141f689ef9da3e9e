use crate::{
    error::VapiError,
    protocol::{self, CallResponse, ControlMessage, CreateCallRequest},
};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use parley_core::{ClientEvents, VoiceSessionClient};
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message as WsMessage,
};
use tracing::{Instrument, debug, info, info_span, trace};

pub const DEFAULT_API_BASE: &str = "https://api.vapi.ai";

type CallChannel = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handle to the call currently carried by a channel task.
struct ActiveCall {
    id: String,
    generation: u64,
    control: mpsc::UnboundedSender<ControlMessage>,
}

/// The current call, if any, and the generation it must belong to.
///
/// Every start and every stop bumps the generation. A start that finds the
/// generation moved while it was connecting has been cancelled; a channel
/// task whose call is no longer current has been stopped and stays silent.
#[derive(Default)]
struct CallSlot {
    generation: u64,
    active: Option<ActiveCall>,
}

impl CallSlot {
    fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|call| call.generation == generation)
    }
}

type SharedSlot = Arc<Mutex<CallSlot>>;

fn lock(slot: &Mutex<CallSlot>) -> MutexGuard<'_, CallSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct VapiWebClient {
    http: reqwest::Client,
    public_key: SecretString,
    call_endpoint: String,
    events: Mutex<Option<ClientEvents>>,
    call: SharedSlot,
}

impl VapiWebClient {
    pub fn new(public_key: SecretString, api_base: &str) -> Result<Self, VapiError> {
        reqwest::Url::parse(api_base)
            .map_err(|e| VapiError::InvalidBaseUrl(api_base.to_string(), e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            public_key,
            call_endpoint: format!("{}/call", api_base.trim_end_matches('/')),
            events: Mutex::new(None),
            call: SharedSlot::default(),
        })
    }

    fn subscriber(&self) -> Result<ClientEvents, VapiError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(VapiError::NotSubscribed)
    }

    fn has_active_call(&self) -> bool {
        lock(&self.call)
            .active
            .as_ref()
            .is_some_and(|call| !call.control.is_closed())
    }

    /// Claims a new generation for a start, unless a call is already live.
    fn begin_start(&self) -> Result<u64, VapiError> {
        let mut slot = lock(&self.call);
        if slot
            .active
            .as_ref()
            .is_some_and(|call| !call.control.is_closed())
        {
            return Err(VapiError::CallInProgress);
        }
        slot.generation += 1;
        Ok(slot.generation)
    }

    async fn create_call(&self, agent_id: &str) -> Result<CallResponse, VapiError> {
        let response = self
            .http
            .post(&self.call_endpoint)
            .bearer_auth(self.public_key.expose_secret())
            .json(&CreateCallRequest::websocket(agent_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VapiError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<CallResponse>().await?)
    }
}

#[async_trait]
impl VoiceSessionClient for VapiWebClient {
    async fn start(&self, agent_id: &str) -> anyhow::Result<()> {
        let events = self.subscriber()?;
        let generation = self.begin_start()?;

        let call = self.create_call(agent_id).await?;
        let url = call
            .call_url()
            .ok_or_else(|| VapiError::MissingCallUrl(call.id.clone()))?;
        debug!(call_id = %call.id, "Call created. Opening call channel...");

        let (mut channel, _) = connect_async(url).await.map_err(VapiError::Connect)?;

        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let announced = {
            let mut slot = lock(&self.call);
            let current = slot.generation == generation;
            if current {
                slot.active = Some(ActiveCall {
                    id: call.id.clone(),
                    generation,
                    control: control_tx,
                });
                // Under the lock, so a concurrent stop sees either no call or
                // one that has already been announced.
                events.call_started();
            }
            current
        };
        if !announced {
            info!(call_id = %call.id, "Call stopped while connecting. Closing channel.");
            let _ = channel.close(None).await;
            return Err(VapiError::Cancelled.into());
        }
        info!(call_id = %call.id, "Connected to call channel.");

        let span = info_span!("vapi_call", call_id = %call.id);
        let slot = self.call.clone();
        tokio::spawn(run_call(channel, control_rx, events, slot, generation).instrument(span));
        Ok(())
    }

    fn stop(&self) {
        let call = {
            let mut slot = lock(&self.call);
            slot.generation += 1;
            slot.active.take()
        };
        match call {
            Some(call) => {
                info!(call_id = %call.id, "Ending call.");
                // The channel task may already be gone; nothing left to end then.
                let _ = call.control.send(ControlMessage::EndCall);
            }
            None => debug!("Stop requested with no active call."),
        }
    }

    fn subscribe(&self, events: ClientEvents) {
        *self.events.lock().unwrap_or_else(PoisonError::into_inner) = Some(events);
    }
}

/// Drives one call channel until it closes.
///
/// Error frames and channel failures are reported as errors; a close is
/// reported as the call ending. Binary (audio) frames are ignored. Nothing is
/// reported once the call has been stopped, since a later call may already
/// own the event sink.
async fn run_call(
    channel: CallChannel,
    mut control_rx: mpsc::UnboundedReceiver<ControlMessage>,
    events: ClientEvents,
    slot: SharedSlot,
    generation: u64,
) {
    let (mut channel_tx, mut channel_rx) = channel.split();
    let mut closing = false;

    loop {
        tokio::select! {
            // `None` means the client handle was dropped; end the call as well.
            control = control_rx.recv(), if !closing => {
                let message = control.unwrap_or(ControlMessage::EndCall);
                if let Err(e) = send_control(&mut channel_tx, message).await {
                    finish(&slot, generation, || events.error(format!("{e:#}")));
                    return;
                }
                closing = true;
            },
            frame = channel_rx.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    match protocol::error_message(text.as_str()) {
                        Some(message) => {
                            if lock(&slot).is_current(generation) {
                                events.error(message);
                            } else {
                                debug!("Dropping error from a stopped call.");
                            }
                        }
                        None => trace!(len = text.len(), "Ignoring call channel message."),
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    debug!(?frame, "Call channel closed by service.");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    finish(&slot, generation, || events.error(VapiError::Channel(e)));
                    return;
                }
                None => break,
            },
        }
    }

    info!("Call channel finished.");
    finish(&slot, generation, || events.call_ended());
}

/// Releases the slot and reports the outcome, if this call is still current.
fn finish(slot: &Mutex<CallSlot>, generation: u64, report: impl FnOnce()) {
    let mut slot = lock(slot);
    if slot.is_current(generation) {
        slot.active = None;
        report();
    } else {
        debug!("Call was stopped; not reporting its end.");
    }
}

/// Sends a control message and closes our side of the channel.
async fn send_control(
    channel_tx: &mut SplitSink<CallChannel, WsMessage>,
    message: ControlMessage,
) -> anyhow::Result<()> {
    let text = serde_json::to_string(&message)?;
    channel_tx
        .send(WsMessage::Text(text.into()))
        .await
        .map_err(VapiError::Channel)?;
    channel_tx.close().await.map_err(VapiError::Channel)?;
    Ok(())
}
