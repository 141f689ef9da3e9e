//! A [`VoiceSessionClient`](parley_core::VoiceSessionClient) for the Vapi
//! hosted voice-agent service.
//!
//! Calls are created over HTTPS with the public key and then carried over the
//! service's WebSocket call channel. Audio on that channel is not handled
//! here; the client only tracks the call's lifecycle and control messages.

mod client;
pub mod error;
pub mod protocol;

pub use client::{DEFAULT_API_BASE, VapiWebClient};
pub use error::VapiError;
