//! Parley Core
//!
//! The session controller behind the Parley voice page. It owns a single
//! hosted voice-session client, turns user requests and client notifications
//! into transitions of a four-state machine, and derives what the page should
//! display from the current state.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod state;
pub mod view;

pub use client::{ClientEvents, VoiceSessionClient};
pub use config::SessionConfig;
pub use controller::SessionController;
pub use error::SessionError;
pub use state::{SessionEvent, SessionState};
pub use view::SessionView;
