//! Parley API Library Crate
//!
//! Serves the single voice page and binds each of its WebSocket connections
//! to a session controller. The `api` binary is a thin wrapper around this
//! library.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
pub mod ws;
