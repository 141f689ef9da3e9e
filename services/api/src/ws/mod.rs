//! WebSocket Session Binding
//!
//! Each page connection mounts one session controller for as long as the
//! socket is open.
//!
//! - `protocol`: the JSON messages exchanged with the page.
//! - `session`: connection lifecycle and the controller event loop.

pub mod protocol;
pub mod session;

pub use session::ws_handler;
