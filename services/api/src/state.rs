//! Shared Application State
//!
//! Holds what every page connection needs to mount its own session
//! controller. Nothing here is shared between sessions at runtime; each
//! connection builds its own voice client from this configuration.

use crate::config::Config;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}
