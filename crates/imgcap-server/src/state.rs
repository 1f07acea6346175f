//! Application state shared across all handlers

use std::sync::Arc;

use crate::config::Config;
use crate::moderation::{ModerationClient, ModerationError, Moderator};

/// Read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    /// Process configuration
    pub config: Arc<Config>,
    /// Moderation gate
    pub moderator: Arc<dyn Moderator>,
}

impl AppState {
    /// Build state with the HTTP moderation client described by `config`.
    pub fn new(config: Config) -> Result<Self, ModerationError> {
        let moderator = ModerationClient::new(&config)?;
        Ok(Self::with_moderator(config, Arc::new(moderator)))
    }

    /// Build state around any moderator.
    pub fn with_moderator(config: Config, moderator: Arc<dyn Moderator>) -> Self {
        Self {
            config: Arc::new(config),
            moderator,
        }
    }
}
