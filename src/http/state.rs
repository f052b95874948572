// Shared application state for the HTTP layer.
//
// The service is held behind trait objects so the composition root and
// the router tests can wire any store/oracle pairing.

use crate::core::moderation::{ModerationLogStore, ModerationOracle, ModerationService};
use std::sync::Arc;

/// Concrete service type used by the handlers.
pub type AppService = ModerationService<Box<dyn ModerationLogStore>, Box<dyn ModerationOracle>>;

#[derive(Clone)]
pub struct AppState {
    pub moderation: Arc<AppService>,
}

impl AppState {
    pub fn new(moderation: Arc<AppService>) -> Self {
        Self { moderation }
    }
}
