use std::sync::Arc;

use chainscript_registry::LedgerRegistry;
use chainscript_types::StoryId;

use crate::auth::AuthProvider;
use crate::error::{ServerError, ServerResult};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<LedgerRegistry>,
    pub auth: Arc<dyn AuthProvider>,
    pub default_story: StoryId,
}

impl AppState {
    pub fn new(
        registry: Arc<LedgerRegistry>,
        auth: Arc<dyn AuthProvider>,
        default_story: StoryId,
    ) -> Self {
        Self {
            registry,
            auth,
            default_story,
        }
    }

    /// The story named by a request, or the default story if none is given.
    pub fn story_or_default(&self, requested: Option<&str>) -> ServerResult<StoryId> {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => StoryId::new(raw).map_err(|e| ServerError::BadRequest(e.to_string())),
            None => Ok(self.default_story.clone()),
        }
    }
}
