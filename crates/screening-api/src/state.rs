use std::sync::Arc;

use screening_engine::ScreeningEngine;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScreeningEngine>,
}

impl AppState {
    pub fn new(engine: ScreeningEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
