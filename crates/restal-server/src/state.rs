//! Shared application state.

use restal_adapter_pg::{AccessGate, PgExecutor};

/// State handed to every handler. The executor (and the gate inside it)
/// is immutable after startup and cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    executor: PgExecutor,
}

impl AppState {
    pub fn new(executor: PgExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &PgExecutor {
        &self.executor
    }

    pub fn gate(&self) -> &AccessGate {
        self.executor.gate()
    }
}
