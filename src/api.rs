//! HTTP API for the external agent runtime
//!
//! The runtime fetches the agent configuration and the tool catalog, then
//! calls tools one at a time as the model requests them.

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::agent::AgentSpec;
use crate::cases::CaseDesk;
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<CaseDesk>,
    pub registry: Arc<ToolRegistry>,
    pub agent: Arc<AgentSpec>,
    /// Cancelled on shutdown; tool calls still running report `cancelled`
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(desk: CaseDesk, model: &str) -> Self {
        let registry = ToolRegistry::standard();
        let agent = AgentSpec::new(model, registry.definitions());
        Self {
            desk: Arc::new(desk),
            registry: Arc::new(registry),
            agent: Arc::new(agent),
            shutdown: CancellationToken::new(),
        }
    }
}
