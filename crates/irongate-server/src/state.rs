//! Shared axum state: the long-lived orchestrator and chain handles,
//! wired as `Arc<dyn Service>`/`Arc<dyn Port>` handles through `State`
//! rather than threading individual storage clients into every handler.

use std::sync::Arc;

use irongate_core::{ChainStore, ProxyOrchestrator};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ProxyOrchestrator>,
    /// Shared with the orchestrator's own chain handle so `/events/batch`
    /// appends land in the same per-firm chains `/analyze` and `/send` use.
    pub chain: Arc<dyn ChainStore>,
}
