use std::sync::Arc;

use crate::flows::CareerFlows;
use crate::roles::RoleProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable AI backend. Default: LlmCareerFlows.
    pub flows: Arc<dyn CareerFlows>,
    /// Session roles. Installed on the router as an extension by `build_router`.
    pub roles: RoleProvider,
}
