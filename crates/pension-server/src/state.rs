//! Application State

use std::sync::Arc;

use agent_core::{LlmProvider, ToolRegistry};
use pension_advisor::{PensionConsultant, PensionSource};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Upstream record source (live FSS client or demo data)
    pub source: Arc<dyn PensionSource>,

    /// Chat-completion provider
    pub provider: Arc<dyn LlmProvider>,

    /// Registered FSS tools
    pub tools: Arc<ToolRegistry>,

    /// AI consultant with per-user history
    pub consultant: Arc<PensionConsultant>,
}
