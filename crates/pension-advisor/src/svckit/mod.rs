//! Service Kit - Registered Tools
//!
//! Every FSS operation and analysis is declared as an `agent_core::Tool`
//! so it can be listed and invoked over the tool protocol. One struct per
//! upstream operation, each holding the shared record source.

mod analysis;
mod recommendation;
mod retirement;
mod savings;
mod statistics;

pub use analysis::AnalyzePerformanceTool;
pub use recommendation::RecommendationTool;
pub use retirement::{
    CustomFeesTool, GuaranteedProductsTool, GuaranteedSupplyTool, RetirementCostTool,
    RetirementPerformanceTool,
};
pub use savings::{GuaranteedInsuranceTool, SavingsCompaniesTool, SavingsProductsTool};
pub use statistics::{
    PensionStatsTool, PersonalPensionStatsTool, PublicPensionStatsTool, RetirementPensionStatsTool,
};

use std::sync::Arc;

use agent_core::ToolRegistry;
use serde_json::{json, Value};

use crate::fss::{PensionSource, RecordSet};
use crate::recommend::PolicyConfig;

/// Register the full FSS tool set on a registry
pub fn register_all(
    registry: &mut ToolRegistry,
    source: Arc<dyn PensionSource>,
    policy: PolicyConfig,
) {
    registry.register(SavingsCompaniesTool::new(source.clone()));
    registry.register(SavingsProductsTool::new(source.clone()));
    registry.register(GuaranteedInsuranceTool::new(source.clone()));

    registry.register(RetirementPerformanceTool::new(source.clone()));
    registry.register(RetirementCostTool::new(source.clone()));
    registry.register(CustomFeesTool::new(source.clone()));
    registry.register(GuaranteedSupplyTool::new(source.clone()));
    registry.register(GuaranteedProductsTool::new(source.clone()));

    registry.register(PensionStatsTool::new(source.clone()));
    registry.register(PublicPensionStatsTool::new(source.clone()));
    registry.register(PersonalPensionStatsTool::new(source.clone()));
    registry.register(RetirementPensionStatsTool::new(source.clone()));

    registry.register(AnalyzePerformanceTool::new(source));
    registry.register(RecommendationTool::new(policy));
}

/// Shared shaping of a record set into tool result data
pub(crate) fn records_json(set: &RecordSet) -> Value {
    json!({
        "count": set.count,
        "records": set.records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fss::StaticPensionSource;

    #[test]
    fn test_register_all_covers_every_operation() {
        let mut registry = ToolRegistry::new();
        register_all(
            &mut registry,
            Arc::new(StaticPensionSource::new()),
            PolicyConfig::default(),
        );

        assert_eq!(registry.len(), 14);
        for name in [
            "pension_savings_companies",
            "pension_savings_products",
            "pension_savings_insurance",
            "retirement_pension_performance",
            "retirement_pension_cost",
            "retirement_custom_fees",
            "guaranteed_product_status",
            "guaranteed_products",
            "pension_statistics",
            "public_pension_statistics",
            "personal_pension_statistics",
            "retirement_pension_statistics",
            "analyze_pension_performance",
            "pension_recommendation",
        ] {
            assert!(registry.get(name).is_some(), "missing tool {name}");
        }
    }
}
