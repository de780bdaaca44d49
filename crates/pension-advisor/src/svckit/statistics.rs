//! Pension Statistics Tools
//!
//! Reserve statistics across the overall, public, personal and
//! retirement pension systems.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use super::records_json;
use crate::fss::{Endpoint, PensionSource, SourceQuery};

fn year_query(call: &ToolCall) -> SourceQuery {
    let mut query = SourceQuery::new();
    if let Some(year) = call.str_arg("search_year") {
        query = query.year(year);
    }
    query
}

macro_rules! stats_tool {
    ($name:ident, $tool_name:literal, $endpoint:expr, $description:literal, $stat_type_required:literal) => {
        pub struct $name {
            source: Arc<dyn PensionSource>,
        }

        impl $name {
            pub fn new(source: Arc<dyn PensionSource>) -> Self {
                Self { source }
            }
        }

        #[async_trait]
        impl Tool for $name {
            fn schema(&self) -> ToolSchema {
                let mut parameters = vec![ParameterSchema::optional_string(
                    "search_year",
                    "Year to query (e.g. '2023')",
                )];
                if $stat_type_required {
                    parameters.push(
                        ParameterSchema::optional_string(
                            "stat_type",
                            "Statistics breakdown type",
                        )
                        .required(),
                    );
                }

                ToolSchema {
                    name: $tool_name.into(),
                    description: $description.into(),
                    parameters,
                    category: Some("statistics".into()),
                }
            }

            async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
                let mut query = year_query(call);
                if let Some(stat_type) = call.str_arg("stat_type") {
                    query = query.stat_type(stat_type);
                }

                match self.source.fetch($endpoint, &query).await {
                    Ok(set) => Ok(ToolResult::success(
                        $tool_name,
                        format!("{} statistics rows", set.count),
                    )
                    .with_data(records_json(&set))),
                    Err(e) => Ok(ToolResult::failure($tool_name, e.to_string())),
                }
            }
        }
    };
}

stats_tool!(
    PensionStatsTool,
    "pension_statistics",
    Endpoint::PensionStats,
    "Overall reserve statistics across personal, retirement and public pensions.",
    false
);

stats_tool!(
    PublicPensionStatsTool,
    "public_pension_statistics",
    Endpoint::PublicPensionStats,
    "Reserve statistics for public pension schemes (national, civil service, military).",
    false
);

stats_tool!(
    PersonalPensionStatsTool,
    "personal_pension_statistics",
    Endpoint::PersonalPensionStats,
    "Personal pension reserve statistics broken down by tax qualification and sector.",
    true
);

stats_tool!(
    RetirementPensionStatsTool,
    "retirement_pension_statistics",
    Endpoint::RetirementPensionStats,
    "Retirement pension reserve statistics broken down by system type.",
    true
);

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::ToolRegistry;
    use crate::fss::StaticPensionSource;
    use serde_json::json;

    #[tokio::test]
    async fn test_overall_stats() {
        let tool = PensionStatsTool::new(Arc::new(StaticPensionSource::new()));
        let result = tool
            .execute(&ToolCall::new("pension_statistics"))
            .await
            .unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["count"], 6);
    }

    #[tokio::test]
    async fn test_stat_type_requirement() {
        let mut registry = ToolRegistry::new();
        registry.register(PersonalPensionStatsTool::new(Arc::new(
            StaticPensionSource::new(),
        )));

        let missing = ToolCall::new("personal_pension_statistics");
        assert!(registry.execute(&missing).await.is_err());

        let ok = ToolCall::new("personal_pension_statistics")
            .with_arg("stat_type", json!("tax-qualified"));
        assert!(registry.execute(&ok).await.unwrap().success);
    }
}
