//! Retirement-Pension Tools
//!
//! Operator performance, cost burden, customized fee comparison and
//! principal-guaranteed product lookups.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use super::records_json;
use crate::fss::{Endpoint, PensionSource, SourceQuery};

/// Retirement-pension operator return rates
pub struct RetirementPerformanceTool {
    source: Arc<dyn PensionSource>,
}

impl RetirementPerformanceTool {
    pub fn new(source: Arc<dyn PensionSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for RetirementPerformanceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "retirement_pension_performance".into(),
            description: "Return rates of retirement-pension operators, optionally per system type (DB/DC/IRP).".into(),
            parameters: vec![
                ParameterSchema::optional_string("search_year", "Year to query (e.g. '2023')"),
                ParameterSchema::optional_string("search_quarter", "Quarter to query ('1'-'4')"),
                ParameterSchema::optional_string("system_type", "Pension system type")
                    .with_enum(vec![json!("DB"), json!("DC"), json!("IRP")]),
            ],
            category: Some("retirement".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let mut query = SourceQuery::new();
        if let Some(year) = call.str_arg("search_year") {
            query = query.year(year);
        }
        if let Some(quarter) = call.str_arg("search_quarter") {
            query = query.quarter(quarter);
        }
        if let Some(sys) = call.str_arg("system_type") {
            query = query.sys_type(sys);
        }

        match self
            .source
            .fetch(Endpoint::RetirementPerformance, &query)
            .await
        {
            Ok(set) => Ok(ToolResult::success(
                "retirement_pension_performance",
                format!("{} operators", set.count),
            )
            .with_data(records_json(&set))),
            Err(e) => Ok(ToolResult::failure(
                "retirement_pension_performance",
                e.to_string(),
            )),
        }
    }
}

/// Retirement-pension total cost burden ratios
pub struct RetirementCostTool {
    source: Arc<dyn PensionSource>,
}

impl RetirementCostTool {
    pub fn new(source: Arc<dyn PensionSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for RetirementCostTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "retirement_pension_cost".into(),
            description: "Total cost burden ratios and fees of retirement-pension operators.".into(),
            parameters: vec![ParameterSchema::optional_string(
                "search_year",
                "Year to query (e.g. '2023')",
            )],
            category: Some("retirement".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let mut query = SourceQuery::new();
        if let Some(year) = call.str_arg("search_year") {
            query = query.year(year);
        }

        match self.source.fetch(Endpoint::RetirementCost, &query).await {
            Ok(set) => Ok(ToolResult::success(
                "retirement_pension_cost",
                format!("{} operators", set.count),
            )
            .with_data(records_json(&set))),
            Err(e) => Ok(ToolResult::failure("retirement_pension_cost", e.to_string())),
        }
    }
}

/// Customized fee comparison by deposit amount, term and system type
pub struct CustomFeesTool {
    source: Arc<dyn PensionSource>,
}

impl CustomFeesTool {
    pub fn new(source: Arc<dyn PensionSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for CustomFeesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "retirement_custom_fees".into(),
            description: "Customized retirement-pension fee comparison for a deposit amount, contract term and system type.".into(),
            parameters: vec![
                ParameterSchema::optional_string("deposit_amount", "Reserve band in millions (e.g. '50')"),
                ParameterSchema::optional_string("contract_period", "Contract term in years (e.g. '1', '3', '5')"),
                ParameterSchema::optional_string("system_type", "Pension system type")
                    .with_enum(vec![json!("DB"), json!("DC"), json!("IRP")]),
            ],
            category: Some("retirement".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let mut query = SourceQuery::new();
        if let Some(reserve) = call.str_arg("deposit_amount") {
            query = query.reserve(reserve);
        }
        if let Some(term) = call.str_arg("contract_period") {
            query = query.term(term);
        }
        if let Some(sys) = call.str_arg("system_type") {
            query = query.sys_type(sys);
        }

        match self.source.fetch(Endpoint::CustomFees, &query).await {
            Ok(set) => Ok(ToolResult::success(
                "retirement_custom_fees",
                format!("{} fee rows", set.count),
            )
            .with_data(records_json(&set))),
            Err(e) => Ok(ToolResult::failure("retirement_custom_fees", e.to_string())),
        }
    }
}

/// Principal-guaranteed product supply status per operator
pub struct GuaranteedSupplyTool {
    source: Arc<dyn PensionSource>,
}

impl GuaranteedSupplyTool {
    pub fn new(source: Arc<dyn PensionSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GuaranteedSupplyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "guaranteed_product_status".into(),
            description: "Supply status of principal-guaranteed products per retirement-pension operator.".into(),
            parameters: vec![ParameterSchema::optional_string(
                "area_code",
                "Business area code filter",
            )],
            category: Some("retirement".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let mut query = SourceQuery::new();
        if let Some(area) = call.str_arg("area_code") {
            query = query.area_code(area);
        }

        match self.source.fetch(Endpoint::GuaranteedSupply, &query).await {
            Ok(set) => Ok(ToolResult::success(
                "guaranteed_product_status",
                format!("{} operators", set.count),
            )
            .with_data(records_json(&set))),
            Err(e) => Ok(ToolResult::failure("guaranteed_product_status", e.to_string())),
        }
    }
}

/// Principal-guaranteed retirement-pension products
pub struct GuaranteedProductsTool {
    source: Arc<dyn PensionSource>,
}

impl GuaranteedProductsTool {
    pub fn new(source: Arc<dyn PensionSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GuaranteedProductsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "guaranteed_products".into(),
            description: "Principal-guaranteed retirement-pension products for an area, system type and report date.".into(),
            parameters: vec![
                ParameterSchema::optional_string("area_code", "Business area code").required(),
                ParameterSchema::optional_string("system_type", "Pension system type")
                    .with_enum(vec![json!("DB"), json!("DC"), json!("IRP")])
                    .required(),
                ParameterSchema::optional_string("report_date", "Report date (YYYYMMDD)").required(),
                ParameterSchema::optional_string("product_type", "Product type filter"),
            ],
            category: Some("retirement".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        // Required args are checked by validate(); defaults keep the
        // upstream happy if a caller bypasses validation.
        let mut query = SourceQuery::new()
            .area_code(call.str_arg("area_code").unwrap_or_default())
            .sys_type(call.str_arg("system_type").unwrap_or_default())
            .report_date(call.str_arg("report_date").unwrap_or_default());
        if let Some(ptype) = call.str_arg("product_type") {
            query = query.product_type(ptype);
        }

        match self.source.fetch(Endpoint::GuaranteedProducts, &query).await {
            Ok(set) => Ok(ToolResult::success(
                "guaranteed_products",
                format!("{} products", set.count),
            )
            .with_data(records_json(&set))),
            Err(e) => Ok(ToolResult::failure("guaranteed_products", e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::ToolRegistry;
    use crate::fss::StaticPensionSource;

    #[tokio::test]
    async fn test_custom_fees_roundtrip() {
        let tool = CustomFeesTool::new(Arc::new(StaticPensionSource::new()));
        let call = ToolCall::new("retirement_custom_fees")
            .with_arg("deposit_amount", json!("50"))
            .with_arg("contract_period", json!("5"))
            .with_arg("system_type", json!("DC"));

        let result = tool.execute(&call).await.unwrap();
        assert!(result.success);
        assert!(result.data.unwrap()["count"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_guaranteed_products_requires_report_date() {
        let mut registry = ToolRegistry::new();
        registry.register(GuaranteedProductsTool::new(Arc::new(
            StaticPensionSource::new(),
        )));

        let incomplete = ToolCall::new("guaranteed_products").with_arg("area_code", json!("A"));
        assert!(registry.execute(&incomplete).await.is_err());

        let complete = ToolCall::new("guaranteed_products")
            .with_arg("area_code", json!("A"))
            .with_arg("system_type", json!("DC"))
            .with_arg("report_date", json!("20240630"));
        assert!(registry.execute(&complete).await.unwrap().success);
    }
}
