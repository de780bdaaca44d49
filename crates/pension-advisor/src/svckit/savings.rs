//! Pension-Savings Tools
//!
//! Company performance, product performance and guaranteed savings
//! insurance lookups. Year/quarter filters go upstream; company-name
//! filtering happens client-side because the upstream has no such
//! parameter.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use super::records_json;
use crate::fss::{Endpoint, PensionSource, SourceQuery};
use crate::record::{field, Record};

fn year_quarter_query(call: &ToolCall) -> SourceQuery {
    let mut query = SourceQuery::new();
    if let Some(year) = call.str_arg("search_year") {
        query = query.year(year);
    }
    if let Some(quarter) = call.str_arg("search_quarter") {
        query = query.quarter(quarter);
    }
    query
}

/// Case-insensitive substring match on the company field
fn filter_by_company(records: Vec<Record>, needle: Option<&str>) -> Vec<Record> {
    match needle {
        None => records,
        Some(needle) => {
            let needle = needle.to_lowercase();
            records
                .into_iter()
                .filter(|r| {
                    r.text(field::COMPANY)
                        .is_some_and(|c| c.to_lowercase().contains(&needle))
                })
                .collect()
        }
    }
}

/// Fee/return rates per pension-savings company
pub struct SavingsCompaniesTool {
    source: Arc<dyn PensionSource>,
}

impl SavingsCompaniesTool {
    pub fn new(source: Arc<dyn PensionSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for SavingsCompaniesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "pension_savings_companies".into(),
            description: "Fee and return rates of pension-savings companies, optionally for a specific year and quarter.".into(),
            parameters: vec![
                ParameterSchema::optional_string("search_year", "Year to query (e.g. '2023')"),
                ParameterSchema::optional_string("search_quarter", "Quarter to query ('1'-'4')"),
                ParameterSchema::optional_string("area_code", "Business area code filter"),
            ],
            category: Some("savings".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let mut query = year_quarter_query(call);
        if let Some(area) = call.str_arg("area_code") {
            query = query.area_code(area);
        }

        match self.source.fetch(Endpoint::SavingsCompanies, &query).await {
            Ok(set) => Ok(ToolResult::success(
                "pension_savings_companies",
                format!("{} companies", set.count),
            )
            .with_data(records_json(&set))),
            Err(e) => Ok(ToolResult::failure("pension_savings_companies", e.to_string())),
        }
    }
}

/// Fee/return rates per pension-savings product
pub struct SavingsProductsTool {
    source: Arc<dyn PensionSource>,
}

impl SavingsProductsTool {
    pub fn new(source: Arc<dyn PensionSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for SavingsProductsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "pension_savings_products".into(),
            description: "Fee and return rates of individual pension-savings products; can be narrowed to one company by name.".into(),
            parameters: vec![
                ParameterSchema::optional_string("search_year", "Year to query (e.g. '2023')"),
                ParameterSchema::optional_string("search_quarter", "Quarter to query ('1'-'4')"),
                ParameterSchema::optional_string("company_name", "Company name substring filter"),
            ],
            category: Some("savings".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = year_quarter_query(call);

        match self.source.fetch(Endpoint::SavingsProducts, &query).await {
            Ok(mut set) => {
                set.records = filter_by_company(set.records, call.str_arg("company_name"));
                set.count = set.records.len();
                Ok(ToolResult::success(
                    "pension_savings_products",
                    format!("{} products", set.count),
                )
                .with_data(records_json(&set)))
            }
            Err(e) => Ok(ToolResult::failure("pension_savings_products", e.to_string())),
        }
    }
}

/// Principal-guaranteed pension-savings insurance products
pub struct GuaranteedInsuranceTool {
    source: Arc<dyn PensionSource>,
}

impl GuaranteedInsuranceTool {
    pub fn new(source: Arc<dyn PensionSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GuaranteedInsuranceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "pension_savings_insurance".into(),
            description: "Principal-guaranteed pension-savings insurance products.".into(),
            parameters: vec![
                ParameterSchema::optional_string("company_name", "Insurer name substring filter"),
                ParameterSchema::optional_string("channel_code", "Sales channel code"),
            ],
            category: Some("savings".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let mut query = SourceQuery::new();
        if let Some(channel) = call.str_arg("channel_code") {
            query = query.channel_code(channel);
        }

        match self.source.fetch(Endpoint::GuaranteedInsurance, &query).await {
            Ok(mut set) => {
                set.records = filter_by_company(set.records, call.str_arg("company_name"));
                set.count = set.records.len();
                Ok(ToolResult::success(
                    "pension_savings_insurance",
                    format!("{} products", set.count),
                )
                .with_data(records_json(&set)))
            }
            Err(e) => Ok(ToolResult::failure("pension_savings_insurance", e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fss::{FailingPensionSource, StaticPensionSource};
    use serde_json::json;

    #[tokio::test]
    async fn test_products_company_filter() {
        let tool = SavingsProductsTool::new(Arc::new(StaticPensionSource::new()));
        let call = ToolCall::new("pension_savings_products")
            .with_arg("company_name", json!("samsung life"));

        let result = tool.execute(&call).await.unwrap();
        assert!(result.success);

        let data = result.data.unwrap();
        assert_eq!(data["count"], 2);
    }

    #[tokio::test]
    async fn test_source_failure_becomes_result_envelope() {
        let tool = SavingsCompaniesTool::new(Arc::new(FailingPensionSource));
        let result = tool
            .execute(&ToolCall::new("pension_savings_companies"))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("999"));
    }
}
