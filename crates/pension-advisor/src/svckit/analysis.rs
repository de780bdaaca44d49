//! Performance Analysis Tool
//!
//! Composes multiple endpoint fetches into one of four analysis views:
//! company comparison, product ranking, cost analysis or trend analysis.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde_json::json;

use agent_core::{
    tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::aggregate::{bucket_by_category, filter_selling, rank_top, Order};
use crate::fss::{Endpoint, PensionSource, SourceError, SourceQuery};
use crate::record::{field, WORST_FEE_SENTINEL};

/// Product types with their own bucket in the ranking breakdown
const KNOWN_PRODUCT_TYPES: [&str; 3] = ["fund", "trust", "insurance"];

const ANALYSIS_TYPES: [&str; 4] = [
    "company_comparison",
    "product_ranking",
    "cost_analysis",
    "trend_analysis",
];

/// Multi-endpoint pension performance analysis
pub struct AnalyzePerformanceTool {
    source: Arc<dyn PensionSource>,
}

impl AnalyzePerformanceTool {
    pub fn new(source: Arc<dyn PensionSource>) -> Self {
        Self { source }
    }

    fn period_label(year: Option<&str>, quarter: Option<&str>) -> String {
        match (year, quarter) {
            (Some(y), Some(q)) => format!("{y} Q{q}"),
            (Some(y), None) => y.to_string(),
            _ => "latest data".into(),
        }
    }

    async fn company_comparison(
        &self,
        query: &SourceQuery,
    ) -> Result<serde_json::Value, SourceError> {
        let companies = self.source.fetch(Endpoint::SavingsCompanies, query).await?;
        let products = self.source.fetch(Endpoint::SavingsProducts, query).await?;

        Ok(json!({
            "companyPerformance": companies.records,
            "productDetails": products.records,
            "insights": [
                "Spread between the best and worst performing companies",
                "Return efficiency relative to fee rates",
                "Long-term performance trend",
            ],
        }))
    }

    async fn product_ranking(
        &self,
        query: &SourceQuery,
    ) -> Result<serde_json::Value, SourceError> {
        let products = self.source.fetch(Endpoint::SavingsProducts, query).await?;
        let selling = filter_selling(&products.records);

        let by_fee = rank_top(
            &selling,
            field::AVG_FEE_RATE3,
            Order::Ascending,
            10,
            WORST_FEE_SENTINEL,
        );
        let by_return = rank_top(&selling, field::AVG_EARN_RATE3, Order::Descending, 10, 0.0);

        let by_type: serde_json::Map<String, serde_json::Value> =
            bucket_by_category(&selling, field::PRODUCT_TYPE, &KNOWN_PRODUCT_TYPES)
                .into_iter()
                .map(|(bucket, records)| (bucket, json!(records.len())))
                .collect();

        Ok(json!({
            "lowestFee": by_fee,
            "highestReturn": by_return,
            "countByType": by_type,
            "insights": [
                "Top products by 3-year return rate",
                "Lowest-cost products by 3-year fee rate",
                "Risk-adjusted return considerations",
            ],
        }))
    }

    async fn cost_analysis(&self, query: &SourceQuery) -> Result<serde_json::Value, SourceError> {
        let cost = self.source.fetch(Endpoint::RetirementCost, query).await?;
        let custom = self
            .source
            .fetch(Endpoint::CustomFees, &SourceQuery::new())
            .await?;

        Ok(json!({
            "costBreakdown": cost.records,
            "customFeeComparison": custom.records,
            "insights": [
                "Total cost burden ratio per operator",
                "Fee differences across reserve bands",
                "Cost reduction opportunities",
            ],
        }))
    }

    async fn trend_analysis(&self, year: Option<&str>) -> Result<serde_json::Value, SourceError> {
        let current_year = year
            .map(String::from)
            .unwrap_or_else(|| Utc::now().year().to_string());
        let prev_year = current_year
            .parse::<i32>()
            .map(|y| (y - 1).to_string())
            .unwrap_or_default();

        let current = self
            .source
            .fetch(
                Endpoint::PensionStats,
                &SourceQuery::new().year(&current_year),
            )
            .await?;
        let previous = self
            .source
            .fetch(Endpoint::PensionStats, &SourceQuery::new().year(&prev_year))
            .await?;

        Ok(json!({
            "period": format!("{prev_year} vs {current_year}"),
            "currentStatistics": current.records,
            "previousStatistics": previous.records,
            "insights": [
                "Reserve growth rate year over year",
                "Growth pattern per pension system",
                "Market outlook",
            ],
        }))
    }
}

#[async_trait]
impl Tool for AnalyzePerformanceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "analyze_pension_performance".into(),
            description: "Analyze pension product performance by combining several data sets into a comparison, ranking, cost or trend view.".into(),
            parameters: vec![
                ParameterSchema::optional_string("analysis_type", "Analysis view to build")
                    .with_enum(ANALYSIS_TYPES.iter().map(|t| json!(t)).collect())
                    .required(),
                ParameterSchema::optional_string("search_year", "Year to analyze (e.g. '2023')"),
                ParameterSchema::optional_string("search_quarter", "Quarter to analyze ('1'-'4')"),
            ],
            category: Some("analysis".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let analysis_type = call.str_arg("analysis_type").unwrap_or_default();
        let year = call.str_arg("search_year");
        let quarter = call.str_arg("search_quarter");

        let mut query = SourceQuery::new();
        if let Some(y) = year {
            query = query.year(y);
        }
        if let Some(q) = quarter {
            query = query.quarter(q);
        }

        let outcome = match analysis_type {
            "company_comparison" => self.company_comparison(&query).await,
            "product_ranking" => self.product_ranking(&query).await,
            "cost_analysis" => self.cost_analysis(&query).await,
            "trend_analysis" => self.trend_analysis(year).await,
            other => {
                return Ok(ToolResult::failure(
                    "analyze_pension_performance",
                    format!("Unsupported analysis type: {other}"),
                ))
            }
        };

        match outcome {
            Ok(mut data) => {
                data["analysisType"] = json!(analysis_type);
                data["period"] = data
                    .get("period")
                    .cloned()
                    .unwrap_or_else(|| json!(Self::period_label(year, quarter)));
                Ok(
                    ToolResult::success("analyze_pension_performance", analysis_type)
                        .with_data(data),
                )
            }
            Err(e) => Ok(ToolResult::failure(
                "analyze_pension_performance",
                e.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fss::StaticPensionSource;
    use serde_json::json;

    fn tool() -> AnalyzePerformanceTool {
        AnalyzePerformanceTool::new(Arc::new(StaticPensionSource::new()))
    }

    #[tokio::test]
    async fn test_product_ranking_view() {
        let call = ToolCall::new("analyze_pension_performance")
            .with_arg("analysis_type", json!("product_ranking"));

        let result = tool().execute(&call).await.unwrap();
        assert!(result.success);

        let data = result.data.unwrap();
        let by_fee = data["lowestFee"].as_array().unwrap();
        assert_eq!(by_fee[0]["rank"], 1);
        // Cheapest selling product leads the fee ranking
        assert_eq!(by_fee[0]["company"], "Mirae Asset Securities");

        let by_return = data["highestReturn"].as_array().unwrap();
        assert_eq!(by_return[0]["avgEarnRate3"], 6.85);

        // Selling products split 2 fund / 2 trust / 3 insurance
        assert_eq!(data["countByType"]["fund"], 2);
        assert_eq!(data["countByType"]["insurance"], 3);
        assert_eq!(data["countByType"]["other"], 0);
    }

    #[tokio::test]
    async fn test_unknown_analysis_type_is_reported_not_thrown() {
        let call = ToolCall::new("analyze_pension_performance")
            .with_arg("analysis_type", json!("astrology"));

        let result = tool().execute(&call).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("astrology"));
    }

    #[tokio::test]
    async fn test_trend_analysis_labels_period() {
        let call = ToolCall::new("analyze_pension_performance")
            .with_arg("analysis_type", json!("trend_analysis"))
            .with_arg("search_year", json!("2024"));

        let result = tool().execute(&call).await.unwrap();
        assert!(result.success);
        assert_eq!(result.data.unwrap()["period"], "2023 vs 2024");
    }
}
