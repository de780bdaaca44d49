//! HTTP Handlers
//!
//! Every response carries a `success` flag plus either `data` or `error`,
//! so dashboard and tool clients never have to branch on status codes
//! alone.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use agent_core::{LlmProvider as _, ToolCall, ToolResult, ToolSchema};
use pension_advisor::{
    consultant::{ChatReply, RecommendationReport, RetirementScenario, ScenarioReport},
    market::{self, SearchFilters},
    Endpoint, PensionSource as _, SourceQuery, UserProfile,
};

use crate::state::AppState;

/// Uniform response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            total: None,
            error: None,
        })
    }

    pub fn ok_with_total(data: T, total: usize) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            total: Some(total),
            error: None,
        })
    }

    pub fn err(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            total: None,
            error: Some(message.into()),
        })
    }
}

type ApiError = (StatusCode, Json<ApiResponse<()>>);

fn upstream_error(e: impl std::fmt::Display) -> ApiError {
    tracing::error!("Upstream error: {}", e);
    (StatusCode::BAD_GATEWAY, ApiResponse::err(e.to_string()))
}

// ============================================================================
// Health
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub source: String,
    pub source_reachable: bool,
    pub provider_reachable: bool,
    pub tool_count: usize,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let source_reachable = state.source.health_check().await;
    let provider_reachable = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        source: state.source.name().to_string(),
        source_reachable,
        provider_reachable,
        tool_count: state.tools.len(),
    })
}

// ============================================================================
// Dashboard data
// ============================================================================

pub async fn market_summary(
    State(state): State<AppState>,
) -> Json<ApiResponse<pension_advisor::MarketSummary>> {
    // Sub-fetch failures degrade to zero defaults inside the summary
    let summary = market::market_summary(state.source.as_ref()).await;
    ApiResponse::ok(summary)
}

#[derive(Debug, Deserialize)]
pub struct LowFeeParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

pub async fn low_fee_products(
    State(state): State<AppState>,
    Query(params): Query<LowFeeParams>,
) -> Result<Json<ApiResponse<Vec<market::ProductRow>>>, ApiError> {
    let products = market::low_fee_products(state.source.as_ref(), params.limit)
        .await
        .map_err(upstream_error)?;

    let total = products.len();
    Ok(ApiResponse::ok_with_total(products, total))
}

#[derive(Debug, Deserialize)]
pub struct CompanyRankingParams {
    pub area_code: Option<String>,
}

pub async fn company_ranking(
    State(state): State<AppState>,
    Query(params): Query<CompanyRankingParams>,
) -> Result<Json<ApiResponse<Vec<market::CompanyRow>>>, ApiError> {
    let companies = market::company_ranking(state.source.as_ref(), params.area_code.as_deref())
        .await
        .map_err(upstream_error)?;

    let total = companies.len();
    Ok(ApiResponse::ok_with_total(companies, total))
}

pub async fn pension_statistics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<pension_advisor::Record>>>, ApiError> {
    let set = state
        .source
        .fetch(Endpoint::PensionStats, &SourceQuery::new())
        .await
        .map_err(upstream_error)?;

    let total = set.records.len();
    Ok(ApiResponse::ok_with_total(set.records, total))
}

#[derive(Debug, Deserialize)]
pub struct CustomFeeParams {
    #[serde(default = "default_sys_type")]
    pub sys_type: String,
    #[serde(default = "default_term")]
    pub term: String,
    #[serde(default = "default_reserve")]
    pub reserve: String,
}

// Defaults mirror the dashboard's initial view: DC plan, 5-year term,
// 50M KRW reserve band
fn default_sys_type() -> String {
    "2".into()
}
fn default_term() -> String {
    "5".into()
}
fn default_reserve() -> String {
    "50".into()
}

pub async fn custom_fee_comparison(
    State(state): State<AppState>,
    Query(params): Query<CustomFeeParams>,
) -> Result<Json<ApiResponse<Vec<pension_advisor::Record>>>, ApiError> {
    let query = SourceQuery::new()
        .sys_type(&params.sys_type)
        .term(&params.term)
        .reserve(&params.reserve);

    let set = state
        .source
        .fetch(Endpoint::CustomFees, &query)
        .await
        .map_err(upstream_error)?;

    let total = set.records.len();
    Ok(ApiResponse::ok_with_total(set.records, total))
}

pub async fn search_products(
    State(state): State<AppState>,
    Query(filters): Query<SearchFilters>,
) -> Result<Json<ApiResponse<Vec<market::ProductRow>>>, ApiError> {
    let products = market::search_products(state.source.as_ref(), &filters)
        .await
        .map_err(upstream_error)?;

    let total = products.len();
    Ok(ApiResponse::ok_with_total(products, total))
}

// ============================================================================
// Recommendation
// ============================================================================

pub async fn recommendation(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<ApiResponse<pension_advisor::Recommendation>>, ApiError> {
    let rec = state
        .consultant
        .rule_based_recommendation(&profile)
        .map_err(|e| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiResponse::err(e.user_message()),
            )
        })?;

    Ok(ApiResponse::ok(rec))
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, ApiError> {
    let reply = state
        .consultant
        .chat(&payload.user_id, &payload.message, payload.profile.as_ref())
        .await
        .map_err(|e| {
            tracing::error!(user = %payload.user_id, "Chat failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::err(e.user_message()),
            )
        })?;

    Ok(ApiResponse::ok(reply))
}

#[derive(Debug, Deserialize)]
pub struct ClearChatRequest {
    pub user_id: String,
}

pub async fn clear_chat(
    State(state): State<AppState>,
    Json(payload): Json<ClearChatRequest>,
) -> Json<ApiResponse<()>> {
    state.consultant.clear_history(&payload.user_id);
    ApiResponse::ok(())
}

#[derive(Debug, Deserialize)]
pub struct PersonalizedRequest {
    pub profile: UserProfile,
}

pub async fn personalized_recommendation(
    State(state): State<AppState>,
    Json(payload): Json<PersonalizedRequest>,
) -> Result<Json<ApiResponse<RecommendationReport>>, ApiError> {
    let report = state
        .consultant
        .personalized_recommendation(&payload.profile)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::err(e.user_message()),
            )
        })?;

    Ok(ApiResponse::ok(report))
}

#[derive(Debug, Deserialize)]
pub struct ScenarioRequest {
    pub profile: UserProfile,
    #[serde(default)]
    pub scenario: RetirementScenario,
}

pub async fn retirement_scenario(
    State(state): State<AppState>,
    Json(payload): Json<ScenarioRequest>,
) -> Result<Json<ApiResponse<ScenarioReport>>, ApiError> {
    let report = state
        .consultant
        .retirement_scenario(&payload.profile, payload.scenario)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::err(e.user_message()),
            )
        })?;

    Ok(ApiResponse::ok(report))
}

// ============================================================================
// Tool protocol
// ============================================================================

pub async fn list_tools(State(state): State<AppState>) -> Json<ApiResponse<Vec<ToolSchema>>> {
    let schemas = state.tools.schemas();
    let total = schemas.len();
    ApiResponse::ok_with_total(schemas, total)
}

pub async fn call_tool(
    State(state): State<AppState>,
    Json(call): Json<ToolCall>,
) -> Json<ApiResponse<ToolResult>> {
    match state.tools.execute(&call).await {
        Ok(result) => ApiResponse::ok(result),
        // Unknown tool / bad arguments come back as envelope errors too
        Err(e) => ApiResponse::err(e.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shapes() {
        let ok = ApiResponse::ok_with_total(vec![1, 2, 3], 3);
        let value = serde_json::to_value(&ok.0).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["total"], 3);
        assert!(value.get("error").is_none());

        let err: Json<ApiResponse<()>> = ApiResponse::err("boom");
        let value = serde_json::to_value(&err.0).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_custom_fee_defaults() {
        let params: CustomFeeParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.sys_type, "2");
        assert_eq!(params.term, "5");
        assert_eq!(params.reserve, "50");
    }
}
