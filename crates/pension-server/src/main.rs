//! FSS Pension Advisor HTTP Server
//!
//! Axum-based server exposing the dashboard API, the tool-invocation
//! protocol and the AI consultant. Runs against the live FSS OpenAPI
//! when a service key is configured and against bundled demo data
//! otherwise.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{LlmProvider as _, ToolRegistry};
use agent_runtime::OpenAiProvider;
use pension_advisor::{
    consultant::ConsultantConfig, svckit, FssClient, PensionConsultant, PensionSource,
    StaticPensionSource,
};

use crate::handlers::{
    call_tool, chat, clear_chat, company_ranking, custom_fee_comparison, health_check, list_tools,
    low_fee_products, market_summary, pension_statistics, personalized_recommendation,
    recommendation, retirement_scenario, search_products,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Record source: live FSS client when a service key is set, bundled
    // demo rows otherwise
    let source: Arc<dyn PensionSource> = {
        let client = FssClient::from_env();
        if client.is_configured() {
            tracing::info!("✓ FSS OpenAPI client configured");
            Arc::new(client)
        } else {
            tracing::warn!("⚠ FSS_SERVICE_KEY not set - serving bundled demo data");
            Arc::new(StaticPensionSource::new())
        }
    };

    // Chat-completion provider
    let provider = Arc::new(OpenAiProvider::from_env());
    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Chat-completion provider reachable"),
        _ => {
            tracing::warn!("⚠ Chat provider not reachable - consultant endpoints will fail");
            tracing::warn!("  Set OPENAI_API_KEY (and optionally OPENAI_BASE_URL) in .env");
        }
    }

    // Consultant configuration (model chain + policy constants)
    let config = ConsultantConfig::from_env();
    tracing::info!(
        "Model chain: {}",
        config.chain.candidates().collect::<Vec<_>>().join(" -> ")
    );

    // Register the FSS tool set
    let mut tools = ToolRegistry::new();
    svckit::register_all(&mut tools, source.clone(), config.policy.clone());

    tracing::info!("Registered {} tools:", tools.len());
    for schema in tools.schemas() {
        tracing::info!("  • {}", schema.name);
    }

    let consultant = Arc::new(PensionConsultant::new(
        source.clone(),
        provider.clone(),
        config,
    ));

    // Build application state
    let state = AppState {
        source,
        provider,
        tools: Arc::new(tools),
        consultant,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health
        .route("/health", get(health_check))
        // Dashboard data
        .route("/api/market-summary", get(market_summary))
        .route("/api/low-fee-products", get(low_fee_products))
        .route("/api/company-ranking", get(company_ranking))
        .route("/api/pension-statistics", get(pension_statistics))
        .route("/api/custom-fee-comparison", get(custom_fee_comparison))
        .route("/api/products/search", get(search_products))
        // Recommendation
        .route("/api/recommendation", post(recommendation))
        .route(
            "/api/recommendation/personalized",
            post(personalized_recommendation),
        )
        .route("/api/retirement-scenario", post(retirement_scenario))
        // Chat
        .route("/api/chat", post(chat))
        .route("/api/chat/clear", post(clear_chat))
        // Tool protocol
        .route("/api/tools", get(list_tools))
        .route("/api/tools/call", post(call_tool))
        // Static dashboard files
        .nest_service("/", tower_http::services::ServeDir::new("static"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 pension-server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                      - Health check");
    tracing::info!("  GET  /api/market-summary          - Market scalars + statistics");
    tracing::info!("  GET  /api/low-fee-products        - Fee ranking (limit=)");
    tracing::info!("  GET  /api/company-ranking         - Company ranking (area_code=)");
    tracing::info!("  GET  /api/pension-statistics      - Reserve statistics");
    tracing::info!("  GET  /api/custom-fee-comparison   - Custom fees (sys_type/term/reserve)");
    tracing::info!("  GET  /api/products/search         - Product search");
    tracing::info!("  POST /api/recommendation          - Rule-based recommendation");
    tracing::info!("  POST /api/recommendation/personalized - LLM recommendation");
    tracing::info!("  POST /api/retirement-scenario     - Scenario analysis");
    tracing::info!("  POST /api/chat                    - Consultant chat");
    tracing::info!("  POST /api/chat/clear              - Clear chat history");
    tracing::info!("  GET  /api/tools                   - Tool schemas");
    tracing::info!("  POST /api/tools/call              - Invoke a tool");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
