//! AI Pension Consultant
//!
//! Thin glue between the market analysis layer and the chat-completion
//! provider: assembles a system prompt from the current market snapshot
//! plus the user profile, attaches a bounded history window, runs the
//! ordered model-fallback chain and records the exchange only after a
//! successful completion.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use agent_core::{
    complete_with_fallback, GenerationOptions, HistoryStore, LlmProvider, Message, ModelChain,
    TokenUsage,
};

use crate::error::Result;
use crate::fss::PensionSource;
use crate::market::{self, ProductRow};
use crate::recommend::{recommend, PolicyConfig, Recommendation, UserProfile};
use crate::PENSION_CONSULTANT_PROMPT;

/// Fixed context substituted when the upstream fetch fails. Required
/// behavior: the chat keeps working without live data.
const FALLBACK_MARKET_CONTEXT: &str = "\n## Current pension market\n\
    Market data could not be loaded right now; continue with general \
    pension guidance and say so when asked about live figures.\n";

/// Consultant configuration
#[derive(Clone, Debug)]
pub struct ConsultantConfig {
    /// Ordered model candidates
    pub chain: ModelChain,

    /// Generation parameters shared by all consultant calls
    pub generation: GenerationOptions,

    /// History messages included per chat call
    pub history_window: usize,

    /// Policy constants for the rule-based engine
    pub policy: PolicyConfig,
}

impl Default for ConsultantConfig {
    fn default() -> Self {
        Self {
            chain: ModelChain::default(),
            generation: GenerationOptions::default(),
            history_window: 10,
            policy: PolicyConfig::default(),
        }
    }
}

impl ConsultantConfig {
    pub fn from_env() -> Self {
        Self {
            chain: ModelChain::from_env(),
            policy: PolicyConfig::from_env(),
            ..Default::default()
        }
    }
}

/// A successful chat turn
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
    pub timestamp: DateTime<Utc>,
}

/// Personalized recommendation: rule-engine output plus LLM narrative
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationReport {
    pub narrative: String,
    pub rule_based: Recommendation,
    pub based_on_products: Vec<ProductRow>,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

/// Retirement scenario inputs, 10,000-KRW units where monetary
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetirementScenario {
    /// Desired monthly living cost after retirement
    #[serde(default = "default_living_cost")]
    pub monthly_living_cost: Decimal,

    /// Additional monthly savings outside pension accounts
    #[serde(default)]
    pub additional_savings: Decimal,

    /// Assumed life expectancy in years
    #[serde(default = "default_life_expectancy")]
    pub life_expectancy: u32,
}

fn default_living_cost() -> Decimal {
    dec!(300)
}
fn default_life_expectancy() -> u32 {
    85
}

impl Default for RetirementScenario {
    fn default() -> Self {
        Self {
            monthly_living_cost: default_living_cost(),
            additional_savings: Decimal::ZERO,
            life_expectancy: default_life_expectancy(),
        }
    }
}

/// Scenario analysis result
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub analysis: String,
    pub scenario: RetirementScenario,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

/// The consultant service
pub struct PensionConsultant {
    source: Arc<dyn PensionSource>,
    provider: Arc<dyn LlmProvider>,
    history: HistoryStore,
    config: ConsultantConfig,
}

impl PensionConsultant {
    pub fn new(
        source: Arc<dyn PensionSource>,
        provider: Arc<dyn LlmProvider>,
        config: ConsultantConfig,
    ) -> Self {
        Self {
            source,
            provider,
            history: HistoryStore::new(),
            config,
        }
    }

    /// Rule-based recommendation without any LLM involvement
    pub fn rule_based_recommendation(&self, profile: &UserProfile) -> Result<Recommendation> {
        profile.validate()?;
        Ok(recommend(profile, &self.config.policy))
    }

    /// Chat with bounded history. History is appended only after the
    /// completion succeeds, so a failed call never leaves a partial
    /// exchange behind.
    pub async fn chat(
        &self,
        user_id: &str,
        message: &str,
        profile: Option<&UserProfile>,
    ) -> Result<ChatReply> {
        let market_context = match self.build_market_context().await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(error = %e, "Market context unavailable, using placeholder");
                FALLBACK_MARKET_CONTEXT.to_string()
            }
        };

        let mut system = String::from(PENSION_CONSULTANT_PROMPT);
        system.push_str(&market_context);
        if let Some(p) = profile {
            system.push_str(&profile_context(p));
        }

        let mut messages = vec![Message::system(system)];
        messages.extend(self.history.window(user_id, self.config.history_window));
        messages.push(Message::user(message));

        let completion = complete_with_fallback(
            self.provider.as_ref(),
            &self.config.chain,
            &messages,
            &self.config.generation,
        )
        .await?;

        self.history.append_exchange(
            user_id,
            Message::user(message),
            Message::assistant(&completion.content),
        );

        Ok(ChatReply {
            response: completion.content,
            model: completion.model,
            usage: completion.usage,
            timestamp: Utc::now(),
        })
    }

    /// Personalized product recommendation grounded in the live low-fee
    /// ranking plus the rule engine's allocation
    pub async fn personalized_recommendation(
        &self,
        profile: &UserProfile,
    ) -> Result<RecommendationReport> {
        let rule_based = self.rule_based_recommendation(profile)?;
        let products = market::low_fee_products(self.source.as_ref(), 10)
            .await
            .unwrap_or_default();

        let mut prompt = String::from("Recommend optimal pension products for this customer:\n\n");
        prompt.push_str(&profile_context(profile));
        push_allocation(&mut prompt, &rule_based);
        push_products(&mut prompt, &products, 10);
        prompt.push_str(
            "\nRespond with: 1) three concrete products (name, company, fee rate), \
             2) the reasoning, 3) an estimated retirement fund, 4) caveats. \
             Prefer the lowest-fee products consistent with the customer's risk \
             preference and age.",
        );

        let messages = vec![
            Message::system(PENSION_CONSULTANT_PROMPT),
            Message::user(prompt),
        ];

        let completion = complete_with_fallback(
            self.provider.as_ref(),
            &self.config.chain,
            &messages,
            &self.config.generation,
        )
        .await?;

        Ok(RecommendationReport {
            narrative: completion.content,
            rule_based,
            based_on_products: products.into_iter().take(5).collect(),
            model: completion.model,
            timestamp: Utc::now(),
        })
    }

    /// Analyze a retirement scenario for a profile
    pub async fn retirement_scenario(
        &self,
        profile: &UserProfile,
        scenario: RetirementScenario,
    ) -> Result<ScenarioReport> {
        profile.validate()?;

        let mut prompt = String::from("Analyze this retirement scenario:\n\n");
        prompt.push_str(&profile_context(profile));
        let _ = writeln!(
            prompt,
            "\n## Scenario\n\
             - Desired monthly living cost after retirement: {} (10,000 KRW)\n\
             - Additional monthly savings: {} (10,000 KRW)\n\
             - Assumed life expectancy: {} years\n\n\
             Assess: 1) whether the current plan reaches the goal, \
             2) any shortfall and the required extra savings, \
             3) concrete steps, 4) risks and alternatives. \
             Show the arithmetic behind every figure.",
            scenario.monthly_living_cost, scenario.additional_savings, scenario.life_expectancy
        );

        let messages = vec![
            Message::system(PENSION_CONSULTANT_PROMPT),
            Message::user(prompt),
        ];

        let completion = complete_with_fallback(
            self.provider.as_ref(),
            &self.config.chain,
            &messages,
            &self.config.generation,
        )
        .await?;

        Ok(ScenarioReport {
            analysis: completion.content,
            scenario,
            model: completion.model,
            timestamp: Utc::now(),
        })
    }

    /// Drop all conversation history for a user
    pub fn clear_history(&self, user_id: &str) {
        self.history.clear(user_id);
    }

    /// Message count currently retained for a user
    pub fn history_len(&self, user_id: &str) -> usize {
        self.history.len(user_id)
    }

    /// Assemble the market snapshot section of the system prompt
    async fn build_market_context(&self) -> Result<String> {
        let summary = market::market_summary(self.source.as_ref()).await;
        let low_fee = market::low_fee_products(self.source.as_ref(), 5).await?;
        let companies = market::company_ranking(self.source.as_ref(), None).await?;

        let mut context = String::from("\n## Current pension market\n\n");
        let _ = writeln!(
            context,
            "- Products on sale: {}\n- Average fee rate: {}%\n- Average return rate: {}%\n- Lowest fee rate: {}%",
            summary.total_products,
            summary.average_fee_rate,
            summary.average_earn_rate,
            summary.lowest_fee_rate
        );

        context.push_str("\nLowest-fee products:\n");
        for row in &low_fee {
            let _ = writeln!(
                context,
                "{}. {} - {} (fee {}% / return {}%)",
                row.rank, row.company, row.product, row.avg_fee_rate3, row.avg_earn_rate3
            );
        }

        context.push_str("\nCompanies by fee rate:\n");
        for row in companies.iter().take(3) {
            let _ = writeln!(context, "{}. {}: {}%", row.rank, row.company, row.avg_fee_rate3);
        }

        Ok(context)
    }
}

/// Profile block appended to prompts
fn profile_context(profile: &UserProfile) -> String {
    let mut block = String::from("\n## Customer\n");
    let _ = writeln!(
        block,
        "- Age: {}\n- Monthly income: {} (10,000 KRW)\n- Risk preference: {}\n- Target retirement age: {}\n- Accumulated pension: {} (10,000 KRW)",
        profile.age,
        profile.monthly_income,
        profile.risk_preference.as_str(),
        profile.retirement_age(),
        profile.pension_amount()
    );
    block
}

fn push_allocation(prompt: &mut String, recommendation: &Recommendation) {
    let _ = writeln!(
        prompt,
        "\n## Rule-based allocation ({})\n- Equity {}% / Mixed {}% / Stable {}%\n- Expected return: {}",
        recommendation.strategy,
        recommendation.allocation.equity,
        recommendation.allocation.mixed,
        recommendation.allocation.stable,
        recommendation.expected_return
    );
}

fn push_products(prompt: &mut String, products: &[ProductRow], limit: usize) {
    prompt.push_str("\n## Current lowest-fee products\n");
    for row in products.iter().take(limit) {
        let _ = writeln!(
            prompt,
            "{}. {} - {} (fee {}% / return {}%)",
            row.rank, row.company, row.product, row.avg_fee_rate3, row.avg_earn_rate3
        );
    }
}
