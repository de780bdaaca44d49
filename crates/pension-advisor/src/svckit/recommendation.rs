//! Recommendation Tool
//!
//! Exposes the rule-based recommendation engine over the tool protocol.
//! Purely computational - no upstream fetch, no LLM.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;

use agent_core::{
    tool::ParameterSchema, AgentError, Result as CoreResult, Tool, ToolCall, ToolResult,
    ToolSchema,
};

use crate::recommend::{recommend, PolicyConfig, RiskPreference, UserProfile};

/// Rule-based pension recommendation
pub struct RecommendationTool {
    policy: PolicyConfig,
}

impl RecommendationTool {
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Tool for RecommendationTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "pension_recommendation".into(),
            description: "Generate a pension strategy recommendation (allocation, tax benefit, action items) for a user profile.".into(),
            parameters: vec![
                ParameterSchema {
                    name: "user_age".into(),
                    param_type: "integer".into(),
                    description: "Age in years".into(),
                    required: true,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "monthly_income".into(),
                    param_type: "integer".into(),
                    description: "Monthly income in 10,000 KRW".into(),
                    required: true,
                    enum_values: None,
                },
                ParameterSchema::optional_string("risk_preference", "Risk preference")
                    .with_enum(vec![
                        json!("conservative"),
                        json!("moderate"),
                        json!("aggressive"),
                    ])
                    .required(),
                ParameterSchema {
                    name: "target_retirement_age".into(),
                    param_type: "integer".into(),
                    description: "Target retirement age (default 65)".into(),
                    required: false,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "current_pension_amount".into(),
                    param_type: "integer".into(),
                    description: "Accumulated pension amount in 10,000 KRW (default 0)".into(),
                    required: false,
                    enum_values: None,
                },
            ],
            category: Some("recommendation".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let age = call
            .int_arg("user_age")
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| AgentError::ToolValidation("user_age must be a positive integer".into()))?;
        let income = call
            .int_arg("monthly_income")
            .ok_or_else(|| AgentError::ToolValidation("monthly_income must be a number".into()))?;

        let profile = UserProfile {
            age,
            monthly_income: Decimal::from(income),
            // Unknown strings fall back to moderate - the engine's documented default
            risk_preference: RiskPreference::parse(call.str_arg("risk_preference").unwrap_or("")),
            target_retirement_age: call
                .int_arg("target_retirement_age")
                .and_then(|v| u32::try_from(v).ok()),
            current_pension_amount: call.int_arg("current_pension_amount").map(Decimal::from),
        };

        if let Err(e) = profile.validate() {
            return Ok(ToolResult::failure("pension_recommendation", e.to_string()));
        }

        let recommendation = recommend(&profile, &self.policy);

        Ok(ToolResult::success(
            "pension_recommendation",
            recommendation.strategy.clone(),
        )
        .with_data(json!({
            "profile": profile,
            "recommendation": recommendation,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(age: i64, income: i64, preference: &str) -> ToolCall {
        ToolCall::new("pension_recommendation")
            .with_arg("user_age", json!(age))
            .with_arg("monthly_income", json!(income))
            .with_arg("risk_preference", json!(preference))
    }

    #[tokio::test]
    async fn test_recommendation_payload() {
        let tool = RecommendationTool::new(PolicyConfig::default());
        let result = tool.execute(&call(30, 400, "conservative")).await.unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["recommendation"]["allocation"]["equity"], 40);
        assert_eq!(data["recommendation"]["strategy"], "Long-term growth strategy");
    }

    #[tokio::test]
    async fn test_unknown_preference_defaults_to_moderate() {
        let tool = RecommendationTool::new(PolicyConfig::default());
        let result = tool.execute(&call(40, 300, "reckless")).await.unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["profile"]["risk_preference"], "moderate");
        assert_eq!(data["recommendation"]["allocation"]["equity"], 40);
    }

    #[tokio::test]
    async fn test_invalid_age_is_reported() {
        let tool = RecommendationTool::new(PolicyConfig::default());
        let result = tool.execute(&call(0, 300, "moderate")).await.unwrap();

        assert!(!result.success);
        assert!(result.output.contains("age"));
    }
}
