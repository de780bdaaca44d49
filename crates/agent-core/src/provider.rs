//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for chat-completion backends so consumers
//! never depend on a concrete API client, plus an ordered model fallback
//! chain layered on top of a single provider.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{complete_with_fallback, GenerationOptions, ModelChain};
//!
//! let chain = ModelChain::from_env();
//! let options = GenerationOptions::default();
//! let completion = complete_with_fallback(&provider, &chain, &messages, &options).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::message::Message;

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier; overridden per attempt by the fallback chain
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Top-p nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1500
}
fn default_top_p() -> f32 {
    0.9
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: ModelChain::default().primary,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if reported by the backend)
    pub usage: Option<TokenUsage>,
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Strategy trait for chat-completion providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion from messages
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion>;

    /// Check if the provider is reachable and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Provider name (for logging)
    fn name(&self) -> &str;
}

/// Ordered list of candidate model identifiers.
///
/// Candidates are tried in sequence by `complete_with_fallback`, stopping
/// at the first success; the last error is surfaced if every candidate
/// fails. This replaces nested per-model error handlers with one loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelChain {
    /// Preferred model identifier
    pub primary: String,

    /// Alternates tried in order when the primary fails
    pub fallbacks: Vec<String>,
}

impl Default for ModelChain {
    fn default() -> Self {
        Self {
            primary: "gpt-4.1-mini".into(),
            fallbacks: vec!["gpt-3.5-turbo".into(), "gpt-3.5-turbo-0125".into()],
        }
    }
}

impl ModelChain {
    pub fn new(primary: impl Into<String>, fallbacks: Vec<String>) -> Self {
        Self {
            primary: primary.into(),
            fallbacks,
        }
    }

    /// Build from `OPENAI_MODEL` and comma-separated `OPENAI_FALLBACK_MODELS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let primary = std::env::var("OPENAI_MODEL").unwrap_or(defaults.primary);
        let fallbacks = std::env::var("OPENAI_FALLBACK_MODELS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(defaults.fallbacks);

        Self { primary, fallbacks }
    }

    /// All candidates in try order
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

/// Try each candidate model in order, returning the first success.
///
/// Each attempt is a fresh call with the candidate's model id substituted
/// into `options`; no attempt is retried. If every candidate fails the
/// last error is wrapped in `AgentError::AllModelsFailed`.
pub async fn complete_with_fallback(
    provider: &dyn LlmProvider,
    chain: &ModelChain,
    messages: &[Message],
    options: &GenerationOptions,
) -> Result<Completion> {
    let mut last_error: Option<AgentError> = None;

    for model in chain.candidates() {
        let attempt = GenerationOptions {
            model: model.to_string(),
            ..options.clone()
        };

        match provider.complete(messages, &attempt).await {
            Ok(completion) => {
                if last_error.is_some() {
                    tracing::warn!(model, "Primary model failed, fallback succeeded");
                }
                return Ok(completion);
            }
            Err(e) => {
                tracing::warn!(model, error = %e, "Model attempt failed");
                last_error = Some(e);
            }
        }
    }

    let last = last_error.unwrap_or_else(|| AgentError::Config("Empty model chain".into()));
    Err(AgentError::AllModelsFailed(Box::new(last)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyProvider {
        /// Number of leading candidates that fail
        fail_first: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for FlakyProvider {
        async fn complete(
            &self,
            _messages: &[Message],
            options: &GenerationOptions,
        ) -> Result<Completion> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(AgentError::Provider(format!(
                    "model {} not found",
                    options.model
                )));
            }
            Ok(Completion {
                content: "ok".into(),
                model: options.model.clone(),
                usage: None,
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn chain() -> ModelChain {
        ModelChain::new("m-primary", vec!["m-fallback-1".into(), "m-fallback-2".into()])
    }

    #[tokio::test]
    async fn test_first_success_stops_chain() {
        let provider = FlakyProvider {
            fail_first: 0,
            calls: AtomicUsize::new(0),
        };
        let result =
            complete_with_fallback(&provider, &chain(), &[], &GenerationOptions::default())
                .await
                .unwrap();

        assert_eq!(result.model, "m-primary");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_on_failure() {
        let provider = FlakyProvider {
            fail_first: 1,
            calls: AtomicUsize::new(0),
        };
        let result =
            complete_with_fallback(&provider, &chain(), &[], &GenerationOptions::default())
                .await
                .unwrap();

        assert_eq!(result.model, "m-fallback-1");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_all_models_failed_surfaces_last_error() {
        let provider = FlakyProvider {
            fail_first: 99,
            calls: AtomicUsize::new(0),
        };
        let err =
            complete_with_fallback(&provider, &chain(), &[], &GenerationOptions::default())
                .await
                .unwrap_err();

        match err {
            AgentError::AllModelsFailed(inner) => {
                assert!(inner.to_string().contains("m-fallback-2"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_chain_from_defaults() {
        let chain = ModelChain::default();
        let candidates: Vec<_> = chain.candidates().collect();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0], "gpt-4.1-mini");
    }
}
