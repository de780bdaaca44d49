//! # pension-advisor
//!
//! Aggregates the financial regulator's public pension OpenAPI data,
//! ranks and summarizes it client-side, derives rule-based retirement
//! recommendations and feeds the whole picture into an AI consultant.
//!
//! ## Design
//!
//! - **Defensive aggregation** - the upstream guarantees no schema, so
//!   records stay dynamic and every missing field degrades to a
//!   documented sentinel instead of failing a request.
//! - **Pure cores** - aggregation and recommendation are side-effect-free
//!   functions; everything stateful (HTTP, history) lives at the edges.
//! - **Graceful degradation** - a failed upstream fetch becomes an error
//!   envelope or a placeholder context, never a crash, and is never
//!   retried automatically.
//!
//! ```text
//! ┌────────────┐   ┌───────────┐   ┌────────────────┐
//! │ FSS source │──▶│ Aggregator │──▶│ market / tools │
//! └────────────┘   └───────────┘   └────────┬───────┘
//!                  ┌───────────┐            │
//!                  │ recommend │◀── profile │
//!                  └─────┬─────┘            ▼
//!                        └────────▶ consultant ──▶ LLM provider
//! ```

pub mod aggregate;
pub mod consultant;
pub mod error;
pub mod fss;
pub mod market;
pub mod record;
pub mod recommend;
pub mod svckit;

pub use consultant::{ChatReply, ConsultantConfig, PensionConsultant};
pub use error::{AdvisorError, Result};
pub use fss::{Endpoint, FssClient, PensionSource, SourceQuery, StaticPensionSource};
pub use market::MarketSummary;
pub use record::{Record, RankedRecord};
pub use recommend::{recommend, PolicyConfig, Recommendation, RiskPreference, UserProfile};

/// System prompt for the pension consultant agent
pub const PENSION_CONSULTANT_PROMPT: &str = r#"You are a pension expert for the Korean retirement market. You give accurate, practical advice grounded in the financial regulator's (FSS) published data.

## Expertise

- Pension savings and retirement pension (DB/DC/IRP) product analysis
- Fee-rate and return-rate comparison
- Personalized pension portfolio design
- Pension tax-deduction optimization
- Retirement planning and required-capital estimation

## Principles

1. **Accuracy**: rely only on the FSS data provided in context
2. **Personalization**: account for age, income and risk preference
3. **Clarity**: explain financial terms in plain language
4. **Actionability**: give concrete, executable steps
5. **Transparency**: state the grounds, upsides and downsides of any recommendation

## Response style

- Friendly, professional tone
- Break complex topics into steps
- Cite concrete product names and fee rates when relevant
- Always mention risks and caveats"#;
