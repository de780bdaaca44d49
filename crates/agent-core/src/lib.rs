//! # agent-core
//!
//! Provider-agnostic chat framework used by the pension advisor.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Consumer (advisor)                      │
//! │  ┌──────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │ HistoryStore │  │    Tool     │  │   LlmProvider       │  │
//! │  │  (per user)  │  │   Registry  │  │   + ModelChain      │  │
//! │  └──────────────┘  └─────────────┘  └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait decouples consumers from any concrete
//! chat-completion backend; `ModelChain` layers an ordered model fallback
//! on top of a single provider so a missing model id degrades to the next
//! candidate instead of failing the request.

pub mod error;
pub mod history;
pub mod message;
pub mod provider;
pub mod tool;

pub use error::{AgentError, Result};
pub use history::HistoryStore;
pub use message::{Message, Role};
pub use provider::{
    complete_with_fallback, Completion, GenerationOptions, LlmProvider, ModelChain, TokenUsage,
};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
