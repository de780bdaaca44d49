//! # agent-runtime
//!
//! Concrete `LlmProvider` implementations. The only backend currently
//! shipped is `OpenAiProvider`, which talks to any OpenAI-compatible
//! chat-completions endpoint.

pub mod openai;

pub use openai::{OpenAiConfig, OpenAiProvider};
