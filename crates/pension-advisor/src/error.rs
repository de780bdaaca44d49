//! Error Types for the Pension Advisor

use thiserror::Error;

use crate::fss::SourceError;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Upstream record source failed (network, status, decode)
    #[error("Record source error: {0}")]
    Source(#[from] SourceError),

    /// Chat-completion layer failed
    #[error("Agent error: {0}")]
    Agent(#[from] agent_core::AgentError),

    /// Caller-supplied profile cannot be scored
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Convert to a user-facing message for response envelopes
    pub fn user_message(&self) -> String {
        match self {
            AdvisorError::Source(_) => {
                "Pension market data is currently unavailable. Please try again.".into()
            }
            AdvisorError::Agent(e) => e.user_message(),
            AdvisorError::InvalidProfile(msg) => format!("Invalid profile: {}", msg),
            AdvisorError::Serialization(_) => "An unexpected error occurred.".into(),
        }
    }
}
