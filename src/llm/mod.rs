//! LLM integration module
//!
//! The provider seam plus the OpenAI-compatible implementation.

pub mod client;
pub mod provider;

pub mod providers {
    pub mod openai;
}

pub use provider::{
    Completion, LLMProvider, Message, ProviderConfig, Role, SamplingParams, TokenUsage,
};
