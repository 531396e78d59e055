//! Chat model seam
//!
//! The agent talks to `dyn LLMProvider` only. A provider turns a list of
//! role-tagged messages into one completion and can check its credential
//! before the first question is asked.

use crate::config::storage::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::config::{Credential, Settings};
use crate::error::{Result, SqlChatError};
use async_trait::async_trait;

/// Who a prompt message speaks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

impl Role {
    /// Wire name used by chat-completion APIs
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Token accounting reported with a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt: u32,
    pub completion: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt + self.completion
    }
}

/// Text produced by one model call
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub model: Option<String>,
    /// e.g. "stop" when a stop sequence cut the output
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl Completion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: None,
            finish_reason: None,
            usage: None,
        }
    }
}

/// Sampling controls for one call
///
/// Temperature defaults to zero so the same question replays the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Output is cut before the first occurrence of any of these
    pub stop: Vec<String>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.0,
            stop: Vec::new(),
        }
    }
}

impl SamplingParams {
    pub fn with_stop<I, S>(mut self, stops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = stops.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Run one chat completion
    async fn generate(&self, messages: &[Message], params: &SamplingParams) -> Result<Completion>;

    /// Confirm the provider accepts the configured credential
    ///
    /// The default only checks that a key is present.
    async fn verify_credentials(&self) -> Result<()> {
        self.validate_config()
    }

    fn provider_name(&self) -> &str;

    fn has_api_key(&self) -> bool;

    fn validate_config(&self) -> Result<()> {
        if !self.has_api_key() {
            return Err(SqlChatError::Authentication {
                provider: self.provider_name().to_string(),
                message: "no API key configured".to_string(),
            });
        }
        Ok(())
    }
}

/// Where and how to reach a chat-completions endpoint
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub credential: Credential,
    /// API root, without trailing slash
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Default endpoint and model for a credential
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
        }
    }

    /// Endpoint, model and timeout taken from the loaded settings
    pub fn from_settings(credential: Credential, settings: &Settings) -> Self {
        Self {
            credential,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }
}
