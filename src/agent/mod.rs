//! Natural-language query agent
//!
//! `build` wires the seeded store and the OpenAI provider into a
//! [`SqlAgent`]; the REPL only sees the [`QueryAgent`] trait.

pub mod executor;
pub mod react;
pub mod toolkit;

use crate::config::{Credential, Settings};
use crate::database::Database;
use crate::error::Result;
use crate::llm::providers::openai::OpenAIProvider;
use crate::llm::ProviderConfig;
use async_trait::async_trait;

pub use executor::{AgentRun, AgentSettings, SqlAgent};
pub use toolkit::SqlToolkit;

/// Anything that can answer a question about the store
#[async_trait]
pub trait QueryAgent: Send + Sync {
    /// Answer one question; blank questions are rejected
    async fn ask(&self, question: &str) -> Result<String>;
}

/// Build the agent, checking the credential with the provider first
pub async fn build(
    database: Database,
    credential: &Credential,
    settings: &Settings,
) -> Result<SqlAgent> {
    let config = ProviderConfig::from_settings(credential.clone(), settings);
    let provider = OpenAIProvider::new(config)?;
    tracing::debug!(model = provider.model(), base_url = %settings.base_url, "building agent");

    SqlAgent::build(database, Box::new(provider), AgentSettings::from(settings)).await
}
