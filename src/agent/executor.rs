//! Agent executor
//!
//! Drives the ReAct loop: ask the model for the next step, run the chosen
//! tool, feed the observation back, and stop on a final answer or when the
//! step budget runs out.

use crate::agent::react::{self, AgentAction, AgentStep};
use crate::agent::toolkit::SqlToolkit;
use crate::agent::QueryAgent;
use crate::config::Settings;
use crate::database::Database;
use crate::error::{Result, SqlChatError};
use crate::llm::{LLMProvider, Message, SamplingParams};
use async_trait::async_trait;

/// Loop limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    pub max_iterations: usize,
    pub top_k: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            top_k: 10,
        }
    }
}

impl From<&Settings> for AgentSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            max_iterations: settings.max_iterations,
            top_k: settings.top_k,
        }
    }
}

/// Outcome of one question
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRun {
    pub answer: String,
    pub steps: Vec<AgentAction>,
    /// True when the answer is the iteration-limit message
    pub stopped_early: bool,
}

/// SQL question-answering agent over one store and one provider
pub struct SqlAgent {
    provider: Box<dyn LLMProvider>,
    toolkit: SqlToolkit,
    schema_summary: String,
    settings: AgentSettings,
}

impl SqlAgent {
    /// Verify the credential with the provider and index the store
    pub async fn build(
        database: Database,
        provider: Box<dyn LLMProvider>,
        settings: AgentSettings,
    ) -> Result<Self> {
        provider.verify_credentials().await?;

        let schema = database.index().await?;
        tracing::info!(
            provider = provider.provider_name(),
            tables = schema.tables.len(),
            "agent ready"
        );

        Ok(Self {
            provider,
            schema_summary: schema.format_summary_for_llm(),
            toolkit: SqlToolkit::new(database),
            settings,
        })
    }

    /// Compact schema text included in every prompt
    pub fn schema_summary(&self) -> &str {
        &self.schema_summary
    }

    /// Answer a question, keeping the trail of tool calls
    pub async fn run(&self, question: &str) -> Result<AgentRun> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SqlChatError::EmptyQuestion);
        }

        let system = react::system_prompt(
            self.toolkit.dialect(),
            self.settings.top_k,
            &self.schema_summary,
            SqlToolkit::specs(),
        );
        let params = SamplingParams::default().with_stop(react::STOP_SEQUENCES.iter().copied());

        let mut steps: Vec<AgentAction> = Vec::new();

        for iteration in 1..=self.settings.max_iterations {
            let messages = vec![
                Message::system(system.clone()),
                Message::user(react::user_prompt(question, &steps)),
            ];
            let response = self.provider.generate(&messages, &params).await?;

            match react::parse_output(&response.content)? {
                AgentStep::Finish { answer, .. } => {
                    tracing::debug!(iteration, "agent finished");
                    return Ok(AgentRun {
                        answer,
                        steps,
                        stopped_early: false,
                    });
                }
                AgentStep::Action { tool, input, log } => {
                    tracing::debug!(iteration, tool = %tool, input = %input, "agent action");
                    let observation = self
                        .toolkit
                        .run(&tool, &input, self.provider.as_ref())
                        .await?;
                    tracing::debug!(iteration, observation = %observation, "observation");
                    steps.push(AgentAction {
                        tool,
                        input,
                        log,
                        observation,
                    });
                }
            }
        }

        tracing::warn!(
            max_iterations = self.settings.max_iterations,
            "agent hit its step limit"
        );
        Ok(AgentRun {
            answer: react::ITERATION_LIMIT_ANSWER.to_string(),
            steps,
            stopped_early: true,
        })
    }
}

#[async_trait]
impl QueryAgent for SqlAgent {
    async fn ask(&self, question: &str) -> Result<String> {
        Ok(self.run(question).await?.answer)
    }
}
