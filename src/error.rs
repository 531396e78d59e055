//! Error types for sql-chat
//!
//! This module defines the error types used throughout the application.

use thiserror::Error;

/// Result type alias for sql-chat
pub type Result<T> = std::result::Result<T, SqlChatError>;

/// Main error type for sql-chat
#[derive(Error, Debug)]
pub enum SqlChatError {
    /// No API key was entered
    #[error("An OpenAI API key is required to proceed")]
    CredentialMissing,

    /// Bootstrapping the store failed; the run cannot continue
    #[error("Seeding failed while {stage}: {message}")]
    SeedFailure { stage: String, message: String },

    /// The model provider rejected (or never received) the credential
    #[error("Authentication with {provider} failed: {message}")]
    Authentication { provider: String, message: String },

    /// Agent-generated SQL was invalid or failed to execute
    #[error("Query failed: {message}\nSQL: {query}")]
    Query { query: String, message: String },

    /// The model provider was unreachable or answered with something unusable
    #[error("{provider} error{}: {message}", status_suffix(.status))]
    Upstream {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// Blank question submitted
    #[error("Please enter a question.")]
    EmptyQuestion,

    /// A seed record failed validation
    #[error("Invalid {entity} record: {message}")]
    InvalidRecord { entity: &'static str, message: String },

    /// Database connection errors
    #[error("Failed to open database at {location}: {source}")]
    DatabaseConnection {
        location: String,
        #[source]
        source: sqlx::Error,
    },

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP-related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown slash command
    #[error("Unknown command: {0}. Type /help for available commands.")]
    UnknownCommand(String),

    /// Slash command with missing or extra arguments
    #[error("Invalid syntax for {command}. Expected: {expected}")]
    InvalidCommandSyntax { command: String, expected: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {})", code),
        None => String::new(),
    }
}

impl SqlChatError {
    /// Wrap a failure that happened during a named seeding stage
    pub fn seed(stage: impl Into<String>, err: impl std::fmt::Display) -> Self {
        SqlChatError::SeedFailure {
            stage: stage.into(),
            message: err.to_string(),
        }
    }

    /// Wrap a failed agent query together with the SQL that caused it
    pub fn query(query: impl Into<String>, err: impl std::fmt::Display) -> Self {
        SqlChatError::Query {
            query: query.into(),
            message: err.to_string(),
        }
    }

    /// Connection failure for the given store location
    pub fn db_connection(location: impl Into<String>, source: sqlx::Error) -> Self {
        SqlChatError::DatabaseConnection {
            location: location.into(),
            source,
        }
    }

    /// Upstream failure with no HTTP status (network, parse, protocol)
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        SqlChatError::Upstream {
            provider: provider.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Whether the shell handles this error locally instead of surfacing it
    pub fn is_local_prompt(&self) -> bool {
        matches!(
            self,
            SqlChatError::EmptyQuestion | SqlChatError::CredentialMissing
        )
    }
}
