//! Command handlers for CLI
//!
//! This module parses REPL input into `/` commands or questions and runs
//! them against a [`QueryAgent`].

use crate::agent::QueryAgent;
use crate::error::{Result, SqlChatError};

/// Command types
#[derive(Debug, Clone, PartialEq)]
pub enum CommandType {
    /// Print the schema summary
    Tables,
    /// Show help message
    Help,
    /// Exit the application
    Quit,
    /// Natural language question
    Query { text: String },
}

/// Parsed command
#[derive(Debug, Clone)]
pub struct Command {
    /// The type of command
    pub command_type: CommandType,
}

impl Command {
    /// Parse a command from user input
    ///
    /// Blank input is an [`SqlChatError::EmptyQuestion`].
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SqlChatError::EmptyQuestion);
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Ok(Command {
                command_type: CommandType::Query {
                    text: input.to_string(),
                },
            });
        };

        let mut parts = rest.split_whitespace();
        let cmd = format!("/{}", parts.next().unwrap_or_default());
        let has_args = parts.next().is_some();

        let command_type = match cmd.as_str() {
            "/tables" => CommandType::Tables,
            "/help" => CommandType::Help,
            "/quit" | "/exit" => CommandType::Quit,
            _ => return Err(SqlChatError::UnknownCommand(cmd)),
        };

        if has_args {
            return Err(SqlChatError::InvalidCommandSyntax {
                expected: cmd.clone(),
                command: cmd,
            });
        }

        Ok(Command { command_type })
    }
}

/// Help text shown by `/help`
pub const HELP_TEXT: &str = r#"
sql-chat Commands

  /tables            Show the tables and columns of the store
  /help              Show this help message
  /quit, /exit       Exit sql-chat
  /                  Open the command menu

Questions:
  Any text without a / prefix is answered by the agent.

Examples:
  How many suppliers are there?
  What is the price of the iPhone SE?
  Which products are below their minimum required stock?
"#;

/// Handle a command and return the message to print
pub async fn handle_command(
    command: &Command,
    agent: &dyn QueryAgent,
    schema_summary: &str,
) -> Result<String> {
    match &command.command_type {
        CommandType::Tables => Ok(schema_summary.trim_end().to_string()),
        CommandType::Help => Ok(HELP_TEXT.to_string()),
        CommandType::Quit => Ok("Goodbye!".to_string()),
        CommandType::Query { text } => {
            let answer = agent.ask(text).await?;
            Ok(format!("Response:\n{}", answer))
        }
    }
}

/// What the REPL should do after one line of input
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Print the message and keep reading
    Continue(String),
    /// Print the message and stop
    Quit(String),
}

/// Parse and run one line of input
///
/// Errors are turned into printable messages; nothing here ends the REPL
/// except `/quit`.
pub async fn handle_input(input: &str, agent: &dyn QueryAgent, schema_summary: &str) -> Outcome {
    let command = match Command::parse(input) {
        Ok(command) => command,
        Err(e) => return Outcome::Continue(format_error(&e)),
    };

    match handle_command(&command, agent, schema_summary).await {
        Ok(message) if command.command_type == CommandType::Quit => Outcome::Quit(message),
        Ok(message) => Outcome::Continue(message),
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            Outcome::Continue(format_error(&e))
        }
    }
}

/// Format an error for display
pub fn format_error(error: &SqlChatError) -> String {
    if error.is_local_prompt() {
        error.to_string()
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts questions and answers with a fixed reply
    struct CountingAgent {
        calls: AtomicUsize,
        reply: Option<String>,
    }

    impl CountingAgent {
        fn answering(reply: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Some(reply.to_string()),
            }
        }

        fn failing_query() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: None,
            }
        }
    }

    #[async_trait]
    impl QueryAgent for CountingAgent {
        async fn ask(&self, _question: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or_else(|| {
                SqlChatError::query("SELECT * FROM CUSTOMERS", "no such table: CUSTOMERS")
            })
        }
    }

    #[test]
    fn test_parse_slash_commands() {
        assert_eq!(Command::parse("/tables").unwrap().command_type, CommandType::Tables);
        assert_eq!(Command::parse("/help").unwrap().command_type, CommandType::Help);
        assert_eq!(Command::parse("/quit").unwrap().command_type, CommandType::Quit);
        assert_eq!(Command::parse("  /exit ").unwrap().command_type, CommandType::Quit);
    }

    #[test]
    fn test_parse_query() {
        let cmd = Command::parse("  How many suppliers are there? ").unwrap();
        assert_eq!(
            cmd.command_type,
            CommandType::Query {
                text: "How many suppliers are there?".to_string()
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Command::parse("   "), Err(SqlChatError::EmptyQuestion)));
        assert!(matches!(
            Command::parse("/connect sqlite://x.db"),
            Err(SqlChatError::UnknownCommand(cmd)) if cmd == "/connect"
        ));
        assert!(matches!(
            Command::parse("/tables PRODUCTS"),
            Err(SqlChatError::InvalidCommandSyntax { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_question_never_asks() {
        let agent = CountingAgent::answering("unused");
        let outcome = handle_input("   ", &agent, "").await;

        assert_eq!(outcome, Outcome::Continue("Please enter a question.".to_string()));
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_question_prints_response() {
        let agent = CountingAgent::answering("There are 5 suppliers.");
        let outcome = handle_input("How many suppliers are there?", &agent, "").await;

        assert_eq!(
            outcome,
            Outcome::Continue("Response:\nThere are 5 suppliers.".to_string())
        );
        assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_agent_error_is_printed_and_loop_continues() {
        let agent = CountingAgent::failing_query();
        match handle_input("List the customers", &agent, "").await {
            Outcome::Continue(message) => {
                assert!(message.starts_with("Error: Query failed: no such table: CUSTOMERS"))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tables_and_quit() {
        let agent = CountingAgent::answering("unused");
        let summary = "Tables:\n  SUPPLIERS ([PK] SUPPLIER_ID: INTEGER)\n";

        assert_eq!(
            handle_input("/tables", &agent, summary).await,
            Outcome::Continue("Tables:\n  SUPPLIERS ([PK] SUPPLIER_ID: INTEGER)".to_string())
        );
        assert_eq!(
            handle_input("/quit", &agent, summary).await,
            Outcome::Quit("Goodbye!".to_string())
        );
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
    }
}
