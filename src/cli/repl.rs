//! REPL implementation
//!
//! This module implements the interactive question loop for sql-chat.

use crate::agent::QueryAgent;
use crate::cli::command_menu::{self, MenuResult};
use crate::cli::commands::{self, Outcome};
use crate::error::{Result, SqlChatError};
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::Context;
use rustyline::Helper;
use rustyline::{CompletionType, Config, Editor};

const PROMPT: &str = "> ";

/// Completes `/` commands
struct CommandCompleter;

impl CommandCompleter {
    fn candidates(line: &str) -> Vec<String> {
        if !line.starts_with('/') {
            return Vec::new();
        }
        command_menu::menu_items()
            .iter()
            .map(|item| item.name)
            .chain(["/exit"])
            .filter(|cmd| cmd.starts_with(line))
            .map(str::to_string)
            .collect()
    }
}

impl Completer for CommandCompleter {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &Context<'_>,
    ) -> std::result::Result<(usize, Vec<String>), ReadlineError> {
        Ok((0, Self::candidates(line)))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}

/// Interactive question loop
pub struct Repl {
    /// The rustyline editor; history lives only for this session
    editor: Editor<CommandCompleter, DefaultHistory>,
    /// Whether the REPL should continue running
    running: bool,
    agent: Box<dyn QueryAgent>,
    /// Printed by `/tables`
    schema_summary: String,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(agent: Box<dyn QueryAgent>, schema_summary: impl Into<String>) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .auto_add_history(true)
            .build();

        let mut editor = Editor::<CommandCompleter, DefaultHistory>::with_config(config)
            .map_err(|e| {
                SqlChatError::Io(std::io::Error::other(format!(
                    "Failed to initialize editor: {}",
                    e
                )))
            })?;
        editor.set_helper(Some(CommandCompleter));

        Ok(Self {
            editor,
            running: true,
            agent,
            schema_summary: schema_summary.into(),
        })
    }

    /// Run the REPL loop until `/quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        while self.running {
            let Some(line) = self.read_line(None) else {
                continue;
            };

            if line.trim() == "/" {
                let Some(line) = self.pick_from_menu() else {
                    continue;
                };
                self.dispatch(&line).await;
                continue;
            }

            self.dispatch(&line).await;
        }

        Ok(())
    }

    /// Open the command picker and let the user confirm the chosen line
    fn pick_from_menu(&mut self) -> Option<String> {
        match command_menu::show_command_menu() {
            Ok(MenuResult::Command(cmd)) => self.read_line(Some(cmd.as_str())),
            Ok(MenuResult::TextInput) => self.read_line(Some("/")),
            Ok(MenuResult::Cancelled) => {
                println!();
                None
            }
            Err(e) => {
                println!("Error showing menu: {}", e);
                None
            }
        }
    }

    /// Read one line; `None` stops or skips, depending on `running`
    fn read_line(&mut self, initial: Option<&str>) -> Option<String> {
        let read = match initial {
            Some(text) => self.editor.readline_with_initial(PROMPT, (text, "")),
            None => self.editor.readline(PROMPT),
        };

        match read {
            Ok(line) => Some(line),
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                None
            }
            Err(ReadlineError::Eof) => {
                println!();
                self.running = false;
                None
            }
            Err(err) => {
                tracing::error!(error = %err, "readline failed");
                println!("Error: {}", err);
                self.running = false;
                None
            }
        }
    }

    async fn dispatch(&mut self, line: &str) {
        match commands::handle_input(line, self.agent.as_ref(), &self.schema_summary).await {
            Outcome::Continue(message) => println!("{}\n", message),
            Outcome::Quit(message) => {
                println!("{}", message);
                self.running = false;
            }
        }
    }

    fn print_welcome(&self) {
        println!("Ask questions about the suppliers, products and inventory in the store.");
        println!("Type / for available commands, or /help for more information.");
        println!();
    }
}
