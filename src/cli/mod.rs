//! CLI module
//!
//! This module provides the command-line interface for sql-chat: the
//! credential prompt, the REPL and its command handlers.

pub mod command_menu;
pub mod commands;
pub mod credential;
pub mod repl;

// Re-exports
pub use credential::obtain_credential;
pub use repl::Repl;
