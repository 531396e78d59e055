//! sql-chat Library
//!
//! Seeds a small supplier/product/inventory SQLite store and answers
//! natural-language questions about it through an LLM SQL agent.
//! The main binary is in src/main.rs.

pub mod agent;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod llm;
