//! Database module
//!
//! This module provides the seed records and dataset, the schema seeder,
//! the read-only store handle, and schema indexing.

pub mod connection;
pub mod fixtures;
pub mod indexer;
pub mod records;
pub mod schema;
pub mod seeder;

// Re-exports
pub use connection::{Database, QueryResult};
pub use records::{Inventory, Product, Supplier};
pub use schema::{Column, ForeignKeyReference, SchemaIndex, Table, TableRelationship};
pub use seeder::{bootstrap, seed, SeedReport};
