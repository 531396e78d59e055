//! Schema data structures
//!
//! This module defines the data structures describing the store's tables,
//! columns and foreign keys, and how they are rendered for LLM prompts.

use std::collections::BTreeMap;

/// Foreign key reference information
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyReference {
    /// Referenced table name
    pub table: String,
    /// Referenced column name
    pub column: String,
}

/// Represents a column in a table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared type (e.g. "INTEGER", "TEXT", "REAL")
    pub data_type: String,
    /// Whether the column is nullable
    pub nullable: bool,
    /// Whether this column is part of the primary key
    pub is_primary_key: bool,
    /// Referenced column, if this is a foreign key
    pub references: Option<ForeignKeyReference>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            is_primary_key: false,
            references: None,
        }
    }

    pub fn is_foreign_key(&self) -> bool {
        self.references.is_some()
    }
}

/// Represents a database table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Columns in declaration order
    pub columns: Vec<Column>,
    /// Primary key columns (ordered)
    pub primary_keys: Vec<String>,
}

impl Table {
    /// Create a new table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
        }
    }

    /// Add a column to the table
    pub fn add_column(&mut self, column: Column) {
        if column.is_primary_key {
            self.primary_keys.push(column.name.clone());
        }
        self.columns.push(column);
    }

    /// Get a column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Represents a relationship between two tables
#[derive(Debug, Clone, PartialEq)]
pub struct TableRelationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

/// Complete schema index of the store
#[derive(Debug, Clone)]
pub struct SchemaIndex {
    /// Tables indexed by name
    pub tables: BTreeMap<String, Table>,
    /// Foreign-key relationships between tables
    pub relationships: Vec<TableRelationship>,
}

impl SchemaIndex {
    /// Create a new schema index
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
            relationships: Vec::new(),
        }
    }

    /// Add a table, recording its foreign keys as relationships
    pub fn add_table(&mut self, table: Table) {
        for column in &table.columns {
            if let Some(ref fk) = column.references {
                self.relationships.push(TableRelationship {
                    from_table: table.name.clone(),
                    from_column: column.name.clone(),
                    to_table: fk.table.clone(),
                    to_column: fk.column.clone(),
                });
            }
        }
        self.tables.insert(table.name.clone(), table);
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Get all table names
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|k| k.as_str()).collect()
    }

    /// Generate a concise schema summary for LLM
    ///
    /// One line per table with typed columns, then the relationships.
    pub fn format_summary_for_llm(&self) -> String {
        let mut result = String::from("Tables:\n");

        for (name, table) in &self.tables {
            let column_info: Vec<String> = table
                .columns
                .iter()
                .map(|c| {
                    let mut info = format!("{}: {}", c.name, c.data_type);
                    if c.is_primary_key {
                        info = format!("[PK] {}", info);
                    }
                    if c.is_foreign_key() {
                        info = format!("[FK] {}", info);
                    }
                    info
                })
                .collect();

            result.push_str(&format!("  {} ({})\n", name, column_info.join(", ")));
        }

        if !self.relationships.is_empty() {
            result.push_str("\nRelationships:\n");
            for rel in &self.relationships {
                result.push_str(&format!(
                    "  {}.{} -> {}.{}\n",
                    rel.from_table, rel.from_column, rel.to_table, rel.to_column
                ));
            }
        }

        result
    }
}

impl Default for SchemaIndex {
    fn default() -> Self {
        Self::new()
    }
}
