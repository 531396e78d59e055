//! Database handle
//!
//! This module provides a read-only handle over the seeded SQLite store,
//! used by the agent to list tables, describe them, and run queries.

use crate::database::indexer;
use crate::database::schema::SchemaIndex;
use crate::error::{Result, SqlChatError};
use comfy_table::{presets::ASCII_MARKDOWN, Table as TextTable};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use std::fmt;
use std::path::{Path, PathBuf};

/// Number of example rows included in a table description
const SAMPLE_ROWS: usize = 3;

/// Rows returned by a query, rendered as text
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names in select order
    pub columns: Vec<String>,
    /// Each row's values, rendered
    pub rows: Vec<Vec<String>>,
}

impl QueryResult {
    /// Whether the query produced no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at (row, column name), if present
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c.eq_ignore_ascii_case(column))?;
        self.rows.get(row)?.get(index).map(|v| v.as_str())
    }

    /// Render as a markdown-style text table
    pub fn to_table(&self) -> String {
        if self.rows.is_empty() {
            return "Query returned no rows.".to_string();
        }
        let mut table = TextTable::new();
        table.load_preset(ASCII_MARKDOWN);
        table.set_header(self.columns.clone());
        for row in &self.rows {
            table.add_row(row.clone());
        }
        table.to_string()
    }

    /// Render as tab-separated lines (header first)
    pub fn to_tsv(&self) -> String {
        let mut lines = vec![self.columns.join("\t")];
        lines.extend(self.rows.iter().map(|row| row.join("\t")));
        lines.join("\n")
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}

/// Read-only handle over the seeded store
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    location: PathBuf,
}

impl Database {
    /// Open the store at `location` for read-only querying
    pub async fn open(location: &Path) -> Result<Self> {
        let location_text = location.display().to_string();
        let options = SqliteConnectOptions::new()
            .filename(location)
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| SqlChatError::db_connection(location_text.clone(), e))?;

        let database = Self {
            pool,
            location: location.to_path_buf(),
        };
        database.test_connection().await?;
        tracing::debug!(location = %location_text, "opened read-only store");
        Ok(database)
    }

    /// Test the connection
    pub async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SqlChatError::db_connection(self.location.display().to_string(), e))?;
        Ok(())
    }

    /// Name of the SQL dialect spoken by this store
    pub fn dialect(&self) -> &'static str {
        "sqlite"
    }

    /// Execute one SQL statement and collect its rows
    pub async fn run(&self, sql: &str) -> Result<QueryResult> {
        let sql = sql.trim();
        tracing::debug!(sql, "running query");

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SqlChatError::query(sql, e))?;

        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rendered = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|index| render_value(row, index))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| SqlChatError::query(sql, e))?;

        Ok(QueryResult {
            columns,
            rows: rendered,
        })
    }

    /// User table names, sorted
    pub async fn table_names(&self) -> Result<Vec<String>> {
        let names: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    /// Match requested names case-insensitively against the store's tables
    ///
    /// Returns the canonical names found and the requested names that were not.
    pub async fn resolve_tables(&self, names: &[&str]) -> Result<(Vec<String>, Vec<String>)> {
        let known = self.table_names().await?;
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            match known.iter().find(|k| k.eq_ignore_ascii_case(name)) {
                Some(table) => found.push(table.clone()),
                None => missing.push(name.to_string()),
            }
        }
        Ok((found, missing))
    }

    /// CREATE statement plus a few sample rows for each table
    pub async fn table_info(&self, tables: &[String]) -> Result<String> {
        let mut sections = Vec::new();
        for table in tables {
            sections.push(self.describe_table(table).await?);
        }
        Ok(sections.join("\n\n"))
    }

    async fn describe_table(&self, table: &str) -> Result<String> {
        let create_sql: Option<(String,)> =
            sqlx::query_as("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_optional(&self.pool)
                .await?;
        let (create_sql,) = create_sql.ok_or_else(|| {
            SqlChatError::query(
                format!("SELECT sql FROM sqlite_master WHERE name = '{}'", table),
                "no such table",
            )
        })?;

        let sample = self
            .run(&format!(
                "SELECT * FROM \"{}\" LIMIT {}",
                table.replace('"', "\"\""),
                SAMPLE_ROWS
            ))
            .await?;

        let sample_text = if sample.is_empty() {
            "(no rows)".to_string()
        } else {
            sample.to_tsv()
        };

        Ok(format!(
            "{}\n\n/*\n{} rows from {} table:\n{}\n*/",
            create_sql.trim(),
            SAMPLE_ROWS,
            table,
            sample_text
        ))
    }

    /// Introspect the store into a schema index
    pub async fn index(&self) -> Result<SchemaIndex> {
        indexer::index_sqlite(&self.pool).await
    }
}

/// Render one value by its runtime storage class
fn render_value(row: &SqliteRow, index: usize) -> Result<String> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok("NULL".to_string());
    }
    let type_name = raw.type_info().name().to_string();

    let rendered = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(index)?.to_string(),
        "REAL" => row.try_get::<f64, _>(index)?.to_string(),
        "BLOB" => format!("<{} bytes>", row.try_get::<Vec<u8>, _>(index)?.len()),
        _ => row.try_get::<String, _>(index)?,
    };
    Ok(rendered)
}
