//! Schema Indexer
//!
//! Builds a `SchemaIndex` for a SQLite store from `sqlite_master` and the
//! `pragma_table_info` / `pragma_foreign_key_list` table-valued functions.

use crate::database::schema::{Column, ForeignKeyReference, SchemaIndex, Table};
use crate::error::{Result, SqlChatError};
use sqlx::{sqlite::SqlitePool, Row};

/// Index SQLite database schema
pub async fn index_sqlite(pool: &SqlitePool) -> Result<SchemaIndex> {
    let mut schema_index = SchemaIndex::new();

    let tables_query = r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table'
            AND name NOT LIKE 'sqlite_%'
        ORDER BY name
    "#;

    let tables_rows = sqlx::query(tables_query)
        .fetch_all(pool)
        .await
        .map_err(|e| SqlChatError::query(tables_query.trim(), e))?;

    for row in tables_rows {
        let table_name: String = row.get("name");
        let mut table = Table::new(&table_name);

        let fk_query = r#"SELECT "from", "table", "to" FROM pragma_foreign_key_list(?)"#;
        let fk_rows = sqlx::query(fk_query)
            .bind(&table_name)
            .fetch_all(pool)
            .await
            .map_err(|e| SqlChatError::query(fk_query, e))?;

        let foreign_keys: Vec<(String, ForeignKeyReference)> = fk_rows
            .iter()
            .map(|fk| {
                (
                    fk.get::<String, _>("from"),
                    ForeignKeyReference {
                        table: fk.get::<String, _>("table"),
                        column: fk.get::<Option<String>, _>("to").unwrap_or_default(),
                    },
                )
            })
            .collect();

        let columns_query =
            r#"SELECT name, type, "notnull", pk FROM pragma_table_info(?) ORDER BY cid"#;
        let columns_rows = sqlx::query(columns_query)
            .bind(&table_name)
            .fetch_all(pool)
            .await
            .map_err(|e| SqlChatError::query(columns_query, e))?;

        for col_row in columns_rows {
            let column_name: String = col_row.get("name");
            let data_type: String = col_row.get("type");
            let not_null: i64 = col_row.get("notnull");
            let pk: i64 = col_row.get("pk");

            let mut column = Column::new(&column_name, data_type);
            // INTEGER PRIMARY KEY columns report notnull = 0 but alias the rowid and are never NULL.
            column.nullable = not_null == 0 && pk == 0;
            column.is_primary_key = pk > 0;
            column.references = foreign_keys
                .iter()
                .find(|(from, _)| from.eq_ignore_ascii_case(&column_name))
                .map(|(_, reference)| reference.clone());

            table.add_column(column);
        }

        schema_index.add_table(table);
    }

    tracing::debug!(tables = schema_index.tables.len(), "indexed store schema");
    Ok(schema_index)
}
