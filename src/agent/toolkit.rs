//! SQL tools available to the agent

use crate::database::Database;
use crate::error::{Result, SqlChatError};
use crate::llm::{LLMProvider, Message, SamplingParams};

pub const QUERY_TOOL: &str = "sql_db_query";
pub const SCHEMA_TOOL: &str = "sql_db_schema";
pub const LIST_TABLES_TOOL: &str = "sql_db_list_tables";
pub const QUERY_CHECKER_TOOL: &str = "sql_db_query_checker";

/// Name and description shown to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
}

const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: QUERY_TOOL,
        description: "Input to this tool is a detailed and correct SQL query, output is a result from the database. \
If the query is not correct, the conversation ends with an error, so check it with sql_db_query_checker first. \
If you encounter an issue with Unknown column 'xxxx' in 'field list', use sql_db_schema to query the correct table fields.",
    },
    ToolSpec {
        name: SCHEMA_TOOL,
        description: "Input to this tool is a comma-separated list of tables, output is the schema and sample rows for those tables. \
Be sure that the tables actually exist by calling sql_db_list_tables first! Example Input: table1, table2, table3",
    },
    ToolSpec {
        name: LIST_TABLES_TOOL,
        description: "Input is an empty string, output is a comma-separated list of tables in the database.",
    },
    ToolSpec {
        name: QUERY_CHECKER_TOOL,
        description: "Use this tool to double check if your query is correct before executing it. \
Always use this tool before executing a query with sql_db_query!",
    },
];

const QUERY_CHECKER_TEMPLATE: &str = "{query}
Double check the {dialect} query above for common mistakes, including:
- Using NOT IN with NULL values
- Using UNION when UNION ALL should have been used
- Using BETWEEN for exclusive ranges
- Data type mismatch in predicates
- Properly quoting identifiers
- Using the correct number of arguments for functions
- Casting to the correct data type
- Using the proper columns for joins

If there are any of the above mistakes, rewrite the query. If there are no mistakes, just reproduce the original query.

Output the final SQL query only.

SQL Query: ";

/// The four database tools, bound to one store
#[derive(Clone)]
pub struct SqlToolkit {
    database: Database,
}

impl SqlToolkit {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Tool catalogue in prompt order
    pub fn specs() -> &'static [ToolSpec] {
        TOOLS
    }

    pub fn tool_names() -> Vec<&'static str> {
        TOOLS.iter().map(|t| t.name).collect()
    }

    pub fn dialect(&self) -> &'static str {
        self.database.dialect()
    }

    /// Run a tool and return its observation
    ///
    /// Unknown tools and unknown tables come back as observations so the
    /// model can correct itself. A failing query is returned as an error.
    pub async fn run(&self, tool: &str, input: &str, llm: &dyn LLMProvider) -> Result<String> {
        match tool {
            QUERY_TOOL => self.query(input).await,
            SCHEMA_TOOL => self.schema(input).await,
            LIST_TABLES_TOOL => Ok(self.database.table_names().await?.join(", ")),
            QUERY_CHECKER_TOOL => self.check_query(input, llm).await,
            other => Ok(format!(
                "{} is not a valid tool, try one of [{}].",
                other,
                Self::tool_names().join(", ")
            )),
        }
    }

    async fn query(&self, input: &str) -> Result<String> {
        let sql = strip_code_fence(input);
        if sql.is_empty() {
            return Err(SqlChatError::query(input, "empty query"));
        }
        Ok(self.database.run(sql).await?.to_table())
    }

    async fn schema(&self, input: &str) -> Result<String> {
        let requested: Vec<&str> = input.split(',').collect();
        let (found, missing) = self.database.resolve_tables(&requested).await?;

        if !missing.is_empty() {
            return Ok(format!(
                "Error: table_names {{{}}} not found in database",
                missing.join(", ")
            ));
        }
        if found.is_empty() {
            return Ok("Error: no table names given".to_string());
        }
        self.database.table_info(&found).await
    }

    async fn check_query(&self, input: &str, llm: &dyn LLMProvider) -> Result<String> {
        let prompt = QUERY_CHECKER_TEMPLATE
            .replace("{dialect}", self.dialect())
            .replace("{query}", strip_code_fence(input));
        let response = llm
            .generate(&[Message::user(prompt)], &SamplingParams::default())
            .await?;
        Ok(strip_code_fence(&response.content).to_string())
    }
}

/// Remove a surrounding ```sql fence, if any
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body
        .strip_prefix("sql")
        .or_else(|| body.strip_prefix("SQL"))
        .unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}
