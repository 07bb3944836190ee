//! Natural-language query execution.
//!
//! Composes introspection → prompt rendering → completion → execution →
//! result packaging for one question against one database. The model's
//! output is executed verbatim: no retry, no sanitization, no validation
//! before execution.

use crate::db::{DbClient, SchemaIntrospector};
use crate::error::{AppError, AppResult};
use crate::llm::{LlmClient, NL_QUERY_TEMPERATURE, prompt};
use crate::models::{ConnectionParams, QueryOutcome};
use crate::service::export;
use tracing::{debug, info};

pub struct QueryService {
    oracle: LlmClient,
}

impl QueryService {
    pub fn new(oracle: LlmClient) -> Self {
        Self { oracle }
    }

    /// Answer one natural-language question against the target database.
    ///
    /// An empty result set is a successful outcome with `result = []`; only
    /// introspection, oracle or execution failures are errors.
    pub async fn run_question(
        &self,
        params: &ConnectionParams,
        question: &str,
    ) -> AppResult<QueryOutcome> {
        let schema = SchemaIntrospector::introspect(params).await?;
        let system_prompt = prompt::nl_to_sql_system_prompt(&schema);

        let sql = self
            .oracle
            .complete(&system_prompt, question, NL_QUERY_TEMPERATURE)
            .await?;
        if sql.is_empty() {
            return Err(AppError::oracle("Failed to generate SQL query"));
        }
        debug!(sql = %sql, "Model generated SQL");

        let query_set = DbClient::run_query(params, &sql).await?;
        let csv = export::to_csv(&query_set.columns, &query_set.rows)?;

        info!(
            rows = query_set.rows.len(),
            columns = query_set.columns.len(),
            "Question answered"
        );
        Ok(QueryOutcome {
            sql_query: sql,
            result: query_set.rows,
            columns: query_set.columns,
            csv,
        })
    }
}
