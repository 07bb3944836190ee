//! Prompt templates.
//!
//! Two fixed instruction blocks: the NL→SQL system prompt, parameterized by
//! the introspected schema, and the dump-analysis instruction that asks for
//! a strict JSON description of CREATE TABLE and INSERT statements.

use crate::models::TableSchema;
use std::fmt::Write as _;

const SQL_GENERATOR_HEADER: &str = "You are an expert SQL query generator. Your task is to convert natural language questions into accurate SQL queries.
The database has the following schema:

";

const SQL_GENERATOR_GUIDELINES: &str = "
Guidelines for generating SQL queries:
1. Always use proper SQL syntax compatible with MySQL/MariaDB
2. Use appropriate JOIN conditions when querying multiple tables
3. Include WHERE clauses for filtering data
4. Use appropriate aggregation functions (COUNT, SUM, AVG, etc.) when needed
5. Return only the SQL query without any explanations or markdown formatting
6. Ensure the query is safe and follows best practices
7. Use proper table and column names exactly as provided in the schema

Example:
Question: \"Show me all employees in the sales department\"
SQL: SELECT * FROM employees WHERE department = 'sales'

Question: \"What is the total revenue by region?\"
SQL: SELECT region, SUM(revenue) as total_revenue FROM sales GROUP BY region

Remember to:
- Use exact table and column names from the schema
- Return only the SQL query without any additional text
- Ensure the query is syntactically correct
- Handle NULL values appropriately
- Use appropriate data types in comparisons";

/// Instruction for the ingestion pipeline's extraction step. The response
/// shape is validated strictly before anything executes.
pub const SQL_EXTRACTION_PROMPT: &str = "You are a SQL dump analyzer. You will receive the full text of a SQL script.
Extract every CREATE TABLE statement and every INSERT statement from it.

Respond with a single JSON object, and nothing else, in exactly this shape:
{\"tables\": [{\"table_name\": \"<name>\", \"columns\": [\"<col1>\", \"<col2>\"], \"create_statement\": \"<verbatim CREATE TABLE statement>\"}], \"inserts\": [\"<verbatim INSERT statement>\"]}

Rules:
1. \"tables\" lists each CREATE TABLE statement with its table name, its column names, and the verbatim create statement
2. \"inserts\" lists each INSERT statement verbatim, with table, column and value lists fully resolved
3. Keep statements in the order they appear in the script
4. Do not wrap the output in markdown formatting or add any commentary
5. If the script contains no such statements, use empty arrays";

/// Render the NL→SQL system prompt for the given schema.
pub fn nl_to_sql_system_prompt(schema: &[TableSchema]) -> String {
    let mut prompt = String::from(SQL_GENERATOR_HEADER);
    for table in schema {
        // "Table 'name' with columns: a, b, c" per table, one line each
        let _ = writeln!(
            prompt,
            "Table '{}' with columns: {}",
            table.name,
            table.columns.join(", ")
        );
    }
    prompt.push_str(SQL_GENERATOR_GUIDELINES);
    prompt
}
