use crate::catalog::TableContext;
use crate::error::Result;

/// Assemble the SQL-generation prompt for a user request and its matched
/// table contexts.
///
/// The contexts are embedded as pretty-printed JSON so the downstream
/// model sees column names and descriptions verbatim.
pub fn build_sql_prompt(user_input: &str, tables: &[&TableContext]) -> Result<String> {
    let context_json = serde_json::to_string_pretty(tables)?;
    Ok(format!(
        "You are an expert SQL assistant.\n\
         Based on the request: \"{user_input}\"\n\
         Use the following table schema JSON to answer with ONLY a valid SQL query (MySQL dialect):\n\n\
         {context_json}"
    ))
}
