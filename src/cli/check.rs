//! Run a filter / order-by request against JSON records

use tracing::info;

use super::CliError;
use crate::{Catalog, Query};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Filter expression
    pub filter: String,
    /// Order-by expression
    pub order_by: Option<String>,
    /// Catalog document (JSON)
    pub catalog: String,
    /// JSON input string: an array of records or a single record
    pub input: Option<String>,
    /// Records per page
    pub page_size: Option<usize>,
    /// 0-based page number
    pub page: usize,
    /// Only validate the query, don't execute
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// The query is valid; carries its canonical rendering
    SyntaxValid { filter: String, order_by: String },
    /// Matching records, as a JSON array
    Success(serde_json::Value),
}

fn json_type(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Execute a sift check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let catalog = Catalog::from_json(&options.catalog)?;
    let order_by = options.order_by.as_deref().unwrap_or("");

    let mut query = Query::parse(&catalog, &options.filter, order_by)?;
    if let Some(size) = options.page_size {
        query = query.with_page(size, options.page);
    }

    if options.syntax_only {
        let order_by = query
            .order_by
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Ok(CheckResult::SyntaxValid {
            filter: query.filter.to_string(),
            order_by,
        });
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let records = match serde_json::from_str::<serde_json::Value>(json_str)? {
        serde_json::Value::Array(items) => items,
        single @ serde_json::Value::Object(_) => vec![single],
        other => return Err(CliError::NotRecords(json_type(&other))),
    };
    if let Some(bad) = records.iter().find(|r| !r.is_object()) {
        return Err(CliError::NotRecords(json_type(bad)));
    }

    let matched: Vec<serde_json::Value> = query.apply(&records).into_iter().cloned().collect();
    info!(
        model = catalog.model(),
        records = records.len(),
        matched = matched.len(),
        "check complete"
    );
    Ok(CheckResult::Success(serde_json::Value::Array(matched)))
}
