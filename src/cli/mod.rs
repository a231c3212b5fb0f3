//! CLI support for sift-lang
//!
//! Provides programmatic access to the `sift` commands so other tools can
//! embed them without shelling out.

mod check;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Query rejected: {0}")]
    Query(#[from] crate::QueryError),

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] crate::CatalogError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Input must be a JSON array of objects or a single object, got {0}")]
    NotRecords(&'static str),

    #[error("Unknown category: '{0}'\nRun 'sift docs' to see available categories.")]
    UnknownCategory(String),
}
