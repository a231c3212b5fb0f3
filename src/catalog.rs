//! The column catalog: which fields a client may filter and sort on.
//!
//! The parser never discovers columns on its own. A host hands it something
//! implementing [`ColumnCatalog`], and every identifier in the query text is
//! resolved through it. [`Catalog`] is the bundled implementation; it can be
//! assembled in code or loaded from a JSON document:
//!
//! ```json
//! {
//!   "model": "employees",
//!   "max_parameters": 200,
//!   "columns": [
//!     { "name": "id", "type": "integer" },
//!     { "name": "name", "type": "string", "aliases": ["fullname"] },
//!     { "name": "metadata", "type": "json", "nested": true }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declared type of a column. Literals are converted to this type at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    /// Untyped document; literals keep the type their token implies.
    Json,
}

impl FieldType {
    /// Whether `contains`, `startswith` and `endswith` may target this type.
    pub fn supports_text_search(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Json)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Json => "json",
        };
        f.write_str(name)
    }
}

/// A field that may appear in a filter or order-by expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Canonical name; also the key used to read the field from a record.
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Allows `column["key"]["sub"]` addressing.
    #[serde(default)]
    pub nested: bool,
    /// Makes `eq`, `ne` and `in` ignore case for string values.
    #[serde(default)]
    pub case_insensitive: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Column {
            name: name.into(),
            field_type,
            aliases: Vec::new(),
            nested: false,
            case_insensitive: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_nested_keys(mut self) -> Self {
        self.nested = true;
        self
    }

    pub fn with_case_insensitive_equality(mut self) -> Self {
        self.case_insensitive = true;
        self
    }
}

/// Lookup capability consumed by the parser.
///
/// Implementations must be immutable once handed to the parser; the parser
/// only ever reads from them.
pub trait ColumnCatalog {
    /// Resolve a field name or alias, case-insensitively.
    fn resolve(&self, name: &str) -> Option<&Column>;

    /// Maximum number of literal operands one query may carry. `None` is unbounded.
    ///
    /// A catalog describes a single model, so this is that model's budget.
    /// Hosts exposing several models build one catalog per model.
    fn max_parameters(&self) -> Option<usize> {
        None
    }
}

/// Errors raised while assembling a [`Catalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("column name or alias '{0}' is declared more than once")]
    DuplicateName(String),

    #[error("column name must not be empty")]
    EmptyName,

    #[error("invalid catalog document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of a [`Catalog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub model: String,
    #[serde(default)]
    pub max_parameters: Option<usize>,
    pub columns: Vec<Column>,
}

/// Column catalog for a single model.
#[derive(Debug, Clone)]
pub struct Catalog {
    model: String,
    max_parameters: Option<usize>,
    columns: Vec<Column>,
    // lower-cased name or alias -> index into `columns`
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn builder(model: impl Into<String>) -> CatalogBuilder {
        CatalogBuilder {
            model: model.into(),
            max_parameters: None,
            columns: Vec::new(),
        }
    }

    pub fn from_config(config: CatalogConfig) -> Result<Self, CatalogError> {
        let mut index = HashMap::new();
        for (i, column) in config.columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            for name in std::iter::once(&column.name).chain(column.aliases.iter()) {
                if index.insert(name.to_lowercase(), i).is_some() {
                    return Err(CatalogError::DuplicateName(name.clone()));
                }
            }
        }

        Ok(Catalog {
            model: config.model,
            max_parameters: config.max_parameters,
            columns: config.columns,
            index,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let config: CatalogConfig = serde_json::from_str(text)?;
        Self::from_config(config)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl ColumnCatalog for Catalog {
    fn resolve(&self, name: &str) -> Option<&Column> {
        self.index
            .get(&name.to_lowercase())
            .map(|&i| &self.columns[i])
    }

    fn max_parameters(&self) -> Option<usize> {
        self.max_parameters
    }
}

pub struct CatalogBuilder {
    model: String,
    max_parameters: Option<usize>,
    columns: Vec<Column>,
}

impl CatalogBuilder {
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn max_parameters(mut self, maximum: usize) -> Self {
        self.max_parameters = Some(maximum);
        self
    }

    pub fn build(self) -> Result<Catalog, CatalogError> {
        Catalog::from_config(CatalogConfig {
            model: self.model,
            max_parameters: self.max_parameters,
            columns: self.columns,
        })
    }
}
