//! # sift-lang
//!
//! A small filter and order-by language that is safe to expose to untrusted
//! clients:
//!
//! ```text
//! id gt 1 and (paycheck lt 1000 or paycheck gt 1000)
//! name contains 'smith' and hired between '2020-01-01' and today
//! metadata["team"]["name"] in ('core', 'infra')
//! ```
//!
//! Text goes through a fixed pipeline: [`lexer`] → [`parser`] → [`ast`] →
//! [`evaluator`]. Every column is resolved against a host-supplied
//! [`ColumnCatalog`] and every literal is converted to the column's declared
//! type while parsing, so the resulting tree can be trusted by in-memory
//! evaluation or by any other backend that consumes it.
pub mod ast;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod value;

pub use ast::{Clause, ClauseKind, Conjunction, Filter, OperationType, SortDirection, SortInfo, Token, TokenKind};
pub use catalog::{Catalog, CatalogError, Column, ColumnCatalog, FieldType};
pub use error::{ParsingContext, QueryError};
pub use evaluator::{Record, compare_records, matches};
pub use lexer::{TokenStream, tokenize};
pub use parser::{Parser, parse_filter, parse_order_by};
pub use query::Query;
pub use value::Value;
