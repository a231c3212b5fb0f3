//! # Abstract Syntax Tree
//!
//! The validated, typed representation of a query. Nothing in here is
//! constructed from raw text directly: the [`lexer`](crate::lexer) produces
//! [`tokens`], the [`parser`](crate::parser) checks them against a column
//! catalog and builds [`clause`] trees. Once built, a tree is never mutated
//! and can be evaluated any number of times, from any number of threads.
//!
//! ## Submodules
//!
//! - **[tokens]** - Lexical tokens with their source positions
//! - **[operators]** - Comparison operations, conjunctions, sort directions
//! - **[clause]** - Criteria / Between / In / Compound clauses and the top-level [`Filter`]
//! - **[sort]** - Parsed order-by entries
//!
//! ## Grouping
//!
//! There is no operator precedence. A sequence of clauses is folded strictly
//! left to right, each clause's [`Conjunction`] joining it to the next one:
//!
//! ```text
//! a and b or c        ==  (a AND b) OR c
//! a and (b or c)      ==  a AND (b OR c)
//! ```
//!
//! Parentheses are the only way to change association; they produce a
//! compound clause.
pub mod clause;
pub mod operators;
pub mod sort;
pub mod tokens;

pub use clause::{Clause, ClauseKind, Filter};
pub use operators::{Conjunction, OperationType, SortDirection};
pub use sort::SortInfo;
pub use tokens::{OperatorKeyword, Token, TokenKind};
