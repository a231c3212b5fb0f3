//! Structured errors raised while parsing a filter or order-by expression.
//!
//! Every error carries the text the client sent and the [`ParsingContext`]
//! it was parsed in, so the message can be handed back to the client as-is.
//! Positions are 0-based character offsets into that text.

use std::fmt;

use thiserror::Error;

use crate::catalog::FieldType;

/// Which kind of expression was being parsed. Only affects diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParsingContext {
    Filter,
    OrderBy,
}

impl fmt::Display for ParsingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsingContext::Filter => write!(f, "filter"),
            ParsingContext::OrderBy => write!(f, "order by"),
        }
    }
}

/// Errors that reject a query before it ever reaches evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// The identifier does not resolve to any column or alias.
    #[error("The query {context}, {original_text}, referenced an unknown column '{name}' at position {position}")]
    UnknownColumn {
        original_text: String,
        context: ParsingContext,
        position: usize,
        name: String,
    },

    /// An apostrophe was opened and never closed.
    #[error("The query {context}, {original_text}, contained an unterminated string literal that starts at {position}")]
    UnterminatedStringLiteral {
        original_text: String,
        context: ParsingContext,
        position: usize,
    },

    /// A `["` key segment was opened and never closed with `"]`.
    #[error("The query {context}, {original_text}, contained an unterminated JSON Key that starts at {position}. JSON Keys should be in the format [\"{{KeyName}}\"]")]
    UnterminatedJsonKey {
        original_text: String,
        context: ParsingContext,
        position: usize,
    },

    /// The operand or operator cannot be applied to the column's declared type.
    #[error("The query {context}, {original_text}, compared column '{column}' of type {field_type} with an incompatible value '{value}' at position {position}: {reason}")]
    FieldTypeMismatch {
        original_text: String,
        context: ParsingContext,
        position: usize,
        column: String,
        field_type: FieldType,
        value: String,
        reason: String,
    },

    /// More literal operands than the model permits.
    #[error("The query {context}, {original_text}, exceeded the maximum of {maximum} parameters")]
    TooManyParameters {
        original_text: String,
        context: ParsingContext,
        position: usize,
        maximum: usize,
    },

    /// Grammar violation: missing operand, stray keyword, empty `in` list, ...
    #[error("The query {context}, {original_text}, has an unexpected {found} at position {position}; expected {expected}")]
    UnexpectedToken {
        original_text: String,
        context: ParsingContext,
        position: usize,
        found: String,
        expected: String,
    },

    /// An unmatched `(` or `)`.
    #[error("The query {context}, {original_text}, has an unbalanced parenthesis at position {position}")]
    UnbalancedParentheses {
        original_text: String,
        context: ParsingContext,
        position: usize,
    },
}

impl QueryError {
    /// The query text exactly as the client sent it.
    pub fn original_text(&self) -> &str {
        match self {
            QueryError::UnknownColumn { original_text, .. }
            | QueryError::UnterminatedStringLiteral { original_text, .. }
            | QueryError::UnterminatedJsonKey { original_text, .. }
            | QueryError::FieldTypeMismatch { original_text, .. }
            | QueryError::TooManyParameters { original_text, .. }
            | QueryError::UnexpectedToken { original_text, .. }
            | QueryError::UnbalancedParentheses { original_text, .. } => original_text,
        }
    }

    pub fn context(&self) -> ParsingContext {
        match self {
            QueryError::UnknownColumn { context, .. }
            | QueryError::UnterminatedStringLiteral { context, .. }
            | QueryError::UnterminatedJsonKey { context, .. }
            | QueryError::FieldTypeMismatch { context, .. }
            | QueryError::TooManyParameters { context, .. }
            | QueryError::UnexpectedToken { context, .. }
            | QueryError::UnbalancedParentheses { context, .. } => *context,
        }
    }

    /// Character offset of the offending construct.
    pub fn position(&self) -> usize {
        match self {
            QueryError::UnknownColumn { position, .. }
            | QueryError::UnterminatedStringLiteral { position, .. }
            | QueryError::UnterminatedJsonKey { position, .. }
            | QueryError::FieldTypeMismatch { position, .. }
            | QueryError::TooManyParameters { position, .. }
            | QueryError::UnexpectedToken { position, .. }
            | QueryError::UnbalancedParentheses { position, .. } => *position,
        }
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
