//! Recursive-descent parser from a [`TokenStream`] to a validated [`Filter`].
//!
//! Two mutually recursive states: a *sequence* of clauses joined by `and`/`or`,
//! and a single *clause*. There is no precedence climbing; the only grouping
//! is explicit parentheses.
//!
//! ```text
//! sequence := clause ( ("and" | "or") clause )*
//! clause   := "not"? ( "(" sequence ")" | column key* predicate )
//! key      := "[\"" name "\"]"
//! predicate:= cmp literal
//!           | "is" "not"? "null"
//!           | "between" literal "and" literal
//!           | "in" "(" literal ("," literal)* ")"
//! order_by := column ("asc" | "desc")? ( "," column ("asc" | "desc")? )*
//! ```
//!
//! Every column is resolved through the [`ColumnCatalog`] and every literal is
//! converted to the column's declared type here, so nothing unvalidated
//! reaches evaluation.

use std::str::FromStr;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::ast::{
    Clause, ClauseKind, Conjunction, Filter, OperationType, OperatorKeyword, SortDirection,
    SortInfo, Token, TokenKind,
};
use crate::catalog::{Column, ColumnCatalog, FieldType};
use crate::error::{ParsingContext, QueryError, Result};
use crate::lexer::{TokenStream, tokenize};
use crate::value::{Value, parse_date};

/// Parse a filter expression against a catalog.
///
/// An empty (or all-whitespace) expression yields an empty [`Filter`], which
/// matches every record.
///
/// # Examples
///
/// ```
/// use sift_lang::{Catalog, Column, FieldType, parse_filter};
///
/// let catalog = Catalog::builder("employees")
///     .column(Column::new("id", FieldType::Integer))
///     .column(Column::new("paycheck", FieldType::Decimal))
///     .build()
///     .unwrap();
///
/// let filter = parse_filter("id gt 1 and (paycheck lt 1000 or paycheck gt 1000)", &catalog).unwrap();
/// assert_eq!(filter.len(), 2);
/// ```
pub fn parse_filter<C: ColumnCatalog + ?Sized>(text: &str, catalog: &C) -> Result<Filter> {
    Parser::new(tokenize(text, ParsingContext::Filter), catalog).parse_filter()
}

/// Parse an order-by expression such as `name asc, hired desc`.
pub fn parse_order_by<C: ColumnCatalog + ?Sized>(text: &str, catalog: &C) -> Result<Vec<SortInfo>> {
    Parser::new(tokenize(text, ParsingContext::OrderBy), catalog).parse_order_by()
}

/// Deepest parenthesized nesting a filter may use.
pub const MAX_DEPTH: usize = 64;

pub struct Parser<'c, C: ColumnCatalog + ?Sized> {
    stream: TokenStream,
    catalog: &'c C,
    /// Literal operands consumed so far.
    parameters: usize,
    /// Open groups enclosing the current clause.
    depth: usize,
}

impl<'c, C: ColumnCatalog + ?Sized> Parser<'c, C> {
    pub fn new(stream: TokenStream, catalog: &'c C) -> Self {
        Parser {
            stream,
            catalog,
            parameters: 0,
            depth: 0,
        }
    }

    /// Parse the whole stream as a filter.
    pub fn parse_filter(mut self) -> Result<Filter> {
        if self.stream.is_empty() {
            return match self.stream.pending_error() {
                Some(err) => Err(err),
                None => Ok(Filter::default()),
            };
        }

        let clauses = self.parse_sequence()?;

        // A sequence only stops early on a token that cannot continue it.
        if let Some(token) = self.stream.next() {
            return Err(match token.kind {
                TokenKind::RParen => self.unbalanced(token.position),
                _ => self.unexpected(&token, "'and', 'or' or end of input"),
            });
        }
        if let Some(err) = self.stream.pending_error() {
            return Err(err);
        }

        let filter = Filter(clauses);
        debug!(
            clauses = filter.len(),
            parameters = self.parameters,
            "parsed filter"
        );
        Ok(filter)
    }

    /// Parse the whole stream as a comma-separated order-by list.
    pub fn parse_order_by(mut self) -> Result<Vec<SortInfo>> {
        let mut sort = Vec::new();
        if self.stream.is_empty() {
            return match self.stream.pending_error() {
                Some(err) => Err(err),
                None => Ok(sort),
            };
        }

        loop {
            let token = self.next_token("a column name")?;
            if token.kind != TokenKind::Identifier {
                return Err(self.unexpected(&token, "a column name"));
            }
            let column = self.resolve_column(&token)?;

            let mut direction = SortDirection::Ascending;
            if let Some(next) = self.stream.peek()
                && next.kind == TokenKind::Identifier
            {
                direction = match next.text.to_lowercase().as_str() {
                    "asc" | "ascending" => SortDirection::Ascending,
                    "desc" | "descending" => SortDirection::Descending,
                    _ => {
                        let next = next.clone();
                        return Err(self.unexpected(&next, "'asc', 'desc', ',' or end of input"));
                    }
                };
                self.stream.next();
            }
            sort.push(SortInfo { column, direction });

            match self.stream.next() {
                None => break,
                Some(token) if token.kind == TokenKind::Comma => continue,
                Some(token) => {
                    return Err(self.unexpected(&token, "'asc', 'desc', ',' or end of input"));
                }
            }
        }

        if let Some(err) = self.stream.pending_error() {
            return Err(err);
        }

        debug!(columns = sort.len(), "parsed order by");
        Ok(sort)
    }

    fn parse_sequence(&mut self) -> Result<Vec<Clause>> {
        let mut clauses = Vec::new();

        loop {
            let mut clause = self.parse_clause()?;
            let conjunction = match self.stream.peek().map(|t| t.kind) {
                Some(TokenKind::And) => Conjunction::And,
                Some(TokenKind::Or) => Conjunction::Or,
                _ => {
                    clauses.push(clause);
                    return Ok(clauses);
                }
            };
            self.stream.next();
            clause.conjunction = conjunction;
            clauses.push(clause);
        }
    }

    fn parse_clause(&mut self) -> Result<Clause> {
        let mut token = self.next_token("a column name or '('")?;
        let negated = token.kind == TokenKind::Not;
        if negated {
            token = self.next_token("a column name or '('")?;
        }

        let mut clause = match token.kind {
            TokenKind::LParen => {
                if self.depth >= MAX_DEPTH {
                    warn!(maximum = MAX_DEPTH, "query rejected: groups nested too deeply");
                    return Err(self.unexpected(
                        &token,
                        &format!("at most {} nested groups", MAX_DEPTH),
                    ));
                }
                self.depth += 1;
                let group = self.parse_group(&token);
                self.depth -= 1;
                group?
            }
            TokenKind::Identifier => self.parse_column_clause(&token)?,
            _ => return Err(self.unexpected(&token, "a column name or '('")),
        };

        clause.negated ^= negated;
        Ok(clause)
    }

    fn parse_group(&mut self, open: &Token) -> Result<Clause> {
        let mut children = self.parse_sequence()?;

        match self.stream.next() {
            Some(token) if token.kind == TokenKind::RParen => {}
            Some(token) => return Err(self.unexpected(&token, "'and', 'or' or ')'")),
            None => {
                return Err(self
                    .stream
                    .pending_error()
                    .unwrap_or_else(|| self.unbalanced(open.position)));
            }
        }

        // `(a)` is just `a`; only real groups become compound clauses.
        if children.len() == 1 {
            let mut only = children.remove(0);
            only.conjunction = Conjunction::None;
            return Ok(only);
        }
        Ok(Clause::new(ClauseKind::Compound { children }))
    }

    fn parse_column_clause(&mut self, name: &Token) -> Result<Clause> {
        let column = self.resolve_column(name)?;
        let json_keys = self.parse_json_keys(&column)?;

        let op_token = self.next_token("an operator")?;
        let keyword = match op_token.kind {
            TokenKind::Operator(keyword) => keyword,
            _ => return Err(self.unexpected(&op_token, "an operator")),
        };

        let kind = match keyword {
            OperatorKeyword::Is => {
                let mut token = self.next_token("'null' or 'not null'")?;
                let operation = if token.kind == TokenKind::Not {
                    token = self.next_token("'null'")?;
                    OperationType::IsNotNull
                } else {
                    OperationType::IsNull
                };
                if token.kind != TokenKind::Null {
                    return Err(self.unexpected(&token, "'null'"));
                }
                ClauseKind::Criteria {
                    column,
                    operation,
                    value: None,
                }
            }
            OperatorKeyword::Between => {
                let lower = self.parse_literal(&column)?;
                let and = self.next_token("'and'")?;
                if and.kind != TokenKind::And {
                    return Err(self.unexpected(&and, "'and'"));
                }
                let upper = self.parse_literal(&column)?;
                ClauseKind::Between {
                    column,
                    lower,
                    upper,
                }
            }
            OperatorKeyword::In => {
                let values = self.parse_in_list(&column)?;
                ClauseKind::In { column, values }
            }
            _ => {
                let Some(operation) = comparison(keyword) else {
                    return Err(self.unexpected(&op_token, "an operator"));
                };
                if operation.is_text_search() && !column.field_type.supports_text_search() {
                    return Err(self.type_mismatch(
                        &column,
                        &op_token,
                        format!("'{}' requires a string column", operation),
                    ));
                }
                let value = self.parse_literal(&column)?;
                ClauseKind::Criteria {
                    column,
                    operation,
                    value: Some(value),
                }
            }
        };

        let mut clause = Clause::new(kind);
        clause.json_keys = json_keys;
        Ok(clause)
    }

    fn parse_json_keys(&mut self, column: &Column) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        while let Some(open) = self.stream.peek()
            && open.kind == TokenKind::LBracket
        {
            let open = open.clone();
            self.stream.next();
            if !column.nested {
                return Err(self.type_mismatch(
                    column,
                    &open,
                    "column does not support nested keys".to_string(),
                ));
            }

            let key = self.next_token("a key name in the format [\"KeyName\"]")?;
            if key.kind != TokenKind::StringLiteral {
                return Err(self.unexpected(&key, "a key name in the format [\"KeyName\"]"));
            }
            let close = self.next_token("']'")?;
            if close.kind != TokenKind::RBracket {
                return Err(self.unexpected(&close, "']'"));
            }
            keys.push(key.text);
        }

        Ok(keys)
    }

    fn parse_in_list(&mut self, column: &Column) -> Result<Vec<Value>> {
        let open = self.next_token("'('")?;
        if open.kind != TokenKind::LParen {
            return Err(self.unexpected(&open, "'('"));
        }
        if let Some(token) = self.stream.peek()
            && token.kind == TokenKind::RParen
        {
            let token = token.clone();
            return Err(self.unexpected(&token, "at least one value"));
        }

        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal(column)?);
            let token = self.next_token("',' or ')'")?;
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::RParen => return Ok(values),
                _ => return Err(self.unexpected(&token, "',' or ')'")),
            }
        }
    }

    /// Consume one literal, charge it against the parameter budget and
    /// convert it to the column's type.
    fn parse_literal(&mut self, column: &Column) -> Result<Value> {
        let token = self.next_token("a value")?;
        if !token.is_literal() {
            return Err(self.unexpected(&token, "a value"));
        }

        self.parameters += 1;
        if let Some(maximum) = self.catalog.max_parameters()
            && self.parameters > maximum
        {
            warn!(maximum, "query rejected: too many parameters");
            return Err(QueryError::TooManyParameters {
                original_text: self.stream.original_text.clone(),
                context: self.stream.context,
                position: token.position,
                maximum,
            });
        }

        convert_literal(column.field_type, &token)
            .map_err(|reason| self.type_mismatch(column, &token, reason))
    }

    fn resolve_column(&self, token: &Token) -> Result<Column> {
        self.catalog
            .resolve(&token.text)
            .cloned()
            .ok_or_else(|| QueryError::UnknownColumn {
                original_text: self.stream.original_text.clone(),
                context: self.stream.context,
                position: token.position,
                name: token.text.clone(),
            })
    }

    fn next_token(&mut self, expected: &str) -> Result<Token> {
        match self.stream.next() {
            Some(token) => Ok(token),
            None => Err(self.end_of_input(expected)),
        }
    }

    /// Running out of tokens inside an unterminated construct reports that
    /// construct, not a generic end of input.
    fn end_of_input(&self, expected: &str) -> QueryError {
        self.stream
            .pending_error()
            .unwrap_or_else(|| QueryError::UnexpectedToken {
                original_text: self.stream.original_text.clone(),
                context: self.stream.context,
                position: self.stream.original_text.chars().count(),
                found: "end of input".to_string(),
                expected: expected.to_string(),
            })
    }

    fn unexpected(&self, token: &Token, expected: &str) -> QueryError {
        QueryError::UnexpectedToken {
            original_text: self.stream.original_text.clone(),
            context: self.stream.context,
            position: token.position,
            found: token.to_string(),
            expected: expected.to_string(),
        }
    }

    fn unbalanced(&self, position: usize) -> QueryError {
        QueryError::UnbalancedParentheses {
            original_text: self.stream.original_text.clone(),
            context: self.stream.context,
            position,
        }
    }

    fn type_mismatch(&self, column: &Column, token: &Token, reason: String) -> QueryError {
        QueryError::FieldTypeMismatch {
            original_text: self.stream.original_text.clone(),
            context: self.stream.context,
            position: token.position,
            column: column.name.clone(),
            field_type: column.field_type,
            value: token.text.clone(),
            reason,
        }
    }
}

/// The criteria operation for a binary comparison keyword. `between`, `in`
/// and `is` have their own grammar and map to `None`.
fn comparison(keyword: OperatorKeyword) -> Option<OperationType> {
    let operation = match keyword {
        OperatorKeyword::Eq => OperationType::Equals,
        OperatorKeyword::Ne => OperationType::NotEquals,
        OperatorKeyword::Gt => OperationType::GreaterThan,
        OperatorKeyword::Ge => OperationType::GreaterOrEqual,
        OperatorKeyword::Lt => OperationType::LessThan,
        OperatorKeyword::Le => OperationType::LessOrEqual,
        OperatorKeyword::Contains => OperationType::Contains,
        OperatorKeyword::StartsWith => OperationType::StartsWith,
        OperatorKeyword::EndsWith => OperationType::EndsWith,
        OperatorKeyword::Between | OperatorKeyword::In | OperatorKeyword::Is => return None,
    };
    Some(operation)
}

/// Convert a literal token to a value of `field_type`.
///
/// The unquoted `null` keyword is plain text here; only `is [not] null`
/// tests for null.
fn convert_literal(field_type: FieldType, token: &Token) -> std::result::Result<Value, String> {
    let text = token.text.as_str();
    match field_type {
        FieldType::String => Ok(Value::String(token.text.clone())),
        FieldType::Integer => text
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| "expected an integer".to_string()),
        FieldType::Decimal => Decimal::from_str(text)
            .map(Value::Decimal)
            .map_err(|_| "expected a decimal number".to_string()),
        FieldType::Boolean => match text.to_lowercase().as_str() {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err("expected 'true' or 'false'".to_string()),
        },
        FieldType::Date => date_keyword(text)
            .or_else(|| parse_date(text))
            .map(Value::Date)
            .ok_or_else(|| "expected an ISO-8601 date".to_string()),
        FieldType::Json => Ok(match token.kind {
            TokenKind::NumericLiteral => match text.parse::<i64>() {
                Ok(n) => Value::Integer(n),
                Err(_) => Decimal::from_str(text)
                    .map(Value::Decimal)
                    .map_err(|_| "expected a number".to_string())?,
            },
            TokenKind::BooleanLiteral(b) => Value::Boolean(b),
            _ => Value::String(token.text.clone()),
        }),
    }
}

fn date_keyword(text: &str) -> Option<chrono::DateTime<Utc>> {
    let now = Utc::now();
    let today = now.date_naive().and_hms_opt(0, 0, 0)?.and_utc();
    match text.to_lowercase().as_str() {
        "now" => Some(now),
        "today" => Some(today),
        "tomorrow" => Some(today + Duration::days(1)),
        "yesterday" => Some(today - Duration::days(1)),
        _ => None,
    }
}
