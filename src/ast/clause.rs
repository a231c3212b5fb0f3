use std::fmt;
use std::ops::Deref;

use crate::ast::{Conjunction, OperationType};
use crate::catalog::Column;
use crate::value::Value;

/// One node of a validated query.
///
/// The fields shared by every variant live here; the variant itself is in
/// [`ClauseKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Invert this node's result before it takes part in the fold.
    pub negated: bool,
    /// How this clause joins the next sibling. `None` only on the last clause.
    pub conjunction: Conjunction,
    /// `column["a"]["b"]` key path; empty addresses the whole field.
    pub json_keys: Vec<String>,
    pub kind: ClauseKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClauseKind {
    /// `column op value`, or `column is [not] null` with no value.
    Criteria {
        column: Column,
        operation: OperationType,
        value: Option<Value>,
    },

    /// `column between lower and upper`, inclusive on both ends.
    Between {
        column: Column,
        lower: Value,
        upper: Value,
    },

    /// `column in (v1, v2, ...)`
    In { column: Column, values: Vec<Value> },

    /// A parenthesized sequence.
    Compound { children: Vec<Clause> },
}

impl Clause {
    pub fn new(kind: ClauseKind) -> Self {
        Clause {
            negated: false,
            conjunction: Conjunction::None,
            json_keys: Vec::new(),
            kind,
        }
    }

    /// The column this clause tests, `None` for compound clauses.
    pub fn column(&self) -> Option<&Column> {
        match &self.kind {
            ClauseKind::Criteria { column, .. }
            | ClauseKind::Between { column, .. }
            | ClauseKind::In { column, .. } => Some(column),
            ClauseKind::Compound { .. } => None,
        }
    }

    /// Number of literal operands in this clause and its children.
    pub fn parameter_count(&self) -> usize {
        match &self.kind {
            ClauseKind::Criteria { value, .. } => usize::from(value.is_some()),
            ClauseKind::Between { .. } => 2,
            ClauseKind::In { values, .. } => values.len(),
            ClauseKind::Compound { children } => children.iter().map(Clause::parameter_count).sum(),
        }
    }
}

/// The top-level sequence returned by a filter parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter(pub Vec<Clause>);

impl Filter {
    pub fn clauses(&self) -> &[Clause] {
        &self.0
    }

    pub fn parameter_count(&self) -> usize {
        self.0.iter().map(Clause::parameter_count).sum()
    }
}

impl Deref for Filter {
    type Target = [Clause];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Clause>> for Filter {
    fn from(clauses: Vec<Clause>) -> Self {
        Filter(clauses)
    }
}

/// Writes a literal so that it tokenizes back to the same value.
fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        Value::Integer(n) => write!(f, "{}", n),
        Value::Decimal(d) => write!(f, "{}", d),
        Value::Boolean(b) => write!(f, "{}", b),
        Value::Date(d) => write!(f, "'{}'", d.to_rfc3339()),
        Value::Null | Value::Array(_) | Value::Object(_) => f.write_str("null"),
    }
}

fn write_sequence(f: &mut fmt::Formatter<'_>, clauses: &[Clause]) -> fmt::Result {
    for clause in clauses {
        write!(f, "{}", clause)?;
        if clause.conjunction != Conjunction::None {
            write!(f, " {} ", clause.conjunction)?;
        }
    }
    Ok(())
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("not ")?;
        }
        if let Some(column) = self.column() {
            f.write_str(&column.name)?;
            for key in &self.json_keys {
                write!(f, "[\"{}\"]", key)?;
            }
        }

        match &self.kind {
            ClauseKind::Criteria {
                operation, value, ..
            } => {
                write!(f, " {}", operation)?;
                if let Some(value) = value {
                    f.write_str(" ")?;
                    write_literal(f, value)?;
                }
                Ok(())
            }
            ClauseKind::Between { lower, upper, .. } => {
                f.write_str(" between ")?;
                write_literal(f, lower)?;
                f.write_str(" and ")?;
                write_literal(f, upper)
            }
            ClauseKind::In { values, .. } => {
                f.write_str(" in (")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_literal(f, value)?;
                }
                f.write_str(")")
            }
            ClauseKind::Compound { children } => {
                f.write_str("(")?;
                write_sequence(f, children)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_sequence(f, &self.0)
    }
}
