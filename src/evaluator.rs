//! In-memory evaluation of a parsed [`Filter`] against records.
//!
//! Evaluation is pure: it reads the tree and the record and returns a
//! boolean. It never fails; a field that is missing, or that holds a value of
//! the wrong shape, simply does not match.
//!
//! # Null handling
//!
//! | field value        | `is null` | `is not null` | `ne` | every other test |
//! |--------------------|-----------|---------------|------|------------------|
//! | present            | false     | true          | test | test             |
//! | null / absent      | true      | false         | true | false            |
//! | unreachable path   | false     | false         | false| false            |
//!
//! A key path is unreachable when an intermediate key is missing or a value
//! along the way is not an object or array. A missing *final* key is absent.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::ast::{Clause, ClauseKind, Conjunction, Filter, OperationType, SortDirection, SortInfo};
use crate::catalog::{Column, FieldType};
use crate::value::{Value, parse_date};

/// A host record the evaluator can read fields from.
///
/// `name` is always a column's canonical name from the catalog.
pub trait Record {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>>;
}

impl Record for HashMap<String, Value> {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl Record for serde_json::Map<String, serde_json::Value> {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.get(name).map(|v| Cow::Owned(Value::from(v)))
    }
}

impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.as_object()?.field(name)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        (**self).field(name)
    }
}

/// A field after column lookup and key-path descent.
enum Field<'r> {
    Present(Cow<'r, Value>),
    Null,
    Unreachable,
}

fn resolve<'r, R: Record + ?Sized>(record: &'r R, column: &Column, keys: &[String]) -> Field<'r> {
    let Some(root) = record.field(&column.name) else {
        return Field::Null;
    };
    if keys.is_empty() {
        return if root.is_null() {
            Field::Null
        } else {
            Field::Present(root)
        };
    }

    let mut current: &Value = &root;
    for (i, key) in keys.iter().enumerate() {
        let child = match current {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
            _ => return Field::Unreachable,
        };
        match child {
            Some(child) => current = child,
            None if i + 1 == keys.len() => return Field::Null,
            None => return Field::Unreachable,
        }
    }

    if current.is_null() {
        Field::Null
    } else {
        Field::Present(Cow::Owned(current.clone()))
    }
}

/// View a record value in the column's declared type, if it has that shape.
fn coerce<'v>(value: &'v Value, field_type: FieldType) -> Option<Cow<'v, Value>> {
    match (field_type, value) {
        (FieldType::Json, v) => Some(Cow::Borrowed(v)),
        (FieldType::String, Value::String(_))
        | (FieldType::Boolean, Value::Boolean(_))
        | (FieldType::Date, Value::Date(_))
        | (FieldType::Integer | FieldType::Decimal, Value::Integer(_) | Value::Decimal(_)) => {
            Some(Cow::Borrowed(value))
        }
        (FieldType::Date, Value::String(s)) => parse_date(s).map(|d| Cow::Owned(Value::Date(d))),
        _ => None,
    }
}

fn values_equal(column: &Column, a: &Value, b: &Value) -> bool {
    if column.case_insensitive
        && let (Value::String(a), Value::String(b)) = (a, b)
    {
        return a.to_lowercase() == b.to_lowercase();
    }
    a.compare(b) == Some(Ordering::Equal)
}

/// Text form of a literal for substring tests.
fn search_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_lowercase()),
        Value::Integer(n) => Some(n.to_string()),
        Value::Decimal(d) => Some(d.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_op(column: &Column, operation: OperationType, field: &Value, literal: &Value) -> bool {
    match operation {
        OperationType::Equals => values_equal(column, field, literal),
        OperationType::NotEquals => !values_equal(column, field, literal),
        OperationType::GreaterThan => field.compare(literal) == Some(Ordering::Greater),
        OperationType::GreaterOrEqual => {
            matches!(field.compare(literal), Some(Ordering::Greater | Ordering::Equal))
        }
        OperationType::LessThan => field.compare(literal) == Some(Ordering::Less),
        OperationType::LessOrEqual => {
            matches!(field.compare(literal), Some(Ordering::Less | Ordering::Equal))
        }
        OperationType::Contains | OperationType::StartsWith | OperationType::EndsWith => {
            let (Some(haystack), Some(needle)) = (field.as_str(), search_text(literal)) else {
                return false;
            };
            let haystack = haystack.to_lowercase();
            match operation {
                OperationType::Contains => haystack.contains(&needle),
                OperationType::StartsWith => haystack.starts_with(&needle),
                _ => haystack.ends_with(&needle),
            }
        }
        OperationType::IsNull | OperationType::IsNotNull => false,
    }
}

fn eval_criteria(
    column: &Column,
    operation: OperationType,
    literal: Option<&Value>,
    field: Field<'_>,
) -> bool {
    match (operation, field) {
        (OperationType::IsNull, field) => matches!(field, Field::Null),
        (OperationType::IsNotNull, field) => matches!(field, Field::Present(_)),
        (_, Field::Unreachable) => false,
        (operation, Field::Null) => operation == OperationType::NotEquals,
        (operation, Field::Present(value)) => {
            let (Some(literal), Some(value)) = (literal, coerce(&value, column.field_type)) else {
                return false;
            };
            compare_op(column, operation, &value, literal)
        }
    }
}

fn eval_clause<R: Record + ?Sized>(clause: &Clause, record: &R) -> bool {
    let result = match &clause.kind {
        ClauseKind::Compound { children } => eval_sequence(children, record),
        ClauseKind::Criteria {
            column,
            operation,
            value,
        } => {
            let field = resolve(record, column, &clause.json_keys);
            eval_criteria(column, *operation, value.as_ref(), field)
        }
        ClauseKind::Between {
            column,
            lower,
            upper,
        } => match resolve(record, column, &clause.json_keys) {
            Field::Present(value) => coerce(&value, column.field_type).is_some_and(|v| {
                matches!(v.compare(lower), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(v.compare(upper), Some(Ordering::Less | Ordering::Equal))
            }),
            _ => false,
        },
        ClauseKind::In { column, values } => match resolve(record, column, &clause.json_keys) {
            Field::Present(value) => coerce(&value, column.field_type)
                .is_some_and(|v| values.iter().any(|candidate| values_equal(column, &v, candidate))),
            _ => false,
        },
    };

    result != clause.negated
}

/// Fold a sequence left to right, each clause's conjunction joining it to
/// the next. An empty sequence matches.
fn eval_sequence<R: Record + ?Sized>(clauses: &[Clause], record: &R) -> bool {
    let Some((first, rest)) = clauses.split_first() else {
        return true;
    };

    let mut result = eval_clause(first, record);
    let mut conjunction = first.conjunction;
    for clause in rest {
        result = match conjunction {
            Conjunction::Or => result || eval_clause(clause, record),
            Conjunction::And | Conjunction::None => result && eval_clause(clause, record),
        };
        conjunction = clause.conjunction;
    }
    result
}

/// Whether `record` satisfies every clause of `filter`.
pub fn matches<R: Record + ?Sized>(filter: &Filter, record: &R) -> bool {
    eval_sequence(filter.clauses(), record)
}

impl Filter {
    /// See [`matches`].
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        matches(self, record)
    }

    /// The records that match, in their original order.
    pub fn filter_records<'r, R: Record>(&self, records: &'r [R]) -> Vec<&'r R> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }
}

fn sort_key<R: Record + ?Sized>(record: &R, column: &Column) -> Option<Value> {
    let value = record.field(&column.name)?;
    coerce(&value, column.field_type).map(|v| match (&*v, column.case_insensitive) {
        (Value::String(s), true) => Value::String(s.to_lowercase()),
        (v, _) => v.clone(),
    })
}

/// Order two records by a parsed order-by list. Nulls and values of the
/// wrong shape sort first; values of different types on a json column order
/// by type, see [`Value::sort_cmp`].
pub fn compare_records<R: Record + ?Sized>(a: &R, b: &R, order: &[SortInfo]) -> Ordering {
    for sort in order {
        let left = sort_key(a, &sort.column).filter(|v| !v.is_null());
        let right = sort_key(b, &sort.column).filter(|v| !v.is_null());
        let ordering = match (&left, &right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(l), Some(r)) => l.sort_cmp(r),
        };
        let ordering = match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
