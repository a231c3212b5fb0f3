//! Documentation content for the sift CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Types,
    OrderBy,
    Errors,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "types" | "type" => Some(Self::Types),
            "order_by" | "orderby" | "sort" => Some(Self::OrderBy),
            "errors" | "error" => Some(Self::Errors),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"SIFT DOCUMENTATION

Sift is a small filter and sort language for untrusted clients. Every column
is checked against a catalog and every value is converted to the column's
type before a query runs, so a bad query fails at parse time with a message
that points at the offending text.

DOCUMENTATION CATEGORIES

  syntax            Clauses, conjunctions, negation and grouping
  operators         Comparison, text search, between, in and null tests
  types             Column types and how literals are converted
  order-by          Sort expressions
  errors            What each error means and where its position points

QUICK REFERENCE

  name eq 'Alice'                   Comparison
  name startswith 'A'               Text search (case-insensitive)
  id between 2 and 4                Inclusive range
  id in (1, 2, 57)                  Membership
  name is not null                  Null test
  a eq 1 and (b eq 2 or c eq 3)     Grouping
  metadata["color"] eq 'red'        Nested key

Run 'sift doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        Some(DocCategory::OrderBy) => Ok(ORDER_BY_DOC),
        Some(DocCategory::Errors) => Ok(ERRORS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Clauses and Grouping

CLAUSE
  column operator value
    Column names are resolved case-insensitively against the catalog.
    Aliases declared in the catalog are accepted too.

    Example:
      id gt 1
      Name eq 'Alice Smith'

STRING LITERALS
  'text'
    Single quotes. Write a doubled apostrophe for a literal one.

    Example:
      name eq 'O''Shea'

CONJUNCTIONS
  clause and clause
  clause or clause
    There is no precedence. A sequence is folded strictly left to right:

      a or b and c     means   (a or b) and c

    Use parentheses to group explicitly.

NEGATION
  not clause
  not ( sequence )
    Inverts a single clause or a group.

GROUPING
  ( sequence )
    A group with a single clause is the same as the clause itself.

NESTED KEYS
  column["key"]["sub"]
    Only for columns declared with "nested": true. A missing final key is
    null; a missing intermediate key never matches anything.

EMPTY FILTER
  An empty filter matches every record.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS

COMPARISON
  eq   =  ==        Equal
  ne   != <>        Not equal (also matches null fields)
  gt   >            Greater than
  ge   >=           Greater than or equal
  lt   <            Less than
  le   <=           Less than or equal

TEXT SEARCH (string and json columns only)
  contains          Substring, case-insensitive
  startswith        Prefix, case-insensitive
  endswith          Suffix, case-insensitive

    Example:
      name contains 's'

RANGE
  column between low and high
    Inclusive on both ends. If low is greater than high nothing matches.

MEMBERSHIP
  column in (v1, v2, ...)
    At least one value is required. Order does not matter.

NULL TESTS
  column is null
  column is not null
    The only way to test for null. An unquoted null used as a value is the
    text "null".
"#;

const TYPES_DOC: &str = r#"TYPES - Column Types and Literal Conversion

Every literal is converted to its column's declared type when the query is
parsed. A value that does not convert is rejected.

  string     Any literal, kept as text
  integer    Whole numbers:              id eq 57
  decimal    Exact base-10 numbers:      paycheck le 1000.50
  boolean    true / false:               active eq true
  date       ISO-8601 text:              hired gt '2020-01-01'
             or a keyword:               hired lt today
             Keywords: now, today, tomorrow, yesterday (UTC)
  json       Untyped. Numbers, booleans and text keep the type the
             literal was written in.

Text search operators are rejected on integer, decimal, boolean and date
columns.
"#;

const ORDER_BY_DOC: &str = r#"ORDER BY

  column [asc|desc], column [asc|desc], ...
    Direction defaults to asc. ascending and descending are accepted too.

    Example:
      name asc, hired desc

  Nulls sort before every other value. Records that compare equal keep
  their input order.
"#;

const ERRORS_DOC: &str = r#"ERRORS

Every error carries the original text, whether it came from the filter or
the order by, and the character offset it points at.

  unknown column            The name is not in the catalog
  unterminated string       A ' was never closed; points at the opening quote
  unterminated json key     A [" was never closed; points at the [
  field type mismatch       A value does not convert to the column type, or
                            an operator does not apply to it
  too many parameters       The query has more values than the catalog allows;
                            points at the first value over the limit
  unexpected token          Something other than what the grammar expects,
                            or a ( nested more than 64 groups deep
  unbalanced parentheses    A ( without ) or a ) without (
"#;
