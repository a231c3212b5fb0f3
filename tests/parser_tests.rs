// tests/parser_tests.rs

use rust_decimal::Decimal;
use sift_lang::ast::{ClauseKind, Conjunction, OperationType, SortDirection};
use sift_lang::catalog::{Catalog, Column, FieldType};
use sift_lang::error::{ParsingContext, QueryError};
use sift_lang::parser::{parse_filter, parse_order_by};
use sift_lang::value::Value;

fn catalog() -> Catalog {
    Catalog::builder("employees")
        .column(Column::new("id", FieldType::Integer))
        .column(Column::new("name", FieldType::String).with_alias("fullname"))
        .column(Column::new("hired", FieldType::Date))
        .column(Column::new("paycheck", FieldType::Decimal))
        .column(Column::new("onduty", FieldType::Boolean))
        .column(Column::new("metadata", FieldType::Json).with_nested_keys())
        .build()
        .unwrap()
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_simple_sequence() {
    let filter = parse_filter("id gt 1 and paycheck le 1000", &catalog()).unwrap();
    assert_eq!(filter.len(), 2);
    assert_eq!(filter[0].conjunction, Conjunction::And);
    assert_eq!(filter[1].conjunction, Conjunction::None);

    match &filter[0].kind {
        ClauseKind::Criteria {
            column,
            operation,
            value,
        } => {
            assert_eq!(column.name, "id");
            assert_eq!(*operation, OperationType::GreaterThan);
            assert_eq!(*value, Some(Value::Integer(1)));
        }
        other => panic!("unexpected clause {:?}", other),
    }
    match &filter[1].kind {
        ClauseKind::Criteria {
            column,
            operation,
            value,
        } => {
            assert_eq!(column.name, "paycheck");
            assert_eq!(*operation, OperationType::LessOrEqual);
            assert_eq!(*value, Some(Value::Decimal(Decimal::from(1000))));
        }
        other => panic!("unexpected clause {:?}", other),
    }
}

#[test]
fn test_no_precedence_between_conjunctions() {
    let filter = parse_filter("id eq 1 or id eq 2 and id eq 3", &catalog()).unwrap();
    let conjunctions: Vec<_> = filter.iter().map(|c| c.conjunction).collect();
    assert_eq!(
        conjunctions,
        vec![Conjunction::Or, Conjunction::And, Conjunction::None]
    );
}

#[test]
fn test_group_becomes_compound() {
    let filter = parse_filter(
        "id gt 1 and (paycheck lt 1000 or paycheck gt 1000)",
        &catalog(),
    )
    .unwrap();
    assert_eq!(filter.len(), 2);
    match &filter[1].kind {
        ClauseKind::Compound { children } => {
            assert_eq!(children.len(), 2);
            assert_eq!(children[0].conjunction, Conjunction::Or);
        }
        other => panic!("expected compound, got {:?}", other),
    }
}

#[test]
fn test_negation() {
    let filter = parse_filter("not (id eq 1 or id eq 2) and not name is null", &catalog()).unwrap();
    assert!(filter[0].negated);
    assert!(matches!(filter[0].kind, ClauseKind::Compound { .. }));
    assert!(filter[1].negated);
    assert!(matches!(
        filter[1].kind,
        ClauseKind::Criteria {
            operation: OperationType::IsNull,
            value: None,
            ..
        }
    ));
}

#[test]
fn test_between_in_and_null_tests() {
    let filter = parse_filter(
        "id between 2 and 4 and name in ('a', 'b') and name is not null",
        &catalog(),
    )
    .unwrap();

    assert!(matches!(
        &filter[0].kind,
        ClauseKind::Between { lower: Value::Integer(2), upper: Value::Integer(4), .. }
    ));
    match &filter[1].kind {
        ClauseKind::In { values, .. } => assert_eq!(values.len(), 2),
        other => panic!("expected in, got {:?}", other),
    }
    assert!(matches!(
        filter[2].kind,
        ClauseKind::Criteria {
            operation: OperationType::IsNotNull,
            ..
        }
    ));
    assert_eq!(filter.parameter_count(), 4);
}

#[test]
fn test_columns_resolve_by_alias_and_case() {
    let filter = parse_filter("FULLNAME eq 'x' and ID eq 1", &catalog()).unwrap();
    assert_eq!(filter[0].column().unwrap().name, "name");
    assert_eq!(filter[1].column().unwrap().name, "id");
}

#[test]
fn test_empty_filter() {
    assert!(parse_filter("", &catalog()).unwrap().is_empty());
    assert!(parse_filter("  ", &catalog()).unwrap().is_empty());
}

#[test]
fn test_json_key_path() {
    let filter = parse_filter(r#"metadata["team"]["size"] ge 5"#, &catalog()).unwrap();
    assert_eq!(filter[0].json_keys, vec!["team".to_string(), "size".to_string()]);
    assert!(matches!(
        &filter[0].kind,
        ClauseKind::Criteria { value: Some(Value::Integer(5)), .. }
    ));
}

#[test]
fn test_json_literals_keep_their_token_type() {
    let filter = parse_filter(
        "metadata eq 1.5 or metadata eq true or metadata eq 'x' or metadata contains 'y'",
        &catalog(),
    )
    .unwrap();
    let values: Vec<_> = filter
        .iter()
        .map(|c| match &c.kind {
            ClauseKind::Criteria { value, .. } => value.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(
        values,
        vec![
            Some(Value::Decimal(Decimal::new(15, 1))),
            Some(Value::Boolean(true)),
            Some(Value::String("x".into())),
            Some(Value::String("y".into())),
        ]
    );
}

// ============================================================================
// Literal conversion
// ============================================================================

#[test]
fn test_literals_convert_to_column_type() {
    let filter = parse_filter(
        "onduty eq TRUE and hired gt '2024-01-15' and id eq '7' and name eq 42",
        &catalog(),
    )
    .unwrap();

    let values: Vec<_> = filter
        .iter()
        .map(|c| match &c.kind {
            ClauseKind::Criteria { value: Some(v), .. } => v.type_name(),
            _ => "none",
        })
        .collect();
    assert_eq!(values, vec!["boolean", "date", "integer", "string"]);
}

#[test]
fn test_null_keyword_as_operand_is_text() {
    let filter = parse_filter("name contains null", &catalog()).unwrap();
    assert!(matches!(
        &filter[0].kind,
        ClauseKind::Criteria { value: Some(Value::String(s)), .. } if s == "null"
    ));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_column() {
    let err = parse_filter("id eq 1 and nmae eq 'x'", &catalog()).unwrap_err();
    assert_eq!(
        err,
        QueryError::UnknownColumn {
            original_text: "id eq 1 and nmae eq 'x'".to_string(),
            context: ParsingContext::Filter,
            position: 12,
            name: "nmae".to_string(),
        }
    );
}

#[test]
fn test_type_mismatch_on_value() {
    let err = parse_filter("id eq 'abc'", &catalog()).unwrap_err();
    match err {
        QueryError::FieldTypeMismatch {
            position,
            column,
            field_type,
            value,
            ..
        } => {
            assert_eq!(position, 6);
            assert_eq!(column, "id");
            assert_eq!(field_type, FieldType::Integer);
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected error {:?}", other),
    }

    assert!(matches!(
        parse_filter("paycheck gt 'lots'", &catalog()),
        Err(QueryError::FieldTypeMismatch { .. })
    ));
    assert!(matches!(
        parse_filter("hired gt 'last tuesday'", &catalog()),
        Err(QueryError::FieldTypeMismatch { .. })
    ));
}

#[test]
fn test_text_search_on_boolean_column() {
    for text in [
        "onduty contains 's'",
        "onduty contains True",
        "onduty startswith True",
        "onduty endswith True",
    ] {
        let err = parse_filter(text, &catalog()).unwrap_err();
        assert!(
            matches!(err, QueryError::FieldTypeMismatch { position: 7, .. }),
            "{}: {:?}",
            text,
            err
        );
    }
}

#[test]
fn test_nested_keys_on_plain_column() {
    let err = parse_filter(r#"id["x"] eq 1"#, &catalog()).unwrap_err();
    assert!(matches!(err, QueryError::FieldTypeMismatch { position: 2, .. }));
}

#[test]
fn test_unterminated_string_literal() {
    let text = "id eq 1 and name eq 'abc";
    let err = parse_filter(text, &catalog()).unwrap_err();
    assert_eq!(err.position(), 20);
    assert_eq!(err.original_text(), text);
    assert!(matches!(err, QueryError::UnterminatedStringLiteral { .. }));

    // the open literal swallows the rest of the text
    let err = parse_filter("name eq 'abc and id eq 1", &catalog()).unwrap_err();
    assert!(matches!(err, QueryError::UnterminatedStringLiteral { position: 8, .. }));
}

#[test]
fn test_unterminated_json_key() {
    let err = parse_filter(r#"metadata["abc eq 1"#, &catalog()).unwrap_err();
    assert!(matches!(
        err,
        QueryError::UnterminatedJsonKey {
            position: 8,
            context: ParsingContext::Filter,
            ..
        }
    ));
    assert!(err.to_string().contains(r#"JSON Keys should be in the format ["{KeyName}"]"#));
}

#[test]
fn test_unbalanced_parentheses() {
    assert!(matches!(
        parse_filter("(id eq 1", &catalog()),
        Err(QueryError::UnbalancedParentheses { position: 0, .. })
    ));
    assert!(matches!(
        parse_filter("id eq 1)", &catalog()),
        Err(QueryError::UnbalancedParentheses { position: 7, .. })
    ));
}

#[test]
fn test_unexpected_tokens() {
    let cases = vec![
        ("id eq", 5),
        ("id in ()", 7),
        ("id eq 1 name eq 'x'", 8),
        ("id between 1 or 3", 13),
        ("name is 5", 8),
        ("and id eq 1", 0),
        ("id 5", 3),
    ];

    for (text, expected) in cases {
        match parse_filter(text, &catalog()) {
            Err(QueryError::UnexpectedToken { position, .. }) => {
                assert_eq!(position, expected, "input: {}", text)
            }
            other => panic!("input: {}: unexpected result {:?}", text, other),
        }
    }
}

#[test]
fn test_too_many_parameters() {
    let catalog = Catalog::builder("employees")
        .column(Column::new("id", FieldType::Integer))
        .column(Column::new("paycheck", FieldType::Decimal))
        .max_parameters(5)
        .build()
        .unwrap();

    assert!(parse_filter("id in (1,2,3) and paycheck between 1 and 2", &catalog).is_ok());

    let err = parse_filter("id in (1,2,3) and paycheck between 1 and 2 or id eq 9", &catalog).unwrap_err();
    assert!(matches!(
        err,
        QueryError::TooManyParameters {
            maximum: 5,
            position: 52,
            ..
        }
    ));
}

// ============================================================================
// Order by
// ============================================================================

#[test]
fn test_order_by() {
    let sort = parse_order_by("name DESC, hired, id ascending", &catalog()).unwrap();
    let parsed: Vec<_> = sort
        .iter()
        .map(|s| (s.column.name.as_str(), s.direction))
        .collect();
    assert_eq!(
        parsed,
        vec![
            ("name", SortDirection::Descending),
            ("hired", SortDirection::Ascending),
            ("id", SortDirection::Ascending),
        ]
    );
    assert!(parse_order_by("", &catalog()).unwrap().is_empty());
}

#[test]
fn test_order_by_errors() {
    let err = parse_order_by("bogus desc", &catalog()).unwrap_err();
    assert_eq!(err.context(), ParsingContext::OrderBy);
    assert!(matches!(err, QueryError::UnknownColumn { position: 0, .. }));

    assert!(matches!(
        parse_order_by("name sideways", &catalog()),
        Err(QueryError::UnexpectedToken { position: 5, .. })
    ));
    assert!(matches!(
        parse_order_by("name 'abc", &catalog()),
        Err(QueryError::UnterminatedStringLiteral {
            position: 5,
            context: ParsingContext::OrderBy,
            ..
        })
    ));
}

// ============================================================================
// Canonical text
// ============================================================================

#[test]
fn test_display_reparses_to_same_tree() {
    let catalog = catalog();
    let filter = parse_filter(
        "NAME = 'O''Shea' AND NOT (id gt 1 OR id lt 0) and hired between '2024-01-01' and '2024-12-31'",
        &catalog,
    )
    .unwrap();

    let text = filter.to_string();
    assert_eq!(
        text,
        "name eq 'O''Shea' and not (id gt 1 or id lt 0) and hired between '2024-01-01T00:00:00+00:00' and '2024-12-31T00:00:00+00:00'"
    );
    assert_eq!(parse_filter(&text, &catalog).unwrap(), filter);
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn test_deep_nesting_is_rejected() {
    let depth = 100_000;
    let text = format!("{}id eq 1{}", "(".repeat(depth), ")".repeat(depth));
    let err = parse_filter(&text, &catalog()).unwrap_err();
    assert!(matches!(
        err,
        QueryError::UnexpectedToken { position, .. } if position == sift_lang::parser::MAX_DEPTH
    ));

    // the limit is on nesting, not on the number of groups
    let wide = vec!["(id eq 1 or id eq 2)"; 200].join(" and ");
    assert!(parse_filter(&wide, &catalog()).is_ok());
}
