use std::path::Path;

use boolean_parser::config::SchemaConfig;
use boolean_parser::dsl::{parse, parse_sql};
use boolean_parser::error::LowerError;
use boolean_parser::sql::{ModelDescriptor, Predicate, SqlValue, filter};

fn models() -> Vec<ModelDescriptor> {
    SchemaConfig::load(Path::new("fixture/models.yaml"))
        .unwrap()
        .descriptors()
        .unwrap()
}

fn lower(input: &str) -> Result<Predicate, LowerError> {
    filter(&parse(input).unwrap(), &models())
}

fn sql(input: &str) -> String {
    lower(input).unwrap().to_string()
}

#[test]
fn exact_equality_on_integers() {
    assert_eq!(sql("modela.x == 5"), "modela.x = 5");
    assert_eq!(sql("modela.x = 5"), "modela.x = 5");
}

#[test]
fn string_equality_is_case_insensitive_contains() {
    assert_eq!(
        sql("modela.name = Some_string"),
        "lower(modela.name) LIKE lower('%Some_string%')"
    );
    assert_eq!(
        sql("modela.name == Some_string"),
        "lower(modela.name) = lower('Some_string')"
    );
    assert_eq!(
        sql("name = \"it's*\""),
        "lower(modela.name) LIKE lower('it''s%')"
    );
}

#[test]
fn null_comparisons() {
    assert_eq!(sql("modela.name = null"), "modela.name IS NULL");
    assert_eq!(sql("nulls != null"), "modela.nulls IS NOT NULL");
}

#[test]
fn missing_field_names_field_and_models() {
    let err = lower("modela.missingfield > 1").unwrap_err();
    match &err {
        LowerError::FieldNotFound { field, tried } => {
            assert!(field.contains("missingfield"));
            assert_eq!(tried, &vec!["modela", "modelb", "modela2"]);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.to_string().contains("missingfield"));
}

#[test]
fn alias_resolution() {
    assert_eq!(sql("modela2.x > 1"), "modela2.x > 1");
    assert_eq!(sql("modela.x > 1"), "modela.x > 1");
    assert_eq!(sql("x > 1"), "modela.x > 1");
    assert_eq!(sql("pk > 1 and z < 2"), "modela.pk > 1 AND modelb.z < 2.0");
}

#[test]
fn typed_literals() {
    assert_eq!(sql("dates > 2020-01-01"), "modela.dates > '2020-01-01'");
    assert_eq!(
        sql("datetimes >= \"2011-11-04 00:05:23\""),
        "modela.datetimes >= '2011-11-04 00:05:23'"
    );
    assert_eq!(sql("bools == yes"), "modela.bools = true");
    assert_eq!(sql("price < 12.50"), "modela.price < 12.50");
}

#[test]
fn coercion_failure_names_field_type_and_literal() {
    let err = lower("x > abc").unwrap_err();
    assert_eq!(
        err,
        LowerError::ValueType {
            field: "x".into(),
            expected: "integer".into(),
            received: "abc".into(),
        }
    );
}

#[test]
fn between_and_bitwise() {
    assert_eq!(
        sql("x between 3 and 5"),
        "modela.x BETWEEN 3 AND 5"
    );
    assert_eq!(sql("flags & ~64"), "(modela.flags & -65) <> 0");
    assert!(matches!(
        lower("name & 4"),
        Err(LowerError::UnsupportedOperator { .. })
    ));
}

#[test]
fn between_on_strings_and_dates() {
    assert_eq!(
        sql("name between Alpha and Mike"),
        "lower(modela.name) BETWEEN lower('Alpha') AND lower('Mike')"
    );
    assert_eq!(
        sql("dates between 2020-01-01 and 2020-12-31"),
        "modela.dates BETWEEN '2020-01-01' AND '2020-12-31'"
    );
    assert_eq!(
        sql("datetimes between \"2011-11-04 00:05:23\" and \"2011-11-05T12:00\""),
        "modela.datetimes BETWEEN '2011-11-04 00:05:23' AND '2011-11-05 12:00:00'"
    );
    assert!(matches!(
        lower("dates between 2020-01-01 and soon"),
        Err(LowerError::ValueType { .. })
    ));
}

#[test]
fn array_fields() {
    assert_eq!(sql("tags == red"), "'red' = ANY (modela.tags)");
    assert_eq!(sql("tags != red"), "'red' != ANY (modela.tags)");
}

#[test]
fn words_and_combinators() {
    assert_eq!(
        sql("bools and not (x > 1 or y < 2)"),
        "modela.bools = true AND NOT (modela.x > 1 OR modela.y < 2)"
    );
}

#[test]
fn bound_parameters() {
    let predicate = filter(
        &parse_sql("name == Bob and x between 1 and 9").unwrap(),
        &models(),
    )
    .unwrap();
    let bound = predicate.to_sql();
    assert_eq!(
        bound.sql,
        "lower(modela.name) = lower(?) AND modela.x BETWEEN ? AND ?"
    );
    assert_eq!(
        bound.params,
        vec![
            SqlValue::Text("Bob".into()),
            SqlValue::Integer(1),
            SqlValue::Integer(9)
        ]
    );
}
