//! Literal coercion into typed SQL values.

use rust_decimal::Decimal;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use super::predicate::SqlValue;
use super::schema::ScalarType;
use crate::error::LowerError;

/// Whether the literal is the `null` keyword.
pub fn is_null(value: &str) -> bool {
    value.eq_ignore_ascii_case("null")
}

/// Coerce a literal into `scalar`. `field` names the column in errors.
pub fn coerce(field: &str, scalar: ScalarType, value: &str) -> Result<SqlValue, LowerError> {
    let coerced = match scalar {
        ScalarType::Integer => value.parse().ok().map(SqlValue::Integer),
        ScalarType::Float => value
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(SqlValue::Float),
        ScalarType::Decimal => Decimal::from_str(value)
            .or_else(|_| Decimal::from_scientific(value))
            .ok()
            .map(SqlValue::Decimal),
        ScalarType::Boolean => parse_bool(value).map(SqlValue::Boolean),
        ScalarType::Date => parse_date(value).map(SqlValue::Date),
        ScalarType::DateTime => parse_datetime(value),
        ScalarType::String => Some(SqlValue::Text(value.to_string())),
    };

    coerced.ok_or_else(|| LowerError::ValueType {
        field: field.to_string(),
        expected: scalar.label().to_string(),
        received: value.to_string(),
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Some(true),
        "false" | "f" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// `YYYY-MM-DD`, ignoring anything after the first ten characters.
fn parse_date(value: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    let head = value.get(..10).unwrap_or(value);
    Date::parse(head, &format).ok()
}

fn parse_datetime(value: &str) -> Option<SqlValue> {
    // accept a space between date and time as well as `T`
    let normalized = match value.get(10..11) {
        Some(" ") => format!("{}T{}", &value[..10], &value[11..]),
        _ => value.to_string(),
    };

    if let Ok(dt) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Some(SqlValue::DateTimeTz(dt));
    }

    let with_fraction = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let with_minutes = format_description!("[year]-[month]-[day]T[hour]:[minute]");

    PrimitiveDateTime::parse(&normalized, &with_fraction)
        .or_else(|_| PrimitiveDateTime::parse(&normalized, &with_seconds))
        .or_else(|_| PrimitiveDateTime::parse(&normalized, &with_minutes))
        .ok()
        .or_else(|| {
            let format = format_description!("[year]-[month]-[day]");
            Date::parse(&normalized, &format)
                .ok()
                .map(|d| PrimitiveDateTime::new(d, Time::MIDNIGHT))
        })
        .map(SqlValue::DateTime)
}
