//! Lowering of parsed expressions into SQL predicates.

use super::coerce::{coerce, is_null};
use super::predicate::{BitOp, CompareOp, Operand, Predicate, SqlValue};
use super::schema::{Field, FieldResolver, FieldType, ModelDescriptor, ScalarType, SchemaResolver};
use crate::dsl::{Condition, Expr, Operator, ParameterName, Word};
use crate::error::LowerError;

/// Nodes that can be turned into a SQL predicate over a set of models.
pub trait Lowerable {
    fn to_predicate(
        &self,
        models: &[ModelDescriptor],
        resolver: &dyn FieldResolver,
    ) -> Result<Predicate, LowerError>;
}

/// Lower `expr` against `models`, resolving fields from their column lists.
pub fn filter(expr: &Expr, models: &[ModelDescriptor]) -> Result<Predicate, LowerError> {
    expr.to_predicate(models, &SchemaResolver)
}

impl Lowerable for Expr {
    fn to_predicate(
        &self,
        models: &[ModelDescriptor],
        resolver: &dyn FieldResolver,
    ) -> Result<Predicate, LowerError> {
        match self {
            Expr::Word(word) => word.to_predicate(models, resolver),
            Expr::Condition(cond) => cond.to_predicate(models, resolver),
            Expr::Not(inner) => Ok(Predicate::Not(Box::new(
                inner.to_predicate(models, resolver)?,
            ))),
            Expr::And(children) => Ok(Predicate::And(lower_all(children, models, resolver)?)),
            Expr::Or(children) => Ok(Predicate::Or(lower_all(children, models, resolver)?)),
        }
    }
}

fn lower_all(
    children: &[Expr],
    models: &[ModelDescriptor],
    resolver: &dyn FieldResolver,
) -> Result<Vec<Predicate>, LowerError> {
    children
        .iter()
        .map(|child| child.to_predicate(models, resolver))
        .collect()
}

impl Lowerable for Word {
    /// Boolean fields must be true; anything else must be non-null.
    fn to_predicate(
        &self,
        models: &[ModelDescriptor],
        resolver: &dyn FieldResolver,
    ) -> Result<Predicate, LowerError> {
        let field = resolve(&self.parameter, models, resolver)?;
        Ok(match field.field_type {
            FieldType::Scalar(ScalarType::Boolean) => Predicate::Compare {
                left: Operand::Column(field),
                op: CompareOp::Eq,
                right: Operand::Value(SqlValue::Boolean(true)),
            },
            _ => Predicate::IsNotNull(Operand::Column(field)),
        })
    }
}

impl Lowerable for Condition {
    fn to_predicate(
        &self,
        models: &[ModelDescriptor],
        resolver: &dyn FieldResolver,
    ) -> Result<Predicate, LowerError> {
        let field = resolve(self.parameter(), models, resolver)?;
        match field.field_type {
            FieldType::Scalar(scalar) => lower_scalar(self, field, scalar),
            FieldType::Array(element) => lower_array(self, field, element),
        }
    }
}

/// First model whose resolver accepts the parameter wins.
fn resolve(
    parameter: &ParameterName,
    models: &[ModelDescriptor],
    resolver: &dyn FieldResolver,
) -> Result<Field, LowerError> {
    for model in models {
        if let Some(field) = resolver.resolve_field(model, parameter) {
            tracing::debug!(
                parameter = %parameter,
                model = model.label(),
                field_type = %field.field_type,
                "resolved field"
            );
            return Ok(field);
        }
    }

    Err(LowerError::FieldNotFound {
        field: parameter.fullname(),
        tried: models.iter().map(|m| m.label().to_string()).collect(),
    })
}

fn lower_scalar(cond: &Condition, field: Field, scalar: ScalarType) -> Result<Predicate, LowerError> {
    let value = cond.value();
    let operator = cond.operator();

    match operator {
        Operator::Between => {
            let high = cond.value2().unwrap_or_default();
            let low = Operand::Value(coerce(&field.name, scalar, value)?);
            let high = Operand::Value(coerce(&field.name, scalar, high)?);
            let operand = Operand::Column(field);
            Ok(if scalar == ScalarType::String {
                Predicate::Between {
                    operand: operand.lower(),
                    low: low.lower(),
                    high: high.lower(),
                }
            } else {
                Predicate::Between { operand, low, high }
            })
        }
        Operator::BitAnd | Operator::BitOr => {
            if scalar != ScalarType::Integer {
                return Err(unsupported(&field, operator));
            }
            let mask = coerce(&field.name, ScalarType::Integer, value)?;
            let op = if operator == Operator::BitAnd {
                BitOp::And
            } else {
                BitOp::Or
            };
            Ok(Predicate::Bitwise {
                operand: Operand::Column(field),
                op,
                mask,
            })
        }
        _ if is_null(value) => lower_null(cond, field, scalar),
        Operator::Eq if scalar == ScalarType::String => Ok(Predicate::Like {
            operand: Operand::Column(field).lower(),
            pattern: Operand::Value(SqlValue::Text(like_pattern(value))).lower(),
        }),
        _ => {
            let op = compare_op(operator).ok_or_else(|| unsupported(&field, operator))?;
            let value = Operand::Value(coerce(&field.name, scalar, value)?);
            let column = Operand::Column(field);
            Ok(if scalar == ScalarType::String {
                Predicate::Compare {
                    left: column.lower(),
                    op,
                    right: value.lower(),
                }
            } else {
                Predicate::Compare {
                    left: column,
                    op,
                    right: value,
                }
            })
        }
    }
}

/// Arrays match when some element satisfies the comparison.
fn lower_array(cond: &Condition, field: Field, element: ScalarType) -> Result<Predicate, LowerError> {
    let operator = cond.operator();
    if operator == Operator::Between || operator.is_bitwise() {
        return Err(unsupported(&field, operator));
    }
    if is_null(cond.value()) {
        return lower_null(cond, field, element);
    }

    let op = compare_op(operator).ok_or_else(|| unsupported(&field, operator))?;
    let value = coerce(&field.name, element, cond.value())?;
    Ok(Predicate::Any {
        value,
        op: op.mirrored(),
        column: field,
    })
}

/// `= null` and `!= null` test the column itself; other operators reject null.
fn lower_null(cond: &Condition, field: Field, scalar: ScalarType) -> Result<Predicate, LowerError> {
    match cond.operator() {
        Operator::Eq | Operator::StrictEq => Ok(Predicate::IsNull(Operand::Column(field))),
        Operator::Ne => Ok(Predicate::IsNotNull(Operand::Column(field))),
        _ => Err(LowerError::ValueType {
            field: field.name,
            expected: scalar.label().to_string(),
            received: cond.value().to_string(),
        }),
    }
}

fn compare_op(operator: Operator) -> Option<CompareOp> {
    match operator {
        Operator::Eq | Operator::StrictEq => Some(CompareOp::Eq),
        Operator::Ne => Some(CompareOp::Ne),
        Operator::Lt => Some(CompareOp::Lt),
        Operator::Le => Some(CompareOp::Le),
        Operator::Gt => Some(CompareOp::Gt),
        Operator::Ge => Some(CompareOp::Ge),
        Operator::BitAnd | Operator::BitOr | Operator::Between => None,
    }
}

/// `*` is a wildcard; a value without one matches anywhere in the field.
fn like_pattern(value: &str) -> String {
    if value.contains('*') {
        value.replace('*', "%")
    } else {
        format!("%{}%", value)
    }
}

fn unsupported(field: &Field, operator: Operator) -> LowerError {
    LowerError::UnsupportedOperator {
        field: field.name.clone(),
        operator: operator.to_string(),
        field_type: field.field_type.to_string(),
    }
}
