//! SQL predicate tree produced by lowering, and its rendering.

use rust_decimal::Decimal;
use std::fmt;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use super::schema::Field;

/// A typed literal bound into a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Boolean(bool),
    Date(Date),
    DateTime(PrimitiveDateTime),
    DateTimeTz(OffsetDateTime),
    Text(String),
}

impl fmt::Display for SqlValue {
    /// Renders the value as a SQL literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Integer(n) => write!(f, "{}", n),
            SqlValue::Float(x) => write!(f, "{:?}", x),
            SqlValue::Decimal(d) => write!(f, "{}", d),
            SqlValue::Boolean(b) => write!(f, "{}", b),
            SqlValue::Date(d) => {
                let format = format_description!("[year]-[month]-[day]");
                let s = d.format(&format).map_err(|_| fmt::Error)?;
                write!(f, "'{}'", s)
            }
            SqlValue::DateTime(dt) => {
                let s = if dt.nanosecond() == 0 {
                    dt.format(&format_description!(
                        "[year]-[month]-[day] [hour]:[minute]:[second]"
                    ))
                } else {
                    dt.format(&format_description!(
                        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"
                    ))
                };
                write!(f, "'{}'", s.map_err(|_| fmt::Error)?)
            }
            SqlValue::DateTimeTz(dt) => {
                let s = if dt.nanosecond() == 0 {
                    dt.format(&format_description!(
                        "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
                    ))
                } else {
                    dt.format(&format_description!(
                        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
                    ))
                };
                write!(f, "'{}'", s.map_err(|_| fmt::Error)?)
            }
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(Field),
    Value(SqlValue),
    /// `lower(...)`, for case-insensitive string comparison
    Lower(Box<Operand>),
}

impl Operand {
    pub fn lower(self) -> Self {
        Operand::Lower(Box::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq, // =
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
}

impl CompareOp {
    /// The operator with its operands swapped: `a < b` iff `b > a`.
    pub fn mirrored(self) -> Self {
        match self {
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
            other => other,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Ne => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Le => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Ge => write!(f, ">="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    And, // &
    Or,  // |
}

impl fmt::Display for BitOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitOp::And => write!(f, "&"),
            BitOp::Or => write!(f, "|"),
        }
    }
}

/// A SQL boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `left op right`
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },

    /// `operand LIKE pattern`
    Like { operand: Operand, pattern: Operand },

    /// `operand IS NULL`
    IsNull(Operand),

    /// `operand IS NOT NULL`
    IsNotNull(Operand),

    /// `operand BETWEEN low AND high`
    Between {
        operand: Operand,
        low: Operand,
        high: Operand,
    },

    /// `(operand op mask) <> 0`
    Bitwise {
        operand: Operand,
        op: BitOp,
        mask: SqlValue,
    },

    /// `value op ANY (column)`: some array element satisfies the comparison
    Any {
        value: SqlValue,
        op: CompareOp,
        column: Field,
    },

    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

/// SQL text with `?` placeholders and the values to bind, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSql {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Predicate {
    /// Render with `?` placeholders instead of inline literals.
    pub fn to_sql(&self) -> BoundSql {
        let mut writer = SqlWriter {
            out: String::new(),
            params: Some(Vec::new()),
        };
        writer.predicate(self);
        BoundSql {
            sql: writer.out,
            params: writer.params.unwrap_or_default(),
        }
    }
}

impl fmt::Display for Predicate {
    /// Renders the predicate with literal values inline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = SqlWriter {
            out: String::new(),
            params: None,
        };
        writer.predicate(self);
        f.write_str(&writer.out)
    }
}

/// Accumulates SQL text; collects values when binding, inlines them otherwise.
struct SqlWriter {
    out: String,
    params: Option<Vec<SqlValue>>,
}

impl SqlWriter {
    fn value(&mut self, value: &SqlValue) {
        match &mut self.params {
            Some(params) => {
                params.push(value.clone());
                self.out.push('?');
            }
            None => self.out.push_str(&value.to_string()),
        }
    }

    fn operand(&mut self, operand: &Operand) {
        match operand {
            Operand::Column(field) => self.out.push_str(&field.to_string()),
            Operand::Value(value) => self.value(value),
            Operand::Lower(inner) => {
                self.out.push_str("lower(");
                self.operand(inner);
                self.out.push(')');
            }
        }
    }

    /// Composite children get parentheses so precedence survives rendering.
    fn nested(&mut self, predicate: &Predicate) {
        if matches!(predicate, Predicate::And(_) | Predicate::Or(_)) {
            self.out.push('(');
            self.predicate(predicate);
            self.out.push(')');
        } else {
            self.predicate(predicate);
        }
    }

    fn predicate(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::Compare { left, op, right } => {
                self.operand(left);
                self.out.push_str(&format!(" {} ", op));
                self.operand(right);
            }
            Predicate::Like { operand, pattern } => {
                self.operand(operand);
                self.out.push_str(" LIKE ");
                self.operand(pattern);
            }
            Predicate::IsNull(operand) => {
                self.operand(operand);
                self.out.push_str(" IS NULL");
            }
            Predicate::IsNotNull(operand) => {
                self.operand(operand);
                self.out.push_str(" IS NOT NULL");
            }
            Predicate::Between { operand, low, high } => {
                self.operand(operand);
                self.out.push_str(" BETWEEN ");
                self.operand(low);
                self.out.push_str(" AND ");
                self.operand(high);
            }
            Predicate::Bitwise { operand, op, mask } => {
                self.out.push('(');
                self.operand(operand);
                self.out.push_str(&format!(" {} ", op));
                self.value(mask);
                self.out.push_str(") <> 0");
            }
            Predicate::Any { value, op, column } => {
                self.value(value);
                self.out.push_str(&format!(" {} ANY ({})", op, column));
            }
            Predicate::And(children) | Predicate::Or(children) => {
                let joiner = if matches!(predicate, Predicate::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(joiner);
                    }
                    self.nested(child);
                }
            }
            Predicate::Not(inner) => {
                self.out.push_str("NOT (");
                self.predicate(inner);
                self.out.push(')');
            }
        }
    }
}
