//! AST types for the expression DSL.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::clauses::ClauseMatch;
use super::lexer::KEYWORDS;
use crate::error::StructuralError;

/// A parameter reference, optionally qualified by a table or alias: `x`, `modela.x`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterName {
    base: Option<String>,
    name: String,
}

impl ParameterName {
    /// Split a dotted name into base and name. At most one `.` is allowed.
    pub fn parse(raw: &str) -> Result<Self, StructuralError> {
        if raw.matches('.').count() > 1 {
            return Err(StructuralError::NestedParameter(raw.to_string()));
        }

        Ok(match raw.split_once('.') {
            Some((base, name)) => ParameterName {
                base: Some(base.to_string()),
                name: name.to_string(),
            },
            None => ParameterName {
                base: None,
                name: raw.to_string(),
            },
        })
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `base.name`, or just `name` when unqualified.
    pub fn fullname(&self) -> String {
        match &self.base {
            Some(base) => format!("{}.{}", base, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname())
    }
}

/// Condition operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Lt,       // <
    Le,       // <=
    Gt,       // >
    Ge,       // >=
    StrictEq, // ==
    Eq,       // =
    Ne,       // !=
    BitAnd,   // &
    BitOr,    // |
    Between,  // between
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::StrictEq => "==",
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::BitAnd => "&",
            Operator::BitOr => "|",
            Operator::Between => "between",
        }
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self, Operator::BitAnd | Operator::BitOr)
    }
}

impl FromStr for Operator {
    type Err = StructuralError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "==" => Operator::StrictEq,
            "=" => Operator::Eq,
            "!=" => Operator::Ne,
            "&" => Operator::BitAnd,
            "|" => Operator::BitOr,
            _ if value.eq_ignore_ascii_case("between") => Operator::Between,
            _ => return Err(StructuralError::UnknownOperator(value.to_string())),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A bare parameter name with no operator: `stuff`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    pub parameter: ParameterName,
}

impl Word {
    pub fn new(parameter: ParameterName) -> Self {
        Word { parameter }
    }

    pub fn from_match(m: ClauseMatch) -> Result<Self, StructuralError> {
        Ok(Word::new(ParameterName::parse(&m.parameter)?))
    }

    pub fn name(&self) -> &str {
        self.parameter.name()
    }

    pub fn fullname(&self) -> String {
        self.parameter.fullname()
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single comparison: `x > 5`, `flags & ~64`, `x between 3 and 5`.
///
/// `value2` is present exactly when the operator is `between`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    parameter: ParameterName,
    operator: Operator,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value2: Option<String>,
}

impl Condition {
    /// Build a single-valued condition. `between` needs [`Condition::between`].
    pub fn new(
        parameter: ParameterName,
        operator: Operator,
        value: impl Into<String>,
    ) -> Result<Self, StructuralError> {
        if operator == Operator::Between {
            return Err(StructuralError::MissingField("value2"));
        }

        Ok(Condition {
            parameter,
            operator,
            value: value.into(),
            value2: None,
        })
    }

    /// Build an inclusive range condition.
    pub fn between(
        parameter: ParameterName,
        low: impl Into<String>,
        high: impl Into<String>,
    ) -> Self {
        Condition {
            parameter,
            operator: Operator::Between,
            value: low.into(),
            value2: Some(high.into()),
        }
    }

    /// Build a condition from a clause match, normalizing `~` negations.
    pub fn from_match(m: ClauseMatch) -> Result<Self, StructuralError> {
        let parameter = ParameterName::parse(&m.parameter)?;
        let operator: Operator = m
            .operator
            .as_deref()
            .ok_or(StructuralError::MissingField("operator"))?
            .parse()?;

        if operator == Operator::Between {
            let low = m.value1.ok_or(StructuralError::MissingField("value1"))?;
            let high = m.value2.ok_or(StructuralError::MissingField("value2"))?;
            return Ok(Condition::between(
                parameter,
                normalize_bitwise(low, operator)?,
                normalize_bitwise(high, operator)?,
            ));
        }

        let value = m.value.ok_or(StructuralError::MissingField("value"))?;
        Condition::new(parameter, operator, normalize_bitwise(value, operator)?)
    }

    pub fn parameter(&self) -> &ParameterName {
        &self.parameter
    }

    pub fn name(&self) -> &str {
        self.parameter.name()
    }

    pub fn base(&self) -> Option<&str> {
        self.parameter.base()
    }

    pub fn fullname(&self) -> String {
        self.parameter.fullname()
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn value2(&self) -> Option<&str> {
        self.value2.as_deref()
    }

    /// The clause as it would be written, with spaces and the full name.
    pub fn input_clause(&self) -> String {
        match &self.value2 {
            Some(high) => format!(
                "{} {} {} and {}",
                self.fullname(),
                self.operator,
                quoted(&self.value),
                quoted(high)
            ),
            None => format!(
                "{} {} {}",
                self.fullname(),
                self.operator,
                quoted(&self.value)
            ),
        }
    }
}

/// Wrap a value in double quotes when it would not lex back as one token.
fn quoted(value: &str) -> String {
    let plain = !value.is_empty()
        && !KEYWORDS.iter().any(|kw| value.eq_ignore_ascii_case(kw))
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.*".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("\"{}\"", value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name(), self.operator, self.value)?;
        if let Some(high) = &self.value2 {
            write!(f, "and{}", high)?;
        }
        Ok(())
    }
}

/// Strip `~` from a value. Under `&` and `|` the numeral becomes its
/// bitwise complement (`~64` -> `-65`); elsewhere the marker is dropped.
fn normalize_bitwise(value: String, operator: Operator) -> Result<String, StructuralError> {
    if !value.contains('~') {
        return Ok(value);
    }

    let stripped = value.replace('~', "");
    if operator.is_bitwise() {
        let n: i64 = stripped
            .parse()
            .map_err(|_| StructuralError::BitwiseValue(value.clone()))?;
        Ok((!n).to_string())
    } else {
        tracing::warn!(
            value = %value,
            operator = %operator,
            "dropping ~ outside a bitwise condition"
        );
        Ok(stripped)
    }
}

/// Root expression node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Expr {
    /// Bare parameter: `stuff`
    Word(Word),

    /// Comparison: `x > 5`, `x between 3 and 5`
    Condition(Condition),

    /// Boolean NOT: `not expr`
    Not(Box<Expr>),

    /// Boolean AND over a same-precedence chain: `a and b and c`
    And(Vec<Expr>),

    /// Boolean OR over a same-precedence chain: `a or b or c`
    Or(Vec<Expr>),
}

impl Expr {
    /// The combinator keyword, if this is a combinator.
    pub fn logicop(&self) -> Option<&'static str> {
        match self {
            Expr::Not(_) => Some("not"),
            Expr::And(_) => Some("and"),
            Expr::Or(_) => Some("or"),
            Expr::Word(_) | Expr::Condition(_) => None,
        }
    }

    /// Unique full names of every parameter in the tree.
    pub fn params(&self) -> BTreeSet<String> {
        let mut params = BTreeSet::new();
        self.collect_params(&mut params);
        params
    }

    fn collect_params(&self, params: &mut BTreeSet<String>) {
        match self {
            Expr::Word(word) => {
                params.insert(word.fullname());
            }
            Expr::Condition(cond) => {
                params.insert(cond.fullname());
            }
            Expr::Not(inner) => inner.collect_params(params),
            Expr::And(children) | Expr::Or(children) => {
                for child in children {
                    child.collect_params(params);
                }
            }
        }
    }

    /// Direct children of a combinator; a leaf is its own single condition.
    pub fn conditions(&self) -> &[Expr] {
        match self {
            Expr::Not(inner) => std::slice::from_ref(inner.as_ref()),
            Expr::And(children) | Expr::Or(children) => children,
            Expr::Word(_) | Expr::Condition(_) => std::slice::from_ref(self),
        }
    }

    /// Every condition leaf, left to right.
    pub fn leaf_conditions(&self) -> Vec<&Condition> {
        match self {
            Expr::Condition(cond) => vec![cond],
            Expr::Word(_) => Vec::new(),
            Expr::Not(inner) => inner.leaf_conditions(),
            Expr::And(children) | Expr::Or(children) => {
                children.iter().flat_map(Expr::leaf_conditions).collect()
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Word(word) => write!(f, "{}", word),
            Expr::Condition(cond) => write!(f, "{}", cond),
            Expr::Not(inner) => write!(f, "not_({})", inner),
            Expr::And(children) | Expr::Or(children) => {
                write!(f, "{}_(", self.logicop().unwrap_or_default())?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}
