//! Error types for parsing and lowering expressions.

/// The input does not match the grammar at some position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Parsing syntax error ({snippet}) at line:{line}, col:{column}: {message}")]
pub struct SyntaxError {
    /// 1-based line of the failure.
    pub line: usize,
    /// 1-based column (in characters) of the failure.
    pub column: usize,
    /// The offending line with `>!<` marking the failure column.
    pub snippet: String,
    /// What the parser expected at that position.
    pub message: String,
}

impl SyntaxError {
    /// Build an error for a byte offset into `input`.
    pub fn at(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(input.len());
        let before = &input[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let line_end = input[offset..]
            .find('\n')
            .map_or(input.len(), |i| offset + i);
        let column = input[line_start..offset].chars().count() + 1;
        let snippet = format!(
            "{}>!<{}",
            &input[line_start..offset],
            &input[offset..line_end]
        );

        SyntaxError {
            line,
            column,
            snippet,
            message: message.into(),
        }
    }
}

/// A clause matched but produced semantically invalid data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    /// Parameter names allow at most one `.` separator.
    #[error("parameter {0} cannot have more than one .")]
    NestedParameter(String),

    /// A `~` value under a bitwise operator is not an integer.
    #[error("bitwise negation requires an integer, got {0}")]
    BitwiseValue(String),

    /// The clause match lacks a field its action needs.
    #[error("clause is missing its {0}")]
    MissingField(&'static str),

    /// The operator text is not a known condition operator.
    #[error("unknown operator {0}")]
    UnknownOperator(String),
}

/// Failure of `Parser::parse`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// Invalid grammar registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("a grammar needs at least one clause")]
    NoClauses,

    #[error("{clauses} clauses were given {actions} actions")]
    ActionCount { clauses: usize, actions: usize },
}

/// Failure while lowering an expression into a SQL predicate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LowerError {
    /// No model exposes the referenced field.
    #[error("no model among [{}] has field {field}", tried.join(", "))]
    FieldNotFound { field: String, tried: Vec<String> },

    /// The literal cannot be coerced into the field's type.
    #[error("field {field} expects a {expected} value, received {received} instead")]
    ValueType {
        field: String,
        expected: String,
        received: String,
    },

    /// The operator has no meaning for the field's type.
    #[error("operator {operator} is not supported on field {field} of type {field_type}")]
    UnsupportedOperator {
        field: String,
        operator: String,
        field_type: String,
    },
}
