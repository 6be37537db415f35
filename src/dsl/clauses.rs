//! Clause shapes: the units the grammar matches between boolean keywords.
//!
//! between_condition = NAME "between" VALUE "and" VALUE
//! condition         = NAME OPERATOR VALUE
//! word              = NAME

use super::ast::{Condition, Expr, Word};
use super::lexer::{Spanned, Token};
use crate::error::StructuralError;

/// The raw fields captured by a clause match, before any AST node exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseMatch {
    pub parameter: String,
    pub operator: Option<String>,
    pub value: Option<String>,
    pub value1: Option<String>,
    pub value2: Option<String>,
}

/// Turns a clause match into an AST node.
pub type ClauseAction = fn(ClauseMatch) -> Result<Expr, StructuralError>;

/// A clause shape the grammar can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Between,
    Condition,
    Word,
}

impl ClauseKind {
    pub fn label(self) -> &'static str {
        match self {
            ClauseKind::Between => "between condition",
            ClauseKind::Condition => "condition",
            ClauseKind::Word => "word",
        }
    }

    /// The action that builds this clause's usual node.
    pub fn default_action(self) -> ClauseAction {
        match self {
            ClauseKind::Between | ClauseKind::Condition => {
                |m| Condition::from_match(m).map(Expr::Condition)
            }
            ClauseKind::Word => |m| Word::from_match(m).map(Expr::Word),
        }
    }

    /// Match this shape at `pos`, returning the captured fields and the
    /// position just past the clause. Nothing is consumed on failure.
    pub fn matches(self, tokens: &[Spanned], pos: usize) -> Option<(ClauseMatch, usize)> {
        let at = |i: usize| tokens.get(pos + i).map(|s| &s.token);
        let parameter = at(0)?.as_name()?.to_string();

        match self {
            ClauseKind::Between => {
                if !at(1)?.is_keyword("between") {
                    return None;
                }
                let value1 = at(2)?.as_value()?.to_string();
                if !at(3)?.is_keyword("and") {
                    return None;
                }
                let value2 = at(4)?.as_value()?.to_string();

                let m = ClauseMatch {
                    parameter,
                    operator: Some("between".into()),
                    value1: Some(value1),
                    value2: Some(value2),
                    ..Default::default()
                };
                Some((m, pos + 5))
            }
            ClauseKind::Condition => {
                let Token::Operator(op) = at(1)? else {
                    return None;
                };
                let value = at(2)?.as_value()?.to_string();

                let m = ClauseMatch {
                    parameter,
                    operator: Some((*op).to_string()),
                    value: Some(value),
                    ..Default::default()
                };
                Some((m, pos + 3))
            }
            ClauseKind::Word => {
                let m = ClauseMatch {
                    parameter,
                    ..Default::default()
                };
                Some((m, pos + 1))
            }
        }
    }
}
