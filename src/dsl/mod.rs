//! Boolean conditional expression DSL.
//!
//! Syntax:
//!   name                        - bare word (truthy parameter)
//!   name op value               - condition, op in == = != < <= > >= & |
//!   name between v1 and v2      - inclusive range
//!   base.name op value          - qualified parameter (one `.` at most)
//!   "quoted value"              - values with spaces
//!   flags & ~64                 - bitwise negation, evaluates to flags & -65
//!   not expr                    - NOT (binds tightest)
//!   expr and expr               - AND
//!   expr or expr                - OR (loosest)
//!   (expr)                      - grouping
//!
//! Keywords are case-insensitive.

mod ast;
mod clauses;
mod lexer;
mod parser;

use std::sync::LazyLock;

pub use ast::*;
pub use clauses::{ClauseAction, ClauseKind, ClauseMatch};
pub use parser::{Clause, GrammarConfig, Parser};

use crate::error::ParseError;

static STANDARD: LazyLock<Parser> = LazyLock::new(Parser::standard);
static SQL: LazyLock<Parser> = LazyLock::new(Parser::sql);

/// Parse with the standard grammar (conditions, between conditions, words).
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    STANDARD.parse(input)
}

/// Parse with the SQL grammar, which rejects bare words.
pub fn parse_sql(input: &str) -> Result<Expr, ParseError> {
    SQL.parse(input)
}
