//! Parse boolean conditional expressions such as
//! `x > 5 and (name = foo* or not flags & ~64)` into a typed AST, and lower
//! them into SQL filter predicates over described models.

pub mod config;
pub mod dsl;
pub mod error;
pub mod sql;

pub use dsl::{Expr, parse, parse_sql};
pub use error::{GrammarError, LowerError, ParseError};
