//! Parser for the expression DSL.
//!
//! Grammar (in rough EBNF):
//!
//! expr     = or_expr
//! or_expr  = and_expr ("or" and_expr)*
//! and_expr = not_expr ("and" not_expr)*
//! not_expr = "not" not_expr | primary
//! primary  = "(" expr ")" | clause
//! clause   = first registered clause shape that matches
//!
//! A same-precedence chain collapses into one n-ary node, so
//! `a and b and c` is a single `And` with three children.

use super::ast::Expr;
use super::clauses::{ClauseAction, ClauseKind};
use super::lexer::{Spanned, Token, tokenize};
use crate::error::{GrammarError, ParseError, SyntaxError};

/// A clause shape and the action that turns its match into a node.
#[derive(Debug, Clone, Copy)]
pub struct Clause {
    pub kind: ClauseKind,
    pub action: ClauseAction,
}

/// The clause shapes a parser recognizes, in priority order.
#[derive(Debug, Clone)]
pub struct GrammarConfig {
    clauses: Vec<Clause>,
}

impl GrammarConfig {
    /// Register clause kinds with a parallel list of actions.
    pub fn build(
        clauses: Vec<ClauseKind>,
        actions: Vec<ClauseAction>,
    ) -> Result<Self, GrammarError> {
        if clauses.is_empty() {
            return Err(GrammarError::NoClauses);
        }
        if clauses.len() != actions.len() {
            return Err(GrammarError::ActionCount {
                clauses: clauses.len(),
                actions: actions.len(),
            });
        }

        let clauses = clauses
            .into_iter()
            .zip(actions)
            .map(|(kind, action)| Clause { kind, action })
            .collect();
        Ok(GrammarConfig { clauses })
    }

    /// Register clause kinds with their default actions.
    pub fn with_clauses(clauses: &[ClauseKind]) -> Result<Self, GrammarError> {
        if clauses.is_empty() {
            return Err(GrammarError::NoClauses);
        }
        Ok(GrammarConfig {
            clauses: default_clauses(clauses),
        })
    }

    /// Between conditions, conditions and bare words.
    pub fn standard() -> Self {
        GrammarConfig {
            clauses: default_clauses(&[
                ClauseKind::Between,
                ClauseKind::Condition,
                ClauseKind::Word,
            ]),
        }
    }

    /// Conditions only; bare words have no SQL meaning beyond a truthiness test.
    pub fn sql() -> Self {
        GrammarConfig {
            clauses: default_clauses(&[ClauseKind::Between, ClauseKind::Condition]),
        }
    }
}

fn default_clauses(kinds: &[ClauseKind]) -> Vec<Clause> {
    kinds
        .iter()
        .map(|&kind| Clause {
            kind,
            action: kind.default_action(),
        })
        .collect()
}

/// Parses text against a fixed grammar. Immutable and safe to share.
#[derive(Debug, Clone)]
pub struct Parser {
    grammar: GrammarConfig,
}

impl Parser {
    pub fn new(grammar: GrammarConfig) -> Self {
        Parser { grammar }
    }

    pub fn standard() -> Self {
        Parser::new(GrammarConfig::standard())
    }

    pub fn sql() -> Self {
        Parser::new(GrammarConfig::sql())
    }

    /// Parse the whole input into an expression tree.
    pub fn parse(&self, input: &str) -> Result<Expr, ParseError> {
        let tokens = tokenize(input)?;
        let mut cursor = Cursor {
            input,
            tokens: &tokens,
            pos: 0,
            depth: 0,
            grammar: &self.grammar,
        };

        let expr = cursor.parse_or_expr()?;

        // Ensure we consumed all tokens
        if !matches!(cursor.peek(), Token::Eof) {
            return Err(cursor.error("expected 'and', 'or' or end of input").into());
        }

        tracing::debug!(input, parsed = %expr, "parsed expression");
        Ok(expr)
    }
}

/// Deepest `not`/parenthesis nesting accepted.
const MAX_DEPTH: usize = 256;

/// Per-call parser state.
struct Cursor<'a> {
    input: &'a str,
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
    grammar: &'a GrammarConfig,
}

impl Cursor<'_> {
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map_or(&Token::Eof, |s| &s.token)
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.input.len(), |s| s.offset);
        SyntaxError::at(self.input, offset, message)
    }

    /// Enter one level of `not` or `(` nesting.
    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("expression nested too deeply").into());
        }
        self.depth += 1;
        Ok(())
    }

    /// Parse OR expression: and_expr ("or" and_expr)*
    fn parse_or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut children = vec![self.parse_and_expr()?];

        while self.peek().is_keyword("or") {
            self.pos += 1; // consume or
            children.push(self.parse_and_expr()?);
        }

        Ok(collapse(children, Expr::Or))
    }

    /// Parse AND expression: not_expr ("and" not_expr)*
    fn parse_and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut children = vec![self.parse_not_expr()?];

        while self.peek().is_keyword("and") {
            self.pos += 1; // consume and
            children.push(self.parse_not_expr()?);
        }

        Ok(collapse(children, Expr::And))
    }

    /// Parse NOT expression: "not" not_expr | primary
    fn parse_not_expr(&mut self) -> Result<Expr, ParseError> {
        if self.peek().is_keyword("not") {
            self.descend()?;
            self.pos += 1; // consume not
            let inner = self.parse_not_expr()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }

        self.parse_primary()
    }

    /// Parse primary expression: "(" expr ")" | clause
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.peek(), Token::LParen) {
            self.descend()?;
            self.pos += 1; // consume (
            let inner = self.parse_or_expr()?;
            if !matches!(self.peek(), Token::RParen) {
                return Err(self.error("expected ')'").into());
            }
            self.pos += 1;
            self.depth -= 1;
            return Ok(inner);
        }

        for clause in &self.grammar.clauses {
            if let Some((m, next)) = clause.kind.matches(self.tokens, self.pos) {
                tracing::trace!(
                    clause = clause.kind.label(),
                    parameter = %m.parameter,
                    "matched clause"
                );
                self.pos = next;
                return Ok((clause.action)(m)?);
            }
        }

        let expected: Vec<&str> = self
            .grammar
            .clauses
            .iter()
            .map(|c| c.kind.label())
            .collect();
        Err(self
            .error(format!("expected {} or '('", expected.join(", ")))
            .into())
    }
}

/// A single operand stays as is; more become one n-ary node.
fn collapse(mut children: Vec<Expr>, combine: fn(Vec<Expr>) -> Expr) -> Expr {
    if children.len() == 1 {
        children.remove(0)
    } else {
        combine(children)
    }
}
