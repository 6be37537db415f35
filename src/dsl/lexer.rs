//! Lexer/tokenizer for the expression DSL.

use winnow::ascii::{digit0, digit1, multispace0};
use winnow::combinator::{alt, delimited, opt};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::error::SyntaxError;

/// Boolean keywords, matched case-insensitively on whole words.
pub const KEYWORDS: [&str; 4] = ["and", "or", "not", "between"];

/// Token types for the DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Names, keywords and bare values all lex as words
    Word(String),
    Quoted(String), // "..." with the quotes stripped
    Number(String), // +1, ~64, +2.5e3

    // Condition operators
    Operator(&'static str),

    // Grouping
    LParen, // (
    RParen, // )

    // End of input
    Eof,
}

impl Token {
    /// Whether this token is the keyword `kw`, ignoring case.
    pub fn is_keyword(&self, kw: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(kw))
    }

    /// The text of a token usable as a parameter name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Token::Word(w) if is_name(w) => Some(w),
            _ => None,
        }
    }

    /// The text of a token usable as a condition value.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Token::Word(w) | Token::Quoted(w) | Token::Number(w) => Some(w),
            _ => None,
        }
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Names start with a letter, `.` or `_` and continue with letters, digits, `.` or `_`.
fn is_name(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '.' || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        && !KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw))
}

type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

/// Lex a bare word: alphanumerics plus `-`, `_`, `.` and the `*` wildcard.
fn lex_word(input: &mut &str) -> PResult<Token> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '*'
    })
    .map(|s: &str| Token::Word(s.to_string()))
    .parse_next(input)
}

/// Lex a double-quoted string on a single line.
fn lex_quoted(input: &mut &str) -> PResult<Token> {
    delimited('"', take_while(0.., |c: char| c != '"' && c != '\n'), '"')
        .map(|s: &str| Token::Quoted(s.to_string()))
        .parse_next(input)
}

/// Lex a signed or bitwise-negated number, e.g. `+5`, `~64`, `+1.5e-3`.
fn lex_number(input: &mut &str) -> PResult<Token> {
    (
        opt(one_of(['+', '-', '~'])),
        digit1,
        opt(('.', digit0)),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .map(|s: &str| Token::Number(s.to_string()))
        .parse_next(input)
}

/// Lex a single token after any leading whitespace. Also returns the
/// length of the input left at the token's start.
fn lex_token(input: &mut &str) -> PResult<(usize, Token)> {
    multispace0.parse_next(input)?;
    let rest = input.len();
    if input.is_empty() {
        return Ok((rest, Token::Eof));
    }

    let token = alt((
        // Two-character operators before their one-character prefixes
        "==".value(Token::Operator("==")),
        "<=".value(Token::Operator("<=")),
        ">=".value(Token::Operator(">=")),
        "!=".value(Token::Operator("!=")),
        "<".value(Token::Operator("<")),
        ">".value(Token::Operator(">")),
        "=".value(Token::Operator("=")),
        "&".value(Token::Operator("&")),
        "|".value(Token::Operator("|")),
        "(".value(Token::LParen),
        ")".value(Token::RParen),
        lex_quoted,
        lex_word,
        lex_number,
    ))
    .parse_next(input)?;
    Ok((rest, token))
}

/// Tokenize the entire input, recording where each token starts.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        let before = remaining;
        match lex_token(&mut remaining) {
            Ok((rest, Token::Eof)) => {
                tokens.push(Spanned {
                    token: Token::Eof,
                    offset: input.len() - rest,
                });
                break;
            }
            Ok((rest, token)) => tokens.push(Spanned {
                token,
                offset: input.len() - rest,
            }),
            Err(_) => {
                let start = before.trim_start_matches([' ', '\t', '\r', '\n']);
                let message = if start.starts_with('"') {
                    "unterminated string"
                } else {
                    "unrecognized token"
                };
                return Err(SyntaxError::at(input, input.len() - start.len(), message));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_simple_condition() {
        assert_eq!(
            kinds("x > 5"),
            vec![
                Token::Word("x".into()),
                Token::Operator(">"),
                Token::Word("5".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(
            kinds("a<=1 b==2 c!=3"),
            vec![
                Token::Word("a".into()),
                Token::Operator("<="),
                Token::Word("1".into()),
                Token::Word("b".into()),
                Token::Operator("=="),
                Token::Word("2".into()),
                Token::Word("c".into()),
                Token::Operator("!="),
                Token::Word("3".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_values() {
        assert_eq!(
            kinds(r#"d = 2020-01-01 n = "Some string" f & ~64 g = +1.5e3"#),
            vec![
                Token::Word("d".into()),
                Token::Operator("="),
                Token::Word("2020-01-01".into()),
                Token::Word("n".into()),
                Token::Operator("="),
                Token::Quoted("Some string".into()),
                Token::Word("f".into()),
                Token::Operator("&"),
                Token::Number("~64".into()),
                Token::Word("g".into()),
                Token::Operator("="),
                Token::Number("+1.5e3".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_offsets() {
        let tokens = tokenize("not (a)").unwrap();
        let offsets: Vec<usize> = tokens.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0, 4, 5, 6, 7]);
    }

    #[test]
    fn test_keywords_and_names() {
        let tokens = kinds("AND andy modela.x _y 5x");
        assert!(tokens[0].is_keyword("and"));
        assert_eq!(tokens[0].as_name(), None);
        assert!(!tokens[1].is_keyword("and"));
        assert_eq!(tokens[1].as_name(), Some("andy"));
        assert_eq!(tokens[2].as_name(), Some("modela.x"));
        assert_eq!(tokens[3].as_name(), Some("_y"));
        assert_eq!(tokens[4].as_name(), None);
        assert_eq!(tokens[4].as_value(), Some("5x"));
    }

    #[test]
    fn test_unrecognized_character() {
        let err = tokenize("x ! 5").unwrap_err();
        assert_eq!(err.column, 3);
        assert_eq!(err.snippet, "x >!<! 5");
        assert_eq!(err.message, "unrecognized token");
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize(r#"x = "abc"#).unwrap_err();
        assert_eq!(err.column, 5);
        assert_eq!(err.message, "unterminated string");

        let err = tokenize("x = 1 and\n  y == \"two\nwords\"").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 8);
        assert_eq!(err.message, "unterminated string");
    }
}
