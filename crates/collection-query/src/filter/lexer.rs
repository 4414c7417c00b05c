//! Lexer (tokenizer) for filter expressions.

use std::iter::Peekable;
use std::str::Chars;

use super::ast::Operator;
use super::error::{FilterError, FilterResult};

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    /// The token.
    pub token: FilterToken,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
    /// The byte position just past the end of the token.
    pub end: usize,
}

/// A token in a filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterToken {
    // ==================== Names and Literals ====================
    /// A field name: `[A-Za-z_][A-Za-z0-9_]*`.
    Ident(String),

    /// A single-quoted string literal (quotes removed, no escapes).
    Str(String),

    /// A numeric literal, integer or decimal, optionally negative.
    Number(f64),

    /// The `true` or `false` keyword.
    Bool(bool),

    /// The `null` keyword.
    Null,

    // ==================== Operators ====================
    /// A comparison operator: `== != > >= < <= ~ !~`.
    Op(Operator),

    /// The `and` keyword.
    And,

    /// The `or` keyword.
    Or,

    /// The `not` keyword.
    Not,

    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,
}

/// Tokenizes a filter expression.
///
/// Fails on the first unrecognized character or unterminated string literal.
/// Empty or whitespace-only input yields no tokens.
pub fn tokenize(input: &str) -> FilterResult<Vec<PositionedToken>> {
    Lexer::new(input).tokenize()
}

/// Lexer for tokenizing filter expressions.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
    /// Current byte position in the input string.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Peeks one character past the next one.
    fn peek_second(&self) -> Option<char> {
        self.input[self.position..].chars().nth(1)
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            self.position += ch.len_utf8();
        }
        c
    }

    /// Consumes the next character if it equals `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.next_char();
        }
    }

    /// Consumes characters while `pred` holds.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.next_char();
        }
    }

    /// Reads an identifier or keyword.
    fn read_word(&mut self, start: usize) -> FilterToken {
        self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        match &self.input[start..self.position] {
            "true" => FilterToken::Bool(true),
            "false" => FilterToken::Bool(false),
            "null" => FilterToken::Null,
            "and" => FilterToken::And,
            "or" => FilterToken::Or,
            "not" => FilterToken::Not,
            word => FilterToken::Ident(word.to_string()),
        }
    }

    /// Reads a single-quoted string; the opening quote is at `start`.
    fn read_string(&mut self, start: usize) -> FilterResult<FilterToken> {
        self.next_char();
        let body_start = self.position;
        loop {
            match self.next_char() {
                Some('\'') => {
                    let body = &self.input[body_start..self.position - 1];
                    return Ok(FilterToken::Str(body.to_string()));
                }
                Some(_) => {}
                None => {
                    return Err(FilterError::syntax(
                        "unterminated string literal",
                        &self.input[start..],
                        start,
                    ))
                }
            }
        }
    }

    /// Reads `-?[0-9]+(\.[0-9]+)?`.
    fn read_number(&mut self, start: usize) -> FilterResult<FilterToken> {
        self.eat('-');
        self.take_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.next_char();
            self.take_while(|c| c.is_ascii_digit());
        }
        let text = &self.input[start..self.position];
        let value = text
            .parse::<f64>()
            .map_err(|_| FilterError::syntax("invalid number", text, start))?;
        // Overflow parses to infinity, which has no literal form.
        if !value.is_finite() {
            return Err(FilterError::syntax("number out of range", text, start));
        }
        Ok(FilterToken::Number(value))
    }

    /// Reads a comparison operator whose first character is `first`.
    fn read_operator(&mut self, first: char, start: usize) -> FilterResult<FilterToken> {
        self.next_char();
        let op = match first {
            '=' if self.eat('=') => Operator::Eq,
            '!' if self.eat('=') => Operator::Ne,
            '!' if self.eat('~') => Operator::NotMatch,
            '>' if self.eat('=') => Operator::Ge,
            '>' => Operator::Gt,
            '<' if self.eat('=') => Operator::Le,
            '<' => Operator::Lt,
            '~' => Operator::Match,
            _ => {
                return Err(FilterError::syntax(
                    "unknown operator",
                    &self.input[start..self.position],
                    start,
                ))
            }
        };
        Ok(FilterToken::Op(op))
    }

    /// Returns the next token with its position, or None at end of input.
    pub fn next_token(&mut self) -> FilterResult<Option<PositionedToken>> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let start = self.position;

        let token = match c {
            '(' => {
                self.next_char();
                FilterToken::OpenParen
            }
            ')' => {
                self.next_char();
                FilterToken::CloseParen
            }
            '\'' => self.read_string(start)?,
            '=' | '!' | '>' | '<' | '~' => self.read_operator(c, start)?,
            '-' if self.peek_second().is_some_and(|n| n.is_ascii_digit()) => {
                self.read_number(start)?
            }
            _ if c.is_ascii_digit() => self.read_number(start)?,
            _ if c.is_ascii_alphabetic() || c == '_' => self.read_word(start),
            _ => {
                return Err(FilterError::syntax(
                    format!("unexpected character '{}'", c),
                    c.to_string(),
                    start,
                ))
            }
        };

        Ok(Some(PositionedToken {
            token,
            position: start,
            end: self.position,
        }))
    }

    /// Collects all tokens, stopping at the first error.
    pub fn tokenize(mut self) -> FilterResult<Vec<PositionedToken>> {
        let mut tokens = Vec::new();
        while let Some(positioned_token) = self.next_token()? {
            tokens.push(positioned_token);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<FilterToken> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|pt| pt.token)
            .collect()
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(kinds("").is_empty());
        assert!(kinds("   \t\n").is_empty());
    }

    #[test]
    fn test_tokenize_simple_comparison() {
        assert_eq!(
            kinds("str == '111'"),
            vec![
                FilterToken::Ident("str".to_string()),
                FilterToken::Op(Operator::Eq),
                FilterToken::Str("111".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_all_operators() {
        assert_eq!(
            kinds("== != > >= < <= ~ !~"),
            vec![
                FilterToken::Op(Operator::Eq),
                FilterToken::Op(Operator::Ne),
                FilterToken::Op(Operator::Gt),
                FilterToken::Op(Operator::Ge),
                FilterToken::Op(Operator::Lt),
                FilterToken::Op(Operator::Le),
                FilterToken::Op(Operator::Match),
                FilterToken::Op(Operator::NotMatch),
            ]
        );
    }

    #[test]
    fn test_tokenize_operators_without_spaces() {
        assert_eq!(
            kinds("int>=5"),
            vec![
                FilterToken::Ident("int".to_string()),
                FilterToken::Op(Operator::Ge),
                FilterToken::Number(5.0),
            ]
        );
    }

    #[test]
    fn test_tokenize_keywords() {
        assert_eq!(
            kinds("true false null and or not"),
            vec![
                FilterToken::Bool(true),
                FilterToken::Bool(false),
                FilterToken::Null,
                FilterToken::And,
                FilterToken::Or,
                FilterToken::Not,
            ]
        );
    }

    #[test]
    fn test_tokenize_keywords_are_case_sensitive() {
        assert_eq!(
            kinds("AND Null"),
            vec![
                FilterToken::Ident("AND".to_string()),
                FilterToken::Ident("Null".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_keyword_prefix_is_identifier() {
        assert_eq!(
            kinds("nullable android"),
            vec![
                FilterToken::Ident("nullable".to_string()),
                FilterToken::Ident("android".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(
            kinds("111 11.11 -5 -0.5"),
            vec![
                FilterToken::Number(111.0),
                FilterToken::Number(11.11),
                FilterToken::Number(-5.0),
                FilterToken::Number(-0.5),
            ]
        );
    }

    #[test]
    fn test_tokenize_number_out_of_range() {
        let input = format!("int < 1{}", "0".repeat(400));
        match tokenize(&input).unwrap_err() {
            FilterError::Syntax {
                message, position, ..
            } => {
                assert_eq!(message, "number out of range");
                assert_eq!(position, 6);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
        assert!(tokenize(&format!("int > -1{}", "0".repeat(400))).is_err());
    }

    #[test]
    fn test_tokenize_large_finite_number() {
        let input = format!("1{}", "0".repeat(300));
        assert_eq!(kinds(&input), vec![FilterToken::Number(1e300)]);
    }

    #[test]
    fn test_tokenize_string_keeps_backslashes() {
        assert_eq!(
            kinds(r"'a\d+'"),
            vec![FilterToken::Str(r"a\d+".to_string())]
        );
    }

    #[test]
    fn test_tokenize_empty_string() {
        assert_eq!(kinds("''"), vec![FilterToken::Str(String::new())]);
    }

    #[test]
    fn test_tokenize_parentheses() {
        assert_eq!(
            kinds("(not a == 1)"),
            vec![
                FilterToken::OpenParen,
                FilterToken::Not,
                FilterToken::Ident("a".to_string()),
                FilterToken::Op(Operator::Eq),
                FilterToken::Number(1.0),
                FilterToken::CloseParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_positions() {
        let tokens = tokenize("str  == 'x'").unwrap();
        let spans: Vec<_> = tokens.iter().map(|t| (t.position, t.end)).collect();
        assert_eq!(spans, vec![(0, 3), (5, 7), (8, 11)]);
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        let err = tokenize("str == 'abc").unwrap_err();
        match err {
            FilterError::Syntax {
                fragment, position, ..
            } => {
                assert_eq!(fragment, "'abc");
                assert_eq!(position, 7);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_tokenize_unknown_character() {
        let err = tokenize("str == 'a' & int == 1").unwrap_err();
        match err {
            FilterError::Syntax {
                fragment, position, ..
            } => {
                assert_eq!(fragment, "&");
                assert_eq!(position, 11);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_tokenize_lone_equals_is_error() {
        assert!(tokenize("str = 'a'").unwrap_err().is_syntax());
        assert!(tokenize("str ! 'a'").unwrap_err().is_syntax());
    }

    #[test]
    fn test_tokenize_lone_minus_is_error() {
        assert!(tokenize("int == -").unwrap_err().is_syntax());
    }

    #[test]
    fn test_tokenize_non_ascii_in_string() {
        assert_eq!(
            kinds("name == 'zoë'"),
            vec![
                FilterToken::Ident("name".to_string()),
                FilterToken::Op(Operator::Eq),
                FilterToken::Str("zoë".to_string()),
            ]
        );
    }
}
