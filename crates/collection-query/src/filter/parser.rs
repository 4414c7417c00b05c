//! Recursive descent parser for filter expressions.

use super::ast::{Expr, Filter, Literal};
use super::error::{FilterError, FilterResult};
use super::lexer::{tokenize, FilterToken, PositionedToken};
use crate::config::FilterConfig;

/// Parser for filter expressions.
///
/// # Grammar
///
/// ```text
/// expression ::= or_expr
/// or_expr    ::= and_expr ("or" and_expr)*
/// and_expr   ::= unary_expr ("and" unary_expr)*
/// unary_expr ::= "not" unary_expr | primary
/// primary    ::= "(" expression ")" | comparison
/// comparison ::= IDENT operator literal
/// operator   ::= "==" | "!=" | ">" | ">=" | "<" | "<=" | "~" | "!~"
/// literal    ::= STRING | NUMBER | "true" | "false" | "null"
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `not` - unary
/// 2. `and` - binary, left-associative
/// 3. `or` - binary, left-associative
///
/// # Example
///
/// ```
/// use collection_query_rs::filter::{Filter, FilterParser};
///
/// let filter = FilterParser::parse("str == 'a' or not int == 1").unwrap();
/// assert_eq!(filter.to_string(), "str == 'a' or not int == 1");
///
/// // An empty filter matches everything.
/// assert_eq!(FilterParser::parse("").unwrap(), Filter::MatchAll);
/// ```
pub struct FilterParser<'a> {
    input: &'a str,
    tokens: Vec<PositionedToken>,
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> FilterParser<'a> {
    /// Parses a filter expression string with the default limits.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Syntax` for malformed input and
    /// `FilterError::LimitExceeded` when the input is too long or too deeply
    /// nested.
    pub fn parse(input: &str) -> FilterResult<Filter> {
        FilterParser::parse_with_config(input, &FilterConfig::default())
    }

    /// Parses a filter expression string with the given limits.
    pub fn parse_with_config(input: &str, config: &FilterConfig) -> FilterResult<Filter> {
        if input.len() > config.max_length {
            return Err(FilterError::limit_exceeded("length", config.max_length));
        }

        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Ok(Filter::MatchAll);
        }

        let mut parser = FilterParser {
            input,
            tokens,
            position: 0,
            depth: 0,
            max_depth: config.max_depth,
        };
        let expr = parser.parse_expression()?;

        // Check that we consumed all tokens
        if let Some(remaining) = parser.peek() {
            return Err(parser.unexpected(remaining, "unexpected trailing input"));
        }

        Ok(Filter::Expr(expr))
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<PositionedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks if the current token matches the expected token type.
    fn check(&self, expected: &FilterToken) -> bool {
        self.peek().is_some_and(|pt| &pt.token == expected)
    }

    /// Builds a syntax error pointing at `token`.
    fn unexpected(&self, token: &PositionedToken, message: &str) -> FilterError {
        FilterError::syntax(
            message,
            &self.input[token.position..token.end],
            token.position,
        )
    }

    /// Builds a syntax error pointing at the end of input.
    fn end_of_input(&self, message: &str) -> FilterError {
        FilterError::syntax(
            format!("unexpected end of expression, {}", message),
            "",
            self.input.len(),
        )
    }

    /// Records one more level of nesting.
    fn descend(&mut self) -> FilterResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FilterError::limit_exceeded("depth", self.max_depth));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    /// Parses the top-level expression (OR expression).
    fn parse_expression(&mut self) -> FilterResult<Expr> {
        self.parse_or_expr()
    }

    /// Parses OR expressions: `and_expr ("or" and_expr)*`
    fn parse_or_expr(&mut self) -> FilterResult<Expr> {
        let mut left = self.parse_and_expr()?;

        while self.check(&FilterToken::Or) {
            self.advance(); // consume 'or'
            let right = self.parse_and_expr()?;
            left = Expr::or(left, right);
        }

        Ok(left)
    }

    /// Parses AND expressions: `unary_expr ("and" unary_expr)*`
    fn parse_and_expr(&mut self) -> FilterResult<Expr> {
        let mut left = self.parse_unary_expr()?;

        while self.check(&FilterToken::And) {
            self.advance(); // consume 'and'
            let right = self.parse_unary_expr()?;
            left = Expr::and(left, right);
        }

        Ok(left)
    }

    /// Parses unary expressions: `"not" unary_expr | primary`
    fn parse_unary_expr(&mut self) -> FilterResult<Expr> {
        if self.check(&FilterToken::Not) {
            self.advance(); // consume 'not'
            self.descend()?;
            let inner = self.parse_unary_expr()?;
            self.ascend();
            return Ok(Expr::negate(inner));
        }

        self.parse_primary()
    }

    /// Parses primary expressions: `"(" expression ")" | comparison`
    fn parse_primary(&mut self) -> FilterResult<Expr> {
        let token = self
            .advance()
            .ok_or_else(|| self.end_of_input("expected a comparison or '('"))?;

        match token.token {
            FilterToken::OpenParen => {
                self.descend()?;
                let inner = self.parse_expression()?;
                self.ascend();
                match self.advance() {
                    Some(PositionedToken {
                        token: FilterToken::CloseParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(self.unexpected(&other, "expected ')'")),
                    None => Err(self.unexpected(&token, "unclosed parenthesis")),
                }
            }
            FilterToken::Ident(field) => self.parse_comparison(field),
            _ => Err(self.unexpected(&token, "expected a field name or '('")),
        }
    }

    /// Parses the rest of `IDENT operator literal` after the identifier.
    fn parse_comparison(&mut self, field: String) -> FilterResult<Expr> {
        let op = match self.advance() {
            Some(PositionedToken {
                token: FilterToken::Op(op),
                ..
            }) => op,
            Some(other) => {
                return Err(self.unexpected(&other, "expected a comparison operator"))
            }
            None => return Err(self.end_of_input("expected a comparison operator")),
        };

        let token = self
            .advance()
            .ok_or_else(|| self.end_of_input("expected a literal"))?;
        let literal = match token.token {
            FilterToken::Str(s) => Literal::String(s),
            FilterToken::Number(n) => Literal::Number(n),
            FilterToken::Bool(b) => Literal::Bool(b),
            FilterToken::Null => Literal::Null,
            _ => return Err(self.unexpected(&token, "expected a literal")),
        };

        Ok(Expr::comparison(field, op, literal))
    }
}
