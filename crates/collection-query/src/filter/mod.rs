//! Filter expression parser and evaluator.
//!
//! This module provides a lexer, parser and evaluator for the `_filter`
//! collection query parameter, so objects can be matched against a
//! caller-supplied boolean expression before they reach a backend.
//!
//! # Supported Syntax
//!
//! ## Comparisons
//! - `field == literal`, `field != literal`
//! - `field > literal`, `>=`, `<`, `<=` - strings and numbers only
//! - `field ~ 'regex'`, `field !~ 'regex'` - strings only, unanchored search
//!
//! ## Literals
//! - `'text'` - single-quoted, no escapes
//! - `12`, `-3.5` - numbers
//! - `true`, `false`
//! - `null` - only with `==`/`!=` on nullable fields
//!
//! ## Boolean Operators
//! - `and`
//! - `or`
//! - `not`
//! - `()` - Grouping
//!
//! `not` binds tighter than `and`, which binds tighter than `or`. An empty
//! filter matches everything.
//!
//! # Example
//!
//! ```
//! use collection_query_rs::filter::{FilterEvaluator, FilterParser};
//! use collection_query_rs::schema::{Filterable, SchemaBuilder};
//!
//! struct Message {
//!     str: String,
//!     int: i32,
//! }
//!
//! impl Filterable for Message {
//!     fn fields(schema: &mut SchemaBuilder<Self>) {
//!         schema.string("str", |m| m.str.as_str());
//!         schema.integer("int", |m| i64::from(m.int));
//!     }
//! }
//!
//! let filter = FilterParser::parse("str == '111' and int == 111").unwrap();
//! let evaluator = FilterEvaluator::new(&filter);
//!
//! let msg = Message { str: "111".to_string(), int: 111 };
//! assert!(evaluator.matches(&msg).unwrap());
//! ```

mod ast;
mod compat;
mod error;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{Expr, Filter, Literal, LiteralKind, LogicalOp, Operator};
pub use compat::check as check_compatibility;
pub use error::{FilterError, FilterResult};
pub use evaluator::FilterEvaluator;
pub use lexer::{tokenize, FilterToken, Lexer, PositionedToken};
pub use parser::FilterParser;

#[cfg(test)]
mod tests;
