//! Filter evaluation against filterable objects.
//!
//! This module provides the [`FilterEvaluator`] for evaluating a parsed
//! [`Filter`] against any type implementing [`Filterable`].
//!
//! # Example
//!
//! ```
//! use collection_query_rs::filter::{FilterEvaluator, FilterParser};
//! use collection_query_rs::schema::{Filterable, SchemaBuilder};
//!
//! struct Item {
//!     name: String,
//!     stock: u32,
//! }
//!
//! impl Filterable for Item {
//!     fn fields(schema: &mut SchemaBuilder<Self>) {
//!         schema.string("name", |i| i.name.as_str());
//!         schema.unsigned("stock", |i| u64::from(i.stock));
//!     }
//! }
//!
//! let filter = FilterParser::parse("name ~ '^bolt' and stock > 0").unwrap();
//! let evaluator = FilterEvaluator::new(&filter);
//!
//! let item = Item { name: "bolt M6".to_string(), stock: 12 };
//! assert!(evaluator.matches(&item).unwrap());
//! ```

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};

use super::ast::{Expr, Filter, Literal, LogicalOp, Operator};
use super::compat;
use super::error::{FilterError, FilterResult};
use crate::config::FilterConfig;
use crate::schema::{describe, Filterable, Schema, Value};

/// Compiled patterns for one evaluation pass, keyed by pattern text.
struct RegexCache {
    size_limit: usize,
    compiled: HashMap<String, Regex>,
}

impl RegexCache {
    fn new(size_limit: usize) -> Self {
        Self {
            size_limit,
            compiled: HashMap::new(),
        }
    }

    fn get(&mut self, pattern: &str) -> FilterResult<&Regex> {
        if !self.compiled.contains_key(pattern) {
            trace!(pattern, "compiling filter regex");
            let regex = RegexBuilder::new(pattern)
                .size_limit(self.size_limit)
                .build()
                .map_err(|err| FilterError::regex(pattern, err))?;
            self.compiled.insert(pattern.to_string(), regex);
        }
        Ok(&self.compiled[pattern])
    }
}

/// Evaluates a parsed filter against objects.
///
/// The evaluator borrows the filter and never mutates it or the objects it
/// inspects, so one filter can serve any number of evaluators and threads.
/// `and`/`or` short-circuit from left to right; the first error aborts the
/// evaluation.
#[derive(Debug)]
pub struct FilterEvaluator<'a> {
    filter: &'a Filter,
    regex_size_limit: usize,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates a new filter evaluator with the default limits.
    pub fn new(filter: &'a Filter) -> Self {
        Self::with_config(filter, &FilterConfig::default())
    }

    /// Creates a new filter evaluator with the given limits.
    pub fn with_config(filter: &'a Filter, config: &FilterConfig) -> Self {
        Self {
            filter,
            regex_size_limit: config.regex_size_limit,
        }
    }

    /// Returns whether `item` matches the filter.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::TypeMismatch` for unknown fields or incompatible
    /// comparisons, and `FilterError::Regex` for patterns that do not compile.
    pub fn matches<T: Filterable>(&self, item: &T) -> FilterResult<bool> {
        let Filter::Expr(expr) = self.filter else {
            return Ok(true);
        };

        let mut regexes = RegexCache::new(self.regex_size_limit);
        self.matches_with(expr, describe::<T>(), item, &mut regexes)
    }

    /// Filters a slice of items, returning only those that match.
    ///
    /// The schema is looked up once and compiled patterns are shared across
    /// the whole slice. The first error aborts the pass.
    pub fn filter_items<'b, T: Filterable>(&self, items: &'b [T]) -> FilterResult<Vec<&'b T>> {
        let Filter::Expr(expr) = self.filter else {
            return Ok(items.iter().collect());
        };

        let schema = describe::<T>();
        let mut regexes = RegexCache::new(self.regex_size_limit);
        let mut matched = Vec::new();
        for item in items {
            if self.matches_with(expr, schema, item, &mut regexes)? {
                matched.push(item);
            }
        }
        Ok(matched)
    }

    fn matches_with<T>(
        &self,
        expr: &Expr,
        schema: &Schema<T>,
        item: &T,
        regexes: &mut RegexCache,
    ) -> FilterResult<bool> {
        self.evaluate_expr(expr, schema, item, regexes)
            .inspect_err(|err| {
                debug!(
                    filter = %expr,
                    type_name = schema.type_name(),
                    error = %err,
                    "filter evaluation failed"
                );
            })
    }

    /// Evaluates an expression node against an item.
    fn evaluate_expr<T>(
        &self,
        expr: &Expr,
        schema: &Schema<T>,
        item: &T,
        regexes: &mut RegexCache,
    ) -> FilterResult<bool> {
        match expr {
            Expr::Comparison { field, op, literal } => {
                self.evaluate_comparison(field, *op, literal, schema, item, regexes)
            }
            Expr::Logical { op, left, right } => {
                let left = self.evaluate_expr(left, schema, item, regexes)?;
                match (op, left) {
                    (LogicalOp::And, false) => Ok(false),
                    (LogicalOp::Or, true) => Ok(true),
                    _ => self.evaluate_expr(right, schema, item, regexes),
                }
            }
            Expr::Not(inner) => Ok(!self.evaluate_expr(inner, schema, item, regexes)?),
        }
    }

    /// Evaluates `field op literal` against an item.
    fn evaluate_comparison<T>(
        &self,
        field: &str,
        op: Operator,
        literal: &Literal,
        schema: &Schema<T>,
        item: &T,
        regexes: &mut RegexCache,
    ) -> FilterResult<bool> {
        let descriptor = schema
            .resolve(field)
            .ok_or_else(|| FilterError::unknown_field(field, schema.suggest(field)))?;

        compat::check(descriptor.semantic_type(), op, literal.kind())
            .map_err(|reason| FilterError::type_mismatch(field, reason))?;

        // Patterns compile even when the field turns out to be absent, so an
        // invalid pattern is always reported.
        let regex = match (op, literal) {
            (Operator::Match | Operator::NotMatch, Literal::String(pattern)) => {
                Some(regexes.get(pattern)?)
            }
            _ => None,
        };

        let value = descriptor.read(item);

        if let Literal::Null = literal {
            return Ok(match op {
                Operator::Ne => !value.is_null(),
                _ => value.is_null(),
            });
        }

        // An absent value equals no present literal.
        if value.is_null() {
            return Ok(matches!(op, Operator::Ne | Operator::NotMatch));
        }

        match (literal, value) {
            (Literal::String(text), Value::Str(actual)) => Ok(match regex {
                Some(regex) => regex.is_match(actual) == (op == Operator::Match),
                None => op.holds(actual.cmp(text.as_str())),
            }),
            (Literal::Number(number), Value::Int(_) | Value::Uint(_) | Value::Float(_)) => {
                let ordering = value.as_f64().and_then(|actual| actual.partial_cmp(number));
                Ok(op.holds_partial(ordering))
            }
            (Literal::Bool(expected), Value::Bool(actual)) => Ok(op.holds(actual.cmp(expected))),
            // Unreachable: SchemaBuilder ties each declared type to one Value
            // variant, and compat::check has already accepted the pairing.
            _ => Err(FilterError::type_mismatch(
                field,
                format!(
                    "{} field read as {:?}",
                    descriptor.semantic_type(),
                    value
                ),
            )),
        }
    }
}
