//! Filter expressions for collection queries.
//!
//! A caller passes a boolean expression such as
//! `str == '111' and (int > 10 or nestedJSON == null)` in the `_filter`
//! query parameter; this crate parses it and decides whether an object
//! matches it, based on the fields the object's type declares through
//! [`schema::Filterable`].
//!
//! # Quick Start
//!
//! ```
//! use collection_query_rs::prelude::*;
//!
//! struct Task {
//!     title: String,
//!     priority: i64,
//!     due: Option<String>,
//! }
//!
//! impl Filterable for Task {
//!     fn fields(schema: &mut SchemaBuilder<Self>) {
//!         schema.string("title", |t| t.title.as_str());
//!         schema.integer("priority", |t| t.priority);
//!         schema.boxed_string("due", |t| t.due.as_deref());
//!     }
//! }
//!
//! let task = Task { title: "Write docs".to_string(), priority: 3, due: None };
//! assert!(filter_matches(&task, "title ~ 'docs' and priority >= 2 and due == null").unwrap());
//! ```

pub mod config;
pub mod filter;
pub mod params;
pub mod prelude;
pub mod schema;

use filter::{FilterEvaluator, FilterParser, FilterResult};
use schema::Filterable;

/// Parses `filter` and evaluates it against `item` with the default limits.
///
/// An empty filter matches every item.
///
/// # Errors
///
/// Returns the first error raised while parsing or evaluating.
pub fn filter_matches<T: Filterable>(item: &T, filter: &str) -> FilterResult<bool> {
    let filter = FilterParser::parse(filter)?;
    FilterEvaluator::new(&filter).matches(item)
}
