//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```
//! use collection_query_rs::prelude::*;
//!
//! // Now you have access to:
//! // - FilterParser, FilterEvaluator, Filter (parse and evaluate)
//! // - FilterError, FilterResult (error handling)
//! // - Filterable, SchemaBuilder, describe (field declarations)
//! // - FilterConfig, CollectionParams (limits and query strings)
//! ```

// Filtering
pub use crate::filter::{Filter, FilterEvaluator, FilterParser};

// Error types
pub use crate::filter::{FilterError, FilterResult};

// Schema
pub use crate::schema::{describe, Filterable, SchemaBuilder};

// Configuration and parameters
pub use crate::config::FilterConfig;
pub use crate::params::CollectionParams;

// One-shot matching
pub use crate::filter_matches;
