//! Collection operation parameters carried in a request query string.
//!
//! Only `_filter` is interpreted here. Sorting, field selection and
//! pagination are kept as raw strings for the caller to handle.

use serde::Deserialize;
use thiserror::Error;

use crate::config::FilterConfig;
use crate::filter::{Filter, FilterParser, FilterResult};

/// Errors that can occur when reading collection parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    /// The query string is not valid `application/x-www-form-urlencoded`.
    #[error("invalid query string: {0}")]
    Decode(#[from] serde_urlencoded::de::Error),
}

/// Collection parameters extracted from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CollectionParams {
    /// Raw `_filter` expression.
    #[serde(rename = "_filter", default)]
    pub filter: Option<String>,

    /// Raw `_order_by` value.
    #[serde(rename = "_order_by", default)]
    pub order_by: Option<String>,

    /// Raw `_fields` value.
    #[serde(rename = "_fields", default)]
    pub fields: Option<String>,

    /// Raw `_limit` value.
    #[serde(rename = "_limit", default)]
    pub limit: Option<String>,

    /// Raw `_offset` value.
    #[serde(rename = "_offset", default)]
    pub offset: Option<String>,

    /// Raw `_page_token` value.
    #[serde(rename = "_page_token", default)]
    pub page_token: Option<String>,
}

impl CollectionParams {
    /// Decodes parameters from a query string, with or without a leading `?`.
    ///
    /// Unrelated keys are ignored.
    pub fn from_query(query: &str) -> Result<Self, ParamsError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        Ok(serde_urlencoded::from_str(query)?)
    }

    /// Parses `_filter` with the default limits.
    ///
    /// A missing or empty `_filter` matches everything.
    pub fn filter(&self) -> FilterResult<Filter> {
        self.filter_with_config(&FilterConfig::default())
    }

    /// Parses `_filter` with the given limits.
    pub fn filter_with_config(&self, config: &FilterConfig) -> FilterResult<Filter> {
        match self.filter.as_deref() {
            Some(text) => FilterParser::parse_with_config(text, config),
            None => Ok(Filter::MatchAll),
        }
    }
}
