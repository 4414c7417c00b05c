//! Error types for filter parsing and evaluation.

use thiserror::Error;

/// A specialized Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while parsing or evaluating a filter expression.
///
/// Every variant is terminal for the call that produced it: a boolean
/// result returned alongside an error has no meaning.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The filter text is malformed (lexing or parsing failed).
    #[error("syntax error at position {position}: {message}{}", fragment_suffix(.fragment))]
    Syntax {
        /// Human-readable description of the problem.
        message: String,
        /// The offending piece of input (empty at end of input).
        fragment: String,
        /// Byte offset into the filter text.
        position: usize,
    },

    /// The field is unknown, or the literal/operator pair does not fit its type.
    #[error("type mismatch on field '{field}': {message}")]
    TypeMismatch {
        /// The field name as written in the filter.
        field: String,
        /// Why the comparison was rejected.
        message: String,
    },

    /// The pattern operand of `~` or `!~` is not a valid regular expression.
    #[error("invalid regular expression '{pattern}': {source}")]
    Regex {
        /// The pattern text as written in the filter.
        pattern: String,
        /// Diagnostic from the regex compiler.
        #[source]
        source: regex::Error,
    },

    /// The filter text is longer or nested deeper than the configured limits.
    #[error("filter {what} exceeds the limit of {limit}")]
    LimitExceeded {
        /// Which limit was hit (`length` or `depth`).
        what: &'static str,
        /// The configured limit.
        limit: usize,
    },
}

fn fragment_suffix(fragment: &str) -> String {
    if fragment.is_empty() {
        String::new()
    } else {
        format!(" near '{}'", fragment)
    }
}

impl FilterError {
    /// Creates a syntax error.
    pub fn syntax(message: impl Into<String>, fragment: impl Into<String>, position: usize) -> Self {
        FilterError::Syntax {
            message: message.into(),
            fragment: fragment.into(),
            position,
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(field: impl Into<String>, message: impl Into<String>) -> Self {
        FilterError::TypeMismatch {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates the type mismatch reported for a field the target type does not have.
    pub fn unknown_field(field: impl Into<String>, suggestion: Option<&str>) -> Self {
        let message = match suggestion {
            Some(s) => format!("no such field. Did you mean '{}'?", s),
            None => "no such field".to_string(),
        };
        FilterError::TypeMismatch {
            field: field.into(),
            message,
        }
    }

    /// Creates a regex compilation error.
    pub fn regex(pattern: impl Into<String>, source: regex::Error) -> Self {
        FilterError::Regex {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates a limit error.
    pub fn limit_exceeded(what: &'static str, limit: usize) -> Self {
        FilterError::LimitExceeded { what, limit }
    }

    /// Returns true for malformed filter text, including inputs over the limits.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            FilterError::Syntax { .. } | FilterError::LimitExceeded { .. }
        )
    }

    /// Returns true for unknown fields and incompatible comparisons.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, FilterError::TypeMismatch { .. })
    }

    /// Returns true when a `~`/`!~` pattern failed to compile.
    pub fn is_regex(&self) -> bool {
        matches!(self, FilterError::Regex { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display_with_fragment() {
        let err = FilterError::syntax("unterminated string literal", "'abc", 7);
        assert_eq!(
            err.to_string(),
            "syntax error at position 7: unterminated string literal near ''abc'"
        );
    }

    #[test]
    fn test_syntax_error_display_at_end_of_input() {
        let err = FilterError::syntax("expected literal", "", 6);
        assert_eq!(err.to_string(), "syntax error at position 6: expected literal");
    }

    #[test]
    fn test_unknown_field_with_suggestion() {
        let err = FilterError::unknown_field("stt", Some("str"));
        assert!(err.is_type_mismatch());
        assert!(err.to_string().contains("Did you mean 'str'?"));
    }

    #[test]
    fn test_unknown_field_without_suggestion() {
        let err = FilterError::unknown_field("missingField", None);
        assert_eq!(
            err.to_string(),
            "type mismatch on field 'missingField': no such field"
        );
    }

    #[test]
    fn test_limit_exceeded_counts_as_syntax() {
        let err = FilterError::limit_exceeded("depth", 64);
        assert!(err.is_syntax());
        assert!(!err.is_regex());
        assert_eq!(err.to_string(), "filter depth exceeds the limit of 64");
    }
}
