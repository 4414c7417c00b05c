//! Which literal and operator combinations each field type accepts.
//!
//! | literal | field type                      | operators                  |
//! |---------|---------------------------------|----------------------------|
//! | null    | any nullable                    | `==` `!=`                  |
//! | string  | string (plain or boxed)         | all, including `~` `!~`    |
//! | number  | integer, unsigned, float        | `==` `!=` `>` `>=` `<` `<=`|
//! | bool    | bool (plain or boxed)           | `==` `!=`                  |
//!
//! Every other pairing is a type mismatch.

use super::ast::{LiteralKind, Operator};
use crate::schema::{ScalarType, SemanticType};

/// Checks a comparison against the table above.
///
/// Returns the reason for rejection, suitable for a type mismatch message.
pub fn check(field_type: SemanticType, op: Operator, literal: LiteralKind) -> Result<(), String> {
    let accepted = match (literal, field_type.comparable()) {
        (LiteralKind::Null, _) => field_type.is_nullable() && op.is_equality(),
        (LiteralKind::String, Some(ScalarType::String)) => true,
        (LiteralKind::Number, Some(scalar)) => scalar.is_numeric() && !op.is_regex(),
        (LiteralKind::Bool, Some(ScalarType::Bool)) => op.is_equality(),
        _ => false,
    };

    if accepted {
        Ok(())
    } else {
        Err(format!(
            "cannot compare {} field with {} literal using '{}'",
            field_type, literal, op
        ))
    }
}
