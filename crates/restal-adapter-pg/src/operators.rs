//! Symbolic comparison operators.

use crate::error::AdapterError;

/// Resolve a `$`-prefixed comparison token to SQL operator text.
///
/// The table is closed and lookup is case-sensitive; any other token is
/// rejected with [`AdapterError::UnknownOperator`].
pub fn resolve_operator(token: &str) -> Result<&'static str, AdapterError> {
    match token {
        "$eq" => Ok("="),
        "$gt" => Ok(">"),
        "$gte" => Ok(">="),
        "$lt" => Ok("<"),
        "$lte" => Ok("<="),
        "$in" => Ok("IN"),
        "$nin" => Ok("NOT IN"),
        _ => Err(AdapterError::UnknownOperator(token.to_string())),
    }
}
