//! Identifier validation.
//!
//! This is the only primitive standing between user-supplied strings and
//! SQL identifier positions, so the rule is conservative and purely
//! syntactic. No catalog lookup is attempted.

/// Postgres truncates identifiers beyond this length.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Whether `token` may be interpolated into SQL as a bare identifier.
///
/// Accepts ASCII letters, digits, underscore, and period (the period
/// admits qualified `schema.table` / `table.column` forms). Rejects empty
/// tokens, tokens longer than 63 bytes, and tokens starting with a digit.
/// Quotes, semicolons, backticks, and whitespace never pass.
pub fn valid_identifier(token: &str) -> bool {
    if token.is_empty() || token.len() > MAX_IDENTIFIER_LEN {
        return false;
    }
    if token.as_bytes()[0].is_ascii_digit() {
        return false;
    }
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
