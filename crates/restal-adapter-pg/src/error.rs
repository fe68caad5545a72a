//! Error types for the Postgres adapter.

use restal_core::Operation;
use thiserror::Error;

/// Errors that can occur while translating a request or executing a
/// statement.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A token failed identifier validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A comparison token is not in the operator table.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// A `_join` parameter does not carry the five expected segments.
    #[error("malformed join clause")]
    MalformedJoin,

    /// `_page` or `_page_size` is not an integer.
    #[error("invalid pagination value")]
    BadPagination,

    /// The SELECT list is empty after access filtering.
    #[error("no permitted fields to select")]
    EmptyProjection,

    /// The access rules deny this operation on the table.
    #[error("{operation} not permitted on table {table}")]
    PermissionDenied { table: String, operation: Operation },

    /// The database rejected the statement with a constraint failure.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// The statement text contains characters outside the allowed set.
    #[error("statement contains disallowed characters")]
    MalformedStatement,

    /// Any other database error.
    #[error("database error: {0}")]
    Execution(#[from] sqlx::Error),
}

impl AdapterError {
    pub(crate) fn denied(table: &str, operation: Operation) -> Self {
        AdapterError::PermissionDenied {
            table: table.to_string(),
            operation,
        }
    }
}
