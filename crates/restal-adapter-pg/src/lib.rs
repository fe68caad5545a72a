//! PostgreSQL adapter for restal.
//!
//! This crate turns a parsed HTTP request into a safely parameterized SQL
//! statement and runs it against a connection pool:
//!
//! - [`ident`] decides whether a bare token may be interpolated as a SQL
//!   identifier.
//! - [`operators`] maps symbolic comparison tokens (`$eq`, `$gt`, ...) to
//!   SQL operator text.
//! - [`gate`] enforces per-table and per-column access rules.
//! - [`translate`] synthesizes WHERE/JOIN/ORDER/LIMIT/COUNT/SELECT
//!   fragments from query parameters, binding every client value
//!   positionally.
//! - [`statements`] holds the fixed catalog statement templates.
//! - [`executor`] assembles and runs statements, scanning rows into JSON.
//!
//! The translator is purely computational; the executor owns the pool and
//! is the only place that touches the network.

pub mod error;
pub mod executor;
pub mod gate;
pub mod ident;
pub mod operators;
pub mod request;
pub mod statements;
pub mod translate;

pub use error::AdapterError;
pub use executor::PgExecutor;
pub use gate::AccessGate;
pub use request::QueryString;
pub use translate::WhereClause;
