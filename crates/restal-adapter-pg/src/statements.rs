//! Fixed catalog statement templates.
//!
//! These are the only pieces of SQL not synthesized from a request. Each
//! template leaves one projection slot open: the listed field for a normal
//! SELECT, or the COUNT expression when `_count` is present. They compose
//! with the same WHERE/ORDER/pagination path as table selects. Kept
//! single-line so they pass the executor's statement surface check.

use crate::request::QueryString;

/// Projection for the databases listing.
pub const FIELD_DATABASE_NAME: &str = "datname";
/// COUNT projection for the databases listing.
pub const FIELD_COUNT_DATABASE_NAME: &str = "COUNT(datname)";

/// Projection for the schemas listing.
pub const FIELD_SCHEMA_NAME: &str = "schema_name";
/// COUNT projection for the schemas listing.
pub const FIELD_COUNT_SCHEMA_NAME: &str = "COUNT(schema_name)";

/// Catalog listing of tables and views, aliased for free-form WHERE on
/// `c.*` and `n.*`.
pub const TABLES_SELECT: &str = "SELECT n.nspname AS schema, c.relname AS name, CASE c.relkind WHEN 'r' THEN 'table' WHEN 'v' THEN 'view' END AS type FROM pg_class c JOIN pg_namespace n ON n.oid = c.relnamespace WHERE c.relkind IN ('r','v') AND n.nspname NOT IN ('pg_catalog','information_schema')";

/// Tables of one schema; `$1` binds the schema path variable, further
/// WHERE clauses continue at `$2`.
pub const SCHEMA_TABLES_SELECT: &str =
    "SELECT t.schemaname AS schema, t.tablename AS name FROM pg_catalog.pg_tables t WHERE t.schemaname = $1";

/// Databases listing with the projection slot filled.
pub fn databases_select(projection: &str) -> String {
    format!("SELECT {projection} FROM pg_database WHERE NOT datistemplate")
}

/// Schemas listing with the projection slot filled.
pub fn schemas_select(projection: &str) -> String {
    format!("SELECT {projection} FROM information_schema.schemata")
}

/// The databases statement for a request: COUNT projection when `_count`
/// is present, the database name otherwise.
pub fn databases_clause(query: &QueryString) -> String {
    if wants_count(query) {
        databases_select(FIELD_COUNT_DATABASE_NAME)
    } else {
        databases_select(FIELD_DATABASE_NAME)
    }
}

/// The schemas statement for a request.
pub fn schemas_clause(query: &QueryString) -> String {
    if wants_count(query) {
        schemas_select(FIELD_COUNT_SCHEMA_NAME)
    } else {
        schemas_select(FIELD_SCHEMA_NAME)
    }
}

fn wants_count(query: &QueryString) -> bool {
    query.get("_count").is_some_and(|value| !value.is_empty())
}
