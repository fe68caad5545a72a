//! Request handlers for the REST surface.
//!
//! Each handler parses the query string once, composes SQL fragments
//! through the pure translator, and hands the finished statement to the
//! executor. Statement composition lives in [`build_select`] and
//! [`append_order_and_page`] so it can be exercised without a pool.

pub mod databases;
pub mod schemas;
pub mod tables;
pub mod views;

use restal_adapter_pg::error::AdapterError;
use restal_adapter_pg::ident::valid_identifier;
use restal_adapter_pg::translate::{
    columns_by_request, count_by_request, join_by_request, order_by_request, paginate_if_possible,
    select_fields, where_by_request,
};
use restal_adapter_pg::{AccessGate, QueryString};
use restal_core::Operation;
use serde_json::Value;

use crate::error::ApiError;

/// Parse the raw query string from `axum::extract::RawQuery`.
pub(crate) fn parse_query(raw: Option<String>) -> QueryString {
    QueryString::parse(raw.as_deref().unwrap_or(""))
}

/// Validate a path variable before it reaches an identifier position.
pub(crate) fn require_identifier(token: &str) -> Result<(), ApiError> {
    if valid_identifier(token) {
        Ok(())
    } else {
        Err(AdapterError::InvalidIdentifier(token.to_string()).into())
    }
}

/// Append ORDER BY and LIMIT/OFFSET fragments when the request asks for
/// them.
pub(crate) fn append_order_and_page(
    sql: &mut String,
    query: &QueryString,
) -> Result<(), ApiError> {
    let order = order_by_request(query)?;
    if !order.is_empty() {
        sql.push(' ');
        sql.push_str(&order);
    }
    let page = paginate_if_possible(query)?;
    if !page.is_empty() {
        sql.push(' ');
        sql.push_str(&page);
    }
    Ok(())
}

/// Compose the full SELECT statement for a table or view request:
/// projection (or COUNT), gate filtering, JOINs, WHERE, ORDER BY, and
/// pagination, with the WHERE parameter vector.
pub(crate) fn build_select(
    gate: &AccessGate,
    schema: &str,
    relation: &str,
    query: &QueryString,
) -> Result<(String, Vec<Value>), ApiError> {
    require_identifier(schema)?;
    require_identifier(relation)?;

    if !gate.table_allowed(relation, Operation::Read) {
        return Err(AdapterError::PermissionDenied {
            table: relation.to_string(),
            operation: Operation::Read,
        }
        .into());
    }

    let count = count_by_request(query)?;
    let prefix = if count.is_empty() {
        let requested = columns_by_request(query);
        let columns = gate.filter_columns(relation, &requested);
        if columns.is_empty() {
            return Err(AdapterError::EmptyProjection.into());
        }
        select_fields(&columns)?
    } else {
        count
    };

    let mut sql = format!("{prefix} {schema}.{relation}");

    for join in join_by_request(query)? {
        sql.push(' ');
        sql.push_str(&join);
    }

    let filter = where_by_request(query, 1)?;
    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&filter.clause);
    }

    append_order_and_page(&mut sql, query)?;

    Ok((sql, filter.params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use restal_core::RestalConfig;
    use serde_json::json;

    fn open_gate() -> AccessGate {
        AccessGate::new(RestalConfig::default().access)
    }

    fn restricted_gate() -> AccessGate {
        let yaml = r#"
access:
  restrict: true
  tables:
    test:
      read: true
    test_list_only_id:
      read: true
      fields: [id]
    test_write_and_delete_access:
      write: true
      delete: true
"#;
        let config = RestalConfig::from_yaml(yaml).unwrap();
        AccessGate::new(config.access)
    }

    #[test]
    fn plain_select_star() {
        let query = QueryString::parse("");
        let (sql, params) = build_select(&open_gate(), "public", "test", &query).unwrap();
        assert_eq!(sql, "SELECT * FROM public.test");
        assert!(params.is_empty());
    }

    #[test]
    fn select_with_projection_and_filter() {
        let query = QueryString::parse("_select=celphone,name&name=nuveo");
        let (sql, params) = build_select(&open_gate(), "public", "test5", &query).unwrap();
        assert_eq!(
            sql,
            "SELECT celphone,name FROM public.test5 WHERE name=$1"
        );
        assert_eq!(params, vec![json!("nuveo")]);
    }

    #[test]
    fn count_replaces_projection() {
        let query = QueryString::parse("_count=*");
        let (sql, _) = build_select(&open_gate(), "public", "test", &query).unwrap();
        assert_eq!(sql, "SELECT COUNT(*) FROM public.test");

        let query = QueryString::parse("_count=name");
        let (sql, _) = build_select(&open_gate(), "public", "test", &query).unwrap();
        assert_eq!(sql, "SELECT COUNT(name) FROM public.test");
    }

    #[test]
    fn full_composition_in_order() {
        let query = QueryString::parse(
            "_join=inner:test2:test2.name:$eq:test.name&name=nuveo&_order=-name&_page=1&_page_size=20",
        );
        let (sql, params) = build_select(&open_gate(), "public", "test", &query).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM public.test INNER JOIN test2 ON test2.name = test.name WHERE name=$1 ORDER BY name DESC LIMIT 20 OFFSET(1 - 1) * 20"
        );
        assert_eq!(params, vec![json!("nuveo")]);
    }

    #[test]
    fn gate_filters_projection() {
        let query = QueryString::parse("_select=*");
        let (sql, _) =
            build_select(&restricted_gate(), "public", "test_list_only_id", &query).unwrap();
        assert_eq!(sql, "SELECT id FROM public.test_list_only_id");
    }

    #[test]
    fn filtered_out_projection_is_rejected() {
        let query = QueryString::parse("_select=name");
        let err = build_select(&restricted_gate(), "public", "test_list_only_id", &query)
            .unwrap_err();
        assert!(matches!(err.0, AdapterError::EmptyProjection));
    }

    #[test]
    fn unreadable_table_is_denied() {
        let query = QueryString::parse("");
        let err = build_select(
            &restricted_gate(),
            "public",
            "test_write_and_delete_access",
            &query,
        )
        .unwrap_err();
        assert!(matches!(err.0, AdapterError::PermissionDenied { .. }));
    }

    #[test]
    fn path_variables_are_validated() {
        let query = QueryString::parse("");
        let err = build_select(&open_gate(), "pub;lic", "test", &query).unwrap_err();
        assert!(matches!(err.0, AdapterError::InvalidIdentifier(_)));
    }
}
