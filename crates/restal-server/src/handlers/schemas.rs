//! `/schemas` listing.

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::Response;
use restal_adapter_pg::statements;
use restal_adapter_pg::translate::where_by_request;

use crate::error::ApiError;
use crate::handlers::{append_order_and_page, parse_query};
use crate::response::json_response;
use crate::state::AppState;

/// GET /schemas
pub async fn list_schemas(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Response, ApiError> {
    let query = parse_query(raw);

    let mut sql = statements::schemas_clause(&query);
    let filter = where_by_request(&query, 1)?;
    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&filter.clause);
    }
    append_order_and_page(&mut sql, &query)?;

    let body = state.executor().query_json(&sql, &filter.params).await?;
    Ok(json_response(StatusCode::OK, body))
}
