//! Read-only view access on `/_VIEW/{database}/{schema}/{view}`.

use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::Response;

use crate::error::ApiError;
use crate::handlers::{build_select, parse_query, require_identifier};
use crate::response::json_response;
use crate::state::AppState;

/// GET /_VIEW/{database}/{schema}/{view}
///
/// Views share the table SELECT path; access rules are keyed by the view
/// name.
pub async fn select_from_view(
    State(state): State<AppState>,
    Path((database, schema, view)): Path<(String, String, String)>,
    RawQuery(raw): RawQuery,
) -> Result<Response, ApiError> {
    require_identifier(&database)?;
    let query = parse_query(raw);

    let (sql, params) = build_select(state.gate(), &schema, &view, &query)?;
    let body = state.executor().query_json(&sql, &params).await?;
    Ok(json_response(StatusCode::OK, body))
}
