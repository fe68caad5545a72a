//! Table listings and CRUD on `/{database}/{schema}/{table}`.

use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use restal_adapter_pg::statements;
use restal_adapter_pg::translate::where_by_request;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::handlers::{append_order_and_page, build_select, parse_query, require_identifier};
use crate::response::json_response;
use crate::state::AppState;

/// GET /tables
pub async fn list_tables(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Response, ApiError> {
    let query = parse_query(raw);

    let mut sql = statements::TABLES_SELECT.to_string();
    let filter = where_by_request(&query, 1)?;
    if !filter.is_empty() {
        sql.push_str(" AND ");
        sql.push_str(&filter.clause);
    }
    append_order_and_page(&mut sql, &query)?;

    let body = state.executor().query_json(&sql, &filter.params).await?;
    Ok(json_response(StatusCode::OK, body))
}

/// GET /{database}/{schema}
pub async fn list_schema_tables(
    State(state): State<AppState>,
    Path((database, schema)): Path<(String, String)>,
    RawQuery(raw): RawQuery,
) -> Result<Response, ApiError> {
    require_identifier(&database)?;
    require_identifier(&schema)?;
    let query = parse_query(raw);

    let mut sql = statements::SCHEMA_TABLES_SELECT.to_string();
    let mut params = vec![Value::String(schema)];

    // $1 is taken by the schema path variable.
    let filter = where_by_request(&query, 2)?;
    if !filter.is_empty() {
        sql.push_str(" AND ");
        sql.push_str(&filter.clause);
    }
    params.extend(filter.params);
    append_order_and_page(&mut sql, &query)?;

    let body = state.executor().query_json(&sql, &params).await?;
    Ok(json_response(StatusCode::OK, body))
}

/// GET /{database}/{schema}/{table}
pub async fn select_from_table(
    State(state): State<AppState>,
    Path((database, schema, table)): Path<(String, String, String)>,
    RawQuery(raw): RawQuery,
) -> Result<Response, ApiError> {
    require_identifier(&database)?;
    let query = parse_query(raw);

    let (sql, params) = build_select(state.gate(), &schema, &table, &query)?;
    let body = state.executor().query_json(&sql, &params).await?;
    Ok(json_response(StatusCode::OK, body))
}

/// POST /{database}/{schema}/{table}
pub async fn insert_into_table(
    State(state): State<AppState>,
    Path((database, schema, table)): Path<(String, String, String)>,
    Json(data): Json<Map<String, Value>>,
) -> Result<Response, ApiError> {
    require_identifier(&database)?;

    let body = state.executor().insert(&schema, &table, &data).await?;
    Ok(json_response(StatusCode::CREATED, body))
}

/// DELETE /{database}/{schema}/{table}
pub async fn delete_from_table(
    State(state): State<AppState>,
    Path((database, schema, table)): Path<(String, String, String)>,
    RawQuery(raw): RawQuery,
) -> Result<Response, ApiError> {
    require_identifier(&database)?;
    let query = parse_query(raw);

    let filter = where_by_request(&query, 1)?;
    let body = state.executor().delete(&schema, &table, &filter).await?;
    Ok(json_response(StatusCode::OK, body))
}

/// PUT and PATCH /{database}/{schema}/{table}
pub async fn update_table(
    State(state): State<AppState>,
    Path((database, schema, table)): Path<(String, String, String)>,
    RawQuery(raw): RawQuery,
    Json(data): Json<Map<String, Value>>,
) -> Result<Response, ApiError> {
    require_identifier(&database)?;
    let query = parse_query(raw);

    let filter = where_by_request(&query, 1)?;
    let body = state
        .executor()
        .update(&schema, &table, &filter, &data)
        .await?;
    Ok(json_response(StatusCode::OK, body))
}
