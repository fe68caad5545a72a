//! Route definitions.

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{databases, schemas, tables, views};
use crate::state::AppState;

/// Create the router with application state.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/databases", get(databases::list_databases))
        .route("/schemas", get(schemas::list_schemas))
        .route("/tables", get(tables::list_tables))
        .route("/{database}/{schema}", get(tables::list_schema_tables))
        .route(
            "/{database}/{schema}/{table}",
            get(tables::select_from_table)
                .post(tables::insert_into_table)
                .delete(tables::delete_from_table)
                .put(tables::update_table)
                .patch(tables::update_table),
        )
        .route(
            "/_VIEW/{database}/{schema}/{view}",
            get(views::select_from_view),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
