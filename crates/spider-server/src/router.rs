//! Axum router construction for the HTTP API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /api` -- deployment name, model, outputs, drawable columns
/// - `GET /api/hex` -- the grid as a GeoJSON `FeatureCollection`
/// - `GET /api/cells/{index}` -- one cell with its derived values
/// - `GET /api/parameters` -- parameter definitions and current values
/// - `PUT /api/parameters` -- update parameters and recompute
/// - `POST /api/draw/{attribute}` -- draw a geometry onto an attribute
/// - `DELETE /api/draw/{attribute}` -- restore an attribute's baseline
/// - `POST /api/propagate` -- explicit propagation request
///
/// CORS allows any origin so the map page can be served from elsewhere.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(handlers::get_info))
        .route("/api/hex", get(handlers::get_hex))
        .route("/api/cells/{index}", get(handlers::get_cell))
        .route(
            "/api/parameters",
            get(handlers::get_parameters).put(handlers::put_parameters),
        )
        .route(
            "/api/draw/{attribute}",
            post(handlers::draw).delete(handlers::reset),
        )
        .route("/api/propagate", post(handlers::propagate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
