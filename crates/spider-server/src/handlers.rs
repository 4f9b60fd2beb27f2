//! REST API endpoint handlers.
//!
//! Reads take the session's read lock; every mutating handler holds the
//! write lock until its recompute has committed.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api` | Deployment overview |
//! | `GET` | `/api/hex` | Grid with derived values as GeoJSON |
//! | `GET` | `/api/cells/{index}` | Single cell |
//! | `GET` | `/api/parameters` | Parameter definitions and values |
//! | `PUT` | `/api/parameters` | Update parameters |
//! | `POST` | `/api/draw/{attribute}` | Draw infrastructure |
//! | `DELETE` | `/api/draw/{attribute}` | Reset infrastructure |
//! | `POST` | `/api/propagate` | Explicit propagation |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use spider_core::{DrawSummary, RecomputeSummary, ResetSummary};
use spider_grid::Geometry;
use spider_types::{CellIndex, ParameterSet, PropagationRequest};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /api -- deployment overview
// ---------------------------------------------------------------------------

/// Return the deployment overview: name, active model and its outputs,
/// drawable columns, hex size, and the headline figures of the last pass.
pub async fn get_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(serde_json::json!({
        "name": session.name(),
        "model": session.model_name(),
        "outputs": session.model_outputs(),
        "infra": session.infra(),
        "hex_size_km": session.step_size(),
        "cells": session.grid().len(),
        "summary": session.summary(),
    }))
}

// ---------------------------------------------------------------------------
// Map data
// ---------------------------------------------------------------------------

/// Return every cell with static and derived attributes as a GeoJSON
/// `FeatureCollection`.
pub async fn get_hex(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(session.feature_collection())
}

/// Return one cell's attributes, neighbours, and derived values.
pub async fn get_cell(
    State(state): State<Arc<AppState>>,
    Path(index): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let index = parse_index(&index)?;
    let session = state.session.read().await;
    Ok(Json(session.cell(index)?))
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Return each parameter definition with its current value.
pub async fn get_parameters(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.read().await;
    let parameters: Vec<serde_json::Value> = session
        .parameter_values()
        .into_iter()
        .map(|(def, value)| {
            serde_json::json!({
                "col": def.col,
                "label": def.label,
                "unit": def.unit,
                "min": def.min,
                "max": def.max,
                "cats": def.cats,
                "default": def.val,
                "value": value,
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": parameters.len(),
        "parameters": parameters,
    }))
}

/// Merge the given values over the current parameters and recompute.
pub async fn put_parameters(
    State(state): State<Arc<AppState>>,
    Json(updates): Json<ParameterSet>,
) -> Result<Json<RecomputeSummary>, ApiError> {
    let mut session = state.session.write().await;
    Ok(Json(session.set_parameters(&updates)?))
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Draw a `Point` or `LineString` onto an infrastructure attribute.
pub async fn draw(
    State(state): State<Arc<AppState>>,
    Path(attribute): Path<String>,
    Json(geometry): Json<Geometry>,
) -> Result<Json<DrawSummary>, ApiError> {
    let mut session = state.session.write().await;
    let summary = session.draw(&attribute, &geometry)?;
    info!(attribute = %attribute, seeds = summary.seeds, "drawn");
    Ok(Json(summary))
}

/// Restore an infrastructure attribute to its loaded values.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(attribute): Path<String>,
) -> Result<Json<ResetSummary>, ApiError> {
    let mut session = state.session.write().await;
    Ok(Json(session.reset_attribute(&attribute)?))
}

/// Run an explicit propagation request.
pub async fn propagate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PropagationRequest>,
) -> Result<Json<DrawSummary>, ApiError> {
    let mut session = state.session.write().await;
    Ok(Json(session.propagate(&request)?))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_index(s: &str) -> Result<CellIndex, ApiError> {
    s.parse::<u32>()
        .map(CellIndex)
        .map_err(|e| ApiError::InvalidPath(format!("{s}: {e}")))
}
