//! HTTP handlers for coordinate CRUD.

use crate::{
    errors::AppError,
    models::{
        coordinates::Coordinates,
        page::{Page, SortDirection},
    },
    services::{
        coordinates_service::{CoordinatesInput, CoordinatesListParams},
        AppState,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::IntoParams;

/// Paging params for the coordinate listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CoordinatesListQuery {
    /// Zero-based page index.
    pub page: Option<i64>,
    /// Page size, clamped to 1..=100.
    pub size: Option<i64>,
    /// Field to sort by (id, x, y).
    pub sort_by: Option<String>,
    /// ASC or DESC.
    pub direction: Option<SortDirection>,
}

/// `POST /api/coordinates` — create a coordinate pair.
#[utoipa::path(
    post,
    path = "/api/coordinates",
    request_body = CoordinatesInput,
    responses((status = 200, description = "Coordinates created", body = Coordinates)),
    tag = "coordinates"
)]
pub async fn create_coordinates(
    State(state): State<AppState>,
    Json(input): Json<CoordinatesInput>,
) -> Result<Json<Coordinates>, AppError> {
    Ok(Json(state.coordinates.create(input).await?))
}

/// `PUT /api/coordinates/{id}` — replace a coordinate pair.
#[utoipa::path(
    put,
    path = "/api/coordinates/{id}",
    params(("id" = i64, Path, description = "Coordinates id")),
    request_body = CoordinatesInput,
    responses((status = 200, description = "Coordinates updated", body = Coordinates)),
    tag = "coordinates"
)]
pub async fn update_coordinates(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CoordinatesInput>,
) -> Result<Json<Coordinates>, AppError> {
    Ok(Json(state.coordinates.update(id, input).await?))
}

/// `DELETE /api/coordinates/{id}` — delete, returning the removed record.
#[utoipa::path(
    delete,
    path = "/api/coordinates/{id}",
    params(("id" = i64, Path, description = "Coordinates id")),
    responses((status = 200, description = "Coordinates deleted", body = Coordinates)),
    tag = "coordinates"
)]
pub async fn delete_coordinates(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Coordinates>, AppError> {
    Ok(Json(state.coordinates.delete(id).await?))
}

/// `GET /api/coordinates` — paginated listing.
#[utoipa::path(
    get,
    path = "/api/coordinates",
    params(CoordinatesListQuery),
    responses((status = 200, description = "One page of coordinates", body = Page<Coordinates>)),
    tag = "coordinates"
)]
pub async fn list_coordinates(
    State(state): State<AppState>,
    Query(query): Query<CoordinatesListQuery>,
) -> Result<Json<Page<Coordinates>>, AppError> {
    let params = CoordinatesListParams {
        page: query.page,
        size: query.size,
        sort_by: query.sort_by,
        direction: query.direction.unwrap_or_default(),
    };
    Ok(Json(state.coordinates.list(params).await?))
}

/// `GET /api/coordinates/{id}` — fetch one coordinate pair.
#[utoipa::path(
    get,
    path = "/api/coordinates/{id}",
    params(("id" = i64, Path, description = "Coordinates id")),
    responses((status = 200, description = "The coordinates", body = Coordinates)),
    tag = "coordinates"
)]
pub async fn get_coordinates(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Coordinates>, AppError> {
    Ok(Json(state.coordinates.get(id).await?))
}
