//! HTTP handlers for town location CRUD.

use crate::{
    errors::AppError,
    models::{
        location::Location,
        page::{Page, SortDirection},
    },
    services::{
        location_service::{LocationInput, LocationListParams},
        AppState,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::IntoParams;

/// Paging and filter params for the location listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LocationListQuery {
    /// Zero-based page index.
    pub page: Option<i64>,
    /// Page size, clamped to 1..=100.
    pub size: Option<i64>,
    /// Field to sort by (id, x, y, z, name).
    pub sort_by: Option<String>,
    /// ASC or DESC.
    pub direction: Option<SortDirection>,
    /// Substring filter on the town name.
    pub name_contains: Option<String>,
}

/// `POST /api/location` — create a location.
#[utoipa::path(
    post,
    path = "/api/location",
    request_body = LocationInput,
    responses((status = 200, description = "Location created", body = Location)),
    tag = "locations"
)]
pub async fn create_location(
    State(state): State<AppState>,
    Json(input): Json<LocationInput>,
) -> Result<Json<Location>, AppError> {
    Ok(Json(state.locations.create(input).await?))
}

/// `PUT /api/location/{id}` — replace a location.
#[utoipa::path(
    put,
    path = "/api/location/{id}",
    params(("id" = i64, Path, description = "Location id")),
    request_body = LocationInput,
    responses((status = 200, description = "Location updated", body = Location)),
    tag = "locations"
)]
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<LocationInput>,
) -> Result<Json<Location>, AppError> {
    Ok(Json(state.locations.update(id, input).await?))
}

/// `DELETE /api/location/{id}` — delete, returning the removed record.
#[utoipa::path(
    delete,
    path = "/api/location/{id}",
    params(("id" = i64, Path, description = "Location id")),
    responses((status = 200, description = "Location deleted", body = Location)),
    tag = "locations"
)]
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Location>, AppError> {
    Ok(Json(state.locations.delete(id).await?))
}

/// `GET /api/location` — paginated, filterable listing.
#[utoipa::path(
    get,
    path = "/api/location",
    params(LocationListQuery),
    responses((status = 200, description = "One page of locations", body = Page<Location>)),
    tag = "locations"
)]
pub async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationListQuery>,
) -> Result<Json<Page<Location>>, AppError> {
    let params = LocationListParams {
        page: query.page,
        size: query.size,
        sort_by: query.sort_by,
        direction: query.direction.unwrap_or_default(),
        name_contains: query.name_contains,
    };
    Ok(Json(state.locations.list(params).await?))
}

/// `GET /api/location/{id}` — fetch one location.
#[utoipa::path(
    get,
    path = "/api/location/{id}",
    params(("id" = i64, Path, description = "Location id")),
    responses((status = 200, description = "The location", body = Location)),
    tag = "locations"
)]
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Location>, AppError> {
    Ok(Json(state.locations.get(id).await?))
}
