//! HTTP handlers for organization CRUD.

use crate::{
    errors::AppError,
    models::{
        organization::Organization,
        page::{Page, SortDirection},
    },
    services::{
        organization_service::{OrganizationInput, OrganizationListParams},
        AppState,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::IntoParams;

/// Query params accepted by the organization listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrganizationListQuery {
    /// Zero-based page index.
    pub page: Option<i64>,
    /// Page size, clamped to 1..=100.
    pub size: Option<i64>,
    /// Field to sort by (id, name, fullName, annualTurnover, employeesCount,
    /// rating, creationDate).
    pub sort_by: Option<String>,
    /// ASC or DESC.
    pub direction: Option<SortDirection>,
    /// Substring filter on the short name.
    pub name: Option<String>,
    /// Substring filter on the full name.
    pub full_name: Option<String>,
}

/// `POST /api/organization` — create an organization.
#[utoipa::path(
    post,
    path = "/api/organization",
    request_body = OrganizationInput,
    responses((status = 200, description = "Organization created", body = Organization)),
    tag = "organizations"
)]
pub async fn create_organization(
    State(state): State<AppState>,
    Json(input): Json<OrganizationInput>,
) -> Result<Json<Organization>, AppError> {
    Ok(Json(state.organizations.create(input).await?))
}

/// `PUT /api/organization/{id}` — replace an organization.
#[utoipa::path(
    put,
    path = "/api/organization/{id}",
    params(("id" = i64, Path, description = "Organization id")),
    request_body = OrganizationInput,
    responses((status = 200, description = "Organization updated", body = Organization)),
    tag = "organizations"
)]
pub async fn update_organization(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<OrganizationInput>,
) -> Result<Json<Organization>, AppError> {
    Ok(Json(state.organizations.update(id, input).await?))
}

/// `DELETE /api/organization/{id}` — delete, returning the removed record.
#[utoipa::path(
    delete,
    path = "/api/organization/{id}",
    params(("id" = i64, Path, description = "Organization id")),
    responses((status = 200, description = "Organization deleted", body = Organization)),
    tag = "organizations"
)]
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Organization>, AppError> {
    Ok(Json(state.organizations.delete(id).await?))
}

/// `GET /api/organization` — paginated, filterable listing.
#[utoipa::path(
    get,
    path = "/api/organization",
    params(OrganizationListQuery),
    responses((status = 200, description = "One page of organizations", body = Page<Organization>)),
    tag = "organizations"
)]
pub async fn list_organizations(
    State(state): State<AppState>,
    Query(query): Query<OrganizationListQuery>,
) -> Result<Json<Page<Organization>>, AppError> {
    let params = OrganizationListParams {
        page: query.page,
        size: query.size,
        sort_by: query.sort_by,
        direction: query.direction.unwrap_or_default(),
        name: query.name,
        full_name: query.full_name,
    };
    Ok(Json(state.organizations.list(params).await?))
}

/// `GET /api/organization/{id}` — fetch one organization.
#[utoipa::path(
    get,
    path = "/api/organization/{id}",
    params(("id" = i64, Path, description = "Organization id")),
    responses((status = 200, description = "The organization", body = Organization)),
    tag = "organizations"
)]
pub async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Organization>, AppError> {
    Ok(Json(state.organizations.get(id).await?))
}
