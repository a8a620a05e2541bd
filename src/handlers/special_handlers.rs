//! HTTP handlers for the special operations over organizations.

use crate::{
    errors::AppError,
    models::organization::Organization,
    services::{
        special_service::{FullNameCount, MergeOrganizationsInput},
        AppState,
    },
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use utoipa::IntoParams;

/// Substring to look for in organization full names.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FullNameQuery {
    pub full_name: String,
}

/// Target organization for the employee-count bump.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TargetIdQuery {
    pub id: i64,
}

/// `GET /api/special-operation/max-official-address` — the organization
/// with the greatest official address id.
#[utoipa::path(
    get,
    path = "/api/special-operation/max-official-address",
    responses((status = 200, description = "The matching organization", body = Organization)),
    tag = "special-operations"
)]
pub async fn max_official_address(
    State(state): State<AppState>,
) -> Result<Json<Organization>, AppError> {
    Ok(Json(state.special.max_official_address().await?))
}

/// `GET /api/special-operation/group-fullname` — counts grouped by full
/// name.
#[utoipa::path(
    get,
    path = "/api/special-operation/group-fullname",
    responses((status = 200, description = "Counts per full name", body = [FullNameCount])),
    tag = "special-operations"
)]
pub async fn group_by_full_name(
    State(state): State<AppState>,
) -> Result<Json<Vec<FullNameCount>>, AppError> {
    Ok(Json(state.special.count_by_full_name().await?))
}

/// `GET /api/special-operation/organization-where-fullname-contains` —
/// substring search over full names.
#[utoipa::path(
    get,
    path = "/api/special-operation/organization-where-fullname-contains",
    params(FullNameQuery),
    responses((status = 200, description = "Matching organizations", body = [Organization])),
    tag = "special-operations"
)]
pub async fn search_by_full_name(
    State(state): State<AppState>,
    Query(query): Query<FullNameQuery>,
) -> Result<Json<Vec<Organization>>, AppError> {
    Ok(Json(state.special.search_by_full_name(&query.full_name).await?))
}

/// `PUT /api/special-operation/update-count-employee` — bump the head
/// count of one organization by one.
#[utoipa::path(
    put,
    path = "/api/special-operation/update-count-employee",
    params(TargetIdQuery),
    responses((status = 200, description = "The updated organization", body = Organization)),
    tag = "special-operations"
)]
pub async fn increment_employee_count(
    State(state): State<AppState>,
    Query(query): Query<TargetIdQuery>,
) -> Result<Json<Organization>, AppError> {
    Ok(Json(state.special.increment_employees(query.id).await?))
}

/// `POST /api/special-operation/join-organizations` — merge two stored
/// organizations into a new one.
#[utoipa::path(
    post,
    path = "/api/special-operation/join-organizations",
    request_body = MergeOrganizationsInput,
    responses((status = 200, description = "The merged organization", body = Organization)),
    tag = "special-operations"
)]
pub async fn join_organizations(
    State(state): State<AppState>,
    Json(input): Json<MergeOrganizationsInput>,
) -> Result<Json<Organization>, AppError> {
    Ok(Json(state.special.merge(input).await?))
}
