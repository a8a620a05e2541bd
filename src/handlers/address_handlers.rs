//! HTTP handlers for address CRUD, including the redirecting delete.

use crate::{
    errors::AppError,
    models::{
        address::Address,
        page::{Page, SortDirection},
    },
    services::{
        address_service::{AddressInput, AddressListParams},
        AppState,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::IntoParams;

/// Query params accepted by the address listings.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AddressListQuery {
    /// Zero-based page index.
    pub page: Option<i64>,
    /// Page size, clamped to 1..=100.
    pub size: Option<i64>,
    /// Field to sort by (id, zipCode).
    pub sort_by: Option<String>,
    /// ASC or DESC.
    pub direction: Option<SortDirection>,
    /// Substring filter on the zip code.
    pub zip_code: Option<String>,
}

/// Disposal options for `DELETE /api/address/{id}`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AddressDeleteQuery {
    /// Delete outright, discarding the attached town reference.
    pub force_delete: Option<bool>,
    /// Move the town onto this address before deleting.
    pub redirect_to_address_id: Option<i64>,
}

impl AddressListQuery {
    fn into_list_params(self) -> AddressListParams {
        AddressListParams {
            page: self.page,
            size: self.size,
            sort_by: self.sort_by,
            direction: self.direction.unwrap_or_default(),
            zip_code: self.zip_code,
        }
    }
}

/// `POST /api/address` — create an address.
#[utoipa::path(
    post,
    path = "/api/address",
    request_body = AddressInput,
    responses((status = 200, description = "Address created", body = Address)),
    tag = "addresses"
)]
pub async fn create_address(
    State(state): State<AppState>,
    Json(input): Json<AddressInput>,
) -> Result<Json<Address>, AppError> {
    Ok(Json(state.addresses.create(input).await?))
}

/// `PUT /api/address/{id}` — replace an address.
#[utoipa::path(
    put,
    path = "/api/address/{id}",
    params(("id" = i64, Path, description = "Address id")),
    request_body = AddressInput,
    responses((status = 200, description = "Address updated", body = Address)),
    tag = "addresses"
)]
pub async fn update_address(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<AddressInput>,
) -> Result<Json<Address>, AppError> {
    Ok(Json(state.addresses.update(id, input).await?))
}

/// `DELETE /api/address/{id}` — delete with either `forceDelete=true` or a
/// redirect target for the town.
#[utoipa::path(
    delete,
    path = "/api/address/{id}",
    params(("id" = i64, Path, description = "Address id"), AddressDeleteQuery),
    responses((status = 200, description = "Address deleted", body = Address)),
    tag = "addresses"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<AddressDeleteQuery>,
) -> Result<Json<Address>, AppError> {
    Ok(Json(
        state
            .addresses
            .delete(id, query.force_delete, query.redirect_to_address_id)
            .await?,
    ))
}

/// `GET /api/address` — paginated, filterable listing.
#[utoipa::path(
    get,
    path = "/api/address",
    params(AddressListQuery),
    responses((status = 200, description = "One page of addresses", body = Page<Address>)),
    tag = "addresses"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    Query(query): Query<AddressListQuery>,
) -> Result<Json<Page<Address>>, AppError> {
    Ok(Json(state.addresses.list(query.into_list_params()).await?))
}

/// `GET /api/address/without-location` — addresses that have no town.
#[utoipa::path(
    get,
    path = "/api/address/without-location",
    params(AddressListQuery),
    responses((status = 200, description = "One page of townless addresses", body = Page<Address>)),
    tag = "addresses"
)]
pub async fn list_addresses_without_location(
    State(state): State<AppState>,
    Query(query): Query<AddressListQuery>,
) -> Result<Json<Page<Address>>, AppError> {
    Ok(Json(
        state.addresses.list_without_town(query.into_list_params()).await?,
    ))
}

/// `GET /api/address/{id}` — fetch one address.
#[utoipa::path(
    get,
    path = "/api/address/{id}",
    params(("id" = i64, Path, description = "Address id")),
    responses((status = 200, description = "The address", body = Address)),
    tag = "addresses"
)]
pub async fn get_address(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Address>, AppError> {
    Ok(Json(state.addresses.get(id).await?))
}
