//! HTTP handlers for bulk import and its audit history.

use crate::{
    errors::AppError,
    models::{import_history::ImportHistory, page::Page},
    services::AppState,
};
use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;

/// Paging for the import history listing; ordering is fixed to newest
/// first.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImportHistoryQuery {
    /// Zero-based page index.
    pub page: Option<i64>,
    /// Page size, clamped to 1..=100.
    pub size: Option<i64>,
}

/// `POST /api/import` — upload a JSON file of organizations under the
/// multipart field `file`.
#[utoipa::path(
    post,
    path = "/api/import",
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "JSON file under the `file` field"),
    responses((status = 200, description = "Import recorded", body = ImportHistory)),
    tag = "import"
)]
pub async fn import_organizations(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportHistory>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::new(StatusCode::BAD_REQUEST, err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|err| AppError::new(StatusCode::BAD_REQUEST, err.to_string()))?;

        let history = state
            .imports
            .process_import(filename.as_deref(), content_type.as_deref(), data)
            .await?;
        return Ok(Json(history));
    }

    Err(AppError::new(
        StatusCode::BAD_REQUEST,
        "multipart field `file` is required",
    ))
}

/// `GET /api/import` — paginated import history, newest first.
#[utoipa::path(
    get,
    path = "/api/import",
    params(ImportHistoryQuery),
    responses((status = 200, description = "One page of import history", body = Page<ImportHistory>)),
    tag = "import"
)]
pub async fn import_history(
    State(state): State<AppState>,
    Query(query): Query<ImportHistoryQuery>,
) -> Result<Json<Page<ImportHistory>>, AppError> {
    Ok(Json(state.imports.history(query.page, query.size).await?))
}
