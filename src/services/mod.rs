//! Service layer: one service per entity family, all sharing the
//! Postgres pool and the change notifier through [`AppState`].

pub mod address_service;
pub mod coordinates_service;
pub mod import_service;
pub mod location_service;
pub mod notifier;
pub mod organization_service;
pub mod special_service;

use crate::services::{
    address_service::AddressService, coordinates_service::CoordinatesService,
    import_service::ImportService, location_service::LocationService, notifier::Notifier,
    organization_service::OrganizationService, special_service::SpecialOperationService,
};
use axum::http::StatusCode;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

/// Errors produced by the service layer.
///
/// Each variant carries enough context to render the HTTP error body;
/// the mapping to status codes lives in [`RegistryError::status`].
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{entity} not found with id: {id}")]
    NotFound { entity: &'static str, id: i64 },
    /// 404 with a non-id message (empty-registry style lookups).
    #[error("{0}")]
    NoMatch(String),
    /// Malformed or self-contradictory request.
    #[error("{0}")]
    Invalid(String),
    /// The request is well-formed but collides with registry state or
    /// violates a business rule.
    #[error("{0}")]
    Conflict(String),
    /// A field value is outside its permitted range.
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    UnsupportedMedia(String),
    /// A stored value could not be interpreted.
    #[error("{0}")]
    Corrupt(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl RegistryError {
    pub fn status(&self) -> StatusCode {
        match self {
            RegistryError::NotFound { .. } | RegistryError::NoMatch(_) => StatusCode::NOT_FOUND,
            RegistryError::Invalid(_) => StatusCode::BAD_REQUEST,
            RegistryError::Conflict(_) => StatusCode::CONFLICT,
            RegistryError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RegistryError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RegistryError::Corrupt(_) | RegistryError::Sqlx(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Resolve a client-supplied sort field against a whitelist of
/// `(wire name, SQL column)` pairs. Unknown fields are a client error,
/// never interpolated into SQL.
pub(crate) fn resolve_sort(
    field: Option<&str>,
    columns: &[(&str, &'static str)],
) -> RegistryResult<&'static str> {
    let field = field.unwrap_or("id");
    columns
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, column)| *column)
        .ok_or_else(|| RegistryError::Invalid(format!("unsupported sort field: {field}")))
}

/// Normalize page/size inputs: negative pages clamp to 0, sizes to 1..=100.
pub(crate) fn page_bounds(page: Option<i64>, size: Option<i64>) -> (i64, i64) {
    (page.unwrap_or(0).max(0), size.unwrap_or(20).clamp(1, 100))
}

/// Escape LIKE wildcards so user input always matches literally.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Shared application state handed to every handler through the router.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgPool>,
    pub notifier: Notifier,
    pub organizations: OrganizationService,
    pub addresses: AddressService,
    pub coordinates: CoordinatesService,
    pub locations: LocationService,
    pub special: SpecialOperationService,
    pub imports: ImportService,
}

impl AppState {
    pub fn new(db: Arc<PgPool>) -> Self {
        let notifier = Notifier::new();
        let organizations = OrganizationService::new(db.clone(), notifier.clone());
        Self {
            addresses: AddressService::new(db.clone(), notifier.clone()),
            coordinates: CoordinatesService::new(db.clone(), notifier.clone()),
            locations: LocationService::new(db.clone(), notifier.clone()),
            special: SpecialOperationService::new(db.clone(), notifier.clone(), organizations.clone()),
            imports: ImportService::new(db.clone(), notifier.clone()),
            organizations,
            notifier,
            db,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[(&str, &str)] = &[("id", "o.id"), ("fullName", "o.full_name")];

    #[test]
    fn sort_defaults_to_id() {
        assert_eq!(resolve_sort(None, COLUMNS).unwrap(), "o.id");
    }

    #[test]
    fn sort_maps_wire_names_to_columns() {
        assert_eq!(resolve_sort(Some("fullName"), COLUMNS).unwrap(), "o.full_name");
    }

    #[test]
    fn sort_rejects_unknown_fields() {
        let err = resolve_sort(Some("id; DROP TABLE organizations"), COLUMNS).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn page_bounds_clamp() {
        assert_eq!(page_bounds(None, None), (0, 20));
        assert_eq!(page_bounds(Some(-3), Some(0)), (0, 1));
        assert_eq!(page_bounds(Some(2), Some(500)), (2, 100));
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            RegistryError::NotFound {
                entity: "organization",
                id: 7
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RegistryError::Conflict("x".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RegistryError::Unprocessable("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            RegistryError::UnsupportedMedia("x".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }
}
