//! Defines routes for the whole registry API.
//!
//! ## Structure
//! - **Organizations** — `/api/organization` CRUD + paginated listing
//! - **Addresses** — `/api/address` CRUD, townless listing, redirect delete
//! - **Coordinates** — `/api/coordinates` CRUD
//! - **Locations** — `/api/location` CRUD
//! - **Special operations** — `/api/special-operation/*`
//! - **Import** — `/api/import` upload + history
//! - **Notifications** — `/ws/notifications` websocket broadcast
//! - **Health** — `/healthz`, `/readyz`
//! - **OpenAPI** — `/api-docs/openapi.json`

use crate::{
    handlers::{
        address_handlers::{
            create_address, delete_address, get_address, list_addresses,
            list_addresses_without_location, update_address,
        },
        coordinates_handlers::{
            create_coordinates, delete_coordinates, get_coordinates, list_coordinates,
            update_coordinates,
        },
        health_handlers::{healthz, readyz},
        import_handlers::{import_history, import_organizations},
        location_handlers::{
            create_location, delete_location, get_location, list_locations, update_location,
        },
        organization_handlers::{
            create_organization, delete_organization, get_organization, list_organizations,
            update_organization,
        },
        special_handlers::{
            group_by_full_name, increment_employee_count, join_organizations,
            max_official_address, search_by_full_name,
        },
        ws_handlers::notifications,
    },
    openapi::openapi_json,
    services::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build and return the router for the registry API.
///
/// The router carries shared state ([`AppState`]) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // machine-readable API description
        .route("/api-docs/openapi.json", get(openapi_json))
        // change notifications
        .route("/ws/notifications", get(notifications))
        // organizations
        .route(
            "/api/organization",
            post(create_organization).get(list_organizations),
        )
        .route(
            "/api/organization/{id}",
            get(get_organization)
                .put(update_organization)
                .delete(delete_organization),
        )
        // addresses
        .route(
            "/api/address/without-location",
            get(list_addresses_without_location),
        )
        .route("/api/address", post(create_address).get(list_addresses))
        .route(
            "/api/address/{id}",
            get(get_address).put(update_address).delete(delete_address),
        )
        // coordinates
        .route(
            "/api/coordinates",
            post(create_coordinates).get(list_coordinates),
        )
        .route(
            "/api/coordinates/{id}",
            get(get_coordinates)
                .put(update_coordinates)
                .delete(delete_coordinates),
        )
        // locations
        .route("/api/location", post(create_location).get(list_locations))
        .route(
            "/api/location/{id}",
            get(get_location).put(update_location).delete(delete_location),
        )
        // special operations
        .route(
            "/api/special-operation/max-official-address",
            get(max_official_address),
        )
        .route(
            "/api/special-operation/group-fullname",
            get(group_by_full_name),
        )
        .route(
            "/api/special-operation/organization-where-fullname-contains",
            get(search_by_full_name),
        )
        .route(
            "/api/special-operation/update-count-employee",
            put(increment_employee_count),
        )
        .route(
            "/api/special-operation/join-organizations",
            post(join_organizations),
        )
        // import
        .route(
            "/api/import",
            post(import_organizations).get(import_history),
        )
}
