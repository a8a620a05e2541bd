//! OpenAPI document for the registry API, assembled from the handler
//! annotations and served as plain JSON.

use crate::{
    handlers::{
        address_handlers, coordinates_handlers, import_handlers, location_handlers,
        organization_handlers, special_handlers,
    },
    models::{
        address::Address, coordinates::Coordinates, import_history::ImportHistory,
        location::Location, organization::Organization, organization::OrganizationType,
        page::{Page, SortDirection},
    },
    services::{
        address_service::AddressInput,
        coordinates_service::CoordinatesInput,
        location_service::LocationInput,
        organization_service::OrganizationInput,
        special_service::{FullNameCount, MergeOrganizationsInput},
    },
};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Organization Registry API",
        description = "Registry of organizations with shared coordinates, addresses and town locations",
        version = "1.0.0"
    ),
    paths(
        organization_handlers::create_organization,
        organization_handlers::update_organization,
        organization_handlers::delete_organization,
        organization_handlers::list_organizations,
        organization_handlers::get_organization,
        address_handlers::create_address,
        address_handlers::update_address,
        address_handlers::delete_address,
        address_handlers::list_addresses,
        address_handlers::list_addresses_without_location,
        address_handlers::get_address,
        coordinates_handlers::create_coordinates,
        coordinates_handlers::update_coordinates,
        coordinates_handlers::delete_coordinates,
        coordinates_handlers::list_coordinates,
        coordinates_handlers::get_coordinates,
        location_handlers::create_location,
        location_handlers::update_location,
        location_handlers::delete_location,
        location_handlers::list_locations,
        location_handlers::get_location,
        special_handlers::max_official_address,
        special_handlers::group_by_full_name,
        special_handlers::search_by_full_name,
        special_handlers::increment_employee_count,
        special_handlers::join_organizations,
        import_handlers::import_organizations,
        import_handlers::import_history,
    ),
    components(schemas(
        Organization,
        OrganizationType,
        OrganizationInput,
        Address,
        AddressInput,
        Coordinates,
        CoordinatesInput,
        Location,
        LocationInput,
        ImportHistory,
        FullNameCount,
        MergeOrganizationsInput,
        SortDirection,
        Page<Organization>,
        Page<Address>,
        Page<Coordinates>,
        Page<Location>,
        Page<ImportHistory>,
    )),
    tags(
        (name = "organizations", description = "Create, read, update and delete organizations"),
        (name = "addresses", description = "Manage shared addresses"),
        (name = "coordinates", description = "Manage shared coordinate pairs"),
        (name = "locations", description = "Manage town locations"),
        (name = "special-operations", description = "Statistics, search and merge operations"),
        (name = "import", description = "Bulk import of organizations from JSON files"),
    )
)]
pub struct ApiDoc;

/// `GET /api-docs/openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_covers_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/organization",
            "/api/organization/{id}",
            "/api/address",
            "/api/address/without-location",
            "/api/address/{id}",
            "/api/coordinates",
            "/api/coordinates/{id}",
            "/api/location",
            "/api/location/{id}",
            "/api/special-operation/max-official-address",
            "/api/special-operation/group-fullname",
            "/api/special-operation/organization-where-fullname-contains",
            "/api/special-operation/update-count-employee",
            "/api/special-operation/join-organizations",
            "/api/import",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
