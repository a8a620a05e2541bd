pub mod address_handlers;
pub mod coordinates_handlers;
pub mod health_handlers;
pub mod import_handlers;
pub mod location_handlers;
pub mod organization_handlers;
pub mod special_handlers;
pub mod ws_handlers;
