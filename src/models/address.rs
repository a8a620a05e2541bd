//! Postal/official addresses referenced by organizations.

use crate::models::location::Location;
use serde::Serialize;
use utoipa::ToSchema;

/// An address, optionally anchored to a town location.
///
/// Addresses are shared reference data: organizations point at them through
/// `official_address_id` / `postal_address_id` foreign keys, and an address
/// in use cannot be removed until those references are cleared.
#[derive(Serialize, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Database identifier.
    pub id: i64,

    /// Free-form postal code. May be absent.
    pub zip_code: Option<String>,

    /// The town this address belongs to, when one is attached.
    pub town: Option<Location>,
}
