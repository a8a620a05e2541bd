//! A named point in space that an address can use as its town.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A town location.
///
/// For the geographic business rules, `x` is interpreted as latitude and
/// `y` as longitude (degrees). `z` carries elevation and is required.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, ToSchema)]
pub struct Location {
    /// Database identifier.
    pub id: i64,

    /// Latitude in degrees.
    pub x: f32,

    /// Longitude in degrees.
    pub y: f64,

    /// Elevation.
    pub z: f32,

    /// Optional display name of the town.
    pub name: Option<String>,
}
