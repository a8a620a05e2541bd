//! Plane coordinates attached to an organization.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A coordinate pair referenced by organizations.
///
/// Coordinates are standalone rows so several organizations can point at the
/// same pair. `x` is a whole-number axis value, `y` a single-precision one.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, ToSchema)]
pub struct Coordinates {
    /// Database identifier.
    pub id: i64,

    pub x: i64,

    pub y: f32,
}
