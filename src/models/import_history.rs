//! Audit trail of bulk import attempts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Import succeeded and all entries were committed.
pub const IMPORT_STATUS_SUCCESS: i32 = 0;
/// Import failed and was rolled back.
pub const IMPORT_STATUS_ERROR: i32 = 1;

/// One recorded import attempt.
///
/// A row is written for every attempt, including failed ones; `counter`
/// is the number of organizations created before the attempt finished
/// (or before the first error on a failed attempt).
#[derive(Serialize, Clone, FromRow, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportHistory {
    /// Database identifier.
    pub id: i64,

    pub creation_date: DateTime<Utc>,

    /// 0 on success, 1 on error.
    pub status: i32,

    /// Organizations processed by this attempt.
    pub counter: i32,
}
