//! CRUD over the shared coordinate pairs.

use crate::{
    models::{
        coordinates::Coordinates,
        page::{Page, SortDirection},
    },
    services::{notifier::Notifier, page_bounds, resolve_sort, RegistryError, RegistryResult},
};
use serde::Deserialize;
use sqlx::{PgExecutor, PgPool};
use std::sync::Arc;
use utoipa::ToSchema;

/// Payload for creating or replacing a coordinate pair.
///
/// Missing axes default to zero, matching the column defaults.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CoordinatesInput {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: f32,
}

/// Paging for the coordinate listing; there are no filters.
#[derive(Debug, Default)]
pub struct CoordinatesListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort_by: Option<String>,
    pub direction: SortDirection,
}

const SORT_COLUMNS: &[(&str, &str)] = &[("id", "id"), ("x", "x"), ("y", "y")];

#[derive(Clone)]
pub struct CoordinatesService {
    db: Arc<PgPool>,
    notifier: Notifier,
}

impl CoordinatesService {
    pub fn new(db: Arc<PgPool>, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    pub async fn create(&self, input: CoordinatesInput) -> RegistryResult<Coordinates> {
        let created = sqlx::query_as::<_, Coordinates>(
            "INSERT INTO coordinates (x, y) VALUES ($1, $2) RETURNING id, x, y",
        )
        .bind(input.x)
        .bind(input.y)
        .fetch_one(&*self.db)
        .await?;

        self.notifier.table_changed("coordinates");
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: CoordinatesInput) -> RegistryResult<Coordinates> {
        fetch_coordinates(&*self.db, id).await?;
        let updated = sqlx::query_as::<_, Coordinates>(
            "UPDATE coordinates SET x = $1, y = $2 WHERE id = $3 RETURNING id, x, y",
        )
        .bind(input.x)
        .bind(input.y)
        .bind(id)
        .fetch_one(&*self.db)
        .await?;

        self.notifier.table_changed("coordinates");
        Ok(updated)
    }

    /// Delete a coordinate pair, refusing while organizations still point
    /// at it.
    pub async fn delete(&self, id: i64) -> RegistryResult<Coordinates> {
        let record = fetch_coordinates(&*self.db, id).await?;

        let used_by: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM organizations WHERE coordinates_id = $1")
                .bind(id)
                .fetch_one(&*self.db)
                .await?;
        if used_by > 0 {
            return Err(RegistryError::Conflict(format!(
                "coordinates with id {id} is used by {used_by} organization(s), clear organizations first"
            )));
        }

        sqlx::query("DELETE FROM coordinates WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;

        self.notifier.table_changed("coordinates");
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> RegistryResult<Coordinates> {
        fetch_coordinates(&*self.db, id).await
    }

    pub async fn list(&self, params: CoordinatesListParams) -> RegistryResult<Page<Coordinates>> {
        let (page, size) = page_bounds(params.page, params.size);
        let order = resolve_sort(params.sort_by.as_deref(), SORT_COLUMNS)?;
        let direction = params.direction.as_sql();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coordinates")
            .fetch_one(&*self.db)
            .await?;

        let sql = format!(
            "SELECT id, x, y FROM coordinates ORDER BY {order} {direction} LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, Coordinates>(&sql)
            .bind(size)
            .bind(page * size)
            .fetch_all(&*self.db)
            .await?;

        Ok(Page::new(rows, page, size, total))
    }
}

/// Fetch one coordinate pair, mapping a missing row to `NotFound`.
pub(crate) async fn fetch_coordinates(
    ex: impl PgExecutor<'_>,
    id: i64,
) -> RegistryResult<Coordinates> {
    sqlx::query_as::<_, Coordinates>("SELECT id, x, y FROM coordinates WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => RegistryError::NotFound {
                entity: "coordinates",
                id,
            },
            other => RegistryError::Sqlx(other),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_axes_default_to_zero() {
        let input: CoordinatesInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.x, 0);
        assert_eq!(input.y, 0.0);
    }

    #[test]
    fn sort_whitelist_covers_all_columns() {
        for field in ["id", "x", "y"] {
            assert!(resolve_sort(Some(field), SORT_COLUMNS).is_ok());
        }
        assert!(resolve_sort(Some("name"), SORT_COLUMNS).is_err());
    }
}
