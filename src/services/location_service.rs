//! CRUD over town locations.

use crate::{
    models::{
        location::Location,
        page::{Page, SortDirection},
    },
    services::{
        contains_pattern, notifier::Notifier, page_bounds, resolve_sort, RegistryError,
        RegistryResult,
    },
};
use serde::Deserialize;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use utoipa::ToSchema;

/// Payload for creating or replacing a location. `z` has no column
/// default, so it is required.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LocationInput {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f64,
    pub z: f32,
    pub name: Option<String>,
}

#[derive(Debug, Default)]
pub struct LocationListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort_by: Option<String>,
    pub direction: SortDirection,
    /// Case-insensitive substring filter on the town name.
    pub name_contains: Option<String>,
}

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "id"),
    ("x", "x"),
    ("y", "y"),
    ("z", "z"),
    ("name", "name"),
];

#[derive(Clone)]
pub struct LocationService {
    db: Arc<PgPool>,
    notifier: Notifier,
}

impl LocationService {
    pub fn new(db: Arc<PgPool>, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    pub async fn create(&self, input: LocationInput) -> RegistryResult<Location> {
        let created = insert_location(&*self.db, &input).await?;
        self.notifier.table_changed("locations");
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: LocationInput) -> RegistryResult<Location> {
        fetch_location(&*self.db, id).await?;
        let updated = sqlx::query_as::<_, Location>(
            "UPDATE locations SET x = $1, y = $2, z = $3, name = $4
             WHERE id = $5 RETURNING id, x, y, z, name",
        )
        .bind(input.x)
        .bind(input.y)
        .bind(input.z)
        .bind(&input.name)
        .bind(id)
        .fetch_one(&*self.db)
        .await?;

        self.notifier.table_changed("locations");
        Ok(updated)
    }

    /// Delete a location, refusing while addresses still use it as their
    /// town.
    pub async fn delete(&self, id: i64) -> RegistryResult<Location> {
        let record = fetch_location(&*self.db, id).await?;

        let used_by: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE town_id = $1")
            .bind(id)
            .fetch_one(&*self.db)
            .await?;
        if used_by > 0 {
            return Err(RegistryError::Conflict(format!(
                "location with id {id} is used by {used_by} address(es), clear addresses first"
            )));
        }

        sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;

        self.notifier.table_changed("locations");
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> RegistryResult<Location> {
        fetch_location(&*self.db, id).await
    }

    pub async fn list(&self, params: LocationListParams) -> RegistryResult<Page<Location>> {
        let (page, size) = page_bounds(params.page, params.size);
        let order = resolve_sort(params.sort_by.as_deref(), SORT_COLUMNS)?;
        let direction = params.direction.as_sql();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM locations WHERE 1=1");
        let mut select = QueryBuilder::<Postgres>::new(
            "SELECT id, x, y, z, name FROM locations WHERE 1=1",
        );
        for builder in [&mut count, &mut select] {
            if let Some(name) = &params.name_contains {
                builder.push(" AND name ILIKE ");
                builder.push_bind(contains_pattern(name));
            }
        }

        let total: i64 = count.build_query_scalar().fetch_one(&*self.db).await?;

        select.push(format!(" ORDER BY {order} {direction} LIMIT "));
        select.push_bind(size);
        select.push(" OFFSET ");
        select.push_bind(page * size);
        let rows: Vec<Location> = select.build_query_as().fetch_all(&*self.db).await?;

        Ok(Page::new(rows, page, size, total))
    }
}

/// Fetch one location, mapping a missing row to `NotFound`.
pub(crate) async fn fetch_location(ex: impl PgExecutor<'_>, id: i64) -> RegistryResult<Location> {
    sqlx::query_as::<_, Location>("SELECT id, x, y, z, name FROM locations WHERE id = $1")
        .bind(id)
        .fetch_one(ex)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => RegistryError::NotFound {
                entity: "location",
                id,
            },
            other => RegistryError::Sqlx(other),
        })
}

/// Insert a location row from its input payload.
pub(crate) async fn insert_location(
    ex: impl PgExecutor<'_>,
    input: &LocationInput,
) -> RegistryResult<Location> {
    let created = sqlx::query_as::<_, Location>(
        "INSERT INTO locations (x, y, z, name) VALUES ($1, $2, $3, $4)
         RETURNING id, x, y, z, name",
    )
    .bind(input.x)
    .bind(input.y)
    .bind(input.z)
    .bind(&input.name)
    .fetch_one(ex)
    .await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevation_is_required() {
        assert!(serde_json::from_str::<LocationInput>("{}").is_err());
        let input: LocationInput = serde_json::from_str(r#"{"z": 12.5}"#).unwrap();
        assert_eq!(input.x, 0.0);
        assert_eq!(input.y, 0.0);
        assert_eq!(input.z, 12.5);
        assert!(input.name.is_none());
    }
}
