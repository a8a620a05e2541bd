//! CRUD and redirect-delete semantics for addresses.

use crate::{
    models::{
        address::Address,
        location::Location,
        page::{Page, SortDirection},
    },
    services::{
        contains_pattern,
        location_service::{fetch_location, insert_location, LocationInput},
        notifier::Notifier,
        page_bounds, resolve_sort, RegistryError, RegistryResult,
    },
};
use serde::Deserialize;
use sqlx::{FromRow, PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use utoipa::ToSchema;

/// Payload for creating or replacing an address.
///
/// The town can be given inline (`location`) or as a reference to an
/// existing row (`locationId`), but not both. Without either the address
/// has no town.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub zip_code: Option<String>,
    pub location: Option<LocationInput>,
    pub location_id: Option<i64>,
}

#[derive(Debug, Default)]
pub struct AddressListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort_by: Option<String>,
    pub direction: SortDirection,
    /// Case-insensitive substring filter on the zip code.
    pub zip_code: Option<String>,
}

/// An address resolved to concrete values but not necessarily persisted
/// yet. `existing_id` is set when the caller referenced a stored row.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedAddress {
    pub existing_id: Option<i64>,
    pub zip_code: Option<String>,
    pub town: Option<ResolvedTown>,
}

/// Town values backing geographic validation, persisted or not.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedTown {
    pub existing_id: Option<i64>,
    pub x: f32,
    pub y: f64,
    pub z: f32,
    pub name: Option<String>,
}

const SORT_COLUMNS: &[(&str, &str)] = &[("id", "a.id"), ("zipCode", "a.zip_code")];

const ADDRESS_SELECT: &str = "SELECT a.id, a.zip_code, \
     l.id AS town_id, l.x AS town_x, l.y AS town_y, l.z AS town_z, l.name AS town_name \
     FROM addresses a LEFT JOIN locations l ON l.id = a.town_id";

/// Flat row for the address/location join, assembled into the nested model.
#[derive(FromRow)]
struct AddressRow {
    id: i64,
    zip_code: Option<String>,
    town_id: Option<i64>,
    town_x: Option<f32>,
    town_y: Option<f64>,
    town_z: Option<f32>,
    town_name: Option<String>,
}

impl AddressRow {
    fn into_address(self) -> Address {
        let town = self.town_id.map(|id| Location {
            id,
            x: self.town_x.unwrap_or_default(),
            y: self.town_y.unwrap_or_default(),
            z: self.town_z.unwrap_or_default(),
            name: self.town_name,
        });
        Address {
            id: self.id,
            zip_code: self.zip_code,
            town,
        }
    }
}

#[derive(Clone)]
pub struct AddressService {
    db: Arc<PgPool>,
    notifier: Notifier,
}

impl AddressService {
    pub fn new(db: Arc<PgPool>, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    pub async fn create(&self, input: AddressInput) -> RegistryResult<Address> {
        let mut tx = self.db.begin().await?;
        let resolved = resolve_address_input(&mut tx, &input).await?;
        let id = persist_resolved_address(&mut tx, &resolved).await?;
        tx.commit().await?;

        let created = fetch_address(&*self.db, id).await?;
        self.notifier.table_changed("addresses");
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: AddressInput) -> RegistryResult<Address> {
        fetch_address(&*self.db, id).await?;

        let mut tx = self.db.begin().await?;
        let resolved = resolve_address_input(&mut tx, &input).await?;
        let town_id = persist_resolved_town(&mut tx, resolved.town.as_ref()).await?;
        sqlx::query("UPDATE addresses SET zip_code = $1, town_id = $2 WHERE id = $3")
            .bind(&resolved.zip_code)
            .bind(town_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let updated = fetch_address(&*self.db, id).await?;
        self.notifier.table_changed("addresses");
        Ok(updated)
    }

    /// Delete an address.
    ///
    /// Exactly one of `force_delete = true` or `redirect_to` must be given.
    /// With a redirect target, the deleted address's town is moved onto the
    /// target, which must exist and must not already carry a town. An
    /// address still referenced by organizations cannot be deleted either
    /// way.
    pub async fn delete(
        &self,
        id: i64,
        force_delete: Option<bool>,
        redirect_to: Option<i64>,
    ) -> RegistryResult<Address> {
        let mode = validate_delete_params(id, force_delete, redirect_to)?;

        let record = fetch_address(&*self.db, id).await?;

        let used_by: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM organizations \
             WHERE postal_address_id = $1 OR official_address_id = $1",
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await?;
        if used_by > 0 {
            return Err(RegistryError::Conflict(format!(
                "address with id {id} is used by {used_by} organization(s), clear organizations first"
            )));
        }

        if let DeleteMode::Redirect(target_id) = mode {
            let target = fetch_address(&*self.db, target_id).await?;
            if target.town.is_some() {
                return Err(RegistryError::Conflict(format!(
                    "location for address with id {target_id} is not empty"
                )));
            }

            let mut tx = self.db.begin().await?;
            sqlx::query("UPDATE addresses SET town_id = $1 WHERE id = $2")
                .bind(record.town.as_ref().map(|t| t.id))
                .bind(target_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM addresses WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
        } else {
            sqlx::query("DELETE FROM addresses WHERE id = $1")
                .bind(id)
                .execute(&*self.db)
                .await?;
        }

        self.notifier.table_changed("addresses");
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> RegistryResult<Address> {
        fetch_address(&*self.db, id).await
    }

    pub async fn list(&self, params: AddressListParams) -> RegistryResult<Page<Address>> {
        let (page, size) = page_bounds(params.page, params.size);
        let order = resolve_sort(params.sort_by.as_deref(), SORT_COLUMNS)?;
        let direction = params.direction.as_sql();

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM addresses a WHERE 1=1",
        );
        let mut select = QueryBuilder::<Postgres>::new(format!("{ADDRESS_SELECT} WHERE 1=1"));
        for builder in [&mut count, &mut select] {
            if let Some(zip) = &params.zip_code {
                builder.push(" AND a.zip_code ILIKE ");
                builder.push_bind(contains_pattern(zip));
            }
        }

        let total: i64 = count.build_query_scalar().fetch_one(&*self.db).await?;

        select.push(format!(" ORDER BY {order} {direction} LIMIT "));
        select.push_bind(size);
        select.push(" OFFSET ");
        select.push_bind(page * size);
        let rows: Vec<AddressRow> = select.build_query_as().fetch_all(&*self.db).await?;

        Ok(Page::new(
            rows.into_iter().map(AddressRow::into_address).collect(),
            page,
            size,
            total,
        ))
    }

    /// Page through addresses that have no town attached.
    pub async fn list_without_town(
        &self,
        params: AddressListParams,
    ) -> RegistryResult<Page<Address>> {
        let (page, size) = page_bounds(params.page, params.size);
        let order = resolve_sort(params.sort_by.as_deref(), SORT_COLUMNS)?;
        let direction = params.direction.as_sql();

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM addresses a WHERE a.town_id IS NULL")
                .fetch_one(&*self.db)
                .await?;

        let sql = format!(
            "{ADDRESS_SELECT} WHERE a.town_id IS NULL ORDER BY {order} {direction} LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, AddressRow>(&sql)
            .bind(size)
            .bind(page * size)
            .fetch_all(&*self.db)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(AddressRow::into_address).collect(),
            page,
            size,
            total,
        ))
    }
}

/// How a delete request disposes of the address.
#[derive(Debug, PartialEq, Eq)]
enum DeleteMode {
    Force,
    Redirect(i64),
}

fn validate_delete_params(
    id: i64,
    force_delete: Option<bool>,
    redirect_to: Option<i64>,
) -> RegistryResult<DeleteMode> {
    let force = force_delete.unwrap_or(false);
    if force && redirect_to.is_some() {
        return Err(RegistryError::Invalid(
            "cannot use both forceDelete and redirectToAddressId".into(),
        ));
    }
    if redirect_to == Some(id) {
        return Err(RegistryError::Conflict(
            "cannot redirect to the address being deleted".into(),
        ));
    }
    match (force, redirect_to) {
        (true, None) => Ok(DeleteMode::Force),
        (false, Some(target)) => Ok(DeleteMode::Redirect(target)),
        _ => Err(RegistryError::Invalid(
            "either forceDelete=true or redirectToAddressId must be provided".into(),
        )),
    }
}

/// Fetch one address with its town, mapping a missing row to `NotFound`.
pub(crate) async fn fetch_address(ex: impl PgExecutor<'_>, id: i64) -> RegistryResult<Address> {
    let sql = format!("{ADDRESS_SELECT} WHERE a.id = $1");
    sqlx::query_as::<_, AddressRow>(&sql)
        .bind(id)
        .fetch_one(ex)
        .await
        .map(AddressRow::into_address)
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => RegistryError::NotFound {
                entity: "address",
                id,
            },
            other => RegistryError::Sqlx(other),
        })
}

/// Resolve an input payload to concrete address values, fetching the
/// referenced town when one is given by id.
pub(crate) async fn resolve_address_input(
    conn: &mut PgConnection,
    input: &AddressInput,
) -> RegistryResult<ResolvedAddress> {
    if input.location.is_some() && input.location_id.is_some() {
        return Err(RegistryError::Invalid(
            "cannot provide both locationId and an inline location".into(),
        ));
    }

    let town = match (&input.location, input.location_id) {
        (Some(inline), None) => Some(ResolvedTown {
            existing_id: None,
            x: inline.x,
            y: inline.y,
            z: inline.z,
            name: inline.name.clone(),
        }),
        (None, Some(id)) => {
            let existing = fetch_location(&mut *conn, id).await?;
            Some(ResolvedTown {
                existing_id: Some(existing.id),
                x: existing.x,
                y: existing.y,
                z: existing.z,
                name: existing.name,
            })
        }
        (None, None) => None,
        (Some(_), Some(_)) => unreachable!("rejected above"),
    };

    Ok(ResolvedAddress {
        existing_id: None,
        zip_code: input.zip_code.clone(),
        town,
    })
}

/// Load an already-stored address into the resolved form.
pub(crate) async fn resolve_existing_address(
    conn: &mut PgConnection,
    id: i64,
) -> RegistryResult<ResolvedAddress> {
    let address = fetch_address(&mut *conn, id).await?;
    Ok(ResolvedAddress {
        existing_id: Some(address.id),
        zip_code: address.zip_code,
        town: address.town.map(|t| ResolvedTown {
            existing_id: Some(t.id),
            x: t.x,
            y: t.y,
            z: t.z,
            name: t.name,
        }),
    })
}

/// Persist the town of a resolved address if it is new; returns the town id
/// to store on the address row, if any.
pub(crate) async fn persist_resolved_town(
    conn: &mut PgConnection,
    town: Option<&ResolvedTown>,
) -> RegistryResult<Option<i64>> {
    match town {
        None => Ok(None),
        Some(town) => match town.existing_id {
            Some(id) => Ok(Some(id)),
            None => {
                let created = insert_location(
                    &mut *conn,
                    &LocationInput {
                        x: town.x,
                        y: town.y,
                        z: town.z,
                        name: town.name.clone(),
                    },
                )
                .await?;
                Ok(Some(created.id))
            }
        },
    }
}

/// Persist a resolved address (and its new town) unless it already exists;
/// returns the address id to reference.
pub(crate) async fn persist_resolved_address(
    conn: &mut PgConnection,
    resolved: &ResolvedAddress,
) -> RegistryResult<i64> {
    if let Some(id) = resolved.existing_id {
        return Ok(id);
    }
    let town_id = persist_resolved_town(&mut *conn, resolved.town.as_ref()).await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO addresses (zip_code, town_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(&resolved.zip_code)
    .bind(town_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn delete_requires_exactly_one_mode() {
        let err = validate_delete_params(1, Some(true), Some(2)).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = validate_delete_params(1, None, None).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = validate_delete_params(1, Some(false), None).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            validate_delete_params(1, Some(true), None).unwrap(),
            DeleteMode::Force
        );
        assert_eq!(
            validate_delete_params(1, None, Some(2)).unwrap(),
            DeleteMode::Redirect(2)
        );
    }

    #[test]
    fn delete_rejects_self_redirect() {
        let err = validate_delete_params(7, None, Some(7)).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn input_accepts_camel_case_reference() {
        let input: AddressInput =
            serde_json::from_str(r#"{"zipCode": "190000", "locationId": 3}"#).unwrap();
        assert_eq!(input.zip_code.as_deref(), Some("190000"));
        assert_eq!(input.location_id, Some(3));
        assert!(input.location.is_none());
    }
}
