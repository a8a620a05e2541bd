//! Organization CRUD and the business rules guarding every write.
//!
//! Creating or updating an organization runs a fixed pipeline: shape
//! validation, component resolution (inline payloads vs references to
//! stored rows), uniqueness checks, the turnover floor, then the
//! geographic rules. Everything it persists lands in one transaction so
//! a failed rule never leaves stray component rows behind.

use crate::{
    models::{
        organization::{Organization, OrganizationType},
        page::{Page, SortDirection},
    },
    services::{
        address_service::{
            persist_resolved_address, resolve_address_input, resolve_existing_address,
            AddressInput, ResolvedAddress, ResolvedTown,
        },
        contains_pattern,
        coordinates_service::{fetch_coordinates, CoordinatesInput},
        notifier::Notifier,
        page_bounds, resolve_sort, RegistryError, RegistryResult,
    },
};
use crate::models::{address::Address, coordinates::Coordinates, location::Location};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use utoipa::ToSchema;

const EARTH_RADIUS_KM: f64 = 6371.0;
const MAX_GOV_DISTANCE_KM: f64 = 10.0;
const MAX_TRUST_DISTANCE_KM: f64 = 1000.0;
const MONTHLY_SUBSISTENCE: f64 = 19500.0;

/// Payload for creating or replacing an organization.
///
/// Every component can be given inline or as a reference to an existing
/// row, never both. Fields are optional at the serde level so validation
/// can report precise errors instead of opaque deserialization failures.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInput {
    pub name: Option<String>,
    pub coordinates: Option<CoordinatesInput>,
    pub coordinates_id: Option<i64>,
    pub official_address: Option<AddressInput>,
    pub official_address_id: Option<i64>,
    pub annual_turnover: Option<f64>,
    pub employees_count: Option<i32>,
    pub rating: Option<f32>,
    pub full_name: Option<String>,
    #[serde(rename = "type")]
    pub org_type: Option<OrganizationType>,
    pub postal_address: Option<AddressInput>,
    pub postal_address_id: Option<i64>,
}

#[derive(Debug, Default)]
pub struct OrganizationListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort_by: Option<String>,
    pub direction: SortDirection,
    /// Case-insensitive substring filter on the short name.
    pub name: Option<String>,
    /// Case-insensitive substring filter on the full name.
    pub full_name: Option<String>,
}

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "o.id"),
    ("name", "o.name"),
    ("fullName", "o.full_name"),
    ("annualTurnover", "o.annual_turnover"),
    ("employeesCount", "o.employees_count"),
    ("rating", "o.rating"),
    ("creationDate", "o.creation_date"),
];

pub(crate) const ORG_SELECT: &str = "SELECT o.id, o.name, o.creation_date, o.annual_turnover, \
     o.employees_count, o.rating, o.full_name, o.org_type, \
     c.id AS coordinates_id, c.x AS coordinates_x, c.y AS coordinates_y, \
     oa.id AS official_id, oa.zip_code AS official_zip_code, \
     ot.id AS official_town_id, ot.x AS official_town_x, ot.y AS official_town_y, \
     ot.z AS official_town_z, ot.name AS official_town_name, \
     pa.id AS postal_id, pa.zip_code AS postal_zip_code, \
     pt.id AS postal_town_id, pt.x AS postal_town_x, pt.y AS postal_town_y, \
     pt.z AS postal_town_z, pt.name AS postal_town_name \
     FROM organizations o \
     JOIN coordinates c ON c.id = o.coordinates_id \
     JOIN addresses oa ON oa.id = o.official_address_id \
     LEFT JOIN locations ot ON ot.id = oa.town_id \
     JOIN addresses pa ON pa.id = o.postal_address_id \
     LEFT JOIN locations pt ON pt.id = pa.town_id";

/// Flat row for the five-way organization join.
#[derive(FromRow)]
pub(crate) struct OrganizationRow {
    id: i64,
    name: String,
    creation_date: DateTime<Utc>,
    annual_turnover: f64,
    employees_count: Option<i32>,
    rating: Option<f32>,
    full_name: String,
    org_type: String,
    coordinates_id: i64,
    coordinates_x: i64,
    coordinates_y: f32,
    official_id: i64,
    official_zip_code: Option<String>,
    official_town_id: Option<i64>,
    official_town_x: Option<f32>,
    official_town_y: Option<f64>,
    official_town_z: Option<f32>,
    official_town_name: Option<String>,
    postal_id: i64,
    postal_zip_code: Option<String>,
    postal_town_id: Option<i64>,
    postal_town_x: Option<f32>,
    postal_town_y: Option<f64>,
    postal_town_z: Option<f32>,
    postal_town_name: Option<String>,
}

impl OrganizationRow {
    pub(crate) fn into_record(self) -> RegistryResult<Organization> {
        let org_type = OrganizationType::parse(&self.org_type).ok_or_else(|| {
            RegistryError::Corrupt(format!("unknown organization type: {}", self.org_type))
        })?;

        let official_town = self.official_town_id.map(|id| Location {
            id,
            x: self.official_town_x.unwrap_or_default(),
            y: self.official_town_y.unwrap_or_default(),
            z: self.official_town_z.unwrap_or_default(),
            name: self.official_town_name,
        });
        let postal_town = self.postal_town_id.map(|id| Location {
            id,
            x: self.postal_town_x.unwrap_or_default(),
            y: self.postal_town_y.unwrap_or_default(),
            z: self.postal_town_z.unwrap_or_default(),
            name: self.postal_town_name,
        });

        Ok(Organization {
            id: self.id,
            name: self.name,
            coordinates: Coordinates {
                id: self.coordinates_id,
                x: self.coordinates_x,
                y: self.coordinates_y,
            },
            creation_date: self.creation_date,
            official_address: Address {
                id: self.official_id,
                zip_code: self.official_zip_code,
                town: official_town,
            },
            annual_turnover: self.annual_turnover,
            employees_count: self.employees_count,
            rating: self.rating,
            full_name: self.full_name,
            org_type,
            postal_address: Address {
                id: self.postal_id,
                zip_code: self.postal_zip_code,
                town: postal_town,
            },
        })
    }
}

pub(crate) fn rows_to_records(rows: Vec<OrganizationRow>) -> RegistryResult<Vec<Organization>> {
    rows.into_iter().map(OrganizationRow::into_record).collect()
}

/// Coordinates resolved to concrete values but not necessarily persisted.
#[derive(Debug, Clone)]
struct ResolvedCoordinates {
    existing_id: Option<i64>,
    x: i64,
    y: f32,
}

/// A fully validated organization, ready to persist.
struct PreparedOrganization {
    name: String,
    full_name: String,
    annual_turnover: f64,
    employees_count: Option<i32>,
    rating: Option<f32>,
    org_type: OrganizationType,
    coordinates: ResolvedCoordinates,
    official: ResolvedAddress,
    postal: ResolvedAddress,
}

#[derive(Clone)]
pub struct OrganizationService {
    db: Arc<PgPool>,
    notifier: Notifier,
}

impl OrganizationService {
    pub fn new(db: Arc<PgPool>, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    pub async fn create(&self, input: OrganizationInput) -> RegistryResult<Organization> {
        let mut tx = self.db.begin().await?;
        let id = create_in_conn(&mut tx, &input).await?;
        tx.commit().await?;

        let created = fetch_organization(&*self.db, id).await?;
        self.notifier.table_changed("organizations");
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: OrganizationInput) -> RegistryResult<Organization> {
        fetch_organization(&*self.db, id).await?;

        let mut tx = self.db.begin().await?;
        let prepared = prepare(&mut tx, &input, Some(id)).await?;
        let (coordinates_id, official_id, postal_id) =
            persist_components(&mut tx, &prepared).await?;
        sqlx::query(
            "UPDATE organizations SET name = $1, coordinates_id = $2, official_address_id = $3, \
             annual_turnover = $4, employees_count = $5, rating = $6, full_name = $7, \
             org_type = $8, postal_address_id = $9 WHERE id = $10",
        )
        .bind(&prepared.name)
        .bind(coordinates_id)
        .bind(official_id)
        .bind(prepared.annual_turnover)
        .bind(prepared.employees_count)
        .bind(prepared.rating)
        .bind(&prepared.full_name)
        .bind(prepared.org_type.as_str())
        .bind(postal_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let updated = fetch_organization(&*self.db, id).await?;
        self.notifier.table_changed("organizations");
        Ok(updated)
    }

    /// Delete an organization, returning the removed record. Its component
    /// rows stay behind as shared reference data.
    pub async fn delete(&self, id: i64) -> RegistryResult<Organization> {
        let record = fetch_organization(&*self.db, id).await?;

        sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;

        self.notifier.table_changed("organizations");
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> RegistryResult<Organization> {
        fetch_organization(&*self.db, id).await
    }

    pub async fn list(
        &self,
        params: OrganizationListParams,
    ) -> RegistryResult<Page<Organization>> {
        let (page, size) = page_bounds(params.page, params.size);
        let order = resolve_sort(params.sort_by.as_deref(), SORT_COLUMNS)?;
        let direction = params.direction.as_sql();

        let mut count =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM organizations o WHERE 1=1");
        let mut select = QueryBuilder::<Postgres>::new(format!("{ORG_SELECT} WHERE 1=1"));
        for builder in [&mut count, &mut select] {
            if let Some(name) = &params.name {
                builder.push(" AND o.name ILIKE ");
                builder.push_bind(contains_pattern(name));
            }
            if let Some(full_name) = &params.full_name {
                builder.push(" AND o.full_name ILIKE ");
                builder.push_bind(contains_pattern(full_name));
            }
        }

        let total: i64 = count.build_query_scalar().fetch_one(&*self.db).await?;

        select.push(format!(" ORDER BY {order} {direction} LIMIT "));
        select.push_bind(size);
        select.push(" OFFSET ");
        select.push_bind(page * size);
        let rows: Vec<OrganizationRow> = select.build_query_as().fetch_all(&*self.db).await?;

        Ok(Page::new(rows_to_records(rows)?, page, size, total))
    }
}

/// Run the full validation pipeline and insert the organization plus any
/// inline components on the given connection. Used directly by the bulk
/// import so a whole file shares one transaction.
pub(crate) async fn create_in_conn(
    conn: &mut PgConnection,
    input: &OrganizationInput,
) -> RegistryResult<i64> {
    let prepared = prepare(&mut *conn, input, None).await?;
    let (coordinates_id, official_id, postal_id) = persist_components(&mut *conn, &prepared).await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO organizations (name, coordinates_id, creation_date, official_address_id, \
         annual_turnover, employees_count, rating, full_name, org_type, postal_address_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
    )
    .bind(&prepared.name)
    .bind(coordinates_id)
    .bind(Utc::now())
    .bind(official_id)
    .bind(prepared.annual_turnover)
    .bind(prepared.employees_count)
    .bind(prepared.rating)
    .bind(&prepared.full_name)
    .bind(prepared.org_type.as_str())
    .bind(postal_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Fetch one organization with all components, mapping a missing row to
/// `NotFound`.
pub(crate) async fn fetch_organization(
    ex: impl PgExecutor<'_>,
    id: i64,
) -> RegistryResult<Organization> {
    let sql = format!("{ORG_SELECT} WHERE o.id = $1");
    let row = sqlx::query_as::<_, OrganizationRow>(&sql)
        .bind(id)
        .fetch_one(ex)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => RegistryError::NotFound {
                entity: "organization",
                id,
            },
            other => RegistryError::Sqlx(other),
        })?;
    row.into_record()
}

async fn prepare(
    conn: &mut PgConnection,
    input: &OrganizationInput,
    exclude_id: Option<i64>,
) -> RegistryResult<PreparedOrganization> {
    validate_input(input)?;

    let coordinates = resolve_coordinates(&mut *conn, input).await?;
    let official = resolve_address(
        &mut *conn,
        input.official_address.as_ref(),
        input.official_address_id,
    )
    .await?;
    let postal = resolve_address(
        &mut *conn,
        input.postal_address.as_ref(),
        input.postal_address_id,
    )
    .await?;

    let name = input
        .name
        .clone()
        .ok_or_else(|| RegistryError::Invalid("organization name cannot be empty".into()))?;
    let full_name = input
        .full_name
        .clone()
        .ok_or_else(|| RegistryError::Invalid("full name cannot be empty".into()))?;
    let org_type = input
        .org_type
        .ok_or_else(|| RegistryError::Invalid("organization type must be provided".into()))?;

    if full_name_taken(&mut *conn, &full_name, exclude_id).await? {
        return Err(RegistryError::Conflict(format!(
            "organization with full name `{full_name}` already exists"
        )));
    }
    if let Some(zip) = postal.zip_code.as_deref() {
        if zip_and_type_taken(&mut *conn, zip, org_type, exclude_id).await? {
            return Err(RegistryError::Conflict(format!(
                "organization of type {org_type} already exists with zip code {zip}"
            )));
        }
    }

    let annual_turnover = input.annual_turnover.ok_or_else(|| {
        RegistryError::Unprocessable("annual turnover must be greater than 0".into())
    })?;
    validate_turnover(annual_turnover, input.employees_count)?;
    validate_geo(official.town.as_ref(), postal.town.as_ref(), org_type)?;

    Ok(PreparedOrganization {
        name,
        full_name,
        annual_turnover,
        employees_count: input.employees_count,
        rating: input.rating,
        org_type,
        coordinates,
        official,
        postal,
    })
}

/// Insert any inline components, returning the three foreign keys.
async fn persist_components(
    conn: &mut PgConnection,
    prepared: &PreparedOrganization,
) -> RegistryResult<(i64, i64, i64)> {
    let coordinates_id = match prepared.coordinates.existing_id {
        Some(id) => id,
        None => {
            sqlx::query_scalar("INSERT INTO coordinates (x, y) VALUES ($1, $2) RETURNING id")
                .bind(prepared.coordinates.x)
                .bind(prepared.coordinates.y)
                .fetch_one(&mut *conn)
                .await?
        }
    };
    let official_id = persist_resolved_address(&mut *conn, &prepared.official).await?;
    let postal_id = persist_resolved_address(&mut *conn, &prepared.postal).await?;
    Ok((coordinates_id, official_id, postal_id))
}

async fn resolve_coordinates(
    conn: &mut PgConnection,
    input: &OrganizationInput,
) -> RegistryResult<ResolvedCoordinates> {
    match (&input.coordinates, input.coordinates_id) {
        (Some(inline), None) => Ok(ResolvedCoordinates {
            existing_id: None,
            x: inline.x,
            y: inline.y,
        }),
        (None, Some(id)) => {
            let existing = fetch_coordinates(&mut *conn, id).await?;
            Ok(ResolvedCoordinates {
                existing_id: Some(existing.id),
                x: existing.x,
                y: existing.y,
            })
        }
        _ => Err(RegistryError::Invalid("coordinates must be provided".into())),
    }
}

async fn resolve_address(
    conn: &mut PgConnection,
    inline: Option<&AddressInput>,
    reference: Option<i64>,
) -> RegistryResult<ResolvedAddress> {
    match (inline, reference) {
        (Some(input), None) => resolve_address_input(&mut *conn, input).await,
        (None, Some(id)) => resolve_existing_address(&mut *conn, id).await,
        _ => Err(RegistryError::Invalid("address must be provided".into())),
    }
}

/// Shape checks over the raw payload, before any database access.
fn validate_input(input: &OrganizationInput) -> RegistryResult<()> {
    if input.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        return Err(RegistryError::Invalid(
            "organization name cannot be empty".into(),
        ));
    }
    if input
        .full_name
        .as_deref()
        .map_or(true, |n| n.trim().is_empty())
    {
        return Err(RegistryError::Invalid("full name cannot be empty".into()));
    }
    if input.coordinates.is_some() && input.coordinates_id.is_some() {
        return Err(RegistryError::Conflict(
            "cannot provide both coordinatesId and inline coordinates".into(),
        ));
    }
    if input.coordinates.is_none() && input.coordinates_id.is_none() {
        return Err(RegistryError::Invalid("coordinates must be provided".into()));
    }
    if input.official_address.is_some() && input.official_address_id.is_some() {
        return Err(RegistryError::Conflict(
            "cannot provide both officialAddressId and an inline official address".into(),
        ));
    }
    if input.official_address.is_none() && input.official_address_id.is_none() {
        return Err(RegistryError::Invalid(
            "official address must be provided".into(),
        ));
    }
    if input.postal_address.is_some() && input.postal_address_id.is_some() {
        return Err(RegistryError::Conflict(
            "cannot provide both postalAddressId and an inline postal address".into(),
        ));
    }
    if input.postal_address.is_none() && input.postal_address_id.is_none() {
        return Err(RegistryError::Invalid(
            "postal address must be provided".into(),
        ));
    }
    if input.org_type.is_none() {
        return Err(RegistryError::Invalid(
            "organization type must be provided".into(),
        ));
    }
    match input.annual_turnover {
        Some(turnover) if turnover > 0.0 => {}
        _ => {
            return Err(RegistryError::Unprocessable(
                "annual turnover must be greater than 0".into(),
            ))
        }
    }
    if matches!(input.employees_count, Some(count) if count <= 0) {
        return Err(RegistryError::Unprocessable(
            "employees count must be greater than 0 when provided".into(),
        ));
    }
    if matches!(input.rating, Some(rating) if rating <= 0.0) {
        return Err(RegistryError::Unprocessable(
            "rating must be greater than 0 when provided".into(),
        ));
    }
    Ok(())
}

async fn full_name_taken(
    conn: &mut PgConnection,
    full_name: &str,
    exclude_id: Option<i64>,
) -> RegistryResult<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM organizations \
         WHERE full_name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(full_name)
    .bind(exclude_id)
    .fetch_one(conn)
    .await?;
    Ok(taken)
}

async fn zip_and_type_taken(
    conn: &mut PgConnection,
    zip_code: &str,
    org_type: OrganizationType,
    exclude_id: Option<i64>,
) -> RegistryResult<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM organizations o \
         JOIN addresses pa ON pa.id = o.postal_address_id \
         WHERE pa.zip_code = $1 AND o.org_type = $2 \
         AND ($3::BIGINT IS NULL OR o.id <> $3))",
    )
    .bind(zip_code)
    .bind(org_type.as_str())
    .bind(exclude_id)
    .fetch_one(conn)
    .await?;
    Ok(taken)
}

/// The lowest turnover allowed for a head count: every employee plus the
/// founder earning the monthly subsistence wage for a year.
fn minimum_turnover(employees_count: i32) -> f64 {
    f64::from(employees_count + 1) * 12.0 * MONTHLY_SUBSISTENCE
}

fn validate_turnover(annual_turnover: f64, employees_count: Option<i32>) -> RegistryResult<()> {
    let Some(count) = employees_count else {
        return Ok(());
    };
    let minimum = minimum_turnover(count);
    if annual_turnover < minimum {
        return Err(RegistryError::Conflict(format!(
            "annual turnover is below the subsistence minimum, must be at least {minimum}"
        )));
    }
    Ok(())
}

/// Geographic rules: both addresses need a town with valid latitude and
/// longitude, and government/trust organizations keep their official and
/// postal towns within a fixed distance of each other.
fn validate_geo(
    official: Option<&ResolvedTown>,
    postal: Option<&ResolvedTown>,
    org_type: OrganizationType,
) -> RegistryResult<()> {
    let (Some(official), Some(postal)) = (official, postal) else {
        return Err(RegistryError::Conflict(
            "both the official and postal address must have a town".into(),
        ));
    };

    for town in [official, postal] {
        if !(-90.0..=90.0).contains(&town.x) {
            return Err(RegistryError::Conflict(
                "latitude must be in the interval from -90 to 90".into(),
            ));
        }
        if !(-180.0..=180.0).contains(&town.y) {
            return Err(RegistryError::Conflict(
                "longitude must be in the interval from -180 to 180".into(),
            ));
        }
    }

    let distance = haversine_km(
        f64::from(official.x),
        official.y,
        f64::from(postal.x),
        postal.y,
    );
    let limit = match org_type {
        OrganizationType::Government => MAX_GOV_DISTANCE_KM,
        OrganizationType::Trust => MAX_TRUST_DISTANCE_KM,
        _ => return Ok(()),
    };
    if distance > limit {
        return Err(RegistryError::Conflict(format!(
            "for {} organizations, official and postal addresses must be within {limit:.1} km, \
             current distance: {distance:.2} km",
            org_type.as_str().to_lowercase()
        )));
    }
    Ok(())
}

/// Great-circle distance between two latitude/longitude pairs, in km.
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn valid_input() -> OrganizationInput {
        serde_json::from_str(
            r#"{
                "name": "Atom",
                "fullName": "Atom Corporation",
                "annualTurnover": 5000000.0,
                "employeesCount": 10,
                "rating": 4.5,
                "type": "COMMERCIAL",
                "coordinates": {"x": 10, "y": 2.5},
                "officialAddress": {"zipCode": "190000", "location": {"x": 59.93, "y": 30.33, "z": 5.0, "name": "Saint Petersburg"}},
                "postalAddress": {"zipCode": "190001", "location": {"x": 59.93, "y": 30.36, "z": 5.0}}
            }"#,
        )
        .unwrap()
    }

    fn town(lat: f32, lon: f64) -> ResolvedTown {
        ResolvedTown {
            existing_id: None,
            x: lat,
            y: lon,
            z: 0.0,
            name: None,
        }
    }

    #[test]
    fn valid_payload_passes_shape_checks() {
        assert!(validate_input(&valid_input()).is_ok());
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut input = valid_input();
        input.name = Some("   ".into());
        assert_eq!(
            validate_input(&input).unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );

        let mut input = valid_input();
        input.full_name = None;
        assert_eq!(
            validate_input(&input).unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn component_forms_are_mutually_exclusive() {
        let mut input = valid_input();
        input.coordinates_id = Some(4);
        assert_eq!(
            validate_input(&input).unwrap_err().status(),
            StatusCode::CONFLICT
        );

        let mut input = valid_input();
        input.official_address = None;
        input.official_address_id = None;
        assert_eq!(
            validate_input(&input).unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn nonpositive_numbers_are_unprocessable() {
        let mut input = valid_input();
        input.annual_turnover = Some(0.0);
        assert_eq!(
            validate_input(&input).unwrap_err().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let mut input = valid_input();
        input.employees_count = Some(0);
        assert_eq!(
            validate_input(&input).unwrap_err().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let mut input = valid_input();
        input.rating = Some(-1.0);
        assert_eq!(
            validate_input(&input).unwrap_err().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn turnover_floor_scales_with_head_count() {
        assert_eq!(minimum_turnover(10), 11.0 * 12.0 * 19500.0);
        assert!(validate_turnover(minimum_turnover(10), Some(10)).is_ok());
        assert!(validate_turnover(minimum_turnover(10) - 1.0, Some(10)).is_err());
        // no head count, no floor
        assert!(validate_turnover(1.0, None).is_ok());
    }

    #[test]
    fn haversine_matches_known_distances() {
        // Saint Petersburg <-> Moscow is roughly 634 km
        let d = haversine_km(59.9343, 30.3351, 55.7558, 37.6173);
        assert!((630.0..640.0).contains(&d), "got {d}");

        assert!(haversine_km(10.0, 20.0, 10.0, 20.0).abs() < 1e-9);
    }

    #[test]
    fn geo_requires_towns_on_both_addresses() {
        let err = validate_geo(Some(&town(1.0, 1.0)), None, OrganizationType::Commercial)
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn geo_rejects_out_of_range_angles() {
        let err = validate_geo(
            Some(&town(91.0, 1.0)),
            Some(&town(1.0, 1.0)),
            OrganizationType::Commercial,
        )
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = validate_geo(
            Some(&town(1.0, 1.0)),
            Some(&town(1.0, -181.0)),
            OrganizationType::Commercial,
        )
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn distance_limits_apply_per_type() {
        // ~20 km apart at this latitude
        let near = town(59.93, 30.33);
        let far = town(59.93, 30.70);

        assert!(validate_geo(Some(&near), Some(&far), OrganizationType::Commercial).is_ok());
        assert!(validate_geo(Some(&near), Some(&far), OrganizationType::Trust).is_ok());
        let err =
            validate_geo(Some(&near), Some(&far), OrganizationType::Government).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        // within 10 km passes for government too
        let close = town(59.93, 30.40);
        assert!(validate_geo(Some(&near), Some(&close), OrganizationType::Government).is_ok());
    }

    #[test]
    fn input_parses_type_from_wire_name() {
        let input = valid_input();
        assert_eq!(input.org_type, Some(OrganizationType::Commercial));
        assert_eq!(input.full_name.as_deref(), Some("Atom Corporation"));
    }
}
