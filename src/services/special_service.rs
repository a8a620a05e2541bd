//! Domain operations over organizations that go beyond plain CRUD.

use crate::{
    models::organization::Organization,
    services::{
        contains_pattern,
        notifier::Notifier,
        organization_service::{
            fetch_organization, rows_to_records, OrganizationInput, OrganizationRow,
            OrganizationService, ORG_SELECT,
        },
        RegistryError, RegistryResult,
    },
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use utoipa::ToSchema;

/// Request to merge two stored organizations into a new one.
///
/// The inline `organization` describes the merged result; any turnover or
/// rating it leaves unset is derived from the two sources, and the head
/// count is always their sum.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergeOrganizationsInput {
    pub first_organization_id: Option<i64>,
    pub second_organization_id: Option<i64>,
    pub organization: Option<OrganizationInput>,
}

/// One row of the full-name statistics.
#[derive(Serialize, FromRow, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullNameCount {
    pub full_name: String,
    pub count: i64,
}

#[derive(Clone)]
pub struct SpecialOperationService {
    db: Arc<PgPool>,
    notifier: Notifier,
    organizations: OrganizationService,
}

impl SpecialOperationService {
    pub fn new(db: Arc<PgPool>, notifier: Notifier, organizations: OrganizationService) -> Self {
        Self {
            db,
            notifier,
            organizations,
        }
    }

    /// The organization whose official address has the greatest id.
    pub async fn max_official_address(&self) -> RegistryResult<Organization> {
        let sql = format!("{ORG_SELECT} ORDER BY o.official_address_id DESC LIMIT 1");
        let row = sqlx::query_as::<_, OrganizationRow>(&sql)
            .fetch_optional(&*self.db)
            .await?
            .ok_or_else(|| {
                RegistryError::NoMatch("no organizations with an official address found".into())
            })?;
        row.into_record()
    }

    /// Count organizations grouped by full name.
    pub async fn count_by_full_name(&self) -> RegistryResult<Vec<FullNameCount>> {
        let rows = sqlx::query_as::<_, FullNameCount>(
            "SELECT full_name, COUNT(*) AS count FROM organizations \
             GROUP BY full_name ORDER BY full_name",
        )
        .fetch_all(&*self.db)
        .await?;

        if rows.is_empty() {
            return Err(RegistryError::NoMatch(
                "no organizations with an official address found".into(),
            ));
        }
        Ok(rows)
    }

    /// Organizations whose full name contains the given substring,
    /// case-insensitive.
    pub async fn search_by_full_name(&self, needle: &str) -> RegistryResult<Vec<Organization>> {
        if needle.trim().is_empty() {
            return Err(RegistryError::Invalid(
                "search substring cannot be empty".into(),
            ));
        }

        let sql = format!("{ORG_SELECT} WHERE o.full_name ILIKE $1 ORDER BY o.id");
        let rows = sqlx::query_as::<_, OrganizationRow>(&sql)
            .bind(contains_pattern(needle))
            .fetch_all(&*self.db)
            .await?;
        rows_to_records(rows)
    }

    /// Bump the head count by one; an organization without one starts at 0.
    pub async fn increment_employees(&self, id: i64) -> RegistryResult<Organization> {
        let record = fetch_organization(&*self.db, id).await?;
        let next = record.employees_count.map_or(0, |count| count + 1);

        sqlx::query("UPDATE organizations SET employees_count = $1 WHERE id = $2")
            .bind(next)
            .bind(id)
            .execute(&*self.db)
            .await?;

        self.notifier.table_changed("organizations");
        fetch_organization(&*self.db, id).await
    }

    /// Merge two organizations into a newly created one. The sources are
    /// left in place; the merged record goes through the full creation
    /// pipeline including its business rules.
    pub async fn merge(&self, input: MergeOrganizationsInput) -> RegistryResult<Organization> {
        let (first_id, second_id, mut organization) = validate_merge_request(input)?;

        let first = fetch_organization(&*self.db, first_id).await?;
        let second = fetch_organization(&*self.db, second_id).await?;
        apply_merge_defaults(&mut organization, &first, &second);

        self.organizations.create(organization).await
    }
}

fn validate_merge_request(
    input: MergeOrganizationsInput,
) -> RegistryResult<(i64, i64, OrganizationInput)> {
    let (Some(first), Some(second)) = (input.first_organization_id, input.second_organization_id)
    else {
        return Err(RegistryError::Invalid(
            "both organization ids must be provided".into(),
        ));
    };
    if first == second {
        return Err(RegistryError::Invalid(
            "cannot join an organization with itself".into(),
        ));
    }
    let Some(organization) = input.organization else {
        return Err(RegistryError::Invalid(
            "merged organization payload must be provided".into(),
        ));
    };
    Ok((first, second, organization))
}

/// Fill merged-organization fields the request left unset. Turnover
/// defaults to the sum of the sources, rating to the average over sources
/// that have one; the head count is always the combined total.
fn apply_merge_defaults(
    organization: &mut OrganizationInput,
    first: &Organization,
    second: &Organization,
) {
    if organization.annual_turnover.is_none() {
        organization.annual_turnover = Some(first.annual_turnover + second.annual_turnover);
    }
    if organization.rating.is_none() {
        let ratings: Vec<f32> = [first.rating, second.rating].into_iter().flatten().collect();
        if !ratings.is_empty() {
            organization.rating = Some(ratings.iter().sum::<f32>() / ratings.len() as f32);
        }
    }
    organization.employees_count = Some(
        first.employees_count.unwrap_or(0) + second.employees_count.unwrap_or(0),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        address::Address,
        coordinates::Coordinates,
        organization::OrganizationType,
    };
    use axum::http::StatusCode;
    use chrono::Utc;

    fn stored(turnover: f64, employees: Option<i32>, rating: Option<f32>) -> Organization {
        Organization {
            id: 1,
            name: "Atom".into(),
            coordinates: Coordinates { id: 1, x: 0, y: 0.0 },
            creation_date: Utc::now(),
            official_address: Address {
                id: 1,
                zip_code: None,
                town: None,
            },
            annual_turnover: turnover,
            employees_count: employees,
            rating,
            full_name: "Atom Corporation".into(),
            org_type: OrganizationType::Commercial,
            postal_address: Address {
                id: 2,
                zip_code: None,
                town: None,
            },
        }
    }

    fn empty_input() -> OrganizationInput {
        serde_json::from_str("{}").unwrap()
    }

    #[test]
    fn merge_requires_two_distinct_ids_and_a_payload() {
        let err = validate_merge_request(MergeOrganizationsInput {
            first_organization_id: Some(1),
            second_organization_id: None,
            organization: Some(empty_input()),
        })
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = validate_merge_request(MergeOrganizationsInput {
            first_organization_id: Some(3),
            second_organization_id: Some(3),
            organization: Some(empty_input()),
        })
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = validate_merge_request(MergeOrganizationsInput {
            first_organization_id: Some(1),
            second_organization_id: Some(2),
            organization: None,
        })
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn merge_sums_turnover_unless_overridden() {
        let mut input = empty_input();
        apply_merge_defaults(&mut input, &stored(100.0, None, None), &stored(50.0, None, None));
        assert_eq!(input.annual_turnover, Some(150.0));

        let mut input = empty_input();
        input.annual_turnover = Some(999.0);
        apply_merge_defaults(&mut input, &stored(100.0, None, None), &stored(50.0, None, None));
        assert_eq!(input.annual_turnover, Some(999.0));
    }

    #[test]
    fn merge_averages_present_ratings() {
        let mut input = empty_input();
        apply_merge_defaults(
            &mut input,
            &stored(1.0, None, Some(4.0)),
            &stored(1.0, None, Some(2.0)),
        );
        assert_eq!(input.rating, Some(3.0));

        let mut input = empty_input();
        apply_merge_defaults(
            &mut input,
            &stored(1.0, None, Some(4.0)),
            &stored(1.0, None, None),
        );
        assert_eq!(input.rating, Some(4.0));

        let mut input = empty_input();
        apply_merge_defaults(&mut input, &stored(1.0, None, None), &stored(1.0, None, None));
        assert_eq!(input.rating, None);
    }

    #[test]
    fn merge_always_combines_head_counts() {
        let mut input = empty_input();
        input.employees_count = Some(1);
        apply_merge_defaults(
            &mut input,
            &stored(1.0, Some(10), None),
            &stored(1.0, None, None),
        );
        assert_eq!(input.employees_count, Some(10));
    }
}
