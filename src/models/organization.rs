//! The central registry entity: an organization with its reference data.

use crate::models::{address::Address, coordinates::Coordinates};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Legal form of an organization.
///
/// Stored as TEXT; the geographic distance rules only apply to
/// `Government` and `Trust`.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationType {
    Commercial,
    Public,
    Government,
    Trust,
    PrivateLimitedCompany,
}

impl OrganizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationType::Commercial => "COMMERCIAL",
            OrganizationType::Public => "PUBLIC",
            OrganizationType::Government => "GOVERNMENT",
            OrganizationType::Trust => "TRUST",
            OrganizationType::PrivateLimitedCompany => "PRIVATE_LIMITED_COMPANY",
        }
    }

    /// Parse the TEXT column representation back into the enum.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "COMMERCIAL" => Some(OrganizationType::Commercial),
            "PUBLIC" => Some(OrganizationType::Public),
            "GOVERNMENT" => Some(OrganizationType::Government),
            "TRUST" => Some(OrganizationType::Trust),
            "PRIVATE_LIMITED_COMPANY" => Some(OrganizationType::PrivateLimitedCompany),
            _ => None,
        }
    }
}

impl fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered organization.
///
/// The nested `coordinates`, `official_address` and `postal_address` records
/// are materialized from joined rows; the foreign keys themselves are never
/// exposed over the wire.
#[derive(Serialize, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Database identifier.
    pub id: i64,

    /// Short name, never blank.
    pub name: String,

    pub coordinates: Coordinates,

    /// Set once at insert time.
    pub creation_date: DateTime<Utc>,

    pub official_address: Address,

    /// Annual turnover, strictly positive.
    pub annual_turnover: f64,

    /// Head count, strictly positive when present.
    pub employees_count: Option<i32>,

    /// Rating, strictly positive when present.
    pub rating: Option<f32>,

    /// Full legal name, unique across the registry.
    pub full_name: String,

    #[serde(rename = "type")]
    pub org_type: OrganizationType,

    pub postal_address: Address,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_column_round_trip() {
        for ty in [
            OrganizationType::Commercial,
            OrganizationType::Public,
            OrganizationType::Government,
            OrganizationType::Trust,
            OrganizationType::PrivateLimitedCompany,
        ] {
            assert_eq!(OrganizationType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(OrganizationType::parse("LLC"), None);
    }

    #[test]
    fn type_serializes_screaming_snake() {
        let json = serde_json::to_string(&OrganizationType::PrivateLimitedCompany).unwrap();
        assert_eq!(json, "\"PRIVATE_LIMITED_COMPANY\"");
    }
}

