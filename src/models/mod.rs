//! Core data models for the organization registry.
//!
//! These entities represent organizations and the reference data they hang
//! off of (coordinates, addresses, town locations), plus the import audit
//! trail. Flat rows map via `sqlx::FromRow` where the table shape allows it;
//! the nested shapes are assembled from joined queries in the service layer.
//! Everything serializes as camelCase JSON via `serde`.

pub mod address;
pub mod coordinates;
pub mod import_history;
pub mod location;
pub mod organization;
pub mod page;
