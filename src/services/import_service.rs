//! Bulk import of organizations from uploaded JSON files.
//!
//! Every attempt leaves a row in `import_history`, including failed ones;
//! the organizations themselves are created inside a single transaction so
//! a bad entry rolls back the whole file.

use crate::{
    models::{
        import_history::{ImportHistory, IMPORT_STATUS_ERROR, IMPORT_STATUS_SUCCESS},
        page::Page,
    },
    services::{
        notifier::Notifier,
        organization_service::{create_in_conn, OrganizationInput},
        page_bounds, RegistryError, RegistryResult,
    },
};
use bytes::Bytes;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;

/// Imports of this many entries or more are refused outright.
const MAX_IMPORT_SIZE: usize = 100;

#[derive(Clone)]
pub struct ImportService {
    db: Arc<PgPool>,
    notifier: Notifier,
}

impl ImportService {
    pub fn new(db: Arc<PgPool>, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    /// Import a JSON array of organization payloads.
    ///
    /// The upload must be non-empty and JSON (by filename suffix or content
    /// type). Entries run through the full organization-creation pipeline;
    /// the first failure rolls back everything created so far and records a
    /// failed history row whose counter points at the offending entry.
    pub async fn process_import(
        &self,
        filename: Option<&str>,
        content_type: Option<&str>,
        data: Bytes,
    ) -> RegistryResult<ImportHistory> {
        if data.is_empty() {
            return Err(RegistryError::Invalid("import file must not be empty".into()));
        }
        if !is_json_upload(filename, content_type) {
            return Err(RegistryError::UnsupportedMedia(
                "import file must be JSON".into(),
            ));
        }

        let entries: Vec<OrganizationInput> = match serde_json::from_slice(&data) {
            Ok(entries) => entries,
            Err(err) => {
                self.record(IMPORT_STATUS_ERROR, 0).await?;
                return Err(RegistryError::Invalid(format!(
                    "failed to parse JSON import file: {err}"
                )));
            }
        };

        if let Err(err) = ensure_import_size(entries.len()) {
            self.record(IMPORT_STATUS_ERROR, 0).await?;
            return Err(err);
        }

        let mut tx = self.db.begin().await?;
        let mut counter: i32 = 0;
        for entry in &entries {
            match create_in_conn(&mut tx, entry).await {
                Ok(_) => counter += 1,
                Err(err) => {
                    tx.rollback().await?;
                    self.record(IMPORT_STATUS_ERROR, counter).await?;
                    return Err(RegistryError::Invalid(format!(
                        "import failed (error in entry {}): {err}",
                        counter + 1
                    )));
                }
            }
        }
        tx.commit().await?;

        let history = self.record(IMPORT_STATUS_SUCCESS, counter).await?;
        self.notifier.table_changed("organizations");
        Ok(history)
    }

    /// Import attempts, newest first.
    pub async fn history(
        &self,
        page: Option<i64>,
        size: Option<i64>,
    ) -> RegistryResult<Page<ImportHistory>> {
        let (page, size) = page_bounds(page, size);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM import_history")
            .fetch_one(&*self.db)
            .await?;

        let rows = sqlx::query_as::<_, ImportHistory>(
            "SELECT id, creation_date, status, counter FROM import_history \
             ORDER BY id DESC LIMIT $1 OFFSET $2",
        )
        .bind(size)
        .bind(page * size)
        .fetch_all(&*self.db)
        .await?;

        Ok(Page::new(rows, page, size, total))
    }

    async fn record(&self, status: i32, counter: i32) -> RegistryResult<ImportHistory> {
        let history = sqlx::query_as::<_, ImportHistory>(
            "INSERT INTO import_history (creation_date, status, counter) VALUES ($1, $2, $3) \
             RETURNING id, creation_date, status, counter",
        )
        .bind(Utc::now())
        .bind(status)
        .bind(counter)
        .fetch_one(&*self.db)
        .await?;
        Ok(history)
    }
}

fn is_json_upload(filename: Option<&str>, content_type: Option<&str>) -> bool {
    content_type == Some("application/json")
        || filename.is_some_and(|name| name.to_lowercase().ends_with(".json"))
}

fn ensure_import_size(entries: usize) -> RegistryResult<()> {
    if entries >= MAX_IMPORT_SIZE {
        return Err(RegistryError::Invalid(format!(
            "maximum import limit reached, make it smaller than {MAX_IMPORT_SIZE}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_detection_uses_suffix_or_content_type() {
        assert!(is_json_upload(Some("orgs.json"), None));
        assert!(is_json_upload(Some("ORGS.JSON"), Some("text/plain")));
        assert!(is_json_upload(None, Some("application/json")));
        assert!(!is_json_upload(Some("orgs.csv"), Some("text/csv")));
        assert!(!is_json_upload(None, None));
    }

    #[test]
    fn size_limit_is_exclusive() {
        assert!(ensure_import_size(0).is_ok());
        assert!(ensure_import_size(99).is_ok());
        assert!(ensure_import_size(100).is_err());
        assert!(ensure_import_size(250).is_err());
    }

    #[test]
    fn import_file_parses_as_input_array() {
        let payload = br#"[
            {"name": "Atom", "fullName": "Atom Corporation", "type": "TRUST",
             "annualTurnover": 100.0, "coordinatesId": 1,
             "officialAddressId": 2, "postalAddressId": 3}
        ]"#;
        let entries: Vec<OrganizationInput> = serde_json::from_slice(payload).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].coordinates_id, Some(1));
        assert_eq!(entries[0].name.as_deref(), Some("Atom"));
    }
}
