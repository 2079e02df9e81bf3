//! Seed the catalog from a YAML file.
//!
//! The file is a list of entries:
//!
//! ```yaml
//! - title: Widget
//!   body: A widget
//!   price: "9.99"
//!   image: public://products/widget.png
//! - title: About us
//!   kind: page
//! ```
//!
//! Every field except `title` is optional and `kind` defaults to
//! `products`. Entries are stamped one second apart in file order, so the
//! last entry in the file is listed first.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use shopfront_core::ContentKind;

use super::{CommandError, database_url};

/// One catalog entry as written in a seed file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedEntry {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

impl SeedEntry {
    fn kind(&self) -> ContentKind {
        self.kind
            .as_deref()
            .map_or_else(ContentKind::default, ContentKind::new)
    }
}

/// Parse a seed file's contents.
///
/// # Errors
///
/// Returns `CommandError::Yaml` if the document is not a list of entries.
pub fn parse_entries(content: &str) -> Result<Vec<SeedEntry>, CommandError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Check entries before anything touches the database.
///
/// Returns one message per problem found.
#[must_use]
pub fn validate_entries(entries: &[SeedEntry]) -> Vec<String> {
    let mut errors = Vec::new();

    if entries.is_empty() {
        errors.push("file contains no entries".to_string());
    }

    for (index, entry) in entries.iter().enumerate() {
        if entry.title.trim().is_empty() {
            errors.push(format!("entry {index}: title is empty"));
        }
        if entry.kind.as_deref().is_some_and(|k| k.trim().is_empty()) {
            errors.push(format!("entry {index}: kind is empty"));
        }
    }

    errors
}

/// Seed catalog entries from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML file
/// * `clear_existing` - If true, delete existing entries of every kind the
///   file mentions first
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or fails validation, or database operations fail.
pub async fn catalog(file_path: &str, clear_existing: bool) -> Result<(), CommandError> {
    let database_url = database_url()?;

    let path = Path::new(file_path);
    info!(path = %file_path, "Loading catalog entries from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_string(),
            source,
        })?;
    let entries = parse_entries(&content)?;

    let errors = validate_entries(&entries);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::Invalid(format!(
            "{} validation errors found",
            errors.len()
        )));
    }

    info!(entries = entries.len(), "Seed file validated");

    let pool = PgPool::connect(database_url.expose_secret()).await?;
    info!("Connected to database");

    let mut tx = pool.begin().await?;

    if clear_existing {
        let kinds: BTreeSet<String> = entries.iter().map(|e| e.kind().to_string()).collect();
        for kind in &kinds {
            let deleted = sqlx::query("DELETE FROM catalog.entry WHERE kind = $1")
                .bind(kind)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            info!(kind = %kind, deleted, "Cleared existing entries");
        }
    }

    let base = Utc::now();
    for (offset, entry) in (0_i64..).zip(&entries) {
        sqlx::query(
            r"
            INSERT INTO catalog.entry (kind, title, body, price, image_ref, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(entry.kind().as_str())
        .bind(&entry.title)
        .bind(entry.body.as_deref())
        .bind(entry.price.as_deref())
        .bind(entry.image.as_deref())
        .bind(base + Duration::seconds(offset))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Entries inserted: {}", entries.len());

    Ok(())
}
