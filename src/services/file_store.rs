//! Trait and types for interacting with a cloud file store.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

/// Metadata for a single file in the store. Content is fetched separately
/// via [`FileStore::download`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub id: String,
    pub name: String,
    pub modified_time: DateTime<Utc>,
}

/// A catalog listing request: which folder, which content type, and
/// optionally which calendar day (matched against file modification time,
/// `[start_of_day_UTC, start_of_day_UTC + 24h)`).
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub folder_id: String,
    pub mime_type: String,
    pub day: Option<NaiveDate>,
}

impl ListQuery {
    pub fn new(folder_id: &str, mime_type: &str, day: Option<NaiveDate>) -> Self {
        Self {
            folder_id: folder_id.to_string(),
            mime_type: mime_type.to_string(),
            day,
        }
    }
}

/// Abstraction over a file store provider (e.g., Google Drive).
#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    /// Returns metadata for every non-deleted file matching the query,
    /// following pagination until the listing is complete.
    async fn list_files(&self, query: &ListQuery) -> Result<Vec<FileMeta>>;

    /// Downloads a file's full binary content.
    async fn download(&self, file_id: &str) -> Result<Vec<u8>>;
}
