use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DriveCredential;
use crate::fetch::{BasicClient, auth::Bearer, fetch_bytes};
use crate::services::file_store::{FileMeta, FileStore, ListQuery};

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct FileListPage {
    next_page_token: Option<String>,
    files: Vec<RawFile>,
}

#[derive(Deserialize)]
struct RawFile {
    id: String,
    name: String,
    #[serde(rename = "modifiedTime")]
    modified_time: String,
}

/// Google Drive v3 client. Constructed per request: the credential's refresh
/// token is exchanged for a short-lived access token at the OAuth endpoint,
/// and every subsequent call carries it as a bearer header.
pub struct DriveClient {
    base_url: String,
    http: Bearer<BasicClient>,
}

impl DriveClient {
    pub async fn new(credential: &DriveCredential) -> Result<Self> {
        let access_token = Self::exchange_token(credential).await?;

        Ok(Self {
            base_url: "https://www.googleapis.com/drive/v3".to_string(),
            http: Bearer::new(BasicClient::new(), &access_token),
        })
    }

    async fn exchange_token(credential: &DriveCredential) -> Result<String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let token_request = TokenRequest {
            client_id: &credential.client_id,
            client_secret: &credential.client_secret,
            refresh_token: &credential.refresh_token,
            grant_type: "refresh_token",
        };

        let response = client
            .post(&credential.token_uri)
            .form(&token_request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send token request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Token exchange failed with status {}: {}",
                status,
                body
            ));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse token response: {}", e))?;

        Ok(token_response.access_token)
    }

    /// Builds the Drive `q=` search expression: folder, content type, not
    /// trashed, and (if a day is given) a `[start_of_day_UTC, +24h)`
    /// modification-time window.
    fn build_query(query: &ListQuery) -> String {
        let mut terms = vec![
            format!("'{}' in parents", query.folder_id),
            format!("mimeType='{}'", query.mime_type),
            "trashed=false".to_string(),
        ];

        if let Some(day) = query.day {
            let start = day
                .and_hms_opt(0, 0, 0)
                .expect("midnight is a valid time")
                .and_utc();
            let end = start + chrono::Duration::days(1);
            terms.push(format!("modifiedTime >= '{}'", start.to_rfc3339()));
            terms.push(format!("modifiedTime < '{}'", end.to_rfc3339()));
        }

        terms.join(" and ")
    }
}

#[async_trait]
impl FileStore for DriveClient {
    async fn list_files(&self, query: &ListQuery) -> Result<Vec<FileMeta>> {
        let q = Self::build_query(query);

        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        // A single page is not sufficient: stopping early would silently
        // drop the most recently modified files.
        loop {
            let mut params = vec![
                ("q", q.clone()),
                ("pageSize", "1000".to_string()),
                ("fields", "nextPageToken, files(id, name, modifiedTime)".to_string()),
                ("orderBy", "modifiedTime".to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let url = reqwest::Url::parse_with_params(&format!("{}/files", self.base_url), &params)?;
            let bytes = fetch_bytes(&self.http, url.as_str()).await?;
            let page: FileListPage = serde_json::from_slice(&bytes)
                .map_err(|e| anyhow::anyhow!("Failed to parse file listing: {}", e))?;

            files.extend(page.files.into_iter().filter_map(|f| {
                let modified_time = DateTime::parse_from_rfc3339(&f.modified_time)
                    .ok()?
                    .with_timezone(&Utc);
                Some(FileMeta {
                    id: f.id,
                    name: f.name,
                    modified_time,
                })
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(files)
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        let url = format!("{}/files/{}?alt=media", self.base_url, file_id);
        fetch_bytes(&self.http, &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_build_query_without_date() {
        let q = DriveClient::build_query(&ListQuery::new("folder123", "text/csv", None));
        assert_eq!(
            q,
            "'folder123' in parents and mimeType='text/csv' and trashed=false"
        );
    }

    #[test]
    fn test_build_query_with_date_window() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let q = DriveClient::build_query(&ListQuery::new("folder123", "text/csv", Some(day)));

        assert!(q.contains("modifiedTime >= '2026-08-01T00:00:00+00:00'"));
        assert!(q.contains("modifiedTime < '2026-08-02T00:00:00+00:00'"));
    }
}
