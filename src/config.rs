//! Process configuration.
//!
//! Everything the pipeline needs is collected into one [`AppConfig`] built
//! from the environment at startup and passed by reference from there on.
//! Storage settings (folder id, credential) are optional at construction
//! time; their absence is reported per request so the dashboard still
//! renders a page explaining what is missing.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::pipeline::selection::SelectionStrategy;

/// MIME type the catalog query filters on: xlsx workbooks.
pub const SPREADSHEET_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// OAuth credential blob for the Drive service account, stored as a single
/// JSON document in the `GDRIVE_CREDENTIALS_JSON` environment variable.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveCredential {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// A monitored point-to-point route between two checkpoints.
///
/// `reference_minutes` is an external baseline travel time (map-service
/// estimate) used only to place the congestion threshold bands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Route {
    pub start_checkpoint: String,
    pub end_checkpoint: String,
    pub reference_minutes: i64,
}

impl Route {
    pub fn new(start: &str, end: &str, reference_minutes: i64) -> Self {
        Self {
            start_checkpoint: start.to_string(),
            end_checkpoint: end.to_string(),
            reference_minutes,
        }
    }
}

/// Names of the three required columns in the source spreadsheets.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnNames {
    pub checkpoint: String,
    pub plate: String,
    pub passing_time: String,
}

impl ColumnNames {
    /// Required columns in spreadsheet order, for validation messages.
    pub fn as_list(&self) -> [&str; 3] {
        [&self.checkpoint, &self.plate, &self.passing_time]
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            checkpoint: "Device Name".to_string(),
            plate: "License Plate".to_string(),
            passing_time: "Passing Time".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Drive folder to list spreadsheets from. `None` until configured.
    pub folder_id: Option<String>,
    /// OAuth credential. `None` until configured.
    pub credential: Option<DriveCredential>,
    pub routes: Vec<Route>,
    pub columns: ColumnNames,
    /// Token stripped out of checkpoint names (site-survey marker).
    pub survey_suffix: String,
    pub strategy: SelectionStrategy,
    pub moderate_offset_mins: i64,
    pub heavy_offset_mins: i64,
    pub max_travel_mins: i64,
    pub spreadsheet_mime: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            folder_id: None,
            credential: None,
            routes: vec![
                Route::new("SEITHUNGANALLUR", "ARUMUGANERI", 50),
                Route::new("KURUKKUSALAI", "ARUMUGANERI", 70),
            ],
            columns: ColumnNames::default(),
            survey_suffix: " C.POST".to_string(),
            strategy: SelectionStrategy::AllForDayDedup,
            moderate_offset_mins: 30,
            heavy_offset_mins: 60,
            max_travel_mins: 4 * 60,
            spreadsheet_mime: SPREADSHEET_MIME.to_string(),
        }
    }
}

impl AppConfig {
    /// Builds the configuration from environment variables, falling back to
    /// the deployment defaults for anything unset. Malformed values are a
    /// hard error; absent storage settings are not.
    pub fn from_env() -> Result<Self> {
        let mut config = AppConfig::default();

        config.folder_id = std::env::var("GDRIVE_FOLDER_ID").ok().filter(|v| !v.is_empty());

        if let Ok(blob) = std::env::var("GDRIVE_CREDENTIALS_JSON") {
            let credential: DriveCredential = serde_json::from_str(&blob)
                .context("GDRIVE_CREDENTIALS_JSON is not a valid credential document")?;
            config.credential = Some(credential);
        }

        if let Ok(routes) = std::env::var("ANPR_ROUTES") {
            config.routes = serde_json::from_str(&routes)
                .context("ANPR_ROUTES is not a valid route table")?;
        }

        if let Ok(strategy) = std::env::var("ANPR_SELECTION") {
            config.strategy = strategy
                .parse::<SelectionStrategy>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("ANPR_SELECTION is not a known selection strategy")?;
        }

        if let Ok(v) = std::env::var("ANPR_MODERATE_OFFSET_MINS") {
            config.moderate_offset_mins =
                v.parse().context("ANPR_MODERATE_OFFSET_MINS is not a number")?;
        }
        if let Ok(v) = std::env::var("ANPR_HEAVY_OFFSET_MINS") {
            config.heavy_offset_mins =
                v.parse().context("ANPR_HEAVY_OFFSET_MINS is not a number")?;
        }
        if let Ok(v) = std::env::var("ANPR_MAX_TRAVEL_MINS") {
            config.max_travel_mins = v.parse().context("ANPR_MAX_TRAVEL_MINS is not a number")?;
        }
        if let Ok(v) = std::env::var("ANPR_SURVEY_SUFFIX") {
            config.survey_suffix = v;
        }
        if let Ok(v) = std::env::var("ANPR_COLUMNS") {
            config.columns =
                serde_json::from_str(&v).context("ANPR_COLUMNS is not a valid column list")?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routes_and_thresholds() {
        let config = AppConfig::default();
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].start_checkpoint, "SEITHUNGANALLUR");
        assert_eq!(config.routes[0].reference_minutes, 50);
        assert_eq!(config.max_travel_mins, 240);
        assert!(config.folder_id.is_none());
    }

    #[test]
    fn test_credential_blob_defaults_token_uri() {
        let blob = r#"{
            "client_id": "abc",
            "client_secret": "def",
            "refresh_token": "ghi"
        }"#;
        let credential: DriveCredential = serde_json::from_str(blob).unwrap();
        assert_eq!(credential.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn test_route_table_json_shape() {
        let routes: Vec<Route> = serde_json::from_str(
            r#"[{"start_checkpoint": "A", "end_checkpoint": "B", "reference_minutes": 10}]"#,
        )
        .unwrap();
        assert_eq!(routes[0], Route::new("A", "B", 10));
    }
}
