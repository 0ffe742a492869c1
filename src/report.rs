//! Report orchestration: one request-scoped fetch-and-render cycle.
//!
//! Catalog lookup, file selection, sequential downloads, normalization,
//! journey reconciliation, and aggregation run in order with no shared
//! state and no retries. Failures follow a strict taxonomy: configuration
//! and schema problems abort the report with a message, storage problems
//! degrade to an empty listing, row-level gaps are filtered silently, and
//! empty results are ordinary informational outcomes.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::{AppConfig, Route};
use crate::parser::parse_table;
use crate::pipeline::selection::{Selection, select};
use crate::pipeline::types::{Thresholds, TravelBucket, VolumeBucket};
use crate::pipeline::{aggregate, journeys};
use crate::records::{DetectionRecord, dedup_records, normalize_table};
use crate::services::file_store::{FileMeta, FileStore, ListQuery};

/// Travel-time chart model for one route.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelReport {
    pub series: Vec<TravelBucket>,
    pub thresholds: Thresholds,
}

/// Everything the page shows for one configured route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSection {
    pub route: Route,
    /// `None` means no completed journeys: a normal outcome, not an error.
    pub travel: Option<TravelReport>,
    /// Empty means no vehicles were detected at the start checkpoint.
    pub volume: Vec<VolumeBucket>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Something prevented the report from being produced at all.
    Error(String),
    /// The pipeline ran but there is nothing to chart.
    Notice(String),
    Routes(Vec<RouteSection>),
}

/// The complete page model handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub last_updated: Option<DateTime<Utc>>,
    pub body: Body,
}

impl Dashboard {
    pub fn error(message: String) -> Self {
        Self {
            last_updated: None,
            body: Body::Error(message),
        }
    }

    pub fn notice(message: String) -> Self {
        Self {
            last_updated: None,
            body: Body::Notice(message),
        }
    }
}

/// Runs the full pipeline for one dashboard request.
#[tracing::instrument(skip(store, config), fields(date = ?date_param))]
pub async fn build_dashboard(
    store: &dyn FileStore,
    config: &AppConfig,
    date_param: Option<&str>,
) -> Dashboard {
    let target_date = match date_param.filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                return Dashboard::error(format!(
                    "Invalid date format: '{raw}'. Please use YYYY-MM-DD."
                ));
            }
        },
    };

    let Some(folder_id) = config.folder_id.as_deref() else {
        return Dashboard::error(
            "The GDRIVE_FOLDER_ID environment variable is not set.".to_string(),
        );
    };

    let query = ListQuery::new(folder_id, &config.spreadsheet_mime, target_date);
    let listing = catalog_or_empty(store, &query).await;

    let selection = select(config.strategy, listing);
    let Selection::Files {
        files,
        last_updated,
    } = selection
    else {
        let message = match target_date {
            Some(date) => format!("No data files found for {date}."),
            None => "No data files found in the storage folder.".to_string(),
        };
        return Dashboard::notice(message);
    };

    info!(file_count = files.len(), "Files selected for report");

    // Downloads are strictly sequential; one request, one pass.
    let mut records: Vec<DetectionRecord> = Vec::new();
    let mut readable_files = 0usize;
    for file in &files {
        let bytes = match store.download(&file.id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %file.name, error = %e, "Download failed, skipping file");
                continue;
            }
        };

        let table = match parse_table(&file.name, &bytes) {
            Ok(table) => table,
            Err(e) => {
                warn!(file = %file.name, error = %e, "File is unreadable, skipping");
                continue;
            }
        };

        // A schema mismatch invalidates the whole report, not just the file.
        match normalize_table(&file.name, &table, &config.columns, &config.survey_suffix) {
            Ok(mut file_records) => {
                readable_files += 1;
                records.append(&mut file_records);
            }
            Err(schema) => {
                warn!(file = %file.name, error = %schema, "Schema mismatch");
                return Dashboard::error(schema.to_string());
            }
        }
    }

    if readable_files == 0 {
        return Dashboard::notice("Files were found, but none could be read.".to_string());
    }

    let mut records = dedup_records(records);

    // Day-scoped selection keys on file modification time; the files may
    // still carry spillover rows from adjacent days.
    if let Some(date) = target_date {
        records.retain(|r| r.passing_time.date_naive() == date);
    }

    if records.is_empty() {
        let message = match target_date {
            Some(date) => format!("No valid data found on {date}."),
            None => "No valid data found for the selected period.".to_string(),
        };
        return Dashboard {
            last_updated: Some(last_updated),
            body: Body::Notice(message),
        };
    }

    if config.routes.is_empty() {
        let mut checkpoints: Vec<&str> =
            records.iter().map(|r| r.checkpoint.as_str()).collect();
        checkpoints.sort_unstable();
        checkpoints.dedup();
        return Dashboard {
            last_updated: Some(last_updated),
            body: Body::Notice(format!(
                "No routes are configured. Available checkpoints in data: {}",
                checkpoints.join(", ")
            )),
        };
    }

    let sections = config
        .routes
        .iter()
        .map(|route| route_section(&records, route, config))
        .collect();

    Dashboard {
        last_updated: Some(last_updated),
        body: Body::Routes(sections),
    }
}

/// Catalog lookup boundary. Transport and API failures degrade to an empty
/// listing so the page still renders; the log line is the only place where
/// "lookup failed" and "no files exist" differ.
async fn catalog_or_empty(store: &dyn FileStore, query: &ListQuery) -> Vec<FileMeta> {
    match store.list_files(query).await {
        Ok(files) => files,
        Err(e) => {
            warn!(error = %e, "File listing failed, treating as empty");
            Vec::new()
        }
    }
}

fn route_section(records: &[DetectionRecord], route: &Route, config: &AppConfig) -> RouteSection {
    let starts = journeys::checkpoint_detections(records, &route.start_checkpoint);
    let ends = journeys::checkpoint_detections(records, &route.end_checkpoint);

    let reconciled = journeys::reconcile(&starts, &ends, config.max_travel_mins);
    info!(
        route = %route.start_checkpoint,
        departures = starts.len(),
        arrivals = ends.len(),
        journeys = reconciled.len(),
        "Route reconciled"
    );

    let travel = if reconciled.is_empty() {
        None
    } else {
        let series = aggregate::travel_time_series(&reconciled);
        let thresholds = aggregate::thresholds(
            route.reference_minutes,
            config.moderate_offset_mins,
            config.heavy_offset_mins,
            &series,
        );
        Some(TravelReport { series, thresholds })
    };

    RouteSection {
        route: route.clone(),
        travel,
        volume: aggregate::volume_series(&starts),
    }
}
