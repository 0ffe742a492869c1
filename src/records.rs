//! Detection records: column validation and row normalization.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

use crate::config::ColumnNames;
use crate::parser::RawTable;

/// One vehicle detection after normalization. All three fields are
/// guaranteed non-empty; rows that cannot satisfy that are dropped before
/// any downstream computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DetectionRecord {
    pub checkpoint: String,
    pub plate: String,
    pub passing_time: DateTime<Utc>,
}

/// A selected file does not carry the required columns. Aborts the whole
/// report rather than skipping the file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("File error in '{file}': missing columns: {}. Found: {}", join(.missing), found_or_none(.found))]
pub struct SchemaError {
    pub file: String,
    pub missing: Vec<String>,
    pub found: Vec<String>,
}

fn join(columns: &[String]) -> String {
    columns.join(", ")
}

fn found_or_none(columns: &[String]) -> String {
    if columns.is_empty() {
        "none".to_string()
    } else {
        columns.join(", ")
    }
}

struct ColumnIndices {
    checkpoint: usize,
    plate: usize,
    passing_time: usize,
}

fn validate_columns(
    file: &str,
    header: &[String],
    columns: &ColumnNames,
) -> Result<ColumnIndices, SchemaError> {
    let find = |name: &str| header.iter().position(|h| h.as_str() == name);

    let missing: Vec<String> = columns
        .as_list()
        .iter()
        .filter(|name| find(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(SchemaError {
            file: file.to_string(),
            missing,
            found: header.to_vec(),
        });
    }

    Ok(ColumnIndices {
        checkpoint: find(&columns.checkpoint).expect("validated above"),
        plate: find(&columns.plate).expect("validated above"),
        passing_time: find(&columns.passing_time).expect("validated above"),
    })
}

/// Validates a parsed file against the required columns and normalizes its
/// rows. Rows with an unparsable timestamp or an empty checkpoint or plate
/// are dropped, never surfaced as partial records.
pub fn normalize_table(
    file: &str,
    table: &RawTable,
    columns: &ColumnNames,
    survey_suffix: &str,
) -> Result<Vec<DetectionRecord>, SchemaError> {
    let idx = validate_columns(file, &table.header, columns)?;

    let mut records = Vec::new();
    for row in &table.rows {
        let (Some(checkpoint), Some(plate), Some(passing)) = (
            row.get(idx.checkpoint),
            row.get(idx.plate),
            row.get(idx.passing_time),
        ) else {
            continue;
        };

        let checkpoint = normalize_checkpoint(checkpoint, survey_suffix);
        let plate = normalize_plate(plate);
        let Some(passing_time) = parse_passing_time(passing) else {
            continue;
        };
        if checkpoint.is_empty() || plate.is_empty() {
            continue;
        }

        records.push(DetectionRecord {
            checkpoint,
            plate,
            passing_time,
        });
    }

    Ok(records)
}

/// Canonicalizes a checkpoint name: uppercase, site-survey suffix removed,
/// whitespace trimmed.
pub fn normalize_checkpoint(raw: &str, survey_suffix: &str) -> String {
    let upper = raw.to_uppercase();
    let stripped = if survey_suffix.is_empty() {
        upper
    } else {
        upper.replace(survey_suffix, "")
    };
    stripped.trim().to_string()
}

/// Canonicalizes a plate identifier: uppercase, whitespace trimmed.
pub fn normalize_plate(raw: &str) -> String {
    raw.to_uppercase().trim().to_string()
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Lenient timestamp parsing. Unparsable values yield `None` so the row is
/// dropped, matching how every other data-quality gap is handled.
pub fn parse_passing_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Removes exact-duplicate records, keeping first occurrences in order.
/// Defends against overlapping incremental snapshots of the same day.
pub fn dedup_records(records: Vec<DetectionRecord>) -> Vec<DetectionRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.clone()))
        .collect()
}
