//! File selection policy.
//!
//! The catalog listing only says which files exist; the policy decides which
//! of them are authoritative for the requested period. All variants are pure
//! functions over the listing so they can be tested without network access.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::services::file_store::FileMeta;

/// Which files from a catalog listing feed the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// The single newest file by modification time, across the whole folder.
    LatestOverall,
    /// The file with the highest integer suffix in its name (the text after
    /// the last `_`, before the extension). A name without a parseable
    /// suffix ranks below every numbered one; if even the winner has no
    /// suffix, the period has no eligible file.
    LatestByDayNumeric,
    /// Every matching file; rows are concatenated and exact duplicates
    /// removed downstream.
    AllForDayDedup,
}

impl FromStr for SelectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest-overall" => Ok(Self::LatestOverall),
            "latest-by-day-numeric" => Ok(Self::LatestByDayNumeric),
            "all-for-day-dedup" => Ok(Self::AllForDayDedup),
            other => Err(format!("unknown selection strategy '{other}'")),
        }
    }
}

/// Outcome of applying a [`SelectionStrategy`] to a listing.
///
/// `None` means no eligible file existed for the period, which is distinct
/// from files existing but failing to download (the report layer detects
/// that after the download loop).
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    None,
    Files {
        files: Vec<FileMeta>,
        /// Data-freshness marker surfaced to the user.
        last_updated: DateTime<Utc>,
    },
}

/// Applies the strategy to a catalog listing.
pub fn select(strategy: SelectionStrategy, mut files: Vec<FileMeta>) -> Selection {
    files.sort_by_key(|f| f.modified_time);

    let Some(newest) = files.last().cloned() else {
        return Selection::None;
    };

    match strategy {
        SelectionStrategy::LatestOverall => Selection::Files {
            last_updated: newest.modified_time,
            files: vec![newest],
        },
        SelectionStrategy::LatestByDayNumeric => {
            let best = files
                .iter()
                .max_by_key(|f| numeric_suffix(&f.name).unwrap_or(i64::MIN))
                .cloned()
                .expect("listing is non-empty");
            if numeric_suffix(&best.name).is_none() {
                return Selection::None;
            }
            Selection::Files {
                last_updated: best.modified_time,
                files: vec![best],
            }
        }
        SelectionStrategy::AllForDayDedup => Selection::Files {
            last_updated: newest.modified_time,
            files,
        },
    }
}

/// Parses the trailing integer out of a filename: the text after the last
/// `_`, before the extension. `anpr_data_10.xlsx` → `Some(10)`.
pub fn numeric_suffix(name: &str) -> Option<i64> {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let (_, tail) = stem.rsplit_once('_')?;
    tail.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn file(name: &str, minute: u32) -> FileMeta {
        FileMeta {
            id: format!("id-{name}"),
            name: name.to_string(),
            modified_time: Utc.with_ymd_and_hms(2026, 8, 1, 6, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_numeric_suffix_parses_trailing_integer() {
        assert_eq!(numeric_suffix("anpr_data_10.xlsx"), Some(10));
        assert_eq!(numeric_suffix("anpr_data_3.xlsx"), Some(3));
        assert_eq!(numeric_suffix("export_2.csv"), Some(2));
    }

    #[test]
    fn test_numeric_suffix_rejects_non_numbers() {
        assert_eq!(numeric_suffix("anpr_data_final.xlsx"), None);
        assert_eq!(numeric_suffix("readme.xlsx"), None);
        assert_eq!(numeric_suffix("no-underscore.xlsx"), None);
    }

    #[test]
    fn test_latest_by_day_numeric_compares_numerically() {
        // Lexicographic ordering would pick _3 over _10.
        let listing = vec![
            file("anpr_data_3.xlsx", 10),
            file("anpr_data_10.xlsx", 5),
            file("anpr_data_2.xlsx", 20),
        ];
        let Selection::Files { files, .. } =
            select(SelectionStrategy::LatestByDayNumeric, listing)
        else {
            panic!("expected a selection");
        };
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "anpr_data_10.xlsx");
    }

    #[test]
    fn test_latest_by_day_numeric_without_suffix_is_ineligible() {
        let listing = vec![file("anpr_data_final.xlsx", 10)];
        assert_eq!(
            select(SelectionStrategy::LatestByDayNumeric, listing),
            Selection::None
        );
    }

    #[test]
    fn test_latest_overall_picks_newest_and_marks_freshness() {
        let listing = vec![
            file("a.xlsx", 30),
            file("b.xlsx", 45),
            file("c.xlsx", 15),
        ];
        let Selection::Files {
            files,
            last_updated,
        } = select(SelectionStrategy::LatestOverall, listing)
        else {
            panic!("expected a selection");
        };
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "b.xlsx");
        assert_eq!(last_updated, files[0].modified_time);
    }

    #[test]
    fn test_all_for_day_keeps_every_file_in_time_order() {
        let listing = vec![file("b.xlsx", 45), file("a.xlsx", 30)];
        let Selection::Files {
            files,
            last_updated,
        } = select(SelectionStrategy::AllForDayDedup, listing)
        else {
            panic!("expected a selection");
        };
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "a.xlsx");
        assert_eq!(files[1].name, "b.xlsx");
        assert_eq!(last_updated, files[1].modified_time);
    }

    #[test]
    fn test_empty_listing_selects_nothing() {
        for strategy in [
            SelectionStrategy::LatestOverall,
            SelectionStrategy::LatestByDayNumeric,
            SelectionStrategy::AllForDayDedup,
        ] {
            assert_eq!(select(strategy, Vec::new()), Selection::None);
        }
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "latest-overall".parse::<SelectionStrategy>().unwrap(),
            SelectionStrategy::LatestOverall
        );
        assert!("newest".parse::<SelectionStrategy>().is_err());
    }
}
