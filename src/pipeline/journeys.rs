//! Journey reconciliation: pairing departures with arrivals.

use std::collections::HashMap;

use crate::pipeline::types::Journey;
use crate::records::DetectionRecord;

/// Returns the detections made at one checkpoint, by exact canonical name.
pub fn checkpoint_detections<'a>(
    records: &'a [DetectionRecord],
    checkpoint: &str,
) -> Vec<&'a DetectionRecord> {
    records.iter().filter(|r| r.checkpoint == checkpoint).collect()
}

/// Pairs start-checkpoint detections with end-checkpoint detections sharing
/// the same plate and keeps the physically plausible ones.
///
/// The join is a full cross-product on plate: a plate seen twice at the
/// start and once at the end yields two journeys (repeat trips are real
/// traffic). Pairings with a non-positive elapsed time or one above
/// `max_travel_mins` are dropped silently.
pub fn reconcile(
    starts: &[&DetectionRecord],
    ends: &[&DetectionRecord],
    max_travel_mins: i64,
) -> Vec<Journey> {
    let mut ends_by_plate: HashMap<&str, Vec<&DetectionRecord>> = HashMap::new();
    for end in ends {
        ends_by_plate.entry(end.plate.as_str()).or_default().push(end);
    }

    let mut journeys = Vec::new();
    for start in starts {
        let Some(arrivals) = ends_by_plate.get(start.plate.as_str()) else {
            continue;
        };
        for end in arrivals {
            let travel_minutes =
                (end.passing_time - start.passing_time).num_seconds() as f64 / 60.0;
            if travel_minutes > 0.0 && travel_minutes <= max_travel_mins as f64 {
                journeys.push(Journey {
                    plate: start.plate.clone(),
                    start_time: start.passing_time,
                    travel_minutes,
                });
            }
        }
    }

    journeys
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(checkpoint: &str, plate: &str, hour: u32, minute: u32) -> DetectionRecord {
        DetectionRecord {
            checkpoint: checkpoint.to_string(),
            plate: plate.to_string(),
            passing_time: Utc.with_ymd_and_hms(2026, 8, 1, hour, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_single_completed_journey() {
        let records = vec![
            record("SEITHUNGANALLUR", "ABC123", 10, 0),
            record("ARUMUGANERI", "ABC123", 10, 40),
        ];
        let starts = checkpoint_detections(&records, "SEITHUNGANALLUR");
        let ends = checkpoint_detections(&records, "ARUMUGANERI");

        let journeys = reconcile(&starts, &ends, 240);
        assert_eq!(journeys.len(), 1);
        assert_eq!(journeys[0].travel_minutes, 40.0);
        assert_eq!(journeys[0].start_time, records[0].passing_time);
    }

    #[test]
    fn test_arrival_before_departure_never_pairs() {
        let records = vec![
            record("SEITHUNGANALLUR", "ABC123", 11, 0),
            record("ARUMUGANERI", "ABC123", 10, 0),
        ];
        let starts = checkpoint_detections(&records, "SEITHUNGANALLUR");
        let ends = checkpoint_detections(&records, "ARUMUGANERI");

        assert!(reconcile(&starts, &ends, 240).is_empty());
    }

    #[test]
    fn test_travel_time_above_bound_is_dropped() {
        // 250 minutes: likely a re-used plate on a different trip.
        let records = vec![
            record("SEITHUNGANALLUR", "ABC123", 6, 0),
            record("ARUMUGANERI", "ABC123", 10, 10),
        ];
        let starts = checkpoint_detections(&records, "SEITHUNGANALLUR");
        let ends = checkpoint_detections(&records, "ARUMUGANERI");

        assert!(reconcile(&starts, &ends, 240).is_empty());
    }

    #[test]
    fn test_repeat_trips_form_one_journey_per_pairing() {
        // Two departures and one arrival for the same plate: the join is a
        // cross-product, so the arrival pairs with the earlier departure
        // (the later one has negative elapsed time and is dropped).
        let records = vec![
            record("SEITHUNGANALLUR", "ABC123", 9, 0),
            record("SEITHUNGANALLUR", "ABC123", 11, 0),
            record("ARUMUGANERI", "ABC123", 9, 50),
            record("ARUMUGANERI", "ABC123", 11, 45),
        ];
        let starts = checkpoint_detections(&records, "SEITHUNGANALLUR");
        let ends = checkpoint_detections(&records, "ARUMUGANERI");

        let journeys = reconcile(&starts, &ends, 240);
        // 9:00→9:50, 9:00→11:45, 11:00→11:45 are positive; all within bound.
        assert_eq!(journeys.len(), 3);
    }

    #[test]
    fn test_plates_never_cross() {
        let records = vec![
            record("SEITHUNGANALLUR", "ABC123", 10, 0),
            record("ARUMUGANERI", "XYZ789", 10, 40),
        ];
        let starts = checkpoint_detections(&records, "SEITHUNGANALLUR");
        let ends = checkpoint_detections(&records, "ARUMUGANERI");

        assert!(reconcile(&starts, &ends, 240).is_empty());
    }
}
