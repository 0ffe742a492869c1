//! Time-bucketed statistics over reconciled journeys and raw detections.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, DurationRound, Utc};

use crate::pipeline::types::{Journey, Thresholds, TravelBucket, VolumeBucket};
use crate::pipeline::utility::mean;
use crate::records::DetectionRecord;

/// Floors a timestamp to the preceding 15-minute mark.
pub fn floor_to_quarter_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    t.duration_trunc(Duration::minutes(15))
        .expect("15 minutes is a valid truncation unit")
}

/// Groups journeys by the 15-minute interval of their departure time and
/// computes mean travel time and journey count per interval.
pub fn travel_time_series(journeys: &[Journey]) -> Vec<TravelBucket> {
    let mut by_interval: BTreeMap<DateTime<Utc>, Vec<f64>> = BTreeMap::new();
    for journey in journeys {
        by_interval
            .entry(floor_to_quarter_hour(journey.start_time))
            .or_default()
            .push(journey.travel_minutes);
    }

    by_interval
        .into_iter()
        .map(|(interval, times)| TravelBucket {
            interval,
            avg_travel_minutes: mean(&times),
            journey_count: times.len(),
        })
        .collect()
}

/// Counts distinct plates per 15-minute interval over the start-checkpoint
/// detections.
///
/// Volume measures departures, not completions: every detection at the
/// start checkpoint counts, whether or not the vehicle was ever seen at the
/// end of the route.
pub fn volume_series(starts: &[&DetectionRecord]) -> Vec<VolumeBucket> {
    let mut by_interval: BTreeMap<DateTime<Utc>, HashSet<&str>> = BTreeMap::new();
    for detection in starts {
        by_interval
            .entry(floor_to_quarter_hour(detection.passing_time))
            .or_default()
            .insert(detection.plate.as_str());
    }

    by_interval
        .into_iter()
        .map(|(interval, plates)| VolumeBucket {
            interval,
            vehicle_count: plates.len(),
        })
        .collect()
}

/// Derives the congestion bands for a route from its reference duration.
///
/// The chart top is at least `heavy + 20` and at least 1.1 times the highest
/// observed average, so the bands stay visible even with no data near them.
pub fn thresholds(
    reference_minutes: i64,
    moderate_offset: i64,
    heavy_offset: i64,
    travel: &[TravelBucket],
) -> Thresholds {
    let reference = reference_minutes as f64;
    let moderate = reference + moderate_offset as f64;
    let heavy = reference + heavy_offset as f64;

    let max_avg = travel
        .iter()
        .map(|b| b.avg_travel_minutes)
        .fold(0.0_f64, f64::max);
    let graph_top = (heavy + 20.0).max(max_avg * 1.1);

    Thresholds {
        reference,
        moderate,
        heavy,
        graph_top,
    }
}
