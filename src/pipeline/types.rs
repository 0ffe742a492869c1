//! Data types produced by the reconciliation pipeline.

use chrono::{DateTime, Utc};

/// A completed start-to-end pairing of two detections of the same plate.
///
/// Derived per request, never stored. A plate that appears several times at
/// the start checkpoint forms one journey per start/end pairing; repeat
/// trips by the same vehicle are real traffic, not duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Journey {
    pub plate: String,
    pub start_time: DateTime<Utc>,
    pub travel_minutes: f64,
}

/// Mean travel time and journey count for one 15-minute interval.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelBucket {
    pub interval: DateTime<Utc>,
    pub avg_travel_minutes: f64,
    pub journey_count: usize,
}

/// Distinct plates observed departing in one 15-minute interval.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeBucket {
    pub interval: DateTime<Utc>,
    pub vehicle_count: usize,
}

/// Congestion band levels for a route, derived from its reference duration.
///
/// `graph_top` is the chart's vertical extent: high enough that both bands
/// stay visible even when no observed average reaches them.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    pub reference: f64,
    pub moderate: f64,
    pub heavy: f64,
    pub graph_top: f64,
}
