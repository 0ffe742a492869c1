//! File selection and journey reconciliation.
//!
//! This module takes a catalog listing, decides which files are
//! authoritative for the requested period, pairs checkpoint detections into
//! journeys per configured route, and buckets the results into 15-minute
//! intervals for presentation.

pub mod aggregate;
pub mod journeys;
pub mod selection;
pub mod types;
pub mod utility;
