//! Geotag classification
//!
//! [`partition`] is the only place that decides whether a reading counts as
//! tagged. The map and the triage list both consume its output.

use crate::reading::Reading;

/// Readings split by geotag completeness, each side in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub tagged: Vec<Reading>,
    pub untagged: Vec<Reading>,
}

/// Split a reading set into tagged and untagged readings
pub fn partition(readings: Vec<Reading>) -> Partition {
    let (tagged, untagged): (Vec<Reading>, Vec<Reading>) = readings.into_iter().partition(Reading::is_geotagged);
    Partition { tagged, untagged }
}
