//! Posture observation data model.
//!
//! One timestamped posture measurement captured while a recording session is
//! active. Field names match the upload wire format, so this type serializes
//! directly into the `posture_data` form field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timestamped posture measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub neck_angle: f64,
    pub face_distance: f64,
    pub is_bad_posture: bool,
}
