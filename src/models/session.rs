//! Session-related data models.
//!
//! `SessionRecord` is the persisted row, `SessionSummary` the listing view,
//! and `SessionPayload` the JSON half of the upload (field names are the wire
//! format expected by the server's `posture_data` form field).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Observation;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SessionStatus {
    Running,
    Completed,
    Uploaded,
    UploadFailed,
    Interrupted,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "Running",
            SessionStatus::Completed => "Completed",
            SessionStatus::Uploaded => "Uploaded",
            SessionStatus::UploadFailed => "UploadFailed",
            SessionStatus::Interrupted => "Interrupted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub duration_secs: u64,
    pub bad_posture_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the paginated session listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub duration_secs: u64,
    pub bad_posture_count: u64,
}

impl From<SessionRecord> for SessionSummary {
    fn from(record: SessionRecord) -> Self {
        Self {
            id: record.id,
            started_at: record.started_at,
            stopped_at: record.stopped_at,
            status: record.status,
            duration_secs: record.duration_secs,
            bad_posture_count: record.bad_posture_count,
        }
    }
}

/// JSON summary of one finished recording, sent alongside the media blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPayload {
    pub duration: u64,
    pub records: Vec<Observation>,
    pub bad_posture_count: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}
