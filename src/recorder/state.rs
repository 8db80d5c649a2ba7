use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Observation, SessionPayload};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecorderStatus {
    Idle,
    Recording,
}

impl Default for RecorderStatus {
    fn default() -> Self {
        RecorderStatus::Idle
    }
}

/// In-memory buffer for one recording session.
///
/// Pure state machine: timestamps are passed in by the caller so the
/// buffering rules can be exercised without a running clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderState {
    pub status: RecorderStatus,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub records: Vec<Observation>,
    pub bad_posture_count: u64,
    pub duration_secs: u64,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self {
            status: RecorderStatus::Idle,
            session_id: None,
            started_at: None,
            records: Vec::new(),
            bad_posture_count: 0,
            duration_secs: 0,
        }
    }
}

impl RecorderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards any prior buffer (including one kept after a failed upload)
    /// and enters `Recording`.
    pub fn begin_session(&mut self, session_id: String, started_at: DateTime<Utc>) {
        *self = Self {
            status: RecorderStatus::Recording,
            session_id: Some(session_id),
            started_at: Some(started_at),
            records: Vec::new(),
            bad_posture_count: 0,
            duration_secs: 0,
        };
    }

    /// Appends an observation while recording. Returns `false` when idle; the
    /// sample is dropped without touching the buffer.
    pub fn record_observation(
        &mut self,
        now: DateTime<Utc>,
        neck_angle: f64,
        face_distance: f64,
        is_bad_posture: bool,
    ) -> bool {
        if self.status != RecorderStatus::Recording {
            return false;
        }

        self.records.push(Observation {
            timestamp: now,
            neck_angle,
            face_distance,
            is_bad_posture,
        });

        if is_bad_posture {
            self.bad_posture_count += 1;
        }

        self.sync_duration(now);
        true
    }

    /// Recomputes the derived duration as whole elapsed seconds since start.
    pub fn sync_duration(&mut self, now: DateTime<Utc>) {
        if let Some(started_at) = self.started_at {
            self.duration_secs = (now - started_at).num_seconds().max(0) as u64;
        }
    }

    /// Transitions back to `Idle` and assembles the upload payload. The
    /// buffer itself is kept until the caller clears it or the next
    /// `begin_session` discards it.
    pub fn finish(&mut self, end_time: DateTime<Utc>) -> Option<SessionPayload> {
        let started_at = self.started_at?;
        self.sync_duration(end_time);
        self.status = RecorderStatus::Idle;

        Some(SessionPayload {
            duration: self.duration_secs,
            records: self.records.clone(),
            bad_posture_count: self.bad_posture_count,
            start_time: started_at,
            end_time,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
