use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::models::{SessionRecord, SessionStatus, SessionSummary};

use super::{
    parse_datetime, parse_optional_datetime, parse_status, to_i64, to_u64, Database,
};

pub const SESSIONS_PER_PAGE: u64 = 10;

fn row_to_session(row: &Row) -> Result<SessionRecord> {
    let started_at: String = row.get("started_at")?;
    let stopped_at: Option<String> = row.get("stopped_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let status: String = row.get("status")?;
    let duration_secs: i64 = row.get("duration_secs")?;
    let bad_posture_count: i64 = row.get("bad_posture_count")?;

    Ok(SessionRecord {
        id: row.get("id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        stopped_at: parse_optional_datetime(stopped_at, "stopped_at")?,
        status: parse_status(&status)?,
        duration_secs: to_u64(duration_secs, "duration_secs")?,
        bad_posture_count: to_u64(bad_posture_count, "bad_posture_count")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    pub async fn insert_session(&self, session: &SessionRecord) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, started_at, stopped_at, status, duration_secs, bad_posture_count, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.started_at.to_rfc3339(),
                    record
                        .stopped_at
                        .as_ref()
                        .map(|dt| dt.to_rfc3339()),
                    record.status.as_str(),
                    to_i64(record.duration_secs)?,
                    to_i64(record.bad_posture_count)?,
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn update_session_progress(
        &self,
        session_id: &str,
        duration_secs: u64,
        bad_posture_count: u64,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE sessions
                 SET duration_secs = ?1,
                     bad_posture_count = ?2,
                     updated_at = ?3
                 WHERE id = ?4",
                params![
                    to_i64(duration_secs)?,
                    to_i64(bad_posture_count)?,
                    updated_at.to_rfc3339(),
                    session_id,
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn mark_session_status(
        &self,
        session_id: &str,
        status: SessionStatus,
        duration_secs: u64,
        bad_posture_count: u64,
        stopped_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE sessions
                 SET status = ?1,
                     duration_secs = ?2,
                     bad_posture_count = ?3,
                     stopped_at = ?4,
                     updated_at = ?5
                 WHERE id = ?6",
                params![
                    status.as_str(),
                    to_i64(duration_secs)?,
                    to_i64(bad_posture_count)?,
                    stopped_at.map(|dt| dt.to_rfc3339()),
                    updated_at.to_rfc3339(),
                    session_id,
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, stopped_at, status, duration_secs, bad_posture_count, created_at, updated_at
                 FROM sessions
                 WHERE id = ?1",
            )?;

            stmt.query_row(params![session_id], |row| {
                Ok(row_to_session(row))
            })
            .optional()?
            .transpose()
        })
        .await
    }

    /// Newest-first page of finished sessions. Pages are 1-based.
    pub async fn list_sessions_paginated(&self, page: u64) -> Result<Vec<SessionSummary>> {
        let page = page.max(1);
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, stopped_at, status, duration_secs, bad_posture_count, created_at, updated_at
                 FROM sessions
                 WHERE status != 'Running'
                 ORDER BY started_at DESC
                 LIMIT ?1 OFFSET ?2",
            )?;

            let offset = to_i64((page - 1) * SESSIONS_PER_PAGE)?;
            let mut rows = stmt.query(params![to_i64(SESSIONS_PER_PAGE)?, offset])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(SessionSummary::from(row_to_session(row)?));
            }
            Ok(sessions)
        })
        .await
    }

    pub async fn get_incomplete_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, stopped_at, status, duration_secs, bad_posture_count, created_at, updated_at
                 FROM sessions
                 WHERE status = 'Running'
                 ORDER BY started_at DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    pub async fn mark_session_interrupted(
        &self,
        session_id: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE sessions
                 SET status = 'Interrupted',
                     stopped_at = COALESCE(stopped_at, ?1),
                     updated_at = ?1
                 WHERE id = ?2",
                params![updated_at.to_rfc3339(), session_id],
            )?;
            Ok(())
        })
        .await
    }
}
