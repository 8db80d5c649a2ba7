//! Aggregate study statistics for the dashboard.
//!
//! Finished sessions (anything past `Running`) are rolled up per calendar
//! day; an optional inclusive `YYYY-MM-DD` range narrows the window.

use anyhow::Result;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::{to_u64, Database};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyStat {
    pub date: String,
    pub study_secs: u64,
    pub bad_posture_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyStats {
    pub total_study_secs: u64,
    pub avg_daily_secs: u64,
    pub total_bad_posture_count: u64,
    pub daily: Vec<DailyStat>,
}

impl Database {
    pub async fn get_study_stats(
        &self,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<StudyStats> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT date(started_at) AS day,
                        SUM(duration_secs) AS study_secs,
                        SUM(bad_posture_count) AS bad_count
                 FROM sessions
                 WHERE status != 'Running'
                   AND (?1 IS NULL OR date(started_at) >= ?1)
                   AND (?2 IS NULL OR date(started_at) <= ?2)
                 GROUP BY day
                 ORDER BY day ASC",
            )?;

            let mut rows = stmt.query(params![start_date, end_date])?;
            let mut daily = Vec::new();
            let mut total_study_secs: u64 = 0;
            let mut total_bad_posture_count: u64 = 0;

            while let Some(row) = rows.next()? {
                let study_secs = to_u64(row.get::<_, i64>("study_secs")?, "study_secs")?;
                let bad_posture_count = to_u64(row.get::<_, i64>("bad_count")?, "bad_count")?;
                total_study_secs += study_secs;
                total_bad_posture_count += bad_posture_count;
                daily.push(DailyStat {
                    date: row.get("day")?,
                    study_secs,
                    bad_posture_count,
                });
            }

            let avg_daily_secs = if daily.is_empty() {
                0
            } else {
                total_study_secs / daily.len() as u64
            };

            Ok(StudyStats {
                total_study_secs,
                avg_daily_secs,
                total_bad_posture_count,
                daily,
            })
        })
        .await
    }
}
