use anyhow::Result;
use rusqlite::params;

use crate::models::Observation;

use super::{parse_datetime, Database};

impl Database {
    /// Persists the full observation buffer of a finished session in one
    /// transaction.
    pub async fn insert_observations(
        &self,
        session_id: &str,
        observations: &[Observation],
    ) -> Result<()> {
        let session_id = session_id.to_string();
        let records = observations.to_vec();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO observations (session_id, timestamp, neck_angle, face_distance, is_bad_posture)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;

                for record in &records {
                    stmt.execute(params![
                        session_id,
                        record.timestamp.to_rfc3339(),
                        record.neck_angle,
                        record.face_distance,
                        record.is_bad_posture,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn get_observations_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<Observation>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT timestamp, neck_angle, face_distance, is_bad_posture
                 FROM observations
                 WHERE session_id = ?1
                 ORDER BY timestamp ASC, id ASC",
            )?;

            let mut rows = stmt.query(params![session_id])?;
            let mut observations = Vec::new();
            while let Some(row) = rows.next()? {
                observations.push(Observation {
                    timestamp: parse_datetime(&row.get::<_, String>(0)?, "timestamp")?,
                    neck_angle: row.get(1)?,
                    face_distance: row.get(2)?,
                    is_bad_posture: row.get(3)?,
                });
            }
            Ok(observations)
        })
        .await
    }
}
