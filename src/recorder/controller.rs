use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use tokio::{sync::Mutex, task::JoinHandle, time};
use uuid::Uuid;

use crate::{
    models::{SessionRecord, SessionStatus, SessionSummary},
    store::Database,
    upload::UploadClient,
};

use super::capture::MediaCapture;
use super::state::{RecorderState, RecorderStatus};

/// Orchestrates one recording session at a time: owns the observation
/// buffer, drains the media capture channel, keeps the derived duration
/// fresh on a 1-second tick, and ships the finished session to the upload
/// endpoint on `stop`.
#[derive(Clone)]
pub struct SessionRecorder {
    state: Arc<Mutex<RecorderState>>,
    db: Database,
    uploader: UploadClient,
    capture: Arc<Mutex<Box<dyn MediaCapture>>>,
    media_buffer: Arc<Mutex<Vec<u8>>>,
    collector: Arc<Mutex<Option<JoinHandle<()>>>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
}

impl SessionRecorder {
    pub fn new(db: Database, uploader: UploadClient, capture: Box<dyn MediaCapture>) -> Self {
        let debug_mode = std::env::var("STUDYCAM_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            state: Arc::new(Mutex::new(RecorderState::new())),
            db,
            uploader,
            capture: Arc::new(Mutex::new(capture)),
            media_buffer: Arc::new(Mutex::new(Vec::new())),
            collector: Arc::new(Mutex::new(None)),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            heartbeat_every_ticks: if debug_mode { 1 } else { 10 },
        }
    }

    pub async fn get_state(&self) -> RecorderState {
        let mut guard = self.state.lock().await;
        if guard.status == RecorderStatus::Recording {
            guard.sync_duration(Utc::now());
        }
        guard.clone()
    }

    /// Begins a new session. Rejects re-entrant starts instead of racing;
    /// any buffer retained from a failed upload is discarded here.
    pub async fn start(&self) -> Result<RecorderState> {
        {
            let state = self.state.lock().await;
            if state.status != RecorderStatus::Idle {
                return Err(anyhow!("recording already active"));
            }
        }

        // Acquire the capture stream first; on failure nothing has changed
        // and the caller may try again later.
        let chunk_rx = self
            .capture
            .lock()
            .await
            .start()
            .await
            .context("media capture acquisition failed")?;

        let session_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();

        let session = SessionRecord {
            id: session_id.clone(),
            started_at,
            stopped_at: None,
            status: SessionStatus::Running,
            duration_secs: 0,
            bad_posture_count: 0,
            created_at: started_at,
            updated_at: started_at,
        };
        self.db.insert_session(&session).await?;

        {
            let mut state = self.state.lock().await;
            state.begin_session(session_id.clone(), started_at);
        }
        self.media_buffer.lock().await.clear();

        self.spawn_collector(chunk_rx).await;
        self.spawn_ticker().await;

        info!("recording session {session_id} started");
        Ok(self.get_state().await)
    }

    /// Feeds one posture observation into the active session. Samples that
    /// arrive while idle are dropped silently; returns whether the sample
    /// was accepted.
    pub async fn observe(&self, neck_angle: f64, face_distance: f64, is_bad_posture: bool) -> bool {
        let mut state = self.state.lock().await;
        state.record_observation(Utc::now(), neck_angle, face_distance, is_bad_posture)
    }

    /// Ends the active session: drains the capture channel, persists the
    /// session and its observations, and issues exactly one upload. On
    /// upload failure the error surfaces to the caller, the session row is
    /// marked `UploadFailed`, and the in-memory buffer is left for the
    /// caller to inspect; the next `start` discards it.
    pub async fn stop(&self) -> Result<SessionSummary> {
        {
            let state = self.state.lock().await;
            if state.status != RecorderStatus::Recording {
                return Err(anyhow!("no active recording to stop"));
            }
        }

        self.capture
            .lock()
            .await
            .stop()
            .await
            .context("media capture failed to stop")?;

        // The capture channel closes once the producer is done; joining the
        // collector guarantees every chunk landed in the buffer.
        if let Some(handle) = self.collector.lock().await.take() {
            handle.await.context("media collector failed to join")?;
        }
        self.cancel_ticker().await;

        let stopped_at = Utc::now();
        let (session_id, payload) = {
            let mut state = self.state.lock().await;
            let session_id = state
                .session_id
                .clone()
                .ok_or_else(|| anyhow!("missing session id"))?;
            let payload = state
                .finish(stopped_at)
                .ok_or_else(|| anyhow!("missing session start time"))?;
            (session_id, payload)
        };

        let media = std::mem::take(&mut *self.media_buffer.lock().await);

        self.db
            .mark_session_status(
                &session_id,
                SessionStatus::Completed,
                payload.duration,
                payload.bad_posture_count,
                Some(stopped_at),
                stopped_at,
            )
            .await?;
        self.db
            .insert_observations(&session_id, &payload.records)
            .await?;

        match self.uploader.upload_session(&payload, media).await {
            Ok(()) => {
                self.db
                    .mark_session_status(
                        &session_id,
                        SessionStatus::Uploaded,
                        payload.duration,
                        payload.bad_posture_count,
                        Some(stopped_at),
                        Utc::now(),
                    )
                    .await?;
                self.state.lock().await.clear();

                info!(
                    "session {session_id} uploaded ({}s, {} observations)",
                    payload.duration,
                    payload.records.len()
                );

                Ok(SessionSummary {
                    id: session_id,
                    started_at: payload.start_time,
                    stopped_at: Some(stopped_at),
                    status: SessionStatus::Uploaded,
                    duration_secs: payload.duration,
                    bad_posture_count: payload.bad_posture_count,
                })
            }
            Err(err) => {
                error!("session {session_id} upload failed: {err:#}");
                if let Err(db_err) = self
                    .db
                    .mark_session_status(
                        &session_id,
                        SessionStatus::UploadFailed,
                        payload.duration,
                        payload.bad_posture_count,
                        Some(stopped_at),
                        Utc::now(),
                    )
                    .await
                {
                    warn!("failed to mark session {session_id} as UploadFailed: {db_err:#}");
                }
                Err(err.context(format!("upload of session {session_id} failed")))
            }
        }
    }

    async fn spawn_collector(&self, mut chunk_rx: tokio::sync::mpsc::Receiver<super::capture::MediaChunk>) {
        let mut collector_guard = self.collector.lock().await;
        if let Some(handle) = collector_guard.take() {
            handle.abort();
        }

        let media_buffer = self.media_buffer.clone();
        let handle = tokio::spawn(async move {
            while let Some(chunk) = chunk_rx.recv().await {
                if chunk.data.is_empty() {
                    continue;
                }
                media_buffer.lock().await.extend(chunk.data);
            }
        });

        *collector_guard = Some(handle);
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let db = self.db.clone();
        let tick_interval = self.tick_interval;
        let heartbeat_every = self.heartbeat_every_ticks;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            let mut ticks: u32 = 0;
            loop {
                interval.tick().await;

                let snapshot = {
                    let mut guard = state.lock().await;
                    if guard.status != RecorderStatus::Recording {
                        break;
                    }
                    guard.sync_duration(Utc::now());
                    guard.clone()
                };

                ticks = ticks.wrapping_add(1);

                if let Some(session_id) = snapshot.session_id.clone() {
                    if ticks % heartbeat_every == 0 {
                        let db_clone = db.clone();
                        tokio::spawn(async move {
                            let _ = db_clone
                                .update_session_progress(
                                    &session_id,
                                    snapshot.duration_secs,
                                    snapshot.bad_posture_count,
                                    Utc::now(),
                                )
                                .await;
                        });
                    }
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}
