pub mod models;
pub mod posture;
pub mod recorder;
pub mod settings;
pub mod store;
pub mod upload;
mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use log::warn;

use recorder::{MediaCapture, SessionRecorder};
use settings::SettingsStore;
use store::{Database, LocalStore};
use upload::UploadClient;

/// Wires the store, local state, settings and recorder together over one
/// data directory.
pub struct StudycamApp {
    pub db: Database,
    pub local: LocalStore,
    pub settings: SettingsStore,
    pub recorder: SessionRecorder,
}

impl StudycamApp {
    pub async fn new(data_dir: PathBuf, capture: Box<dyn MediaCapture>) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let db = Database::new(data_dir.join("studycam.sqlite3"))?;

        // Finalize sessions that were recording when the app last crashed.
        let now = Utc::now();
        for session in db.get_incomplete_sessions().await? {
            warn!(
                "Recovered incomplete session {}; marking as Interrupted",
                session.id
            );
            db.mark_session_interrupted(&session.id, now).await?;
        }

        let settings = SettingsStore::new(data_dir.join("settings.json"))?;
        let local = LocalStore::new(data_dir.join("local"))?;

        let uploader = UploadClient::new(settings.upload().endpoint)?;
        let recorder = SessionRecorder::new(db.clone(), uploader, capture);

        Ok(Self {
            db,
            local,
            settings,
            recorder,
        })
    }
}
