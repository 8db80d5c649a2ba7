use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    pub endpoint: String,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5001/api/videos".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Bytes per replayed media chunk.
    pub chunk_bytes: usize,
    pub chunk_interval_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            chunk_bytes: 64 * 1024,
            chunk_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct UserSettings {
    #[serde(default)]
    upload: UploadSettings,
    #[serde(default)]
    capture: CaptureSettings,
}

/// JSON settings file, read once at startup and rewritten on update.
/// Unreadable settings fall back to defaults; these carry no user data.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn upload(&self) -> UploadSettings {
        self.data.read().unwrap().upload.clone()
    }

    pub fn capture(&self) -> CaptureSettings {
        self.data.read().unwrap().capture.clone()
    }

    pub fn update_upload(&self, settings: UploadSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.upload = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
