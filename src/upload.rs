//! Upload client for finished recording sessions.
//!
//! One multipart POST per completed session: the captured media under the
//! `video` field and the JSON session summary under `posture_data`. There is
//! no retry; a failed upload is surfaced to the caller and the session row is
//! left marked `UploadFailed`.

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

use crate::models::SessionPayload;

const UPLOAD_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct UploadClient {
    client: reqwest::Client,
    endpoint: String,
}

impl UploadClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .user_agent(concat!("studycam/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build upload HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one session. Success requires a 2xx status with a JSON body;
    /// the body contents are otherwise unused.
    pub async fn upload_session(&self, payload: &SessionPayload, video: Vec<u8>) -> Result<()> {
        let posture_data =
            serde_json::to_string(payload).context("failed to serialize session payload")?;
        let video_len = video.len();

        let video_part = Part::bytes(video)
            .file_name(format!(
                "study_session_{}.webm",
                payload.start_time.format("%Y%m%d_%H%M%S")
            ))
            .mime_str("video/webm")
            .context("invalid media mime type")?;

        let form = Form::new()
            .part("video", video_part)
            .text("posture_data", posture_data);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("upload request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            bail!("upload rejected with status {status}");
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| anyhow!("upload response was not valid JSON: {err}"))?;

        info!(
            "uploaded session starting {} ({} observations, {} media bytes)",
            payload.start_time,
            payload.records.len(),
            video_len
        );

        Ok(())
    }
}
