//! Media capture collaborator.
//!
//! The recorder never talks to a camera API directly; it consumes a channel
//! of media chunks produced by a `MediaCapture` implementation. This keeps
//! the buffering logic independent of the capture backend and lets tests
//! drive a session with a plain channel sender.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_info;

/// One chunk of encoded media produced by a capture backend.
#[derive(Debug, Clone)]
pub struct MediaChunk {
    pub data: Vec<u8>,
}

#[async_trait]
pub trait MediaCapture: Send {
    /// Begins capturing and hands back the chunk channel. Acquisition
    /// failures (missing device, unreadable source) surface here.
    async fn start(&mut self) -> Result<mpsc::Receiver<MediaChunk>>;

    /// Stops producing chunks. The channel closes once the final chunk has
    /// been sent, so consumers drain by reading to end-of-channel.
    async fn stop(&mut self) -> Result<()>;
}

/// Capture backend fed by an external producer through a channel sender.
///
/// Embedders that already own a camera pipeline push encoded chunks into the
/// sender; dropping the sender finalizes the stream.
pub struct ChannelCapture {
    receiver: Option<mpsc::Receiver<MediaChunk>>,
}

impl ChannelCapture {
    pub fn new(capacity: usize) -> (mpsc::Sender<MediaChunk>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { receiver: Some(rx) })
    }
}

#[async_trait]
impl MediaCapture for ChannelCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<MediaChunk>> {
        match self.receiver.take() {
            Some(rx) => Ok(rx),
            None => bail!("channel capture already started"),
        }
    }

    async fn stop(&mut self) -> Result<()> {
        // Producer side closes the stream by dropping its sender.
        Ok(())
    }
}

/// Capture backend that replays a pre-recorded media file in timed chunks,
/// standing in for a live camera.
pub struct FileReplayCapture {
    path: PathBuf,
    chunk_bytes: usize,
    chunk_interval: Duration,
    worker: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl FileReplayCapture {
    pub fn new(path: PathBuf, chunk_bytes: usize, chunk_interval: Duration) -> Self {
        Self {
            path,
            chunk_bytes: chunk_bytes.max(1),
            chunk_interval,
            worker: None,
            cancel_token: None,
        }
    }
}

#[async_trait]
impl MediaCapture for FileReplayCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<MediaChunk>> {
        if self.worker.is_some() {
            bail!("file replay capture already started");
        }

        let contents = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("failed to read media source {}", self.path.display()))?;

        let (tx, rx) = mpsc::channel(32);
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();
        let chunk_bytes = self.chunk_bytes;
        let chunk_interval = self.chunk_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = interval(chunk_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut offset = 0;
            while offset < contents.len() {
                tokio::select! {
                    _ = ticker.tick() => {
                        let end = (offset + chunk_bytes).min(contents.len());
                        let chunk = MediaChunk {
                            data: contents[offset..end].to_vec(),
                        };
                        offset = end;
                        if tx.send(chunk).await.is_err() {
                            log_info!("chunk consumer dropped, stopping replay");
                            break;
                        }
                    }
                    _ = token.cancelled() => {
                        log_info!("file replay cancelled at offset {offset}");
                        break;
                    }
                }
            }
        });

        self.worker = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(handle) = self.worker.take() {
            handle
                .await
                .context("file replay worker failed to join")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn channel_capture_hands_back_receiver_once() {
        let (tx, mut capture) = ChannelCapture::new(8);
        let mut rx = capture.start().await.unwrap();

        tx.send(MediaChunk { data: vec![1, 2, 3] }).await.unwrap();
        drop(tx);

        let chunk = rx.recv().await.unwrap();
        assert_eq!(chunk.data, vec![1, 2, 3]);
        assert!(rx.recv().await.is_none());

        assert!(capture.start().await.is_err());
    }

    #[tokio::test]
    async fn file_replay_streams_whole_file_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 10]).unwrap();

        let mut capture =
            FileReplayCapture::new(file.path().to_path_buf(), 4, Duration::from_millis(1));
        let mut rx = capture.start().await.unwrap();

        let mut total = Vec::new();
        while let Some(chunk) = rx.recv().await {
            total.extend(chunk.data);
        }
        capture.stop().await.unwrap();

        assert_eq!(total, vec![7u8; 10]);
    }

    #[tokio::test]
    async fn file_replay_missing_source_fails_start() {
        let mut capture = FileReplayCapture::new(
            PathBuf::from("/nonexistent/studycam-source.webm"),
            4,
            Duration::from_millis(1),
        );
        assert!(capture.start().await.is_err());
    }
}
