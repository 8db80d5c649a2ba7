//! Studycam CLI.
//!
//! Commands:
//! - record: run one recording session, replaying a media file as the
//!   camera and a landmark NDJSON file as the posture feed
//! - sessions: list recorded sessions, newest first
//! - stats: aggregate study statistics, optionally date-bounded

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use studycam::posture::{LandmarkFrame, PostureMonitor, PostureThresholds};
use studycam::recorder::FileReplayCapture;
use studycam::StudycamApp;

#[derive(Parser)]
#[command(name = "studycam")]
#[command(version)]
#[command(about = "Posture-aware study session recorder", long_about = None)]
struct Cli {
    /// Data directory for the local database and stores
    #[arg(long, default_value = ".studycam")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record one session from a media file and a landmark feed
    Record {
        /// Media file replayed as the capture stream (webm)
        #[arg(short, long)]
        media: PathBuf,

        /// NDJSON file of landmark frames, one per posture sample
        #[arg(short, long)]
        landmarks: PathBuf,

        /// Delay between posture samples in milliseconds
        #[arg(long, default_value = "1000")]
        sample_interval_ms: u64,
    },

    /// List recorded sessions, newest first
    Sessions {
        #[arg(long, default_value = "1")]
        page: u64,
    },

    /// Aggregate study statistics
    Stats {
        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Record {
            media,
            landmarks,
            sample_interval_ms,
        } => record(cli.data_dir, media, landmarks, sample_interval_ms).await,
        Commands::Sessions { page } => list_sessions(cli.data_dir, page).await,
        Commands::Stats { start, end } => show_stats(cli.data_dir, start, end).await,
    }
}

async fn record(
    data_dir: PathBuf,
    media: PathBuf,
    landmarks: PathBuf,
    sample_interval_ms: u64,
) -> Result<()> {
    let frames = load_landmark_frames(&landmarks)?;
    info!("loaded {} landmark frames from {}", frames.len(), landmarks.display());

    // The capture is constructed before the app, so the chunking config is
    // read from the same settings file the app will reopen.
    let capture_settings =
        studycam::settings::SettingsStore::new(data_dir.join("settings.json"))?.capture();
    let capture = FileReplayCapture::new(
        media,
        capture_settings.chunk_bytes,
        Duration::from_millis(capture_settings.chunk_interval_ms),
    );

    let app = StudycamApp::new(data_dir, Box::new(capture)).await?;
    let mut monitor = PostureMonitor::new(PostureThresholds::default());

    app.recorder.start().await?;

    let mut ticker = tokio::time::interval(Duration::from_millis(sample_interval_ms.max(1)));
    for frame in &frames {
        ticker.tick().await;
        if let Some(reading) = monitor.evaluate(frame) {
            app.recorder
                .observe(
                    reading.neck_angle,
                    reading.face_distance,
                    reading.is_bad_posture,
                )
                .await;
        }
    }

    let summary = app.recorder.stop().await?;
    println!(
        "session {} uploaded: {}s of study, {} bad-posture observations",
        summary.id, summary.duration_secs, summary.bad_posture_count
    );
    Ok(())
}

async fn list_sessions(data_dir: PathBuf, page: u64) -> Result<()> {
    let db = studycam::store::Database::new(data_dir.join("studycam.sqlite3"))?;
    let sessions = db.list_sessions_paginated(page).await?;

    if sessions.is_empty() {
        println!("no sessions on page {page}");
        return Ok(());
    }

    for session in sessions {
        println!(
            "{}  {}  {:>6}s  bad:{:<4}  {}",
            session.started_at.format("%Y-%m-%d %H:%M"),
            session.status.as_str(),
            session.duration_secs,
            session.bad_posture_count,
            session.id,
        );
    }
    Ok(())
}

async fn show_stats(
    data_dir: PathBuf,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let db = studycam::store::Database::new(data_dir.join("studycam.sqlite3"))?;
    let stats = db.get_study_stats(start, end).await?;

    println!("total study time: {}s", stats.total_study_secs);
    println!("average per day:  {}s", stats.avg_daily_secs);
    println!("bad posture:      {}", stats.total_bad_posture_count);
    for day in &stats.daily {
        println!(
            "  {}  {:>6}s  bad:{}",
            day.date, day.study_secs, day.bad_posture_count
        );
    }
    Ok(())
}

fn load_landmark_frames(path: &PathBuf) -> Result<Vec<LandmarkFrame>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read landmark file {}", path.display()))?;

    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("invalid landmark frame on line {}", i + 1))
        })
        .collect()
}
