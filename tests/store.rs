//! Store behavior: persistence round trips, pagination, recovery, stats.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use studycam::models::{Observation, SessionRecord, SessionStatus};
use studycam::store::Database;

fn session_at(id: &str, started_at: DateTime<Utc>, duration_secs: u64, bad: u64) -> SessionRecord {
    SessionRecord {
        id: id.to_string(),
        started_at,
        stopped_at: Some(started_at + Duration::seconds(duration_secs as i64)),
        status: SessionStatus::Uploaded,
        duration_secs,
        bad_posture_count: bad,
        created_at: started_at,
        updated_at: started_at,
    }
}

fn day(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

#[tokio::test]
async fn session_round_trip_preserves_fields() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("studycam.sqlite3")).unwrap();

    let session = session_at("s1", day(2024, 3, 1, 9), 1800, 4);
    db.insert_session(&session).await.unwrap();

    let loaded = db.get_session("s1").await.unwrap().unwrap();
    assert_eq!(loaded.id, "s1");
    assert_eq!(loaded.started_at, session.started_at);
    assert_eq!(loaded.stopped_at, session.stopped_at);
    assert_eq!(loaded.status, SessionStatus::Uploaded);
    assert_eq!(loaded.duration_secs, 1800);
    assert_eq!(loaded.bad_posture_count, 4);

    assert!(db.get_session("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn listing_pages_newest_first_and_skips_running() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("studycam.sqlite3")).unwrap();

    for i in 0..12 {
        let session = session_at(
            &format!("s{i:02}"),
            day(2024, 3, 1, 0) + Duration::hours(i),
            600,
            0,
        );
        db.insert_session(&session).await.unwrap();
    }
    let mut running = session_at("running", day(2024, 3, 2, 0), 0, 0);
    running.status = SessionStatus::Running;
    running.stopped_at = None;
    db.insert_session(&running).await.unwrap();

    let page1 = db.list_sessions_paginated(1).await.unwrap();
    assert_eq!(page1.len(), 10);
    assert_eq!(page1[0].id, "s11");
    assert_eq!(page1[9].id, "s02");

    let page2 = db.list_sessions_paginated(2).await.unwrap();
    assert_eq!(page2.len(), 2);
    assert_eq!(page2[0].id, "s01");
    assert_eq!(page2[1].id, "s00");
}

#[tokio::test]
async fn observations_persist_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("studycam.sqlite3")).unwrap();

    let started = day(2024, 3, 1, 9);
    db.insert_session(&session_at("s1", started, 3, 1)).await.unwrap();

    let observations: Vec<Observation> = (0..3)
        .map(|i| Observation {
            timestamp: started + Duration::seconds(i),
            neck_angle: 150.0 - i as f64,
            face_distance: 0.3,
            is_bad_posture: i == 2,
        })
        .collect();
    db.insert_observations("s1", &observations).await.unwrap();

    let loaded = db.get_observations_for_session("s1").await.unwrap();
    assert_eq!(loaded, observations);
}

#[tokio::test]
async fn crashed_sessions_are_recoverable_as_interrupted() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("studycam.sqlite3")).unwrap();

    let mut crashed = session_at("crashed", day(2024, 3, 1, 9), 120, 0);
    crashed.status = SessionStatus::Running;
    crashed.stopped_at = None;
    db.insert_session(&crashed).await.unwrap();
    db.insert_session(&session_at("done", day(2024, 3, 1, 10), 600, 0))
        .await
        .unwrap();

    let incomplete = db.get_incomplete_sessions().await.unwrap();
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].id, "crashed");

    let now = day(2024, 3, 1, 11);
    db.mark_session_interrupted("crashed", now).await.unwrap();

    let recovered = db.get_session("crashed").await.unwrap().unwrap();
    assert_eq!(recovered.status, SessionStatus::Interrupted);
    assert_eq!(recovered.stopped_at, Some(now));
    assert!(db.get_incomplete_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn stats_aggregate_per_day_with_date_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("studycam.sqlite3")).unwrap();

    db.insert_session(&session_at("a", day(2024, 3, 1, 9), 3600, 2))
        .await
        .unwrap();
    db.insert_session(&session_at("b", day(2024, 3, 1, 14), 1800, 1))
        .await
        .unwrap();
    db.insert_session(&session_at("c", day(2024, 3, 3, 9), 900, 5))
        .await
        .unwrap();

    let stats = db.get_study_stats(None, None).await.unwrap();
    assert_eq!(stats.total_study_secs, 6300);
    assert_eq!(stats.total_bad_posture_count, 8);
    assert_eq!(stats.daily.len(), 2);
    assert_eq!(stats.avg_daily_secs, 3150);
    assert_eq!(stats.daily[0].date, "2024-03-01");
    assert_eq!(stats.daily[0].study_secs, 5400);
    assert_eq!(stats.daily[0].bad_posture_count, 3);

    let bounded = db
        .get_study_stats(Some("2024-03-02".into()), Some("2024-03-03".into()))
        .await
        .unwrap();
    assert_eq!(bounded.total_study_secs, 900);
    assert_eq!(bounded.daily.len(), 1);
    assert_eq!(bounded.daily[0].date, "2024-03-03");
}
