// Integration tests for timed playback sessions
//
// These tests drive a headless player on a paused tokio clock and verify
// that only active playback time is counted.

use anyhow::Result;
use practice_companion::alert::Alert;
use practice_companion::catalog::AudioItem;
use practice_companion::navigation::Route;
use practice_companion::playback::{HeadlessPlayer, PlaybackSession, PlayerStatus, TimerStatus};
use std::time::Duration;

fn audio_item(duration_secs: u64, media_url: &str) -> AudioItem {
    AudioItem {
        id: "42".to_string(),
        title: "Evening Body Scan".to_string(),
        description: "暂无简介".to_string(),
        duration_secs,
        category_key: "sleep".to_string(),
        category_label: "助眠".to_string(),
        difficulty: "入门".to_string(),
        cover_url: "https://via.placeholder.com/300".to_string(),
        media_url: media_url.to_string(),
    }
}

fn session(duration_secs: u64) -> PlaybackSession {
    let player = HeadlessPlayer::new(Duration::from_secs(duration_secs));
    PlaybackSession::new(
        audio_item(duration_secs, "https://cdn.example/42.mp3"),
        Box::new(player),
    )
}

fn finished_status() -> PlayerStatus {
    PlayerStatus {
        is_loaded: true,
        is_playing: false,
        position_ms: 18_000,
        duration_ms: Some(18_000),
        did_just_finish: true,
        is_looping: false,
    }
}

#[tokio::test(start_paused = true)]
async fn test_paused_time_is_not_counted() -> Result<()> {
    let mut session = session(18);

    session.start().await?;
    tokio::time::sleep(Duration::from_secs(10)).await;

    session.pause().await;
    assert_eq!(session.timer().status(), TimerStatus::Paused);
    tokio::time::sleep(Duration::from_secs(5)).await;

    session.play().await?;
    let route = session.next_route().await;

    assert_eq!(
        route,
        Some(Route::RecordEntry {
            audio_id: Some("42".to_string()),
            practice_duration_seconds: Some(18),
        })
    );
    assert_eq!(session.timer().status(), TimerStatus::Ended);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_seek_time_is_not_counted() -> Result<()> {
    let mut session = session(600);

    session.start().await?;
    tokio::time::sleep(Duration::from_secs(4)).await;
    session.seek(590.0).await;
    tokio::time::sleep(Duration::from_secs(3)).await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.practice_secs, 7.0);
    assert_eq!(snapshot.position_label, "09:50");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_repeated_end_signal_emits_once() -> Result<()> {
    let mut session = session(18);
    session.start().await?;
    tokio::time::sleep(Duration::from_secs(6)).await;

    let first = session.handle_status(finished_status()).await;
    let second = session.handle_status(finished_status()).await;

    assert_eq!(
        first,
        Some(Route::RecordEntry {
            audio_id: Some("42".to_string()),
            practice_duration_seconds: Some(6),
        })
    );
    assert_eq!(second, None);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_looping_end_is_ignored() -> Result<()> {
    let mut session = session(18);
    session.start().await?;

    let mut status = finished_status();
    status.is_looping = true;
    assert_eq!(session.handle_status(status).await, None);
    assert!(session.timer().is_playing());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_exit_discards_practice() -> Result<()> {
    let mut session = session(18);
    session.start().await?;
    tokio::time::sleep(Duration::from_secs(12)).await;

    let route = session.exit().await;
    assert_eq!(route, Route::Back);

    // The end signal after exit must not produce a record
    assert_eq!(session.handle_status(finished_status()).await, None);
    assert_eq!(session.next_route().await, None);

    Ok(())
}

#[tokio::test]
async fn test_empty_media_url_raises_alert() {
    let player = HeadlessPlayer::new(Duration::from_secs(60));
    let mut session = PlaybackSession::new(audio_item(60, ""), Box::new(player));

    let result = session.start().await;

    assert_eq!(result, Err(Alert::invalid_media_url()));
    assert_eq!(session.timer().status(), TimerStatus::Idle);
}

#[tokio::test]
async fn test_load_failure_stays_idle() {
    // A zero-length media file cannot be loaded
    let mut session = session(0);

    let result = session.start().await;

    assert_eq!(result, Err(Alert::playback_failed()));
    assert_eq!(session.timer().status(), TimerStatus::Idle);
    assert_eq!(session.snapshot().practice_secs, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_pauses_and_resumes() -> Result<()> {
    let mut session = session(120);

    session.start().await?;
    tokio::time::sleep(Duration::from_secs(2)).await;
    session.toggle().await?;
    assert_eq!(session.timer().status(), TimerStatus::Paused);
    assert_eq!(session.timer().accumulated_secs(), 2.0);

    session.toggle().await?;
    assert!(session.timer().is_playing());

    Ok(())
}
