use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::player::{MediaPlayer, PlayerStatus};
use super::timer::{SessionTimer, TimerStatus};
use crate::alert::Alert;
use crate::catalog::{format_clock, AudioItem};
use crate::navigation::Route;

/// Point-in-time view of a playback session
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackSnapshot {
    pub audio_id: String,
    pub status: TimerStatus,
    pub position_secs: f64,
    pub duration_secs: f64,
    /// Active practice time so far, including the open segment
    pub practice_secs: f64,
    pub position_label: String,
    pub duration_label: String,
}

/// One play-through of an audio item
///
/// Owns the media player for its lifetime and releases it when dropped.
pub struct PlaybackSession {
    audio: AudioItem,
    player: Box<dyn MediaPlayer>,
    timer: SessionTimer,
    status_rx: Option<mpsc::Receiver<PlayerStatus>>,
    position_secs: f64,
    duration_secs: f64,
}

impl PlaybackSession {
    pub fn new(audio: AudioItem, player: Box<dyn MediaPlayer>) -> Self {
        let duration_secs = audio.duration_secs as f64;
        Self {
            audio,
            player,
            timer: SessionTimer::new(),
            status_rx: None,
            position_secs: 0.0,
            duration_secs,
        }
    }

    pub fn audio(&self) -> &AudioItem {
        &self.audio
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    /// Load the media with autoplay; on failure the session stays idle
    pub async fn start(&mut self) -> Result<(), Alert> {
        self.play().await
    }

    /// Start or resume playback
    pub async fn play(&mut self) -> Result<(), Alert> {
        if self.audio.media_url.is_empty() {
            return Err(Alert::invalid_media_url());
        }
        if self.timer.status() == TimerStatus::Ended {
            return Ok(());
        }

        if self.player.is_loaded() {
            self.player.play().await.map_err(|e| {
                error!("Failed to resume {}: {:#}", self.audio.id, e);
                Alert::playback_failed()
            })?;
        } else {
            let rx = self
                .player
                .load(&self.audio.media_url, true)
                .await
                .map_err(|e| {
                    error!("Failed to load {}: {:#}", self.audio.media_url, e);
                    Alert::playback_failed()
                })?;
            self.status_rx = Some(rx);
            info!(
                "Playing '{}' on {} player",
                self.audio.title,
                self.player.name()
            );
        }

        self.timer.play(now());
        Ok(())
    }

    pub async fn pause(&mut self) {
        if !self.timer.is_playing() {
            return;
        }
        if let Err(e) = self.player.pause().await {
            warn!("Player pause failed: {:#}", e);
        }
        let segment = self.timer.pause(now());
        info!("Paused after a {:.1}s segment", segment);
    }

    pub async fn toggle(&mut self) -> Result<(), Alert> {
        if self.timer.is_playing() {
            self.pause().await;
            Ok(())
        } else {
            self.play().await
        }
    }

    /// Move to `position_secs`; time spent seeking is not practice time
    pub async fn seek(&mut self, position_secs: f64) {
        self.timer.begin_seek(now());

        if self.player.is_loaded() {
            let position = Duration::from_secs_f64(position_secs.max(0.0));
            match self.player.seek(position).await {
                Ok(()) => self.position_secs = position_secs.max(0.0),
                Err(e) => warn!("Seek to {:.1}s failed: {:#}", position_secs, e),
            }
        }

        self.timer.end_seek(now());
    }

    /// Apply one player status update
    ///
    /// Returns the record-entry route when the update reports the natural
    /// end of the media for the first time.
    pub async fn handle_status(&mut self, status: PlayerStatus) -> Option<Route> {
        if !status.is_loaded {
            return None;
        }

        self.position_secs = status.position_ms as f64 / 1000.0;
        if let Some(duration_ms) = status.duration_ms {
            self.duration_secs = duration_ms as f64 / 1000.0;
        }

        if status.did_just_finish && !status.is_looping {
            return self.finish().await;
        }
        None
    }

    /// Drive status updates until the media ends or the player goes away
    pub async fn next_route(&mut self) -> Option<Route> {
        loop {
            let status = match self.status_rx.as_mut() {
                Some(rx) => rx.recv().await,
                None => return None,
            };

            match status {
                Some(status) => {
                    if let Some(route) = self.handle_status(status).await {
                        return Some(route);
                    }
                }
                None => return None,
            }
        }
    }

    /// Manual exit: stop and release the player without recording anything
    pub async fn exit(&mut self) -> Route {
        self.timer.abandon();

        if self.player.is_loaded() {
            if let Err(e) = self.player.stop().await {
                warn!("Player stop failed: {:#}", e);
            }
            if let Err(e) = self.player.unload().await {
                warn!("Player unload failed: {:#}", e);
            }
        }
        self.status_rx = None;

        Route::Back
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            audio_id: self.audio.id.clone(),
            status: self.timer.status(),
            position_secs: self.position_secs,
            duration_secs: self.duration_secs,
            practice_secs: self.timer.elapsed_secs(now()),
            position_label: format_clock(self.position_secs),
            duration_label: format_clock(self.duration_secs),
        }
    }

    async fn finish(&mut self) -> Option<Route> {
        let total = self.timer.finish(now())?;

        if let Err(e) = self.player.stop().await {
            warn!("Player stop after finish failed: {:#}", e);
        }

        Some(Route::RecordEntry {
            audio_id: Some(self.audio.id.clone()),
            practice_duration_seconds: Some(total),
        })
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.player.release();
    }
}

/// Current time on the runtime clock
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}
