use anyhow::{bail, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Status update delivered by a media player while media is loaded
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub is_loaded: bool,
    pub is_playing: bool,
    /// Playback position in milliseconds
    pub position_ms: u64,
    /// Media length in milliseconds, when known
    pub duration_ms: Option<u64>,
    /// True exactly on the update that reports reaching the end
    pub did_just_finish: bool,
    pub is_looping: bool,
}

/// External media player
///
/// Implementations:
/// - `HeadlessPlayer`: advances a position clock without producing sound
/// - platform players (outside this crate) bridge to the OS media stack
#[async_trait::async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Load media and optionally start playing
    ///
    /// Returns a channel receiver that will receive status updates
    async fn load(&mut self, url: &str, autoplay: bool) -> Result<mpsc::Receiver<PlayerStatus>>;

    async fn play(&mut self) -> Result<()>;

    async fn pause(&mut self) -> Result<()>;

    /// Move the playback position
    async fn seek(&mut self, position: Duration) -> Result<()>;

    /// Stop playback and rewind
    async fn stop(&mut self) -> Result<()>;

    /// Release the loaded media
    async fn unload(&mut self) -> Result<()>;

    /// Synchronous release used on teardown; must be idempotent
    fn release(&mut self);

    fn is_loaded(&self) -> bool;

    /// Player name for logging
    fn name(&self) -> &str;
}

#[derive(Debug)]
struct Clock {
    duration: Duration,
    /// Position at the last play/pause/seek
    base: Duration,
    /// Set while playing
    playing_since: Option<Instant>,
}

impl Clock {
    fn position(&self, now: Instant) -> Duration {
        let position = match self.playing_since {
            Some(since) => self.base + now.saturating_duration_since(since),
            None => self.base,
        };
        position.min(self.duration)
    }

    fn status(&self, now: Instant, did_just_finish: bool) -> PlayerStatus {
        PlayerStatus {
            is_loaded: true,
            is_playing: self.playing_since.is_some(),
            position_ms: self.position(now).as_millis() as u64,
            duration_ms: Some(self.duration.as_millis() as u64),
            did_just_finish,
            is_looping: false,
        }
    }
}

/// Player that tracks position in real time without audio output
///
/// Emits a status update every tick while playing and a final
/// `did_just_finish` update when the position reaches the media length.
pub struct HeadlessPlayer {
    duration: Duration,
    tick: Duration,
    clock: Option<Arc<Mutex<Clock>>>,
    task: Option<JoinHandle<()>>,
}

impl HeadlessPlayer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            tick: Duration::from_millis(250),
            clock: None,
            task: None,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    fn clock(&self) -> Result<&Arc<Mutex<Clock>>> {
        self.clock.as_ref().context("No media loaded")
    }
}

#[async_trait::async_trait]
impl MediaPlayer for HeadlessPlayer {
    async fn load(&mut self, url: &str, autoplay: bool) -> Result<mpsc::Receiver<PlayerStatus>> {
        reqwest::Url::parse(url).with_context(|| format!("Invalid media URL: {}", url))?;
        if self.duration.is_zero() {
            bail!("Media has no playable length: {}", url);
        }

        self.release();

        let now = Instant::now();
        let clock = Arc::new(Mutex::new(Clock {
            duration: self.duration,
            base: Duration::ZERO,
            playing_since: autoplay.then_some(now),
        }));

        let (tx, rx) = mpsc::channel(1024);
        let task_clock = Arc::clone(&clock);
        let tick = self.tick;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let now = Instant::now();

                let status = {
                    let mut clock = task_clock.lock().await;
                    if clock.playing_since.is_none() {
                        continue;
                    }
                    let finished = clock.position(now) >= clock.duration;
                    if finished {
                        clock.base = clock.duration;
                        clock.playing_since = None;
                    }
                    clock.status(now, finished)
                };

                if tx.send(status).await.is_err() {
                    break;
                }
            }

            debug!("Headless player ticker stopped");
        });

        info!(
            "Headless player loaded {} ({:.0}s, autoplay={})",
            url,
            self.duration.as_secs_f64(),
            autoplay
        );

        self.clock = Some(clock);
        self.task = Some(task);
        Ok(rx)
    }

    async fn play(&mut self) -> Result<()> {
        let mut clock = self.clock()?.lock().await;
        if clock.playing_since.is_none() {
            if clock.base >= clock.duration {
                clock.base = Duration::ZERO;
            }
            clock.playing_since = Some(Instant::now());
        }
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        let mut clock = self.clock()?.lock().await;
        let now = Instant::now();
        clock.base = clock.position(now);
        clock.playing_since = None;
        Ok(())
    }

    async fn seek(&mut self, position: Duration) -> Result<()> {
        let mut clock = self.clock()?.lock().await;
        clock.base = position.min(clock.duration);
        if clock.playing_since.is_some() {
            clock.playing_since = Some(Instant::now());
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let mut clock = self.clock()?.lock().await;
        clock.base = Duration::ZERO;
        clock.playing_since = None;
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Headless player released");
        }
        self.clock = None;
    }

    fn is_loaded(&self) -> bool {
        self.clock.is_some()
    }

    fn name(&self) -> &str {
        "headless"
    }
}

impl Drop for HeadlessPlayer {
    fn drop(&mut self) {
        self.release();
    }
}
