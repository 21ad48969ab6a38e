use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    /// No segment has started yet (media not loaded)
    #[default]
    Idle,
    Playing,
    Paused,
    /// Finalized on natural end-of-media
    Ended,
}

/// Active-playback time for one play-through
///
/// Time only accumulates between a play-like transition (`play`, `end_seek`)
/// and the next pause-like one (`pause`, `begin_seek`, `finish`). The
/// accumulated total is the sum of closed segments; an open segment is
/// counted only when it closes.
#[derive(Debug, Clone, Default)]
pub struct SessionTimer {
    status: TimerStatus,
    /// Sum of closed segments, in seconds
    accumulated_secs: f64,
    /// Start of the open segment, if any
    segment_start: Option<Instant>,
    /// Set when a seek interrupted active playback
    resume_after_seek: bool,
    /// Set once `finish` has produced its value
    finalized: bool,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == TimerStatus::Playing
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Closed-segment total, excluding any open segment
    pub fn accumulated_secs(&self) -> f64 {
        self.accumulated_secs
    }

    /// Total including the open segment up to `now`
    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        match self.segment_start {
            Some(start) => self.accumulated_secs + seconds_between(start, now),
            None => self.accumulated_secs,
        }
    }

    /// Idle/Paused → Playing
    pub fn play(&mut self, now: Instant) {
        match self.status {
            TimerStatus::Idle | TimerStatus::Paused => {
                self.segment_start = Some(now);
                self.resume_after_seek = false;
                self.status = TimerStatus::Playing;
                debug!("Timer segment opened ({:.1}s so far)", self.accumulated_secs);
            }
            TimerStatus::Playing | TimerStatus::Ended => {}
        }
    }

    /// Playing → Paused; returns the length of the closed segment
    ///
    /// A pause during a seek cancels the resume the seek would do.
    pub fn pause(&mut self, now: Instant) -> f64 {
        self.resume_after_seek = false;
        if self.status != TimerStatus::Playing {
            return 0.0;
        }
        let segment = self.close_segment(now);
        self.status = TimerStatus::Paused;
        segment
    }

    /// A seek closes the running segment and remembers to resume afterwards
    pub fn begin_seek(&mut self, now: Instant) {
        if self.status == TimerStatus::Playing {
            self.close_segment(now);
            self.status = TimerStatus::Paused;
            self.resume_after_seek = true;
        }
    }

    /// Reopen a segment if the seek interrupted playback
    pub fn end_seek(&mut self, now: Instant) {
        if self.resume_after_seek && self.status == TimerStatus::Paused {
            self.play(now);
        }
    }

    /// Natural end-of-media
    ///
    /// Returns the floored total the first time; `None` on every later call
    /// and after `abandon`.
    pub fn finish(&mut self, now: Instant) -> Option<u64> {
        if self.finalized || self.status == TimerStatus::Ended {
            debug!("Timer already finalized, ignoring repeated end signal");
            return None;
        }
        self.finalized = true;

        let last_segment = if self.segment_start.is_some() {
            self.close_segment(now)
        } else {
            0.0
        };
        self.status = TimerStatus::Ended;
        self.resume_after_seek = false;

        let total = self.accumulated_secs.max(0.0).floor() as u64;
        info!(
            "Playback finished: accumulated {:.1}s, last segment {:.1}s, total {}s",
            self.accumulated_secs - last_segment,
            last_segment,
            total
        );
        Some(total)
    }

    /// Manual exit: elapsed time is discarded and nothing is emitted
    pub fn abandon(&mut self) {
        if self.status != TimerStatus::Ended {
            debug!(
                "Playback abandoned after {:.1}s, not recorded",
                self.accumulated_secs
            );
        }
        *self = Self {
            finalized: self.finalized,
            status: TimerStatus::Ended,
            ..Self::default()
        };
    }

    fn close_segment(&mut self, now: Instant) -> f64 {
        match self.segment_start.take() {
            Some(start) => {
                let segment = seconds_between(start, now);
                self.accumulated_secs += segment;
                segment
            }
            None => 0.0,
        }
    }
}

fn seconds_between(start: Instant, end: Instant) -> f64 {
    end.saturating_duration_since(start).as_secs_f64()
}
