//! Audio playback
//!
//! This module provides:
//! - `SessionTimer`: active-time accounting across pause/resume/seek
//! - `MediaPlayer`: the external player abstraction and a headless player
//! - `PlaybackSession`: one play-through, finalized once on natural end

mod player;
mod session;
mod timer;

pub use player::{HeadlessPlayer, MediaPlayer, PlayerStatus};
pub use session::{PlaybackSession, PlaybackSnapshot};
pub use timer::{SessionTimer, TimerStatus};
