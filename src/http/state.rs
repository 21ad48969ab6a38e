use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::app::App;
use crate::playback::SessionTimer;

/// Playback reported by a remote client (the client owns the media player)
#[derive(Debug, Default)]
pub struct TrackedPlayback {
    pub audio_id: String,
    pub timer: SessionTimer,
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub app: App,
    /// Active playback sessions (session_id → timer)
    pub playback: Arc<RwLock<HashMap<String, Arc<Mutex<TrackedPlayback>>>>>,
}

impl AppState {
    pub fn new(app: App) -> Self {
        Self {
            app,
            playback: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
