//! HTTP API for companion clients
//!
//! Clients that own the media player report playback events here and read
//! the catalog, records, reminder and profile:
//! - GET /catalog, GET /catalog/recommendation
//! - POST /playback/start, POST /playback/:id/{pause,resume,seek/begin,seek/end,finish,exit}
//! - GET/POST /records, GET /records/stats
//! - GET/PUT /reminder
//! - GET /profile, POST /profile/cohort
//! - GET /health

mod handlers;
mod routes;
mod state;

pub use handlers::ErrorResponse;
pub use routes::create_router;
pub use state::{AppState, TrackedPlayback};
