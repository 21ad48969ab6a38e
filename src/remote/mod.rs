//! Remote data store
//!
//! The hosted backend is reached through the `RemoteStore` trait:
//! - `categories`, `study_audio_map` (+ embedded `audios`), `study_codes` for reads
//! - `practice_logs` for inserts
//!
//! `PostgrestStore` talks to the real backend; `MemoryStore` keeps the same
//! tables in process.

pub mod memory;
pub mod postgrest;
pub mod rows;
pub mod store;

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;
pub use rows::{AudioRow, CategoryRow, PracticeLogRow, StudyAudioRow, StudyCodeRow};
pub use store::RemoteStore;
