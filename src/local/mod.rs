//! On-device persistence
//!
//! A string-keyed `KeyValueStore` holds the cohort code, the anonymous device
//! id, the subject id, the JSON list of practice records and the JSON
//! reminder setting.

pub mod keys;
pub mod kv;
pub mod profile;

pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use profile::UserContext;
