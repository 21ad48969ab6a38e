use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// String-keyed, string-valued persistent storage on the device
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Key-value store persisted as one JSON object file
///
/// Writes go through a temporary sibling file and a rename.
pub struct FileKvStore {
    path: PathBuf,
    entries: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileKvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    /// Store file `store.json` inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("store.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<BTreeMap<String, String>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    "Local store {} is corrupt ({}), starting empty",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    async fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&tmp, content)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!("Local store flushed ({} keys)", entries.len());
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_file().await?);
        }
        Ok(guard.as_ref().and_then(|entries| entries.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.entries.lock().await;
        let mut entries = match guard.take() {
            Some(entries) => entries,
            None => self.read_file().await?,
        };
        entries.insert(key.to_string(), value.to_string());

        let result = self.write_file(&entries).await;
        *guard = Some(entries);
        result
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.entries.lock().await;
        let mut entries = match guard.take() {
            Some(entries) => entries,
            None => self.read_file().await?,
        };
        entries.remove(key);

        let result = self.write_file(&entries).await;
        *guard = Some(entries);
        result
    }
}

/// Volatile key-value store
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
