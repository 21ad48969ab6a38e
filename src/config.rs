use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub cohort: CohortConfig,
    #[serde(default)]
    pub reminder: ReminderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Hosted backend (PostgREST endpoint of the remote data store)
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. "https://xyz.supabase.co"
    pub url: String,
    /// Public anon key sent as `apikey` and bearer token
    pub anon_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the on-device key-value file
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohortConfig {
    /// Cohort used when the user has not entered a study code
    pub default_code: String,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            default_code: "PUBLIC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    pub title: String,
    pub body: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            title: "该开始正念练习了 🧘".to_string(),
            body: "给自己几分钟，找回内心的平静。".to_string(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load from `<path>.toml` (or any format the `config` crate detects),
    /// then apply `PRACTICE__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("PRACTICE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_applies_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("companion.toml"),
            r#"
[service]
name = "test"

[service.http]
bind = "127.0.0.1"
port = 9000

[backend]
url = "https://demo.supabase.co"
anon_key = "anon"

[storage]
data_dir = "/tmp/practice"
"#,
        )
        .unwrap();

        let path = dir.path().join("companion");
        let config = Config::load(path.to_str().unwrap()).unwrap();

        assert_eq!(config.service.http.port, 9000);
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.cohort.default_code, "PUBLIC");
        assert!(!config.reminder.title.is_empty());
    }
}
