use std::sync::Arc;
use tracing::{error, warn};

use super::keys;
use super::kv::KeyValueStore;

const UNKNOWN_USER: &str = "unknown-user";

/// Per-device user context: cohort code, anonymous device id, subject id
#[derive(Clone)]
pub struct UserContext {
    kv: Arc<dyn KeyValueStore>,
    default_cohort: String,
}

impl UserContext {
    pub fn new(kv: Arc<dyn KeyValueStore>, default_cohort: impl Into<String>) -> Self {
        Self {
            kv,
            default_cohort: default_cohort.into(),
        }
    }

    pub fn default_cohort(&self) -> &str {
        &self.default_cohort
    }

    /// Anonymous device id, generated and persisted on first use
    pub async fn device_id(&self) -> String {
        match self.kv.get(keys::DEVICE_ID).await {
            Ok(Some(id)) if !id.is_empty() => id,
            Ok(_) => {
                let id = format!("user-{}", uuid::Uuid::new_v4().simple());
                if let Err(e) = self.kv.set(keys::DEVICE_ID, &id).await {
                    error!("Failed to persist device id: {}", e);
                    return UNKNOWN_USER.to_string();
                }
                id
            }
            Err(e) => {
                warn!("Failed to read device id: {}", e);
                UNKNOWN_USER.to_string()
            }
        }
    }

    pub async fn subject_id(&self) -> Option<String> {
        match self.kv.get(keys::SUBJECT_ID).await {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) => {
                warn!("Failed to read subject id: {}", e);
                None
            }
        }
    }

    pub async fn set_subject_id(&self, id: &str) -> anyhow::Result<()> {
        self.kv.set(keys::SUBJECT_ID, id).await
    }

    /// Cohort code in effect, falling back to the configured default
    pub async fn cohort_code(&self) -> String {
        match self.kv.get(keys::COHORT_CODE).await {
            Ok(Some(code)) if !code.is_empty() => code,
            Ok(_) => self.default_cohort.clone(),
            Err(e) => {
                warn!("Failed to read cohort code: {}", e);
                self.default_cohort.clone()
            }
        }
    }

    pub async fn set_cohort_code(&self, code: &str) -> anyhow::Result<()> {
        self.kv.set(keys::COHORT_CODE, code).await
    }
}
