//! Cohort (study code) verification
//!
//! A study code gates which audio items a user sees. Codes are verified
//! against the remote `study_codes` table before they are stored locally.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::alert::Alert;
use crate::local::UserContext;
use crate::remote::RemoteStore;

/// Longest subject identifier (last six phone digits)
pub const SUBJECT_ID_LEN: usize = 6;

/// Result of submitting a study code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CohortUpdate {
    /// Empty code: switched to the default cohort
    Reset { code: String, subject_id: String },
    /// Code verified active and stored
    Verified {
        code: String,
        description: String,
        subject_id: String,
    },
    /// Code missing or inactive; nothing was stored
    Rejected { alert: Alert },
}

#[derive(Clone)]
pub struct CohortService {
    remote: Arc<dyn RemoteStore>,
    user: UserContext,
}

impl CohortService {
    pub fn new(remote: Arc<dyn RemoteStore>, user: UserContext) -> Self {
        Self { remote, user }
    }

    /// Apply a study code and subject id entered by the user
    ///
    /// A rejected code or an unreachable backend leaves local state untouched.
    pub async fn submit(&self, code_input: &str, subject_input: &str) -> Result<CohortUpdate, Alert> {
        let subject_id = sanitize_subject_id(subject_input);
        let code = normalize_code(code_input);

        if code.is_empty() {
            let default_code = self.user.default_cohort().to_string();
            self.store(&default_code, &subject_id).await?;
            info!("Cohort reset to {}", default_code);
            return Ok(CohortUpdate::Reset {
                code: default_code,
                subject_id,
            });
        }

        let row = match self.remote.active_study_code(&code).await {
            Ok(row) => row,
            Err(e) => {
                error!("Study code lookup failed: {:#}", e);
                return Err(Alert::network_failed());
            }
        };

        let Some(row) = row else {
            warn!("Study code {} rejected", code);
            return Ok(CohortUpdate::Rejected {
                alert: Alert::invalid_cohort_code(),
            });
        };

        self.store(&row.code, &subject_id).await?;
        info!("Cohort set to {}", row.code);

        Ok(CohortUpdate::Verified {
            description: row.description.unwrap_or_else(|| row.code.clone()),
            code: row.code,
            subject_id,
        })
    }

    async fn store(&self, code: &str, subject_id: &str) -> Result<(), Alert> {
        let result = async {
            self.user.set_subject_id(subject_id).await?;
            self.user.set_cohort_code(code).await
        }
        .await;

        result.map_err(|e| {
            error!("Failed to store cohort settings: {:#}", e);
            Alert::save_failed()
        })
    }
}

/// Trim and upper-case a study code
pub fn normalize_code(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Keep digits only, at most `SUBJECT_ID_LEN` of them
pub fn sanitize_subject_id(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(SUBJECT_ID_LEN)
        .collect()
}
