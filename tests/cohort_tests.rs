// Integration tests for study code verification
//
// These tests verify that only active study codes change the cohort and
// that a rejected or failed submission leaves local state untouched.

use anyhow::Result;
use practice_companion::alert::Alert;
use practice_companion::cohort::{CohortService, CohortUpdate};
use practice_companion::local::{KeyValueStore, MemoryKvStore, UserContext};
use practice_companion::remote::MemoryStore;
use std::sync::Arc;

async fn setup() -> (Arc<MemoryStore>, UserContext, CohortService) {
    let remote = Arc::new(MemoryStore::new());
    remote.add_study_code("STUDY2025", "Spring cohort", true).await;
    remote.add_study_code("CHANGE2025", "Retired cohort", false).await;

    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let user = UserContext::new(kv, "PUBLIC");
    let cohort = CohortService::new(remote.clone(), user.clone());
    (remote, user, cohort)
}

#[tokio::test]
async fn test_active_code_is_stored() -> Result<()> {
    let (_remote, user, cohort) = setup().await;

    let update = cohort.submit(" study2025 ", "138-1234").await;

    assert_eq!(
        update,
        Ok(CohortUpdate::Verified {
            code: "STUDY2025".to_string(),
            description: "Spring cohort".to_string(),
            subject_id: "138123".to_string(),
        })
    );
    assert_eq!(user.cohort_code().await, "STUDY2025");
    assert_eq!(user.subject_id().await.as_deref(), Some("138123"));

    Ok(())
}

#[tokio::test]
async fn test_inactive_code_is_rejected_without_changes() -> Result<()> {
    let (_remote, user, cohort) = setup().await;
    user.set_cohort_code("STUDY2025").await?;
    user.set_subject_id("111111").await?;

    let update = cohort.submit("CHANGE2025", "222222").await;

    assert_eq!(
        update,
        Ok(CohortUpdate::Rejected {
            alert: Alert::invalid_cohort_code(),
        })
    );
    assert_eq!(user.cohort_code().await, "STUDY2025");
    assert_eq!(user.subject_id().await.as_deref(), Some("111111"));

    Ok(())
}

#[tokio::test]
async fn test_unknown_code_is_rejected() {
    let (_remote, user, cohort) = setup().await;

    let update = cohort.submit("NOPE", "").await;

    assert!(matches!(update, Ok(CohortUpdate::Rejected { .. })));
    assert_eq!(user.cohort_code().await, "PUBLIC");
}

#[tokio::test]
async fn test_empty_code_resets_to_default() -> Result<()> {
    let (_remote, user, cohort) = setup().await;
    user.set_cohort_code("STUDY2025").await?;

    let update = cohort.submit("   ", "654321").await;

    assert_eq!(
        update,
        Ok(CohortUpdate::Reset {
            code: "PUBLIC".to_string(),
            subject_id: "654321".to_string(),
        })
    );
    assert_eq!(user.cohort_code().await, "PUBLIC");
    assert_eq!(user.subject_id().await.as_deref(), Some("654321"));

    Ok(())
}

#[tokio::test]
async fn test_network_failure_keeps_cohort() -> Result<()> {
    let (remote, user, cohort) = setup().await;
    user.set_cohort_code("STUDY2025").await?;
    remote.set_offline(true);

    let update = cohort.submit("PUBLIC2", "").await;

    assert_eq!(update, Err(Alert::network_failed()));
    assert_eq!(user.cohort_code().await, "STUDY2025");

    Ok(())
}
