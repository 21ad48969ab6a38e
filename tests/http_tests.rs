// Integration tests for the HTTP API
//
// These tests drive the router in-process with `oneshot` against an
// in-memory backend.

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use practice_companion::local::{KeyValueStore, MemoryKvStore};
use practice_companion::reminder::{NotificationContent, NotificationScheduler, TokioScheduler};
use practice_companion::remote::{AudioRow, MemoryStore, RemoteStore};
use practice_companion::{create_router, App, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn test_router() -> Router {
    let remote = Arc::new(MemoryStore::new());
    remote.add_category("breath", "呼吸", 1).await;
    remote
        .add_audio(AudioRow {
            id: 1,
            title: "Box Breathing".to_string(),
            description: None,
            url: Some("https://cdn.example/1.mp3".to_string()),
            duration: Some(300),
            category: Some("breath".to_string()),
            cover_url: None,
            difficulty: None,
        })
        .await;
    remote.map_audio("PUBLIC", 1).await;
    remote.add_study_code("STUDY2025", "Spring cohort", true).await;
    remote.add_study_code("CHANGE2025", "Retired cohort", false).await;

    let remote: Arc<dyn RemoteStore> = remote;
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let scheduler: Arc<dyn NotificationScheduler> = Arc::new(TokioScheduler::new());
    let app = App::with_parts(
        remote,
        kv,
        scheduler,
        "PUBLIC",
        NotificationContent {
            title: "练习".to_string(),
            body: "提醒".to_string(),
        },
    );

    create_router(AppState::new(app))
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&value)?)
        }
        None => Body::empty(),
    };

    let response = router.clone().oneshot(builder.body(body)?).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    Ok((status, value))
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let router = test_router().await;

    let (status, body) = send(&router, "GET", "/health", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
    Ok(())
}

#[tokio::test]
async fn test_catalog_endpoints() -> Result<()> {
    let router = test_router().await;

    let (status, body) = send(&router, "GET", "/catalog", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cohort"], "PUBLIC");
    assert_eq!(body["categories"][0]["key"], "all");
    assert_eq!(body["items"][0]["category_label"], "呼吸");
    assert_eq!(body["empty"], false);

    let (_, body) = send(&router, "GET", "/catalog?category=sleep", None).await?;
    assert_eq!(body["empty"], true);

    let (status, body) = send(&router, "GET", "/catalog/recommendation", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["id"], "1");
    assert_eq!(body["item"]["description"], "每日精选正念练习");

    Ok(())
}

#[tokio::test]
async fn test_playback_finish_emits_route_once_and_drops_session() -> Result<()> {
    let router = test_router().await;

    let (status, body) = send(
        &router,
        "POST",
        "/playback/start",
        Some(json!({ "audio_id": "1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "playing");
    let id = body["session_id"].as_str().unwrap_or_default().to_string();

    let (_, body) = send(&router, "POST", &format!("/playback/{}/pause", id), None).await?;
    assert_eq!(body["status"], "paused");

    let (_, body) = send(&router, "POST", &format!("/playback/{}/resume", id), None).await?;
    assert_eq!(body["status"], "playing");

    let (_, first) = send(&router, "POST", &format!("/playback/{}/finish", id), None).await?;
    assert_eq!(first["route"]["screen"], "record_entry");
    assert_eq!(first["route"]["audio_id"], "1");

    let (status, _) = send(&router, "POST", &format!("/playback/{}/finish", id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, "GET", &format!("/playback/{}", id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_playback_exit_discards_session() -> Result<()> {
    let router = test_router().await;

    let (_, body) = send(
        &router,
        "POST",
        "/playback/start",
        Some(json!({ "audio_id": "1" })),
    )
    .await?;
    let id = body["session_id"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(&router, "POST", &format!("/playback/{}/exit", id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["screen"], "back");

    let (status, body) = send(&router, "GET", &format!("/playback/{}", id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap_or_default().contains("not found"));

    Ok(())
}

#[tokio::test]
async fn test_records_round_trip() -> Result<()> {
    let router = test_router().await;

    let (status, body) = send(
        &router,
        "POST",
        "/records",
        Some(json!({
            "audio_id": "1",
            "practice_duration_seconds": 420,
            "anxiety_rating": 35,
            "description": "呼吸顺畅",
            "tags": ["平静"]
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["duration"], 7);
    assert_eq!(body["description"], "呼吸顺畅 #平静");

    let (_, body) = send(&router, "GET", "/records", None).await?;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["practice_type"], "平静");

    let (_, body) = send(&router, "GET", "/records/stats", None).await?;
    assert_eq!(body["total_practice_count"], 1);
    assert_eq!(body["total_practice_minutes"], 7);

    Ok(())
}

#[tokio::test]
async fn test_record_tags_are_selected_once() -> Result<()> {
    let router = test_router().await;

    let (status, body) = send(
        &router,
        "POST",
        "/records",
        Some(json!({
            "audio_id": "1",
            "practice_duration_seconds": 120,
            "description": "很平静 #平静",
            "tags": ["平静", "平静"]
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tags"], json!(["平静"]));
    assert_eq!(body["description"], "很平静 #平静");

    Ok(())
}

#[tokio::test]
async fn test_reminder_update() -> Result<()> {
    let router = test_router().await;

    let (_, body) = send(&router, "GET", "/reminder", None).await?;
    assert_eq!(body, json!({ "enabled": false, "hour": 20, "minute": 0 }));

    let (status, body) = send(
        &router,
        "PUT",
        "/reminder",
        Some(json!({ "enabled": true, "time": "07:30" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["setting"], json!({ "enabled": true, "hour": 7, "minute": 30 }));
    assert_eq!(body["alert"], Value::Null);

    let (status, _) = send(
        &router,
        "PUT",
        "/reminder",
        Some(json!({ "time": "25:00" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_cohort_submission() -> Result<()> {
    let router = test_router().await;

    let (status, body) = send(
        &router,
        "POST",
        "/profile/cohort",
        Some(json!({ "code": "CHANGE2025", "subject_id": "123456" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["outcome"], "rejected");

    let (_, body) = send(&router, "GET", "/profile", None).await?;
    assert_eq!(body["cohort_code"], "PUBLIC");
    assert_eq!(body["subject_id"], Value::Null);

    let (status, body) = send(
        &router,
        "POST",
        "/profile/cohort",
        Some(json!({ "code": "study2025", "subject_id": "123456" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "verified");

    let (_, body) = send(&router, "GET", "/profile", None).await?;
    assert_eq!(body["cohort_code"], "STUDY2025");
    assert_eq!(body["subject_id"], "123456");

    Ok(())
}
