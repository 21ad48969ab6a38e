use anyhow::Result;
use chrono::{DateTime, Duration, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::settings::TimeOfDay;

/// Title and body of a reminder notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

/// A repeating daily notification currently scheduled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledNotification {
    pub id: String,
    pub time: TimeOfDay,
    pub content: NotificationContent,
}

/// System notification scheduler
///
/// `cancel_all` is the only way to revoke schedules.
#[async_trait::async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// Ask for (or confirm) permission to post notifications
    async fn request_permission(&self) -> Result<bool>;

    async fn cancel_all(&self) -> Result<()>;

    /// Schedule a notification repeating every day at `time`; returns its id
    async fn schedule_daily(&self, time: TimeOfDay, content: NotificationContent) -> Result<String>;

    async fn scheduled(&self) -> Vec<ScheduledNotification>;
}

/// Scheduler running one tokio task per daily notification
///
/// Delivered notifications are logged and broadcast to subscribers.
pub struct TokioScheduler {
    permitted: AtomicBool,
    entries: Mutex<Vec<(ScheduledNotification, JoinHandle<()>)>>,
    delivered: broadcast::Sender<NotificationContent>,
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TokioScheduler {
    pub fn new() -> Self {
        let (delivered, _) = broadcast::channel(16);
        Self {
            permitted: AtomicBool::new(true),
            entries: Mutex::new(Vec::new()),
            delivered,
        }
    }

    /// Grant or deny notification permission
    pub fn set_permitted(&self, permitted: bool) {
        self.permitted.store(permitted, Ordering::SeqCst);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationContent> {
        self.delivered.subscribe()
    }
}

#[async_trait::async_trait]
impl NotificationScheduler for TokioScheduler {
    async fn request_permission(&self) -> Result<bool> {
        Ok(self.permitted.load(Ordering::SeqCst))
    }

    async fn cancel_all(&self) -> Result<()> {
        let mut entries = self.entries.lock().await;
        for (entry, task) in entries.drain(..) {
            task.abort();
            debug!("Cancelled reminder {} at {}", entry.id, entry.time);
        }
        Ok(())
    }

    async fn schedule_daily(&self, time: TimeOfDay, content: NotificationContent) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let delivered = self.delivered.clone();
        let task_content = content.clone();

        let task = tokio::spawn(async move {
            loop {
                let now = Local::now();
                let Some(next) = next_occurrence(&now, time) else {
                    break;
                };
                let wait = (next - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                info!("Reminder: {} {}", task_content.title, task_content.body);
                // No subscribers is fine
                let _ = delivered.send(task_content.clone());
            }
        });

        info!("Reminder scheduled daily at {}", time);

        self.entries.lock().await.push((
            ScheduledNotification {
                id: id.clone(),
                time,
                content,
            },
            task,
        ));

        Ok(id)
    }

    async fn scheduled(&self) -> Vec<ScheduledNotification> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|(entry, _)| entry.clone())
            .collect()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.entries.get_mut().drain(..) {
            task.abort();
        }
    }
}

/// First instant strictly after `now` whose wall-clock time is `time`
pub fn next_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, time: TimeOfDay) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    (0..=2).find_map(|offset| {
        let date = now.date_naive() + Duration::days(offset);
        let naive = date.and_hms_opt(time.hour as u32, time.minute as u32, 0)?;
        let candidate = tz.from_local_datetime(&naive).earliest()?;
        (candidate > *now).then_some(candidate)
    })
}
