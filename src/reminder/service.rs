use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::scheduler::{NotificationContent, NotificationScheduler};
use super::settings::{ReminderSetting, TimeOfDay, QUICK_TIMES};
use crate::alert::Alert;
use crate::local::{keys, KeyValueStore};

/// Outcome of a reminder change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderUpdate {
    pub setting: ReminderSetting,
    /// Set when the change was saved but could not be scheduled
    pub alert: Option<Alert>,
}

/// Keeps the persisted reminder setting and the notification schedule in step
///
/// Every change cancels all schedules and then schedules at most one.
pub struct ReminderService {
    kv: Arc<dyn KeyValueStore>,
    scheduler: Arc<dyn NotificationScheduler>,
    content: NotificationContent,
    /// Serializes changes so the schedule always reflects the last one
    current: Mutex<Option<ReminderSetting>>,
}

impl ReminderService {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn NotificationScheduler>,
        content: NotificationContent,
    ) -> Self {
        Self {
            kv,
            scheduler,
            content,
            current: Mutex::new(None),
        }
    }

    /// Stored setting, or the default when missing or unreadable
    pub async fn load(&self) -> ReminderSetting {
        let mut current = self.current.lock().await;
        let setting = self.read_stored().await;
        *current = Some(setting);
        setting
    }

    pub async fn set_enabled(&self, enabled: bool) -> ReminderUpdate {
        let mut current = self.current.lock().await;
        let mut setting = match *current {
            Some(setting) => setting,
            None => self.read_stored().await,
        };
        setting.enabled = enabled;
        self.apply(&mut current, setting).await
    }

    pub async fn set_time(&self, time: TimeOfDay) -> ReminderUpdate {
        let mut current = self.current.lock().await;
        let mut setting = match *current {
            Some(setting) => setting,
            None => self.read_stored().await,
        };
        setting.time = time;
        self.apply(&mut current, setting).await
    }

    /// One-tap preset; ignored while reminders are off
    pub async fn apply_quick_time(&self, preset: &str) -> Result<ReminderUpdate> {
        if !QUICK_TIMES.contains(&preset) {
            anyhow::bail!("Unknown quick time '{}'", preset);
        }
        let time = TimeOfDay::parse(preset)?;

        let setting = self.load().await;
        if !setting.enabled {
            info!("Reminders are off, ignoring quick time {}", preset);
            return Ok(ReminderUpdate {
                setting,
                alert: None,
            });
        }

        Ok(self.set_time(time).await)
    }

    async fn apply(
        &self,
        current: &mut Option<ReminderSetting>,
        setting: ReminderSetting,
    ) -> ReminderUpdate {
        *current = Some(setting);

        if let Err(e) = self.persist(&setting).await {
            error!("Failed to save reminder setting: {:#}", e);
        }

        let alert = match self.reschedule(&setting).await {
            Ok(alert) => alert,
            Err(e) => {
                error!("Failed to update reminder schedule: {:#}", e);
                None
            }
        };

        ReminderUpdate { setting, alert }
    }

    async fn reschedule(&self, setting: &ReminderSetting) -> Result<Option<Alert>> {
        self.scheduler
            .cancel_all()
            .await
            .context("Failed to cancel reminders")?;

        if !setting.enabled {
            info!("Reminders disabled, all schedules cancelled");
            return Ok(None);
        }

        if !self.scheduler.request_permission().await? {
            warn!("Notification permission denied, reminder saved but not scheduled");
            return Ok(Some(Alert::notification_permission_denied()));
        }

        self.scheduler
            .schedule_daily(setting.time, self.content.clone())
            .await
            .context("Failed to schedule reminder")?;

        Ok(None)
    }

    async fn persist(&self, setting: &ReminderSetting) -> Result<()> {
        let json = serde_json::to_string(setting)?;
        self.kv.set(keys::REMINDER_SETTINGS, &json).await
    }

    async fn read_stored(&self) -> ReminderSetting {
        match self.kv.get(keys::REMINDER_SETTINGS).await {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Stored reminder setting is unreadable, using default: {}", e);
                ReminderSetting::default()
            }),
            Ok(None) => ReminderSetting::default(),
            Err(e) => {
                warn!("Failed to read reminder setting: {:#}", e);
                ReminderSetting::default()
            }
        }
    }
}
