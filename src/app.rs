use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::catalog::CatalogResolver;
use crate::cohort::CohortService;
use crate::config::Config;
use crate::local::{FileKvStore, KeyValueStore, UserContext};
use crate::records::RecordService;
use crate::reminder::{NotificationContent, NotificationScheduler, ReminderService, TokioScheduler};
use crate::remote::{PostgrestStore, RemoteStore};

/// All services wired to one remote store, one local store and one scheduler
#[derive(Clone)]
pub struct App {
    pub user: UserContext,
    pub catalog: CatalogResolver,
    pub records: RecordService,
    pub cohort: CohortService,
    pub reminders: Arc<ReminderService>,
    pub scheduler: Arc<dyn NotificationScheduler>,
}

impl App {
    /// Production wiring: PostgREST backend, file store, tokio scheduler
    pub fn from_config(config: &Config) -> Result<Self> {
        let remote: Arc<dyn RemoteStore> = Arc::new(PostgrestStore::new(&config.backend)?);
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::in_dir(&config.storage.data_dir));
        let scheduler: Arc<dyn NotificationScheduler> = Arc::new(TokioScheduler::new());

        info!(
            "Local store at {}, default cohort {}",
            config.storage.data_dir.display(),
            config.cohort.default_code
        );

        Ok(Self::with_parts(
            remote,
            kv,
            scheduler,
            &config.cohort.default_code,
            NotificationContent {
                title: config.reminder.title.clone(),
                body: config.reminder.body.clone(),
            },
        ))
    }

    pub fn with_parts(
        remote: Arc<dyn RemoteStore>,
        kv: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn NotificationScheduler>,
        default_cohort: &str,
        reminder_content: NotificationContent,
    ) -> Self {
        let user = UserContext::new(Arc::clone(&kv), default_cohort);

        Self {
            catalog: CatalogResolver::new(Arc::clone(&remote)),
            records: RecordService::new(Arc::clone(&kv), Arc::clone(&remote), user.clone()),
            cohort: CohortService::new(remote, user.clone()),
            reminders: Arc::new(ReminderService::new(
                kv,
                Arc::clone(&scheduler),
                reminder_content,
            )),
            scheduler,
            user,
        }
    }
}
