use crate::application::services::{RecurrenceService, SchedulingService};
use crate::config::Config;
use crate::domain::ports::customer_repository::CustomerRepository;
use crate::domain::ports::distributed_lock::DistributedLock;
use crate::domain::ports::job_repository::JobRepository;
use crate::domain::ports::notification_sender::NotificationSender;
use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;
use crate::domain::ports::worker_repository::WorkerRepository;
use crate::infrastructure::http::middleware::AppState;
use crate::infrastructure::persistence::distributed_lock::DatabaseDistributedLock;
use crate::infrastructure::persistence::Database;
use crate::infrastructure::providers::{LogNotificationSender, SmtpNotificationSender};
use crate::infrastructure::runtime::{TokioTaskSpawner, TokioTimeService};
use crate::infrastructure::workers::RegenerationWorker;
use std::sync::Arc;
use std::time::Duration;

/// Pick the outbound notification channel from configuration
pub fn build_notifier(config: &Config) -> Arc<dyn NotificationSender> {
    match &config.smtp {
        Some(settings) => {
            tracing::info!(
                "Notification sender: SMTP via {}:{}",
                settings.host,
                settings.port
            );
            Arc::new(SmtpNotificationSender::new(settings.clone()))
        }
        None => {
            tracing::info!("Notification sender: log only (SMTP_HOST not set)");
            Arc::new(LogNotificationSender::new())
        }
    }
}

pub async fn build_app_state(
    db: Database,
    config: &Config,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let task_spawner = Arc::new(TokioTaskSpawner::new()) as Arc<dyn TaskSpawner>;
    let time_service = Arc::new(TokioTimeService::new()) as Arc<dyn TimeService>;

    let job_repo = Arc::new(db.clone()) as Arc<dyn JobRepository>;
    let worker_repo = Arc::new(db.clone()) as Arc<dyn WorkerRepository>;
    let customer_repo = Arc::new(db.clone()) as Arc<dyn CustomerRepository>;

    let scheduling_service = SchedulingService::new(
        worker_repo,
        job_repo.clone(),
        config.business_hours,
        config.slot_interval_minutes,
    );
    tracing::info!(
        "Scheduling service initialized ({}-minute slots)",
        config.slot_interval_minutes
    );

    if config.regeneration_enabled {
        let recurrence_service =
            RecurrenceService::new(job_repo, customer_repo, build_notifier(config));
        let lock = Arc::new(DatabaseDistributedLock::new(db.clone())) as Arc<dyn DistributedLock>;
        let worker = RegenerationWorker::new(
            recurrence_service,
            lock,
            time_service,
            config.business_timezone,
            Duration::from_secs(config.regeneration_check_interval_seconds),
        );
        task_spawner.spawn(Box::pin(async move {
            worker.run().await;
        }));
        tracing::info!("Regeneration worker started");
    } else {
        tracing::info!("Regeneration worker disabled");
    }

    Ok(AppState { scheduling_service })
}
