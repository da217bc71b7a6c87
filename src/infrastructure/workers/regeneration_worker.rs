use chrono::NaiveDate;
use chrono_tz::Tz;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};

use crate::application::services::{RecurrenceService, RegenerationReport};
use crate::domain::ports::distributed_lock::DistributedLock;
use crate::domain::ports::time_service::TimeService;

const LOCK_PREFIX: &str = "recurrence_regeneration";
/// A day's lock outlives the day so no instance repeats it
const LOCK_TTL_SECONDS: u64 = 36 * 60 * 60;

/// Triggers recurrence regeneration once per business day
pub struct RegenerationWorker {
    recurrence_service: RecurrenceService,
    lock: Arc<dyn DistributedLock>,
    time_service: Arc<dyn TimeService>,
    timezone: Tz,
    check_interval: Duration,
    owner: String,
    last_run_on: Mutex<Option<NaiveDate>>,
}

impl RegenerationWorker {
    pub fn new(
        recurrence_service: RecurrenceService,
        lock: Arc<dyn DistributedLock>,
        time_service: Arc<dyn TimeService>,
        timezone: Tz,
        check_interval: Duration,
    ) -> Self {
        Self {
            recurrence_service,
            lock,
            time_service,
            timezone,
            check_interval,
            owner: uuid::Uuid::new_v4().to_string(),
            last_run_on: Mutex::new(None),
        }
    }

    pub async fn run(&self) {
        info!(
            "Starting RegenerationWorker (timezone {}, every {:?})...",
            self.timezone, self.check_interval
        );
        loop {
            if let Err(e) = self.run_once().await {
                error!("Recurrence regeneration failed: {}", e);
            }
            self.time_service.sleep(self.check_interval).await;
        }
    }

    /// Business-local calendar date
    pub fn today(&self) -> NaiveDate {
        self.time_service
            .now()
            .with_timezone(&self.timezone)
            .date_naive()
    }

    /// Regenerate today's due series unless this or another instance already did.
    ///
    /// Returns `Ok(None)` when there was nothing to trigger.
    pub async fn run_once(&self) -> Result<Option<RegenerationReport>, String> {
        let today = self.today();
        if self.already_ran(today) {
            return Ok(None);
        }

        let key = format!("{}:{}", LOCK_PREFIX, today);
        let acquired = self
            .lock
            .acquire(&key, &self.owner, LOCK_TTL_SECONDS)
            .await
            .map_err(|e| e.to_string())?;

        if !acquired {
            info!("Regeneration for {} already claimed by another instance", today);
            self.mark_ran(today);
            return Ok(None);
        }

        match self.recurrence_service.regenerate_due(today).await {
            Ok(report) => {
                self.mark_ran(today);
                Ok(Some(report))
            }
            Err(e) => {
                // Give the day back so the next check retries it
                if let Err(release_err) = self.lock.release(&key, &self.owner).await {
                    error!("Failed to release lock {}: {}", key, release_err);
                }
                Err(e.to_string())
            }
        }
    }

    fn already_ran(&self, today: NaiveDate) -> bool {
        self.last_run_on
            .lock()
            .map(|last| *last == Some(today))
            .unwrap_or(false)
    }

    fn mark_ran(&self, today: NaiveDate) {
        if let Ok(mut last) = self.last_run_on.lock() {
            *last = Some(today);
        }
    }
}
