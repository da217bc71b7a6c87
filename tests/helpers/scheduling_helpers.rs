use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fieldbook::config::Config;
use fieldbook::domain::entities::{CustomerContact, Job, JobStatus, OccurrenceNotification};
use fieldbook::domain::ports::notification_sender::NotificationSender;
use fieldbook::domain::ports::time_service::TimeService;
use fieldbook::infrastructure::persistence::Database;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn date_time(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").unwrap()
}

/// Defaults with the background worker switched off
pub fn test_config() -> Config {
    let mut config = Config::from_lookup(|_| None).unwrap();
    config.regeneration_enabled = false;
    config
}

pub async fn create_test_customer(db: &Database, name: &str) -> String {
    let customer_id = uuid::Uuid::new_v4().to_string();
    db.create_customer(&CustomerContact {
        customer_id: customer_id.clone(),
        name: name.to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: None,
    })
    .await
    .expect("Failed to create test customer");
    customer_id
}

pub async fn create_test_worker(
    db: &Database,
    name: &str,
    availability: Option<Value>,
    service_ids: &[&str],
) -> String {
    let raw = availability.map(|value| value.to_string());
    db.create_worker(name, raw.as_deref(), service_ids)
        .await
        .expect("Failed to create test worker")
}

/// Insert a scheduled appointment for `worker_id`
pub async fn book_job(
    db: &Database,
    customer_id: &str,
    worker_id: Option<&str>,
    start: &str,
    duration_minutes: i64,
) -> Job {
    let mut job = Job::new(
        customer_id.to_string(),
        "lawn-care".to_string(),
        worker_id.map(str::to_string),
        date_time(start),
        duration_minutes,
    );
    job.status = JobStatus::Scheduled;
    db.create_job(&job).await.expect("Failed to book job");
    job
}

/// Insert a completed recurring series root
pub async fn create_recurring_series(
    db: &Database,
    customer_id: &str,
    descriptor: &str,
    scheduled: &str,
    end_date: Option<NaiveDate>,
) -> Job {
    let mut job = Job::new(
        customer_id.to_string(),
        "lawn-care".to_string(),
        None,
        date_time(scheduled),
        60,
    );
    job.status = JobStatus::Completed;
    job.is_recurring = true;
    job.recurrence_descriptor = Some(descriptor.to_string());
    job.recurring_end_date = end_date;
    job.address = Some("12 Elm St".to_string());
    db.create_job(&job)
        .await
        .expect("Failed to create recurring series");
    job
}

/// Clock pinned to a fixed instant; sleeping returns immediately
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(rfc3339: &str) -> Self {
        Self {
            now: Mutex::new(
                DateTime::parse_from_rfc3339(rfc3339)
                    .unwrap()
                    .with_timezone(&Utc),
            ),
        }
    }

    pub fn set(&self, rfc3339: &str) {
        *self.now.lock().unwrap() = DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc);
    }
}

#[async_trait]
impl TimeService for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, _duration: Duration) {}
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(CustomerContact, OccurrenceNotification)>>,
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send(
        &self,
        contact: &CustomerContact,
        notification: &OccurrenceNotification,
    ) -> Result<(), String> {
        self.sent
            .lock()
            .unwrap()
            .push((contact.clone(), notification.clone()));
        Ok(())
    }
}
