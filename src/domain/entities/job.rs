use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a scheduled service job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Scheduled => write!(f, "scheduled"),
            JobStatus::InProgress => write!(f, "in_progress"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "scheduled" => Ok(JobStatus::Scheduled),
            "in_progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" => Ok(JobStatus::Cancelled),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

/// One scheduled appointment instance, possibly the root of a recurring series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub customer_id: String,
    pub service_id: String,
    pub worker_id: Option<String>,
    pub address: Option<String>,
    pub price_cents: i64,
    pub duration_minutes: i64,
    pub scheduled_date_time: NaiveDateTime,
    pub status: JobStatus,
    pub is_recurring: bool,
    pub recurrence_descriptor: Option<String>,
    pub recurring_end_date: Option<NaiveDate>,
    pub next_billing_date: Option<NaiveDate>,
    pub last_regenerated_on: Option<NaiveDate>,
    pub parent_job_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Job {
    pub fn new(
        customer_id: String,
        service_id: String,
        worker_id: Option<String>,
        scheduled_date_time: NaiveDateTime,
        duration_minutes: i64,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id,
            service_id,
            worker_id,
            address: None,
            price_cents: 0,
            duration_minutes,
            scheduled_date_time,
            status: JobStatus::Pending,
            is_recurring: false,
            recurrence_descriptor: None,
            recurring_end_date: None,
            next_billing_date: None,
            last_regenerated_on: None,
            parent_job_id: None,
            notes: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Build the next pending occurrence of a recurring series.
    ///
    /// Durable fields (customer, service, address, pricing, worker, recurrence)
    /// are copied from `source`; the new row points back at it through
    /// `parent_job_id` and carries no billing date of its own.
    pub fn occurrence_of(source: &Job, scheduled_date_time: NaiveDateTime) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id: source.customer_id.clone(),
            service_id: source.service_id.clone(),
            worker_id: source.worker_id.clone(),
            address: source.address.clone(),
            price_cents: source.price_cents,
            duration_minutes: source.duration_minutes,
            scheduled_date_time,
            status: JobStatus::Pending,
            is_recurring: true,
            recurrence_descriptor: source.recurrence_descriptor.clone(),
            recurring_end_date: source.recurring_end_date,
            next_billing_date: None,
            last_regenerated_on: None,
            parent_job_id: Some(source.id.clone()),
            notes: source.notes.clone(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Date the next occurrence is computed from
    pub fn regeneration_anchor(&self) -> NaiveDate {
        self.next_billing_date
            .unwrap_or_else(|| self.scheduled_date_time.date())
    }

    /// True once the series end date lies strictly before `today`
    pub fn series_ended(&self, today: NaiveDate) -> bool {
        matches!(self.recurring_end_date, Some(end) if end < today)
    }
}

/// Partial update applied to a stored occurrence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccurrenceUpdate {
    pub is_recurring: Option<bool>,
    pub next_billing_date: Option<NaiveDate>,
    pub last_regenerated_on: Option<NaiveDate>,
}

impl OccurrenceUpdate {
    pub fn is_empty(&self) -> bool {
        self.is_recurring.is_none()
            && self.next_billing_date.is_none()
            && self.last_regenerated_on.is_none()
    }
}

/// Booked time of a job as seen by the slot generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub job_id: String,
    pub worker_id: Option<String>,
    pub start: NaiveDateTime,
    pub duration_minutes: i64,
    pub status: JobStatus,
}

impl Appointment {
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(self.duration_minutes.max(0))
    }

    /// Half-open overlap with `[start, end)`; the interval may cross midnight
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && self.end() > start
    }

    pub fn blocks_time(&self) -> bool {
        self.status != JobStatus::Cancelled
    }
}
