use crate::domain::entities::{Appointment, Job, OccurrenceUpdate};
use crate::domain::errors::DomainResult;
use chrono::NaiveDate;

/// Repository for scheduled jobs and their recurring series
#[async_trait::async_trait]
pub trait JobRepository: Send + Sync {
    /// Completed, recurring series roots whose next billing date is on or before `as_of`
    /// and that were not already regenerated on `as_of`
    async fn find_due_recurring_jobs(&self, as_of: NaiveDate) -> DomainResult<Vec<Job>>;

    /// Persist a newly created occurrence
    async fn insert_occurrence(&self, job: &Job) -> DomainResult<()>;

    /// Apply a partial update to an existing occurrence
    async fn update_occurrence(&self, job_id: &str, update: &OccurrenceUpdate) -> DomainResult<()>;

    /// Persist `occurrence` and apply `update` to its source `source_id` atomically:
    /// either both writes land or neither does
    async fn record_occurrence(
        &self,
        source_id: &str,
        occurrence: &Job,
        update: &OccurrenceUpdate,
    ) -> DomainResult<()>;

    /// Non-cancelled appointments that can occupy time on `date`: those starting
    /// on `date` or on the day before
    async fn find_appointments_for_date(&self, date: NaiveDate) -> DomainResult<Vec<Appointment>>;

    /// Non-cancelled appointments of one worker starting between `from` and `to`, inclusive
    async fn find_appointments_for_worker(
        &self,
        worker_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<Appointment>>;
}
