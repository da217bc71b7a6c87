use crate::domain::{
    entities::{Slot, TimeRange, WorkerFilter},
    errors::{DomainError, DomainResult},
    ports::{job_repository::JobRepository, worker_repository::WorkerRepository},
    services::slots::{generate_slots, SlotRequest},
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::sync::Arc;

const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// Inputs of a slot query from the booking surface
#[derive(Debug, Clone, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub worker_id: Option<String>,
    pub service_id: Option<String>,
}

/// Computes bookable slots and re-checks conflicts for the booking path
#[derive(Clone)]
pub struct SchedulingService {
    worker_repo: Arc<dyn WorkerRepository>,
    job_repo: Arc<dyn JobRepository>,
    business_hours: TimeRange,
    interval_minutes: u32,
}

impl SchedulingService {
    pub fn new(
        worker_repo: Arc<dyn WorkerRepository>,
        job_repo: Arc<dyn JobRepository>,
        business_hours: TimeRange,
        interval_minutes: u32,
    ) -> Self {
        Self {
            worker_repo,
            job_repo,
            business_hours,
            interval_minutes,
        }
    }

    /// Bookable slots for a day.
    ///
    /// Reads the worker roster and the day's appointments once, then computes
    /// over that snapshot. The result is a point-in-time view: a returned slot
    /// can still be taken by a concurrent booking, which is why bookings go
    /// through [`SchedulingService::ensure_no_conflict`] before persisting.
    pub async fn available_slots(&self, query: &SlotQuery) -> DomainResult<Vec<Slot>> {
        validate_duration(query.duration_minutes)?;

        let filter = WorkerFilter {
            service_id: query.service_id.clone(),
        };
        let workers = self.worker_repo.list_active_workers(&filter).await?;
        let appointments = self.job_repo.find_appointments_for_date(query.date).await?;

        let request = SlotRequest {
            date: query.date,
            duration_minutes: query.duration_minutes,
            worker_id: query.worker_id.clone(),
            business_hours: self.business_hours,
            interval_minutes: self.interval_minutes,
        };
        let slots = generate_slots(&request, &workers, &appointments);

        tracing::debug!(
            date = %query.date,
            duration = query.duration_minutes,
            workers = workers.len(),
            appointments = appointments.len(),
            slots = slots.len(),
            "Generated availability slots"
        );

        Ok(slots)
    }

    /// Fail with `Conflict` when `worker_id` already has an overlapping appointment.
    ///
    /// Intervals are compared as absolute date-times, so bookings on either
    /// side of midnight are checked against each other.
    pub async fn ensure_no_conflict(
        &self,
        worker_id: &str,
        start: NaiveDateTime,
        duration_minutes: u32,
    ) -> DomainResult<()> {
        validate_duration(duration_minutes)?;

        let end = start + Duration::minutes(i64::from(duration_minutes));
        // Appointments are at most a day long, so one starting the day before may still be running
        let from = start.date().pred_opt().unwrap_or(start.date());

        let appointments = self
            .job_repo
            .find_appointments_for_worker(worker_id, from, end.date())
            .await?;

        if let Some(existing) = appointments
            .iter()
            .filter(|a| a.blocks_time())
            .find(|a| a.overlaps(start, end))
        {
            return Err(DomainError::Conflict(format!(
                "Worker {} already has job {} at {}",
                worker_id, existing.job_id, existing.start
            )));
        }

        Ok(())
    }
}

fn validate_duration(duration_minutes: u32) -> DomainResult<()> {
    if duration_minutes == 0 || duration_minutes > MAX_DURATION_MINUTES {
        return Err(DomainError::ValidationError(format!(
            "Duration must be between 1 and {} minutes",
            MAX_DURATION_MINUTES
        )));
    }
    Ok(())
}
