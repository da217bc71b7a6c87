use crate::domain::{
    entities::{Job, OccurrenceNotification, OccurrenceUpdate},
    errors::DomainResult,
    ports::{
        customer_repository::CustomerRepository, job_repository::JobRepository,
        notification_sender::NotificationSender,
    },
    services::frequency::next_occurrence,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome counts of one regeneration run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegenerationReport {
    pub examined: usize,
    pub created: usize,
    pub terminated: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug)]
enum Outcome {
    Created(Job),
    Terminated,
    Unparseable,
}

/// Advances due recurring series into their next occurrence.
///
/// Meant to be triggered once per calendar day. Runs must be serialized by the
/// caller; within a day, re-runs are no-ops because each regenerated source is
/// stamped with `last_regenerated_on`.
#[derive(Clone)]
pub struct RecurrenceService {
    job_repo: Arc<dyn JobRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    notifier: Arc<dyn NotificationSender>,
}

impl RecurrenceService {
    pub fn new(
        job_repo: Arc<dyn JobRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            job_repo,
            customer_repo,
            notifier,
        }
    }

    /// Regenerate every series due on or before `today`.
    ///
    /// Only the initial lookup can fail the run; each series is processed
    /// best-effort and a failed one stays due for the next trigger.
    pub async fn regenerate_due(&self, today: NaiveDate) -> DomainResult<RegenerationReport> {
        let due = self.job_repo.find_due_recurring_jobs(today).await?;
        let mut report = RegenerationReport::default();

        if due.is_empty() {
            info!("No recurring jobs due on {}", today);
            return Ok(report);
        }

        info!("Found {} recurring jobs due on {}", due.len(), today);

        for job in due {
            report.examined += 1;

            match self.regenerate_job(&job, today).await {
                Ok(Outcome::Created(occurrence)) => {
                    report.created += 1;
                    metrics::counter!("recurring_occurrences_created_total").increment(1);
                    info!(
                        "Created occurrence {} of series {} for {}",
                        occurrence.id, job.id, occurrence.scheduled_date_time
                    );
                }
                Ok(Outcome::Terminated) => {
                    report.terminated += 1;
                    metrics::counter!("recurring_series_terminated_total").increment(1);
                    info!("Recurring series {} reached its end date", job.id);
                }
                Ok(Outcome::Unparseable) => {
                    report.skipped += 1;
                    warn!(
                        "Skipping series {}: unparseable frequency {:?}",
                        job.id, job.recurrence_descriptor
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    metrics::counter!("recurring_regeneration_failures_total").increment(1);
                    error!("Failed to regenerate series {}: {}", job.id, e);
                }
            }
        }

        info!(
            "Regeneration for {} finished: {} examined, {} created, {} terminated, {} skipped, {} failed",
            today, report.examined, report.created, report.terminated, report.skipped, report.failed
        );

        Ok(report)
    }

    async fn regenerate_job(&self, job: &Job, today: NaiveDate) -> DomainResult<Outcome> {
        if job.series_ended(today) {
            self.terminate(job).await?;
            return Ok(Outcome::Terminated);
        }

        let descriptor = job.recurrence_descriptor.as_deref();
        let Some(next_date) = next_occurrence(descriptor, job.regeneration_anchor()) else {
            return Ok(Outcome::Unparseable);
        };

        if matches!(job.recurring_end_date, Some(end) if next_date > end) {
            self.terminate(job).await?;
            return Ok(Outcome::Terminated);
        }

        let scheduled = next_date.and_time(job.scheduled_date_time.time());
        let occurrence = Job::occurrence_of(job, scheduled);

        // The source keeps its own date; its billing date follows the occurrence
        // just created so the next cycle anchors on it.
        let update = OccurrenceUpdate {
            next_billing_date: Some(next_date),
            last_regenerated_on: Some(today),
            ..Default::default()
        };
        self.job_repo
            .record_occurrence(&job.id, &occurrence, &update)
            .await?;

        self.notify_customer(job, &occurrence).await;

        Ok(Outcome::Created(occurrence))
    }

    async fn terminate(&self, job: &Job) -> DomainResult<()> {
        let update = OccurrenceUpdate {
            is_recurring: Some(false),
            ..Default::default()
        };
        self.job_repo.update_occurrence(&job.id, &update).await
    }

    /// Best effort: failures are logged and never undo the created occurrence
    async fn notify_customer(&self, source: &Job, occurrence: &Job) {
        let contact = match self
            .customer_repo
            .get_customer_contact(&source.customer_id)
            .await
        {
            Ok(Some(contact)) => contact,
            Ok(None) => {
                warn!(
                    "No contact for customer {}; occurrence {} not announced",
                    source.customer_id, occurrence.id
                );
                return;
            }
            Err(e) => {
                warn!("Failed to load customer {}: {}", source.customer_id, e);
                return;
            }
        };

        let notification = OccurrenceNotification {
            job_id: occurrence.id.clone(),
            series_id: source.id.clone(),
            service_id: occurrence.service_id.clone(),
            scheduled_for: occurrence.scheduled_date_time,
            address: occurrence.address.clone(),
        };

        if let Err(e) = self.notifier.send(&contact, &notification).await {
            warn!(
                "Failed to notify customer {} about occurrence {}: {}",
                source.customer_id, occurrence.id, e
            );
        }
    }
}
