use crate::domain::entities::{Appointment, Job, JobStatus, OccurrenceUpdate};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::job_repository::JobRepository;
use crate::infrastructure::persistence::{
    optional_string, parse_stored_date, parse_stored_date_time, Database, DATE_FORMAT,
    DATE_TIME_FORMAT,
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use sqlx::{
    any::{AnyArguments, AnyRow},
    query::Query,
    Any, Row,
};

type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

const JOB_COLUMNS: &str = "id, customer_id, service_id, worker_id, address, price_cents, \
     duration_minutes, scheduled_date_time, status, is_recurring, recurrence_descriptor, \
     recurring_end_date, next_billing_date, last_regenerated_on, parent_job_id, notes, \
     created_at, updated_at";

fn date_param(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn optional_date(row: &AnyRow, column: &str) -> DomainResult<Option<NaiveDate>> {
    optional_string(row, column)
        .map(|value| parse_stored_date(column, &value))
        .transpose()
}

fn job_from_row(row: &AnyRow) -> DomainResult<Job> {
    let status: String = row.try_get("status")?;
    let scheduled: String = row.try_get("scheduled_date_time")?;

    Ok(Job {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        service_id: row.try_get("service_id")?,
        worker_id: optional_string(row, "worker_id"),
        address: optional_string(row, "address"),
        price_cents: row.try_get("price_cents")?,
        duration_minutes: row.try_get("duration_minutes")?,
        scheduled_date_time: parse_stored_date_time("scheduled_date_time", &scheduled)?,
        status: status.parse().map_err(DomainError::Internal)?,
        is_recurring: row.try_get::<i64, _>("is_recurring")? != 0,
        recurrence_descriptor: optional_string(row, "recurrence_descriptor"),
        recurring_end_date: optional_date(row, "recurring_end_date")?,
        next_billing_date: optional_date(row, "next_billing_date")?,
        last_regenerated_on: optional_date(row, "last_regenerated_on")?,
        parent_job_id: optional_string(row, "parent_job_id"),
        notes: optional_string(row, "notes"),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn appointment_from_row(row: &AnyRow) -> DomainResult<Appointment> {
    let status: String = row.try_get("status")?;
    let start: String = row.try_get("scheduled_date_time")?;

    Ok(Appointment {
        job_id: row.try_get("id")?,
        worker_id: optional_string(row, "worker_id"),
        start: parse_stored_date_time("scheduled_date_time", &start)?,
        duration_minutes: row.try_get("duration_minutes")?,
        status: status.parse::<JobStatus>().map_err(DomainError::Internal)?,
    })
}

/// `[start of from, start of the day after to)` as stored timestamps
fn day_range_bounds(from: NaiveDate, to: NaiveDate) -> (String, String) {
    let start = from.and_hms_opt(0, 0, 0).unwrap_or_default();
    let end = to.and_hms_opt(0, 0, 0).unwrap_or_default() + Duration::days(1);
    (
        start.format(DATE_TIME_FORMAT).to_string(),
        end.format(DATE_TIME_FORMAT).to_string(),
    )
}

fn insert_job_query(job: &Job) -> AnyQuery<'_> {
    sqlx::query(
        "INSERT INTO jobs (id, customer_id, service_id, worker_id, address, price_cents,
                           duration_minutes, scheduled_date_time, status, is_recurring,
                           recurrence_descriptor, recurring_end_date, next_billing_date,
                           last_regenerated_on, parent_job_id, notes, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&job.id)
    .bind(&job.customer_id)
    .bind(&job.service_id)
    .bind(&job.worker_id)
    .bind(&job.address)
    .bind(job.price_cents)
    .bind(job.duration_minutes)
    .bind(job.scheduled_date_time.format(DATE_TIME_FORMAT).to_string())
    .bind(job.status.to_string())
    .bind(i64::from(job.is_recurring))
    .bind(&job.recurrence_descriptor)
    .bind(date_param(job.recurring_end_date))
    .bind(date_param(job.next_billing_date))
    .bind(date_param(job.last_regenerated_on))
    .bind(&job.parent_job_id)
    .bind(&job.notes)
    .bind(&job.created_at)
    .bind(&job.updated_at)
}

fn occurrence_update_sql(update: &OccurrenceUpdate) -> String {
    let mut query_parts = Vec::new();
    if update.is_recurring.is_some() {
        query_parts.push("is_recurring = ?");
    }
    if update.next_billing_date.is_some() {
        query_parts.push("next_billing_date = ?");
    }
    if update.last_regenerated_on.is_some() {
        query_parts.push("last_regenerated_on = ?");
    }
    query_parts.push("updated_at = ?");

    format!("UPDATE jobs SET {} WHERE id = ?", query_parts.join(", "))
}

fn occurrence_update_query<'q>(
    sql: &'q str,
    job_id: &'q str,
    update: &OccurrenceUpdate,
) -> AnyQuery<'q> {
    let mut query = sqlx::query(sql);
    if let Some(flag) = update.is_recurring {
        query = query.bind(i64::from(flag));
    }
    if let Some(date) = update.next_billing_date {
        query = query.bind(date.format(DATE_FORMAT).to_string());
    }
    if let Some(date) = update.last_regenerated_on {
        query = query.bind(date.format(DATE_FORMAT).to_string());
    }
    query.bind(chrono::Utc::now().to_rfc3339()).bind(job_id)
}

fn job_not_found(job_id: &str) -> DomainError {
    DomainError::NotFound(format!("Job {} not found", job_id))
}

impl Database {
    /// Insert a job row
    pub async fn create_job(&self, job: &Job) -> DomainResult<()> {
        insert_job_query(job).execute(&self.pool).await?;
        Ok(())
    }

    /// Get job by ID
    pub async fn get_job(&self, job_id: &str) -> DomainResult<Option<Job>> {
        let query = format!("SELECT {} FROM jobs WHERE id = ?", JOB_COLUMNS);
        let row = sqlx::query(&query)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    /// Jobs created from a recurring series root
    pub async fn list_series_occurrences(&self, parent_job_id: &str) -> DomainResult<Vec<Job>> {
        let query = format!(
            "SELECT {} FROM jobs WHERE parent_job_id = ? ORDER BY scheduled_date_time ASC",
            JOB_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(parent_job_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(job_from_row).collect()
    }

    /// Update job status
    pub async fn update_job_status(&self, job_id: &str, status: JobStatus) -> DomainResult<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query("UPDATE jobs SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(&now)
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(job_not_found(job_id));
        }

        Ok(())
    }
}

#[async_trait]
impl JobRepository for Database {
    async fn find_due_recurring_jobs(&self, as_of: NaiveDate) -> DomainResult<Vec<Job>> {
        let as_of = as_of.format(DATE_FORMAT).to_string();
        let query = format!(
            "SELECT {} FROM jobs
             WHERE is_recurring = 1
               AND status = 'completed'
               AND parent_job_id IS NULL
               AND COALESCE(next_billing_date, substr(scheduled_date_time, 1, 10)) <= ?
               AND (last_regenerated_on IS NULL OR last_regenerated_on <> ?)
             ORDER BY scheduled_date_time ASC",
            JOB_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(&as_of)
            .bind(&as_of)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(job_from_row).collect()
    }

    async fn insert_occurrence(&self, job: &Job) -> DomainResult<()> {
        self.create_job(job).await
    }

    async fn update_occurrence(&self, job_id: &str, update: &OccurrenceUpdate) -> DomainResult<()> {
        if update.is_empty() {
            return Ok(());
        }

        let sql = occurrence_update_sql(update);
        let result = occurrence_update_query(&sql, job_id, update)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(job_not_found(job_id));
        }

        Ok(())
    }

    async fn record_occurrence(
        &self,
        source_id: &str,
        occurrence: &Job,
        update: &OccurrenceUpdate,
    ) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        insert_job_query(occurrence).execute(&mut *tx).await?;

        if !update.is_empty() {
            let sql = occurrence_update_sql(update);
            let result = occurrence_update_query(&sql, source_id, update)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back the insert
                return Err(job_not_found(source_id));
            }
        }

        tx.commit().await?;

        Ok(())
    }

    async fn find_appointments_for_date(&self, date: NaiveDate) -> DomainResult<Vec<Appointment>> {
        // Appointments that started the day before can run past midnight
        let from = date.pred_opt().unwrap_or(date);
        let (start, end) = day_range_bounds(from, date);
        let rows = sqlx::query(
            "SELECT id, worker_id, scheduled_date_time, duration_minutes, status
             FROM jobs
             WHERE scheduled_date_time >= ? AND scheduled_date_time < ?
               AND status <> 'cancelled'
             ORDER BY scheduled_date_time ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(appointment_from_row).collect()
    }

    async fn find_appointments_for_worker(
        &self,
        worker_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<Appointment>> {
        let (start, end) = day_range_bounds(from, to);
        let rows = sqlx::query(
            "SELECT id, worker_id, scheduled_date_time, duration_minutes, status
             FROM jobs
             WHERE worker_id = ?
               AND scheduled_date_time >= ? AND scheduled_date_time < ?
               AND status <> 'cancelled'
             ORDER BY scheduled_date_time ASC",
        )
        .bind(worker_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(appointment_from_row).collect()
    }
}
