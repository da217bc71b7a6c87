use crate::domain::entities::{Worker, WorkerAvailability, WorkerFilter};
use crate::domain::errors::DomainResult;
use crate::domain::ports::worker_repository::WorkerRepository;
use crate::infrastructure::persistence::{optional_string, Database};
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

fn worker_from_row(row: &AnyRow) -> DomainResult<Worker> {
    let id: String = row.try_get("id")?;
    let raw_availability = optional_string(row, "availability");

    let availability = WorkerAvailability::from_stored(raw_availability.as_deref());

    Ok(Worker {
        id,
        name: row.try_get("name")?,
        email: optional_string(row, "email"),
        is_active: row.try_get::<i64, _>("is_active")? != 0,
        availability,
    })
}

impl Database {
    /// Create a worker, optionally qualified for the given services
    pub async fn create_worker(
        &self,
        name: &str,
        availability: Option<&str>,
        service_ids: &[&str],
    ) -> DomainResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO workers (id, name, email, is_active, availability, created_at, updated_at)
             VALUES (?, ?, NULL, 1, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(availability)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        for service_id in service_ids {
            sqlx::query("INSERT INTO worker_services (worker_id, service_id) VALUES (?, ?)")
                .bind(&id)
                .bind(*service_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(id)
    }

    /// Replace a worker's raw availability document
    pub async fn set_worker_availability(
        &self,
        worker_id: &str,
        availability: Option<&str>,
    ) -> DomainResult<()> {
        sqlx::query("UPDATE workers SET availability = ?, updated_at = ? WHERE id = ?")
            .bind(availability)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(worker_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn deactivate_worker(&self, worker_id: &str) -> DomainResult<()> {
        sqlx::query("UPDATE workers SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(worker_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WorkerRepository for Database {
    async fn list_active_workers(&self, filter: &WorkerFilter) -> DomainResult<Vec<Worker>> {
        let rows = match &filter.service_id {
            Some(service_id) => {
                sqlx::query(
                    "SELECT w.id, w.name, w.email, w.is_active, w.availability
                     FROM workers w
                     INNER JOIN worker_services ws ON ws.worker_id = w.id
                     WHERE w.is_active = 1 AND ws.service_id = ?
                     ORDER BY w.name ASC",
                )
                .bind(service_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, name, email, is_active, availability
                     FROM workers
                     WHERE is_active = 1
                     ORDER BY name ASC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(worker_from_row).collect()
    }
}
