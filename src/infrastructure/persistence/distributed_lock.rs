use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::distributed_lock::DistributedLock;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use chrono::Utc;

/// Lease-style lock stored in `distributed_locks`
#[derive(Clone)]
pub struct DatabaseDistributedLock {
    db: Database,
}

impl DatabaseDistributedLock {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DistributedLock for DatabaseDistributedLock {
    async fn acquire(&self, key: &str, owner: &str, ttl_seconds: u64) -> DomainResult<bool> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(ttl_seconds as i64);

        // An existing row is only taken over once its lease has expired.
        // RFC 3339 UTC timestamps compare correctly as strings.
        let query = r#"
            INSERT INTO distributed_locks (key, owner, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                owner = excluded.owner,
                expires_at = excluded.expires_at,
                created_at = excluded.created_at
            WHERE distributed_locks.expires_at < ?
        "#;

        let result = sqlx::query(query)
            .bind(key)
            .bind(owner)
            .bind(expires_at.to_rfc3339())
            .bind(now.to_rfc3339())
            .bind(now.to_rfc3339())
            .execute(&self.db.pool)
            .await
            .map_err(|e| DomainError::Internal(format!("Failed to acquire lock: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, key: &str, owner: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM distributed_locks WHERE key = ? AND owner = ?")
            .bind(key)
            .bind(owner)
            .execute(&self.db.pool)
            .await
            .map_err(|e| DomainError::Internal(format!("Failed to release lock: {}", e)))?;
        Ok(())
    }
}
