use crate::domain::entities::CustomerContact;
use crate::domain::errors::DomainResult;
use crate::domain::ports::customer_repository::CustomerRepository;
use crate::infrastructure::persistence::{optional_string, Database};
use async_trait::async_trait;
use sqlx::Row;

impl Database {
    pub async fn create_customer(&self, contact: &CustomerContact) -> DomainResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO customers (id, name, email, phone, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&contact.customer_id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for Database {
    async fn get_customer_contact(&self, customer_id: &str) -> DomainResult<Option<CustomerContact>> {
        let row = sqlx::query("SELECT id, name, email, phone FROM customers WHERE id = ?")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(CustomerContact {
                customer_id: row.try_get("id")?,
                name: row.try_get("name")?,
                email: optional_string(&row, "email"),
                phone: optional_string(&row, "phone"),
            })),
            None => Ok(None),
        }
    }
}
