use crate::domain::entities::CustomerContact;
use crate::domain::errors::DomainResult;

#[async_trait::async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn get_customer_contact(&self, customer_id: &str) -> DomainResult<Option<CustomerContact>>;
}
