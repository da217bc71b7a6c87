use crate::domain::entities::{Worker, WorkerFilter};
use crate::domain::errors::DomainResult;

#[async_trait::async_trait]
pub trait WorkerRepository: Send + Sync {
    /// Active workers, with availability already decoded
    async fn list_active_workers(&self, filter: &WorkerFilter) -> DomainResult<Vec<Worker>>;
}
