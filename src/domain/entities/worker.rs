use serde::{Deserialize, Serialize};

use super::availability::WorkerAvailability;

/// Field worker who can be assigned to jobs
#[derive(Debug, Clone)]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub availability: WorkerAvailability,
}

/// Filter for listing active workers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerFilter {
    /// Only workers qualified for this service
    pub service_id: Option<String>,
}
