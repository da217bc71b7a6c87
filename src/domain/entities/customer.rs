use serde::{Deserialize, Serialize};

/// Contact details used for outbound appointment notifications
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerContact {
    pub customer_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Template data for the "your next appointment is booked" notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccurrenceNotification {
    pub job_id: String,
    pub series_id: String,
    pub service_id: String,
    pub scheduled_for: chrono::NaiveDateTime,
    pub address: Option<String>,
}
