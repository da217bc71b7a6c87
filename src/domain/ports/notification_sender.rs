use crate::domain::entities::{CustomerContact, OccurrenceNotification};
use async_trait::async_trait;

/// Outbound channel for customer notifications (email, SMS, ...)
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(
        &self,
        contact: &CustomerContact,
        notification: &OccurrenceNotification,
    ) -> Result<(), String>;
}
