use crate::config::SmtpSettings;
use crate::domain::entities::{CustomerContact, OccurrenceNotification};
use crate::domain::ports::notification_sender::NotificationSender;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message as LettreMessage, Tokio1Executor,
};

/// Subject and plain-text body for an occurrence notification
pub fn render_occurrence_email(
    contact: &CustomerContact,
    notification: &OccurrenceNotification,
) -> (String, String) {
    let when = notification
        .scheduled_for
        .format("%A, %B %-d, %Y at %-I:%M %p")
        .to_string();

    let subject = format!("Your next appointment: {}", when);

    let mut body = format!(
        "Hi {},\n\nYour next recurring appointment has been scheduled for {}.",
        contact.name, when
    );
    if let Some(address) = &notification.address {
        body.push_str(&format!("\nLocation: {}", address));
    }
    body.push_str("\n\nReply to this email if you need to reschedule.\n");

    (subject, body)
}

/// Sends occurrence notifications by email over SMTP
pub struct SmtpNotificationSender {
    settings: SmtpSettings,
}

impl SmtpNotificationSender {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
        let builder = if self.settings.port == 25 {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)
                .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
        };

        let builder = builder.port(self.settings.port);
        let mailer = match (&self.settings.username, &self.settings.password) {
            (Some(username), Some(password)) => builder
                .credentials(Credentials::new(username.clone(), password.clone()))
                .build(),
            _ => builder.build(),
        };

        Ok(mailer)
    }
}

#[async_trait::async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send(
        &self,
        contact: &CustomerContact,
        notification: &OccurrenceNotification,
    ) -> Result<(), String> {
        let to = contact
            .email
            .as_deref()
            .ok_or_else(|| format!("No email address for customer {}", contact.customer_id))?;

        let (subject, body) = render_occurrence_email(contact, notification);

        let email = LettreMessage::builder()
            .from(
                self.settings
                    .from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {}", e))?,
            )
            .to(to.parse().map_err(|e| format!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| format!("Failed to build email: {}", e))?;

        self.transport()?
            .send(email)
            .await
            .map_err(|e| format!("SMTP send error: {}", e))?;

        tracing::info!(
            "Occurrence email sent to {} for job {}",
            to,
            notification.job_id
        );

        Ok(())
    }
}

/// Fallback sender used when no SMTP server is configured
#[derive(Clone, Default)]
pub struct LogNotificationSender;

impl LogNotificationSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send(
        &self,
        contact: &CustomerContact,
        notification: &OccurrenceNotification,
    ) -> Result<(), String> {
        let (subject, _) = render_occurrence_email(contact, notification);
        tracing::info!(
            "Notification for customer {} (job {}): {}",
            contact.customer_id,
            notification.job_id,
            subject
        );
        Ok(())
    }
}
