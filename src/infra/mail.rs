//! Outbound mail relay for contact notifications.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::debug;

use crate::application::contact::{ContactNotification, Notifier, NotifyOutcome};
use crate::config::MailSettings;

use super::error::InfraError;

/// STARTTLS SMTP relay that sends every notification to one owner mailbox.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipient: Mailbox,
}

impl SmtpNotifier {
    pub fn new(settings: &MailSettings) -> Result<Self, InfraError> {
        let sender: Mailbox = settings
            .sender
            .parse()
            .map_err(|err| InfraError::configuration(format!("mail.sender: {err}")))?;
        let recipient: Mailbox = settings
            .recipient
            .parse()
            .map_err(|err| InfraError::configuration(format!("mail.recipient: {err}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|err| InfraError::mail(err.to_string()))?
            .port(settings.port.get())
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            sender,
            recipient,
        })
    }

    fn build_message(&self, notification: &ContactNotification) -> Result<Message, InfraError> {
        Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|err| InfraError::mail(err.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &ContactNotification) -> NotifyOutcome {
        let message = match self.build_message(notification) {
            Ok(message) => message,
            Err(err) => return NotifyOutcome::TransportError(err.to_string()),
        };

        match self.transport.send(message).await {
            Ok(response) => {
                debug!(
                    target = "quire::mail",
                    code = %response.code(),
                    "notification accepted by relay"
                );
                NotifyOutcome::Delivered
            }
            Err(err) => NotifyOutcome::TransportError(err.to_string()),
        }
    }
}

/// Stand-in used when no mail account is configured; every send fails.
pub struct UnconfiguredNotifier;

#[async_trait]
impl Notifier for UnconfiguredNotifier {
    async fn notify(&self, _notification: &ContactNotification) -> NotifyOutcome {
        NotifyOutcome::TransportError("mail relay is not configured".to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU16;

    use super::*;

    fn settings() -> MailSettings {
        MailSettings {
            host: "smtp.example.com".to_string(),
            port: NonZeroU16::new(587).expect("port"),
            username: "owner@example.com".to_string(),
            password: "secret".to_string(),
            sender: "owner@example.com".to_string(),
            recipient: "inbox@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn unconfigured_notifier_reports_transport_error() {
        let notification = ContactNotification {
            subject: "s".into(),
            body: "b".into(),
        };
        let outcome = UnconfiguredNotifier.notify(&notification).await;
        assert!(!outcome.is_delivered());
    }

    #[tokio::test]
    async fn message_carries_subject_and_addresses() {
        let notifier = SmtpNotifier::new(&settings()).expect("notifier");
        let message = notifier
            .build_message(&ContactNotification {
                subject: "Contact from Quire by Ada".into(),
                body: "Name: Ada".into(),
            })
            .expect("message");
        let raw = String::from_utf8(message.formatted()).expect("utf8");
        assert!(raw.contains("Subject: Contact from Quire by Ada"));
        assert!(raw.contains("To: inbox@example.com"));
        assert!(raw.contains("From: owner@example.com"));
    }

    #[test]
    fn invalid_sender_is_a_configuration_error() {
        let mut settings = settings();
        settings.sender = "not an address".to_string();
        assert!(matches!(
            SmtpNotifier::new(&settings),
            Err(InfraError::Configuration { .. })
        ));
    }
}
