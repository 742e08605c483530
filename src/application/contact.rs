//! Contact intake: persist first, then try to notify the owner.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::application::repos::{ContactsRepo, CreateContactParams, RepoError};
use crate::domain::contacts::ContactSubmission;
use crate::domain::entities::ContactRecord;
use crate::domain::error::DomainError;

/// Email relayed to the site owner for a stored contact message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactNotification {
    pub subject: String,
    pub body: String,
}

impl ContactNotification {
    pub fn for_record(site_title: &str, record: &ContactRecord) -> Self {
        Self {
            subject: format!("Contact from {site_title} by {}", record.name),
            body: format!(
                "Name: {}\nEmail: {}\nPhone: {}\n\nMessage:\n{}",
                record.name, record.email, record.phone, record.message
            ),
        }
    }
}

/// Result of handing a notification to the mail relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    TransportError(String),
}

impl NotifyOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotifyOutcome::Delivered)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &ContactNotification) -> NotifyOutcome;
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error(transparent)]
    Incomplete(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A stored message together with what happened to its notification.
#[derive(Debug, Clone)]
pub struct ContactReceipt {
    pub record: ContactRecord,
    pub notification: NotifyOutcome,
}

#[derive(Clone)]
pub struct ContactService {
    contacts: Arc<dyn ContactsRepo>,
    notifier: Arc<dyn Notifier>,
    site_title: String,
}

impl ContactService {
    pub fn new(
        contacts: Arc<dyn ContactsRepo>,
        notifier: Arc<dyn Notifier>,
        site_title: impl Into<String>,
    ) -> Self {
        Self {
            contacts,
            notifier,
            site_title: site_title.into(),
        }
    }

    /// Validate and store a submission, then attempt delivery.
    ///
    /// A notification failure never undoes the stored record; it is reported
    /// through [`ContactReceipt::notification`].
    pub async fn submit(
        &self,
        submission: ContactSubmission,
    ) -> Result<ContactReceipt, ContactError> {
        submission.validate()?;

        let ContactSubmission {
            name,
            email,
            phone,
            message,
        } = submission;

        let record = self
            .contacts
            .insert_contact(CreateContactParams {
                name,
                phone,
                email,
                message,
                submitted_on: OffsetDateTime::now_utc().date(),
            })
            .await?;

        metrics::counter!("quire_contact_messages_total").increment(1);

        let notification = ContactNotification::for_record(&self.site_title, &record);
        let outcome = self.notifier.notify(&notification).await;

        match &outcome {
            NotifyOutcome::Delivered => {
                info!(
                    target = "quire::contact",
                    contact_id = record.id,
                    "contact message relayed"
                );
            }
            NotifyOutcome::TransportError(reason) => {
                metrics::counter!("quire_contact_notify_failed_total").increment(1);
                warn!(
                    target = "quire::contact",
                    contact_id = record.id,
                    reason = %reason,
                    "contact message stored but relay failed"
                );
            }
        }

        Ok(ContactReceipt {
            record,
            notification: outcome,
        })
    }
}
