//! Contact form submissions.

use super::error::DomainError;
use super::posts::ensure_non_empty;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactSubmission {
    pub fn new(name: &str, email: &str, phone: &str, message: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
            message: message.trim().to_string(),
        }
    }

    /// Every field is required once surrounding whitespace is removed.
    pub fn validate(&self) -> Result<(), DomainError> {
        ensure_non_empty(&self.name, "name")?;
        ensure_non_empty(&self.email, "email")?;
        ensure_non_empty(&self.phone, "phone")?;
        ensure_non_empty(&self.message, "message")
    }
}
