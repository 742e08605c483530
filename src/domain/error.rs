use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("`{field}` must not be empty")]
    EmptyField { field: &'static str },
    #[error("post identifier `{raw}` is not a number")]
    InvalidIdentifier { raw: String },
}

impl DomainError {
    pub fn empty_field(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    pub fn invalid_identifier(raw: impl Into<String>) -> Self {
        Self::InvalidIdentifier { raw: raw.into() }
    }
}
