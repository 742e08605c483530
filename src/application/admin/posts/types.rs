use bytes::Bytes;
use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::entities::PostRecord;
use crate::domain::error::DomainError;
use crate::infra::uploads::UploadStorageError;

#[derive(Debug, Error)]
pub enum AdminPostError {
    #[error("post not found")]
    NotFound,
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("attachment could not be stored")]
    Upload(#[from] UploadStorageError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A file submitted with the editor form, fully buffered.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub filename: String,
    pub bytes: Bytes,
}

impl PendingUpload {
    /// Browsers send an empty part when no file was chosen.
    pub fn is_empty(&self) -> bool {
        self.filename.trim().is_empty() || self.bytes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Created(PostRecord),
    Updated(PostRecord),
}
