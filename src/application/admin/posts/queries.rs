use crate::domain::entities::PostRecord;
use crate::domain::posts::PostTarget;

use super::service::AdminPostService;
use super::types::AdminPostError;

impl AdminPostService {
    pub async fn list_all(&self) -> Result<Vec<PostRecord>, AdminPostError> {
        Ok(self.reader.list_all().await?)
    }

    /// Load the record behind an editor URL. The new-post sentinel yields
    /// `None`; an unknown or malformed identifier is `NotFound`.
    pub async fn load_for_edit(&self, raw_id: &str) -> Result<Option<PostRecord>, AdminPostError> {
        match PostTarget::parse(raw_id).map_err(|_| AdminPostError::NotFound)? {
            PostTarget::New => Ok(None),
            PostTarget::Existing(id) => self
                .reader
                .find_by_id(id)
                .await?
                .map(Some)
                .ok_or(AdminPostError::NotFound),
        }
    }
}
