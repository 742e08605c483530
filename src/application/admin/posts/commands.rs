use time::OffsetDateTime;
use tracing::info;

use crate::application::repos::{CreatePostParams, RepoError, UpdatePostParams};
use crate::domain::entities::PostRecord;
use crate::domain::posts::{PostDraft, PostTarget};

use super::service::AdminPostService;
use super::types::{AdminPostError, PendingUpload, SaveOutcome};

impl AdminPostService {
    /// Create (`raw_id == "0"`) or update a post from editor input.
    ///
    /// Existence is confirmed before the attachment touches disk, and a new
    /// attachment only replaces a stored file once the row is written.
    /// Without a new file an update keeps the attachment it already had.
    pub async fn save_post(
        &self,
        raw_id: &str,
        draft: PostDraft,
        upload: Option<PendingUpload>,
    ) -> Result<SaveOutcome, AdminPostError> {
        let target = PostTarget::parse(raw_id).map_err(|_| AdminPostError::NotFound)?;
        draft.validate()?;

        let existing = match target {
            PostTarget::New => None,
            PostTarget::Existing(id) => Some(
                self.reader
                    .find_by_id(id)
                    .await?
                    .ok_or(AdminPostError::NotFound)?,
            ),
        };

        let staged = match upload.filter(|upload| !upload.is_empty()) {
            Some(upload) => Some(self.uploads.stage(&upload.filename, upload.bytes).await?),
            None => None,
        };
        let attachment = match &staged {
            Some(staged) => Some(staged.stored_name().to_string()),
            None => existing.as_ref().and_then(|record| record.attachment.clone()),
        };

        let written = self.write_post(existing, draft, attachment).await;
        match (written, staged) {
            (Ok(outcome), Some(staged)) => {
                self.uploads.commit(staged).await?;
                Ok(outcome)
            }
            (Ok(outcome), None) => Ok(outcome),
            (Err(err), Some(staged)) => {
                self.uploads.discard(staged).await;
                Err(err)
            }
            (Err(err), None) => Err(err),
        }
    }

    async fn write_post(
        &self,
        existing: Option<PostRecord>,
        draft: PostDraft,
        attachment: Option<String>,
    ) -> Result<SaveOutcome, AdminPostError> {
        let PostDraft {
            slug,
            title,
            body,
            author,
        } = draft;
        let posted_on = OffsetDateTime::now_utc().date();

        match existing {
            None => {
                let record = self
                    .writer
                    .create_post(CreatePostParams {
                        slug,
                        title,
                        body,
                        author,
                        attachment,
                        posted_on,
                    })
                    .await?;
                info!(
                    target = "quire::admin::posts",
                    post_id = record.id,
                    slug = %record.slug,
                    "post created"
                );
                Ok(SaveOutcome::Created(record))
            }
            Some(existing) => {
                let record = self
                    .writer
                    .update_post(UpdatePostParams {
                        id: existing.id,
                        slug,
                        title,
                        body,
                        author,
                        attachment,
                        posted_on,
                    })
                    .await
                    .map_err(|err| match err {
                        RepoError::NotFound => AdminPostError::NotFound,
                        other => AdminPostError::Repo(other),
                    })?;
                info!(
                    target = "quire::admin::posts",
                    post_id = record.id,
                    slug = %record.slug,
                    "post updated"
                );
                Ok(SaveOutcome::Updated(record))
            }
        }
    }

    pub async fn delete_post(&self, raw_id: &str) -> Result<(), AdminPostError> {
        let id = match PostTarget::parse(raw_id) {
            Ok(PostTarget::Existing(id)) => id,
            Ok(PostTarget::New) | Err(_) => return Err(AdminPostError::NotFound),
        };

        if !self.writer.delete_post(id).await? {
            return Err(AdminPostError::NotFound);
        }

        info!(target = "quire::admin::posts", post_id = id, "post deleted");
        Ok(())
    }
}
