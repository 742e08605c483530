//! Filesystem storage for post attachments.

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use slug::slugify;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UploadStorageError {
    #[error("invalid stored path")]
    InvalidPath,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("uploaded file is empty")]
    EmptyPayload,
}

/// Attachment directory. Files are stored flat under the root by their
/// sanitized name; a later upload with the same name replaces the earlier one.
#[derive(Debug)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    /// Initialise storage rooted at the provided directory, creating it if necessary.
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Write `data` to a hidden staging file. Nothing under the final name
    /// changes until [`UploadStorage::commit`].
    pub async fn stage(
        &self,
        original_name: &str,
        data: Bytes,
    ) -> Result<StagedUpload, UploadStorageError> {
        if data.is_empty() {
            return Err(UploadStorageError::EmptyPayload);
        }

        let stored_name = sanitize_filename(original_name);
        let staging_path = self.root.join(format!(".{}.part", Uuid::new_v4()));

        let mut file = fs::File::create(&staging_path).await?;
        if let Err(err) = file.write_all(&data).await {
            drop(file);
            let _ = fs::remove_file(&staging_path).await;
            return Err(err.into());
        }
        file.flush().await?;

        Ok(StagedUpload {
            stored_name,
            staging_path,
        })
    }

    /// Move a staged file into place, replacing any file with the same name.
    pub async fn commit(&self, staged: StagedUpload) -> Result<String, UploadStorageError> {
        let target = self.resolve(&staged.stored_name)?;
        if let Err(err) = fs::rename(&staged.staging_path, &target).await {
            let _ = fs::remove_file(&staged.staging_path).await;
            return Err(err.into());
        }
        Ok(staged.stored_name)
    }

    pub async fn discard(&self, staged: StagedUpload) {
        if let Err(err) = fs::remove_file(&staged.staging_path).await {
            warn!(
                target = "quire::uploads",
                path = %staged.staging_path.display(),
                error = %err,
                "failed to remove staged upload"
            );
        }
    }

    pub async fn read(&self, stored_path: &str) -> Result<Bytes, UploadStorageError> {
        let absolute = self.resolve(stored_path)?;
        let data = fs::read(absolute).await?;
        Ok(Bytes::from(data))
    }

    fn resolve(&self, stored_path: &str) -> Result<PathBuf, UploadStorageError> {
        let relative = Path::new(stored_path);
        if stored_path.is_empty()
            || relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(UploadStorageError::InvalidPath);
        }

        Ok(self.root.join(relative))
    }
}

/// An attachment written to disk but not yet visible under its final name.
#[derive(Debug)]
pub struct StagedUpload {
    stored_name: String,
    staging_path: PathBuf,
}

impl StagedUpload {
    /// The name the file will have once committed.
    pub fn stored_name(&self) -> &str {
        &self.stored_name
    }
}

/// Reduce a client-supplied filename to a safe `stem.ext` form.
pub fn sanitize_filename(original: &str) -> String {
    // Browsers on some platforms send the full client path.
    let basename = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);
    let path = Path::new(basename);
    let stem = path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("upload");
    let mut base = slugify(stem);
    if base.is_empty() {
        base = "upload".to_string();
    }

    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| slugify(value.trim_matches('.')))
        .filter(|value| !value.is_empty());

    match extension {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\My Photo.JPG"), "my-photo.jpg");
        assert_eq!(sanitize_filename("Résumé (final).pdf"), "resume-final.pdf");
        assert_eq!(sanitize_filename("..."), "upload");
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn committed_upload_is_readable_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = UploadStorage::new(dir.path().to_path_buf()).expect("storage");

        let staged = storage
            .stage("Cover Image.png", Bytes::from_static(b"png-bytes"))
            .await
            .expect("stage");
        assert_eq!(staged.stored_name(), "cover-image.png");
        assert!(!dir.path().join("cover-image.png").exists());

        let name = storage.commit(staged).await.expect("commit");
        assert_eq!(entries(dir.path()), vec!["cover-image.png"]);

        let data = storage.read(&name).await.expect("read");
        assert_eq!(data.as_ref(), b"png-bytes");
    }

    #[tokio::test]
    async fn discarded_upload_leaves_existing_file_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = UploadStorage::new(dir.path().to_path_buf()).expect("storage");
        let first = storage
            .stage("notes.txt", Bytes::from_static(b"original"))
            .await
            .expect("stage");
        storage.commit(first).await.expect("commit");

        let second = storage
            .stage("notes.txt", Bytes::from_static(b"replacement"))
            .await
            .expect("stage");
        storage.discard(second).await;

        assert_eq!(entries(dir.path()), vec!["notes.txt"]);
        let data = storage.read("notes.txt").await.expect("read");
        assert_eq!(data.as_ref(), b"original");
    }

    #[tokio::test]
    async fn empty_payload_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = UploadStorage::new(dir.path().to_path_buf()).expect("storage");
        let err = storage
            .stage("empty.txt", Bytes::new())
            .await
            .expect_err("empty payload");
        assert!(matches!(err, UploadStorageError::EmptyPayload));
    }

    #[tokio::test]
    async fn read_refuses_parent_traversal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = UploadStorage::new(dir.path().to_path_buf()).expect("storage");
        let err = storage.read("../secret").await.expect_err("traversal");
        assert!(matches!(err, UploadStorageError::InvalidPath));
    }
}
