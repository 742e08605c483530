mod support;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use quire::application::{
    admin::{AdminPostError, AdminPostService, PendingUpload},
    repos::{CreatePostParams, PostsWriteRepo, RepoError, UpdatePostParams},
};
use quire::domain::{entities::PostRecord, posts::PostDraft};
use quire::infra::uploads::UploadStorage;
use support::MemoryPosts;

/// Refuses every write, the way a unique-slug violation would.
struct RejectingWriter;

#[async_trait]
impl PostsWriteRepo for RejectingWriter {
    async fn create_post(&self, _params: CreatePostParams) -> Result<PostRecord, RepoError> {
        Err(RepoError::InvalidInput {
            message: "slug already taken".to_string(),
        })
    }

    async fn update_post(&self, _params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        Err(RepoError::InvalidInput {
            message: "slug already taken".to_string(),
        })
    }

    async fn delete_post(&self, _id: i64) -> Result<bool, RepoError> {
        Ok(false)
    }
}

fn upload(filename: &str, bytes: &'static [u8]) -> Option<PendingUpload> {
    Some(PendingUpload {
        filename: filename.to_string(),
        bytes: Bytes::from_static(bytes),
    })
}

fn stored_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read upload dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn rejected_create_leaves_no_attachment_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let uploads = Arc::new(UploadStorage::new(dir.path().to_path_buf()).expect("storage"));
    let service = AdminPostService::new(
        Arc::new(MemoryPosts::default()),
        Arc::new(RejectingWriter),
        uploads.clone(),
    );

    let err = service
        .save_post(
            "0",
            PostDraft::new("taken", "Taken", "Body", "Ada"),
            upload("orphan.txt", b"data"),
        )
        .await
        .expect_err("write is rejected");

    assert!(matches!(err, AdminPostError::Repo(RepoError::InvalidInput { .. })));
    assert!(stored_files(dir.path()).is_empty());
    assert!(uploads.read("orphan.txt").await.is_err());
}

#[tokio::test]
async fn rejected_update_keeps_previous_attachment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let uploads = Arc::new(UploadStorage::new(dir.path().to_path_buf()).expect("storage"));
    let staged = uploads
        .stage("notes.txt", Bytes::from_static(b"original"))
        .await
        .expect("stage");
    uploads.commit(staged).await.expect("commit");

    let posts = Arc::new(MemoryPosts::default());
    let record = posts.seed("notes", "Notes").await;
    let service = AdminPostService::new(posts, Arc::new(RejectingWriter), uploads.clone());

    let err = service
        .save_post(
            &record.id.to_string(),
            PostDraft::new("notes", "Notes", "Body", "Ada"),
            upload("notes.txt", b"replacement"),
        )
        .await
        .expect_err("write is rejected");

    assert!(matches!(err, AdminPostError::Repo(_)));
    assert_eq!(stored_files(dir.path()), vec!["notes.txt"]);
    let kept = uploads.read("notes.txt").await.expect("read");
    assert_eq!(kept.as_ref(), b"original");
}
