use std::sync::Arc;

use crate::application::repos::{PostsRepo, PostsWriteRepo};
use crate::infra::uploads::UploadStorage;

#[derive(Clone)]
pub struct AdminPostService {
    pub(crate) reader: Arc<dyn PostsRepo>,
    pub(crate) writer: Arc<dyn PostsWriteRepo>,
    pub(crate) uploads: Arc<UploadStorage>,
}

impl AdminPostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        uploads: Arc<UploadStorage>,
    ) -> Self {
        Self {
            reader,
            writer,
            uploads,
        }
    }
}
