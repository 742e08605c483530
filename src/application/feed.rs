use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::application::error::{HttpError, repo_error_to_http};
use crate::application::pagination::paginate;
use crate::application::repos::PostsRepo;
use crate::domain::entities::PostRecord;
use crate::presentation::views::{IndexView, PostCard, PostDetailView, display_date};

const SOURCE: &str = "application::feed::FeedService";

/// Public read side: the paginated listing and single-post pages.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    page_size: NonZeroUsize,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostsRepo>, page_size: NonZeroUsize) -> Self {
        Self { posts, page_size }
    }

    pub async fn page(&self, raw_page: Option<&str>) -> Result<IndexView, HttpError> {
        let posts = self
            .posts
            .list_all()
            .await
            .map_err(|err| repo_error_to_http(SOURCE, err))?;

        let window = paginate(&posts, self.page_size, raw_page);
        let cards: Vec<PostCard> = window.items.iter().map(post_card).collect();

        Ok(IndexView {
            has_results: !cards.is_empty(),
            posts: cards,
            page: window.page,
            last_page: window.last,
            prev_href: window.prev.href(),
            next_href: window.next.href(),
            has_prev: !window.prev.is_placeholder(),
            has_next: !window.next.is_placeholder(),
        })
    }

    /// Look up the first post carrying `slug`. `None` when nothing matches.
    pub async fn post(&self, slug: &str) -> Result<Option<PostDetailView>, HttpError> {
        let record = self
            .posts
            .find_by_slug(slug)
            .await
            .map_err(|err| repo_error_to_http(SOURCE, err))?;

        Ok(record.map(post_detail))
    }
}

fn post_card(record: &PostRecord) -> PostCard {
    PostCard {
        title: record.title.clone(),
        author: record.author.clone(),
        published: display_date(record.posted_on),
        href: format!("/post/{}", record.slug),
    }
}

fn post_detail(record: PostRecord) -> PostDetailView {
    let attachment_href = record
        .attachment
        .as_ref()
        .map(|name| format!("/uploads/{name}"));

    PostDetailView {
        published: display_date(record.posted_on),
        body_html: ammonia::clean(&record.body),
        attachment_name: record.attachment,
        attachment_href,
        title: record.title,
        author: record.author,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn detail_strips_scripts_from_body() {
        let record = PostRecord {
            id: 1,
            slug: "hello".into(),
            title: "Hello".into(),
            body: "<p>Hi</p><script>alert(1)</script>".into(),
            author: "Ada".into(),
            attachment: Some("notes.pdf".into()),
            posted_on: date!(2025 - 03 - 04),
        };
        let view = post_detail(record);
        assert_eq!(view.body_html, "<p>Hi</p>");
        assert_eq!(view.attachment_href.as_deref(), Some("/uploads/notes.pdf"));
        assert_eq!(view.published, "March 4, 2025");
    }
}
