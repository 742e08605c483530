use crate::application::error::HttpError;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

const DISPLAY_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Human-readable publication date, e.g. `January 2, 2025`.
pub fn display_date(date: Date) -> String {
    date.format(DISPLAY_DATE)
        .unwrap_or_else(|_| date.to_string())
}

/// Severity of a one-shot notice shown on the next rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Danger,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub message: String,
}

impl FlashMessage {
    pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "alert-success",
            FlashKind::Danger => "alert-danger",
            FlashKind::Warning => "alert-warning",
        }
    }
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub tagline: String,
    pub href: String,
}

#[derive(Clone)]
pub struct SocialLinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

/// Per-request page frame: site branding plus whatever the session carries.
#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub social: Vec<SocialLinkView>,
    pub footer: FooterView,
    pub flashes: Vec<FlashMessage>,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub social: Vec<SocialLinkView>,
    pub footer: FooterView,
    pub flashes: Vec<FlashMessage>,
    pub is_admin: bool,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            social: chrome.social,
            footer: chrome.footer,
            flashes: chrome.flashes,
            is_admin: chrome.is_admin,
            content,
        }
    }
}

#[derive(Clone)]
pub struct PostCard {
    pub title: String,
    pub author: String,
    pub published: String,
    pub href: String,
}

pub struct IndexView {
    pub posts: Vec<PostCard>,
    pub has_results: bool,
    pub page: usize,
    pub last_page: usize,
    pub prev_href: String,
    pub next_href: String,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<IndexView>,
}

pub struct PostDetailView {
    pub title: String,
    pub author: String,
    pub published: String,
    pub body_html: String,
    pub attachment_name: Option<String>,
    pub attachment_href: Option<String>,
}

/// A missing post renders the same page with nothing in it.
pub struct PostPageView {
    pub post: Option<PostDetailView>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostPageView>,
}

pub struct AboutView {
    pub author: String,
    pub about: String,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub view: LayoutContext<AboutView>,
}

pub struct LoginView {
    pub action: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub view: LayoutContext<LoginView>,
}

pub struct DashboardRowView {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub author: String,
    pub published: String,
    pub view_href: String,
    pub edit_href: String,
    pub delete_href: String,
}

pub struct DashboardView {
    pub posts: Vec<DashboardRowView>,
    pub has_posts: bool,
    pub new_post_href: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub view: LayoutContext<DashboardView>,
}

pub struct EditorView {
    pub heading: String,
    pub action: String,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub attachment: Option<String>,
}

#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditTemplate {
    pub view: LayoutContext<EditorView>,
}

#[derive(Default)]
pub struct ContactView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub view: LayoutContext<ContactView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn dates_render_long_form() {
        assert_eq!(display_date(date!(2025 - 01 - 02)), "January 2, 2025");
        assert_eq!(display_date(date!(2024 - 11 - 30)), "November 30, 2024");
    }

    #[test]
    fn flash_kinds_map_to_alert_classes() {
        let flash = FlashMessage::new(FlashKind::Danger, "Post not found!");
        assert_eq!(flash.css_class(), "alert-danger");
        let json = serde_json::to_string(&flash).expect("serialize");
        insta::assert_snapshot!(json, @r#"{"kind":"danger","message":"Post not found!"}"#);
    }
}
