#![allow(dead_code)]

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use http_body_util::BodyExt;
use quire::application::{
    admin::AdminPostService,
    chrome::{ChromeService, SiteProfile},
    contact::{ContactNotification, ContactService, Notifier, NotifyOutcome},
    feed::FeedService,
    repos::{
        ContactsRepo, CreateContactParams, CreatePostParams, HealthRepo, PostsRepo,
        PostsWriteRepo, RepoError, UpdatePostParams,
    },
    session::{AdminCredentials, SessionGate},
};
use quire::domain::entities::{ContactRecord, PostRecord};
use quire::infra::http::{
    self, AppState,
    session::{IDENTITY_COOKIE, cookie_key},
};
use quire::infra::uploads::UploadStorage;
use tempfile::TempDir;
use time::macros::date;
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "owner";
pub const ADMIN_PASSWORD: &str = "hunter2";
pub const BOUNDARY: &str = "quire-test-boundary";
pub const COOKIE_SECRET: &str = "integration-test-secret-0123456789abcdef";

#[derive(Default)]
pub struct MemoryPosts {
    rows: Mutex<Vec<PostRecord>>,
    next_id: Mutex<i64>,
}

impl MemoryPosts {
    pub async fn seed(&self, slug: &str, title: &str) -> PostRecord {
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        let record = PostRecord {
            id: *next_id,
            slug: slug.to_string(),
            title: title.to_string(),
            body: format!("<p>Body of {title}</p>"),
            author: "Ada".to_string(),
            attachment: None,
            posted_on: date!(2025 - 01 - 02),
        };
        self.rows.lock().await.push(record.clone());
        record
    }

    pub async fn all(&self) -> Vec<PostRecord> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl PostsRepo for MemoryPosts {
    async fn list_all(&self) -> Result<Vec<PostRecord>, RepoError> {
        Ok(self.rows.lock().await.clone())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|row| row.slug == slug)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryPosts {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        let record = PostRecord {
            id: *next_id,
            slug: params.slug,
            title: params.title,
            body: params.body,
            author: params.author,
            attachment: params.attachment,
            posted_on: params.posted_on,
        };
        self.rows.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == params.id)
            .ok_or(RepoError::NotFound)?;
        row.slug = params.slug;
        row.title = params.title;
        row.body = params.body;
        row.author = params.author;
        row.attachment = params.attachment;
        row.posted_on = params.posted_on;
        Ok(row.clone())
    }

    async fn delete_post(&self, id: i64) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryContacts {
    rows: Mutex<Vec<ContactRecord>>,
}

impl MemoryContacts {
    pub async fn all(&self) -> Vec<ContactRecord> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl ContactsRepo for MemoryContacts {
    async fn insert_contact(
        &self,
        params: CreateContactParams,
    ) -> Result<ContactRecord, RepoError> {
        let mut rows = self.rows.lock().await;
        let record = ContactRecord {
            id: rows.len() as i64 + 1,
            name: params.name,
            phone: params.phone,
            email: params.email,
            message: params.message,
            submitted_on: params.submitted_on,
        };
        rows.push(record.clone());
        Ok(record)
    }
}

pub struct AlwaysHealthy;

#[async_trait]
impl HealthRepo for AlwaysHealthy {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

/// Records every notification and answers with a fixed outcome.
pub struct ScriptedNotifier {
    outcome: NotifyOutcome,
    sent: Mutex<Vec<ContactNotification>>,
}

impl ScriptedNotifier {
    pub fn delivering() -> Self {
        Self {
            outcome: NotifyOutcome::Delivered,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: NotifyOutcome::TransportError("connection refused".to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub async fn sent(&self) -> Vec<ContactNotification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for ScriptedNotifier {
    async fn notify(&self, notification: &ContactNotification) -> NotifyOutcome {
        self.sent.lock().await.push(notification.clone());
        self.outcome.clone()
    }
}

pub struct TestApp {
    pub router: Router,
    pub posts: Arc<MemoryPosts>,
    pub contacts: Arc<MemoryContacts>,
    pub notifier: Arc<ScriptedNotifier>,
    pub uploads: Arc<UploadStorage>,
    cookies: HashMap<String, String>,
    _upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_notifier(ScriptedNotifier::delivering())
    }

    pub fn with_notifier(notifier: ScriptedNotifier) -> Self {
        let upload_dir = tempfile::tempdir().expect("temp upload dir");
        let uploads = Arc::new(
            UploadStorage::new(upload_dir.path().join("uploads")).expect("upload storage"),
        );
        let posts = Arc::new(MemoryPosts::default());
        let contacts = Arc::new(MemoryContacts::default());
        let notifier = Arc::new(notifier);

        let state = AppState {
            feed: FeedService::new(posts.clone(), NonZeroUsize::new(5).expect("page size")),
            posts: AdminPostService::new(posts.clone(), posts.clone(), uploads.clone()),
            contact: ContactService::new(contacts.clone(), notifier.clone(), "Quire"),
            chrome: ChromeService::new(SiteProfile {
                title: "Quire".to_string(),
                tagline: "Notes and essays".to_string(),
                about: "I write about small software.".to_string(),
                author: "Ada".to_string(),
                github_url: Some("https://github.com/ada".to_string()),
                twitter_url: None,
                facebook_url: Some("  ".to_string()),
            }),
            gate: SessionGate::new(AdminCredentials {
                username: ADMIN_USERNAME.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            }),
            uploads: uploads.clone(),
            health: Arc::new(AlwaysHealthy),
            cookie_key: cookie_key(COOKIE_SECRET),
        };

        Self {
            router: http::build_router(state, 1024 * 1024),
            posts,
            contacts,
            notifier,
            uploads,
            cookies: HashMap::new(),
            _upload_dir: upload_dir,
        }
    }

    /// Send a request carrying the cookies collected so far, then absorb any
    /// cookies the response sets or removes.
    pub async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        let mut request = request;
        if !self.cookies.is_empty() {
            let header_value = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            request.headers_mut().insert(
                header::COOKIE,
                header_value.parse().expect("cookie header"),
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");

        self.absorb_cookies(&response);
        response
    }

    /// Hold a validly signed session for `username` without going through
    /// `/login`.
    pub fn sign_identity(&mut self, username: &str) {
        let jar = SignedCookieJar::new(cookie_key(COOKIE_SECRET))
            .add(Cookie::new(IDENTITY_COOKIE, username.to_string()));
        let response = jar.into_response();
        self.absorb_cookies(&response);
    }

    fn absorb_cookies(&mut self, response: &Response<Body>) {
        for value in response.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().expect("set-cookie is ascii");
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let removed = value.is_empty() || raw.contains("Max-Age=0");
            if removed {
                self.cookies.remove(name.trim());
            } else {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).expect("request"))
            .await
    }

    pub async fn post_form(&mut self, uri: &str, body: &str) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    pub async fn post_multipart(&mut self, uri: &str, body: Vec<u8>) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .expect("request"),
        )
        .await
    }

    pub async fn log_in(&mut self) {
        let response = self
            .post_form(
                "/login",
                &format!("username={ADMIN_USERNAME}&password={ADMIN_PASSWORD}"),
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
    }

    /// Follow a redirect by issuing a GET to its target.
    pub async fn follow(&mut self, response: Response<Body>) -> Response<Body> {
        assert!(
            response.status().is_redirection(),
            "expected redirect, got {}",
            response.status()
        );
        let target = location(&response);
        self.get(&target).await
    }
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

/// Build a multipart editor submission.
pub fn editor_form(
    slug: &str,
    title: &str,
    content: &str,
    posted_by: &str,
    file: Option<(&str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in [
        ("slug", slug),
        ("title", title),
        ("content", content),
        ("posted_by", posted_by),
    ] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file_upload\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
