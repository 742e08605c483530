mod admin;
mod auth;
mod contact;
pub mod middleware;
mod public;
pub mod session;

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::Key;

use crate::application::admin::AdminPostService;
use crate::application::chrome::ChromeService;
use crate::application::contact::ContactService;
use crate::application::error::ErrorReport;
use crate::application::feed::FeedService;
use crate::application::repos::{HealthRepo, RepoError};
use crate::application::session::SessionGate;
use crate::infra::uploads::UploadStorage;
use crate::presentation::views::LayoutChrome;

use self::middleware::trace_requests;
use self::session::Session;

/// Everything request handlers share.
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedService,
    pub posts: AdminPostService,
    pub contact: ContactService,
    pub chrome: ChromeService,
    pub gate: SessionGate,
    pub uploads: Arc<UploadStorage>,
    pub health: Arc<dyn HealthRepo>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn build_router(state: AppState, upload_limit_bytes: usize) -> Router {
    let editor_routes = Router::new()
        .route("/edit/{id}", get(admin::edit_form).post(admin::save_post))
        .layer(DefaultBodyLimit::max(upload_limit_bytes));

    Router::new()
        .route("/", get(public::index))
        .route("/about", get(public::about))
        .route("/post/{slug}", get(public::post_detail))
        .route("/uploads/{*path}", get(public::serve_upload))
        .route("/_health/db", get(public::db_health))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/dashboard", get(admin::dashboard))
        .route(
            "/delete/{id}",
            get(admin::delete_post).post(admin::delete_post),
        )
        .route("/contact", get(contact::contact_form).post(contact::submit))
        .merge(editor_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            trace_requests,
        ))
        .with_state(state)
}

/// Consume pending flashes and build the page frame for this request.
fn page_chrome(state: &AppState, session: Session) -> (Session, LayoutChrome) {
    let is_admin = state.gate.permits(session.identity().as_deref());
    let (session, flashes) = session.take_flashes();
    (session, state.chrome.load(flashes, is_admin))
}

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
