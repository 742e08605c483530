use std::io::ErrorKind;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::error;

use crate::application::error::HttpError;
use crate::infra::uploads::UploadStorageError;
use crate::presentation::views::{
    AboutTemplate, AboutView, IndexTemplate, LayoutContext, PostPageView, PostTemplate,
    render_template_response,
};

use super::session::Session;
use super::{AppState, db_health_response, page_chrome};

/// Raw query pairs; a repeated `page` uses its first value.
pub(super) async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let page = pairs
        .iter()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.as_str());

    let content = match state.feed.page(page).await {
        Ok(content) => content,
        Err(err) => return err.into_response(),
    };

    let (session, chrome) = page_chrome(&state, session);
    let template = IndexTemplate {
        view: LayoutContext::new(chrome, content),
    };
    (session, render_template_response(template, StatusCode::OK)).into_response()
}

/// An unknown slug renders the post page with nothing in it.
pub(super) async fn post_detail(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Response {
    let post = match state.feed.post(&slug).await {
        Ok(post) => post,
        Err(err) => return err.into_response(),
    };

    let (session, chrome) = page_chrome(&state, session);
    let template = PostTemplate {
        view: LayoutContext::new(chrome, PostPageView { post }),
    };
    let response = render_template_response(template, StatusCode::OK);
    (session, response).into_response()
}

pub(super) async fn about(State(state): State<AppState>, session: Session) -> Response {
    let content = AboutView {
        author: state.chrome.site().author.clone(),
        about: state.chrome.site().about.clone(),
    };
    let (session, chrome) = page_chrome(&state, session);
    let template = AboutTemplate {
        view: LayoutContext::new(chrome, content),
    };
    (session, render_template_response(template, StatusCode::OK)).into_response()
}

pub(super) async fn serve_upload(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Response {
    const SOURCE: &str = "infra::http::public::serve_upload";

    match state.uploads.read(&path).await {
        Ok(bytes) => build_upload_response(&path, bytes),
        Err(UploadStorageError::InvalidPath) => HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Upload not found",
            "The requested upload is not available",
        )
        .into_response(),
        Err(UploadStorageError::Io(err)) if err.kind() == ErrorKind::NotFound => HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Upload not found",
            "The requested upload is not available",
        )
        .into_response(),
        Err(err) => {
            error!(
                target = "quire::http::uploads",
                path = %path,
                error = %err,
                "failed to read stored upload"
            );
            HttpError::new(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read uploaded file",
                err.to_string(),
            )
            .into_response()
        }
    }
}

pub(super) async fn db_health(State(state): State<AppState>) -> Response {
    db_health_response(state.health.ping().await)
}

fn build_upload_response(path: &str, bytes: Bytes) -> Response {
    let length = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&length.to_string()) {
        headers.insert(CONTENT_LENGTH, value);
    }
    // Stored names are reused when a file is uploaded again.
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=3600"));

    response
}
