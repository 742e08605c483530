use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::presentation::views::{
    FlashKind, LayoutContext, LoginTemplate, LoginView, render_template_response,
};

use super::session::Session;
use super::{AppState, page_chrome};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LoginForm {
    username: String,
    password: String,
}

pub(super) async fn login_form(State(state): State<AppState>, session: Session) -> Response {
    if state.gate.permits(session.identity().as_deref()) {
        return Redirect::to("/dashboard").into_response();
    }
    render_login(&state, session)
}

pub(super) async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if state.gate.permits(session.identity().as_deref()) {
        return Redirect::to("/dashboard").into_response();
    }

    if state.gate.authenticate(&form.username, &form.password) {
        info!(target = "quire::http::auth", "admin logged in");
        let session = session
            .set_identity(state.gate.admin_username())
            .push_flash(FlashKind::Success, "Logged in successfully!");
        return (session, Redirect::to("/dashboard")).into_response();
    }

    metrics::counter!("quire_login_failures_total").increment(1);
    warn!(
        target = "quire::http::auth",
        username = %form.username,
        "rejected login attempt"
    );
    let session = session.push_flash(FlashKind::Danger, "Invalid credentials. Please try again.");
    render_login(&state, session)
}

pub(super) async fn logout(session: Session) -> Response {
    if session.identity().is_none() {
        return Redirect::to("/login").into_response();
    }

    let session = session
        .clear()
        .push_flash(FlashKind::Success, "Logged out successfully!");
    (session, Redirect::to("/login")).into_response()
}

fn render_login(state: &AppState, session: Session) -> Response {
    let (session, chrome) = page_chrome(state, session);
    let template = LoginTemplate {
        view: LayoutContext::new(
            chrome,
            LoginView {
                action: "/login".to_string(),
            },
        ),
    };
    (session, render_template_response(template, StatusCode::OK)).into_response()
}
