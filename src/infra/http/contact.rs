use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::error;

use crate::application::contact::{ContactError, NotifyOutcome};
use crate::domain::contacts::ContactSubmission;
use crate::presentation::views::{
    ContactTemplate, ContactView, FlashKind, LayoutContext, render_template_response,
};

use super::session::Session;
use super::{AppState, page_chrome};

const SEND_FAILED: &str = "Failed to send message. Please try again later.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ContactForm {
    name: String,
    email: String,
    phone: String,
    message: String,
}

pub(super) async fn contact_form(State(state): State<AppState>, session: Session) -> Response {
    render_contact(&state, session, ContactView::default())
}

pub(super) async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactForm>,
) -> Response {
    let submission = ContactSubmission::new(&form.name, &form.email, &form.phone, &form.message);

    match state.contact.submit(submission).await {
        Ok(receipt) => {
            let session = match receipt.notification {
                NotifyOutcome::Delivered => {
                    session.push_flash(FlashKind::Success, "Message sent successfully!")
                }
                NotifyOutcome::TransportError(_) => session.push_flash(FlashKind::Danger, SEND_FAILED),
            };
            render_contact(&state, session, ContactView::default())
        }
        Err(ContactError::Incomplete(_)) => {
            let session = session.push_flash(
                FlashKind::Warning,
                "Please fill out all fields before submitting.",
            );
            let retained = ContactView {
                name: form.name,
                email: form.email,
                phone: form.phone,
                message: form.message,
            };
            render_contact(&state, session, retained)
        }
        Err(ContactError::Repo(err)) => {
            error!(
                target = "quire::http::contact",
                error = %err,
                "failed to store contact message"
            );
            let session = session.push_flash(FlashKind::Danger, SEND_FAILED);
            render_contact(&state, session, ContactView::default())
        }
    }
}

fn render_contact(state: &AppState, session: Session, content: ContactView) -> Response {
    let (session, chrome) = page_chrome(state, session);
    let template = ContactTemplate {
        view: LayoutContext::new(chrome, content),
    };
    (session, render_template_response(template, StatusCode::OK)).into_response()
}
