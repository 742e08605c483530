use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Multipart;
use tracing::{error, warn};

use crate::application::admin::posts::{AdminPostError, PendingUpload, SaveOutcome};
use crate::application::error::{HttpError, repo_error_to_http};
use crate::domain::entities::PostRecord;
use crate::domain::posts::{NEW_POST_SENTINEL, PostDraft};
use crate::presentation::views::{
    DashboardRowView, DashboardTemplate, DashboardView, EditTemplate, EditorView, FlashKind,
    LayoutContext, display_date, render_template_response,
};

use super::session::{AdminSession, Session};
use super::{AppState, page_chrome};

const POST_NOT_FOUND: &str = "Post not found!";
const INCOMPLETE_POST: &str = "Please fill out all fields before submitting.";

pub(super) async fn dashboard(State(state): State<AppState>, admin: AdminSession) -> Response {
    let posts = match state.posts.list_all().await {
        Ok(posts) => posts,
        Err(err) => return admin_error_response("infra::http::admin::dashboard", err),
    };

    let rows: Vec<DashboardRowView> = posts.iter().map(dashboard_row).collect();
    let content = DashboardView {
        has_posts: !rows.is_empty(),
        posts: rows,
        new_post_href: format!("/edit/{NEW_POST_SENTINEL}"),
    };

    let (session, chrome) = page_chrome(&state, admin.session);
    let template = DashboardTemplate {
        view: LayoutContext::new(chrome, content),
    };
    (session, render_template_response(template, StatusCode::OK)).into_response()
}

pub(super) async fn edit_form(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> Response {
    let record = match state.posts.load_for_edit(&id).await {
        Ok(record) => record,
        Err(AdminPostError::NotFound) => {
            return back_to_dashboard(admin.session, FlashKind::Danger, POST_NOT_FOUND);
        }
        Err(err) => return admin_error_response("infra::http::admin::edit_form", err),
    };

    let content = editor_view(&id, record.as_ref());
    let (session, chrome) = page_chrome(&state, admin.session);
    let template = EditTemplate {
        view: LayoutContext::new(chrome, content),
    };
    (session, render_template_response(template, StatusCode::OK)).into_response()
}

pub(super) async fn save_post(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let form = match read_editor_form(&mut multipart).await {
        Ok(form) => form,
        Err(reason) => {
            return back_to_dashboard(admin.session, FlashKind::Danger, reason.notice());
        }
    };

    let draft = PostDraft::new(&form.slug, &form.title, &form.content, &form.posted_by);
    match state.posts.save_post(&id, draft, form.upload).await {
        Ok(SaveOutcome::Created(_)) => {
            back_to_dashboard(admin.session, FlashKind::Success, "Post added successfully!")
        }
        Ok(SaveOutcome::Updated(_)) => {
            back_to_dashboard(admin.session, FlashKind::Success, "Post updated successfully!")
        }
        Err(AdminPostError::NotFound) => {
            back_to_dashboard(admin.session, FlashKind::Danger, POST_NOT_FOUND)
        }
        Err(AdminPostError::Invalid(err)) => {
            warn!(
                target = "quire::http::admin",
                admin = %admin.username,
                post = %id,
                error = %err,
                "rejected incomplete post"
            );
            back_to_dashboard(admin.session, FlashKind::Warning, INCOMPLETE_POST)
        }
        Err(AdminPostError::Upload(err)) => {
            error!(
                target = "quire::http::admin",
                admin = %admin.username,
                post = %id,
                error = %err,
                "failed to store attachment"
            );
            back_to_dashboard(
                admin.session,
                FlashKind::Danger,
                "The attachment could not be saved. Please try again.",
            )
        }
        Err(AdminPostError::Repo(err)) => {
            error!(
                target = "quire::http::admin",
                admin = %admin.username,
                post = %id,
                error = %err,
                "failed to save post"
            );
            back_to_dashboard(
                admin.session,
                FlashKind::Danger,
                "The post could not be saved. Please try again later.",
            )
        }
    }
}

pub(super) async fn delete_post(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> Response {
    match state.posts.delete_post(&id).await {
        Ok(()) => back_to_dashboard(admin.session, FlashKind::Success, "Post deleted successfully!"),
        Err(AdminPostError::NotFound) => {
            back_to_dashboard(admin.session, FlashKind::Danger, POST_NOT_FOUND)
        }
        Err(err) => {
            error!(
                target = "quire::http::admin",
                admin = %admin.username,
                post = %id,
                error = %err,
                "failed to delete post"
            );
            back_to_dashboard(
                admin.session,
                FlashKind::Danger,
                "The post could not be deleted. Please try again later.",
            )
        }
    }
}

fn back_to_dashboard(session: Session, kind: FlashKind, message: &str) -> Response {
    let session = session.push_flash(kind, message);
    (session, Redirect::to("/dashboard")).into_response()
}

fn admin_error_response(source: &'static str, err: AdminPostError) -> Response {
    match err {
        AdminPostError::Repo(err) => repo_error_to_http(source, err).into_response(),
        other => HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load posts",
            &other,
        )
        .into_response(),
    }
}

fn dashboard_row(record: &PostRecord) -> DashboardRowView {
    DashboardRowView {
        id: record.id,
        title: record.title.clone(),
        slug: record.slug.clone(),
        author: record.author.clone(),
        published: display_date(record.posted_on),
        view_href: format!("/post/{}", record.slug),
        edit_href: format!("/edit/{}", record.id),
        delete_href: format!("/delete/{}", record.id),
    }
}

fn editor_view(raw_id: &str, record: Option<&PostRecord>) -> EditorView {
    match record {
        Some(record) => EditorView {
            heading: format!("Edit \u{201c}{}\u{201d}", record.title),
            action: format!("/edit/{}", record.id),
            slug: record.slug.clone(),
            title: record.title.clone(),
            body: record.body.clone(),
            author: record.author.clone(),
            attachment: record.attachment.clone(),
        },
        None => EditorView {
            heading: "Add a new post".to_string(),
            action: format!("/edit/{}", raw_id.trim()),
            slug: String::new(),
            title: String::new(),
            body: String::new(),
            author: String::new(),
            attachment: None,
        },
    }
}

#[derive(Debug, Default)]
struct EditorForm {
    slug: String,
    title: String,
    content: String,
    posted_by: String,
    upload: Option<PendingUpload>,
}

#[derive(Debug)]
enum EditorFormError {
    PayloadTooLarge,
    Invalid,
}

impl EditorFormError {
    fn notice(&self) -> &'static str {
        match self {
            EditorFormError::PayloadTooLarge => "The attachment is too large.",
            EditorFormError::Invalid => "The form could not be read. Please try again.",
        }
    }
}

async fn read_editor_form(multipart: &mut Multipart) -> Result<EditorForm, EditorFormError> {
    let mut form = EditorForm::default();

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().map(str::to_string);
                match name.as_deref() {
                    Some("file_upload") => {
                        let filename = field.file_name().unwrap_or_default().to_string();
                        let bytes = field.bytes().await.map_err(|err| read_failure(&err))?;
                        form.upload = Some(PendingUpload { filename, bytes });
                    }
                    Some(key @ ("slug" | "title" | "content" | "posted_by")) => {
                        let value = field.text().await.map_err(|err| read_failure(&err))?;
                        match key {
                            "slug" => form.slug = value,
                            "title" => form.title = value,
                            "content" => form.content = value,
                            _ => form.posted_by = value,
                        }
                    }
                    _ => continue,
                }
            }
            Ok(None) => break,
            Err(err) => return Err(read_failure(&err)),
        }
    }

    Ok(form)
}

fn read_failure(err: &axum_extra::extract::multipart::MultipartError) -> EditorFormError {
    let status = err.status();
    warn!(
        target = "quire::http::admin",
        status = status.as_u16(),
        error = %err,
        "failed to read editor form"
    );
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => EditorFormError::PayloadTooLarge,
        _ => EditorFormError::Invalid,
    }
}
