//! Cookie-backed session: the admin identity plus one-shot flash notices.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, IntoResponseParts, Redirect, Response, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use sha2::{Digest, Sha512};
use tracing::warn;

use crate::presentation::views::{FlashKind, FlashMessage};

use super::AppState;

pub const IDENTITY_COOKIE: &str = "quire_session";
pub const FLASH_COOKIE: &str = "quire_flash";

/// Derive the cookie signing key from the configured secret.
pub fn cookie_key(secret: &str) -> Key {
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

/// Per-request session state. Mutators consume and return the session so the
/// updated cookie jar travels with the response.
pub struct Session {
    jar: SignedCookieJar,
}

impl Session {
    pub fn identity(&self) -> Option<String> {
        self.jar
            .get(IDENTITY_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn set_identity(self, username: &str) -> Self {
        Self {
            jar: self
                .jar
                .add(session_cookie(IDENTITY_COOKIE, username.to_string())),
        }
    }

    pub fn clear(self) -> Self {
        Self {
            jar: self.jar.remove(removal_cookie(IDENTITY_COOKIE)),
        }
    }

    pub fn push_flash(self, kind: FlashKind, message: impl Into<String>) -> Self {
        let mut flashes = self.pending_flashes();
        flashes.push(FlashMessage::new(kind, message));
        match serde_json::to_string(&flashes) {
            Ok(encoded) => Self {
                jar: self.jar.add(session_cookie(FLASH_COOKIE, encoded)),
            },
            Err(err) => {
                warn!(target = "quire::http::session", error = %err, "failed to encode flash");
                self
            }
        }
    }

    /// Read and clear pending notices.
    pub fn take_flashes(self) -> (Self, Vec<FlashMessage>) {
        let flashes = self.pending_flashes();
        if flashes.is_empty() && self.jar.get(FLASH_COOKIE).is_none() {
            return (self, flashes);
        }
        let jar = self.jar.remove(removal_cookie(FLASH_COOKIE));
        (Self { jar }, flashes)
    }

    fn pending_flashes(&self) -> Vec<FlashMessage> {
        self.jar
            .get(FLASH_COOKIE)
            .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
            .unwrap_or_default()
    }
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::<Key>::from_request_parts(parts, state).await?;
        Ok(Self { jar })
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}

/// A session whose identity is the configured admin. Anyone else is sent to
/// the login page.
pub struct AdminSession {
    pub username: String,
    pub session: Session,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match Session::from_request_parts(parts, state).await {
            Ok(session) => session,
            Err(never) => match never {},
        };

        match session.identity() {
            Some(username) if state.gate.permits(Some(&username)) => Ok(Self { username, session }),
            _ => Err(Redirect::to("/login").into_response()),
        }
    }
}
