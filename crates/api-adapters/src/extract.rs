//! Request extractors for the signed-in user and the pending flash.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use domains::Profile;
use tracing::warn;
use uuid::Uuid;

use crate::cookies::{self, FLASH_COOKIE, SESSION_COOKIE};
use crate::flash::Flash;
use crate::state::AppState;

pub fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    cookies::find(
        headers.get_all(COOKIE).iter().filter_map(|v| v.to_str().ok()),
        name,
    )
}

/// The signed-in profile, if the session cookie resolves to one.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<Profile>);

impl Viewer {
    pub fn id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|p| p.id)
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.0.as_ref()
    }

    pub async fn resolve(headers: &HeaderMap, state: &AppState) -> Self {
        let Some(token) = cookie(headers, SESSION_COOKIE) else {
            return Self(None);
        };
        match state.sessions.resolve(token, Utc::now()).await {
            Ok(profile) => Self(profile),
            Err(err) => {
                warn!(%err, "session lookup failed");
                Self(None)
            }
        }
    }
}

/// Reuses the viewer [`crate::handlers::with_viewer`] already resolved for
/// this request, if any.
impl FromRequestParts<AppState> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(viewer) = parts.extensions.get::<Viewer>() {
            return Ok(viewer.clone());
        }
        Ok(Self::resolve(&parts.headers, state).await)
    }
}

/// Flash left by the previous redirect. The cookie is cleared by
/// [`crate::handlers::consume_flash`] once a page has shown it.
#[derive(Debug, Clone, Default)]
pub struct IncomingFlash(pub Option<Flash>);

impl<S: Send + Sync> FromRequestParts<S> for IncomingFlash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(cookie(&parts.headers, FLASH_COOKIE).and_then(Flash::decode)))
    }
}
