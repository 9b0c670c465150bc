//! # Handlers
//!
//! GET handlers render askama pages. Form POSTs always answer with a
//! `303 See Other`, carrying the outcome in a flash cookie.

pub mod auth;
pub mod comments;
pub mod home;
pub mod products;
pub mod system;

use axum::extract::{Request, State};
use axum::http::header::{REFERER, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use domains::DomainError;
use tracing::{error, warn};

use crate::cookies::{self, FLASH_COOKIE};
use crate::error::ErrorDetails;
use crate::extract::{cookie, Viewer};
use crate::flash::Flash;
use crate::state::AppState;
use crate::views::Layout;

pub(crate) fn with_cookie(mut response: Response, cookie: String) -> Response {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(err) => warn!(%err, "dropping unencodable cookie"),
    }
    response
}

pub(crate) fn redirect_with(state: &AppState, to: &str, flash: Flash) -> Response {
    with_cookie(
        Redirect::to(to).into_response(),
        cookies::set(FLASH_COOKIE, &flash.encode(), None, state.cookies.secure),
    )
}

/// Flash text for a failed action; internal failures are logged too.
pub(crate) fn failure(err: DomainError) -> Flash {
    match err {
        DomainError::Internal(detail) => {
            error!(%detail, "action failed");
            Flash::error(detail)
        }
        other => Flash::error(other.to_string()),
    }
}

/// Path of the page that submitted the form, `/` when unknown.
pub(crate) fn back(headers: &HeaderMap) -> String {
    headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|referer| {
            let rest = referer.split_once("://").map_or(referer, |(_, rest)| rest);
            rest.find('/').map(|i| rest[i..].to_string())
        })
        .filter(|path| local_path(path))
        .unwrap_or_else(|| "/".to_string())
}

/// Only same-site absolute paths are followed after sign-in.
pub(crate) fn local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

/// Resolves the session once per request and gives error pages the same
/// header and flash banner as every other page.
pub async fn with_viewer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let viewer = Viewer::resolve(req.headers(), &state).await;
    let flash = cookie(req.headers(), FLASH_COOKIE).and_then(Flash::decode);
    req.extensions_mut().insert(viewer.clone());

    let response = next.run(req).await;
    let Some(details) = response.extensions().get::<ErrorDetails>().cloned() else {
        return response;
    };
    let (parts, _) = response.into_parts();
    let mut page = details.render(Layout::new(viewer.profile(), flash));
    for value in parts.headers.get_all(SET_COOKIE) {
        page.headers_mut().append(SET_COOKIE, value.clone());
    }
    page
}

/// Drops the flash cookie once a page has been served with it. Redirects
/// pass it through to the page they lead to.
pub async fn consume_flash(req: Request, next: Next) -> Response {
    let had_flash = cookie(req.headers(), FLASH_COOKIE).is_some();
    let response = next.run(req).await;
    let replaced = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(FLASH_COOKIE));
    if had_flash && !response.status().is_redirection() && !replaced {
        with_cookie(response, cookies::clear(FLASH_COOKIE))
    } else {
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_keeps_only_the_path() {
        let mut headers = HeaderMap::new();
        assert_eq!(back(&headers), "/");

        headers.insert(REFERER, HeaderValue::from_static("https://saaslist.dev/products/42?x=1"));
        assert_eq!(back(&headers), "/products/42?x=1");

        headers.insert(REFERER, HeaderValue::from_static("https://saaslist.dev"));
        assert_eq!(back(&headers), "/");
    }

    #[test]
    fn test_local_path() {
        assert!(local_path("/products/new"));
        assert!(!local_path("//evil.example"));
        assert!(!local_path("https://evil.example"));
        assert!(!local_path("/\\evil.example"));
    }
}
