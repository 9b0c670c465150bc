//! Maps domain failures onto rendered error pages.
//!
//! A handler returning [`ApiError`] has no access to the request, so the
//! page it renders carries an empty header. The response also carries an
//! [`ErrorDetails`] extension, which [`crate::handlers::with_viewer`] uses to
//! render the page again with the viewer and flash of the current request.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use domains::DomainError;
use tracing::error;

use crate::views::{ErrorPage, Layout};

#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        Self(DomainError::internal(format!("template rendering failed: {err}")))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Validation(_) | DomainError::InvalidFields(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// What an error page shows, minus the header.
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub status: StatusCode,
    pub message: String,
}

impl ErrorDetails {
    /// Renders the page under `layout`, keeping `details` on the response.
    pub fn render(self, layout: Layout) -> Response {
        let page = ErrorPage {
            layout,
            status: self.status.as_u16(),
            title: self.status.canonical_reason().unwrap_or("Error"),
            message: self.message.clone(),
        };
        let mut response = match page.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(err) => {
                error!(%err, "failed to render error page");
                self.status.into_response()
            }
        };
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.0 {
            DomainError::Internal(detail) => {
                error!(%detail, "request failed");
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        };
        ErrorDetails { status, message }.render(Layout::default())
    }
}
