use askama::Template;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Utc;
use domains::DomainError;
use serde::Deserialize;

use super::{local_path, with_cookie};
use crate::cookies::{self, FLASH_COOKIE, SESSION_COOKIE};
use crate::error::ApiError;
use crate::extract::{IncomingFlash, Viewer};
use crate::flash::Flash;
use crate::state::AppState;
use crate::views::{Layout, LoginPage, SignupPage};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

fn next_or_home(next: Option<String>) -> String {
    next.filter(|path| local_path(path))
        .unwrap_or_else(|| "/".to_string())
}

pub async fn login_form(
    Query(query): Query<NextQuery>,
    viewer: Viewer,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, ApiError> {
    let next = next_or_home(query.next);
    if viewer.profile().is_some() {
        return Ok(Redirect::to(&next).into_response());
    }
    let page = LoginPage {
        layout: Layout::new(None, flash),
        email: String::new(),
        next,
        error: None,
    };
    Ok(Html(page.render()?).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let next = next_or_home(form.next);
    match state.sessions.login(&form.email, &form.password, Utc::now()).await {
        Ok((profile, token)) => {
            let welcome = Flash::success(format!("Welcome back, {}", profile.display_name()));
            Ok(signed_in(&state, &next, &token, welcome))
        }
        Err(DomainError::Unauthorized(message)) => {
            let page = LoginPage {
                layout: Layout::default(),
                email: form.email,
                next,
                error: Some(message),
            };
            Ok((StatusCode::UNAUTHORIZED, Html(page.render()?)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn signup_form(
    Query(query): Query<NextQuery>,
    viewer: Viewer,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, ApiError> {
    let next = next_or_home(query.next);
    if viewer.profile().is_some() {
        return Ok(Redirect::to(&next).into_response());
    }
    let page = SignupPage {
        layout: Layout::new(None, flash),
        name: String::new(),
        email: String::new(),
        next,
        error: None,
    };
    Ok(Html(page.render()?).into_response())
}

pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, ApiError> {
    let next = next_or_home(form.next);
    let result = state
        .sessions
        .sign_up(&form.name, &form.email, &form.password, Utc::now())
        .await;
    let (status, message) = match result {
        Ok((profile, token)) => {
            let welcome = Flash::success(format!("Welcome, {}", profile.display_name()));
            return Ok(signed_in(&state, &next, &token, welcome));
        }
        Err(DomainError::Validation(message)) => (StatusCode::UNPROCESSABLE_ENTITY, message),
        Err(DomainError::Conflict(message)) => (StatusCode::CONFLICT, message),
        Err(err) => return Err(err.into()),
    };
    let page = SignupPage {
        layout: Layout::default(),
        name: form.name,
        email: form.email,
        next,
        error: Some(message),
    };
    Ok((status, Html(page.render()?)).into_response())
}

fn signed_in(state: &AppState, next: &str, token: &str, welcome: Flash) -> Response {
    let session = cookies::set(
        SESSION_COOKIE,
        token,
        Some(state.cookies.session_ttl),
        state.cookies.secure,
    );
    let response = with_cookie(Redirect::to(next).into_response(), session);
    with_cookie(
        response,
        cookies::set(FLASH_COOKIE, &welcome.encode(), None, state.cookies.secure),
    )
}

/// Sessions are stateless; dropping the cookie is the whole sign-out.
pub async fn logout(State(state): State<AppState>) -> Response {
    let response = with_cookie(
        Redirect::to("/login").into_response(),
        cookies::clear(SESSION_COOKIE),
    );
    with_cookie(
        response,
        cookies::set(
            FLASH_COOKIE,
            &Flash::success("Signed out").encode(),
            None,
            state.cookies.secure,
        ),
    )
}
