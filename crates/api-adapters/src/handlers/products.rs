use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Utc;
use domains::DomainError;
use serde::Deserialize;
use services::{flatten, ProductDraft};
use tracing::info;
use uuid::Uuid;

use super::{failure, redirect_with};
use crate::error::ApiError;
use crate::extract::{IncomingFlash, Viewer};
use crate::flash::Flash;
use crate::state::AppState;
use crate::views::{Layout, NewProductPage, ProductPage};

const SUBMIT_LOGIN: &str = "/login?next=/products/new";

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    viewer: Viewer,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Html<String>, ApiError> {
    let detail = state.products.detail(id, viewer.id()).await?;
    let page = ProductPage::new(
        Layout::new(viewer.profile(), flash),
        detail.product,
        detail.is_upvoted,
        flatten(detail.comments),
        Utc::now(),
    );
    Ok(Html(page.render()?))
}

pub async fn new_form(
    viewer: Viewer,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, ApiError> {
    let Some(profile) = viewer.profile() else {
        return Ok(Redirect::to(SUBMIT_LOGIN).into_response());
    };
    let page = NewProductPage::new(
        Layout::new(Some(profile), flash),
        &ProductDraft::default(),
        Vec::new(),
    );
    Ok(Html(page.render()?).into_response())
}

/// Checkbox groups repeat their key, so the form is read as raw pairs.
pub async fn create(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let Some(profile) = viewer.profile() else {
        return Ok(redirect_with(
            &state,
            SUBMIT_LOGIN,
            Flash::error("You must be logged in to submit a product"),
        ));
    };
    let draft = draft_from_fields(fields);
    match state.products.submit(viewer.id(), draft.clone(), Utc::now()).await {
        Ok(product) => Ok(redirect_with(
            &state,
            &format!("/products/{}", product.id),
            Flash::success("Product submitted!"),
        )),
        Err(DomainError::InvalidFields(errors)) => {
            let page = NewProductPage::new(Layout::new(Some(profile), None), &draft, errors);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page.render()?)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpvoteForm {
    #[serde(default)]
    pub is_upvoted: bool,
}

pub async fn upvote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    viewer: Viewer,
    Form(form): Form<UpvoteForm>,
) -> Response {
    let to = format!("/products/{id}");
    match state.upvotes.toggle(viewer.id(), id, form.is_upvoted).await {
        Ok(action) => {
            state.metrics.record_upvote(action);
            info!(product_id = %id, ?action, "upvote toggled");
            redirect_with(&state, &to, Flash::success(action.message()))
        }
        Err(err) => redirect_with(&state, &to, failure(err)),
    }
}

fn draft_from_fields(fields: Vec<(String, String)>) -> ProductDraft {
    let mut draft = ProductDraft::default();
    for (key, value) in fields {
        match key.as_str() {
            "name" => draft.name = value,
            "tagline" => draft.tagline = value,
            "website_url" => draft.website_url = value,
            "repo_url" => draft.repo_url = Some(value),
            "is_open_source" => draft.is_open_source = matches!(value.as_str(), "true" | "on"),
            "description" => draft.description = value,
            "tags" => draft.tags.extend(
                value
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
            ),
            "logo_url" => draft.logo_url = Some(value),
            "demo_url" => draft.demo_url = Some(value),
            "pricing_model" => draft.pricing_model = value,
            "promo_code" => draft.promo_code = Some(value),
            "twitter_url" => draft.twitter_url = Some(value),
            "linkedin_url" => draft.linkedin_url = Some(value),
            "product_hunt_url" => draft.product_hunt_url = Some(value),
            "platforms" => draft.platforms.push(value),
            _ => {}
        }
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_draft_from_fields() {
        let draft = draft_from_fields(vec![
            pair("name", "Invoicely"),
            pair("tags", "finance, billing,,"),
            pair("platforms", "web"),
            pair("platforms", "ios"),
            pair("is_open_source", "true"),
            pair("repo_url", "https://github.com/acme/invoicely"),
            pair("csrf", "ignored"),
        ]);
        assert_eq!(draft.name, "Invoicely");
        assert_eq!(draft.tags, vec!["finance", "billing"]);
        assert_eq!(draft.platforms, vec!["web", "ios"]);
        assert!(draft.is_open_source);
        assert_eq!(draft.repo_url.as_deref(), Some("https://github.com/acme/invoicely"));
        assert_eq!(draft.logo_url, None);
    }
}
