use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Form;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{back, failure, redirect_with};
use crate::extract::Viewer;
use crate::flash::Flash;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewCommentForm {
    pub content: String,
    /// Present on reply forms only
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct EditCommentForm {
    pub content: String,
}

fn anchor(product_id: Uuid, comment_id: Uuid) -> String {
    format!("/products/{product_id}#comment-{comment_id}")
}

pub async fn create(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    viewer: Viewer,
    Form(form): Form<NewCommentForm>,
) -> Response {
    let result = state
        .comments
        .create(viewer.id(), product_id, form.parent_id, &form.content, Utc::now())
        .await;
    match result {
        Ok(comment) => {
            state.metrics.record_comment();
            let message = if comment.parent_id.is_some() {
                "Reply posted"
            } else {
                "Comment posted"
            };
            redirect_with(&state, &anchor(product_id, comment.id), Flash::success(message))
        }
        Err(err) => redirect_with(&state, &format!("/products/{product_id}"), failure(err)),
    }
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    viewer: Viewer,
    headers: HeaderMap,
    Form(form): Form<EditCommentForm>,
) -> Response {
    match state.comments.edit(viewer.id(), id, &form.content, Utc::now()).await {
        Ok(comment) => redirect_with(
            &state,
            &anchor(comment.product_id, comment.id),
            Flash::success("Comment updated"),
        ),
        Err(err) => redirect_with(&state, &back(&headers), failure(err)),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    viewer: Viewer,
    headers: HeaderMap,
) -> Response {
    match state.comments.delete(viewer.id(), id).await {
        Ok(comment) => redirect_with(
            &state,
            &format!("/products/{}", comment.product_id),
            Flash::success("Comment deleted"),
        ),
        Err(err) => redirect_with(&state, &back(&headers), failure(err)),
    }
}

pub async fn flag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    viewer: Viewer,
    headers: HeaderMap,
) -> Response {
    match state.comments.flag(viewer.id(), id).await {
        Ok(comment) => redirect_with(
            &state,
            &anchor(comment.product_id, comment.id),
            Flash::success("Comment flagged for review"),
        ),
        Err(err) => redirect_with(&state, &back(&headers), failure(err)),
    }
}
