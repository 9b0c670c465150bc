use askama::Template;
use axum::extract::State;
use axum::response::Html;
use chrono::Utc;

use crate::error::ApiError;
use crate::extract::{IncomingFlash, Viewer};
use crate::state::AppState;
use crate::views::{BoardView, HomePage, Layout};

pub async fn index(
    State(state): State<AppState>,
    viewer: Viewer,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Html<String>, ApiError> {
    let boards = state.products.home(Utc::now()).await?;
    let page = HomePage {
        layout: Layout::new(viewer.profile(), flash),
        boards: boards.into_iter().map(BoardView::from).collect(),
    };
    Ok(Html(page.render()?))
}
