//! # api-adapters
//!
//! The server-rendered HTML surface of SaasList. Templates, flash
//! cookies and metrics are always compiled; the axum router and its
//! handlers sit behind the `web-axum` feature.

pub mod cookies;
pub mod flash;
pub mod metrics;
pub mod views;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod state;

pub use flash::{Flash, FlashKind};
pub use metrics::Metrics;

#[cfg(feature = "web-axum")]
pub use state::{AppState, CookiePolicy};

#[cfg(feature = "web-axum")]
pub fn router(state: AppState) -> axum::Router {
    use axum::http::Request;
    use axum::middleware;
    use axum::routing::{get, post};
    use axum::Router;
    use tower_http::compression::CompressionLayer;
    use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
    use tower_http::trace::TraceLayer;

    use handlers::{auth, comments, home, products, system};

    Router::new()
        .route("/", get(home::index))
        .route("/products", post(products::create))
        .route("/products/new", get(products::new_form))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/upvote", post(products::upvote))
        .route("/products/{id}/comments", post(comments::create))
        .route("/comments/{id}/edit", post(comments::edit))
        .route("/comments/{id}/delete", post(comments::delete))
        .route("/comments/{id}/flag", post(comments::flag))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/healthz", get(system::healthz))
        .route("/metrics", get(system::metrics))
        .fallback(system::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), handlers::with_viewer))
        .layer(middleware::from_fn(handlers::consume_flash))
        .layer(middleware::from_fn_with_state(state.clone(), metrics::track))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<axum::body::Body>| {
                let request_id = req
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CompressionLayer::new())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
