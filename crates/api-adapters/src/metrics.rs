//! Prometheus metrics exposed on `/metrics`.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;
use services::UpvoteAction;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    pub method: String,
    pub status: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct UpvoteLabels {
    pub action: String,
}

pub struct Metrics {
    registry: Registry,
    http_requests: Family<HttpLabels, Counter>,
    upvotes_toggled: Family<UpvoteLabels, Counter>,
    comments_posted: Counter,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("saaslist");
        let http_requests = Family::<HttpLabels, Counter>::default();
        let upvotes_toggled = Family::<UpvoteLabels, Counter>::default();
        let comments_posted = Counter::default();

        registry.register("http_requests", "Handled HTTP requests", http_requests.clone());
        registry.register("upvotes_toggled", "Upvotes added or removed", upvotes_toggled.clone());
        registry.register(
            "comments_posted",
            "Comments and replies created",
            comments_posted.clone(),
        );

        Self {
            registry,
            http_requests,
            upvotes_toggled,
            comments_posted,
        }
    }

    pub fn record_request(&self, method: &str, status: u16) {
        self.http_requests
            .get_or_create(&HttpLabels {
                method: method.to_string(),
                status: status.to_string(),
            })
            .inc();
    }

    pub fn record_upvote(&self, action: UpvoteAction) {
        let action = match action {
            UpvoteAction::Added => "added",
            UpvoteAction::Removed => "removed",
        };
        self.upvotes_toggled
            .get_or_create(&UpvoteLabels {
                action: action.to_string(),
            })
            .inc();
    }

    pub fn record_comment(&self) {
        self.comments_posted.inc();
    }

    /// OpenMetrics text exposition.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}

#[cfg(feature = "web-axum")]
pub use middleware::track;

#[cfg(feature = "web-axum")]
mod middleware {
    use axum::extract::{Request, State};
    use axum::middleware::Next;
    use axum::response::Response;

    use crate::state::AppState;

    /// Counts every request by method and final status.
    pub async fn track(State(state): State<AppState>, req: Request, next: Next) -> Response {
        let method = req.method().to_string();
        let response = next.run(req).await;
        state.metrics.record_request(&method, response.status().as_u16());
        response
    }
}
