//! # SaasList server
//!
//! Loads settings, opens the configured storage backend, wires the services
//! and serves the axum router until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{AppState, CookiePolicy, Metrics};
use auth_adapters::jwt::JwtSessionIssuer;
use auth_adapters::password::Argon2Hasher;
use configs::{DatabaseBackend, DatabaseSettings, LogFormat, Settings};
use domains::{CommentRepository, ProductRepository, ProfileRepository, UpvoteRepository};
use secrecy::ExposeSecret;
use services::{CommentService, ProductService, SessionService, UpvoteService};
use storage_adapters::MemoryStore;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The four repository ports, all served by one backend.
struct Repositories {
    products: Arc<dyn ProductRepository>,
    upvotes: Arc<dyn UpvoteRepository>,
    comments: Arc<dyn CommentRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl Repositories {
    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ProductRepository + UpvoteRepository + CommentRepository + ProfileRepository + 'static,
    {
        Self {
            products: store.clone(),
            upvotes: store.clone(),
            comments: store.clone(),
            profiles: store,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    init_tracing(settings.log.format);

    let repos = open_storage(&settings.database).await?;
    let state = build_state(&settings, repos)?;

    let addr = settings.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "SaasList listening");

    axum::serve(listener, api_adapters::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("shut down cleanly");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn open_storage(database: &DatabaseSettings) -> anyhow::Result<Repositories> {
    match database.backend {
        DatabaseBackend::Memory => {
            info!("using in-memory storage; data is lost on restart");
            Ok(Repositories::from_store(Arc::new(MemoryStore::new())))
        }
        #[cfg(feature = "db-postgres")]
        DatabaseBackend::Postgres => {
            let store = storage_adapters::PgStore::connect(
                database.url.expose_secret(),
                database.max_connections,
            )
            .await
            .context("failed to connect to postgres")?;
            store.migrate().await.context("failed to run migrations")?;
            Ok(Repositories::from_store(Arc::new(store)))
        }
        #[cfg(not(feature = "db-postgres"))]
        DatabaseBackend::Postgres => {
            anyhow::bail!("database.backend = \"postgres\" but the db-postgres feature is off")
        }
    }
}

fn build_state(settings: &Settings, repos: Repositories) -> anyhow::Result<AppState> {
    let offset = settings.leaderboard.offset()?;
    let issuer = JwtSessionIssuer::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        settings.auth.session_ttl(),
    );

    let upvotes = Arc::new(UpvoteService::new(repos.upvotes));
    let comments = Arc::new(CommentService::new(
        repos.comments,
        repos.products.clone(),
        settings.comments.max_depth,
    ));
    let products = Arc::new(ProductService::new(
        repos.products,
        upvotes.clone(),
        comments.clone(),
        settings.leaderboard.limit,
        offset,
    ));
    let sessions = Arc::new(SessionService::new(
        repos.profiles,
        Arc::new(Argon2Hasher::new()),
        Arc::new(issuer),
    ));

    Ok(AppState {
        products,
        upvotes,
        comments,
        sessions,
        metrics: Arc::new(Metrics::new()),
        cookies: CookiePolicy {
            secure: settings.auth.secure_cookies,
            session_ttl: settings.auth.session_ttl(),
        },
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
