//! HTTP surface for rolodex.
//!
//! Routes:
//! - `GET|POST /api/persons`, `GET|PUT|DELETE /api/persons/:id`
//! - `GET|POST /api/blogs`, `GET|PUT|DELETE /api/blogs/:id`
//! - `GET /info`, `GET /health`
//!
//! Anything else, including an unsupported method on a known path, answers
//! 404 `{"error": "unknown endpoint"}`.

mod error;
pub mod handlers;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::record::{Blog, Person};
use crate::store::RecordStore;

pub use error::{ApiError, INTERNAL_ERROR_MESSAGE, MALFORMED_ID_MESSAGE, UNKNOWN_ENDPOINT_MESSAGE};

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState<S> {
    /// The record store.
    pub store: Arc<S>,
}

impl<S> AppState<S> {
    /// Wrap `store` for sharing across requests.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

/// Build the application router.
///
/// `cors` adds a permissive CORS layer for browser frontends served from
/// another origin.
pub fn router<S: RecordStore>(state: AppState<S>, cors: bool) -> Router {
    let app = Router::new()
        .route(
            "/api/persons",
            get(handlers::list::<S, Person>)
                .post(handlers::create::<S, Person>)
                .fallback(handlers::unknown_endpoint),
        )
        .route(
            "/api/persons/:id",
            get(handlers::show::<S, Person>)
                .put(handlers::update::<S, Person>)
                .delete(handlers::remove::<S, Person>)
                .fallback(handlers::unknown_endpoint),
        )
        .route(
            "/api/blogs",
            get(handlers::list::<S, Blog>)
                .post(handlers::create::<S, Blog>)
                .fallback(handlers::unknown_endpoint),
        )
        .route(
            "/api/blogs/:id",
            get(handlers::show::<S, Blog>)
                .put(handlers::update::<S, Blog>)
                .delete(handlers::remove::<S, Blog>)
                .fallback(handlers::unknown_endpoint),
        )
        .route(
            "/info",
            get(handlers::info::<S>).fallback(handlers::unknown_endpoint),
        )
        .route(
            "/health",
            get(handlers::health).fallback(handlers::unknown_endpoint),
        )
        .fallback(handlers::unknown_endpoint)
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http());

    if cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Bind to the configured address and serve until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve<S: RecordStore>(store: S, config: &ServerConfig) -> Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    serve_with_shutdown(listener, AppState::new(store), config.cors, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails.
pub async fn serve_with_shutdown<S, F>(
    listener: TcpListener,
    state: AppState<S>,
    cors: bool,
    shutdown: F,
) -> Result<()>
where
    S: RecordStore,
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = listener.local_addr()?;
    info!("Server running on http://{addr}");

    axum::serve(listener, router(state, cors))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
