mod body;
mod caption;
mod error;
mod routes;
mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use synapse_config::Config;
use synapse_vision::CaptionFilter;
use tower_http::trace::TraceLayer;

pub use body::BODY_LIMIT_BYTES;
pub use caption::{CHAT_COMPLETIONS_PATH, caption_middleware};
pub use error::FilterError;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the vision client cannot be constructed
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let filter = CaptionFilter::from_config(&config.vision)?;
        Self::with_filter(config, Arc::new(filter))
    }

    /// Build the server around an already constructed filter
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream HTTP client cannot be constructed
    pub fn with_filter(config: &Config, filter: Arc<CaptionFilter>) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 9099)));

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, get(routes::health_handler));
        }

        // Filter host endpoints
        app = app.merge(
            Router::new()
                .route("/v1/filters", get(routes::list_filters))
                .route("/v1/filter/inlet", post(routes::filter_inlet))
                .with_state(Arc::clone(&filter)),
        );

        // Chat completions rewritten in flight, then forwarded
        if let Some(ref upstream_config) = config.server.upstream {
            tracing::info!(upstream = %upstream_config.base_url, "forwarding chat completions upstream");

            let upstream = upstream::Upstream::new(upstream_config)
                .map_err(|e| anyhow::anyhow!("failed to build upstream HTTP client: {e}"))?;
            let upstream = Arc::new(upstream);
            let forward = Router::new()
                .route(CHAT_COMPLETIONS_PATH, post(upstream::forward_chat_completion))
                .with_state(upstream)
                .layer(axum::middleware::from_fn(move |req, next| {
                    let filter = Arc::clone(&filter);
                    async move { caption_middleware(filter, req, next).await }
                }));
            app = app.merge(forward);
        }

        app = app.layer(TraceLayer::new_for_http());

        Ok(Self { router: app, listen_address })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }

    /// Replace the listen address, e.g. from a command-line override
    #[must_use]
    pub fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }
}
