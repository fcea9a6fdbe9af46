use crate::handlers;
use crate::state::ApiState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    state: Arc<ApiState>,
}

impl ApiServer {
    #[must_use]
    pub const fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/pipeline/run", post(handlers::run_pipeline))
            .route("/api/quota", get(handlers::quota))
            .route("/api/signals/overview", get(handlers::overview))
            .route("/api/signals/:symbol/latest", get(handlers::latest_signal))
            .route(
                "/api/signals/:symbol/timeseries",
                get(handlers::signal_timeseries),
            )
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or
    /// serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Web API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
