use std::net::SocketAddr;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, ConfigError, CorsOrigins};
use crate::{handlers, state::AppState};

/// Upper bound for `POST /email-verification` bodies.
const BODY_LIMIT_BYTES: usize = 16 * 1024;

pub struct MembraneServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the CORS layer for the configured origins.
pub fn cors_layer(config: &AppConfig) -> Result<CorsLayer, ConfigError> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(match config.cors_origins()? {
        CorsOrigins::Any => cors.allow_origin(Any),
        CorsOrigins::List(origins) => {
            let origins = origins
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o).map_err(|e| {
                        ConfigError::Invalid(format!("CORS origin '{o}': {e}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            cors.allow_origin(origins)
        }
    })
}

pub fn build_app(state: AppState, config: &AppConfig) -> Result<Router, ConfigError> {
    let cors = cors_layer(config)?;
    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/login", get(handlers::login))
        .route("/email-verification", post(handlers::email_verification))
        .route(&config.sso.verification_path, get(handlers::authenticate))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(BODY_LIMIT_BYTES))
                .layer(
                    TraceLayer::new_for_http()
                        // Query strings carry tokens, so only the path is recorded.
                        .make_span_with(|req: &axum::http::Request<_>| {
                            tracing::info_span!(
                                "http.request",
                                http.method = %req.method(),
                                http.path = %req.uri().path(),
                                http.status_code = tracing::field::Empty,
                            )
                        })
                        .on_response(
                            |res: &axum::http::Response<_>,
                             latency: std::time::Duration,
                             span: &tracing::Span| {
                                span.record(
                                    "http.status_code",
                                    tracing::field::display(res.status().as_u16()),
                                );
                                tracing::info!(
                                    http.status = %res.status().as_u16(),
                                    elapsed_ms = %latency.as_millis(),
                                    "request handled"
                                );
                            },
                        ),
                )
                .layer(cors),
        );
    Ok(router)
}

pub struct ServerBuilder {
    config: AppConfig,
    state: Option<AppState>,
}

impl ServerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Uses prebuilt state instead of wiring it from the configuration.
    pub fn with_state(mut self, state: AppState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn build(self) -> Result<MembraneServer, ConfigError> {
        let state = match self.state {
            Some(state) => state,
            None => AppState::from_config(&self.config)?,
        };
        let app = build_app(state, &self.config)?;

        Ok(MembraneServer {
            addr: self.config.addr(),
            app,
        })
    }
}

impl MembraneServer {
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
