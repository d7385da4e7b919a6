//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the service layer from configuration and shared components
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Swap the service layer when the configuration file changes
//! - Sweep expired sessions and drafts in the background
//! - Serve until the shutdown signal, then flush the store

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::routing::{get, post};
use axum::{middleware, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::admin::setup_admin_router;
use crate::agreement::AgreementService;
use crate::config::AppConfig;
use crate::http::middleware::metrics::track_metrics;
use crate::http::routes::{agreements, health, maintenance, prediction, properties, verification};
use crate::identity::{IdentityService, SimulatedOtp};
use crate::lifecycle::{spawn_sweeper, Components};
use crate::listings::{ListingLimits, ListingService};
use crate::mail::{build_mailer, MailError};
use crate::maintenance::{MaintenanceService, NotificationSettings};
use crate::observability::tracing::make_request_span;
use crate::prediction::{PredictionClient, PredictionError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to build mail client: {0}")]
    Mail(#[from] MailError),

    #[error("Failed to build prediction client: {0}")]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One generation of the service layer, rebuilt on every config reload.
pub struct Services {
    pub config: AppConfig,
    pub listings: ListingService,
    pub identity: IdentityService,
    pub maintenance: MaintenanceService,
    pub agreements: AgreementService,
    pub prediction: PredictionClient,
}

impl Services {
    pub fn build(config: AppConfig, components: &Components) -> Result<Self, ServerError> {
        let upstream_timeout = Duration::from_secs(config.timeouts.upstream_secs);

        let listings = ListingService::new(
            components.store.clone(),
            components.blobs.clone(),
            ListingLimits::from(&config.listings),
        );
        let identity = IdentityService::new(
            components.store.clone(),
            components.sessions.clone(),
            Arc::new(SimulatedOtp::new(&config.identity)),
        );
        let maintenance = MaintenanceService::new(
            components.store.clone(),
            build_mailer(&config.mail, upstream_timeout)?,
            NotificationSettings::from(&config.mail),
        );
        let agreements = AgreementService::new(
            components.store.clone(),
            components.drafts.clone(),
            components.ledger.clone(),
            config.blockchain.usd_per_eth,
        );
        let prediction = PredictionClient::new(&config.prediction, upstream_timeout)?;

        Ok(Self {
            config,
            listings,
            identity,
            maintenance,
            agreements,
            prediction,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<Services>>,
    pub components: Components,
}

impl AppState {
    /// The current service generation.
    pub fn services(&self) -> Arc<Services> {
        self.inner.load_full()
    }
}

/// HTTP server for the marketplace API.
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    pub fn new(config: AppConfig, components: Components) -> Result<Self, ServerError> {
        let services = Services::build(config, &components)?;
        Ok(Self {
            state: AppState {
                inner: Arc::new(ArcSwap::from_pointee(services)),
                components,
            },
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Timeout and body limit come from the configuration at startup;
    /// changing them requires a restart.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let state = self.state.clone();
        let config = state.services().config.clone();

        let api = Router::new()
            .route("/health", get(health::health))
            .route(
                "/api/properties",
                get(properties::list_properties).post(properties::submit_property),
            )
            .route("/api/properties/{key}", get(properties::get_property))
            .route("/api/verification/sessions", post(verification::start_session))
            .route(
                "/api/verification/sessions/{id}/phone/otp",
                post(verification::send_phone_otp),
            )
            .route(
                "/api/verification/sessions/{id}/phone/verify",
                post(verification::verify_phone_otp),
            )
            .route(
                "/api/verification/sessions/{id}/national-id/otp",
                post(verification::send_id_otp),
            )
            .route(
                "/api/verification/sessions/{id}/national-id/verify",
                post(verification::verify_id_otp),
            )
            .route(
                "/api/verification/sessions/{id}/complete",
                post(verification::complete),
            )
            .route("/api/maintenance/requests", post(maintenance::submit_request))
            .route(
                "/api/maintenance/houses/{house_id}/requests",
                get(maintenance::requests_for_house),
            )
            .route(
                "/api/maintenance/requests/{id}/complete",
                post(maintenance::mark_completed),
            )
            .route("/api/send-mtnc-to-owner", post(maintenance::send_owner_email))
            .route("/api/agreements/drafts", post(agreements::open_draft))
            .route(
                "/api/agreements/drafts/{id}",
                get(agreements::get_draft).patch(agreements::update_draft),
            )
            .route("/api/agreements/drafts/{id}/sign", post(agreements::sign))
            .route("/api/agreements/drafts/{id}/generate", post(agreements::generate))
            .route("/api/agreements/drafts/{id}/document", get(agreements::document))
            .route("/api/agreements/verify", post(agreements::verify))
            .route("/api/predict", post(prediction::predict))
            .route("/predict", post(prediction::passthrough))
            .nest_service("/media", ServeDir::new(&state.components.media_root))
            .with_state(state.clone());

        let app = if config.admin.enabled {
            api.merge(setup_admin_router(state))
        } else {
            api
        };

        app.layer(middleware::from_fn(track_metrics)).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| make_request_span(request)),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                .layer(DefaultBodyLimit::disable()),
        )
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// Configurations arriving on `config_updates` replace the service
    /// layer. Stores, sessions, drafts and the ledger are kept.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        let app = self.router();

        let sweep_every = Duration::from_secs(self.state.services().config.retention.sweep_interval_secs);
        let sweeper = spawn_sweeper(&self.state.components, sweep_every, shutdown.resubscribe());

        let state = self.state.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        let reloader = tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => {
                        let Some(config) = update else { break };
                        apply_config(&state, config);
                    }
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        tracing::info!(address = %addr, "HTTP server starting");
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining connections");
            })
            .await?;

        reloader.abort();
        sweeper.abort();
        if let Err(e) = self.state.components.store.flush().await {
            tracing::error!(error = %e, "Failed to flush document store");
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Swap in a service layer built from `config`, keeping the old one on failure.
pub fn apply_config(state: &AppState, config: AppConfig) {
    let current = state.services();
    if current.config.listener.bind_address != config.listener.bind_address
        || current.config.timeouts.request_secs != config.timeouts.request_secs
        || current.config.security.max_body_size != config.security.max_body_size
        || current.config.admin.enabled != config.admin.enabled
        || current.config.retention.session_ttl_secs != config.retention.session_ttl_secs
        || current.config.retention.draft_ttl_secs != config.retention.draft_ttl_secs
        || current.config.retention.sweep_interval_secs != config.retention.sweep_interval_secs
    {
        tracing::warn!("Listener, timeout, body limit, admin mount and retention changes apply after restart");
    }

    match Services::build(config, &state.components) {
        Ok(services) => {
            state.inner.store(Arc::new(services));
            tracing::info!("Service layer reloaded");
        }
        Err(e) => tracing::error!(error = %e, "Config reload failed, keeping current services"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reload_swaps_services_and_keeps_components() {
        let dir = tempfile::tempdir().unwrap();
        let components = Components::in_memory(dir.path(), "/media");
        let server = HttpServer::new(AppConfig::default(), components).unwrap();
        let state = server.state().clone();
        let session = state.services().identity.start_session();

        let mut config = AppConfig::default();
        config.prediction.endpoint = "http://127.0.0.1:18000/predict/".into();
        apply_config(&state, config);

        assert_eq!(
            state.services().prediction.endpoint(),
            "http://127.0.0.1:18000/predict/"
        );
        assert!(state
            .services()
            .identity
            .get_session(&session.session_id)
            .is_ok());
    }

    #[tokio::test]
    async fn test_router_limits_body_and_serves() {
        use axum::http::StatusCode;
        use tower::ServiceExt;

        let dir = tempfile::tempdir().unwrap();
        let components = Components::in_memory(dir.path(), "/media");
        let mut config = AppConfig::default();
        config.security.max_body_size = 64;
        config.listings.max_image_bytes = 64;
        let router = HttpServer::new(config, components).unwrap().router();

        let health = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        assert!(health.headers().contains_key("x-request-id"));

        let oversized = router
            .oneshot(
                Request::post("/api/predict")
                    .header("content-type", "application/json")
                    .header("content-length", "1024")
                    .body(Body::from(vec![b' '; 1024]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(oversized.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
