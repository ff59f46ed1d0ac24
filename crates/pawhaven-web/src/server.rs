// pawhaven-web/src/server.rs
// ============================================================================
// Module: Shelter Server
// Description: Store wiring, route table, and the HTTP listener.
// Purpose: Serve the PawHaven site from a validated configuration.
// Dependencies: axum, tokio, tracing, pawhaven-config, pawhaven-store-sqlite
// ============================================================================

//! ## Overview
//! [`ShelterServer::from_config`] validates configuration, opens the
//! configured store, selects an audit sink, and compiles templates.
//! [`build_router`] holds the full route table so tests can drive it
//! in-process without a listener.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::ConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::middleware::from_fn_with_state;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use pawhaven_config::PawhavenConfig;
use pawhaven_core::InMemoryShelterStore;
use pawhaven_core::Shelter;
use pawhaven_core::SharedShelterStore;
use pawhaven_store_sqlite::SqliteShelterStore;

use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::RequestAuditEvent;
use crate::audit::RequestAuditEventParams;
use crate::audit::ShelterAuditSink;
use crate::audit::StderrAuditSink;
use crate::handlers::accounts;
use crate::handlers::admin;
use crate::handlers::adoption;
use crate::handlers::public;
use crate::state::AppState;

// ============================================================================
// SECTION: Shelter Server
// ============================================================================

/// PawHaven HTTP server instance.
pub struct ShelterServer {
    /// Server configuration.
    config: PawhavenConfig,
    /// Shared handler state.
    state: Arc<AppState>,
}

impl ShelterServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when validation or initialization fails.
    pub fn from_config(config: PawhavenConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let store = build_store(&config)?;
        let shelter = Shelter::new(store, config.shelter_settings());
        let audit = build_audit_sink(&config)?;
        let state = AppState::new(shelter, &config.session)?.with_audit(audit);
        Ok(Self { config, state: Arc::new(state) })
    }

    /// Returns the route table bound to this server's state.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state), self.config.server.max_body_bytes)
    }

    /// Binds the configured address and serves until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr =
            self.config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        tracing::info!(%addr, "pawhaven listening");
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Opens the configured shelter store.
///
/// # Errors
///
/// Returns [`ServerError::Init`] when the `SQLite` store cannot be opened.
pub fn build_store(config: &PawhavenConfig) -> Result<SharedShelterStore, ServerError> {
    let store = match config.store.sqlite() {
        None => SharedShelterStore::from_store(InMemoryShelterStore::new()),
        Some(sqlite_config) => {
            let store = SqliteShelterStore::new(&sqlite_config)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            SharedShelterStore::from_store(store)
        }
    };
    Ok(store)
}

/// Selects the audit sink for `[server.audit]`.
fn build_audit_sink(config: &PawhavenConfig) -> Result<Arc<dyn ShelterAuditSink>, ServerError> {
    let audit = &config.server.audit;
    if !audit.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match audit.path.as_deref() {
        Some(path) => {
            let sink = FileAuditSink::new(Path::new(path))
                .map_err(|err| ServerError::Init(format!("audit log {path}: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Routes
// ============================================================================

/// Builds the full route table over `state`.
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let staff = Router::new()
        .route("/", get(admin::dashboard))
        .route("/stats", get(admin::stats))
        .route("/applications", get(admin::applications))
        .route("/applications/{id}", get(admin::application_detail))
        .route("/applications/{id}/status", post(admin::update_application_status))
        .route("/applications/{id}/notes", post(admin::update_application_notes))
        .route("/pets", get(admin::pets))
        .route("/pets/new", get(admin::new_pet).post(admin::create_pet))
        .route("/pets/{id}/edit", get(admin::edit_pet).post(admin::update_pet))
        .route("/pets/{id}/status", post(admin::update_pet_status))
        .route("/pets/{id}/featured", post(admin::toggle_pet_featured))
        .route("/messages", get(admin::messages))
        .route("/messages/{id}/{action}", post(admin::update_message))
        .route("/stories/new", get(admin::new_story).post(admin::create_story));

    Router::new()
        .route("/", get(public::home))
        .route("/about", get(public::about))
        .route("/pets", get(public::pets))
        .route("/pet/{id}/{slug}", get(public::pet_detail))
        .route("/contact", get(public::contact).post(public::submit_contact))
        .route("/adoption/process", get(public::adoption_process))
        .route("/success-stories", get(public::success_stories))
        .route("/adoption/apply", get(adoption::apply).post(adoption::submit))
        .route(
            "/adoption/apply/{pet_id}",
            get(adoption::apply_for_pet).post(adoption::submit_for_pet),
        )
        .route("/register", get(accounts::register).post(accounts::submit_registration))
        .route("/login", get(accounts::login).post(accounts::submit_login))
        .route("/logout", get(accounts::logout))
        .route("/account", get(accounts::account))
        .route("/account/applications", get(accounts::account_applications))
        .route("/account/edit", get(accounts::edit_profile).post(accounts::update_profile))
        .nest("/admin-dashboard", staff)
        .fallback(public::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(from_fn_with_state(Arc::clone(&state), audit_requests))
        .with_state(state)
}

/// Records one request audit event per exchange.
async fn audit_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let peer_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(peer)| peer.ip().to_string());
    let response = next.run(request).await;
    state.audit.record_request(&RequestAuditEvent::new(RequestAuditEventParams {
        method,
        path,
        status: response.status().as_u16(),
        peer_ip,
    }));
    response
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Shelter server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use pawhaven_config::StoreType;

    use super::*;

    #[test]
    fn invalid_config_is_a_config_error() {
        let mut config = PawhavenConfig::default();
        config.server.bind = "not an address".to_string();
        let result = ShelterServer::from_config(config);
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[test]
    fn memory_store_builds_without_disk() {
        let mut config = PawhavenConfig::default();
        config.store.store_type = StoreType::Memory;
        config.server.audit.enabled = false;
        assert!(ShelterServer::from_config(config).is_ok());
    }

    #[test]
    fn sqlite_store_opens_at_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PawhavenConfig::default();
        config.store.path = Some(dir.path().join("shelter.db"));
        let store = build_store(&config).unwrap();
        drop(store);
        assert!(dir.path().join("shelter.db").exists());
    }

    #[test]
    fn unwritable_audit_path_fails_init() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PawhavenConfig::default();
        config.store.store_type = StoreType::Memory;
        config.server.audit.path =
            Some(dir.path().join("missing").join("audit.log").display().to_string());
        let result = ShelterServer::from_config(config);
        assert!(matches!(result, Err(ServerError::Init(_))));
    }
}
