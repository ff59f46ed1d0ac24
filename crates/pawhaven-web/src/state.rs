// pawhaven-web/src/state.rs
// ============================================================================
// Module: Application State
// Description: Shared handler state and the blocking-call bridge.
// Purpose: Bundle the shelter service with templates, hashing, audit, and time.
// Dependencies: pawhaven-core, pawhaven-config, tokio
// ============================================================================

//! ## Overview
//! [`AppState`] is shared by every handler behind an `Arc`. Store calls and
//! password hashing are synchronous; handlers route them through
//! [`blocking`] so they do not stall the async workers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use pawhaven_config::SessionConfig;
use pawhaven_core::PasswordHasher;
use pawhaven_core::Shelter;
use pawhaven_core::SharedShelterStore;

use crate::audit::NoopAuditSink;
use crate::audit::ShelterAuditEvent;
use crate::audit::ShelterAuditEventParams;
use crate::audit::ShelterAuditKind;
use crate::audit::ShelterAuditSink;
use crate::auth::Argon2PasswordHasher;
use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::server::ServerError;
use crate::session::SessionCookie;
use crate::templates::Templates;

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared state for every request handler.
pub struct AppState {
    /// Shelter service.
    pub(crate) shelter: Shelter<SharedShelterStore>,
    /// Compiled page templates.
    pub(crate) templates: Templates,
    /// Password hasher.
    pub(crate) hasher: Arc<dyn PasswordHasher>,
    /// Audit sink.
    pub(crate) audit: Arc<dyn ShelterAuditSink>,
    /// Time source.
    pub(crate) clock: Arc<dyn Clock>,
    /// Session cookie policy.
    pub(crate) cookie: SessionCookie,
}

impl AppState {
    /// Builds state with Argon2 hashing, no audit output, and the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Init`] when the templates fail to compile.
    pub fn new(
        shelter: Shelter<SharedShelterStore>,
        session: &SessionConfig,
    ) -> Result<Self, ServerError> {
        let templates = Templates::new().map_err(|err| ServerError::Init(err.to_string()))?;
        let cookie = SessionCookie::new(
            &session.cookie_name,
            session.secure_cookie,
            shelter.settings().session_ttl_minutes,
        );
        Ok(Self {
            shelter,
            templates,
            hasher: Arc::new(Argon2PasswordHasher),
            audit: Arc::new(NoopAuditSink),
            clock: Arc::new(SystemClock),
            cookie,
        })
    }

    /// Replaces the password hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn ShelterAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the shelter service.
    #[must_use]
    pub const fn shelter(&self) -> &Shelter<SharedShelterStore> {
        &self.shelter
    }

    /// Writes a shelter action to the audit sink.
    pub(crate) fn audit(
        &self,
        kind: ShelterAuditKind,
        actor: Option<&str>,
        target: Option<String>,
        detail: Option<String>,
    ) {
        self.audit.record(&ShelterAuditEvent::new(ShelterAuditEventParams {
            kind,
            actor: actor.map(str::to_string),
            target,
            detail,
        }));
    }
}

// ============================================================================
// SECTION: Blocking Bridge
// ============================================================================

/// Runs synchronous work, shifting to a blocking context when available.
pub(crate) fn blocking<T>(op: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(op)
        }
        _ => op(),
    }
}
