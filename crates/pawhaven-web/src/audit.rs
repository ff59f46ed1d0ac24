// pawhaven-web/src/audit.rs
// ============================================================================
// Module: Shelter Audit Logging
// Description: Structured audit events for requests and shelter actions.
// Purpose: Emit JSON-line audit records without a logging pipeline dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are plain serializable payloads written as one JSON object
//! per line. Request events cover every HTTP exchange; shelter events cover
//! the actions staff and applicants take. Sinks never fail the request: a
//! write that cannot complete is dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Shelter action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelterAuditKind {
    /// An adoption application was submitted.
    ApplicationSubmitted,
    /// Staff changed an application status.
    ApplicationStatusChanged,
    /// Staff replaced application notes.
    ApplicationNotesUpdated,
    /// A visitor registered an account.
    AccountRegistered,
    /// A sign-in succeeded.
    LoginSucceeded,
    /// A sign-in was rejected.
    LoginFailed,
    /// A session was ended.
    Logout,
    /// Staff created a pet.
    PetCreated,
    /// Staff edited a pet's details.
    PetUpdated,
    /// Staff set a pet status directly.
    PetStatusChanged,
    /// Staff toggled a pet's featured flag.
    PetFeaturedToggled,
    /// Staff triaged a contact message.
    MessageUpdated,
    /// Staff published a success story.
    StoryCreated,
}

/// Shelter action audit payload.
#[derive(Debug, Clone, Serialize)]
pub struct ShelterAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Action kind.
    pub kind: ShelterAuditKind,
    /// Username of the acting account, when signed in.
    pub actor: Option<String>,
    /// Affected record such as `application:12`.
    pub target: Option<String>,
    /// Short outcome detail.
    pub detail: Option<String>,
}

/// HTTP request audit payload.
#[derive(Debug, Clone, Serialize)]
pub struct RequestAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method.
    pub method: String,
    /// Request path without the query string.
    pub path: String,
    /// Response status code.
    pub status: u16,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
}

/// Inputs required to construct a shelter audit event.
pub struct ShelterAuditEventParams {
    /// Action kind.
    pub kind: ShelterAuditKind,
    /// Acting username.
    pub actor: Option<String>,
    /// Affected record.
    pub target: Option<String>,
    /// Outcome detail.
    pub detail: Option<String>,
}

/// Inputs required to construct a request audit event.
pub struct RequestAuditEventParams {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Response status code.
    pub status: u16,
    /// Peer IP address if known.
    pub peer_ip: Option<String>,
}

impl ShelterAuditEvent {
    /// Creates a new shelter event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ShelterAuditEventParams) -> Self {
        Self {
            event: "shelter_action",
            timestamp_ms: now_ms(),
            kind: params.kind,
            actor: params.actor,
            target: params.target,
            detail: params.detail,
        }
    }
}

impl RequestAuditEvent {
    /// Creates a new request event with a consistent timestamp.
    #[must_use]
    pub fn new(params: RequestAuditEventParams) -> Self {
        Self {
            event: "http_request",
            timestamp_ms: now_ms(),
            method: params.method,
            path: params.path,
            status: params.status,
            peer_ip: params.peer_ip,
        }
    }
}

/// Milliseconds since the unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for shelter events.
pub trait ShelterAuditSink: Send + Sync {
    /// Record a shelter action.
    fn record(&self, event: &ShelterAuditEvent);

    /// Record a completed HTTP request.
    fn record_request(&self, _event: &RequestAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ShelterAuditSink for StderrAuditSink {
    fn record(&self, event: &ShelterAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_request(&self, event: &RequestAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }

    /// Appends one serialized line.
    fn append(&self, payload: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl ShelterAuditSink for FileAuditSink {
    fn record(&self, event: &ShelterAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.append(&payload);
        }
    }

    fn record_request(&self, event: &RequestAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.append(&payload);
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl ShelterAuditSink for NoopAuditSink {
    fn record(&self, _event: &ShelterAuditEvent) {}

    fn record_request(&self, _event: &RequestAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
