// pawhaven-web/tests/common/mod.rs
// ============================================================================
// Module: Web Test Fixtures
// Description: In-memory site, pinned clock, recording audit sink, and
//              request helpers.
// Purpose: Drive the full router without a socket.
// Dependencies: pawhaven-web, pawhaven-core, tower, http-body-util
// ============================================================================

//! ## Overview
//! [`TestSite`] wires the real router over an in-memory store with a
//! reversible password hasher and a [`FixedClock`]. Requests go through
//! `tower::ServiceExt::oneshot`, so every extractor and middleware runs.

#![allow(dead_code, reason = "Not every test binary uses every fixture.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use axum::body::Body;
use axum::http::HeaderName;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::COOKIE;
use axum::http::header::LOCATION;
use axum::http::header::SET_COOKIE;
use http_body_util::BodyExt;
use pawhaven_config::SessionConfig;
use pawhaven_core::Account;
use pawhaven_core::ApplicationForm;
use pawhaven_core::InMemoryShelterStore;
use pawhaven_core::PasswordHasher;
use pawhaven_core::PasswordHasherError;
use pawhaven_core::Pet;
use pawhaven_core::PetForm;
use pawhaven_core::Shelter;
use pawhaven_core::ShelterSettings;
use pawhaven_core::SharedShelterStore;
use pawhaven_core::Timestamp;
use pawhaven_web::AppState;
use pawhaven_web::Clock;
use pawhaven_web::FixedClock;
use pawhaven_web::RequestAuditEvent;
use pawhaven_web::ShelterAuditEvent;
use pawhaven_web::ShelterAuditKind;
use pawhaven_web::ShelterAuditSink;
use pawhaven_web::build_router;
use tower::ServiceExt;

/// Fixed clock origin for tests (2024-06-01T00:00:00Z).
pub const T0: i64 = 1_717_200_000_000;
/// Request body cap used by the test router.
const MAX_BODY_BYTES: usize = 64 * 1024;
/// Password given to every seeded account.
pub const PASSWORD: &str = "correct-horse-9";

// ============================================================================
// SECTION: Test Doubles
// ============================================================================

/// Reversible hasher; never use outside tests.
#[derive(Debug, Default)]
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHasherError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, encoded: &str) -> Result<bool, PasswordHasherError> {
        let stored = encoded
            .strip_prefix("plain$")
            .ok_or_else(|| PasswordHasherError::Malformed("missing plain$ prefix".to_string()))?;
        Ok(stored == password)
    }
}

/// Audit sink that keeps shelter events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded shelter events.
    events: Mutex<Vec<ShelterAuditEvent>>,
    /// Recorded request paths with status codes.
    requests: Mutex<Vec<(String, u16)>>,
}

impl RecordingAuditSink {
    /// Returns the recorded event kinds in order.
    pub fn kinds(&self) -> Vec<ShelterAuditKind> {
        self.events.lock().unwrap().iter().map(|event| event.kind).collect()
    }

    /// Returns the recorded events.
    pub fn events(&self) -> Vec<ShelterAuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the recorded request paths and statuses.
    pub fn requests(&self) -> Vec<(String, u16)> {
        self.requests.lock().unwrap().clone()
    }
}

impl ShelterAuditSink for RecordingAuditSink {
    fn record(&self, event: &ShelterAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn record_request(&self, event: &RequestAuditEvent) {
        self.requests.lock().unwrap().push((event.path.clone(), event.status));
    }
}

// ============================================================================
// SECTION: Site
// ============================================================================

/// A running site over an in-memory store.
pub struct TestSite {
    /// Full router.
    pub router: Router,
    /// Shared handler state.
    pub state: Arc<AppState>,
    /// Pinned clock.
    pub clock: Arc<FixedClock>,
    /// Recorded audit events.
    pub audit: Arc<RecordingAuditSink>,
}

/// Builds a site that requires accounts to apply.
pub fn site() -> TestSite {
    site_with(ShelterSettings::default())
}

/// Builds a site with custom settings.
pub fn site_with(settings: ShelterSettings) -> TestSite {
    let store = SharedShelterStore::from_store(InMemoryShelterStore::new());
    let shelter = Shelter::new(store, settings);
    let clock = Arc::new(FixedClock::new(Timestamp::from_unix_millis(T0)));
    let audit = Arc::new(RecordingAuditSink::default());
    let state = AppState::new(shelter, &SessionConfig::default())
        .unwrap()
        .with_hasher(Arc::new(PlainHasher))
        .with_clock(clock.clone())
        .with_audit(audit.clone());
    let state = Arc::new(state);
    let router = build_router(Arc::clone(&state), MAX_BODY_BYTES);
    TestSite { router, state, clock, audit }
}

impl TestSite {
    /// Returns the current pinned time.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Adds an available pet.
    pub fn seed_pet(&self, name: &str, pet_type: &str) -> Pet {
        self.state.shelter().create_pet(&pet_form(name, pet_type), self.now()).unwrap()
    }

    /// Adds a staff account with [`PASSWORD`].
    pub fn seed_staff(&self, username: &str) -> Account {
        let (account, _) = self
            .state
            .shelter()
            .create_staff(
                username,
                &format!("{username}@pawhaven.test"),
                PASSWORD,
                &PlainHasher,
                self.now(),
            )
            .unwrap();
        account
    }

    /// Sends a GET request.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Sends a urlencoded form POST.
    pub async fn post_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter().copied())
            .finish();
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Registers a member account and returns its session cookie.
    pub async fn register(&self, username: &str) -> String {
        let email = format!("{username}@example.com");
        let response = self
            .post_form(
                "/register",
                &[
                    ("username", username),
                    ("email", &email),
                    ("first_name", "Robin"),
                    ("last_name", "Okafor"),
                    ("password1", PASSWORD),
                    ("password2", PASSWORD),
                ],
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        response.session_cookie()
    }

    /// Signs in and returns the session cookie.
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .post_form("/login", &[("username", username), ("password", PASSWORD)], None)
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        response.session_cookie()
    }

    /// Runs one request through the router.
    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let header = |name: HeaderName| {
            response.headers().get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
        };
        let location = header(LOCATION);
        let set_cookie = header(SET_COOKIE);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            location,
            set_cookie,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Buffered response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// `Location` header.
    pub location: Option<String>,
    /// `Set-Cookie` header.
    pub set_cookie: Option<String>,
    /// Body text.
    pub body: String,
}

impl TestResponse {
    /// Returns the `name=value` pair of the session cookie that was set.
    pub fn session_cookie(&self) -> String {
        let header = self.set_cookie.as_deref().expect("session cookie set");
        header.split(';').next().unwrap().trim().to_string()
    }

    /// Returns the redirect target.
    pub fn location(&self) -> &str {
        self.location.as_deref().expect("redirect location")
    }
}

// ============================================================================
// SECTION: Forms
// ============================================================================

/// Builds a valid pet form.
pub fn pet_form(name: &str, pet_type: &str) -> PetForm {
    PetForm {
        name: name.to_string(),
        pet_type: pet_type.to_string(),
        breed: "Mixed".to_string(),
        age: "2 years".to_string(),
        gender: "Female".to_string(),
        size: "Medium".to_string(),
        color: "Brown".to_string(),
        description: format!("{name} is a friendly companion."),
        arrival_date: "2024-05-20".to_string(),
        adoption_fee: "95.00".to_string(),
        ..PetForm::default()
    }
}

/// Returns the form fields of a complete application.
pub fn application_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("first_name", "Robin"),
        ("last_name", "Okafor"),
        ("email", "robin@example.com"),
        ("phone", "555-0142"),
        ("address", "88 Harbor Lane"),
        ("housing_type", "House"),
        ("own_or_rent", "Own"),
        ("landlord_approval", "no"),
        ("household_adults", "2"),
        ("household_children", "1"),
        ("has_other_pets", "no"),
        ("previous_pet_experience", "Two dogs over ten years"),
        ("reason_for_adoption", "Our yard is too quiet"),
    ]
}

/// Returns a complete application as a typed form.
pub fn application_form() -> ApplicationForm {
    ApplicationForm {
        first_name: "Robin".to_string(),
        last_name: "Okafor".to_string(),
        email: "robin@example.com".to_string(),
        phone: "555-0142".to_string(),
        address: "88 Harbor Lane".to_string(),
        housing_type: "House".to_string(),
        own_or_rent: "Own".to_string(),
        landlord_approval: "no".to_string(),
        household_adults: "2".to_string(),
        household_children: "1".to_string(),
        has_other_pets: "no".to_string(),
        previous_pet_experience: "Two dogs over ten years".to_string(),
        reason_for_adoption: "Our yard is too quiet".to_string(),
        ..ApplicationForm::default()
    }
}
