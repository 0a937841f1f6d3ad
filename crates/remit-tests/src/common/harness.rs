// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! [`TestPortals`] builds both portal routers over one [`InMemoryStore`] and
//! one [`InMemoryAuditLogger`], exactly as the runtime does, and drives them
//! with `tower::ServiceExt::oneshot`.
//!
//! Requests carry a `ConnectInfo` extension so the login limiter and audit
//! layer see a client address.
//!
//! # Example
//!
//! ```rust,ignore
//! let portals = TestPortals::new();
//! let response = portals.payments().get("/health").send().await;
//! assert_eq!(response.status, StatusCode::OK);
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use remit_api::{AppState, Portal, PortalServer};
use remit_config::RemitConfig;
use remit_core::{Employee, EmployeeStore, InMemoryAuditLogger, InMemoryStore, PasswordHasher};
use serde_json::Value;
use tower::ServiceExt;

use super::fixtures::{
    ConfigFixtures, CustomerFixture, EmployeeFixture, EmployeeFixtures, TEST_BCRYPT_COST,
};

/// Client address used when a request does not pick one.
pub const DEFAULT_CLIENT_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 7));

// =============================================================================
// TestPortals
// =============================================================================

/// Both portals sharing one store and audit log.
pub struct TestPortals {
    config: Arc<RemitConfig>,
    store: Arc<InMemoryStore>,
    audit: InMemoryAuditLogger,
    hasher: Arc<PasswordHasher>,
    payments: Router,
    employee: Router,
}

impl TestPortals {
    /// Creates portals with [`ConfigFixtures::default_config`].
    pub fn new() -> Self {
        Self::with_config(ConfigFixtures::default_config())
    }

    /// Creates portals with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration cannot produce a portal router.
    pub fn with_config(config: RemitConfig) -> Self {
        let config = Arc::new(config);
        let store = Arc::new(InMemoryStore::new());
        let audit = InMemoryAuditLogger::new();
        let hasher = Arc::new(
            PasswordHasher::new(TEST_BCRYPT_COST).expect("test bcrypt cost should be accepted"),
        );

        let router = |portal: Portal| {
            let state = AppState::builder(portal)
                .config(config.clone())
                .store(store.clone())
                .audit_logger(Arc::new(audit.clone()))
                .hasher(hasher.clone())
                .build()
                .expect("failed to build portal state");
            PortalServer::new(state)
                .router()
                .expect("failed to build portal router")
        };

        let payments = router(Portal::Payments);
        let employee = router(Portal::Employee);

        Self {
            config,
            store,
            audit,
            hasher,
            payments,
            employee,
        }
    }

    /// Returns the configuration both portals run with.
    pub fn config(&self) -> &RemitConfig {
        &self.config
    }

    /// Returns the shared store.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Returns the shared audit log.
    pub fn audit(&self) -> &InMemoryAuditLogger {
        &self.audit
    }

    /// Returns a client for the customer payments portal.
    pub fn payments(&self) -> PortalClient {
        PortalClient::new(self.payments.clone(), &self.config)
    }

    /// Returns a client for the employee portal.
    pub fn employee(&self) -> PortalClient {
        PortalClient::new(self.employee.clone(), &self.config)
    }

    /// Inserts an employee account directly into the store.
    pub async fn seed_employee(&self, fixture: &EmployeeFixture) {
        let hash = self
            .hasher
            .hash(fixture.password)
            .expect("failed to hash employee password");
        self.store
            .insert_employee(Employee::new(fixture.employee_id, fixture.full_name, hash))
            .await
            .expect("failed to seed employee");
    }

    /// Registers `customer` on the payments portal and returns the response.
    pub async fn register(&self, customer: &CustomerFixture) -> TestResponse {
        self.payments()
            .post("/api/auth/register")
            .json(customer.register_body())
            .send()
            .await
    }

    /// Registers and logs in `customer`, returning the bearer token.
    pub async fn register_and_login(&self, customer: &CustomerFixture) -> String {
        let registered = self.register(customer).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);

        let login = self
            .payments()
            .post("/api/auth/login")
            .json(customer.login_body())
            .send()
            .await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.body);
        login.token()
    }

    /// Seeds the reviewer and logs them in, returning the bearer token.
    pub async fn reviewer_token(&self) -> String {
        let reviewer = EmployeeFixtures::reviewer();
        self.seed_employee(&reviewer).await;

        let login = self
            .employee()
            .post("/api/auth/login")
            .json(reviewer.login_body())
            .send()
            .await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.body);
        login.token()
    }

    /// Submits a payment as the customer holding `token`.
    pub async fn submit_payment(&self, token: &str, body: Value) -> TestResponse {
        let payments = self.payments();
        let csrf = payments.csrf_token().await;
        payments
            .post("/api/transactions")
            .bearer(token)
            .csrf(&csrf)
            .json(body)
            .send()
            .await
    }

    /// Accepts or rejects a transaction as the employee holding `token`.
    ///
    /// `reason` is sent as the reject body; `None` accepts.
    pub async fn review(&self, token: &str, id: &str, reason: Option<&str>) -> TestResponse {
        let employee = self.employee();
        let csrf = employee.csrf_token().await;
        let request = match reason {
            Some(reason) => employee
                .patch(&format!("/api/transactions/{}/reject", id))
                .json(serde_json::json!({ "reason": reason })),
            None => employee.patch(&format!("/api/transactions/{}/accept", id)),
        };
        request.bearer(token).csrf(&csrf).send().await
    }
}

impl Default for TestPortals {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// PortalClient
// =============================================================================

/// A CSRF token as the browser holds it: the cookie and the echoed header.
#[derive(Debug, Clone)]
pub struct CsrfPair {
    /// Cookie name.
    pub cookie_name: String,
    /// Header name.
    pub header_name: String,
    /// Token value.
    pub token: String,
}

/// Sends requests to one portal router.
#[derive(Clone)]
pub struct PortalClient {
    router: Router,
    cookie_name: String,
    header_name: String,
}

impl PortalClient {
    fn new(router: Router, config: &RemitConfig) -> Self {
        Self {
            router,
            cookie_name: config.security.csrf.cookie_name.clone(),
            header_name: config.security.csrf.header_name.clone(),
        }
    }

    /// Starts a request.
    pub fn request(&self, method: Method, path: &str) -> TestRequest {
        TestRequest {
            router: self.router.clone(),
            method,
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
            client_ip: DEFAULT_CLIENT_IP,
        }
    }

    /// Starts a GET request.
    pub fn get(&self, path: &str) -> TestRequest {
        self.request(Method::GET, path)
    }

    /// Starts a POST request.
    pub fn post(&self, path: &str) -> TestRequest {
        self.request(Method::POST, path)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, path: &str) -> TestRequest {
        self.request(Method::PATCH, path)
    }

    /// Fetches a fresh CSRF token from `/api/auth/csrf-token`.
    pub async fn csrf_token(&self) -> CsrfPair {
        let response = self.get("/api/auth/csrf-token").send().await;
        assert_eq!(response.status, StatusCode::OK);

        let token = response.body["csrfToken"]
            .as_str()
            .expect("csrf-token response should carry csrfToken")
            .to_string();
        let cookie = response
            .header(header::SET_COOKIE.as_str())
            .expect("csrf-token response should set a cookie");
        assert!(
            cookie.starts_with(&format!("{}={}", self.cookie_name, token)),
            "cookie {} does not carry the body token",
            cookie
        );

        CsrfPair {
            cookie_name: self.cookie_name.clone(),
            header_name: self.header_name.clone(),
            token,
        }
    }
}

// =============================================================================
// TestRequest
// =============================================================================

/// A request being built against a portal.
pub struct TestRequest {
    router: Router,
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    client_ip: IpAddr,
}

impl TestRequest {
    /// Adds a header.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Sends `token` as a bearer token.
    pub fn bearer(self, token: &str) -> Self {
        self.header(header::AUTHORIZATION.as_str(), format!("Bearer {}", token))
    }

    /// Sends the CSRF cookie and the matching header.
    pub fn csrf(self, csrf: &CsrfPair) -> Self {
        self.header(
            header::COOKIE.as_str(),
            format!("{}={}", csrf.cookie_name, csrf.token),
        )
        .header(&csrf.header_name, csrf.token.clone())
    }

    /// Sends `body` as JSON.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sends the request from `ip`.
    pub fn from_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = ip;
        self
    }

    /// Sends the request and collects the response.
    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(&self.path);

        for (name, value) in &self.headers {
            builder = builder.header(
                HeaderName::from_bytes(name.as_bytes()).expect("invalid header name"),
                HeaderValue::from_str(value).expect("invalid header value"),
            );
        }

        let body = match self.body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let mut request = builder.body(body).expect("failed to build request");
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::new(self.client_ip, 40_000)));

        let response = self
            .router
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

// =============================================================================
// TestResponse
// =============================================================================

/// A collected response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// JSON body, or `Null` when the body is empty or not JSON.
    pub body: Value,
}

impl TestResponse {
    /// Returns a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns `error.message` from an error body.
    pub fn error_message(&self) -> &str {
        self.body["error"]["message"].as_str().unwrap_or_default()
    }

    /// Returns `error.code` from an error body.
    pub fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or_default()
    }

    /// Returns the bearer token from a login response.
    pub fn token(&self) -> String {
        self.body["token"]
            .as_str()
            .expect("login response should carry a token")
            .to_string()
    }

    /// Returns the `id` field of a transaction body.
    pub fn id(&self) -> String {
        self.body["id"]
            .as_str()
            .expect("response should carry an id")
            .to_string()
    }
}
