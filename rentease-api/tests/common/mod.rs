//! Common test utilities for integration tests
//!
//! Every test gets its own router on a fresh in-memory store, so tests are
//! independent and need no external services. Requests are driven straight
//! through the router with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use rentease_api::app::{build_router, AppState};
use rentease_api::config::Config;
use rentease_shared::store::MemoryUserStore;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-session-secret-0123456789";
pub const PASSWORD: &str = "password123";

const BOUNDARY: &str = "rentease-test-boundary";

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// A response with its body parsed as JSON (`Null` if empty or not JSON)
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `name=value` part of the session `Set-Cookie` header
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("rentease_session="))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

/// Test context containing the app and its state
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub upload_dir: PathBuf,
}

impl TestContext {
    /// Creates a context on a fresh in-memory store
    pub fn new() -> Self {
        let upload_dir = std::env::temp_dir().join(format!(
            "rentease-test-{}-{}",
            std::process::id(),
            NEXT_ID.fetch_add(1, Ordering::SeqCst)
        ));
        let upload_dir_str = upload_dir.to_string_lossy().to_string();

        let config = Config::from_lookup(|key| match key {
            "SESSION_SECRET" => Some(TEST_SECRET.to_string()),
            "UPLOAD_DIR" => Some(upload_dir_str.clone()),
            _ => None,
        })
        .expect("test config");

        let state = AppState::new(Arc::new(MemoryUserStore::new()), config);
        let app = build_router(state.clone());

        Self {
            app,
            state,
            upload_dir,
        }
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Posts a multipart form with text fields and an optional file
    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(multipart_body(fields, file))).unwrap())
            .await
    }

    pub async fn register(
        &self,
        email: &str,
        role: &str,
        landlord_email: Option<&str>,
    ) -> TestResponse {
        self.post_json(
            "/register",
            json!({
                "email": email,
                "password": PASSWORD,
                "confirm_password": PASSWORD,
                "role": role,
                "landlord_email": landlord_email,
            }),
            None,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/login",
            json!({"email": email, "password": password}),
            None,
        )
        .await
    }

    /// Logs in and returns the session cookie
    pub async fn session_for(&self, email: &str) -> String {
        let response = self.login(email, PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.body);
        response.session_cookie().expect("session cookie")
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// Encodes a `multipart/form-data` body
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"profile_picture\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
