//! Integration tests for the Talent Hub front-end.
//!
//! Each test starts a `wiremock` server standing in for the remote API and
//! drives the real router in-process with `tower::ServiceExt::oneshot`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p talent-hub-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use talent_hub_web::{AppState, WebConfig, app};

/// A mocked remote API plus a router pointed at it.
pub struct TestContext {
    pub api: MockServer,
    router: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        let api = MockServer::start().await;
        let mut config = WebConfig::new(Url::parse(&api.uri()).unwrap());
        config.api_timeout = Duration::from_secs(2);
        let state = AppState::new(config).unwrap();

        Self {
            api,
            router: app(state),
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// `GET path`, optionally carrying a session cookie.
    pub async fn get(&self, path: &str, session: Option<&str>) -> Response<Body> {
        self.send(request("GET", path, session, Body::empty())).await
    }

    /// `POST path` with a URL-encoded form body.
    pub async fn post_form(&self, path: &str, session: Option<&str>, form: &str) -> Response<Body> {
        let mut request = request("POST", path, session, Body::from(form.to_string()));
        request.headers_mut().insert(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded".parse().unwrap(),
        );
        self.send(request).await
    }

    /// Mount `GET /auth/me` answering `user` for `token`, expected `times` times.
    pub async fn mock_me(&self, token: &str, user: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header_eq("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(user))
            .expect(times)
            .mount(&self.api)
            .await;
    }

    /// Mount `GET /auth/me` rejecting every token.
    pub async fn mock_me_rejected(&self, times: u64) {
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Could not validate credentials" })),
            )
            .expect(times)
            .mount(&self.api)
            .await;
    }

    /// Mount a successful `POST /auth/logout`, expected `times` times.
    pub async fn mock_logout(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(times)
            .mount(&self.api)
            .await;
    }
}

fn request(method: &str, path: &str, session: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = session {
        builder = builder.header(header::COOKIE, format!("session={token}"));
    }
    builder.body(body).unwrap()
}

/// A typical `/auth/me` payload.
#[must_use]
pub fn user_json(username: &str) -> Value {
    json!({
        "id": 7,
        "username": username,
        "email": format!("{username}@example.com"),
        "first_name": username,
        "last_name": "Doe"
    })
}

/// `Location` header of a response.
#[must_use]
pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string())
}

/// All `Set-Cookie` headers of a response.
#[must_use]
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// The `session` Set-Cookie header, if any.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with("session="))
}

/// Whether the response expires the session cookie.
#[must_use]
pub fn clears_session(response: &Response<Body>) -> bool {
    session_cookie(response).is_some_and(|c| c.starts_with("session=;") && c.contains("Max-Age=0"))
}

/// Read the body as UTF-8.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Assert a redirect with `status` to `to`.
pub fn assert_redirect(response: &Response<Body>, status: StatusCode, to: &str) {
    assert_eq!(response.status(), status);
    assert_eq!(location(response).as_deref(), Some(to));
}
