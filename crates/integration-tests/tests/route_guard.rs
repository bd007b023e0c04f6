//! Route guard behaviour end to end: token validation, redirects, and
//! cookie clearing.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use wiremock::matchers::{header as header_eq, method, path};
use wiremock::{Mock, ResponseTemplate};

use talent_hub_integration_tests::{
    TestContext, assert_redirect, body_text, clears_session, session_cookie, user_json,
};

// ============================================================================
// Protected Routes
// ============================================================================

#[tokio::test]
async fn test_protected_route_without_token_redirects_to_login() {
    let ctx = TestContext::new().await;
    ctx.mock_me_rejected(0).await;

    let response = ctx.get("/dashboard", None).await;

    assert_redirect(&response, StatusCode::SEE_OTHER, "/auth/login");
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_protected_route_with_valid_token_renders() {
    let ctx = TestContext::new().await;
    ctx.mock_me("tok-jdoe", user_json("jdoe"), 1).await;

    let response = ctx.get("/dashboard", Some("tok-jdoe")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
    assert!(body_text(response).await.contains("Hello, jdoe Doe"));
}

#[tokio::test]
async fn test_protected_route_with_expired_token_clears_and_redirects() {
    let ctx = TestContext::new().await;
    ctx.mock_me_rejected(1).await;
    ctx.mock_logout(0).await;

    let response = ctx.get("/profile", Some("expired")).await;

    assert_redirect(&response, StatusCode::SEE_OTHER, "/auth/login");
    assert!(clears_session(&response));
}

#[tokio::test]
async fn test_nested_protected_paths_are_guarded() {
    let ctx = TestContext::new().await;
    ctx.mock_me_rejected(0).await;

    for path in ["/professionals/me", "/professionals/my-hires", "/jobs", "/my-profile"] {
        let response = ctx.get(path, None).await;
        assert_redirect(&response, StatusCode::SEE_OTHER, "/auth/login");
    }
}

#[tokio::test]
async fn test_lookalike_path_is_not_protected() {
    let ctx = TestContext::new().await;
    ctx.mock_me_rejected(0).await;

    let response = ctx.get("/profiles", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Not found: /profiles"));
}

// ============================================================================
// Auth-only Routes
// ============================================================================

#[tokio::test]
async fn test_auth_only_route_with_valid_token_redirects_home() {
    let ctx = TestContext::new().await;
    ctx.mock_me("tok-jdoe", user_json("jdoe"), 1).await;

    let response = ctx.get("/auth/login", Some("tok-jdoe")).await;

    assert_redirect(&response, StatusCode::SEE_OTHER, "/");
}

#[tokio::test]
async fn test_auth_only_route_without_token_renders() {
    let ctx = TestContext::new().await;
    ctx.mock_me_rejected(0).await;

    let response = ctx.get("/auth/register", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Create an account"));
}

#[tokio::test]
async fn test_auth_only_route_with_invalid_token_clears_and_renders() {
    let ctx = TestContext::new().await;
    ctx.mock_me_rejected(1).await;
    ctx.mock_logout(0).await;

    let response = ctx.get("/auth/login", Some("stale")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(clears_session(&response));
}

// ============================================================================
// Public Routes
// ============================================================================

#[tokio::test]
async fn test_public_route_with_invalid_token_clears_cookie() {
    let ctx = TestContext::new().await;
    ctx.mock_me_rejected(1).await;
    ctx.mock_logout(0).await;

    let response = ctx.get("/", Some("stale")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(clears_session(&response));
    assert!(body_text(response).await.contains("Log in"));
}

#[tokio::test]
async fn test_public_route_shows_current_user() {
    let ctx = TestContext::new().await;
    ctx.mock_me("tok-jdoe", user_json("jdoe"), 1).await;

    let response = ctx.get("/", Some("tok-jdoe")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Welcome back, jdoe Doe"));
}

#[tokio::test]
async fn test_upstream_outage_is_treated_as_invalid_token() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&ctx.api)
        .await;
    ctx.mock_logout(0).await;

    let response = ctx.get("/dashboard", Some("tok")).await;

    assert_redirect(&response, StatusCode::SEE_OTHER, "/auth/login");
    assert!(clears_session(&response));
}

#[tokio::test]
async fn test_health_skips_the_guard() {
    let ctx = TestContext::new().await;
    ctx.mock_me_rejected(0).await;

    let response = ctx.get("/health", Some("whatever")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
    assert_eq!(body_text(response).await, "ok");
}

// ============================================================================
// Isolation & Correlation
// ============================================================================

#[tokio::test]
async fn test_concurrent_requests_do_not_share_sessions() {
    let ctx = TestContext::new().await;
    ctx.mock_me("tok-alice", user_json("alice"), 1).await;
    ctx.mock_me("tok-bob", user_json("bob"), 1).await;

    let (alice, bob) = tokio::join!(
        ctx.get("/dashboard", Some("tok-alice")),
        ctx.get("/dashboard", Some("tok-bob")),
    );

    let alice = body_text(alice).await;
    let bob = body_text(bob).await;
    assert!(alice.contains("Hello, alice Doe"));
    assert!(!alice.contains("bob"));
    assert!(bob.contains("Hello, bob Doe"));
    assert!(!bob.contains("alice"));
}

#[tokio::test]
async fn test_request_id_is_forwarded_to_the_api() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header_eq("x-request-id", "req-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("jdoe")))
        .expect(1)
        .mount(&ctx.api)
        .await;

    let request = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, "session=tok")
        .header("x-request-id", "req-abc")
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-abc");
}
