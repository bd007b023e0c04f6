//! Request interceptor that gates protected and auth-only routes.
//!
//! For every request the guard:
//!
//! 1. Builds a per-request [`RequestGateway`] from the session cookie
//! 2. Validates the token against `/auth/me` when one is present
//! 3. Applies the decision table below
//! 4. Publishes the gateway to handlers and writes cookie changes back
//!
//! | route      | no token         | valid token | invalid token            |
//! |------------|------------------|-------------|--------------------------|
//! | protected  | 303 `/auth/login`| proceed     | clear, 303 `/auth/login` |
//! | auth-only  | proceed          | 303 `/`     | clear, proceed           |
//! | other      | proceed          | proceed     | clear, proceed           |
//!
//! An invalid token is cleared locally by the gateway as part of the
//! failed validation.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{Span, debug};

use talent_hub_core::User;

use super::request_id::RequestId;
use crate::auth::{AuthError, Navigation, RequestGateway, TokenStore};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::state::AppState;

/// Path prefixes that require an authenticated user.
pub const PROTECTED_PREFIXES: &[&str] = &[
    "/dashboard",
    "/profile",
    "/jobs",
    "/my-profile",
    "/professionals/me",
    "/professionals/my-hires",
];

/// Path prefixes only meant for visitors who are not logged in.
pub const AUTH_ONLY_PREFIXES: &[&str] = &["/auth/login", "/auth/register"];

/// How the guard treats a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Protected,
    AuthOnly,
    Public,
}

/// Classifies request paths against the protected and auth-only prefixes.
///
/// A prefix matches the path itself and anything below it on a segment
/// boundary: `/profile` matches `/profile` and `/profile/edit` but not
/// `/profiles`.
#[derive(Debug, Clone)]
pub struct RouteTable {
    protected: Vec<String>,
    auth_only: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(PROTECTED_PREFIXES, AUTH_ONLY_PREFIXES)
    }
}

impl RouteTable {
    #[must_use]
    pub fn new(protected: &[&str], auth_only: &[&str]) -> Self {
        let normalize = |prefixes: &[&str]| {
            prefixes
                .iter()
                .map(|p| p.trim_end_matches('/').to_string())
                .collect()
        };
        Self {
            protected: normalize(protected),
            auth_only: normalize(auth_only),
        }
    }

    /// Classify `path`. Protected wins if a path matches both lists.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteKind {
        let matches = |prefixes: &[String]| prefixes.iter().any(|p| has_prefix(path, p));

        if matches(&self.protected) {
            RouteKind::Protected
        } else if matches(&self.auth_only) {
            RouteKind::AuthOnly
        } else {
            RouteKind::Public
        }
    }
}

fn has_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Outcome of validating the request's token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Absent,
    Valid(User),
    Invalid,
}

/// What the guard does with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(Navigation),
}

/// Apply the decision table.
#[must_use]
pub fn decide(kind: RouteKind, status: &TokenStatus) -> GuardDecision {
    match (kind, status) {
        (RouteKind::Protected, TokenStatus::Absent | TokenStatus::Invalid) => {
            GuardDecision::Redirect(Navigation::to_login())
        }
        (RouteKind::AuthOnly, TokenStatus::Valid(_)) => {
            GuardDecision::Redirect(Navigation::to_home())
        }
        _ => GuardDecision::Proceed,
    }
}

/// Per-request authentication context published to handlers.
#[derive(Clone)]
pub struct RequestAuth(pub Arc<RequestGateway>);

/// Validate the session cookie and gate the request.
pub async fn route_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let kind = state.routes().classify(request.uri().path());
    let request_id = request.extensions().get::<RequestId>().cloned();
    let gateway = Arc::new(state.gateway(jar, request_id.as_ref().map(RequestId::as_str)));

    let status = validate(&gateway).await;
    match &status {
        TokenStatus::Valid(user) => {
            Span::current().record("user", user.username.as_str());
            set_sentry_user(user);
        }
        TokenStatus::Absent | TokenStatus::Invalid => clear_sentry_user(),
    }

    let response = match decide(kind, &status) {
        GuardDecision::Redirect(navigation) => {
            debug!(path = %request.uri().path(), to = navigation.location(), "Route guard redirect");
            navigation.into_response()
        }
        GuardDecision::Proceed => {
            request
                .extensions_mut()
                .insert(RequestAuth(Arc::clone(&gateway)));
            next.run(request).await
        }
    };

    (gateway.tokens().jar(), response).into_response()
}

/// Resolve the request's token, if any, to a user.
async fn validate(gateway: &RequestGateway) -> TokenStatus {
    if gateway.tokens().load().is_none() {
        return TokenStatus::Absent;
    }

    match gateway.fetch_user().await {
        Ok(user) => TokenStatus::Valid(user),
        Err(AuthError::NoToken) => TokenStatus::Absent,
        Err(err) => {
            debug!(error = %err, "Session token rejected");
            TokenStatus::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: None,
            username: "jdoe".to_string(),
            email: None,
            phone_no: None,
            first_name: None,
            last_name: None,
            profile_pic_url: None,
        }
    }

    #[test]
    fn test_classify_default_table() {
        let table = RouteTable::default();

        assert_eq!(table.classify("/dashboard"), RouteKind::Protected);
        assert_eq!(table.classify("/profile/edit"), RouteKind::Protected);
        assert_eq!(table.classify("/professionals/me"), RouteKind::Protected);
        assert_eq!(table.classify("/professionals/my-hires"), RouteKind::Protected);
        assert_eq!(table.classify("/auth/login"), RouteKind::AuthOnly);
        assert_eq!(table.classify("/auth/register"), RouteKind::AuthOnly);
        assert_eq!(table.classify("/"), RouteKind::Public);
        assert_eq!(table.classify("/professionals"), RouteKind::Public);
        assert_eq!(table.classify("/professionals/jdoe"), RouteKind::Public);
        assert_eq!(table.classify("/auth/logout"), RouteKind::Public);
    }

    #[test]
    fn test_prefix_matches_on_segment_boundary() {
        let table = RouteTable::default();

        assert_eq!(table.classify("/profiles"), RouteKind::Public);
        assert_eq!(table.classify("/jobsearch"), RouteKind::Public);
        assert_eq!(table.classify("/professionals/meet"), RouteKind::Public);
        assert_eq!(table.classify("/auth/login-help"), RouteKind::Public);
    }

    #[test]
    fn test_protected_wins_over_auth_only() {
        let table = RouteTable::new(&["/account/"], &["/account"]);
        assert_eq!(table.classify("/account"), RouteKind::Protected);
    }

    #[test]
    fn test_decision_table() {
        let valid = TokenStatus::Valid(user());
        let login = GuardDecision::Redirect(Navigation::to_login());
        let home = GuardDecision::Redirect(Navigation::to_home());

        let cases = [
            (RouteKind::Protected, TokenStatus::Absent, login.clone()),
            (RouteKind::Protected, valid.clone(), GuardDecision::Proceed),
            (RouteKind::Protected, TokenStatus::Invalid, login),
            (RouteKind::AuthOnly, TokenStatus::Absent, GuardDecision::Proceed),
            (RouteKind::AuthOnly, valid.clone(), home),
            (RouteKind::AuthOnly, TokenStatus::Invalid, GuardDecision::Proceed),
            (RouteKind::Public, TokenStatus::Absent, GuardDecision::Proceed),
            (RouteKind::Public, valid, GuardDecision::Proceed),
            (RouteKind::Public, TokenStatus::Invalid, GuardDecision::Proceed),
        ];

        for (kind, status, expected) in cases {
            assert_eq!(decide(kind, &status), expected, "{kind:?} with {status:?}");
        }
    }

    #[test]
    fn test_guard_redirects_are_see_other() {
        let GuardDecision::Redirect(navigation) = decide(RouteKind::Protected, &TokenStatus::Absent)
        else {
            panic!("expected redirect");
        };
        assert_eq!(navigation.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(navigation.location(), "/auth/login");
    }
}
