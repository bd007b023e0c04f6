//! Authentication gateway.
//!
//! An [`AuthGateway`] is built per browsing context from a transport, a
//! token store, and a session store. Nothing here is process-global: two
//! gateways built from different stores cannot observe each other.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use talent_hub_core::User;

use super::{AuthError, Navigation, SessionStore, SessionToken, TokenStore};
use crate::api::{ApiRequest, ApiResponse, Transport};

/// Upper bound for an identity fetch when none is configured.
pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const FETCH_FAILED: &str = "fetch failed";

/// Fields submitted when creating an account.
#[derive(Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_no: Option<String>,
}

impl Registration {
    fn to_json(&self) -> serde_json::Value {
        json!({
            "username": self.username,
            "email": self.email,
            "password": self.password.expose_secret(),
            "first_name": self.first_name,
            "last_name": self.last_name,
            "phone_no": self.phone_no.as_deref().unwrap_or_default(),
        })
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Token-bearing success body. Registration may use either key.
#[derive(Deserialize)]
struct TokenBody {
    access_token: Option<String>,
    token: Option<String>,
}

impl TokenBody {
    fn into_token(self) -> Option<SessionToken> {
        self.access_token
            .or(self.token)
            .filter(|t| !t.is_empty())
            .map(SessionToken::new)
    }
}

/// Authentication operations bound to one transport and one set of stores.
#[derive(Debug)]
pub struct AuthGateway<T, S> {
    transport: T,
    tokens: S,
    session: SessionStore,
    identity_timeout: Duration,
}

impl<T: Transport, S: TokenStore> AuthGateway<T, S> {
    /// Bind a gateway to `transport`, `tokens`, and `session`.
    #[must_use]
    pub const fn new(transport: T, tokens: S, session: SessionStore) -> Self {
        Self {
            transport,
            tokens,
            session,
            identity_timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }

    /// Override the identity fetch deadline.
    #[must_use]
    pub const fn with_identity_timeout(mut self, timeout: Duration) -> Self {
        self.identity_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub const fn tokens(&self) -> &S {
        &self.tokens
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Exchange credentials for a token, persist it, and resolve the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` with the server's `detail` (or
    /// "Login failed") when the API refuses. The session is untouched in that
    /// case. Identity fetch failures are propagated after clearing the session.
    #[instrument(skip(self, secret))]
    pub async fn login(&self, identifier: &str, secret: &SecretString) -> Result<User, AuthError> {
        let request = ApiRequest::post("/auth/login").json(json!({
            "username": identifier,
            "password": secret.expose_secret(),
        }));
        let response = self.transport.send(request).await?;
        let token = token_from(&response, LOGIN_FAILED)?;

        self.tokens.store(&token);
        debug!("Login accepted, resolving user");
        self.fetch_user().await
    }

    /// Create an account, persist the returned token, and resolve the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` with the server's `detail` (or
    /// "Registration failed") when the API refuses.
    #[instrument(skip_all, fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<User, AuthError> {
        let request = ApiRequest::post("/auth/register").json(registration.to_json());
        let response = self.transport.send(request).await?;
        let token = token_from(&response, REGISTRATION_FAILED)?;

        self.tokens.store(&token);
        debug!("Registration accepted, resolving user");
        self.fetch_user().await
    }

    /// Resolve the persisted token to a user over the bound transport.
    ///
    /// # Errors
    ///
    /// See [`AuthGateway::fetch_user_with`].
    pub async fn fetch_user(&self) -> Result<User, AuthError> {
        self.fetch_user_with(&self.transport).await
    }

    /// Resolve the persisted token to a user over `transport`.
    ///
    /// `is_authenticating` is set for the duration and cleared on every path.
    /// On success the session holds the token and user. On any failure the
    /// local session is cleared before returning the error; the rejected
    /// token is not revoked remotely.
    ///
    /// # Errors
    ///
    /// - `AuthError::NoToken` if no token is persisted
    /// - `AuthError::Rejected` ("fetch failed") for non-2xx responses
    /// - `AuthError::Timeout` if the fetch exceeds the identity deadline
    /// - `AuthError::Superseded` if the session was reset meanwhile
    #[instrument(skip_all)]
    pub async fn fetch_user_with<R: Transport>(&self, transport: &R) -> Result<User, AuthError> {
        let generation = self.session.begin_fetch();

        let resolved = match tokio::time::timeout(self.identity_timeout, self.resolve(transport)).await
        {
            Ok(resolved) => resolved,
            Err(_) => Err(AuthError::Timeout(self.identity_timeout)),
        };

        match resolved {
            Ok((token, user)) => {
                if self.session.complete_fetch(generation, token, user.clone()) {
                    Ok(user)
                } else {
                    debug!("Discarding identity fetch from a reset session");
                    Err(AuthError::Superseded)
                }
            }
            Err(err) => {
                self.session.abort_fetch(generation);
                warn!(error = %err, "Identity fetch failed, clearing session");
                self.clear_local();
                Err(err)
            }
        }
    }

    async fn resolve<R: Transport>(&self, transport: &R) -> Result<(SessionToken, User), AuthError> {
        let token = self.tokens.load().ok_or(AuthError::NoToken)?;
        let request = ApiRequest::get("/auth/me").bearer(token.as_secret());
        let response = transport.send(request).await?;

        if !response.is_success() {
            return Err(AuthError::Rejected {
                status: response.status,
                message: FETCH_FAILED.to_string(),
            });
        }

        let user: User = response.json()?;
        Ok((token, user))
    }

    /// The persisted token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        self.tokens.load()
    }

    /// Whether a token is persisted. Does not validate it.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.tokens.load().is_some()
    }

    /// End the session.
    ///
    /// Revokes the token remotely when one is held (failures are logged and
    /// ignored), clears persistence, and resets the session store. Calling it
    /// again is harmless.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Navigation {
        if let Some(token) = self.tokens.load() {
            self.revoke(&token).await;
        }
        self.clear_local();
        Navigation::to_login()
    }

    /// Clear persistence and reset the session store without contacting the
    /// API.
    pub fn clear_local(&self) {
        self.tokens.clear();
        self.session.reset();
    }

    async fn revoke(&self, token: &SessionToken) {
        let request = ApiRequest::post("/auth/logout").bearer(token.as_secret());
        match self.transport.send(request).await {
            Ok(response) if !response.is_success() => {
                debug!(status = %response.status, "Remote logout refused");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Remote logout failed"),
        }
    }
}

/// Extract the token from a login or registration response.
fn token_from(response: &ApiResponse, fallback: &str) -> Result<SessionToken, AuthError> {
    if !response.is_success() {
        return Err(AuthError::Rejected {
            status: response.status,
            message: response.detail().unwrap_or_else(|| fallback.to_string()),
        });
    }

    response
        .json::<TokenBody>()?
        .into_token()
        .ok_or(AuthError::MissingAccessToken)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum_extra::extract::cookie::CookieJar;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::HttpTransport;
    use crate::auth::{CookieSettings, CookieTokenStore};

    fn gateway(server: &MockServer, token: Option<&str>) -> AuthGateway<HttpTransport, CookieTokenStore> {
        let transport =
            HttpTransport::new(&Url::parse(&server.uri()).unwrap(), Duration::from_secs(5)).unwrap();
        let tokens = CookieTokenStore::new(CookieJar::new(), CookieSettings { secure: false });
        if let Some(token) = token {
            tokens.store(&SessionToken::new(token));
        }
        AuthGateway::new(transport, tokens, SessionStore::new())
    }

    fn me_body() -> serde_json::Value {
        json!({ "id": 7, "username": "jdoe", "email": "jdoe@example.com" })
    }

    #[tokio::test]
    async fn test_login_success_persists_token_and_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "username": "jdoe@example.com", "password": "hunter22" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok-1" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(me_body()))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway(&server, None);
        let user = gateway
            .login("jdoe@example.com", &SecretString::from("hunter22"))
            .await
            .unwrap();

        assert_eq!(user.username, "jdoe");
        assert_eq!(gateway.token(), Some(SessionToken::new("tok-1")));
        let state = gateway.session().snapshot();
        assert!(state.is_authenticated());
        assert!(!state.is_authenticating());
        assert_eq!(state.token(), Some(&SessionToken::new("tok-1")));
    }

    #[tokio::test]
    async fn test_login_rejected_leaves_session_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "invalid credentials" })),
            )
            .mount(&server)
            .await;
        Mock::given(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let gateway = gateway(&server, None);
        let err = gateway
            .login("jdoe@example.com", &SecretString::from("wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "invalid credentials");
        assert_eq!(err.user_message(LOGIN_FAILED), "invalid credentials");
        assert!(gateway.session().snapshot().is_empty());
        assert!(!gateway.is_logged_in());
    }

    #[tokio::test]
    async fn test_login_rejected_without_detail_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = gateway(&server, None)
            .login("a@b.co", &SecretString::from("x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Login failed");
    }

    #[tokio::test]
    async fn test_register_accepts_token_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(json!({
                "username": "new@example.com",
                "email": "new@example.com",
                "password": "pw",
                "first_name": "New",
                "last_name": null,
                "phone_no": "",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "tok-2" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer tok-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(me_body()))
            .mount(&server)
            .await;

        let gateway = gateway(&server, None);
        let registration = Registration {
            username: "new@example.com".to_string(),
            email: "new@example.com".to_string(),
            password: SecretString::from("pw"),
            first_name: Some("New".to_string()),
            last_name: None,
            phone_no: None,
        };
        gateway.register(&registration).await.unwrap();

        assert!(gateway.session().is_authenticated());
        assert_eq!(gateway.token(), Some(SessionToken::new("tok-2")));
    }

    #[tokio::test]
    async fn test_register_success_without_token_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
            .mount(&server)
            .await;

        let registration = Registration {
            username: "u".to_string(),
            email: "u@example.com".to_string(),
            password: SecretString::from("pw"),
            first_name: None,
            last_name: None,
            phone_no: None,
        };
        let err = gateway(&server, None).register(&registration).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingAccessToken));
    }

    #[tokio::test]
    async fn test_fetch_user_without_token() {
        let server = MockServer::start().await;
        Mock::given(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let gateway = gateway(&server, None);
        let err = gateway.fetch_user().await.unwrap_err();

        assert!(matches!(err, AuthError::NoToken));
        assert_eq!(err.to_string(), "no token");
        assert!(gateway.session().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_user_rejected_clears_session_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "expired" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let gateway = gateway(&server, Some("stale"));
        let err = gateway.fetch_user().await.unwrap_err();

        assert_eq!(err.to_string(), "fetch failed");
        assert_eq!(gateway.token(), None);
        let state = gateway.session().snapshot();
        assert!(state.is_empty());
        assert!(!state.is_authenticating());
    }

    #[tokio::test]
    async fn test_login_with_failed_identity_fetch_makes_two_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok-1" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gateway = gateway(&server, None);
        let err = gateway
            .login("jdoe@example.com", &SecretString::from("hunter22"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "fetch failed");
        let calls: Vec<String> = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect();
        assert_eq!(calls, ["POST /auth/login", "GET /auth/me"]);
        assert!(!gateway.is_logged_in());
        assert!(gateway.session().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_user_with_overrides_bound_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(me_body()))
            .expect(1)
            .mount(&server)
            .await;

        let dead = HttpTransport::new(
            &Url::parse("http://127.0.0.1:9/").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        let tokens = CookieTokenStore::new(CookieJar::new(), CookieSettings { secure: false });
        tokens.store(&SessionToken::new("tok"));
        let gateway = AuthGateway::new(dead, tokens, SessionStore::new());

        let live =
            HttpTransport::new(&Url::parse(&server.uri()).unwrap(), Duration::from_secs(5)).unwrap();
        let user = gateway.fetch_user_with(&live).await.unwrap();

        assert_eq!(user.username, "jdoe");
        let state = gateway.session().snapshot();
        assert!(state.is_authenticated());
        assert_eq!(state.user().map(|u| u.username.as_str()), Some("jdoe"));
        assert_eq!(state.token(), Some(&SessionToken::new("tok")));
    }

    #[tokio::test]
    async fn test_clear_local_makes_no_calls() {
        let server = MockServer::start().await;
        Mock::given(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let gateway = gateway(&server, Some("tok"));
        gateway.clear_local();

        assert!(!gateway.is_logged_in());
        assert!(gateway.session().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_user_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(me_body())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let gateway =
            gateway(&server, Some("slow")).with_identity_timeout(Duration::from_millis(100));
        let err = gateway.fetch_user().await.unwrap_err();

        assert!(matches!(err, AuthError::Timeout(_)));
        assert!(gateway.session().snapshot().is_empty());
        assert!(!gateway.is_logged_in());
    }

    #[tokio::test]
    async fn test_logout_while_fetch_in_flight_discards_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(me_body())
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gateway = gateway(&server, Some("tok"));
        let (fetched, _) = tokio::join!(gateway.fetch_user(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            gateway.logout().await
        });

        assert!(matches!(fetched.unwrap_err(), AuthError::Superseded));
        assert!(gateway.session().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway(&server, Some("tok"));
        gateway
            .session()
            .update(|state| state.authenticate(SessionToken::new("tok"), serde_json::from_value(me_body()).unwrap()));

        let first = gateway.logout().await;
        let after_first = gateway.session().snapshot();
        let second = gateway.logout().await;

        assert_eq!(first, Navigation::to_login());
        assert_eq!(first, second);
        assert!(after_first.is_empty());
        assert_eq!(gateway.session().snapshot(), after_first);
        assert!(!gateway.is_logged_in());
    }

    #[tokio::test]
    async fn test_logout_ignores_remote_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let gateway = gateway(&server, Some("tok"));
        let navigation = gateway.logout().await;

        assert_eq!(navigation.location(), "/auth/login");
        assert!(!gateway.is_logged_in());
    }

    #[tokio::test]
    async fn test_gateways_do_not_share_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(me_body()))
            .mount(&server)
            .await;

        let alice = gateway(&server, Some("alice"));
        let bob = gateway(&server, None);

        alice.fetch_user().await.unwrap();

        assert!(alice.session().is_authenticated());
        assert!(bob.session().snapshot().is_empty());
        assert!(!bob.is_logged_in());
    }
}
