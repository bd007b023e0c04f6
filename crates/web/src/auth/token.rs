//! Bearer token persistence.
//!
//! The session cookie is the single persistence channel: the route guard
//! reads it from the request and every change is written back to the
//! response as one `Set-Cookie` per request.

use std::sync::{Mutex, PoisonError};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use secrecy::{ExposeSecret, SecretString};

/// Name of the cookie that holds the bearer token.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Lifetime of the session cookie.
pub const SESSION_MAX_AGE: time::Duration = time::Duration::days(7);

/// An opaque bearer credential issued by the remote API.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    #[must_use]
    pub const fn as_secret(&self) -> &SecretString {
        &self.0
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SessionToken {}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Somewhere the bearer token survives between requests.
pub trait TokenStore: Send + Sync {
    /// The stored token, if any.
    fn load(&self) -> Option<SessionToken>;

    /// Persist `token`, replacing any previous one.
    fn store(&self, token: &SessionToken);

    /// Remove the stored token. Removing twice is harmless.
    fn clear(&self);
}

/// Attributes applied to the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    /// Mark the cookie `Secure` (HTTPS deployments).
    pub secure: bool,
}

impl CookieSettings {
    /// Cookie carrying `token`: `HttpOnly`, `SameSite=Strict`, seven days.
    #[must_use]
    pub fn session_cookie(self, token: &SessionToken) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, token.expose().to_string()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .max_age(SESSION_MAX_AGE)
            .build()
    }

    /// Cookie template used to expire the session cookie.
    #[must_use]
    pub fn removal_cookie(self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build()
    }
}

/// Token store backed by the request's cookie jar.
///
/// Changes accumulate in the jar; [`CookieTokenStore::jar`] hands them to the
/// response.
#[derive(Debug)]
pub struct CookieTokenStore {
    jar: Mutex<CookieJar>,
    settings: CookieSettings,
}

impl CookieTokenStore {
    #[must_use]
    pub const fn new(jar: CookieJar, settings: CookieSettings) -> Self {
        Self {
            jar: Mutex::new(jar),
            settings,
        }
    }

    /// The jar including every change made so far.
    #[must_use]
    pub fn jar(&self) -> CookieJar {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CookieJar> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(CookieJar) -> CookieJar) {
        let mut jar = self.lock();
        let current = std::mem::take(&mut *jar);
        *jar = f(current);
    }
}

impl TokenStore for CookieTokenStore {
    fn load(&self) -> Option<SessionToken> {
        self.lock()
            .get(SESSION_COOKIE_NAME)
            .map(Cookie::value)
            .filter(|value| !value.is_empty())
            .map(SessionToken::new)
    }

    fn store(&self, token: &SessionToken) {
        let cookie = self.settings.session_cookie(token);
        self.update(|jar| jar.add(cookie));
    }

    fn clear(&self) {
        let cookie = self.settings.removal_cookie();
        self.update(|jar| jar.remove(cookie));
    }
}
