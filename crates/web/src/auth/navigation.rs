//! Redirect signals.
//!
//! Auth operations never perform navigation themselves. They return a
//! [`Navigation`] that the caller turns into a response.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Where authenticated visitors are sent away from auth-only pages.
pub const HOME_PATH: &str = "/";

/// How the redirect is expressed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// 303, used by the route guard and after form submissions.
    SeeOther,
    /// 302, used by per-page load guards.
    Found,
}

/// A request to send the browser elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    location: String,
    kind: NavigationKind,
}

impl Navigation {
    #[must_use]
    pub fn see_other(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            kind: NavigationKind::SeeOther,
        }
    }

    #[must_use]
    pub fn found(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            kind: NavigationKind::Found,
        }
    }

    #[must_use]
    pub fn to_login() -> Self {
        Self::see_other(LOGIN_PATH)
    }

    #[must_use]
    pub fn to_home() -> Self {
        Self::see_other(HOME_PATH)
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub const fn kind(&self) -> NavigationKind {
        self.kind
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self.kind {
            NavigationKind::SeeOther => StatusCode::SEE_OTHER,
            NavigationKind::Found => StatusCode::FOUND,
        }
    }
}

impl IntoResponse for Navigation {
    fn into_response(self) -> Response {
        (self.status(), [(header::LOCATION, self.location)]).into_response()
    }
}
