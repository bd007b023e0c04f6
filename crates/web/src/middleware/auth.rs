//! Authentication extractors.
//!
//! All of them read the [`RequestAuth`] the route guard publishes. The
//! per-page guards ([`RequireLoggedIn`], [`RedirectIfLoggedIn`]) only check
//! token presence and answer with 302, independent of the guard's decision.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use talent_hub_core::User;

use super::route_guard::RequestAuth;
use crate::auth::{HOME_PATH, LOGIN_PATH, Navigation, RequestGateway, SESSION_COOKIE_NAME};
use crate::error::AppError;

/// Rejection for the authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// Send the visitor elsewhere.
    Redirect(Navigation),
    /// The route guard did not run for this route.
    MissingContext,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(navigation) => navigation.into_response(),
            Self::MissingContext => {
                AppError::Internal("authentication context missing".to_string()).into_response()
            }
        }
    }
}

fn request_auth(parts: &Parts) -> Result<&RequestAuth, AuthRejection> {
    parts
        .extensions
        .get::<RequestAuth>()
        .ok_or(AuthRejection::MissingContext)
}

/// The request's authentication gateway.
///
/// Handlers use it for login, registration, and logout. Token changes are
/// written to the response by the route guard.
pub struct Auth(pub Arc<RequestGateway>);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let RequestAuth(gateway) = request_auth(parts)?;
        Ok(Self(Arc::clone(gateway)))
    }
}

/// Extractor that requires a resolved user.
///
/// Rejects with a 303 to the login page when the session is not
/// authenticated.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireUser(pub User);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let RequestAuth(gateway) = request_auth(parts)?;
        gateway
            .session()
            .user()
            .map(Self)
            .ok_or_else(|| AuthRejection::Redirect(Navigation::to_login()))
    }
}

/// Extractor that optionally gets the resolved user.
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<RequestAuth>()
            .and_then(|RequestAuth(gateway)| gateway.session().user());
        Ok(Self(user))
    }
}

/// Whether the request holds a session token.
///
/// Prefers the gateway's view, which reflects a token the guard just cleared.
fn has_token(parts: &Parts) -> bool {
    parts.extensions.get::<RequestAuth>().map_or_else(
        || CookieJar::from_headers(&parts.headers).get(SESSION_COOKIE_NAME).is_some(),
        |RequestAuth(gateway)| gateway.is_logged_in(),
    )
}

/// Page guard: 302 to the login page unless a token is held.
pub struct RequireLoggedIn;

impl<S> FromRequestParts<S> for RequireLoggedIn
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if has_token(parts) {
            Ok(Self)
        } else {
            Err(AuthRejection::Redirect(Navigation::found(LOGIN_PATH)))
        }
    }
}

/// Page guard: 302 to the home page when a token is held.
pub struct RedirectIfLoggedIn;

impl<S> FromRequestParts<S> for RedirectIfLoggedIn
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if has_token(parts) {
            Err(AuthRejection::Redirect(Navigation::found(HOME_PATH)))
        } else {
            Ok(Self)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Request, StatusCode, header};

    use super::*;

    fn parts(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_require_logged_in_without_context_reads_cookie() {
        let mut with_cookie = parts(Some("session=tok"));
        assert!(RequireLoggedIn::from_request_parts(&mut with_cookie, &()).await.is_ok());

        let mut without_cookie = parts(None);
        let rejection = RequireLoggedIn::from_request_parts(&mut without_cookie, &())
            .await
            .err()
            .unwrap();
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/auth/login");
    }

    #[tokio::test]
    async fn test_redirect_if_logged_in() {
        let mut with_cookie = parts(Some("session=tok"));
        let response = RedirectIfLoggedIn::from_request_parts(&mut with_cookie, &())
            .await
            .err()
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

        let mut without_cookie = parts(None);
        assert!(RedirectIfLoggedIn::from_request_parts(&mut without_cookie, &()).await.is_ok());
    }

    #[tokio::test]
    async fn test_require_user_without_guard_is_server_error() {
        let mut parts = parts(Some("session=tok"));
        let response = RequireUser::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_optional_user_without_guard_is_none() {
        let mut parts = parts(None);
        let OptionalUser(user) = OptionalUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(user.is_none());
    }
}
