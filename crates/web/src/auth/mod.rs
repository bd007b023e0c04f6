//! Authentication client.
//!
//! # Architecture
//!
//! - [`SessionStore`] - reactive per-context session state
//! - [`TokenStore`] - bearer token persistence; [`CookieTokenStore`] keeps it
//!   in the `session` cookie
//! - [`AuthGateway`] - login, registration, identity fetch, and logout against
//!   the remote API
//! - [`Navigation`] - redirect signal returned instead of navigating
//!
//! The route guard assembles a gateway for every request; handlers reach it
//! through the extractors in [`crate::middleware::auth`].

mod error;
mod gateway;
mod navigation;
mod session;
mod token;

pub use error::AuthError;
pub use gateway::{AuthGateway, DEFAULT_IDENTITY_TIMEOUT, Registration};
pub use navigation::{HOME_PATH, LOGIN_PATH, Navigation, NavigationKind};
pub use session::{SessionState, SessionStore};
pub use token::{
    CookieSettings, CookieTokenStore, SESSION_COOKIE_NAME, SESSION_MAX_AGE, SessionToken,
    TokenStore,
};

use crate::api::HttpTransport;

/// The gateway the route guard builds for each request.
pub type RequestGateway = AuthGateway<HttpTransport, CookieTokenStore>;
