//! HTTP middleware stack for the front-end.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Route guard (token validation, redirects, per-request gateway)

pub mod auth;
pub mod request_id;
pub mod route_guard;
pub mod security_headers;

pub use auth::{Auth, AuthRejection, OptionalUser, RedirectIfLoggedIn, RequireLoggedIn, RequireUser};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use route_guard::{
    AUTH_ONLY_PREFIXES, GuardDecision, PROTECTED_PREFIXES, RequestAuth, RouteKind, RouteTable,
    TokenStatus, decide, route_guard,
};
pub use security_headers::security_headers_middleware;
