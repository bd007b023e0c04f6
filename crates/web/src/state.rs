//! Application state shared across handlers.
//!
//! Only immutable, process-wide resources live here: configuration, the HTTP
//! connection pool, the public listing cache, and the route table. Anything
//! tied to a visitor (token, user, session) is built per request by the
//! route guard.

use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;

use crate::api::{HttpTransport, ListingCache, ListingClient, TransportError, listing_cache};
use crate::auth::{AuthGateway, CookieSettings, CookieTokenStore, RequestGateway, SessionStore};
use crate::config::WebConfig;
use crate::middleware::RouteTable;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    transport: HttpTransport,
    listing_cache: ListingCache,
    routes: RouteTable,
}

impl AppState {
    /// Create the application state with the default route table.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: WebConfig) -> Result<Self, TransportError> {
        Self::with_routes(config, RouteTable::default())
    }

    /// Create the application state with a custom route table.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_routes(config: WebConfig, routes: RouteTable) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.api_url, config.api_timeout)?;
        let listing_cache = listing_cache(config.listing_cache_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                transport,
                listing_cache,
                routes,
            }),
        })
    }

    /// Get a reference to the front-end configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the shared transport.
    #[must_use]
    pub fn transport(&self) -> &HttpTransport {
        &self.inner.transport
    }

    /// Get a reference to the protected/auth-only route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.inner.routes
    }

    /// Attributes for the session cookie.
    #[must_use]
    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            secure: self.inner.config.is_secure(),
        }
    }

    /// Build a gateway for one request from its cookie jar.
    ///
    /// The gateway gets a fresh session store and a transport tagged with the
    /// request id.
    #[must_use]
    pub fn gateway(&self, jar: CookieJar, request_id: Option<&str>) -> RequestGateway {
        let tokens = CookieTokenStore::new(jar, self.cookie_settings());
        AuthGateway::new(
            self.inner.transport.scoped(request_id),
            tokens,
            SessionStore::new(),
        )
        .with_identity_timeout(self.inner.config.api_timeout)
    }

    /// Listing client for one request.
    #[must_use]
    pub fn listings(&self, request_id: Option<&str>) -> ListingClient<HttpTransport> {
        ListingClient::new(
            self.inner.transport.scoped(request_id),
            self.inner.listing_cache.clone(),
        )
    }
}
