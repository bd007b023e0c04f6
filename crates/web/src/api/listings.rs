//! Read-only listing endpoints.
//!
//! Public data (professionals, profiles, reviews) is cached with `moka` for
//! the configured TTL. Hires belong to the bearer and are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::SecretString;
use tracing::{debug, instrument};

use talent_hub_core::{HireSummary, Professional, ProfessionalId, ProfessionalProfile, Review};

use super::{ApiError, ApiRequest, Transport, fetch_json};

/// Cache key for public listing data.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Professionals,
    Professional(String),
    Reviews(ProfessionalId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Professionals(Arc<Vec<Professional>>),
    Professional(Arc<ProfessionalProfile>),
    Reviews(Arc<Vec<Review>>),
}

/// Shared listing cache, owned by the application state.
pub type ListingCache = Cache<CacheKey, CacheValue>;

/// Build the listing cache.
#[must_use]
pub fn listing_cache(ttl: Duration) -> ListingCache {
    Cache::builder().max_capacity(1000).time_to_live(ttl).build()
}

/// Client for the listing endpoints, bound to one transport.
#[derive(Clone)]
pub struct ListingClient<T> {
    transport: T,
    cache: ListingCache,
}

impl<T: Transport> ListingClient<T> {
    /// Bind a client to `transport`, sharing `cache`.
    #[must_use]
    pub const fn new(transport: T, cache: ListingCache) -> Self {
        Self { transport, cache }
    }

    /// All professionals.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the API call fails.
    #[instrument(skip(self))]
    pub async fn professionals(&self) -> Result<Arc<Vec<Professional>>, ApiError> {
        if let Some(CacheValue::Professionals(list)) = self.cache.get(&CacheKey::Professionals).await {
            debug!("Cache hit for professionals");
            return Ok(list);
        }

        let list: Arc<Vec<Professional>> =
            Arc::new(fetch_json(&self.transport, ApiRequest::get("/professionals")).await?);
        self.cache
            .insert(CacheKey::Professionals, CacheValue::Professionals(Arc::clone(&list)))
            .await;
        Ok(list)
    }

    /// A professional's profile by username.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the API call fails; `is_not_found()` is true for
    /// unknown usernames.
    #[instrument(skip(self))]
    pub async fn professional(&self, username: &str) -> Result<Arc<ProfessionalProfile>, ApiError> {
        let key = CacheKey::Professional(username.to_string());
        if let Some(CacheValue::Professional(profile)) = self.cache.get(&key).await {
            debug!("Cache hit for professional");
            return Ok(profile);
        }

        let path = format!("/professionals/{}", urlencoding::encode(username));
        let profile: Arc<ProfessionalProfile> =
            Arc::new(fetch_json(&self.transport, ApiRequest::get(path)).await?);
        self.cache
            .insert(key, CacheValue::Professional(Arc::clone(&profile)))
            .await;
        Ok(profile)
    }

    /// Reviews left for a professional.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the API call fails.
    #[instrument(skip(self))]
    pub async fn reviews(&self, professional: ProfessionalId) -> Result<Arc<Vec<Review>>, ApiError> {
        let key = CacheKey::Reviews(professional);
        if let Some(CacheValue::Reviews(reviews)) = self.cache.get(&key).await {
            debug!("Cache hit for reviews");
            return Ok(reviews);
        }

        let path = format!("/reviews/professionals/{professional}");
        let reviews: Arc<Vec<Review>> =
            Arc::new(fetch_json(&self.transport, ApiRequest::get(path)).await?);
        self.cache
            .insert(key, CacheValue::Reviews(Arc::clone(&reviews)))
            .await;
        Ok(reviews)
    }

    /// Hires made by the holder of `token`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the API call fails.
    #[instrument(skip_all)]
    pub async fn hires(&self, token: &SecretString) -> Result<Vec<HireSummary>, ApiError> {
        fetch_json(&self.transport, ApiRequest::get("/hires/").bearer(token)).await
    }
}
