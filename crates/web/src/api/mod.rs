//! Remote API access.
//!
//! # Architecture
//!
//! - [`Transport`] carries requests; [`HttpTransport`] is the `reqwest` one
//! - [`ListingClient`] wraps the read-only listing endpoints and caches the
//!   public ones in memory via `moka`
//! - Authentication endpoints live in [`crate::auth::AuthGateway`], which
//!   shares the same transport
//!
//! # Endpoints
//!
//! ```text
//! POST /auth/login                  - Exchange credentials for a token
//! POST /auth/register               - Create an account, returns a token
//! GET  /auth/me                     - Resolve a bearer token to a user
//! POST /auth/logout                 - Invalidate a token server-side
//! GET  /professionals               - Professional listing
//! GET  /professionals/{username}    - Professional profile
//! GET  /reviews/professionals/{id}  - Reviews for a professional
//! GET  /hires/                      - Hires made by the bearer
//! ```

mod listings;
pub mod transport;

pub use listings::{CacheKey, CacheValue, ListingCache, ListingClient, listing_cache};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport, TransportError};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from a remote API call that expects a successful JSON response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was obtained.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The API answered with a non-2xx status.
    #[error("remote API returned {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// The body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the API reported that the resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// Message safe to show on a page: the server's `detail` or a fallback.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Send `request` and decode a successful JSON response.
///
/// # Errors
///
/// Returns `ApiError::Status` for non-2xx responses, carrying the server's
/// `detail` when present.
pub async fn fetch_json<T, R>(transport: &R, request: ApiRequest) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    R: Transport,
{
    let response = transport.send(request).await?;
    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status,
            detail: response.detail(),
        });
    }
    Ok(response.json()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_user_message() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            detail: Some("Professional not found".to_string()),
        };
        assert!(err.is_not_found());
        assert_eq!(err.user_message("Failed"), "Professional not found");

        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        };
        assert!(!err.is_not_found());
        assert_eq!(err.user_message("Failed to fetch reviews"), "Failed to fetch reviews");
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            detail: None,
        };
        assert_eq!(err.to_string(), "remote API returned 401 Unauthorized: no detail");
    }
}
