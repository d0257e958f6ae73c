//! Lifestyle Store REST API client.
//!
//! # Architecture
//!
//! - JSON over HTTPS via `reqwest`, one method per endpoint
//! - The backend is the source of truth; only the catalog is cached
//!   (`moka`, TTL from [`ApiConfig::catalog_cache_ttl`])
//! - Every request carries a fresh `X-Request-Id` for backend log correlation
//! - No automatic retries; [`ApiError::RateLimited`] reports the server's
//!   `Retry-After`
//!
//! # Example
//!
//! ```rust,ignore
//! use lifestyle_store_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config.api)?;
//! let products = api.products().await?;
//!
//! // Authenticated calls go through a clone carrying the bearer credential
//! let profile = api.authorized(session.credential()).profile().await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use lifestyle_store_core::{AddressId, ProductId, UserId, WishlistId};

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};
use types::{
    AccountProfile, Address, AuthResponse, Category, ErrorBody, LoginRequest, NewAddress,
    Notification, NotificationList, OrderConfirmation, OrderRequest, Product, ProductList,
    ProfileUpdate, RegisterRequest, SavedPaymentMethod, Shipment, UserProfile, WishlistItem,
};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Errors that can occur when calling the REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, expired or rejected credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The configured base URL cannot take path segments.
    #[error("Base URL cannot be extended: {0}")]
    InvalidUrl(String),
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Lifestyle Store REST backend.
///
/// Cheap to clone; clones share the connection pool and catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    bearer: Option<SecretString>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authorized", &self.bearer.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
            bearer: None,
        })
    }

    /// A clone that sends `Authorization: Bearer <credential>`.
    ///
    /// Passing `None` yields an anonymous clone.
    #[must_use]
    pub fn authorized(&self, credential: Option<&SecretString>) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            bearer: credential.cloned(),
        }
    }

    /// Whether this client sends a bearer credential.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        self.bearer.is_some()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the body of a successful response.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        let request_id = Uuid::new_v4();
        let mut request = self
            .inner
            .client
            .request(method.clone(), url.clone())
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .header("Content-Type", "application/json");

        if let Some(bearer) = &self.bearer {
            request = request.bearer_auth(bearer.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path = url.path(), %request_id, "Sending request");
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        tracing::warn!(
            status = %status,
            %request_id,
            body = %text.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );
        Err(status_error(status, &text))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let text = self.execute::<()>(Method::GET, url, None).await?;
        parse(&text)
    }

    async fn send_json<B, T>(&self, method: Method, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let text = self.execute(method, url, Some(body)).await?;
        parse(&text)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let list: ProductList = self.get(&["products"]).await?;
        debug!(count = list.products.len(), "Fetched products");

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(list.products.clone()))
            .await;

        Ok(list.products)
    }

    /// Look up one product in the (cached) listing.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if no product has `id`, or an error if
    /// the listing cannot be fetched.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.products()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))
    }

    /// List product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get(&["categories"]).await?;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Drop cached catalog data so the next call refetches.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate(&CacheKey::Products).await;
        self.inner.cache.invalidate(&CacheKey::Categories).await;
    }

    // =========================================================================
    // Account Methods
    // =========================================================================

    /// Exchange email and password for an identity and credential.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for rejected credentials, or an
    /// error if the API request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: SecretString) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password,
        };
        self.send_json(Method::POST, &["login"], &body).await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.send_json(Method::POST, &["register"], request).await
    }

    /// Profile of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a valid credential.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.get(&["profile"]).await
    }

    /// Account record and personal details of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown user.
    #[instrument(skip(self))]
    pub async fn account(&self, user_id: UserId) -> Result<AccountProfile, ApiError> {
        self.get(&["profile", &user_id.to_string()]).await
    }

    /// Update profile fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        self.send_json(Method::PUT, &["profile", &user_id.to_string()], update)
            .await
    }

    // =========================================================================
    // Address Methods
    // =========================================================================

    /// Saved shipping addresses of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn addresses(&self, user_id: UserId) -> Result<Vec<Address>, ApiError> {
        self.get(&["addresses", &user_id.to_string()]).await
    }

    /// Save a new shipping address.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the address.
    #[instrument(skip(self, address), fields(user_id = %address.user_id))]
    pub async fn create_address(&self, address: &NewAddress) -> Result<Address, ApiError> {
        self.send_json(Method::POST, &["addresses"], address).await
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        let url = self.endpoint(&["addresses", &id.to_string()])?;
        self.execute::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    // =========================================================================
    // Wishlist, Notification and Payment Method Methods
    // =========================================================================

    /// Products saved by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn wishlist(&self, user_id: UserId) -> Result<Vec<WishlistItem>, ApiError> {
        self.get(&["wishlist", &user_id.to_string()]).await
    }

    /// Remove an entry from a wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the entry does not exist.
    #[instrument(skip(self))]
    pub async fn remove_from_wishlist(&self, id: WishlistId) -> Result<(), ApiError> {
        let url = self.endpoint(&["wishlist", &id.to_string()])?;
        self.execute::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// Inbox of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn notifications(&self, user_id: UserId) -> Result<Vec<Notification>, ApiError> {
        let list: NotificationList = self.get(&["notifications", &user_id.to_string()]).await?;
        Ok(list.notifications)
    }

    /// Stored payment methods of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn payment_methods(
        &self,
        user_id: UserId,
    ) -> Result<Vec<SavedPaymentMethod>, ApiError> {
        self.get(&["payment-methods", &user_id.to_string()]).await
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order.
    #[instrument(skip(self, order), fields(user_id = %order.user_id, lines = order.items.len()))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, ApiError> {
        self.send_json(Method::POST, &["orders"], order).await
    }

    /// Tracking details for a shipment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown tracking number.
    #[instrument(skip(self))]
    pub async fn track_shipment(&self, tracking_number: &str) -> Result<Shipment, ApiError> {
        let tracking_number = tracking_number.trim();
        if tracking_number.is_empty() {
            return Err(ApiError::NotFound("empty tracking number".to_string()));
        }
        self.get(&["shipping", "track", tracking_number]).await
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        ApiError::Parse(e)
    })
}

/// Map a non-success status and body to an [`ApiError`].
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::with_base_url(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("https://shop.example.com/api");
        let url = api.endpoint(&["shipping", "track", "SF 123"]).unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/shipping/track/SF%20123");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let api = client("https://shop.example.com/api/");
        let url = api.endpoint(&["products"]).unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/products");
    }

    #[test]
    fn test_status_error_mapping() {
        let err = status_error(StatusCode::UNAUTHORIZED, r#"{"message":"Token expired"}"#);
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Token expired"));

        let err = status_error(StatusCode::FORBIDDEN, "");
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Forbidden"));

        let err = status_error(StatusCode::NOT_FOUND, r#"{"error":"no such order"}"#);
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "no such order"));

        let err = status_error(StatusCode::UNPROCESSABLE_ENTITY, "<html>oops</html>");
        assert!(matches!(err, ApiError::Status { status: 422, .. }));
    }

    #[test]
    fn test_authorized_shares_inner_state() {
        let api = client("https://shop.example.com/api");
        let token = SecretString::from("tok");

        let authed = api.authorized(Some(&token));
        assert!(authed.is_authorized());
        assert!(!api.is_authorized());
        assert!(Arc::ptr_eq(&api.inner, &authed.inner));
        assert!(!authed.authorized(None).is_authorized());
        assert!(!format!("{authed:?}").contains("tok"));
    }
}
