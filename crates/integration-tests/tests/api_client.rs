//! REST client behaviour against the mock backend.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use lifestyle_store_core::{
    AddressId, Money, NotificationId, ProductId, ShipmentStatus, UserId, WishlistId,
};
use lifestyle_store_integration_tests::{MockBackend, PASSWORD, TOKEN};
use lifestyle_store_storefront::api::types::{NewAddress, ProfileUpdate};
use lifestyle_store_storefront::api::{ApiClient, ApiError};

async fn setup() -> (MockBackend, ApiClient) {
    let backend = MockBackend::start().await;
    let api = ApiClient::new(&backend.api_config()).unwrap();
    (backend, api)
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_products_decode_and_are_cached() {
    let (backend, api) = setup().await;

    let products = api.products().await.unwrap();
    assert_eq!(products.len(), 3);
    assert_eq!(products[1].price, Money::from_cents(1999));
    assert!(products[1].is_new);
    assert_eq!(products[1].original_price, Some(Money::from_cents(2500)));

    let product = api.product(ProductId::new(3)).await.unwrap();
    assert_eq!(product.name, "Ceramic Mug");
    assert_eq!(backend.state.product_fetches(), 1);

    api.invalidate_catalog().await;
    api.products().await.unwrap();
    assert_eq!(backend.state.product_fetches(), 2);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let (_backend, api) = setup().await;
    let err = api.product(ProductId::new(99)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_rate_limit_reports_retry_after() {
    let (backend, api) = setup().await;
    backend.state.rate_limit(true);

    let err = api.categories().await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited(7)));

    backend.state.rate_limit(false);
    let categories = api.categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].description.as_deref(), Some("Soft furnishings"));
}

// =============================================================================
// Headers
// =============================================================================

#[tokio::test]
async fn test_every_request_has_a_unique_request_id() {
    let (backend, api) = setup().await;
    api.categories().await.unwrap();
    api.invalidate_catalog().await;
    api.categories().await.unwrap();

    let ids: Vec<String> = backend
        .state
        .requests_to("/api/categories")
        .into_iter()
        .map(|r| r.request_id.unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert!(ids.iter().all(|id| uuid::Uuid::parse_str(id).is_ok()));
}

#[tokio::test]
async fn test_bearer_only_on_authorized_clone() {
    let (backend, api) = setup().await;
    let token = SecretString::from(TOKEN);

    let err = api.profile().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Missing or invalid token"));

    let profile = api.authorized(Some(&token)).profile().await.unwrap();
    assert_eq!(profile.id, UserId::new(42));
    assert_eq!(profile.phone.as_deref(), Some("13800000000"));

    let auth: Vec<Option<String>> = backend
        .state
        .requests_to("/api/profile")
        .into_iter()
        .map(|r| r.authorization)
        .collect();
    assert_eq!(auth, vec![None, Some(format!("Bearer {TOKEN}"))]);
}

// =============================================================================
// Account
// =============================================================================

#[tokio::test]
async fn test_login() {
    let (_backend, api) = setup().await;

    let response = api
        .login(" lin@example.com ", SecretString::from(PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.user.unwrap().username, "lin");
    assert_eq!(response.access_token.as_deref(), Some(TOKEN));

    let err = api
        .login("lin@example.com", SecretString::from("wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Invalid email or password"));
}

#[tokio::test]
async fn test_update_profile_errors_map_by_status() {
    let (_backend, api) = setup().await;
    let token = SecretString::from(TOKEN);
    let authed = api.authorized(Some(&token));
    let update = ProfileUpdate {
        phone: Some("13900000000".to_string()),
        ..ProfileUpdate::default()
    };

    let profile = authed.update_profile(UserId::new(42), &update).await.unwrap();
    assert_eq!(profile.phone.as_deref(), Some("13900000000"));
    assert_eq!(profile.username, "lin");

    let err = authed.update_profile(UserId::new(5), &update).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = api.update_profile(UserId::new(42), &update).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Forbidden"));
}

#[tokio::test]
async fn test_addresses_and_delete() {
    let (backend, api) = setup().await;

    let addresses = api.addresses(UserId::new(42)).await.unwrap();
    assert_eq!(addresses.len(), 2);
    assert!(addresses[1].is_default);
    assert_eq!(addresses[0].district.as_deref(), Some("Xihu"));

    api.delete_address(AddressId::new(7)).await.unwrap();
    let err = api.delete_address(AddressId::new(70)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref m) if m == "Address not found"));

    let deletes = backend
        .state
        .requests()
        .into_iter()
        .filter(|r| r.method == "DELETE")
        .count();
    assert_eq!(deletes, 2);
}

#[tokio::test]
async fn test_create_address() {
    let (_backend, api) = setup().await;
    let new = NewAddress {
        user_id: UserId::new(42),
        name: "Lin Xiao".to_string(),
        phone: "13800000000".to_string(),
        country: "China".to_string(),
        province: "Guangdong".to_string(),
        city: "Shenzhen".to_string(),
        district: None,
        address_line: "88 Keyuan Rd".to_string(),
        postal_code: "518000".to_string(),
        is_default: false,
    };

    let saved = api.create_address(&new).await.unwrap();
    assert_eq!(saved.id, AddressId::new(9));
    assert_eq!(saved.city, "Shenzhen");
    assert_eq!(saved.district, None);
}

#[tokio::test]
async fn test_account_profile_by_user_id() {
    let (backend, api) = setup().await;

    let account = api.account(UserId::new(42)).await.unwrap();
    assert_eq!(account.user.email, "lin@example.com");
    assert_eq!(account.profile.first_name.as_deref(), Some("Xiao"));
    assert_eq!(account.profile.birth_date, None);
    assert_eq!(backend.state.requests_to("/api/profile/42").len(), 1);

    let err = api.account(UserId::new(5)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref m) if m == "User not found"));
}

// =============================================================================
// Wishlist, Notifications, Payment Methods
// =============================================================================

#[tokio::test]
async fn test_wishlist_and_remove() {
    let (backend, api) = setup().await;

    let wishlist = api.wishlist(UserId::new(42)).await.unwrap();
    assert_eq!(wishlist.len(), 2);
    let product = wishlist[0].product.as_ref().unwrap();
    assert_eq!(product.price, Money::from_cents(1999));
    assert!(wishlist[1].product.is_none());
    assert!(api.wishlist(UserId::new(5)).await.unwrap().is_empty());

    api.remove_from_wishlist(WishlistId::new(3)).await.unwrap();
    let err = api.remove_from_wishlist(WishlistId::new(30)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref m) if m == "Wishlist item not found"));

    let removed: Vec<String> = backend
        .state
        .requests()
        .into_iter()
        .filter(|r| r.method == "DELETE")
        .map(|r| r.path)
        .collect();
    assert_eq!(removed, vec!["/api/wishlist/3", "/api/wishlist/30"]);
}

#[tokio::test]
async fn test_notifications_unwrap_list() {
    let (_backend, api) = setup().await;

    let inbox = api.notifications(UserId::new(42)).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].id, NotificationId::new(11));
    assert!(!inbox[0].is_read);
    assert!(inbox[1].created_at.is_none());

    assert!(api.notifications(UserId::new(5)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_methods() {
    let (_backend, api) = setup().await;

    let methods = api.payment_methods(UserId::new(42)).await.unwrap();
    assert_eq!(methods.len(), 2);
    assert!(methods[0].is_default);
    assert_eq!(methods[1].masked(), "**** **** **** 4242");
}

// =============================================================================
// Shipping
// =============================================================================

#[tokio::test]
async fn test_track_shipment() {
    let (_backend, api) = setup().await;

    let shipment = api.track_shipment("SF123").await.unwrap();
    assert_eq!(shipment.status, ShipmentStatus::InTransit);
    assert_eq!(shipment.latest_record().unwrap().location.as_deref(), Some("Shanghai"));

    let err = api.track_shipment("XX000").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref m) if m == "Tracking number not found"));
}
