//! Domain types exchanged with the Lifestyle Store REST backend.
//!
//! Field names follow the backend's snake_case JSON. The product listing
//! historically used camelCase for a couple of fields, accepted via aliases.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use lifestyle_store_core::{
    AddressId, Email, Money, NotificationId, OrderId, OrderStatus, PaymentMethod,
    PaymentMethodId, ProductId, ShipmentStatus, UserId, WishlistId,
};

use crate::models::SessionUser;

// =============================================================================
// Catalog Types
// =============================================================================

/// A product as listed by `GET /products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Category slug (e.g. `home`, `kitchen`).
    #[serde(default)]
    pub category: String,
    /// Average review score out of 5.
    #[serde(default)]
    pub rating: f64,
    #[serde(default, alias = "isNew")]
    pub is_new: bool,
    /// Units available for sale.
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub description: Option<String>,
    /// Price before discount, when the product is on sale.
    #[serde(default, alias = "originalPrice")]
    pub original_price: Option<Money>,
    /// Discount percentage.
    #[serde(default)]
    pub discount: Option<Decimal>,
    /// Number of reviews.
    #[serde(default)]
    pub reviews: u32,
}

impl Product {
    /// Whether `quantity` more units can be taken from stock.
    ///
    /// The cart does not enforce stock; views call this before adding.
    #[must_use]
    pub const fn can_fulfil(&self, quantity: u32) -> bool {
        quantity <= self.stock
    }
}

/// Response body of `GET /products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProductList {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category slug, matching [`Product::category`].
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Account Types
// =============================================================================

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Body of `POST /login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Body of `POST /register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: Email,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Response of `POST /login` and `POST /register`.
///
/// Registration may return only a message, in which case the user signs in
/// separately.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(default, alias = "token")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Profile returned by `GET /profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `PUT /profile/{id}`. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Optional personal details attached to an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// As entered by the user; the backend does not normalize it.
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Response of `GET /profile/{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub user: UserProfile,
    #[serde(default)]
    pub profile: ProfileDetails,
}

// =============================================================================
// Wishlist, Notification and Payment Method Types
// =============================================================================

/// A saved product on the user's wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: WishlistId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// Embedded product, absent if it was removed from the catalog.
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A message in the user's inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response body of `GET /notifications/{user_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct NotificationList {
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

/// A stored card or wallet. Only the last four digits ever leave the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPaymentMethod {
    pub id: PaymentMethodId,
    pub provider: String,
    #[serde(default)]
    pub last_four: String,
    #[serde(default)]
    pub is_default: bool,
}

impl SavedPaymentMethod {
    /// Card-style rendering, e.g. `**** **** **** 4242`.
    #[must_use]
    pub fn masked(&self) -> String {
        format!("**** **** **** {}", self.last_four)
    }
}

// =============================================================================
// Address Types
// =============================================================================

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    /// Recipient name.
    pub name: String,
    pub phone: String,
    pub country: String,
    pub province: String,
    pub city: String,
    #[serde(default)]
    pub district: Option<String>,
    pub address_line: String,
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Single-line rendering for summaries.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.province.as_str(), self.city.as_str()];
        if let Some(district) = self.district.as_deref() {
            parts.push(district);
        }
        parts.push(self.address_line.as_str());
        format!("{} ({}) {}", self.name, self.phone, parts.join(" "))
    }
}

/// Body of `POST /addresses`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAddress {
    pub user_id: UserId,
    pub name: String,
    pub phone: String,
    pub country: String,
    pub province: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    pub address_line: String,
    pub postal_code: String,
    pub is_default: bool,
}

// =============================================================================
// Order Types
// =============================================================================

/// One line of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at the time of ordering.
    pub price: Money,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub total: Money,
}

/// Response of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    #[serde(alias = "id")]
    pub order_id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub total: Option<Money>,
}

// =============================================================================
// Shipping Types
// =============================================================================

/// One scan event on a shipment's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub id: i64,
    pub status: ShipmentStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Response of `GET /shipping/track/{tracking_number}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub tracking_number: String,
    pub carrier: String,
    #[serde(default)]
    pub carrier_service: Option<String>,
    pub status: ShipmentStatus,
    #[serde(default)]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tracking_records: Vec<TrackingRecord>,
}

impl Shipment {
    /// Most recent tracking record by timestamp.
    #[must_use]
    pub fn latest_record(&self) -> Option<&TrackingRecord> {
        self.tracking_records.iter().max_by_key(|r| r.timestamp)
    }
}

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
