//! Integration tests for the Lifestyle Store client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lifestyle-store-integration-tests
//! ```
//!
//! No external services are needed. [`MockBackend::start`] serves a small
//! in-process imitation of the REST backend on an ephemeral port and records
//! every request it receives.
//!
//! # Mock Accounts
//!
//! - `lin@example.com` / [`PASSWORD`] - user 42, credential [`TOKEN`]
//! - any other email or password is rejected with 401

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use lifestyle_store_storefront::config::ApiConfig;

/// Password accepted for the mock account.
pub const PASSWORD: &str = "correct horse";
/// Credential issued to the mock account.
pub const TOKEN: &str = "tok-42";

/// One request seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

/// Shared mock state, inspectable from tests.
#[derive(Debug, Default)]
pub struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    orders: Mutex<Vec<Value>>,
    product_fetches: AtomicUsize,
    reject_orders: AtomicBool,
    rate_limited: AtomicBool,
}

impl MockState {
    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `path`.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Order bodies accepted by `POST /orders`.
    pub fn orders(&self) -> Vec<Value> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of times `GET /products` hit the backend.
    pub fn product_fetches(&self) -> usize {
        self.product_fetches.load(Ordering::SeqCst)
    }

    /// Make `POST /orders` fail with 422.
    pub fn reject_orders(&self, reject: bool) {
        self.reject_orders.store(reject, Ordering::SeqCst);
    }

    /// Make `GET /categories` answer 429.
    pub fn rate_limit(&self, limited: bool) {
        self.rate_limited.store(limited, Ordering::SeqCst);
    }
}

/// A running mock backend.
#[derive(Debug)]
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Bind to an ephemeral port and serve in the background.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await });

        Self { addr, state }
    }

    /// Base URL of the mock API.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client settings pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected.
    #[allow(clippy::expect_used)]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::with_base_url(&self.base_url()).expect("mock base URL")
    }
}

/// A fresh, unique profile directory under the system temp dir.
pub fn temp_profile_dir() -> PathBuf {
    std::env::temp_dir().join(format!("lifestyle-store-it-{}", uuid::Uuid::new_v4()))
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: Arc<MockState>) -> Router {
    let api = Router::new()
        .route("/products", get(products))
        .route("/categories", get(categories))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/profile", get(profile))
        .route("/profile/{id}", get(account).put(update_profile))
        .route("/addresses", post(create_address))
        .route("/addresses/{id}", get(addresses).delete(delete_address))
        .route("/wishlist/{id}", get(wishlist).delete(remove_wishlist_item))
        .route("/notifications/{user_id}", get(notifications))
        .route("/payment-methods/{user_id}", get(payment_methods))
        .route("/orders", post(create_order))
        .route("/shipping/track/{tracking_number}", get(track));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(Arc::clone(&state), record))
        .with_state(state)
}

async fn record(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
    let recorded = {
        let header_value = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization: header_value(header::AUTHORIZATION.as_str()),
            request_id: header_value("x-request-id"),
        }
    };
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(recorded);

    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn user() -> Value {
    json!({ "id": 42, "username": "lin", "email": "lin@example.com" })
}

fn address(id: i64, is_default: bool) -> Value {
    json!({
        "id": id,
        "user_id": 42,
        "name": "Lin Xiao",
        "phone": "13800000000",
        "country": "China",
        "province": "Zhejiang",
        "city": "Hangzhou",
        "district": "Xihu",
        "address_line": format!("{id} Wensan Rd"),
        "postal_code": "310000",
        "is_default": is_default
    })
}

async fn products(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.product_fetches.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "products": [
            {"id": 1, "name": "Bamboo Tray", "price": "10.00", "image": "tray.jpg",
             "category": "kitchen", "rating": 4.6, "isNew": false, "stock": 20, "reviews": 12},
            {"id": 2, "name": "Linen Throw", "price": 19.99, "image": "throw.jpg",
             "category": "home", "rating": 4.9, "isNew": true, "stock": 3,
             "originalPrice": "25.00", "discount": 20},
            {"id": 3, "name": "Ceramic Mug", "price": "5.00", "image": "mug.jpg",
             "category": "kitchen", "rating": 4.2, "stock": 50}
        ]
    }))
}

async fn categories(State(state): State<Arc<MockState>>) -> Response {
    if state.rate_limited.load(Ordering::SeqCst) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "7")],
            "slow down",
        )
            .into_response();
    }
    Json(json!([
        {"id": "home", "name": "Home", "description": "Soft furnishings"},
        {"id": "kitchen", "name": "Kitchen"}
    ]))
    .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == "lin@example.com" && body["password"] == PASSWORD {
        Json(json!({ "user": user(), "access_token": TOKEN })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Invalid email or password")
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "lin@example.com" {
        return error(StatusCode::CONFLICT, "Email already registered");
    }
    (
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    )
        .into_response()
}

async fn profile(headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Missing or invalid token");
    }
    let mut profile = user();
    profile["phone"] = json!("13800000000");
    profile["created_at"] = json!("2024-11-02T10:00:00Z");
    Json(profile).into_response()
}

async fn account(Path(id): Path<i64>) -> Response {
    if id != 42 {
        return error(StatusCode::NOT_FOUND, "User not found");
    }
    Json(json!({
        "user": user(),
        "profile": {"first_name": "Xiao", "last_name": "Lin", "phone": "13800000000", "gender": ""}
    }))
    .into_response()
}

async fn update_profile(
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if !is_authorized(&headers) {
        return error(StatusCode::FORBIDDEN, "Forbidden");
    }
    if id != 42 {
        return error(StatusCode::NOT_FOUND, "User not found");
    }
    let mut profile = user();
    if let Some(username) = body.get("username") {
        profile["username"] = username.clone();
    }
    if let Some(phone) = body.get("phone") {
        profile["phone"] = phone.clone();
    }
    Json(profile).into_response()
}

async fn addresses(Path(user_id): Path<i64>) -> Json<Value> {
    if user_id == 42 {
        Json(json!([address(7, false), address(8, true)]))
    } else {
        Json(json!([]))
    }
}

async fn create_address(Json(mut body): Json<Value>) -> Response {
    body["id"] = json!(9);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn delete_address(Path(id): Path<i64>) -> Response {
    if id == 7 || id == 8 {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error(StatusCode::NOT_FOUND, "Address not found")
    }
}

async fn wishlist(Path(user_id): Path<i64>) -> Json<Value> {
    if user_id != 42 {
        return Json(json!([]));
    }
    Json(json!([
        {"id": 3, "product_id": 2, "created_at": "2025-02-10T12:00:00Z",
         "product": {"id": 2, "name": "Linen Throw", "price": "19.99", "rating": 4.9, "stock": 3}},
        {"id": 4, "product_id": 77}
    ]))
}

async fn remove_wishlist_item(Path(id): Path<i64>) -> Response {
    if id == 3 || id == 4 {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error(StatusCode::NOT_FOUND, "Wishlist item not found")
    }
}

async fn notifications(Path(user_id): Path<i64>) -> Json<Value> {
    if user_id != 42 {
        return Json(json!({}));
    }
    Json(json!({
        "notifications": [
            {"id": 11, "title": "Order shipped", "content": "SF123 is on its way",
             "is_read": false, "created_at": "2025-03-01T08:05:00Z"},
            {"id": 10, "title": "Welcome", "content": "Thanks for joining", "is_read": true}
        ]
    }))
}

async fn payment_methods(Path(user_id): Path<i64>) -> Json<Value> {
    if user_id != 42 {
        return Json(json!([]));
    }
    Json(json!([
        {"id": 1, "provider": "Alipay", "last_four": "8888", "is_default": true},
        {"id": 2, "provider": "Visa", "last_four": "4242"}
    ]))
}

async fn create_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !is_authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Missing or invalid token");
    }
    if state.reject_orders.load(Ordering::SeqCst) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "Payment declined" })),
        )
            .into_response();
    }

    let total = body["total"].clone();
    let mut orders = state.orders.lock().unwrap_or_else(PoisonError::into_inner);
    orders.push(body);
    let order_id = 1000 + orders.len();

    (
        StatusCode::CREATED,
        Json(json!({ "order_id": order_id, "status": "confirmed", "total": total })),
    )
        .into_response()
}

async fn track(Path(tracking_number): Path<String>) -> Response {
    if tracking_number != "SF123" {
        return error(StatusCode::NOT_FOUND, "Tracking number not found");
    }
    Json(json!({
        "tracking_number": "SF123",
        "carrier": "SF Express",
        "carrier_service": "standard",
        "status": "in_transit",
        "shipped_at": "2025-03-01T08:00:00Z",
        "estimated_delivery": "2025-03-04T18:00:00Z",
        "tracking_records": [
            {"id": 2, "status": "in_transit", "description": "Departed hub",
             "location": "Shanghai", "timestamp": "2025-03-02T09:30:00Z"},
            {"id": 1, "status": "picked_up", "description": "Picked up",
             "location": "Hangzhou", "timestamp": "2025-03-01T08:00:00Z"}
        ]
    }))
    .into_response()
}
