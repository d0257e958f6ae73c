//! Client state wiring.
//!
//! [`Storefront`] is the composition root: it opens the profile store,
//! constructs the managers over it and pairs them with the API client. Views
//! and the CLI receive it by reference instead of reaching for globals.

use secrecy::SecretString;
use tracing::{info, instrument};

use lifestyle_store_core::{Email, PaymentMethod, ProductId};

use crate::api::ApiClient;
use crate::api::types::{
    AccountProfile, Address, Notification, OrderConfirmation, Product, RegisterRequest,
    SavedPaymentMethod, WishlistItem,
};
use crate::config::{ApiConfig, ClientConfig};
use crate::error::{AppError, Result};
use crate::models::SessionUser;
use crate::services::{CartManager, SearchHistory, SessionManager, place_order};
use crate::store::Store;

/// Cart, session, search history and API client for one profile.
#[derive(Debug)]
pub struct Storefront {
    api: ApiClient,
    store: Store,
    cart: CartManager,
    session: SessionManager,
    searches: SearchHistory,
}

impl Storefront {
    /// Open the profile directory named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the HTTP
    /// client cannot be built.
    pub fn open(config: &ClientConfig) -> Result<Self> {
        let store = Store::open_dir(&config.data_dir)?;
        info!(data_dir = %config.data_dir.display(), "Opened profile");
        Self::with_store(&config.api, store)
    }

    /// Build over an existing store, e.g. [`Store::in_memory`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(api: &ApiConfig, store: Store) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(api)?,
            cart: CartManager::open(store.clone()),
            session: SessionManager::open(store.clone()),
            searches: SearchHistory::open(store.clone()),
            store,
        })
    }

    /// Anonymous API client.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// API client carrying the current session's credential, if any.
    #[must_use]
    pub fn authed_api(&self) -> ApiClient {
        self.api.authorized(self.session.credential())
    }

    #[must_use]
    pub const fn cart(&self) -> &CartManager {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartManager {
        &mut self.cart
    }

    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    pub const fn session_mut(&mut self) -> &mut SessionManager {
        &mut self.session
    }

    #[must_use]
    pub const fn searches(&self) -> &SearchHistory {
        &self.searches
    }

    pub const fn searches_mut(&mut self) -> &mut SearchHistory {
        &mut self.searches
    }

    /// Fetch `product_id` and add `quantity` units to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InsufficientStock`] when the cart would hold more
    /// than the listed stock, or an error if the product cannot be fetched.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&mut self, product_id: ProductId, quantity: u32) -> Result<Product> {
        let product = self.api.product(product_id).await?;
        let in_cart = self.cart.get(product_id).map_or(0, |line| line.quantity);

        if !product.can_fulfil(in_cart.saturating_add(quantity)) {
            return Err(AppError::InsufficientStock {
                product_id,
                available: product.stock,
            });
        }

        self.cart.add_item(&product, quantity);
        Ok(product)
    }

    /// Sign in and record the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the credentials or answers
    /// without an identity.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: SecretString) -> Result<SessionUser> {
        let response = self.api.login(email, password).await?;
        let user = response.user.ok_or_else(|| {
            AppError::UnexpectedResponse("login response has no user".to_string())
        })?;

        self.session
            .login(user.clone(), response.access_token.map(SecretString::from));
        Ok(user)
    }

    /// Create an account, signing in if the backend returns a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed or the backend rejects the
    /// registration.
    #[instrument(skip(self, password))]
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: SecretString,
    ) -> Result<Option<SessionUser>> {
        let request = RegisterRequest {
            username: username.trim().to_string(),
            email: Email::parse(email)?,
            password,
        };
        let response = self.api.register(&request).await?;

        match response.user {
            Some(user) => {
                self.session
                    .login(user.clone(), response.access_token.map(SecretString::from));
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Clear the session. The cart is kept.
    pub fn logout(&mut self) {
        self.session.logout();
    }

    /// Saved addresses of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotSignedIn`] without a session, or an error if
    /// the API request fails.
    pub async fn addresses(&self) -> Result<Vec<Address>> {
        let user = self.signed_in()?;
        Ok(self.authed_api().addresses(user.id).await?)
    }

    /// Account record and personal details of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotSignedIn`] without a session, or an error if
    /// the API request fails.
    pub async fn account(&self) -> Result<AccountProfile> {
        let user = self.signed_in()?;
        Ok(self.authed_api().account(user.id).await?)
    }

    /// Wishlist of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotSignedIn`] without a session, or an error if
    /// the API request fails.
    pub async fn wishlist(&self) -> Result<Vec<WishlistItem>> {
        let user = self.signed_in()?;
        Ok(self.authed_api().wishlist(user.id).await?)
    }

    /// Inbox of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotSignedIn`] without a session, or an error if
    /// the API request fails.
    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        let user = self.signed_in()?;
        Ok(self.authed_api().notifications(user.id).await?)
    }

    /// Stored payment methods of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotSignedIn`] without a session, or an error if
    /// the API request fails.
    pub async fn payment_methods(&self) -> Result<Vec<SavedPaymentMethod>> {
        let user = self.signed_in()?;
        Ok(self.authed_api().payment_methods(user.id).await?)
    }

    fn signed_in(&self) -> Result<&SessionUser> {
        self.session.current_user().ok_or(AppError::NotSignedIn)
    }

    /// Place an order for the current cart.
    ///
    /// # Errors
    ///
    /// See [`place_order`].
    pub async fn checkout(
        &mut self,
        shipping_address: &Address,
        payment_method: PaymentMethod,
    ) -> Result<OrderConfirmation> {
        Ok(place_order(
            &self.api,
            &mut self.cart,
            &self.session,
            shipping_address,
            payment_method,
        )
        .await?)
    }

    /// Write cart, session and search history to the store.
    ///
    /// # Errors
    ///
    /// Returns the first store error.
    pub fn flush(&self) -> Result<()> {
        self.cart.flush()?;
        self.session.flush()?;
        self.searches.flush()?;
        Ok(())
    }

    /// Flush and drop the managers.
    ///
    /// # Errors
    ///
    /// Returns the first store error.
    pub fn close(self) -> Result<()> {
        self.flush()?;
        info!("Closed profile");
        Ok(())
    }

    /// Purge every persisted key and reset the managers.
    ///
    /// # Errors
    ///
    /// Returns the first store error.
    pub fn reset(&mut self) -> Result<()> {
        self.session.logout();
        self.cart.clear();
        self.searches.clear();
        self.store.clear_all()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use lifestyle_store_core::UserId;

    use crate::models::cart::tests::product;

    fn storefront(store: Store) -> Storefront {
        let api = ApiConfig::with_base_url("http://127.0.0.1:9/api").unwrap();
        Storefront::with_store(&api, store).unwrap()
    }

    #[test]
    fn test_managers_share_the_store() {
        let store = Store::in_memory();
        {
            let mut shop = storefront(store.clone());
            shop.cart_mut().add_item(&product(1, 1000), 2);
            shop.session_mut().login(
                SessionUser {
                    id: UserId::new(7),
                    username: "lin".to_string(),
                    email: "lin@example.com".to_string(),
                },
                Some(SecretString::from("tok")),
            );
            shop.close().unwrap();
        }

        let shop = storefront(store);
        assert_eq!(shop.cart().total_items(), 2);
        assert_eq!(shop.session().current_user().unwrap().id, UserId::new(7));
        assert!(shop.authed_api().is_authorized());
        assert!(!shop.api().is_authorized());
    }

    #[test]
    fn test_reset_purges_everything() {
        let store = Store::in_memory();
        let mut shop = storefront(store.clone());
        shop.cart_mut().add_one(&product(1, 1000));
        shop.searches_mut().record("mug");
        shop.reset().unwrap();

        let reopened = storefront(store);
        assert!(reopened.cart().is_empty());
        assert!(reopened.searches().terms().is_empty());
        assert!(!reopened.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_account_calls_require_session() {
        let shop = storefront(Store::in_memory());
        assert!(matches!(shop.addresses().await, Err(AppError::NotSignedIn)));
        assert!(matches!(shop.wishlist().await, Err(AppError::NotSignedIn)));
        assert!(matches!(shop.notifications().await, Err(AppError::NotSignedIn)));
        assert!(matches!(shop.payment_methods().await, Err(AppError::NotSignedIn)));
        assert!(matches!(shop.account().await, Err(AppError::NotSignedIn)));
    }
}
