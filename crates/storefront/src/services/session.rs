//! Auth/session state manager.
//!
//! Records the outcome of a login or registration: who is signed in and the
//! bearer credential to send with authenticated requests. Credential
//! verification is the backend's job; this manager only remembers the
//! result.
//!
//! Rehydration never fails. Anything unusable in the store means "signed
//! out", and the offending keys are purged.

use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info, instrument, warn};

use crate::models::SessionUser;
use crate::observer::{Observers, SubscriptionId};
use crate::store::{Store, StoreError, StoreKey};

/// Change announced to session subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user signed in (or the signed-in identity was replaced).
    SignedIn(SessionUser),
    /// The session was cleared.
    SignedOut,
}

/// Owns the signed-in identity and credential.
#[derive(Debug)]
pub struct SessionManager {
    store: Store,
    user: Option<SessionUser>,
    credential: Option<SecretString>,
    observers: Observers<SessionEvent>,
}

impl SessionManager {
    /// Rehydrate the session from `store`.
    #[must_use]
    pub fn open(store: Store) -> Self {
        let user: Option<SessionUser> = store.load(StoreKey::User);
        let mut credential: Option<String> = store.load(StoreKey::AccessToken);

        if user.is_none() && credential.is_some() {
            warn!("Discarding stored credential without an identity");
            if let Err(e) = store.remove(StoreKey::AccessToken) {
                warn!(error = %e, "Failed to purge orphaned credential");
            }
            credential = None;
        }

        match &user {
            Some(user) => info!(user_id = %user.id, "Session restored"),
            None => info!("No stored session"),
        }

        Self {
            store,
            user,
            credential: credential.map(SecretString::from),
            observers: Observers::default(),
        }
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub const fn current_user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// The bearer credential, if one was issued.
    #[must_use]
    pub const fn credential(&self) -> Option<&SecretString> {
        self.credential.as_ref()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Record a successful login or registration.
    ///
    /// Replaces any previous session. Persistence failures are logged; the
    /// in-memory session is established regardless.
    #[instrument(skip(self, user, credential), fields(user_id = %user.id))]
    pub fn login(&mut self, user: SessionUser, credential: Option<SecretString>) {
        self.user = Some(user.clone());
        self.credential = credential;
        self.persist();
        info!("Signed in");
        self.observers.notify(&SessionEvent::SignedIn(user));
    }

    /// Clear the session. Safe to call when already signed out.
    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        let was_active = self.user.is_some() || self.credential.is_some();
        self.user = None;
        self.credential = None;

        for key in [StoreKey::User, StoreKey::AccessToken] {
            if let Err(e) = self.store.remove(key) {
                error!(key = %key, error = %e, "Failed to clear stored session");
            }
        }

        if was_active {
            info!("Signed out");
            self.observers.notify(&SessionEvent::SignedOut);
        }
    }

    /// Register a callback invoked on sign-in and sign-out.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        self.observers.subscribe(callback)
    }

    /// Remove a callback registered with [`Self::subscribe`].
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Write the current session to the store.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub fn flush(&self) -> Result<(), StoreError> {
        let Some(user) = &self.user else {
            self.store.remove(StoreKey::User)?;
            return self.store.remove(StoreKey::AccessToken);
        };

        // Credential first: an identity on disk without its credential is
        // still a valid session, the reverse is purged on open. If the
        // identity write then fails, the previous credential is put back so
        // the stored pair never mixes two sessions.
        let previous: Option<String> = self.store.load(StoreKey::AccessToken);
        self.write_credential(self.credential.as_ref().map(|c| c.expose_secret()))?;

        if let Err(e) = self.store.save(StoreKey::User, user) {
            if let Err(restore) = self.write_credential(previous.as_deref()) {
                error!(error = %restore, "Failed to restore previous credential");
            }
            return Err(e);
        }
        Ok(())
    }

    fn write_credential(&self, credential: Option<&str>) -> Result<(), StoreError> {
        match credential {
            Some(credential) => self.store.save(StoreKey::AccessToken, credential),
            None => self.store.remove(StoreKey::AccessToken),
        }
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            error!(error = %e, "Failed to persist session");
        }
    }
}
