//! Recent catalog searches.
//!
//! Keeps the last [`MAX_RECENT_SEARCHES`] distinct search terms, newest
//! first, persisted under [`StoreKey::RecentSearches`]. Like the cart, every
//! effective change is written and then announced to subscribers.

use tracing::{debug, error, instrument, warn};

use crate::observer::{Observers, SubscriptionId};
use crate::store::{Store, StoreError, StoreKey};

/// How many terms are remembered.
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Owns the recent-search list.
#[derive(Debug)]
pub struct SearchHistory {
    store: Store,
    terms: Vec<String>,
    observers: Observers<[String]>,
}

impl SearchHistory {
    /// Rehydrate the list from `store`.
    ///
    /// Blank entries and duplicates are dropped and the list is cut to
    /// [`MAX_RECENT_SEARCHES`]; a repaired list is written back.
    #[must_use]
    pub fn open(store: Store) -> Self {
        let stored: Vec<String> = store.load(StoreKey::RecentSearches).unwrap_or_default();
        let stored_len = stored.len();

        let mut terms: Vec<String> = Vec::with_capacity(MAX_RECENT_SEARCHES);
        for term in stored {
            let term = term.trim();
            if !term.is_empty() && !terms.iter().any(|t| t == term) {
                terms.push(term.to_string());
            }
        }
        terms.truncate(MAX_RECENT_SEARCHES);

        let history = Self {
            store,
            terms,
            observers: Observers::default(),
        };
        if history.terms.len() != stored_len {
            warn!(
                kept = history.terms.len(),
                stored = stored_len,
                "Repaired stored search history"
            );
            history.persist();
        }
        history
    }

    /// Terms, newest first.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Remember `term` as the newest search.
    ///
    /// The term is trimmed; a blank term is ignored. An earlier occurrence
    /// moves to the front instead of being duplicated. Returns whether the
    /// list changed.
    #[instrument(skip(self))]
    pub fn record(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            debug!("Ignoring blank search term");
            return false;
        }
        if self.terms.first().is_some_and(|newest| newest == term) {
            return false;
        }

        self.terms.retain(|t| t != term);
        self.terms.insert(0, term.to_string());
        self.terms.truncate(MAX_RECENT_SEARCHES);
        self.commit();
        true
    }

    /// Forget every term. Returns whether anything was removed.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> bool {
        if self.terms.is_empty() {
            return false;
        }
        self.terms.clear();
        self.commit();
        true
    }

    /// Register a callback invoked with the list after every change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&[String]) + Send + 'static,
    {
        self.observers.subscribe(callback)
    }

    /// Remove a callback registered with [`Self::subscribe`].
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Write the list to the store; an empty list removes the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn flush(&self) -> Result<(), StoreError> {
        if self.terms.is_empty() {
            self.store.remove(StoreKey::RecentSearches)
        } else {
            self.store.save(StoreKey::RecentSearches, &self.terms)
        }
    }

    fn commit(&mut self) {
        self.persist();
        self.observers.notify(&self.terms);
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            error!(error = %e, "Failed to persist search history");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use crate::store::{MemoryStore, StoreBackend};

    #[test]
    fn test_newest_first_without_duplicates() {
        let mut history = SearchHistory::open(Store::in_memory());

        for term in ["mug", "tray", " mug "] {
            assert!(history.record(term));
        }

        assert_eq!(history.terms(), ["mug", "tray"]);
        assert!(!history.record("mug"));
        assert!(!history.record("   "));
    }

    #[test]
    fn test_keeps_five_most_recent() {
        let mut history = SearchHistory::open(Store::in_memory());
        for term in ["a", "b", "c", "d", "e", "f"] {
            history.record(term);
        }

        assert_eq!(history.terms(), ["f", "e", "d", "c", "b"]);
    }

    #[test]
    fn test_survives_reopen_and_clear_removes_key() {
        let backend = MemoryStore::default();
        let store = Store::new(backend.clone());
        {
            let mut history = SearchHistory::open(store.clone());
            history.record("linen");
            history.record("bamboo");
        }

        let mut reopened = SearchHistory::open(store.clone());
        assert_eq!(reopened.terms(), ["bamboo", "linen"]);

        assert!(reopened.clear());
        assert!(!reopened.clear());
        assert_eq!(backend.read("recent_searches").unwrap(), None);
        assert!(SearchHistory::open(store).terms().is_empty());
    }

    #[test]
    fn test_legacy_list_is_repaired_on_open() {
        let backend = MemoryStore::default();
        backend
            .write("recent_searches", r#"["mug","","mug","tray","a","b","c","d"]"#)
            .unwrap();

        let history = SearchHistory::open(Store::new(backend.clone()));
        assert_eq!(history.terms(), ["mug", "tray", "a", "b", "c"]);

        let raw = backend.read("recent_searches").unwrap().unwrap();
        assert!(raw.starts_with(r#"{"version":1,"#));
        assert!(!raw.contains("\"d\""));
    }

    #[test]
    fn test_subscribers_see_each_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut history = SearchHistory::open(Store::in_memory());

        let sink = Arc::clone(&seen);
        history.subscribe(move |terms: &[String]| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(terms.len());
            }
        });

        history.record("mug");
        history.record("mug");
        history.record("tray");
        history.clear();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 0]);
    }
}
