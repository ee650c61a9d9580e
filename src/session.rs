//! Session store and request-scoped context.
//!
//! Middlewares and handlers do not reach into process globals for ambient
//! state. Each dispatch receives a [`Context`] carrying the [`Session`]
//! accessor; anything a guard needs to decide (is a user logged in?) comes
//! from there.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ── Session ───────────────────────────────────────────────────────────────────

/// A thread-safe string key-value session accessor.
///
/// Cloning is cheap — clones share the same underlying store, so a value
/// `set` by one clone is visible through every other.
#[derive(Clone, Debug, Default)]
pub struct Session {
    store: Arc<Mutex<HashMap<String, String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Returns the value stored under `key`, or `default` when absent.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_owned())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_owned(), value.to_owned());
    }

    pub fn exists(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Removes `key`, returning the previous value if there was one.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.lock().remove(key)
    }

    /// Drops every stored key.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned session lock means a panic mid-insert; the map itself
        // is still structurally sound.
        self.store.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// ── Context ───────────────────────────────────────────────────────────────────

/// Request-scoped ambient state passed through the middleware chain and into
/// the handler, alongside the extracted path parameters.
#[derive(Clone, Debug, Default)]
pub struct Context {
    session: Session,
}

impl Context {
    /// A context with a fresh, empty session. Mostly useful in tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context backed by an existing (shared) session store.
    pub fn with_session(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
