//! Bearer token persistence.
//!
//! The token lives in a [`KeyValueStore`] under [`TOKEN_KEY`]. The request
//! path only reads it; `login` and `logout` are the only writers.

use crate::storage::KeyValueStore;

pub const TOKEN_KEY: &str = "authToken";

pub fn get_token(store: &dyn KeyValueStore) -> Option<String> {
    store.get(TOKEN_KEY).filter(|token| !token.is_empty())
}

pub fn is_logged_in(store: &dyn KeyValueStore) -> bool {
    get_token(store).is_some()
}

/// Store `token`. Write failures are logged; the in-memory session simply
/// stays logged out.
pub fn set_token(store: &dyn KeyValueStore, token: &str) -> bool {
    match store.set(TOKEN_KEY, token) {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(error = %err, "failed to persist auth token");
            false
        }
    }
}

pub fn clear_token(store: &dyn KeyValueStore) {
    if let Err(err) = store.remove(TOKEN_KEY) {
        tracing::error!(error = %err, "failed to clear auth token");
    }
}
