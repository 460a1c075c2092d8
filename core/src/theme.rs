//! Light/dark theme state with explicit change notification.
//!
//! # Design
//! `ThemeStore` owns the flag, persists it under [`THEME_KEY`] and calls
//! every subscriber after each change. Nothing happens implicitly: a caller
//! that wants to mirror the theme somewhere (a CSS class, a terminal palette)
//! subscribes and reacts to the `Theme` it is handed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::storage::KeyValueStore;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// Value written to the store.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Class toggled on the document root; only dark mode sets one.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Theme::Light => None,
            Theme::Dark => Some("dark"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(Theme) + Send + Sync>;

struct State {
    theme: Theme,
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

pub struct ThemeStore {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<State>,
}

impl std::fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStore")
            .field("theme", &self.theme())
            .finish_non_exhaustive()
    }
}

impl ThemeStore {
    /// Restore the saved preference, or use the system one when nothing is
    /// saved. Initialization neither persists nor notifies.
    pub fn initialize(store: Arc<dyn KeyValueStore>, system_prefers_dark: bool) -> Self {
        let theme = match store.get(THEME_KEY).filter(|saved| !saved.is_empty()) {
            Some(saved) => Theme::from_dark(saved == Theme::Dark.as_str()),
            None => Theme::from_dark(system_prefers_dark),
        };
        tracing::debug!(theme = theme.as_str(), "theme initialized");
        Self {
            store,
            state: Mutex::new(State {
                theme,
                next_id: 0,
                listeners: Vec::new(),
            }),
        }
    }

    pub fn theme(&self) -> Theme {
        self.lock().theme
    }

    pub fn is_dark(&self) -> bool {
        self.theme().is_dark()
    }

    pub fn toggle_dark(&self) {
        let next = !self.is_dark();
        self.set_dark(next);
    }

    /// Set the mode; persists and notifies only when it actually changes.
    pub fn set_dark(&self, value: bool) {
        let theme = Theme::from_dark(value);
        let listeners: Vec<Listener> = {
            let mut state = self.lock();
            if state.theme == theme {
                return;
            }
            state.theme = theme;
            // Persisted under the lock so the stored value follows the state.
            if let Err(err) = self.store.set(THEME_KEY, theme.as_str()) {
                tracing::error!(error = %err, "failed to persist theme");
            }
            state.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        // Called without the lock so listeners may use the theme store.
        for listener in listeners {
            listener(theme);
        }
    }

    pub fn subscribe(&self, listener: impl Fn(Theme) + Send + Sync + 'static) -> SubscriptionId {
        let mut state = self.lock();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.lock();
        let before = state.listeners.len();
        state.listeners.retain(|(existing, _)| *existing != id);
        state.listeners.len() != before
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StoreError};
    use std::thread;
    use std::time::Duration;

    /// Memory store whose writes of `"dark"` take a while.
    struct SlowDarkStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for SlowDarkStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if value == "dark" {
                thread::sleep(Duration::from_millis(200));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn store_with(saved: Option<&str>) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        if let Some(value) = saved {
            store.set(THEME_KEY, value).unwrap();
        }
        store
    }

    #[test]
    fn saved_preference_wins_over_system() {
        let theme = ThemeStore::initialize(store_with(Some("dark")), false);
        assert!(theme.is_dark());
        let theme = ThemeStore::initialize(store_with(Some("light")), true);
        assert!(!theme.is_dark());
    }

    #[test]
    fn unknown_saved_value_is_light() {
        let theme = ThemeStore::initialize(store_with(Some("sepia")), true);
        assert_eq!(theme.theme(), Theme::Light);
    }

    #[test]
    fn empty_saved_value_uses_system_preference() {
        let theme = ThemeStore::initialize(store_with(Some("")), true);
        assert!(theme.is_dark());
    }

    #[test]
    fn concurrent_changes_persist_in_state_order() {
        let store = Arc::new(SlowDarkStore {
            inner: MemoryStore::new(),
        });
        let theme = Arc::new(ThemeStore::initialize(store.clone(), false));

        let writer = {
            let theme = Arc::clone(&theme);
            thread::spawn(move || theme.set_dark(true))
        };
        thread::sleep(Duration::from_millis(50));
        theme.set_dark(false);
        writer.join().unwrap();

        assert_eq!(theme.theme(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn system_preference_used_when_nothing_saved() {
        let store = store_with(None);
        let theme = ThemeStore::initialize(store.clone(), true);
        assert!(theme.is_dark());
        assert_eq!(store.get(THEME_KEY), None);
    }

    #[test]
    fn toggle_persists_and_notifies() {
        let store = store_with(None);
        let theme = ThemeStore::initialize(store.clone(), false);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        theme.subscribe(move |t| sink.lock().unwrap().push(t));

        theme.toggle_dark();
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
        theme.toggle_dark();
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));

        assert_eq!(*seen.lock().unwrap(), vec![Theme::Dark, Theme::Light]);
    }

    #[test]
    fn setting_same_value_is_silent() {
        let store = store_with(None);
        let theme = ThemeStore::initialize(store.clone(), false);
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        theme.subscribe(move |_| *counter.lock().unwrap() += 1);

        theme.set_dark(false);
        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(store.get(THEME_KEY), None);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let theme = ThemeStore::initialize(store_with(None), false);
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let id = theme.subscribe(move |_| *counter.lock().unwrap() += 1);

        assert!(theme.unsubscribe(id));
        assert!(!theme.unsubscribe(id));
        theme.set_dark(true);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn dark_sets_css_class() {
        assert_eq!(Theme::Dark.css_class(), Some("dark"));
        assert_eq!(Theme::Light.css_class(), None);
    }
}
