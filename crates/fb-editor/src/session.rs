//! Authenticated session: the bearer token plus the signed-in user.
//!
//! A [`Session`] is handed explicitly to every authenticated operation. It
//! writes through to a [`SessionStore`] so a reload can pick it back up with
//! [`Session::restore`]. Token and user are always set and cleared together.

use fb_core::User;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "user";

/// String key/value storage scoped to one browser tab (or one process).
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-process store for native hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Shared handle, for hosts that also read the store themselves.
impl<S: SessionStore> SessionStore for Rc<RefCell<S>> {
    fn get(&self, key: &str) -> Option<String> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.borrow_mut().set(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.borrow_mut().remove(key);
    }
}

pub struct Session {
    store: Box<dyn SessionStore>,
    token: Option<String>,
    user: Option<User>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("user", &self.user.as_ref().map(|u| &u.email))
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl Session {
    /// A logged-out session over `store`. Anything already in the store is
    /// left alone; use [`Session::restore`] to pick it up.
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            token: None,
            user: None,
        }
    }

    /// Rehydrate from `store`. A missing token or a user record that does
    /// not parse restores as logged out (and wipes the store).
    pub fn restore(store: impl SessionStore + 'static) -> Self {
        let mut session = Self::new(store);
        let token = session.store.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let user = session
            .store
            .get(USER_KEY)
            .and_then(|raw| match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    log::warn!("session: stored user is unreadable: {e}");
                    None
                }
            });
        match (token, user) {
            (Some(token), Some(user)) => {
                log::debug!("session: restored for {}", user.email);
                session.token = Some(token);
                session.user = Some(user);
            }
            (None, None) => {}
            _ => session.clear(),
        }
        session
    }

    /// Start a session and persist it.
    pub fn begin(&mut self, token: impl Into<String>, user: User) {
        let token = token.into();
        self.store.set(TOKEN_KEY, &token);
        match serde_json::to_string(&user) {
            Ok(raw) => self.store.set(USER_KEY, &raw),
            Err(e) => log::warn!("session: user not persisted: {e}"),
        }
        log::info!("session: signed in as {}", user.email);
        self.token = Some(token);
        self.user = Some(user);
    }

    /// Drop token and user, in memory and in the store.
    pub fn clear(&mut self) {
        if self.token.is_some() {
            log::info!("session: cleared");
        }
        self.token = None;
        self.user = None;
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_KEY);
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
