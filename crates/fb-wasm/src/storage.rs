//! Session storage backed by the browser tab's `sessionStorage`.

use fb_editor::SessionStore;
use web_sys::Storage;

/// Tab-scoped store. Outside a browser (or with storage disabled) it holds
/// nothing and drops writes.
pub struct BrowserSessionStore {
    storage: Option<Storage>,
}

impl BrowserSessionStore {
    pub fn new() -> Self {
        let storage = session_storage();
        if storage.is_none() {
            log::warn!("sessionStorage unavailable; session will not persist");
        }
        Self { storage }
    }
}

impl Default for BrowserSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
fn session_storage() -> Option<Storage> {
    web_sys::window()?.session_storage().ok().flatten()
}

#[cfg(not(target_arch = "wasm32"))]
fn session_storage() -> Option<Storage> {
    None
}

impl SessionStore for BrowserSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.storage
            && storage.set_item(key, value).is_err()
        {
            log::warn!("sessionStorage rejected {key}");
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.remove_item(key);
        }
    }
}
