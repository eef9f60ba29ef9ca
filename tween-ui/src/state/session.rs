//! Browser Token Storage
//!
//! The auth token lives in local storage under a single key.

use tween::{ClientError, ClientResult, TokenStore};
use web_sys::Storage;

/// Local storage key for the bearer token
pub const TOKEN_KEY: &str = "auth_token";

/// Token store backed by `window.localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTokenStore;

fn storage() -> ClientResult<Storage> {
    web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .ok_or_else(|| ClientError::Storage("Local storage is unavailable".to_string()))
}

fn storage_error(action: &str, e: wasm_bindgen::JsValue) -> ClientError {
    ClientError::Storage(format!("Failed to {} token: {:?}", action, e))
}

impl TokenStore for LocalTokenStore {
    fn load(&self) -> ClientResult<Option<String>> {
        let token = storage()?
            .get_item(TOKEN_KEY)
            .map_err(|e| storage_error("read", e))?;
        Ok(token.filter(|t| !t.trim().is_empty()))
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        storage()?
            .set_item(TOKEN_KEY, token)
            .map_err(|e| storage_error("save", e))
    }

    fn clear(&self) -> ClientResult<()> {
        storage()?
            .remove_item(TOKEN_KEY)
            .map_err(|e| storage_error("clear", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn test_token_survives_reload() {
        let store = LocalTokenStore;
        store.save("jwt-abc").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("jwt-abc"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
