use shopeasy_cart::{KeyValueStore, StoreError};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// `window.localStorage`, looked up on every access so a page that loses
/// storage access mid-session degrades to an empty cart.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

fn js_error(err: JsValue) -> StoreError {
    StoreError::Unavailable(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn local_storage() -> Result<Storage, StoreError> {
    let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
    window
        .local_storage()
        .map_err(js_error)?
        .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".into()))
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        local_storage()?.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        local_storage()?.set_item(key, value).map_err(js_error)
    }
}
