//! Storefront settings.
//!
//! Every field has a default matching the stock ShopEasy pages, so an empty
//! TOML document (or no document at all) yields a working configuration.
//!
//! ```toml
//! storage_key = "shopeasy_cart"
//! cart_page = "cart.html"
//! toast_display_ms = 2000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::toast::ToastTimeline;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CartConfig {
    /// Persisted store slot holding the serialized cart.
    pub storage_key: String,
    /// Redirect target after adding an item from a product page.
    pub cart_page: String,
    /// Page that accepts `?<search_param>=<term>` when the current page has
    /// nothing to filter.
    pub results_page: String,
    pub search_param: String,
    pub placeholder_image: String,
    pub currency_symbol: String,
    pub checkout_notice: String,
    pub toast_display_ms: u64,
    pub toast_transition_ms: u64,
    pub redirect_delay_ms: u64,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: "shopeasy_cart".to_string(),
            cart_page: "cart.html".to_string(),
            results_page: "frontpage.html".to_string(),
            search_param: "q".to_string(),
            placeholder_image: "Photo/placeholder.png".to_string(),
            currency_symbol: "$".to_string(),
            checkout_notice: "Checkout is not implemented in this demo.".to_string(),
            toast_display_ms: 2000,
            toast_transition_ms: 260,
            redirect_delay_ms: 700,
        }
    }
}

impl CartConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn toast_timeline(&self) -> ToastTimeline {
        ToastTimeline::new(
            Duration::from_millis(self.toast_display_ms),
            Duration::from_millis(self.toast_transition_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(CartConfig::from_toml_str("").unwrap(), CartConfig::default());
    }

    #[test]
    fn partial_override() {
        let cfg = CartConfig::from_toml_str(
            r#"
            storage_key = "demo_cart"
            redirect_delay_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.storage_key, "demo_cart");
        assert_eq!(cfg.redirect_delay(), Duration::ZERO);
        assert_eq!(cfg.cart_page, "cart.html");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            CartConfig::from_toml_str("storage = 1"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = CartConfig::load("/nonexistent/shopeasy.toml").unwrap_err();
        assert!(err.to_string().contains("shopeasy.toml"));
    }
}
