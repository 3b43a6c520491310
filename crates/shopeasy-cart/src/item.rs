//! Cart items and the products they are created from.
//!
//! Items are stored as plain JSON objects so that fields the widget does not
//! know about (SKU, colour, ...) survive a load/save cycle untouched:
//!
//! ```json
//! {"name": "Mug", "price": 9.99, "img": "Photo/mug.png", "qty": 2}
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a stored entry was rejected while decoding a cart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("cart entry is not an object")]
    NotAnObject,
    #[error("cart entry has no name")]
    MissingName,
    #[error("cart entry {0:?} has no positive quantity")]
    InvalidQuantity(String),
}

/// One line of the cart. Names are unique within a cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub name: String,
    pub price: f64,
    #[serde(rename = "img", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(rename = "qty")]
    pub quantity: u32,
}

impl CartItem {
    /// A fresh item with quantity 1.
    pub fn from_product(product: Product) -> Self {
        Self {
            name: product.name,
            price: product.price,
            image: product.image,
            extra: product.extra,
            quantity: 1,
        }
    }

    /// `price × quantity`.
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Decode one stored entry.
    ///
    /// Decoding is lenient the same way the storefront scripts are: the price
    /// is coerced, a fractional quantity is floored, and a missing quantity
    /// reads as zero (which then rejects the entry).
    pub fn from_value(value: &Value) -> Result<Self, ItemError> {
        let obj = value.as_object().ok_or(ItemError::NotAnObject)?;
        let name = match obj.get("name") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(ItemError::MissingName),
        };
        let quantity = obj.get("qty").map(coerce_quantity).unwrap_or(0);
        if quantity == 0 {
            return Err(ItemError::InvalidQuantity(name));
        }
        let price = obj.get("price").map(coerce_price).unwrap_or(0.0);
        let image = match obj.get("img") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
        let extra = obj
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "name" | "price" | "qty" | "img"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Self {
            name,
            price,
            image,
            extra,
            quantity,
        })
    }
}

/// Input to [`Cart::add`](crate::cart::Cart::add).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Product {
    pub name: String,
    pub price: f64,
    pub image: Option<String>,
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price: sanitize_price(price),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Build a product from an arbitrary JSON object (e.g. one handed over
    /// from page script). The name is kept verbatim; `None` when it is
    /// missing or empty.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let name = obj.get("name")?.as_str()?;
        if name.is_empty() {
            return None;
        }
        let price = obj.get("price").map(coerce_price).unwrap_or(0.0);
        let image = obj
            .get("img")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let extra = obj
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "name" | "price" | "qty" | "img"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Some(Self {
            name: name.to_string(),
            price,
            image,
            extra,
        })
    }
}

/// The raw anchors a product detail page exposes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductDetail {
    pub name: Option<String>,
    pub price_text: Option<String>,
    pub image: Option<String>,
}

impl ProductDetail {
    /// Turn the scraped page parts into a product. Both a name and some
    /// numeric price text are required; the image falls back to `placeholder`.
    pub fn into_product(self, placeholder: &str) -> Option<Product> {
        let name = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        let price = parse_price_text(self.price_text.as_deref()?)?;
        let image = self
            .image
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| placeholder.to_string());
        Some(Product {
            name: name.to_string(),
            price,
            image: Some(image),
            extra: Map::new(),
        })
    }
}

fn sanitize_price(price: f64) -> f64 {
    if price.is_finite() && price >= 0.0 {
        price
    } else {
        0.0
    }
}

/// Coerce any JSON value to a price, defaulting to `0`.
pub fn coerce_price(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    sanitize_price(raw)
}

fn coerce_quantity(value: &Value) -> u32 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if !raw.is_finite() || raw < 1.0 {
        return 0;
    }
    if raw >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        raw.floor() as u32
    }
}

fn non_price_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\d.]").unwrap())
}

/// Extract a price from display text such as `"$ 1,299.00"`.
///
/// Every character other than digits and `.` is dropped. Returns `None` when
/// nothing numeric remains, and `Some(0.0)` when the remainder does not parse.
pub fn parse_price_text(text: &str) -> Option<f64> {
    let digits = non_price_chars().replace_all(text, "");
    if digits.is_empty() {
        return None;
    }
    Some(sanitize_price(digits.parse::<f64>().unwrap_or(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_price_follows_number_semantics() {
        assert_eq!(coerce_price(&json!(9.99)), 9.99);
        assert_eq!(coerce_price(&json!(" 12.5 ")), 12.5);
        assert_eq!(coerce_price(&json!("abc")), 0.0);
        assert_eq!(coerce_price(&json!("")), 0.0);
        assert_eq!(coerce_price(&json!(null)), 0.0);
        assert_eq!(coerce_price(&json!(true)), 1.0);
        assert_eq!(coerce_price(&json!(-3)), 0.0);
        assert_eq!(coerce_price(&json!([1])), 0.0);
    }

    #[test]
    fn parse_price_text_strips_currency() {
        assert_eq!(parse_price_text("$9.99"), Some(9.99));
        assert_eq!(parse_price_text(" Price: $ 1,299.00 "), Some(1299.0));
        assert_eq!(parse_price_text("1.2.3"), Some(0.0));
        assert_eq!(parse_price_text("free"), None);
        assert_eq!(parse_price_text(""), None);
    }

    #[test]
    fn from_value_keeps_unknown_fields() {
        let item = CartItem::from_value(&json!({
            "name": "Mug", "price": "9.99", "sku": "M-1", "qty": 2, "img": "mug.png"
        }))
        .unwrap();
        assert_eq!(item.name, "Mug");
        assert_eq!(item.price, 9.99);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.image.as_deref(), Some("mug.png"));
        assert_eq!(item.extra.get("sku"), Some(&json!("M-1")));
        assert!(!item.extra.contains_key("qty"));
    }

    #[test]
    fn from_value_rejects_unusable_entries() {
        assert_eq!(CartItem::from_value(&json!(3)), Err(ItemError::NotAnObject));
        assert_eq!(
            CartItem::from_value(&json!({"price": 1, "qty": 1})),
            Err(ItemError::MissingName)
        );
        assert_eq!(
            CartItem::from_value(&json!({"name": "Mug"})),
            Err(ItemError::InvalidQuantity("Mug".into()))
        );
        assert_eq!(
            CartItem::from_value(&json!({"name": "Mug", "qty": 0.5})),
            Err(ItemError::InvalidQuantity("Mug".into()))
        );
    }

    #[test]
    fn fractional_quantity_is_floored() {
        let item = CartItem::from_value(&json!({"name": "Mug", "qty": 2.7})).unwrap();
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn serializes_with_storefront_field_names() {
        let mut item = CartItem::from_product(Product::new("Mug", 9.99).with_image("mug.png"));
        item.quantity = 3;
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v, json!({"name": "Mug", "price": 9.99, "img": "mug.png", "qty": 3}));
    }

    #[test]
    fn product_from_value_requires_name() {
        assert!(Product::from_value(&json!({"price": 3})).is_none());
        assert!(Product::from_value(&json!({"name": ""})).is_none());
        let p = Product::from_value(&json!({"name": "Plate", "price": "x"})).unwrap();
        assert_eq!(p.price, 0.0);
    }

    #[test]
    fn product_from_value_keeps_name_verbatim() {
        let p = Product::from_value(&json!({"name": " Mug ", "price": 2})).unwrap();
        assert_eq!(p.name, " Mug ");
    }

    #[test]
    fn product_detail_uses_placeholder_image() {
        let detail = ProductDetail {
            name: Some(" Mug ".into()),
            price_text: Some("$9.99".into()),
            image: None,
        };
        let p = detail.into_product("Photo/placeholder.png").unwrap();
        assert_eq!(p.name, "Mug");
        assert_eq!(p.image.as_deref(), Some("Photo/placeholder.png"));
    }

    #[test]
    fn product_detail_without_price_is_rejected() {
        let detail = ProductDetail {
            name: Some("Mug".into()),
            price_text: Some("Call us".into()),
            image: None,
        };
        assert!(detail.into_product("p.png").is_none());
    }
}
