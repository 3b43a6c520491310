//! The cart collection and its merge semantics.
//!
//! All operations here are pure; persisting and refreshing the page is the
//! job of [`Storefront`](crate::storefront::Storefront).

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::DecodeError;
use crate::item::{CartItem, Product};

/// Result of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The product had no name.
    Ignored,
    Appended,
    /// An item with the same name existed; carries its new quantity.
    Incremented(u32),
}

/// Result of [`Cart::change_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// No item has that name.
    Missing,
    Updated(u32),
    /// The quantity reached zero and the item was dropped.
    Removed,
}

/// Ordered list of cart items, serialized as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a persisted payload. Unusable entries are skipped one by one;
    /// only a payload that is not a JSON array fails as a whole.
    pub fn from_json(payload: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(payload)?;
        let Value::Array(entries) = value else {
            return Err(DecodeError::NotAnArray);
        };
        let mut items = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match CartItem::from_value(entry) {
                Ok(item) => items.push(item),
                Err(err) => debug!(index, error = %err, "skipping stored cart entry"),
            }
        }
        Ok(Self { items })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.items).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price × quantity` over all items.
    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Add one unit of `product`.
    ///
    /// An existing item with the same name only has its quantity bumped; its
    /// stored price and image are left as they were.
    pub fn add(&mut self, product: Product) -> AddOutcome {
        if product.name.is_empty() {
            return AddOutcome::Ignored;
        }
        match self.items.iter_mut().find(|item| item.name == product.name) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                AddOutcome::Incremented(item.quantity)
            }
            None => {
                self.items.push(CartItem::from_product(product));
                AddOutcome::Appended
            }
        }
    }

    /// Drop every item called `name`. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.name != name);
        before - self.items.len()
    }

    /// Shift the quantity of `name` by `delta`, removing the item once the
    /// result is zero or below.
    pub fn change_quantity(&mut self, name: &str, delta: i64) -> QuantityChange {
        let Some(idx) = self.items.iter().position(|item| item.name == name) else {
            return QuantityChange::Missing;
        };
        let next = i64::from(self.items[idx].quantity).saturating_add(delta);
        if next <= 0 {
            self.items.remove(idx);
            return QuantityChange::Removed;
        }
        let quantity = u32::try_from(next).unwrap_or(u32::MAX);
        self.items[idx].quantity = quantity;
        QuantityChange::Updated(quantity)
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<T: IntoIterator<Item = CartItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Round a delta coming from script to a whole number of units.
/// Non-finite deltas are rejected.
pub fn normalize_delta(delta: f64) -> Option<i64> {
    if !delta.is_finite() {
        return None;
    }
    let rounded = delta.round();
    if rounded >= i64::MAX as f64 {
        Some(i64::MAX)
    } else if rounded <= i64::MIN as f64 {
        Some(i64::MIN)
    } else {
        Some(rounded as i64)
    }
}
