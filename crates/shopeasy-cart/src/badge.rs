//! Header badge: a derived read of the total quantity.

use crate::cart::Cart;

/// Total number of units in the cart.
pub fn badge_count(cart: &Cart) -> u64 {
    cart.total_quantity()
}

/// Badge text; empty clears the badge.
pub fn badge_text(count: u64) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}

/// Fallback test for spotting the cart link by its label when the page does
/// not link to the cart page directly.
pub fn is_cart_link_text(text: &str) -> bool {
    text.to_lowercase().contains("cart")
}
