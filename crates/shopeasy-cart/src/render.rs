//! Projection of a cart onto the cart page.

use crate::cart::Cart;
use crate::config::CartConfig;

/// Fixed two-decimal currency text, e.g. `$19.98`.
///
/// Rounds like `Number.prototype.toFixed(2)`: on the exact binary value,
/// with exact half-cent ties going away from zero.
pub fn format_money(amount: f64, symbol: &str) -> String {
    format!("{symbol}{}", to_fixed_2(amount))
}

/// A half-cent tie needs `amount × 8` to be an odd integer.
fn to_fixed_2(amount: f64) -> String {
    let magnitude = amount.abs();
    let eighths = magnitude * 8.0;
    let is_tie = eighths.fract() == 0.0 && eighths % 2.0 == 1.0 && eighths < 9.0e15;
    if !is_tie {
        return format!("{amount:.2}");
    }
    let cents = (magnitude * 100.0).ceil() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

/// One rendered line of the cart page.
#[derive(Debug, Clone, PartialEq)]
pub struct CartRow {
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub unit_amount: f64,
    pub subtotal_amount: f64,
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartView {
    Empty,
    Items {
        rows: Vec<CartRow>,
        total: f64,
        total_label: String,
    },
}

impl CartView {
    pub fn project(cart: &Cart, config: &CartConfig) -> Self {
        if cart.is_empty() {
            return Self::Empty;
        }
        let symbol = config.currency_symbol.as_str();
        let mut total = 0.0;
        let rows = cart
            .iter()
            .map(|item| {
                let subtotal = item.subtotal();
                total += subtotal;
                CartRow {
                    name: item.name.clone(),
                    image: item
                        .image
                        .clone()
                        .unwrap_or_else(|| config.placeholder_image.clone()),
                    quantity: item.quantity,
                    unit_amount: item.price,
                    subtotal_amount: subtotal,
                    unit_price: format_money(item.price, symbol),
                    subtotal: format_money(subtotal, symbol),
                }
            })
            .collect();
        Self::Items {
            rows,
            total,
            total_label: format_money(total, symbol),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn rows(&self) -> &[CartRow] {
        match self {
            Self::Empty => &[],
            Self::Items { rows, .. } => rows,
        }
    }
}
