//! shopeasy-cart: cart state and page logic for the ShopEasy storefront.
//!
//! The cart lives in a single persisted key-value slot shared by every open
//! page. Pages talk to it through [`Storefront`], which reads the slot,
//! applies a mutation, writes it back and refreshes whatever the page
//! exposes through the [`view::Page`] contract (header badge, cart panel,
//! product listing).
//!
//! # Example
//!
//! ```
//! use shopeasy_cart::{Cart, CartStore, MemoryStorage, Product};
//!
//! let store = CartStore::new(MemoryStorage::new(), "shopeasy_cart");
//! let mut cart = store.load();
//! cart.add(Product::new("Mug", 9.99));
//! cart.add(Product::new("Mug", 9.99));
//! store.save(&cart).unwrap();
//!
//! let cart = store.load();
//! assert_eq!(cart.get("Mug").unwrap().quantity, 2);
//! assert_eq!(cart.total_quantity(), 2);
//! ```

pub mod badge;
pub mod cart;
pub mod cli;
pub mod config;
pub mod error;
pub mod item;
pub mod render;
pub mod search;
pub mod store;
pub mod storefront;
pub mod toast;
pub mod view;

pub use badge::{badge_count, badge_text, is_cart_link_text};
pub use cart::{normalize_delta, AddOutcome, Cart, QuantityChange};
pub use config::CartConfig;
pub use error::{ConfigError, DecodeError, StoreError};
pub use item::{coerce_price, parse_price_text, CartItem, ItemError, Product, ProductDetail};
pub use render::{format_money, CartRow, CartView};
pub use search::{query_param, results_target, with_query_param, SearchQuery};
pub use store::{CartStore, FileStorage, KeyValueStore, MemoryStorage, StorageEvent};
pub use storefront::{SearchOutcome, Storefront, ADDED_MESSAGE};
pub use toast::{ToastPhase, ToastTimeline};
