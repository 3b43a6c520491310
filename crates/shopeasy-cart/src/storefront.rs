//! Page controller tying the cart store to a [`Page`].
//!
//! Every mutation runs read → transform → write → refresh synchronously, so
//! within one context the page always reflects the last write. Other
//! contexts catch up through [`Storefront::on_storage_event`].

use tracing::{debug, warn};

use crate::badge::{badge_count, badge_text};
use crate::cart::{AddOutcome, Cart, QuantityChange};
use crate::config::CartConfig;
use crate::error::StoreError;
use crate::item::Product;
use crate::render::CartView;
use crate::search::{query_param, results_target, with_query_param, SearchQuery};
use crate::store::{CartStore, KeyValueStore, StorageEvent};
use crate::view::Page;

pub const ADDED_MESSAGE: &str = "Add to cart successfully";

/// What a search submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query.
    Ignored,
    /// Cards on the current page were filtered in place.
    Filtered { shown: usize, hidden: usize },
    /// No cards here; the browser was sent to the results page.
    Redirected(String),
}

pub struct Storefront<S> {
    store: CartStore<S>,
    config: CartConfig,
}

impl<S: KeyValueStore> Storefront<S> {
    pub fn new(backend: S, config: CartConfig) -> Self {
        let store = CartStore::new(backend, config.storage_key.clone());
        Self { store, config }
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    pub fn store(&self) -> &CartStore<S> {
        &self.store
    }

    /// Current persisted cart.
    pub fn cart(&self) -> Cart {
        self.store.load()
    }

    // ── Page load ────────────────────────────────────────────────────────

    /// Run once per page context.
    pub fn init<P: Page + ?Sized>(&self, page: &mut P) {
        self.sync_badge(page);
        self.render_cart(page);
        self.install_search(page);
        self.apply_initial_query(page);
    }

    /// Refresh the header badge from the store. Returns `false` when the
    /// page has no cart link.
    pub fn sync_badge<P: Page + ?Sized>(&self, page: &mut P) -> bool {
        let cart = self.store.load();
        self.apply_badge(page, &cart)
    }

    fn apply_badge<P: Page + ?Sized>(&self, page: &mut P, cart: &Cart) -> bool {
        let text = badge_text(badge_count(cart));
        match page.header() {
            Some(header) => header.set_badge(&text),
            None => false,
        }
    }

    /// Re-render the cart page from the store, then the badge. Pages without
    /// a cart panel are left alone.
    pub fn render_cart<P: Page + ?Sized>(&self, page: &mut P) -> bool {
        let cart = self.store.load();
        let view = CartView::project(&cart, &self.config);
        let Some(panel) = page.cart_panel() else {
            return false;
        };
        match &view {
            CartView::Empty => panel.show_empty(),
            CartView::Items {
                rows, total_label, ..
            } => panel.show_items(rows, total_label),
        }
        self.apply_badge(page, &cart);
        true
    }

    /// Add the search box to the header unless it is already there.
    pub fn install_search<P: Page + ?Sized>(&self, page: &mut P) -> bool {
        let prefill = query_param(&page.location().href(), &self.config.search_param)
            .filter(|q| !q.is_empty());
        let Some(header) = page.header() else {
            return false;
        };
        if header.has_search_control() {
            return false;
        }
        header.install_search_control(prefill.as_deref());
        true
    }

    /// Filter the listing by the URL's query parameter, if any.
    pub fn apply_initial_query<P: Page + ?Sized>(&self, page: &mut P) -> bool {
        let Some(raw) = query_param(&page.location().href(), &self.config.search_param) else {
            return false;
        };
        let Some(query) = SearchQuery::from_param(&raw) else {
            return false;
        };
        if self.perform_local_search(page, &query).is_none() {
            return false;
        }
        let timeline = self.config.toast_timeline();
        page.notifier()
            .toast(&format!("Results for \"{raw}\""), timeline);
        true
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// Add one unit of `product`, persist, refresh the badge.
    pub fn add_item<P: Page + ?Sized>(
        &self,
        page: &mut P,
        product: Product,
    ) -> Result<AddOutcome, StoreError> {
        let mut cart = self.store.load();
        let name = product.name.clone();
        let outcome = cart.add(product);
        if outcome == AddOutcome::Ignored {
            return Ok(outcome);
        }
        self.persist(&cart)?;
        debug!(%name, ?outcome, "added to cart");
        self.apply_badge(page, &cart);
        Ok(outcome)
    }

    /// Product-page "add to cart": scrape the page, add, confirm, and head to
    /// the cart page after the redirect delay. `Ok(None)` when the page does
    /// not describe a product.
    pub fn add_from_product_page<P: Page + ?Sized>(
        &self,
        page: &mut P,
    ) -> Result<Option<AddOutcome>, StoreError> {
        let Some(product) = page
            .product_detail()
            .and_then(|detail| detail.into_product(&self.config.placeholder_image))
        else {
            return Ok(None);
        };
        let outcome = self.add_item(page, product)?;
        page.notifier()
            .toast(ADDED_MESSAGE, self.config.toast_timeline());
        page.location()
            .navigate(&self.config.cart_page, self.config.redirect_delay());
        Ok(Some(outcome))
    }

    /// Remove every item called `name`, persist, re-render (or refresh the
    /// badge when the page has no cart panel).
    pub fn remove_item<P: Page + ?Sized>(
        &self,
        page: &mut P,
        name: &str,
    ) -> Result<usize, StoreError> {
        let mut cart = self.store.load();
        let removed = cart.remove(name);
        self.persist(&cart)?;
        debug!(%name, removed, "removed from cart");
        self.refresh_after_write(page, &cart);
        Ok(removed)
    }

    /// Shift the quantity of `name`, persist, re-render. Unknown names are a
    /// no-op.
    pub fn change_quantity<P: Page + ?Sized>(
        &self,
        page: &mut P,
        name: &str,
        delta: i64,
    ) -> Result<QuantityChange, StoreError> {
        let mut cart = self.store.load();
        let change = cart.change_quantity(name, delta);
        if change == QuantityChange::Missing {
            return Ok(change);
        }
        self.persist(&cart)?;
        debug!(%name, delta, ?change, "quantity changed");
        self.refresh_after_write(page, &cart);
        Ok(change)
    }

    /// Checkout is a stub.
    pub fn checkout<P: Page + ?Sized>(&self, page: &mut P) {
        page.notifier().alert(&self.config.checkout_notice);
    }

    /// Re-render the cart page, or just the badge on any other page.
    fn refresh_after_write<P: Page + ?Sized>(&self, page: &mut P, cart: &Cart) {
        if !self.render_cart(page) {
            self.apply_badge(page, cart);
        }
    }

    fn persist(&self, cart: &Cart) -> Result<(), StoreError> {
        self.store.save(cart).inspect_err(|err| {
            warn!(key = %self.store.key(), error = %err, "failed to persist cart");
        })
    }

    // ── Search ───────────────────────────────────────────────────────────

    /// Handle a search form submission.
    pub fn submit_search<P: Page + ?Sized>(&self, page: &mut P, raw: &str) -> SearchOutcome {
        let Some(query) = SearchQuery::from_input(raw) else {
            return SearchOutcome::Ignored;
        };
        if let Some((shown, hidden)) = self.perform_local_search(page, &query) {
            page.notifier().toast(
                &format!("Showing results for \"{}\"", query.as_str()),
                self.config.toast_timeline(),
            );
            let location = page.location();
            if let Some(url) =
                with_query_param(&location.href(), &self.config.search_param, query.as_str())
            {
                location.replace_url(&url);
            }
            return SearchOutcome::Filtered { shown, hidden };
        }
        let target = results_target(&self.config.results_page, &self.config.search_param, &query);
        page.location().navigate(&target, std::time::Duration::ZERO);
        SearchOutcome::Redirected(target)
    }

    /// Filter the page's product cards. `None` when there is nothing to
    /// filter; otherwise the shown and hidden counts.
    pub fn perform_local_search<P: Page + ?Sized>(
        &self,
        page: &mut P,
        query: &SearchQuery,
    ) -> Option<(usize, usize)> {
        let listing = page.listing()?;
        let titles = listing.titles();
        if titles.is_empty() {
            return None;
        }
        let visible = query.filter_titles(&titles);
        listing.set_visibility(&visible);
        let shown = visible.iter().filter(|v| **v).count();
        Some((shown, visible.len() - shown))
    }

    // ── Cross-context sync ───────────────────────────────────────────────

    /// React to a write made by another context.
    pub fn on_storage_event<P: Page + ?Sized>(&self, page: &mut P, event: &StorageEvent) {
        if self.store.is_affected_by(event) {
            self.render_cart(page);
        }
        self.sync_badge(page);
    }
}
