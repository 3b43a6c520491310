//! View-binding contract between the cart logic and a concrete page.
//!
//! A page declares which anchors it has; optional anchors return `None`
//! and the operations that need them quietly do nothing.

use std::time::Duration;

use crate::item::ProductDetail;
use crate::render::CartRow;
use crate::toast::ToastTimeline;

/// The header shared by every page.
pub trait Header {
    /// Set the badge on the cart link. An empty `text` clears it. Returns
    /// `false` when there is no cart link to attach to.
    fn set_badge(&mut self, text: &str) -> bool;

    fn has_search_control(&self) -> bool;

    fn install_search_control(&mut self, prefill: Option<&str>);
}

/// Item container, empty-state element and summary region of the cart page.
pub trait CartPanel {
    /// Show the empty-state message and hide the summary.
    fn show_empty(&mut self);

    /// Replace the rows, show the summary with `total_label` and a checkout
    /// button.
    fn show_items(&mut self, rows: &[CartRow], total_label: &str);
}

/// Filterable product cards on a listing page.
pub trait ProductListing {
    /// Card titles in document order.
    fn titles(&self) -> Vec<String>;

    /// Show or hide each card; `visible` lines up with [`titles`](Self::titles).
    fn set_visibility(&mut self, visible: &[bool]);
}

pub trait Location {
    fn href(&self) -> String;

    /// Rewrite the current URL without reloading or adding history.
    fn replace_url(&mut self, url: &str);

    /// Leave the page after `delay`.
    fn navigate(&mut self, url: &str, delay: Duration);
}

pub trait Notifier {
    fn toast(&mut self, message: &str, timeline: ToastTimeline);

    /// Blocking notice, used for the checkout stub.
    fn alert(&mut self, message: &str);
}

/// Everything one page context exposes.
pub trait Page {
    fn header(&mut self) -> Option<&mut dyn Header>;

    fn cart_panel(&mut self) -> Option<&mut dyn CartPanel>;

    fn listing(&mut self) -> Option<&mut dyn ProductListing>;

    /// Scraped anchors of a product detail page.
    fn product_detail(&self) -> Option<ProductDetail>;

    fn location(&mut self) -> &mut dyn Location;

    fn notifier(&mut self) -> &mut dyn Notifier;
}
