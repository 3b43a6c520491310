#![allow(dead_code)]

use std::time::Duration;

use shopeasy_cart::view::{CartPanel, Header, Location, Notifier, Page, ProductListing};
use shopeasy_cart::{CartRow, ProductDetail, ToastTimeline};

pub const ORIGIN: &str = "https://shop.test";

#[derive(Debug, Default)]
pub struct FakeHeader {
    pub has_cart_link: bool,
    pub badge: Option<String>,
    pub search_installed: bool,
    pub search_installs: usize,
    pub prefill: Option<String>,
}

impl Header for FakeHeader {
    fn set_badge(&mut self, text: &str) -> bool {
        if !self.has_cart_link {
            return false;
        }
        self.badge = Some(text.to_string());
        true
    }

    fn has_search_control(&self) -> bool {
        self.search_installed
    }

    fn install_search_control(&mut self, prefill: Option<&str>) {
        self.search_installed = true;
        self.search_installs += 1;
        self.prefill = prefill.map(str::to_string);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PanelState {
    #[default]
    Untouched,
    Empty,
    Items {
        rows: Vec<CartRow>,
        total_label: String,
    },
}

#[derive(Debug, Default)]
pub struct FakePanel {
    pub state: PanelState,
    pub renders: usize,
}

impl CartPanel for FakePanel {
    fn show_empty(&mut self) {
        self.state = PanelState::Empty;
        self.renders += 1;
    }

    fn show_items(&mut self, rows: &[CartRow], total_label: &str) {
        self.state = PanelState::Items {
            rows: rows.to_vec(),
            total_label: total_label.to_string(),
        };
        self.renders += 1;
    }
}

#[derive(Debug, Default)]
pub struct FakeListing {
    pub titles: Vec<String>,
    pub visible: Vec<bool>,
}

impl ProductListing for FakeListing {
    fn titles(&self) -> Vec<String> {
        self.titles.clone()
    }

    fn set_visibility(&mut self, visible: &[bool]) {
        self.visible = visible.to_vec();
    }
}

/// A page double recording everything the storefront does to it.
#[derive(Debug, Default)]
pub struct FakePage {
    pub href: String,
    pub header: Option<FakeHeader>,
    pub panel: Option<FakePanel>,
    pub listing: Option<FakeListing>,
    pub detail: Option<ProductDetail>,
    pub replaced_urls: Vec<String>,
    pub navigations: Vec<(String, Duration)>,
    pub toasts: Vec<String>,
    pub alerts: Vec<String>,
}

impl FakePage {
    /// Header with a cart link, nothing else.
    pub fn at(path: &str) -> Self {
        Self {
            href: format!("{ORIGIN}/{path}"),
            header: Some(FakeHeader {
                has_cart_link: true,
                ..FakeHeader::default()
            }),
            ..Self::default()
        }
    }

    pub fn cart_page() -> Self {
        Self {
            panel: Some(FakePanel::default()),
            ..Self::at("cart.html")
        }
    }

    pub fn listing_page(path: &str, titles: &[&str]) -> Self {
        Self {
            listing: Some(FakeListing {
                titles: titles.iter().map(|t| t.to_string()).collect(),
                visible: vec![true; titles.len()],
            }),
            ..Self::at(path)
        }
    }

    pub fn product_page(name: &str, price_text: &str, image: Option<&str>) -> Self {
        Self {
            detail: Some(ProductDetail {
                name: Some(name.to_string()),
                price_text: Some(price_text.to_string()),
                image: image.map(str::to_string),
            }),
            ..Self::at("mug.html")
        }
    }

    pub fn badge(&self) -> Option<&str> {
        self.header.as_ref().and_then(|h| h.badge.as_deref())
    }

    pub fn panel_state(&self) -> &PanelState {
        &self.panel.as_ref().expect("page has no cart panel").state
    }

    pub fn visible_titles(&self) -> Vec<&str> {
        let listing = self.listing.as_ref().expect("page has no listing");
        listing
            .titles
            .iter()
            .zip(&listing.visible)
            .filter(|(_, v)| **v)
            .map(|(t, _)| t.as_str())
            .collect()
    }
}

impl Location for FakePage {
    fn href(&self) -> String {
        self.href.clone()
    }

    fn replace_url(&mut self, url: &str) {
        self.href = url.to_string();
        self.replaced_urls.push(url.to_string());
    }

    fn navigate(&mut self, url: &str, delay: Duration) {
        self.navigations.push((url.to_string(), delay));
    }
}

impl Notifier for FakePage {
    fn toast(&mut self, message: &str, _timeline: ToastTimeline) {
        self.toasts.push(message.to_string());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

impl Page for FakePage {
    fn header(&mut self) -> Option<&mut dyn Header> {
        self.header.as_mut().map(|h| h as &mut dyn Header)
    }

    fn cart_panel(&mut self) -> Option<&mut dyn CartPanel> {
        self.panel.as_mut().map(|p| p as &mut dyn CartPanel)
    }

    fn listing(&mut self) -> Option<&mut dyn ProductListing> {
        self.listing.as_mut().map(|l| l as &mut dyn ProductListing)
    }

    fn product_detail(&self) -> Option<ProductDetail> {
        self.detail.clone()
    }

    fn location(&mut self) -> &mut dyn Location {
        self
    }

    fn notifier(&mut self) -> &mut dyn Notifier {
        self
    }
}

/// Sum of the displayed row subtotals, parsed back from their labels.
pub fn displayed_subtotal_sum(rows: &[CartRow]) -> f64 {
    rows.iter()
        .map(|r| {
            r.subtotal
                .trim_start_matches('$')
                .parse::<f64>()
                .expect("subtotal label must be numeric")
        })
        .sum()
}
