//! [`Page`] binding over the live document.
//!
//! Anchors are looked up once per [`DomPage`]; the page is rebuilt for every
//! event so it always reflects the current DOM.

use std::rc::Rc;
use std::time::Duration;

use shopeasy_cart::view::{CartPanel, Header, Location, Notifier, Page, ProductListing};
use shopeasy_cart::{is_cart_link_text, CartRow, ProductDetail, ToastTimeline};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, Window};

use crate::{toast, Widget};

pub const CART_CONTAINER_ID: &str = "cart-items-container";
pub const EMPTY_MESSAGE_ID: &str = "empty-cart-message";
pub const SUMMARY_ID: &str = "cart-summary";
pub const CHECKOUT_ID: &str = "checkoutBtn";
pub const ADD_TO_CART_ID: &str = "addToCartBtn";

pub(crate) fn log_js_error(context: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        warn!(?err, "{context} failed");
    }
}

fn text_of(element: &Element) -> String {
    element.text_content().unwrap_or_default()
}

fn set_display(element: &Element, value: &str) {
    if let Some(el) = element.dyn_ref::<HtmlElement>() {
        log_js_error("style update", el.style().set_property("display", value));
    }
}

fn query(root: &Document, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

fn query_all(root: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// `nav a[href$="<cart page>"]`.
pub fn cart_link_selector(cart_page: &str) -> String {
    format!("nav a[href$=\"{}\"]", cart_page.replace('"', "\\\""))
}

// ── Header ───────────────────────────────────────────────────────────────

pub struct DomHeader {
    document: Document,
    header: Option<Element>,
    cart_page: String,
    widget: Rc<Widget>,
}

impl DomHeader {
    fn cart_link(&self) -> Option<Element> {
        query(&self.document, &cart_link_selector(&self.cart_page)).or_else(|| {
            query_all(&self.document, "nav a")
                .into_iter()
                .find(|a| is_cart_link_text(&text_of(a)))
        })
    }

    fn build_search_form(&self, header: &Element, prefill: Option<&str>) -> Result<(), JsValue> {
        let form = self.document.create_element("form")?;
        form.set_class_name("search-form");
        form.set_attribute("role", "search")?;

        let input: HtmlInputElement = self.document.create_element("input")?.dyn_into()?;
        input.set_class_name("search-input");
        input.set_type("search");
        input.set_name(&self.widget.config().search_param);
        input.set_placeholder("Search products...");
        input.set_attribute("aria-label", "Search products")?;
        if let Some(value) = prefill {
            input.set_value(value);
        }

        let button = self.document.create_element("button")?;
        button.set_class_name("search-btn");
        button.set_attribute("type", "submit")?;
        button.set_text_content(Some("Search"));

        form.append_child(&input)?;
        form.append_child(&button)?;
        let nav = header.query_selector("nav")?;
        header.insert_before(&form, nav.as_deref())?;

        let widget = Rc::clone(&self.widget);
        let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            widget.submit_search(&input.value());
        });
        form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
        on_submit.forget();
        Ok(())
    }
}

impl Header for DomHeader {
    fn set_badge(&mut self, text: &str) -> bool {
        let Some(link) = self.cart_link() else {
            return false;
        };
        let badge = match link.query_selector(".cart-badge").ok().flatten() {
            Some(badge) => badge,
            None => {
                let Ok(badge) = self.document.create_element("span") else {
                    return false;
                };
                badge.set_class_name("cart-badge");
                if link.append_child(&badge).is_err() {
                    return false;
                }
                badge
            }
        };
        badge.set_text_content(Some(text));
        true
    }

    /// Pages without a `<header>` never get a search box.
    fn has_search_control(&self) -> bool {
        match &self.header {
            Some(header) => header.query_selector(".search-form").ok().flatten().is_some(),
            None => true,
        }
    }

    fn install_search_control(&mut self, prefill: Option<&str>) {
        if let Some(header) = self.header.clone() {
            log_js_error("search install", self.build_search_form(&header, prefill));
        }
    }
}

// ── Cart panel ───────────────────────────────────────────────────────────

pub struct DomCartPanel {
    document: Document,
    container: Element,
    empty_message: Element,
    summary: Option<Element>,
}

impl DomCartPanel {
    fn find(document: &Document) -> Option<Self> {
        Some(Self {
            container: document.get_element_by_id(CART_CONTAINER_ID)?,
            empty_message: document.get_element_by_id(EMPTY_MESSAGE_ID)?,
            summary: document.get_element_by_id(SUMMARY_ID),
            document: document.clone(),
        })
    }

    fn element(&self, tag: &str, class: &str, text: Option<&str>) -> Result<Element, JsValue> {
        let el = self.document.create_element(tag)?;
        if !class.is_empty() {
            el.set_class_name(class);
        }
        if text.is_some() {
            el.set_text_content(text);
        }
        Ok(el)
    }

    fn row(&self, row: &CartRow) -> Result<Element, JsValue> {
        let item = self.element("div", "cart-item", None)?;

        let img = self.element("img", "cart-item-img", None)?;
        img.set_attribute("src", &row.image)?;
        img.set_attribute("alt", &row.name)?;
        item.append_child(&img)?;

        let info = self.element("div", "cart-item-info", None)?;
        let child = self.element("h3", "", Some(&row.name))?;
        info.append_child(&child)?;
        let child = self.element(
            "p",
            "item-price",
            Some(&format!("Price: {}", row.unit_price)),
        )?;
        info.append_child(&child)?;
        let subtotal = self.element("p", "item-subtotal", Some("Subtotal: "))?;
        let child = self.element("strong", "", Some(&row.subtotal))?;
        subtotal.append_child(&child)?;
        info.append_child(&subtotal)?;

        let controls = self.element("div", "qty-controls", None)?;
        let decrease = self.element("button", "qty-decrease", Some("-"))?;
        decrease.set_attribute("data-name", &row.name)?;
        let value = self.element("span", "qty-value", Some(&row.quantity.to_string()))?;
        let increase = self.element("button", "qty-increase", Some("+"))?;
        increase.set_attribute("data-name", &row.name)?;
        controls.append_child(&decrease)?;
        controls.append_child(&value)?;
        controls.append_child(&increase)?;
        info.append_child(&controls)?;
        item.append_child(&info)?;

        let remove = self.element("button", "remove-cart-btn", Some("Remove"))?;
        remove.set_attribute("data-name", &row.name)?;
        item.append_child(&remove)?;
        Ok(item)
    }

    fn fill(&self, rows: &[CartRow], total_label: &str) -> Result<(), JsValue> {
        self.container.set_inner_html("");
        set_display(&self.empty_message, "none");
        for row in rows {
            let child = self.row(row)?;
            self.container.append_child(&child)?;
        }
        if let Some(summary) = &self.summary {
            set_display(summary, "block");
            summary.set_inner_html("");
            let total = self.element("p", "", Some("Total: "))?;
            let child = self.element("strong", "", Some(total_label))?;
            total.append_child(&child)?;
            let checkout = self.element("button", "", Some("Proceed to Checkout"))?;
            checkout.set_id(CHECKOUT_ID);
            summary.append_child(&total)?;
            summary.append_child(&checkout)?;
        }
        Ok(())
    }
}

impl CartPanel for DomCartPanel {
    fn show_empty(&mut self) {
        self.container.set_inner_html("");
        set_display(&self.empty_message, "block");
        if let Some(summary) = &self.summary {
            set_display(summary, "none");
        }
    }

    fn show_items(&mut self, rows: &[CartRow], total_label: &str) {
        log_js_error("cart render", self.fill(rows, total_label));
    }
}

// ── Listing ──────────────────────────────────────────────────────────────

pub struct DomListing {
    cards: Vec<Element>,
}

impl ProductListing for DomListing {
    fn titles(&self) -> Vec<String> {
        self.cards
            .iter()
            .map(|card| {
                card.query_selector("h3")
                    .ok()
                    .flatten()
                    .map(|h| text_of(&h))
                    .unwrap_or_default()
            })
            .collect()
    }

    fn set_visibility(&mut self, visible: &[bool]) {
        for (card, show) in self.cards.iter().zip(visible) {
            let target = card
                .closest(".product-card-link")
                .ok()
                .flatten()
                .unwrap_or_else(|| card.clone());
            set_display(&target, if *show { "" } else { "none" });
        }
    }
}

// ── Page ─────────────────────────────────────────────────────────────────

pub struct DomPage {
    window: Window,
    document: Document,
    header: DomHeader,
    panel: Option<DomCartPanel>,
    listing: Option<DomListing>,
}

impl DomPage {
    pub fn current(widget: &Rc<Widget>) -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let cards = query_all(&document, ".product-card");
        Some(Self {
            header: DomHeader {
                header: query(&document, "header"),
                document: document.clone(),
                cart_page: widget.config().cart_page.clone(),
                widget: Rc::clone(widget),
            },
            panel: DomCartPanel::find(&document),
            listing: (!cards.is_empty()).then_some(DomListing { cards }),
            window,
            document,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Location for DomPage {
    fn href(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn replace_url(&mut self, url: &str) {
        let result = self.window.history().and_then(|history| {
            history.replace_state_with_url(&js_sys::Object::new(), "", Some(url))
        });
        log_js_error("history.replaceState", result);
    }

    fn navigate(&mut self, url: &str, delay: Duration) {
        if delay.is_zero() {
            log_js_error("navigation", self.window.location().set_href(url));
            return;
        }
        let window = self.window.clone();
        let url = url.to_string();
        toast::set_timeout(&self.window, delay, move || {
            log_js_error("navigation", window.location().set_href(&url));
        });
    }
}

impl Notifier for DomPage {
    fn toast(&mut self, message: &str, timeline: ToastTimeline) {
        log_js_error(
            "toast",
            toast::show(&self.window, &self.document, message, timeline),
        );
    }

    fn alert(&mut self, message: &str) {
        log_js_error("alert", self.window.alert_with_message(message));
    }
}

impl Page for DomPage {
    fn header(&mut self) -> Option<&mut dyn Header> {
        Some(&mut self.header)
    }

    fn cart_panel(&mut self) -> Option<&mut dyn CartPanel> {
        self.panel.as_mut().map(|p| p as &mut dyn CartPanel)
    }

    fn listing(&mut self) -> Option<&mut dyn ProductListing> {
        self.listing.as_mut().map(|l| l as &mut dyn ProductListing)
    }

    fn product_detail(&self) -> Option<ProductDetail> {
        let name = query(&self.document, ".product-details h1").map(|h| text_of(&h));
        let price_text = query(&self.document, ".product-details .price").map(|p| text_of(&p));
        let image =
            query(&self.document, ".product-image img").and_then(|img| img.get_attribute("src"));
        if name.is_none() && price_text.is_none() {
            return None;
        }
        Some(ProductDetail {
            name,
            price_text,
            image,
        })
    }

    fn location(&mut self) -> &mut dyn Location {
        self
    }

    fn notifier(&mut self) -> &mut dyn Notifier {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_targets_cart_page() {
        assert_eq!(cart_link_selector("cart.html"), "nav a[href$=\"cart.html\"]");
        assert_eq!(cart_link_selector("a\"b"), "nav a[href$=\"a\\\"b\"]");
    }
}
