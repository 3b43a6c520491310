//! Browser bindings for shopeasy-cart.
//!
//! Exposes a `ShopEasyCart` class that owns the storefront for one page
//! context. `install()` wires the document the way the storefront's static
//! pages expect (header badge, search box, cart page controls, add-to-cart
//! button, cross-tab `storage` events). The remaining methods are the
//! script-facing cart API.
//!
//! # Boundary discipline
//!
//! Structured inputs cross the boundary as JSON strings; outputs that JS reads
//! back are produced with `serde_wasm_bindgen`'s JSON-compatible serializer.
//! Every DOM handler rebuilds a [`dom::DomPage`] so it sees the live document.

use std::rc::Rc;

use serde::Serialize as _;
use serde_json::Value;
use shopeasy_cart::{
    normalize_delta, AddOutcome, CartConfig, Product, QuantityChange, StorageEvent, Storefront,
};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget};

pub mod dom;
pub mod storage;
pub mod toast;

use dom::DomPage;
use storage::LocalStorage;

// ── Row actions ──────────────────────────────────────────────────────────────

/// What a click inside the cart container asks for, read off the button's
/// class list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Remove,
    Increase,
    Decrease,
}

impl RowAction {
    pub fn from_class_name(class_name: &str) -> Option<Self> {
        class_name.split_whitespace().find_map(|class| match class {
            "remove-cart-btn" => Some(Self::Remove),
            "qty-increase" => Some(Self::Increase),
            "qty-decrease" => Some(Self::Decrease),
            _ => None,
        })
    }

    pub fn delta(self) -> Option<i64> {
        match self {
            Self::Remove => None,
            Self::Increase => Some(1),
            Self::Decrease => Some(-1),
        }
    }
}

/// Parse the constructor's optional JSON config. Missing keys take their
/// defaults.
pub fn parse_config(json: Option<&str>) -> Result<CartConfig, String> {
    match json.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(CartConfig::default()),
        Some(s) => serde_json::from_str(s).map_err(|e| format!("invalid config JSON: {e}")),
    }
}

fn outcome_label(outcome: AddOutcome) -> &'static str {
    match outcome {
        AddOutcome::Ignored => "ignored",
        AddOutcome::Appended => "added",
        AddOutcome::Incremented(_) => "incremented",
    }
}

fn change_label(change: QuantityChange) -> &'static str {
    match change {
        QuantityChange::Missing => "missing",
        QuantityChange::Updated(_) => "updated",
        QuantityChange::Removed => "removed",
    }
}

// ── Widget ───────────────────────────────────────────────────────────────────

/// Shared state behind every registered listener.
pub struct Widget {
    shop: Storefront<LocalStorage>,
}

impl Widget {
    pub fn config(&self) -> &CartConfig {
        self.shop.config()
    }

    fn with_page<R>(
        self: &Rc<Self>,
        f: impl FnOnce(&Storefront<LocalStorage>, &mut DomPage) -> R,
    ) -> Option<R> {
        let mut page = DomPage::current(self)?;
        Some(f(&self.shop, &mut page))
    }

    pub fn submit_search(self: &Rc<Self>, raw: &str) {
        if let Some(outcome) = self.with_page(|shop, page| shop.submit_search(page, raw)) {
            debug!(?outcome, "search submitted");
        }
    }

    fn init(self: &Rc<Self>) {
        let Some(document) = self.with_page(|shop, page| {
            shop.init(page);
            page.document().clone()
        }) else {
            return;
        };
        if let Err(err) = self.wire_document(&document) {
            warn!(?err, "failed to wire page controls");
        }
    }

    fn wire_document(self: &Rc<Self>, document: &web_sys::Document) -> Result<(), JsValue> {
        if let Some(button) = document.get_element_by_id(dom::ADD_TO_CART_ID) {
            let widget = Rc::clone(self);
            listen(&button, "click", move |_| {
                let result = widget.with_page(|shop, page| shop.add_from_product_page(page));
                if let Some(Err(err)) = result {
                    warn!(%err, "add to cart failed");
                }
            })?;
        }

        if let Some(container) = document.get_element_by_id(dom::CART_CONTAINER_ID) {
            let widget = Rc::clone(self);
            listen(&container, "click", move |event| widget.on_row_click(&event))?;
        }

        if let Some(summary) = document.get_element_by_id(dom::SUMMARY_ID) {
            let widget = Rc::clone(self);
            listen(&summary, "click", move |event| {
                let is_checkout = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .is_some_and(|el| el.id() == dom::CHECKOUT_ID);
                if is_checkout {
                    widget.with_page(|shop, page| shop.checkout(page));
                }
            })?;
        }
        Ok(())
    }

    fn on_row_click(self: &Rc<Self>, event: &Event) {
        let Some(button) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Some(action) = RowAction::from_class_name(&button.class_name()) else {
            return;
        };
        let Some(name) = button.get_attribute("data-name") else {
            return;
        };
        let result = self.with_page(|shop, page| match action.delta() {
            None => shop.remove_item(page, &name).map(drop),
            Some(delta) => shop.change_quantity(page, &name, delta).map(drop),
        });
        if let Some(Err(err)) = result {
            warn!(%err, ?action, "cart row action failed");
        }
    }

    fn on_storage(self: &Rc<Self>, key: Option<String>) {
        let event = match key {
            Some(key) => StorageEvent::for_key(key),
            None => StorageEvent::cleared(),
        };
        self.with_page(|shop, page| shop.on_storage_event(page, &event));
    }
}

/// Send panics and `tracing` events to the browser console. Runs once per
/// module instance; a subscriber installed by the host page wins.
fn install_console() {
    #[cfg(feature = "console")]
    {
        static ONCE: std::sync::Once = std::sync::Once::new();
        ONCE.call_once(|| {
            console_error_panic_hook::set_once();
            if tracing_wasm::try_set_as_global_default().is_err() {
                debug!("tracing subscriber already installed");
            }
        });
    }
}

fn listen(
    target: &EventTarget,
    kind: &str,
    mut handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| handler(event));
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

// ── ShopEasyCart ─────────────────────────────────────────────────────────────

#[wasm_bindgen(js_name = "ShopEasyCart")]
pub struct ShopEasyCart {
    widget: Rc<Widget>,
}

#[wasm_bindgen(js_class = "ShopEasyCart")]
impl ShopEasyCart {
    /// `config_json` overrides any subset of the defaults, e.g.
    /// `{"storage_key": "cart_v2"}`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<ShopEasyCart, JsValue> {
        install_console();
        let config = parse_config(config_json.as_deref()).map_err(|e| JsValue::from_str(&e))?;
        Ok(ShopEasyCart {
            widget: Rc::new(Widget {
                shop: Storefront::new(LocalStorage, config),
            }),
        })
    }

    /// Run page initialization once the document is parsed and subscribe to
    /// cross-tab `storage` events.
    pub fn install(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let widget = Rc::clone(&self.widget);
        let on_storage = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(
            move |event: web_sys::StorageEvent| widget.on_storage(event.key()),
        );
        window.add_event_listener_with_callback("storage", on_storage.as_ref().unchecked_ref())?;
        on_storage.forget();

        if document.ready_state() == "loading" {
            let widget = Rc::clone(&self.widget);
            listen(&document, "DOMContentLoaded", move |_| widget.init())?;
        } else {
            self.widget.init();
        }
        Ok(())
    }

    /// Add one unit of a `{name, price, img}` product. Returns `"added"`,
    /// `"incremented"` or `"ignored"`.
    #[wasm_bindgen(js_name = "addToCart")]
    pub fn add_to_cart(&self, product_json: &str) -> Result<String, JsValue> {
        let value: Value = serde_json::from_str(product_json)
            .map_err(|e| JsValue::from_str(&format!("invalid product JSON: {e}")))?;
        let Some(product) = Product::from_value(&value) else {
            return Ok(outcome_label(AddOutcome::Ignored).to_string());
        };
        let outcome = self
            .widget
            .with_page(|shop, page| shop.add_item(page, product))
            .unwrap_or(Ok(AddOutcome::Ignored))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(outcome_label(outcome).to_string())
    }

    /// Remove every item named `name`; returns how many entries went.
    #[wasm_bindgen(js_name = "removeFromCart")]
    pub fn remove_from_cart(&self, name: &str) -> Result<u32, JsValue> {
        let removed = self
            .widget
            .with_page(|shop, page| shop.remove_item(page, name))
            .unwrap_or(Ok(0))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(u32::try_from(removed).unwrap_or(u32::MAX))
    }

    /// Shift a quantity. Fractional deltas are rounded; `NaN` and infinities
    /// are refused. Returns `"updated"`, `"removed"` or `"missing"`.
    #[wasm_bindgen(js_name = "changeQty")]
    pub fn change_qty(&self, name: &str, delta: f64) -> Result<String, JsValue> {
        let delta = normalize_delta(delta)
            .ok_or_else(|| JsValue::from_str("quantity delta must be a finite number"))?;
        let change = self
            .widget
            .with_page(|shop, page| shop.change_quantity(page, name, delta))
            .unwrap_or(Ok(QuantityChange::Missing))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(change_label(change).to_string())
    }

    #[wasm_bindgen(js_name = "renderCart")]
    pub fn render_cart(&self) -> bool {
        self.widget
            .with_page(|shop, page| shop.render_cart(page))
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = "updateCartCount")]
    pub fn update_cart_count(&self) -> bool {
        self.widget
            .with_page(|shop, page| shop.sync_badge(page))
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = "cartCount")]
    pub fn cart_count(&self) -> f64 {
        self.widget.shop.cart().total_quantity() as f64
    }

    /// Persisted items as a plain JS array.
    pub fn items(&self) -> Result<JsValue, JsValue> {
        let ser = serde_wasm_bindgen::Serializer::json_compatible();
        self.widget
            .shop
            .cart()
            .serialize(&ser)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
