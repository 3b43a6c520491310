//! `shopeasy-cart`: drive the cart from a terminal.
//!
//! The command logic lives here so the binary stays a thin wrapper. The cart
//! is kept in a [`FileStorage`] directory and rendered through
//! [`TerminalPage`], a plain-text implementation of the page contract.
//!
//! ```text
//! shopeasy-cart [--store DIR] [--config FILE] <command>
//!
//!   list                         render the cart
//!   add <name> <price> [image]   add one unit
//!   remove <name>                drop an item
//!   qty <name> <delta>           change a quantity
//!   badge                        print the badge count
//!   search <query> <title>...    filter titles like a listing page would
//!   checkout                     the checkout stub
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use crate::badge::badge_text;
use crate::cart::{normalize_delta, AddOutcome, QuantityChange};
use crate::config::CartConfig;
use crate::error::{ConfigError, StoreError};
use crate::item::{Product, ProductDetail};
use crate::render::CartRow;
use crate::store::FileStorage;
use crate::storefront::{SearchOutcome, Storefront};
use crate::toast::ToastTimeline;
use crate::view::{CartPanel, Header, Location, Notifier, Page, ProductListing};

pub const DEFAULT_STORE_DIR: &str = ".shopeasy";

pub const USAGE: &str = "usage: shopeasy-cart [--store DIR] [--config FILE] \
<list|add NAME PRICE [IMAGE]|remove NAME|qty NAME DELTA|badge|search QUERY TITLE...|checkout>";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ── Arguments ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Add {
        name: String,
        price: String,
        image: Option<String>,
    },
    Remove(String),
    Qty {
        name: String,
        delta: i64,
    },
    Badge,
    Search {
        query: String,
        titles: Vec<String>,
    },
    Checkout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub store_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub command: Command,
}

fn usage(msg: impl Into<String>) -> CliError {
    CliError::Usage(msg.into())
}

/// Parse arguments (without the program name).
pub fn parse_args(args: &[String]) -> Result<Invocation, CliError> {
    let mut store_dir = PathBuf::from(DEFAULT_STORE_DIR);
    let mut config = None;
    let mut rest = args;
    loop {
        match rest {
            [flag, value, tail @ ..] if flag == "--store" => {
                store_dir = PathBuf::from(value);
                rest = tail;
            }
            [flag, value, tail @ ..] if flag == "--config" => {
                config = Some(PathBuf::from(value));
                rest = tail;
            }
            [flag] if flag == "--store" || flag == "--config" => {
                return Err(usage(format!("{flag} needs a value")));
            }
            _ => break,
        }
    }
    let command = match rest {
        [cmd] if cmd == "list" => Command::List,
        [cmd] if cmd == "badge" => Command::Badge,
        [cmd] if cmd == "checkout" => Command::Checkout,
        [cmd, name, price] if cmd == "add" => Command::Add {
            name: name.clone(),
            price: price.clone(),
            image: None,
        },
        [cmd, name, price, image] if cmd == "add" => Command::Add {
            name: name.clone(),
            price: price.clone(),
            image: Some(image.clone()),
        },
        [cmd, name] if cmd == "remove" => Command::Remove(name.clone()),
        [cmd, name, delta] if cmd == "qty" => {
            let delta = delta
                .parse::<f64>()
                .ok()
                .and_then(normalize_delta)
                .ok_or_else(|| usage(format!("invalid quantity delta {delta:?}")))?;
            Command::Qty {
                name: name.clone(),
                delta,
            }
        }
        [cmd, query, titles @ ..] if cmd == "search" => Command::Search {
            query: query.clone(),
            titles: titles.to_vec(),
        },
        [] => return Err(usage("missing command")),
        [cmd, ..] => return Err(usage(format!("unknown or malformed command {cmd:?}"))),
    };
    Ok(Invocation {
        store_dir,
        config,
        command,
    })
}

// ── Terminal page ────────────────────────────────────────────────────────

/// A page whose anchors print to a line buffer.
pub struct TerminalPage {
    href: String,
    cart_panel: bool,
    listing: Option<TerminalListing>,
    badge: Option<String>,
    lines: Vec<String>,
}

struct TerminalListing {
    titles: Vec<String>,
    visible: Vec<bool>,
}

impl TerminalPage {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            cart_panel: false,
            listing: None,
            badge: None,
            lines: Vec::new(),
        }
    }

    pub fn with_cart_panel(mut self) -> Self {
        self.cart_panel = true;
        self
    }

    pub fn with_listing(mut self, titles: Vec<String>) -> Self {
        let visible = vec![true; titles.len()];
        self.listing = Some(TerminalListing { titles, visible });
        self
    }

    pub fn badge(&self) -> Option<&str> {
        self.badge.as_deref()
    }

    /// Titles currently shown by the listing.
    pub fn visible_titles(&self) -> Vec<&str> {
        self.listing
            .as_ref()
            .map(|l| {
                l.titles
                    .iter()
                    .zip(&l.visible)
                    .filter(|(_, v)| **v)
                    .map(|(t, _)| t.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn into_output(self) -> String {
        self.lines.join("\n")
    }
}

impl Header for TerminalPage {
    fn set_badge(&mut self, text: &str) -> bool {
        self.badge = Some(text.to_string());
        true
    }

    fn has_search_control(&self) -> bool {
        true
    }

    fn install_search_control(&mut self, _prefill: Option<&str>) {}
}

impl CartPanel for TerminalPage {
    fn show_empty(&mut self) {
        self.lines.push("Your cart is empty.".to_string());
    }

    fn show_items(&mut self, rows: &[CartRow], total_label: &str) {
        for row in rows {
            self.lines.push(format!(
                "{} x{}  {} each  subtotal {}",
                row.name, row.quantity, row.unit_price, row.subtotal
            ));
        }
        self.lines.push(format!("Total: {total_label}"));
    }
}

impl ProductListing for TerminalListing {
    fn titles(&self) -> Vec<String> {
        self.titles.clone()
    }

    fn set_visibility(&mut self, visible: &[bool]) {
        self.visible = visible.to_vec();
    }
}

impl Location for TerminalPage {
    fn href(&self) -> String {
        self.href.clone()
    }

    fn replace_url(&mut self, url: &str) {
        self.href = url.to_string();
    }

    fn navigate(&mut self, url: &str, _delay: Duration) {
        self.lines.push(format!("-> {url}"));
    }
}

impl Notifier for TerminalPage {
    fn toast(&mut self, message: &str, _timeline: ToastTimeline) {
        self.lines.push(message.to_string());
    }

    fn alert(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }
}

impl Page for TerminalPage {
    fn header(&mut self) -> Option<&mut dyn Header> {
        Some(self)
    }

    fn cart_panel(&mut self) -> Option<&mut dyn CartPanel> {
        if self.cart_panel {
            Some(self)
        } else {
            None
        }
    }

    fn listing(&mut self) -> Option<&mut dyn ProductListing> {
        self.listing
            .as_mut()
            .map(|l| l as &mut dyn ProductListing)
    }

    fn product_detail(&self) -> Option<ProductDetail> {
        None
    }

    fn location(&mut self) -> &mut dyn Location {
        self
    }

    fn notifier(&mut self) -> &mut dyn Notifier {
        self
    }
}

// ── Commands ─────────────────────────────────────────────────────────────

fn page_url(page: &str) -> String {
    format!("file:///{page}")
}

/// Execute an invocation and return what should be printed.
pub fn run(invocation: &Invocation) -> Result<String, CliError> {
    let config = match &invocation.config {
        Some(path) => CartConfig::load(path)?,
        None => CartConfig::default(),
    };
    let cart_url = page_url(&config.cart_page);
    let shop = Storefront::new(FileStorage::new(&invocation.store_dir), config);

    let output = match &invocation.command {
        Command::List => {
            let mut page = TerminalPage::new(cart_url).with_cart_panel();
            shop.render_cart(&mut page);
            page.into_output()
        }
        Command::Badge => badge_text(shop.cart().total_quantity()),
        Command::Add { name, price, image } => {
            let value = json!({ "name": name, "price": price, "img": image });
            let product = Product::from_value(&value)
                .ok_or_else(|| usage("a product needs a non-empty name"))?;
            let mut page = TerminalPage::new(cart_url);
            let line = match shop.add_item(&mut page, product)? {
                AddOutcome::Ignored => format!("{name}: ignored"),
                AddOutcome::Appended => format!("{name}: added"),
                AddOutcome::Incremented(q) => format!("{name}: quantity {q}"),
            };
            format!("{line}\nBadge: {}", page.badge().unwrap_or_default())
        }
        Command::Remove(name) => {
            let mut page = TerminalPage::new(cart_url).with_cart_panel();
            let removed = shop.remove_item(&mut page, name)?;
            format!("{name}: removed {removed}\n{}", page.into_output())
        }
        Command::Qty { name, delta } => {
            let mut page = TerminalPage::new(cart_url).with_cart_panel();
            let line = match shop.change_quantity(&mut page, name, *delta)? {
                QuantityChange::Missing => format!("{name}: not in cart"),
                QuantityChange::Updated(q) => format!("{name}: quantity {q}"),
                QuantityChange::Removed => format!("{name}: removed"),
            };
            format!("{line}\n{}", page.into_output())
        }
        Command::Search { query, titles } => {
            let listing_url = page_url(&shop.config().results_page);
            let mut page = TerminalPage::new(listing_url).with_listing(titles.clone());
            match shop.submit_search(&mut page, query) {
                SearchOutcome::Ignored => "empty query ignored".to_string(),
                SearchOutcome::Filtered { .. } => page.visible_titles().join("\n"),
                SearchOutcome::Redirected(target) => format!("-> {target}"),
            }
        }
        Command::Checkout => {
            let mut page = TerminalPage::new(cart_url);
            shop.checkout(&mut page);
            page.into_output()
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_global_flags() {
        let inv = parse_args(&args(&["--store", "/tmp/s", "--config", "c.toml", "badge"])).unwrap();
        assert_eq!(inv.store_dir, PathBuf::from("/tmp/s"));
        assert_eq!(inv.config, Some(PathBuf::from("c.toml")));
        assert_eq!(inv.command, Command::Badge);
    }

    #[test]
    fn parses_qty_with_rounding() {
        let inv = parse_args(&args(&["qty", "Mug", "-1.2"])).unwrap();
        assert_eq!(
            inv.command,
            Command::Qty {
                name: "Mug".into(),
                delta: -1
            }
        );
        assert!(matches!(
            parse_args(&args(&["qty", "Mug", "lots"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(matches!(parse_args(&args(&[])), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(&args(&["fly"])), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(&args(&["--store"])), Err(CliError::Usage(_))));
    }

    #[test]
    fn search_without_titles_redirects() {
        let inv = parse_args(&args(&["search", "mug"])).unwrap();
        let out = run(&inv).unwrap();
        assert_eq!(out, "-> frontpage.html?q=mug");
    }

    #[test]
    fn terminal_listing_filters() {
        let inv = parse_args(&args(&["search", "mug", "Mug", "Plate", "Big Mug"])).unwrap();
        assert_eq!(run(&inv).unwrap(), "Mug\nBig Mug");
    }
}
