//! Durable key-value slots and the cart store built on top of them.
//!
//! The store is shared, unlocked state: every browsing context reads,
//! modifies and writes the whole cart on its own. Concurrent writers are
//! last-write-wins; [`StorageEvent`]s only tell other contexts to re-read.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::cart::Cart;
use crate::error::StoreError;

/// A string key-value backend with `localStorage` semantics.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }
}

/// Notification that a slot was written by another context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// `None` when the whole storage area was cleared.
    pub key: Option<String>,
}

impl StorageEvent {
    pub fn for_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    pub fn cleared() -> Self {
        Self { key: None }
    }
}

// ── Memory ───────────────────────────────────────────────────────────────

type EventQueue = RefCell<VecDeque<StorageEvent>>;

#[derive(Default)]
struct SharedSlots {
    slots: BTreeMap<String, String>,
    contexts: Vec<Weak<EventQueue>>,
}

/// In-process storage shared by any number of contexts.
///
/// Each handle returned by [`open_context`](Self::open_context) behaves like
/// another tab on the same origin: it sees the same slots, and writes made
/// through any *other* handle show up in its [`take_events`](Self::take_events).
pub struct MemoryStorage {
    shared: Rc<RefCell<SharedSlots>>,
    events: Rc<EventQueue>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let shared = Rc::new(RefCell::new(SharedSlots::default()));
        Self::attach(shared)
    }

    fn attach(shared: Rc<RefCell<SharedSlots>>) -> Self {
        let events = Rc::new(RefCell::new(VecDeque::new()));
        shared.borrow_mut().contexts.push(Rc::downgrade(&events));
        Self { shared, events }
    }

    /// A new handle onto the same slots.
    pub fn open_context(&self) -> Self {
        Self::attach(Rc::clone(&self.shared))
    }

    /// Drain the notifications caused by other contexts.
    pub fn take_events(&self) -> Vec<StorageEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    /// Drop every slot, notifying other contexts.
    pub fn clear(&self) {
        let mut shared = self.shared.borrow_mut();
        shared.slots.clear();
        Self::broadcast(&mut shared, &self.events, StorageEvent::cleared());
    }

    fn broadcast(shared: &mut SharedSlots, origin: &Rc<EventQueue>, event: StorageEvent) {
        shared.contexts.retain(|ctx| ctx.strong_count() > 0);
        for ctx in shared.contexts.iter().filter_map(Weak::upgrade) {
            if !Rc::ptr_eq(&ctx, origin) {
                ctx.borrow_mut().push_back(event.clone());
            }
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.shared.borrow().slots.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut shared = self.shared.borrow_mut();
        shared.slots.insert(key.to_string(), value.to_string());
        Self::broadcast(&mut shared, &self.events, StorageEvent::for_key(key));
        Ok(())
    }
}

// ── File ─────────────────────────────────────────────────────────────────

/// One `<key>.json` file per slot inside a directory.
///
/// Writes land in a sibling temp file that is then renamed over the slot, so
/// a reader sees either the old or the new payload.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0']);
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

// ── Cart store ───────────────────────────────────────────────────────────

/// A [`KeyValueStore`] bound to the slot holding the cart.
pub struct CartStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> CartStore<S> {
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read the cart. Never fails: a missing, unreadable or malformed slot
    /// reads as an empty cart.
    pub fn load(&self) -> Cart {
        let payload = match self.backend.get_item(&self.key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return Cart::new(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "cart slot unreadable, using empty cart");
                return Cart::new();
            }
        };
        match Cart::from_json(&payload) {
            Ok(cart) => cart,
            Err(err) => {
                warn!(key = %self.key, error = %err, "discarding malformed cart");
                Cart::new()
            }
        }
    }

    /// Overwrite the slot with `cart`.
    pub fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        self.backend.set_item(&self.key, &cart.to_json())?;
        debug!(key = %self.key, items = cart.len(), "cart saved");
        Ok(())
    }

    /// Whether `event` concerns this store's slot.
    pub fn is_affected_by(&self, event: &StorageEvent) -> bool {
        event.key.as_deref() == Some(self.key.as_str())
    }
}
