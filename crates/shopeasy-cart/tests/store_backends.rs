use serde_json::{json, Value};
use shopeasy_cart::{Cart, CartStore, FileStorage, KeyValueStore, MemoryStorage, Product};

fn sample_cart() -> Cart {
    let mut cart = Cart::new();
    cart.add(Product::new("Mug", 9.99).with_image("Photo/mug.png"));
    cart.add(Product::new("Plate", 4.5));
    cart.add(Product::new("Mug", 9.99));
    cart.add(Product::new("Bowl", 0.0));
    cart
}

#[test]
fn file_round_trip_preserves_order_and_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = CartStore::new(FileStorage::new(dir.path()), "shopeasy_cart");
    let cart = sample_cart();
    store.save(&cart).unwrap();

    let loaded = store.load();
    assert_eq!(loaded, cart);
    let names: Vec<_> = loaded.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Mug", "Plate", "Bowl"]);
    assert!(dir.path().join("shopeasy_cart.json").exists());
}

#[test]
fn file_missing_slot_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = CartStore::new(FileStorage::new(dir.path().join("not-yet")), "shopeasy_cart");
    assert!(store.load().is_empty());
}

#[test]
fn file_corrupt_slot_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("shopeasy_cart.json"), b"\x00garbage").unwrap();
    let store = CartStore::new(FileStorage::new(dir.path()), "shopeasy_cart");
    assert!(store.load().is_empty());
}

#[test]
fn save_overwrites_unconditionally() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileStorage::new(dir.path());
    backend.set_item("shopeasy_cart", "not json at all").unwrap();
    let store = CartStore::new(&backend, "shopeasy_cart");
    store.save(&sample_cart()).unwrap();
    assert_eq!(store.load().len(), 3);
    assert!(!dir.path().join(".shopeasy_cart.json.tmp").exists());
}

#[test]
fn payload_written_by_page_script_is_readable() {
    let backend = MemoryStorage::new();
    backend
        .set_item(
            "shopeasy_cart",
            r#"[{"name":"Mug","price":9.99,"img":"Photo/mug.png","qty":2,"color":"blue"},
                {"name":"Plate","price":"4.50","qty":1}]"#,
        )
        .unwrap();
    let store = CartStore::new(&backend, "shopeasy_cart");
    let cart = store.load();
    assert_eq!(cart.total_quantity(), 3);
    assert_eq!(cart.get("Plate").unwrap().price, 4.5);

    store.save(&cart).unwrap();
    let stored = backend.get_item("shopeasy_cart").unwrap().unwrap();
    let raw: Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(
        raw,
        json!([
            {"name": "Mug", "price": 9.99, "img": "Photo/mug.png", "color": "blue", "qty": 2},
            {"name": "Plate", "price": 4.5, "qty": 1}
        ])
    );
}

#[test]
fn non_array_payloads_are_empty() {
    let backend = MemoryStorage::new();
    let store = CartStore::new(&backend, "shopeasy_cart");
    for payload in ["null", "{}", "\"cart\"", "42", ""] {
        backend.set_item("shopeasy_cart", payload).unwrap();
        assert!(store.load().is_empty(), "payload {payload:?}");
    }
}
