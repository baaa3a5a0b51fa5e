//! Persistence behaviour: reloads, shared slots and storage failures.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use souk_cart::storage::{DisabledStore, FileStore, MemoryStore};
use souk_cart::{
    CartConfig, CartContext, CartEngine, CartEvent, CartStorage, ContextPhase, StorageError,
};
use souk_integration_tests::{TestStore, id, line};

// =============================================================================
// Reload Tests
// =============================================================================

#[test]
fn test_cart_survives_new_context() {
    let store = TestStore::new();
    {
        let mut cart = store.context();
        cart.add_item(id("p1"), 2);
        cart.add_item(id("p2"), 1);
    }
    let mut cart = store.context();
    let snapshot = cart.load();
    assert_eq!(snapshot.items, vec![line("p1", 2), line("p2", 1)]);
    assert_eq!(snapshot.total_quantity, 3);
}

#[test]
fn test_slot_wiped_externally_reads_empty() {
    let store = TestStore::new();
    let mut cart = store.context();
    cart.add_item(id("p1"), 1);

    std::fs::remove_file(FileStore::new(store.path()).path_for("cart")).unwrap();

    assert!(cart.sync_from_storage());
    assert!(cart.items().is_empty());
    assert_eq!(cart.phase(), ContextPhase::Loaded);
}

#[test]
fn test_separate_keys_are_independent() {
    let store = TestStore::new();
    let mut en = CartContext::new(CartEngine::new(store.storage_for("cart:en")));
    let mut ar = CartContext::new(CartEngine::new(store.storage_for("cart:ar")));

    en.add_item(id("p1"), 1);
    ar.add_item(id("p2"), 4);

    assert_eq!(store.storage_for("cart:en").read(), vec![line("p1", 1)]);
    assert_eq!(store.storage_for("cart:ar").read(), vec![line("p2", 4)]);
}

#[test]
fn test_seed_on_first_visit_only() {
    let store = TestStore::new();
    let defaults = vec![line("demo-1", 1), line("demo-2", 2)];

    let mut first = store.context();
    assert_eq!(first.seed_if_empty(&defaults).items, defaults);
    first.remove_item(&id("demo-1"));

    let mut second = store.context();
    let snapshot = second.seed_if_empty(&defaults);
    assert_eq!(snapshot.items, vec![line("demo-2", 2)]);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_no_storage_keeps_session_cart() {
    let mut cart = CartContext::new(CartEngine::new(CartStorage::detached()));
    cart.add_item(id("p1"), 1);
    cart.add_item(id("p1"), 1);
    assert_eq!(cart.items(), &[line("p1", 2)]);
    cart.clear();
    assert!(cart.items().is_empty());
}

#[test]
fn test_disabled_storage_keeps_session_cart() {
    let mut cart = CartContext::new(CartEngine::new(CartStorage::new(
        Arc::new(DisabledStore),
        "cart",
    )));
    let snapshot = cart.add_item(id("p1"), 3);
    assert_eq!(snapshot.total_quantity, 3);
    assert!(!cart.engine().is_unsynced());
}

#[test]
fn test_quota_failure_is_invisible_to_caller() {
    let store = MemoryStore::with_quota(64);
    let storage = CartStorage::new(Arc::new(store.clone()), "cart");
    let mut cart = CartContext::new(CartEngine::new(storage.clone()));
    let mut events = cart.events();

    cart.add_item(id("p1"), 1);
    let snapshot = cart.add_item(id("an-identifier-long-enough-to-blow-the-quota"), 1);

    // The caller sees a successful mutation
    assert_eq!(snapshot.items.len(), 2);
    assert!(cart.engine().is_unsynced());
    assert!(matches!(events.try_recv().unwrap(), CartEvent::Loaded { .. }));
    assert!(matches!(events.try_recv().unwrap(), CartEvent::ItemAdded { .. }));
    assert!(matches!(events.try_recv().unwrap(), CartEvent::ItemAdded { .. }));

    // Only the explicit API reports what happened
    assert!(matches!(
        storage.try_write(cart.items()),
        Err(StorageError::QuotaExceeded { .. })
    ));
    assert_eq!(storage.read(), vec![line("p1", 1)]);
}

#[test]
fn test_corrupt_slot_is_replaced_on_next_write() {
    let store = TestStore::new();
    store.put_raw("{\"not\": \"an array\"}");

    let mut cart = store.context();
    assert!(cart.load().items.is_empty());

    cart.add_item(id("p1"), 1);
    assert_eq!(
        store.raw().as_deref(),
        Some(r#"[{"productId":"p1","quantity":1}]"#)
    );
}

#[test]
fn test_config_builds_file_storage() {
    let store = TestStore::new();
    let config = CartConfig {
        storage_dir: store.path().to_path_buf(),
        storage_key: "cart".to_string(),
        ..CartConfig::default()
    };

    let mut cart = CartContext::new(CartEngine::new(config.storage()));
    cart.add_item(id("p1"), 2);
    assert_eq!(store.storage().read(), vec![line("p1", 2)]);
}
