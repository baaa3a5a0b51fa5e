//! Reactive cart context.
//!
//! [`CartContext`] sits between the engine and the views. It loads the cart
//! once, keeps the loaded state, and after every mutation publishes exactly
//! one [`CartSnapshot`] on a watch channel. Views read the latest snapshot
//! instead of going back to storage.
//!
//! Discrete [`CartEvent`]s (for example "item added", which a view turns into
//! a toast) go out on a broadcast channel. Nobody has to listen.
//!
//! Writes made by someone else to the same slot (another process, or direct
//! engine use) are not noticed automatically; call
//! [`CartContext::sync_from_storage`] to pick them up.

use serde::Serialize;
use souk_core::{CartLineItem, ProductId, Quantity};
use tokio::sync::{broadcast, watch};
use tracing::instrument;

use crate::engine::{CartEngine, SeedOutcome};
use crate::state::CartState;

const EVENT_CAPACITY: usize = 64;

/// Lifecycle of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContextPhase {
    /// Nothing has been loaded yet.
    #[default]
    Uninitialized,
    /// The cart has been loaded and may have been mutated since.
    Loaded,
}

/// What views render: the lines and their derived total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub phase: ContextPhase,
    /// Increases by one with every published snapshot; 0 before loading.
    pub revision: u64,
    /// Lines in insertion order.
    pub items: Vec<CartLineItem>,
    /// Sum of the line quantities.
    pub total_quantity: u64,
}

/// Notifications about individual cart changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// The cart was loaded from storage.
    Loaded { total_quantity: u64 },
    /// Units of a product were added.
    ItemAdded {
        product_id: ProductId,
        quantity: Quantity,
        total_quantity: u64,
    },
    /// A line was removed.
    ItemRemoved { product_id: ProductId },
    /// A line's quantity was set; `None` means the line was removed.
    QuantityUpdated {
        product_id: ProductId,
        quantity: Option<Quantity>,
    },
    /// Default lines were written into an empty cart.
    Seeded { lines: usize },
    /// The cart was emptied.
    Cleared,
    /// The slot was changed by another writer and the context reloaded it.
    ExternalChange,
}

/// Holds the loaded cart and notifies subscribers when it changes.
#[derive(Debug)]
pub struct CartContext {
    engine: CartEngine,
    state: CartState,
    phase: ContextPhase,
    revision: u64,
    snapshots: watch::Sender<CartSnapshot>,
    events: broadcast::Sender<CartEvent>,
}

impl CartContext {
    /// Create an unloaded context over `engine`.
    #[must_use]
    pub fn new(engine: CartEngine) -> Self {
        let (snapshots, _) = watch::channel(CartSnapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            engine,
            state: CartState::new(),
            phase: ContextPhase::Uninitialized,
            revision: 0,
            snapshots,
            events,
        }
    }

    /// Receive every published snapshot (latest value wins).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshots.subscribe()
    }

    /// Receive discrete change notifications.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Whether the cart has been loaded yet.
    #[must_use]
    pub const fn phase(&self) -> ContextPhase {
        self.phase
    }

    /// The current lines.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        self.state.lines()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.state.total_quantity()
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.snapshots.borrow().clone()
    }

    /// The engine behind this context.
    #[must_use]
    pub const fn engine(&self) -> &CartEngine {
        &self.engine
    }

    /// Load the cart from storage. Only the first call reads storage.
    #[instrument(skip(self))]
    pub fn load(&mut self) -> CartSnapshot {
        if self.phase == ContextPhase::Loaded {
            return self.snapshot();
        }
        let state = self.engine.get_items();
        self.phase = ContextPhase::Loaded;
        let total_quantity = state.total_quantity();
        tracing::debug!(lines = state.len(), total_quantity, "Cart loaded");
        self.publish(state, CartEvent::Loaded { total_quantity })
    }

    /// Write `defaults` into the cart if the stored cart is empty.
    ///
    /// If nothing was seeded but the slot no longer matches the loaded cart,
    /// the stored cart is published as an external change.
    #[instrument(skip(self, defaults), fields(defaults = defaults.len()))]
    pub fn seed_if_empty(&mut self, defaults: &[CartLineItem]) -> CartSnapshot {
        self.ensure_loaded();
        match self.engine.seed_if_empty(defaults) {
            SeedOutcome::Seeded(state) => {
                let lines = state.len();
                self.publish(state, CartEvent::Seeded { lines })
            }
            SeedOutcome::Unchanged(state) if state != self.state => {
                self.publish(state, CartEvent::ExternalChange)
            }
            SeedOutcome::Unchanged(_) => self.snapshot(),
        }
    }

    /// Add `quantity` units of `product_id`; values below one count as one.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn add_item(&mut self, product_id: ProductId, quantity: i64) -> CartSnapshot {
        self.ensure_loaded();
        let state = self.engine.add_item(product_id.clone(), quantity);
        let event = CartEvent::ItemAdded {
            product_id,
            quantity: Quantity::clamped(quantity),
            total_quantity: state.total_quantity(),
        };
        self.publish(state, event)
    }

    /// Remove the line for `product_id`.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_item(&mut self, product_id: &ProductId) -> CartSnapshot {
        self.ensure_loaded();
        let state = self.engine.remove_item(product_id);
        self.publish(
            state,
            CartEvent::ItemRemoved {
                product_id: product_id.clone(),
            },
        )
    }

    /// Set the quantity of `product_id`; zero or less removes the line.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> CartSnapshot {
        self.ensure_loaded();
        let state = self.engine.update_quantity(product_id.clone(), quantity);
        let event = CartEvent::QuantityUpdated {
            product_id,
            quantity: Quantity::from_signed(quantity),
        };
        self.publish(state, event)
    }

    /// Empty the cart. The context stays loaded.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> CartSnapshot {
        self.ensure_loaded();
        let state = self.engine.clear();
        self.publish(state, CartEvent::Cleared)
    }

    /// Clear the cart after the checkout backend accepted the order.
    pub fn complete_checkout(&mut self) -> CartSnapshot {
        tracing::info!(
            lines = self.state.len(),
            total_quantity = self.state.total_quantity(),
            "Checkout completed, clearing cart"
        );
        self.clear()
    }

    /// Re-read the slot and publish it if another writer changed it.
    ///
    /// Returns whether a new snapshot was published.
    #[instrument(skip(self))]
    pub fn sync_from_storage(&mut self) -> bool {
        if self.phase == ContextPhase::Uninitialized {
            self.load();
            return true;
        }
        let stored = self.engine.get_items();
        if stored == self.state {
            return false;
        }
        tracing::info!(
            lines = stored.len(),
            "Cart changed outside this context, reloading"
        );
        self.publish(stored, CartEvent::ExternalChange);
        true
    }

    fn ensure_loaded(&mut self) {
        if self.phase == ContextPhase::Uninitialized {
            self.load();
        }
    }

    fn publish(&mut self, state: CartState, event: CartEvent) -> CartSnapshot {
        self.state = state;
        self.revision += 1;
        let snapshot = CartSnapshot {
            phase: self.phase,
            revision: self.revision,
            items: self.state.lines().to_vec(),
            total_quantity: self.state.total_quantity(),
        };
        self.snapshots.send_replace(snapshot.clone());
        // No receivers is fine.
        let _ = self.events.send(event);
        snapshot
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapter::CartStorage;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn id(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn line(s: &str, n: u32) -> CartLineItem {
        CartLineItem::new(id(s), Quantity::new(n).unwrap())
    }

    fn context(store: &MemoryStore) -> CartContext {
        CartContext::new(CartEngine::new(CartStorage::new(
            Arc::new(store.clone()),
            "cart",
        )))
    }

    #[test]
    fn test_starts_uninitialized() {
        let cart = context(&MemoryStore::new());
        assert_eq!(cart.phase(), ContextPhase::Uninitialized);
        let snapshot = cart.snapshot();
        assert_eq!(snapshot.revision, 0);
        assert!(snapshot.items.is_empty());
    }

    #[test]
    fn test_load_reads_once() {
        let store = MemoryStore::new();
        store
            .set("cart", r#"[{"productId":"p1","quantity":2}]"#)
            .unwrap();
        let mut cart = context(&store);

        let first = cart.load();
        assert_eq!(first.phase, ContextPhase::Loaded);
        assert_eq!(first.revision, 1);
        assert_eq!(first.total_quantity, 2);

        // A later external write is not picked up by a second load
        store.set("cart", "[]").unwrap();
        let second = cart.load();
        assert_eq!(second, first);
    }

    #[test]
    fn test_mutations_publish_one_snapshot_each() {
        let store = MemoryStore::new();
        let mut cart = context(&store);
        let rx = cart.subscribe();
        cart.load();

        cart.add_item(id("p1"), 2);
        cart.add_item(id("p2"), 1);
        cart.update_quantity(id("p1"), 4);
        cart.remove_item(&id("p2"));

        let latest = rx.borrow().clone();
        assert_eq!(latest.revision, 5);
        assert_eq!(latest.items, vec![line("p1", 4)]);
        assert_eq!(latest.total_quantity, 4);
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_snapshot_published_after_persist() {
        let store = MemoryStore::new();
        let mut cart = context(&store);
        let snapshot = cart.add_item(id("p1"), 3);
        assert_eq!(
            store.get("cart").unwrap().as_deref(),
            Some(r#"[{"productId":"p1","quantity":3}]"#)
        );
        assert_eq!(snapshot.items, vec![line("p1", 3)]);
    }

    #[test]
    fn test_mutation_before_load_loads_first() {
        let store = MemoryStore::new();
        store
            .set("cart", r#"[{"productId":"p1","quantity":1}]"#)
            .unwrap();
        let mut cart = context(&store);
        let snapshot = cart.add_item(id("p1"), 1);
        assert_eq!(cart.phase(), ContextPhase::Loaded);
        assert_eq!(snapshot.items, vec![line("p1", 2)]);
        assert_eq!(snapshot.revision, 2);
    }

    #[test]
    fn test_clear_stays_loaded() {
        let mut cart = context(&MemoryStore::new());
        cart.add_item(id("p1"), 1);
        let snapshot = cart.clear();
        assert_eq!(snapshot.phase, ContextPhase::Loaded);
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.total_quantity, 0);
    }

    #[test]
    fn test_item_added_event() {
        let mut cart = context(&MemoryStore::new());
        cart.load();
        let mut events = cart.events();

        cart.add_item(id("p1"), 2);
        cart.add_item(id("p1"), -1);

        assert_eq!(
            events.try_recv().unwrap(),
            CartEvent::ItemAdded {
                product_id: id("p1"),
                quantity: Quantity::new(2).unwrap(),
                total_quantity: 2,
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            CartEvent::ItemAdded {
                product_id: id("p1"),
                quantity: Quantity::ONE,
                total_quantity: 3,
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_seed_only_when_empty() {
        let mut cart = context(&MemoryStore::new());
        let mut events = cart.events();

        let seeded = cart.seed_if_empty(&[line("d1", 1)]);
        assert_eq!(seeded.items, vec![line("d1", 1)]);

        cart.add_item(id("p1"), 1);
        let before = cart.snapshot();
        let after = cart.seed_if_empty(&[line("d2", 5)]);
        assert_eq!(after, before);

        assert!(matches!(events.try_recv().unwrap(), CartEvent::Loaded { .. }));
        assert_eq!(events.try_recv().unwrap(), CartEvent::Seeded { lines: 1 });
    }

    #[test]
    fn test_other_context_changes_are_not_observed_until_sync() {
        let store = MemoryStore::new();
        let mut tab_a = context(&store);
        let mut tab_b = context(&store);
        tab_a.load();
        tab_b.load();

        tab_b.add_item(id("p9"), 1);
        assert!(tab_a.items().is_empty());

        assert!(tab_a.sync_from_storage());
        assert_eq!(tab_a.items(), &[line("p9", 1)]);
        assert!(!tab_a.sync_from_storage());
    }

    #[test]
    fn test_last_write_wins_across_contexts() {
        let store = MemoryStore::new();
        let mut tab_a = context(&store);
        let mut tab_b = context(&store);
        tab_a.load();
        tab_b.load();

        tab_a.add_item(id("a"), 1);
        // tab_b still reads through storage for its mutation, so it sees "a"
        let snapshot = tab_b.add_item(id("b"), 1);
        assert_eq!(snapshot.items, vec![line("a", 1), line("b", 1)]);

        tab_a.clear();
        assert_eq!(tab_b.items().len(), 2);
        assert!(tab_b.sync_from_storage());
        assert!(tab_b.items().is_empty());
    }

    #[test]
    fn test_complete_checkout_clears() {
        let store = MemoryStore::new();
        let mut cart = context(&store);
        cart.add_item(id("p1"), 1);
        cart.complete_checkout();
        assert!(cart.items().is_empty());
        assert!(store.get("cart").unwrap().is_none());
    }

    #[test]
    fn test_seed_after_external_wipe() {
        let store = MemoryStore::new();
        let mut cart = context(&store);
        cart.add_item(id("p1"), 1);
        let mut events = cart.events();

        store.remove("cart").unwrap();
        let snapshot = cart.seed_if_empty(&[line("d1", 3)]);

        assert_eq!(snapshot.items, vec![line("d1", 3)]);
        assert_eq!(cart.items(), &[line("d1", 3)]);
        assert_eq!(
            store.get("cart").unwrap().as_deref(),
            Some(r#"[{"productId":"d1","quantity":3}]"#)
        );
        assert_eq!(events.try_recv().unwrap(), CartEvent::Seeded { lines: 1 });
    }

    #[test]
    fn test_seed_over_other_writer_is_external_change() {
        let store = MemoryStore::new();
        let mut tab_a = context(&store);
        let mut tab_b = context(&store);
        tab_a.load();
        let mut events = tab_a.events();

        tab_b.add_item(id("p9"), 1);
        let snapshot = tab_a.seed_if_empty(&[line("d1", 1)]);

        assert_eq!(snapshot.items, vec![line("p9", 1)]);
        assert_eq!(events.try_recv().unwrap(), CartEvent::ExternalChange);
        assert!(events.try_recv().is_err());
        assert_eq!(
            store.get("cart").unwrap().as_deref(),
            Some(r#"[{"productId":"p9","quantity":1}]"#)
        );
    }

    #[test]
    fn test_sync_sees_wipe_while_over_quota() {
        let store = MemoryStore::with_quota(40);
        let mut cart = context(&store);
        cart.add_item(id("p1"), 1);
        cart.add_item(id("a-much-longer-product-identifier"), 1);
        assert!(cart.engine().is_unsynced());
        assert!(!cart.sync_from_storage());

        store.remove("cart").unwrap();
        assert!(cart.sync_from_storage());
        assert!(cart.items().is_empty());
        assert!(!cart.engine().is_unsynced());
        assert!(store.get("cart").unwrap().is_none());
    }
}
