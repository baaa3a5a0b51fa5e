//! Cart engine.
//!
//! Every operation reads the current cart through the adapter, applies one
//! mutation to a [`CartState`], persists the result and returns it. No
//! operation returns an error: storage failures are logged and the engine
//! carries on with the state it computed.
//!
//! The engine also keeps the last state it produced. When the slot cannot be
//! used, or the last write to it failed, that cached state is the base for
//! the next operation instead of the (missing or stale) persisted one, so the
//! session keeps a correct cart even when persistence is lost. The slot is
//! still read on every operation: once it holds something other than the
//! engine's last successful write, another writer has replaced it and the
//! slot wins again.

use souk_core::{CartLineItem, ProductId, Quantity};

use crate::adapter::{CartStorage, log_failure};
use crate::state::CartState;
use crate::storage::StorageError;

/// What [`CartEngine::seed_if_empty`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The cart was empty and now holds the defaults.
    Seeded(CartState),
    /// Nothing was written; this is the cart as found.
    Unchanged(CartState),
}

impl SeedOutcome {
    #[must_use]
    pub const fn is_seeded(&self) -> bool {
        matches!(self, Self::Seeded(_))
    }

    /// The cart after seeding, whichever way it went.
    #[must_use]
    pub fn into_state(self) -> CartState {
        match self {
            Self::Seeded(state) | Self::Unchanged(state) => state,
        }
    }
}

/// Applies cart mutations and persists them.
#[derive(Debug, Clone)]
pub struct CartEngine {
    storage: CartStorage,
    cache: CartState,
    /// Last state known to be in the slot.
    persisted: CartState,
    unsynced: bool,
}

impl CartEngine {
    /// Create an engine over `storage`.
    #[must_use]
    pub const fn new(storage: CartStorage) -> Self {
        Self {
            storage,
            cache: CartState::new(),
            persisted: CartState::new(),
            unsynced: false,
        }
    }

    /// The storage handle this engine persists to.
    #[must_use]
    pub const fn storage(&self) -> &CartStorage {
        &self.storage
    }

    /// Whether the last persisted write failed, so the slot lags behind.
    #[must_use]
    pub const fn is_unsynced(&self) -> bool {
        self.unsynced
    }

    /// Current cart, read through from storage.
    pub fn get_items(&mut self) -> CartState {
        let state = self.current();
        self.cache.clone_from(&state);
        state
    }

    /// Persist `defaults` if the cart is empty and `defaults` is not.
    ///
    /// Never overwrites an existing cart.
    pub fn seed_if_empty(&mut self, defaults: &[CartLineItem]) -> SeedOutcome {
        let state = self.current();
        if !state.is_empty() || defaults.is_empty() {
            self.cache.clone_from(&state);
            return SeedOutcome::Unchanged(state);
        }
        tracing::debug!(lines = defaults.len(), "Seeding empty cart");
        SeedOutcome::Seeded(self.commit(CartState::from_lines(defaults.iter().cloned())))
    }

    /// Add `quantity` units of `product_id`.
    ///
    /// Quantities below one are treated as one.
    pub fn add_item(&mut self, product_id: ProductId, quantity: i64) -> CartState {
        if quantity < 1 {
            tracing::debug!(%product_id, quantity, "Clamping non-positive add quantity to 1");
        }
        let mut state = self.current();
        state.add(product_id, Quantity::clamped(quantity));
        self.commit(state)
    }

    /// Remove the line for `product_id`, if any.
    pub fn remove_item(&mut self, product_id: &ProductId) -> CartState {
        let mut state = self.current();
        state.remove(product_id);
        self.commit(state)
    }

    /// Set the quantity of `product_id`, inserting the line if absent.
    ///
    /// A quantity of zero or less removes the line.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> CartState {
        let mut state = self.current();
        state.set_quantity(product_id, Quantity::from_signed(quantity));
        self.commit(state)
    }

    /// Empty the cart and remove the slot.
    pub fn clear(&mut self) -> CartState {
        match self.storage.try_clear() {
            Ok(()) => {
                self.unsynced = false;
                self.persisted.clear();
            }
            Err(e) => self.record_failure("clear", &e),
        }
        self.cache.clear();
        CartState::new()
    }

    fn current(&mut self) -> CartState {
        match self.storage.try_read() {
            Ok(items) => {
                let stored = CartState::from_lines(items);
                if self.unsynced {
                    if stored == self.persisted {
                        return self.cache.clone();
                    }
                    tracing::info!(
                        key = self.storage.key(),
                        "Slot replaced by another writer, dropping unsaved session state"
                    );
                    self.unsynced = false;
                }
                self.persisted.clone_from(&stored);
                stored
            }
            Err(StorageError::Unavailable) => self.cache.clone(),
            Err(e) => {
                log_failure("read", self.storage.key(), &e);
                if self.unsynced {
                    self.cache.clone()
                } else {
                    CartState::new()
                }
            }
        }
    }

    fn commit(&mut self, state: CartState) -> CartState {
        match self.storage.try_write(state.lines()) {
            Ok(()) => {
                self.unsynced = false;
                self.persisted.clone_from(&state);
            }
            Err(e) => self.record_failure("write", &e),
        }
        self.cache.clone_from(&state);
        state
    }

    fn record_failure(&mut self, operation: &str, error: &StorageError) {
        log_failure(operation, self.storage.key(), error);
        if !matches!(error, StorageError::Unavailable) {
            self.unsynced = true;
        }
    }
}
