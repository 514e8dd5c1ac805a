//! Royalty configuration lookup.
//!
//! The registry is an external, trusted collaborator; the core reads it
//! through the [`RoyaltyRegistry`] trait and never caches results across
//! operations. Item-level royalties are resolved through a fixed-precedence
//! probe chain: explicit registry override, then the token's own declared
//! royalty interface, then its declared secondary-sale-fee interface, then
//! none. Collection-level royalties come from a single registry table.

use std::collections::HashMap;

use crate::types::Address;

/// Maximum royalty entries applied per category; entries beyond the cap
/// are ignored, never summed, never an error.
pub const MAX_ROYALTY_ENTRIES: usize = 10;

/// One royalty entry: `bps` of the running remainder to `recipient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoyaltyEntry {
    pub recipient: Address,
    pub bps: u16,
}

/// Read-side interface of the royalty registry collaborator.
///
/// Each probe returns `Some` only when that source actually declares
/// royalties for the queried item or collection.
pub trait RoyaltyRegistry {
    /// Explicit per-item override stored in the registry.
    fn item_royalty_override(
        &self,
        collection: Address,
        item_id: u128,
    ) -> Option<Vec<RoyaltyEntry>>;

    /// Royalties the token itself declares through its royalty interface.
    fn declared_royalties(
        &self,
        collection: Address,
        item_id: u128,
    ) -> Option<Vec<RoyaltyEntry>>;

    /// Royalties the token declares through a secondary-sale-fee interface.
    fn secondary_sale_fees(
        &self,
        collection: Address,
        item_id: u128,
    ) -> Option<Vec<RoyaltyEntry>>;

    /// Collection-wide royalties stored in the registry.
    fn collection_royalties(&self, collection: Address) -> Option<Vec<RoyaltyEntry>>;

    /// Item-level royalties under the fixed probe precedence.
    fn item_royalties(&self, collection: Address, item_id: u128) -> Vec<RoyaltyEntry> {
        self.item_royalty_override(collection, item_id)
            .or_else(|| self.declared_royalties(collection, item_id))
            .or_else(|| self.secondary_sale_fees(collection, item_id))
            .unwrap_or_default()
    }
}

// ============================================================================
// In-memory registry
// ============================================================================

/// In-memory royalty registry used by tests, benches, and the demo.
#[derive(Debug, Default)]
pub struct MemoryRoyaltyRegistry {
    item_overrides: HashMap<(Address, u128), Vec<RoyaltyEntry>>,
    declared: HashMap<(Address, u128), Vec<RoyaltyEntry>>,
    secondary: HashMap<(Address, u128), Vec<RoyaltyEntry>>,
    by_collection: HashMap<Address, Vec<RoyaltyEntry>>,
}

impl MemoryRoyaltyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an explicit per-item override.
    pub fn set_item_royalties(
        &mut self,
        collection: Address,
        item_id: u128,
        entries: Vec<RoyaltyEntry>,
    ) {
        self.item_overrides.insert((collection, item_id), entries);
    }

    /// Simulate a token declaring royalties through its own interface.
    pub fn set_declared_royalties(
        &mut self,
        collection: Address,
        item_id: u128,
        entries: Vec<RoyaltyEntry>,
    ) {
        self.declared.insert((collection, item_id), entries);
    }

    /// Simulate a token declaring secondary-sale fees.
    pub fn set_secondary_sale_fees(
        &mut self,
        collection: Address,
        item_id: u128,
        entries: Vec<RoyaltyEntry>,
    ) {
        self.secondary.insert((collection, item_id), entries);
    }

    /// Store collection-wide royalties.
    pub fn set_collection_royalties(
        &mut self,
        collection: Address,
        entries: Vec<RoyaltyEntry>,
    ) {
        self.by_collection.insert(collection, entries);
    }
}

impl RoyaltyRegistry for MemoryRoyaltyRegistry {
    fn item_royalty_override(
        &self,
        collection: Address,
        item_id: u128,
    ) -> Option<Vec<RoyaltyEntry>> {
        self.item_overrides.get(&(collection, item_id)).cloned()
    }

    fn declared_royalties(
        &self,
        collection: Address,
        item_id: u128,
    ) -> Option<Vec<RoyaltyEntry>> {
        self.declared.get(&(collection, item_id)).cloned()
    }

    fn secondary_sale_fees(
        &self,
        collection: Address,
        item_id: u128,
    ) -> Option<Vec<RoyaltyEntry>> {
        self.secondary.get(&(collection, item_id)).cloned()
    }

    fn collection_royalties(&self, collection: Address) -> Option<Vec<RoyaltyEntry>> {
        self.by_collection.get(&collection).cloned()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
