//! Transfer collaborators and the in-memory reference ledger.
//!
//! The execution environment owns all balances and ownership records; the
//! core never touches them directly. Every asset movement goes through the
//! [`Transfers`] trait, and a failed transfer fails the enclosing operation
//! whole. [`InMemoryLedger`] is the reference implementation backing the
//! demo, the tests, and the benchmarks.

use std::collections::HashMap;

use crate::error::ExchangeError;
use crate::types::Address;

/// External transfer interface: native currency, fungible tokens, and
/// single non-fungible items.
pub trait Transfers {
    /// Move native currency between accounts.
    fn transfer_native(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), ExchangeError>;

    /// Move fungible token balance between accounts.
    fn transfer_token(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), ExchangeError>;

    /// Move one non-fungible item; fails with [`ExchangeError::NotOwner`]
    /// unless `from` owns it.
    fn transfer_item(
        &mut self,
        collection: Address,
        item_id: u128,
        from: Address,
        to: Address,
    ) -> Result<(), ExchangeError>;

    /// Current owner of an item, if it exists.
    fn owner_of(&self, collection: Address, item_id: u128) -> Option<Address>;

    /// Native balance of an account.
    fn native_balance(&self, account: Address) -> u128;

    /// Fungible token balance of an account.
    fn token_balance(&self, token: Address, account: Address) -> u128;
}

// ============================================================================
// In-memory ledger
// ============================================================================

/// In-memory account balances and item ownership.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    native: HashMap<Address, u128>,
    tokens: HashMap<(Address, Address), u128>,
    items: HashMap<(Address, u128), Address>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Setup helpers
    // ========================================================================

    /// Credit native currency to an account.
    pub fn credit_native(&mut self, account: Address, amount: u128) {
        *self.native.entry(account).or_default() += amount;
    }

    /// Mint fungible token balance to an account.
    pub fn mint_token(&mut self, token: Address, account: Address, amount: u128) {
        *self.tokens.entry((token, account)).or_default() += amount;
    }

    /// Mint an item into a collection under `owner`.
    pub fn mint_item(&mut self, collection: Address, item_id: u128, owner: Address) {
        self.items.insert((collection, item_id), owner);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of items an account owns in a collection.
    pub fn item_count(&self, collection: Address, owner: Address) -> usize {
        self.items
            .iter()
            .filter(|((c, _), o)| *c == collection && **o == owner)
            .count()
    }
}

impl Transfers for InMemoryLedger {
    fn transfer_native(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), ExchangeError> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self.native.entry(from).or_default();
        if *balance < amount {
            return Err(ExchangeError::InsufficientBalance);
        }
        *balance -= amount;
        *self.native.entry(to).or_default() += amount;
        Ok(())
    }

    fn transfer_token(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), ExchangeError> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self.tokens.entry((token, from)).or_default();
        if *balance < amount {
            return Err(ExchangeError::InsufficientBalance);
        }
        *balance -= amount;
        *self.tokens.entry((token, to)).or_default() += amount;
        Ok(())
    }

    fn transfer_item(
        &mut self,
        collection: Address,
        item_id: u128,
        from: Address,
        to: Address,
    ) -> Result<(), ExchangeError> {
        match self.items.get_mut(&(collection, item_id)) {
            Some(owner) if *owner == from => {
                *owner = to;
                Ok(())
            }
            _ => Err(ExchangeError::NotOwner),
        }
    }

    fn owner_of(&self, collection: Address, item_id: u128) -> Option<Address> {
        self.items.get(&(collection, item_id)).copied()
    }

    fn native_balance(&self, account: Address) -> u128 {
        self.native.get(&account).copied().unwrap_or(0)
    }

    fn token_balance(&self, token: Address, account: Address) -> u128 {
        self.tokens.get(&(token, account)).copied().unwrap_or(0)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
