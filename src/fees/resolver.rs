//! Sequential-remainder fee cascade.
//!
//! ## Algorithm
//!
//! Given a sale amount, deductions are applied in a fixed order, each
//! computed as `bps * remainder / 10_000` (integer truncation) against the
//! remainder left by the previous step:
//!
//! 1. item-level royalties (registry probe chain)
//! 2. collection-level royalties
//! 3. the protocol fee
//! 4. payout splits from the seller's order data
//!
//! whatever is left goes to the seller. This is deliberately cumulative —
//! a 10% royalty followed by a 25% protocol fee takes 25% of the
//! post-royalty remainder, not of the original amount.
//!
//! ## Worked example
//!
//! Amount 500, one item royalty of 1000 bps, one collection royalty of
//! 1000 bps, protocol fee 2500 bps:
//!
//! ```text
//! item royalty      10% of 500 = 50   remainder 450
//! collection royalty 10% of 450 = 45  remainder 405
//! protocol fee      25% of 405 = 101  remainder 304 (seller)
//! ```
//!
//! Zero-amount deductions are omitted from the schedule; category bps are
//! not required to sum to 10_000 because each applies to a shrinking base.
//! A single entry past 10_000 bps takes the whole remainder and nothing
//! more, leaving zero for later steps and the seller.

use crate::config::MarketplaceConfig;
use crate::fees::registry::{RoyaltyRegistry, MAX_ROYALTY_ENTRIES};
use crate::types::{Address, PayoutSplit};

/// One computed deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub recipient: Address,
    pub amount: u128,
}

/// The ordered deduction schedule for one sale amount.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeeSchedule {
    /// Deductions in application order; zero amounts are omitted.
    pub payouts: Vec<Payout>,
    /// What remains for the seller after all deductions.
    pub remainder: u128,
}

impl FeeSchedule {
    /// Total deducted across all payouts.
    pub fn total_deducted(&self) -> u128 {
        self.payouts.iter().map(|p| p.amount).sum()
    }
}

/// Stateless resolver for the fee cascade; reads royalty configuration
/// from the registry collaborator on every call.
#[derive(Debug, Clone)]
pub struct FeeResolver {
    protocol_fee_bps: u16,
    protocol_fee_recipient: Address,
    max_payout_splits: usize,
}

impl FeeResolver {
    /// Build a resolver from the marketplace configuration.
    pub fn new(config: &MarketplaceConfig) -> Self {
        Self {
            protocol_fee_bps: config.protocol_fee_bps,
            protocol_fee_recipient: config.protocol_fee_recipient,
            max_payout_splits: config.max_payout_splits,
        }
    }

    /// Compute the deduction schedule for `amount` paid for one unit
    /// (or bundle share) of an item in `collection`.
    pub fn resolve(
        &self,
        registry: &dyn RoyaltyRegistry,
        amount: u128,
        collection: Address,
        item_id: u128,
        splits: &[PayoutSplit],
    ) -> FeeSchedule {
        let mut schedule = FeeSchedule {
            payouts: Vec::new(),
            remainder: amount,
        };

        // 1. Item-level royalties
        for entry in registry
            .item_royalties(collection, item_id)
            .iter()
            .take(MAX_ROYALTY_ENTRIES)
        {
            deduct(&mut schedule, entry.recipient, entry.bps);
        }

        // 2. Collection-level royalties
        for entry in registry
            .collection_royalties(collection)
            .unwrap_or_default()
            .iter()
            .take(MAX_ROYALTY_ENTRIES)
        {
            deduct(&mut schedule, entry.recipient, entry.bps);
        }

        // 3. Protocol fee
        deduct(
            &mut schedule,
            self.protocol_fee_recipient,
            self.protocol_fee_bps,
        );

        // 4. Payout splits
        for split in splits.iter().take(self.max_payout_splits) {
            deduct(&mut schedule, split.recipient, split.bps);
        }

        schedule
    }
}

/// Apply one bps deduction against the running remainder, truncating
/// toward zero. An entry at or past 10_000 bps consumes exactly the
/// remainder, so the running total can never go negative. Zero-amount
/// cuts are dropped.
fn deduct(schedule: &mut FeeSchedule, recipient: Address, bps: u16) {
    let cut = scaled_cut(schedule.remainder, bps);
    if cut > 0 {
        schedule.payouts.push(Payout {
            recipient,
            amount: cut,
        });
        schedule.remainder -= cut;
    }
}

/// `amount * bps / 10_000` without intermediate overflow. The quotient
/// and remainder of `amount / 10_000` are scaled separately, which is
/// exact for `bps < 10_000`; larger bps take the whole amount.
fn scaled_cut(amount: u128, bps: u16) -> u128 {
    if bps >= 10_000 {
        return amount;
    }
    let bps = bps as u128;
    (amount / 10_000) * bps + (amount % 10_000) * bps / 10_000
}

// ============================================================================
// Unit Tests
// ============================================================================
