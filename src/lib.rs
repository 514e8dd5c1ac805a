//! # Exchange Core
//!
//! Peer-to-peer asset exchange core: negotiated order matching, escrowed
//! floor bids, and a sequential fee cascade.
//!
//! ## Architecture
//!
//! - **Types**: Assets, orders, payout splits, event notifications
//! - **Sign**: Order hashing and recoverable-signature verification
//! - **Fees**: Royalty registry probing and the deduction cascade
//! - **Ledger**: Transfer collaborators (the core never holds balances)
//! - **Engine**: Two-order matching with per-order-hash fill records
//! - **Escrow**: Floor bids funded up front and matched at a live floor price
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Identical orders, fills, and time produce identical
//!    outcomes
//! 2. **No Floating Point**: All amounts are u128 with truncating division
//! 3. **State Before Transfer**: Fill and escrow records update before any
//!    external asset movement
//! 4. **Time As Input**: Every time-sensitive operation takes the current
//!    timestamp as a parameter

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Address, Asset, Order, Event
pub mod types;

/// Order hashing and signature verification
pub mod sign;

/// Royalty registry and the fee cascade
pub mod fees;

/// Transfer collaborators and the in-memory reference ledger
pub mod ledger;

/// Matching engine: negotiated two-order settlement
pub mod engine;

/// Floor-bid escrow: funded standing bids
pub mod escrow;

/// Marketplace configuration and limits
pub mod config;

/// Error taxonomy
pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::MarketplaceConfig;
pub use engine::{MatchingEngine, MatchResult};
pub use error::ExchangeError;
pub use escrow::{BuyOrder, BuyOrderState, FloorBidMatcher};
pub use fees::{FeeResolver, FeeSchedule, RoyaltyRegistry};
pub use ledger::{InMemoryLedger, Transfers};
pub use sign::{order_hash, OrderHash, OrderSignature};
pub use types::{Address, Asset, AssetKind, Event, Order, PayoutSplit};
