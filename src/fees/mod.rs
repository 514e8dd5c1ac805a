//! Fee and royalty resolution.
//!
//! ## Design
//!
//! - [`registry`]: royalty lookup through the external registry
//!   collaborator, with a fixed-precedence probe chain for item-level
//!   entries
//! - [`resolver`]: the sequential-remainder cascade — item royalties,
//!   collection royalties, protocol fee, payout splits, each against the
//!   remainder left by the prior step
//!
//! The resolver is stateless with respect to fill and escrow records; it
//! only reads royalty configuration.

pub mod registry;
pub mod resolver;

pub use registry::{
    MemoryRoyaltyRegistry, RoyaltyEntry, RoyaltyRegistry, MAX_ROYALTY_ENTRIES,
};
pub use resolver::{FeeResolver, FeeSchedule, Payout};
