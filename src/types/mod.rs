//! Core data types for the exchange.
//!
//! ## Types
//!
//! - [`Address`]: 20-byte identity (account, token contract, collection)
//! - [`Asset`] / [`AssetKind`]: type-tagged tradable asset with a
//!   deterministic payload codec
//! - [`Order`]: signed exchange order with validity window and payout data
//! - [`Event`]: notifications emitted by the engines
//!
//! All amounts and item ids are `u128`; timestamps are `u64` seconds
//! supplied by the caller's time oracle.

pub mod asset;
pub mod events;
pub mod order;

// Re-export all types at module level
pub use asset::{
    encode_bundle, encode_single, Address, Asset, AssetKind, BundleInfo, DecodedAsset,
};
pub use events::Event;
pub use order::{decode_order_data, encode_order_data, DataKind, Order, PayoutSplit};
