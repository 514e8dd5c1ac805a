//! Order matching for privately negotiated exchanges.
//!
//! ## Design Principles
//!
//! The matching engine is designed for:
//!
//! 1. **Determinism**: Same orders, fills, and time always produce the
//!    same outcome
//! 2. **Integer Math**: All amounts are u128 with truncating division
//! 3. **Synchronous Execution**: No async/await in the settlement path
//! 4. **State Before Transfer**: Fill records update before any external
//!    asset movement
//!
//! ## Matching Rules
//!
//! - Exactly one order supplies items, the other supplies payment
//! - **Partial fills** are supported against priced bundles
//! - Replays of exhausted orders fail with no state change
//!
//! ## Example
//!
//! ```
//! use exchange_core::config::MarketplaceConfig;
//! use exchange_core::engine::MatchingEngine;
//! use exchange_core::fees::MemoryRoyaltyRegistry;
//! use exchange_core::ledger::{InMemoryLedger, Transfers};
//! use exchange_core::sign::{address_of, order_hash, OrderSignature};
//! use exchange_core::types::{Address, Asset, Order};
//! use k256::ecdsa::SigningKey;
//!
//! let key = SigningKey::from_slice(&[7u8; 32]).unwrap();
//! let seller = address_of(key.verifying_key());
//! let buyer = Address([2u8; 20]);
//! let collection = Address([3u8; 20]);
//!
//! let mut ledger = InMemoryLedger::new();
//! ledger.mint_item(collection, 1, seller);
//! ledger.credit_native(buyer, 1_000);
//!
//! // Seller signs an off-band listing; buyer submits the match
//! let sell = Order::new(seller, Asset::item(collection, 1), Asset::native(400), 1);
//! let (sig, rid) = key.sign_prehash_recoverable(&order_hash(&sell)).unwrap();
//! let mut bytes = [0u8; 65];
//! bytes[..64].copy_from_slice(&sig.to_bytes());
//! bytes[64] = rid.to_byte();
//! let sell_sig = OrderSignature(bytes);
//!
//! let buy = Order::new(buyer, Asset::native(400), Asset::item(collection, 1), 2);
//!
//! let config = MarketplaceConfig::new(Address([9u8; 20]), Address([8u8; 20]));
//! let mut engine = MatchingEngine::new(config);
//! let registry = MemoryRoyaltyRegistry::new();
//!
//! let result = engine
//!     .match_orders(
//!         &mut ledger, &registry,
//!         &sell, Some(&sell_sig),
//!         &buy, None,
//!         buyer, 400, 0,
//!     )
//!     .unwrap();
//!
//! assert_eq!(result.items_filled, 1);
//! assert_eq!(ledger.owner_of(collection, 1), Some(buyer));
//! ```

pub mod matcher;

pub use matcher::{MatchingEngine, MatchResult};
