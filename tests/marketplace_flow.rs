//! End-to-end marketplace flows.
//!
//! These tests drive the public crate surface the way an embedding
//! environment would: orders are signed with real keys, settlement runs
//! against the in-memory ledger, and every assertion checks observable
//! balances and ownership rather than internal state.
//!
//! ## Running
//!
//! ```bash
//! cargo test --test marketplace_flow
//! ```

use exchange_core::config::MarketplaceConfig;
use exchange_core::engine::MatchingEngine;
use exchange_core::escrow::{BuyOrderState, FloorBidMatcher};
use exchange_core::fees::{MemoryRoyaltyRegistry, RoyaltyEntry};
use exchange_core::ledger::{InMemoryLedger, Transfers};
use exchange_core::sign::{address_of, order_hash, OrderSignature};
use exchange_core::types::{Address, Asset, Order, PayoutSplit};
use exchange_core::ExchangeError;

use k256::ecdsa::SigningKey;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn addr(b: u8) -> Address {
    Address([b; 20])
}

const ADMIN: u8 = 0xAD;
const FEE_SINK: u8 = 0xFE;
const ESCROW: u8 = 0xEC;
const OPERATOR: u8 = 0x0F;
const NFT: u8 = 0x10;
const TOKEN: u8 = 0x20;

/// A marketplace participant with a real signing key.
struct Account {
    key: SigningKey,
    address: Address,
}

impl Account {
    fn new(seed: u8) -> Self {
        let key = SigningKey::from_slice(&[seed; 32]).expect("valid key bytes");
        let address = address_of(key.verifying_key());
        Self { key, address }
    }

    fn sign(&self, order: &Order) -> OrderSignature {
        let digest = order_hash(order);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .expect("signing succeeds");
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        OrderSignature(out)
    }
}

fn engine() -> MatchingEngine {
    MatchingEngine::new(MarketplaceConfig::new(addr(ADMIN), addr(FEE_SINK)))
}

// ============================================================================
// Negotiated matches
// ============================================================================

/// A third party submits two fully signed orders; both parties' asset
/// movements and the full deduction cascade land on the ledger.
#[test]
fn signed_match_settles_with_full_cascade() {
    let seller = Account::new(0x11);
    let buyer = Account::new(0x22);

    let mut ledger = InMemoryLedger::new();
    ledger.mint_item(addr(NFT), 1, seller.address);
    ledger.mint_token(addr(TOKEN), buyer.address, 10_000);

    let mut registry = MemoryRoyaltyRegistry::new();
    registry.set_item_royalties(
        addr(NFT),
        1,
        vec![RoyaltyEntry { recipient: addr(0x30), bps: 1_000 }],
    );
    registry.set_collection_royalties(
        addr(NFT),
        vec![RoyaltyEntry { recipient: addr(0x31), bps: 1_000 }],
    );

    let sell = Order::new(
        seller.address,
        Asset::item(addr(NFT), 1),
        Asset::fungible(addr(TOKEN), 500),
        1,
    );
    let buy = Order::new(
        buyer.address,
        Asset::fungible(addr(TOKEN), 500),
        Asset::item(addr(NFT), 1),
        2,
    );
    let sell_sig = seller.sign(&sell);
    let buy_sig = buyer.sign(&buy);

    let mut engine = engine();
    let result = engine
        .match_orders(
            &mut ledger,
            &registry,
            &sell,
            Some(&sell_sig),
            &buy,
            Some(&buy_sig),
            addr(OPERATOR),
            0,
            100,
        )
        .expect("signed match settles");

    assert_eq!(result.items_filled, 1);
    assert_eq!(result.paid_amount, 500);
    assert_eq!(ledger.owner_of(addr(NFT), 1), Some(buyer.address));

    // 500 -> item 50 -> collection 45 -> protocol 101 -> seller 304
    assert_eq!(ledger.token_balance(addr(TOKEN), addr(0x30)), 50);
    assert_eq!(ledger.token_balance(addr(TOKEN), addr(0x31)), 45);
    assert_eq!(ledger.token_balance(addr(TOKEN), addr(FEE_SINK)), 101);
    assert_eq!(ledger.token_balance(addr(TOKEN), seller.address), 304);
    assert_eq!(ledger.token_balance(addr(TOKEN), buyer.address), 9_500);
}

/// No value is created or destroyed: deductions plus the seller's
/// remainder always equal the buyer's spend.
#[test]
fn settlement_conserves_value() {
    let seller = Account::new(0x11);
    let buyer = Account::new(0x22);

    let mut ledger = InMemoryLedger::new();
    ledger.mint_item(addr(NFT), 7, seller.address);
    ledger.mint_token(addr(TOKEN), buyer.address, 1_000);

    let mut registry = MemoryRoyaltyRegistry::new();
    registry.set_collection_royalties(
        addr(NFT),
        vec![
            RoyaltyEntry { recipient: addr(0x31), bps: 333 },
            RoyaltyEntry { recipient: addr(0x32), bps: 777 },
        ],
    );

    let sell = Order::new(
        seller.address,
        Asset::item(addr(NFT), 7),
        Asset::fungible(addr(TOKEN), 997),
        1,
    )
    .with_payout_splits(&[PayoutSplit { recipient: addr(0x33), bps: 4_999 }])
    .expect("splits encode");
    let buy = Order::new(
        buyer.address,
        Asset::fungible(addr(TOKEN), 997),
        Asset::item(addr(NFT), 7),
        2,
    );
    let sell_sig = seller.sign(&sell);
    let buy_sig = buyer.sign(&buy);

    engine()
        .match_orders(
            &mut ledger,
            &registry,
            &sell,
            Some(&sell_sig),
            &buy,
            Some(&buy_sig),
            addr(OPERATOR),
            0,
            100,
        )
        .expect("match settles");

    let distributed = ledger.token_balance(addr(TOKEN), addr(0x31))
        + ledger.token_balance(addr(TOKEN), addr(0x32))
        + ledger.token_balance(addr(TOKEN), addr(0x33))
        + ledger.token_balance(addr(TOKEN), addr(FEE_SINK))
        + ledger.token_balance(addr(TOKEN), seller.address);
    assert_eq!(distributed, 997);
    assert_eq!(ledger.token_balance(addr(TOKEN), buyer.address), 3);
}

/// A tampered order body invalidates its signature and nothing moves.
#[test]
fn tampered_order_is_rejected() {
    let seller = Account::new(0x11);
    let buyer = Account::new(0x22);

    let mut ledger = InMemoryLedger::new();
    ledger.mint_item(addr(NFT), 1, seller.address);
    ledger.mint_token(addr(TOKEN), buyer.address, 10_000);
    let registry = MemoryRoyaltyRegistry::new();

    let sell = Order::new(
        seller.address,
        Asset::item(addr(NFT), 1),
        Asset::fungible(addr(TOKEN), 500),
        1,
    );
    let sell_sig = seller.sign(&sell);

    // Buyer lowers the price after the seller signed
    let mut cheaper = sell.clone();
    cheaper.take_asset = Asset::fungible(addr(TOKEN), 5);

    let buy = Order::new(
        buyer.address,
        Asset::fungible(addr(TOKEN), 5),
        Asset::item(addr(NFT), 1),
        2,
    );
    let buy_sig = buyer.sign(&buy);

    let result = engine().match_orders(
        &mut ledger,
        &registry,
        &cheaper,
        Some(&sell_sig),
        &buy,
        Some(&buy_sig),
        addr(OPERATOR),
        0,
        100,
    );
    assert_eq!(result, Err(ExchangeError::InvalidSignature));
    assert_eq!(ledger.owner_of(addr(NFT), 1), Some(seller.address));
    assert_eq!(ledger.token_balance(addr(TOKEN), buyer.address), 10_000);
}

/// Bundles fill incrementally across several buyers until exhausted, with
/// payment proportional to the items taken.
#[test]
fn bundle_fills_across_multiple_buyers() {
    let seller = Account::new(0x11);
    let alice = Account::new(0x22);
    let bob = Account::new(0x33);

    let mut ledger = InMemoryLedger::new();
    for id in 1..=4u128 {
        ledger.mint_item(addr(NFT), id, seller.address);
    }
    ledger.mint_token(addr(TOKEN), alice.address, 10_000);
    ledger.mint_token(addr(TOKEN), bob.address, 10_000);
    let registry = MemoryRoyaltyRegistry::new();

    // Four items priced 1000 as a whole
    let sell = Order::new(
        seller.address,
        Asset::bundle(&[addr(NFT)], &[vec![1, 2, 3, 4]]).expect("bundle encodes"),
        Asset::fungible(addr(TOKEN), 1_000),
        1,
    );
    let sell_sig = seller.sign(&sell);
    let mut engine = engine();

    // Alice takes one item for 250
    let alice_buy = Order::new(
        alice.address,
        Asset::fungible(addr(TOKEN), 250),
        Asset::bundle(&[addr(NFT)], &[vec![2]]).expect("bundle encodes"),
        2,
    );
    let result = engine
        .match_orders(
            &mut ledger,
            &registry,
            &sell,
            Some(&sell_sig),
            &alice_buy,
            None,
            alice.address,
            0,
            100,
        )
        .expect("first fill");
    assert_eq!((result.items_filled, result.paid_amount), (1, 250));

    // Bob takes the remaining three for 750
    let bob_buy = Order::new(
        bob.address,
        Asset::fungible(addr(TOKEN), 750),
        Asset::bundle(&[addr(NFT)], &[vec![1, 3, 4]]).expect("bundle encodes"),
        3,
    );
    let result = engine
        .match_orders(
            &mut ledger,
            &registry,
            &sell,
            Some(&sell_sig),
            &bob_buy,
            None,
            bob.address,
            0,
            100,
        )
        .expect("second fill");
    assert_eq!((result.items_filled, result.paid_amount), (3, 750));

    assert_eq!(ledger.owner_of(addr(NFT), 2), Some(alice.address));
    assert_eq!(ledger.owner_of(addr(NFT), 1), Some(bob.address));
    assert_eq!(engine.fill_of(&order_hash(&sell)), 4);

    // The bundle is spent; any further fill is a replay
    let replay = engine.match_orders(
        &mut ledger,
        &registry,
        &sell,
        Some(&sell_sig),
        &bob_buy,
        None,
        bob.address,
        0,
        100,
    );
    assert_eq!(replay, Err(ExchangeError::AlreadyFullyFilled));
}

/// A buyer whose ledger balance cannot cover its signed order is turned
/// away before anything moves, and the listing stays matchable.
#[test]
fn underfunded_buyer_is_rejected_without_movement() {
    let seller = Account::new(0x11);
    let buyer = Account::new(0x22);

    let mut ledger = InMemoryLedger::new();
    ledger.mint_item(addr(NFT), 1, seller.address);
    ledger.mint_token(addr(TOKEN), buyer.address, 499);
    let registry = MemoryRoyaltyRegistry::new();

    let sell = Order::new(
        seller.address,
        Asset::item(addr(NFT), 1),
        Asset::fungible(addr(TOKEN), 500),
        1,
    );
    let buy = Order::new(
        buyer.address,
        Asset::fungible(addr(TOKEN), 500),
        Asset::item(addr(NFT), 1),
        2,
    );
    let sell_sig = seller.sign(&sell);
    let buy_sig = buyer.sign(&buy);

    let mut engine = engine();
    assert_eq!(
        engine.match_orders(
            &mut ledger,
            &registry,
            &sell,
            Some(&sell_sig),
            &buy,
            Some(&buy_sig),
            addr(OPERATOR),
            0,
            100,
        ),
        Err(ExchangeError::InsufficientBalance)
    );
    assert_eq!(ledger.owner_of(addr(NFT), 1), Some(seller.address));
    assert_eq!(ledger.token_balance(addr(TOKEN), buyer.address), 499);
    assert_eq!(engine.fill_of(&order_hash(&sell)), 0);

    // Topping up the balance lets the same signed orders settle
    ledger.mint_token(addr(TOKEN), buyer.address, 1);
    engine
        .match_orders(
            &mut ledger,
            &registry,
            &sell,
            Some(&sell_sig),
            &buy,
            Some(&buy_sig),
            addr(OPERATOR),
            0,
            100,
        )
        .expect("funded match settles");
    assert_eq!(ledger.owner_of(addr(NFT), 1), Some(buyer.address));
}

/// A royalty entry past 100% drains the payment without corrupting it:
/// the recipient gets exactly the sale amount, the seller gets zero, and
/// value is conserved.
#[test]
fn over_100_percent_royalty_takes_at_most_the_payment() {
    let seller = Account::new(0x11);
    let buyer = Account::new(0x22);

    let mut ledger = InMemoryLedger::new();
    ledger.mint_item(addr(NFT), 1, seller.address);
    ledger.mint_token(addr(TOKEN), buyer.address, 1_000);

    let mut registry = MemoryRoyaltyRegistry::new();
    registry.set_collection_royalties(
        addr(NFT),
        vec![RoyaltyEntry { recipient: addr(0x30), bps: 15_000 }],
    );

    let sell = Order::new(
        seller.address,
        Asset::item(addr(NFT), 1),
        Asset::fungible(addr(TOKEN), 500),
        1,
    );
    let buy = Order::new(
        buyer.address,
        Asset::fungible(addr(TOKEN), 500),
        Asset::item(addr(NFT), 1),
        2,
    );
    let sell_sig = seller.sign(&sell);
    let buy_sig = buyer.sign(&buy);

    engine()
        .match_orders(
            &mut ledger,
            &registry,
            &sell,
            Some(&sell_sig),
            &buy,
            Some(&buy_sig),
            addr(OPERATOR),
            0,
            100,
        )
        .expect("match settles despite the misconfigured royalty");

    assert_eq!(ledger.owner_of(addr(NFT), 1), Some(buyer.address));
    assert_eq!(ledger.token_balance(addr(TOKEN), addr(0x30)), 500);
    assert_eq!(ledger.token_balance(addr(TOKEN), seller.address), 0);
    assert_eq!(ledger.token_balance(addr(TOKEN), addr(FEE_SINK)), 0);
    assert_eq!(ledger.token_balance(addr(TOKEN), buyer.address), 500);
}

/// Native sales require the attached value to cover the price; excess
/// attached value never reaches the ledger.
#[test]
fn native_sale_checks_attached_value() {
    let seller = Account::new(0x11);
    let buyer = Account::new(0x22);

    let mut ledger = InMemoryLedger::new();
    ledger.mint_item(addr(NFT), 1, seller.address);
    ledger.credit_native(buyer.address, 10_000);
    let registry = MemoryRoyaltyRegistry::new();

    let sell = Order::new(
        seller.address,
        Asset::item(addr(NFT), 1),
        Asset::native(400),
        1,
    );
    let sell_sig = seller.sign(&sell);
    let buy = Order::new(
        buyer.address,
        Asset::native(400),
        Asset::item(addr(NFT), 1),
        2,
    );

    let mut engine = engine();
    assert_eq!(
        engine.match_orders(
            &mut ledger,
            &registry,
            &sell,
            Some(&sell_sig),
            &buy,
            None,
            buyer.address,
            399,
            100,
        ),
        Err(ExchangeError::InsufficientAttachedValue)
    );

    engine
        .match_orders(
            &mut ledger,
            &registry,
            &sell,
            Some(&sell_sig),
            &buy,
            None,
            buyer.address,
            1_000,
            100,
        )
        .expect("covered match settles");

    // Exactly the price left the buyer, regardless of the attached excess
    assert_eq!(ledger.native_balance(buyer.address), 9_600);
}

// ============================================================================
// Floor bids
// ============================================================================

/// Create, partially fill, and cancel a token-funded floor bid; the buyer
/// ends with the purchased items plus the unspent escrow.
#[test]
fn floor_bid_full_lifecycle() {
    let buyer = addr(0x44);
    let seller = addr(0x55);

    let mut config = MarketplaceConfig::new(addr(ADMIN), addr(FEE_SINK));
    config
        .allow_payment_token(addr(ADMIN), addr(TOKEN))
        .expect("admin call");
    let mut matcher = FloorBidMatcher::new(config, addr(ESCROW));

    let mut ledger = InMemoryLedger::new();
    ledger.mint_token(addr(TOKEN), buyer, 10_000);
    for id in 1..=10u128 {
        ledger.mint_item(addr(NFT), id, seller);
    }
    let registry = MemoryRoyaltyRegistry::new();

    // 500 escrowed for up to 20 items: floor price 25
    let order_id = matcher
        .create_buy_order(
            &mut ledger,
            buyer,
            addr(NFT),
            addr(TOKEN),
            500,
            20,
            1_000,
            100,
        )
        .expect("bid opens");
    assert_eq!(ledger.token_balance(addr(TOKEN), addr(ESCROW)), 500);

    let gross = matcher
        .match_buy_order(&mut ledger, &registry, order_id, &[1, 2, 3, 4], seller, 200)
        .expect("items sell into the bid");
    assert_eq!(gross, 100);
    for id in 1..=4u128 {
        assert_eq!(ledger.owner_of(addr(NFT), id), Some(buyer));
    }
    // Per item: protocol 25% of 25 = 6, seller 19
    assert_eq!(ledger.token_balance(addr(TOKEN), seller), 76);

    let refund = matcher
        .cancel_order(&mut ledger, order_id, buyer)
        .expect("buyer cancels");
    assert_eq!(refund, 400);
    assert_eq!(ledger.token_balance(addr(TOKEN), buyer), 9_900);
    assert_eq!(ledger.token_balance(addr(TOKEN), addr(ESCROW)), 0);
    assert_eq!(
        matcher.order(order_id).expect("order persists").state,
        BuyOrderState::Cancelled
    );
}

/// Expired bids refuse matches but release their escrow to the buyer.
#[test]
fn floor_bid_expiry_and_withdrawal() {
    let buyer = addr(0x44);
    let seller = addr(0x55);

    let mut matcher = FloorBidMatcher::new(
        MarketplaceConfig::new(addr(ADMIN), addr(FEE_SINK)),
        addr(ESCROW),
    );
    let mut ledger = InMemoryLedger::new();
    ledger.credit_native(buyer, 1_000);
    ledger.mint_item(addr(NFT), 1, seller);
    let registry = MemoryRoyaltyRegistry::new();

    let order_id = matcher
        .create_buy_order_native(&mut ledger, buyer, addr(NFT), 600, 3, 500, 100)
        .expect("bid opens");

    assert_eq!(
        matcher.match_buy_order(&mut ledger, &registry, order_id, &[1], seller, 501),
        Err(ExchangeError::OrderExpired)
    );
    assert_eq!(
        matcher.withdraw_expired(&mut ledger, order_id, buyer, 500),
        Err(ExchangeError::OrderNotExpired)
    );

    let refund = matcher
        .withdraw_expired(&mut ledger, order_id, buyer, 501)
        .expect("withdrawal after expiry");
    assert_eq!(refund, 600);
    assert_eq!(ledger.native_balance(buyer), 1_000);
}

// ============================================================================
// Batch transfer
// ============================================================================

/// Batch transfers move everything or nothing.
#[test]
fn batch_transfer_is_all_or_nothing() {
    let engine = engine();
    let mut ledger = InMemoryLedger::new();
    let from = addr(0x44);
    let to = addr(0x55);

    for id in 1..=3u128 {
        ledger.mint_item(addr(NFT), id, from);
    }
    ledger.mint_item(addr(NFT), 4, addr(0x66));

    // One foreign item poisons the whole batch
    assert_eq!(
        engine.erc721_batch_transfer(
            &mut ledger,
            &[(addr(NFT), 1), (addr(NFT), 4)],
            from,
            to
        ),
        Err(ExchangeError::NotOwner)
    );
    assert_eq!(ledger.owner_of(addr(NFT), 1), Some(from));

    engine
        .erc721_batch_transfer(
            &mut ledger,
            &[(addr(NFT), 1), (addr(NFT), 2), (addr(NFT), 3)],
            from,
            to,
        )
        .expect("owned batch moves");
    assert_eq!(ledger.item_count(addr(NFT), to), 3);
}
