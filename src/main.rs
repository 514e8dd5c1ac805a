//! Exchange Core - Binary Entry Point
//!
//! Walks one negotiated match and one floor-bid fill against the in-memory
//! ledger, printing the resulting balances.

use exchange_core::config::MarketplaceConfig;
use exchange_core::engine::MatchingEngine;
use exchange_core::escrow::FloorBidMatcher;
use exchange_core::fees::{MemoryRoyaltyRegistry, RoyaltyEntry};
use exchange_core::ledger::{InMemoryLedger, Transfers};
use exchange_core::sign::{address_of, order_hash, OrderSignature};
use exchange_core::types::{Address, Asset, Order};
use k256::ecdsa::SigningKey;

fn main() {
    println!("===========================================");
    println!("  Exchange Core");
    println!("===========================================");
    println!();

    let admin = Address([0xAD; 20]);
    let fee_sink = Address([0xFE; 20]);
    let escrow = Address([0xEC; 20]);
    let buyer = Address([0x02; 20]);
    let collection = Address([0x10; 20]);

    let key = SigningKey::from_slice(&[0x42; 32]).expect("valid key bytes");
    let seller = address_of(key.verifying_key());

    let mut ledger = InMemoryLedger::new();
    ledger.credit_native(buyer, 10_000);
    for id in 1..=5u128 {
        ledger.mint_item(collection, id, seller);
    }

    let mut registry = MemoryRoyaltyRegistry::new();
    registry.set_collection_royalties(
        collection,
        vec![RoyaltyEntry {
            recipient: Address([0x30; 20]),
            bps: 1_000,
        }],
    );

    // ------------------------------------------------------------------
    // Negotiated match: seller signs a listing, buyer submits the match
    // ------------------------------------------------------------------
    println!("Matching a signed listing...");
    let sell = Order::new(seller, Asset::item(collection, 1), Asset::native(500), 1);
    let (sig, rid) = key
        .sign_prehash_recoverable(&order_hash(&sell))
        .expect("signing succeeds");
    let mut bytes = [0u8; 65];
    bytes[..64].copy_from_slice(&sig.to_bytes());
    bytes[64] = rid.to_byte();
    let sell_sig = OrderSignature(bytes);

    let buy = Order::new(buyer, Asset::native(500), Asset::item(collection, 1), 2);

    let mut engine = MatchingEngine::new(MarketplaceConfig::new(admin, fee_sink));
    match engine.match_orders(
        &mut ledger,
        &registry,
        &sell,
        Some(&sell_sig),
        &buy,
        None,
        buyer,
        500,
        100,
    ) {
        Ok(result) => {
            println!("  Items filled: {}", result.items_filled);
            println!("  Paid amount:  {}", result.paid_amount);
            println!("  Item 1 owner: {:?}", ledger.owner_of(collection, 1));
            println!("  Seller net:   {}", ledger.native_balance(seller));
            println!("  Royalties:    {}", ledger.native_balance(Address([0x30; 20])));
            println!("  Protocol fee: {}", ledger.native_balance(fee_sink));
        }
        Err(e) => println!("  ERROR: {e}"),
    }
    println!();

    // ------------------------------------------------------------------
    // Floor bid: buyer escrows 500 for up to 20 items, seller hits it
    // ------------------------------------------------------------------
    println!("Opening a floor bid...");
    let mut floor = FloorBidMatcher::new(MarketplaceConfig::new(admin, fee_sink), escrow);
    match floor.create_buy_order_native(&mut ledger, buyer, collection, 500, 20, 1_000, 100)
    {
        Ok(order_id) => {
            println!("  Bid id:       {order_id}");
            let order = floor.order(order_id).expect("just created");
            println!("  Floor price:  {}", order.floor_price());

            match floor.match_buy_order(&mut ledger, &registry, order_id, &[2, 3], seller, 200)
            {
                Ok(gross) => {
                    let order = floor.order(order_id).expect("still open");
                    println!("  Gross paid:   {gross}");
                    println!("  Remaining:    {}", order.remaining_amount);
                    println!("  Tokens taken: {}", order.tokens_filled);
                }
                Err(e) => println!("  ERROR: {e}"),
            }
        }
        Err(e) => println!("  ERROR: {e}"),
    }

    println!();
    println!("Run 'cargo test' to verify all tests pass.");
}
