//! Two-order matching engine.
//!
//! ## Matching Rules
//!
//! - Orders are privately negotiated: the caller submits its own order plus
//!   a counter-signed one, and the engine reconciles the two.
//! - Exactly one side offers non-fungible items (single or bundle); the
//!   other pays in native currency or a fungible token.
//! - Partial fills are supported: a payment order may buy a subset of a
//!   priced bundle, paying `price * items / total_items`, and fills
//!   accumulate per order hash until the order is exhausted.
//! - Fill records update before any external transfer is issued.
//!
//! ## Replay protection
//!
//! The per-order-hash fill record is the sole replay/over-fill guard:
//! cumulative filled quantity never exceeds the order's stated quantity,
//! and resubmitting an exhausted match fails with no state change.
//!
//! Seller ownership of every requested item and the buyer's ability to
//! fund the payment are verified before fill records change, so a
//! rejected match leaves no partial state behind.

use std::collections::HashMap;

use crate::config::MarketplaceConfig;
use crate::error::ExchangeError;
use crate::fees::{FeeResolver, Payout, RoyaltyRegistry};
use crate::ledger::Transfers;
use crate::sign::{order_hash, verify_order, OrderHash, OrderSignature};
use crate::types::{Address, Asset, DecodedAsset, Event, Order};

/// Outcome of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub left_hash: OrderHash,
    pub right_hash: OrderHash,
    /// Items that changed hands in this call.
    pub items_filled: u32,
    /// Payment consumed in this call, before deductions.
    pub paid_amount: u128,
}

/// The payment leg of a match, normalized across native and token payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaymentKind {
    Native,
    Token(Address),
}

/// One oriented view of the pair: who sells items, who pays.
struct Orientation<'a> {
    seller: &'a Order,
    seller_hash: OrderHash,
    buyer: &'a Order,
    buyer_hash: OrderHash,
}

/// Order matching engine with persistent per-order-hash fill tracking.
pub struct MatchingEngine {
    config: MarketplaceConfig,
    fills: HashMap<OrderHash, u128>,
    events: Vec<Event>,
}

impl MatchingEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: MarketplaceConfig) -> Self {
        Self {
            config,
            fills: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// The engine's configuration (mutators are admin-gated on the config
    /// itself).
    #[inline]
    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    /// Mutable configuration access.
    #[inline]
    pub fn config_mut(&mut self) -> &mut MarketplaceConfig {
        &mut self.config
    }

    /// Cumulative filled quantity recorded under an order hash.
    #[inline]
    pub fn fill_of(&self, hash: &OrderHash) -> u128 {
        self.fills.get(hash).copied().unwrap_or(0)
    }

    /// Drain accumulated event notifications.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // matchOrders
    // ========================================================================

    /// Validate and settle two complementary orders.
    ///
    /// `sender` is the transaction's direct initiator as attested by the
    /// execution environment; an order whose maker is the sender may omit
    /// its signature. `attached_value` is the native currency supplied with
    /// the call; it must cover a native payment leg and any excess stays
    /// with its sender. `now` is the external time oracle.
    #[allow(clippy::too_many_arguments)]
    pub fn match_orders(
        &mut self,
        ledger: &mut dyn Transfers,
        registry: &dyn RoyaltyRegistry,
        left: &Order,
        left_signature: Option<&OrderSignature>,
        right: &Order,
        right_signature: Option<&OrderSignature>,
        sender: Address,
        attached_value: u128,
        now: u64,
    ) -> Result<MatchResult, ExchangeError> {
        // Time windows
        left.check_window(now)?;
        right.check_window(now)?;

        // Authorization: each order is signed or submitted by its maker
        verify_order(left, left_signature, left.maker, Some(sender))?;
        verify_order(right, right_signature, right.maker, Some(sender))?;

        // Taker restrictions
        if matches!(left.taker, Some(t) if t != right.maker)
            || matches!(right.taker, Some(t) if t != left.maker)
        {
            return Err(ExchangeError::IncompatibleAssets);
        }

        let left_hash = order_hash(left);
        let right_hash = order_hash(right);

        let orientation = orient(left, left_hash, right, right_hash)?;
        let seller = orientation.seller;
        let buyer = orientation.buyer;

        // Payment leg must agree in kind and identity
        let payment = payment_kind(&seller.take_asset)?;
        if payment_kind(&buyer.make_asset)? != payment {
            return Err(ExchangeError::IncompatibleAssets);
        }

        // Offered and requested item sets
        let offered = seller.make_asset.decode_items()?;
        let total_items = offered.total_items();
        if seller.make_asset.quantity != total_items as u128 {
            return Err(ExchangeError::MalformedAsset);
        }
        if total_items > self.config.max_bundle_size {
            return Err(ExchangeError::BundleTooLarge);
        }

        let requested = buyer.take_asset.decode_items()?;
        let items_filled = requested.total_items();
        if items_filled == 0 || buyer.take_asset.quantity != items_filled as u128 {
            return Err(ExchangeError::MalformedAsset);
        }
        if !offered.contains_all(&requested) {
            return Err(ExchangeError::IncompatibleAssets);
        }

        // Fill headroom on both sides
        let sold = self.fill_of(&orientation.seller_hash);
        let remaining_items = (total_items as u128).saturating_sub(sold);
        if remaining_items == 0 || items_filled as u128 > remaining_items {
            return Err(ExchangeError::AlreadyFullyFilled);
        }

        let price = seller.take_asset.quantity;
        let paid_amount = price * items_filled as u128 / total_items as u128;

        let spent = self.fill_of(&orientation.buyer_hash);
        if spent >= buyer.make_asset.quantity
            || spent + paid_amount > buyer.make_asset.quantity
        {
            return Err(ExchangeError::AlreadyFullyFilled);
        }

        if payment == PaymentKind::Native && attached_value < paid_amount {
            return Err(ExchangeError::InsufficientAttachedValue);
        }

        // The settlement must be fully fundable before any state changes:
        // the seller still owns every requested item and the buyer covers
        // the full payment.
        for (collection, item_id) in requested.items() {
            if ledger.owner_of(collection, item_id) != Some(seller.maker) {
                return Err(ExchangeError::NotOwner);
            }
        }
        let buyer_funds = match payment {
            PaymentKind::Native => ledger.native_balance(buyer.maker),
            PaymentKind::Token(token) => ledger.token_balance(token, buyer.maker),
        };
        if buyer_funds < paid_amount {
            return Err(ExchangeError::InsufficientBalance);
        }

        // Deduction schedule: resolve per item at its bundle share, splits
        // taken from the payment-receiving order's data; division dust goes
        // to the seller.
        let splits = seller.payout_splits()?;
        let resolver = FeeResolver::new(&self.config);
        let share = paid_amount / items_filled as u128;
        let dust = paid_amount - share * items_filled as u128;

        let mut payouts: Vec<Payout> = Vec::new();
        let mut seller_proceeds = dust;
        for (collection, item_id) in requested.items() {
            let schedule = resolver.resolve(registry, share, collection, item_id, &splits);
            payouts.extend(schedule.payouts);
            seller_proceeds += schedule.remainder;
        }

        // Internal state updates strictly before external transfers
        *self.fills.entry(orientation.seller_hash).or_default() += items_filled as u128;
        *self.fills.entry(orientation.buyer_hash).or_default() += paid_amount;

        // Item movement: seller -> buyer
        for (collection, item_id) in requested.items() {
            ledger.transfer_item(collection, item_id, seller.maker, buyer.maker)?;
        }

        // Payment movement: buyer -> deduction recipients, remainder -> seller
        pay(ledger, payment, buyer.maker, &payouts, seller.maker, seller_proceeds)?;

        self.events.push(Event::Match {
            left_hash,
            right_hash,
            fill_amount: paid_amount,
        });

        Ok(MatchResult {
            left_hash,
            right_hash,
            items_filled: items_filled as u32,
            paid_amount,
        })
    }

    // ========================================================================
    // Batch transfer
    // ========================================================================

    /// Move up to the configured maximum of caller-owned single items to
    /// `to` in one call.
    ///
    /// Ownership is checked for every item before anything moves, so a
    /// failure transfers nothing.
    pub fn erc721_batch_transfer(
        &self,
        ledger: &mut dyn Transfers,
        items: &[(Address, u128)],
        caller: Address,
        to: Address,
    ) -> Result<(), ExchangeError> {
        if items.len() > self.config.max_batch_transfer {
            return Err(ExchangeError::BatchTooLarge);
        }
        for (collection, item_id) in items {
            if ledger.owner_of(*collection, *item_id) != Some(caller) {
                return Err(ExchangeError::NotOwner);
            }
        }
        for (collection, item_id) in items {
            ledger.transfer_item(*collection, *item_id, caller, to)?;
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Decide which order sells items and which pays.
fn orient<'a>(
    left: &'a Order,
    left_hash: OrderHash,
    right: &'a Order,
    right_hash: OrderHash,
) -> Result<Orientation<'a>, ExchangeError> {
    let left_sells = left.make_asset.kind.is_items() && left.take_asset.kind.is_payment();
    let right_sells =
        right.make_asset.kind.is_items() && right.take_asset.kind.is_payment();

    match (left_sells, right_sells) {
        (true, false) if right.make_asset.kind.is_payment() => Ok(Orientation {
            seller: left,
            seller_hash: left_hash,
            buyer: right,
            buyer_hash: right_hash,
        }),
        (false, true) if left.make_asset.kind.is_payment() => Ok(Orientation {
            seller: right,
            seller_hash: right_hash,
            buyer: left,
            buyer_hash: left_hash,
        }),
        _ => Err(ExchangeError::IncompatibleAssets),
    }
}

/// Normalize a payment-leg asset to its kind and identity.
fn payment_kind(asset: &Asset) -> Result<PaymentKind, ExchangeError> {
    match asset.decode_payload()? {
        DecodedAsset::Native => Ok(PaymentKind::Native),
        DecodedAsset::FungibleToken { contract } => Ok(PaymentKind::Token(contract)),
        _ => Err(ExchangeError::IncompatibleAssets),
    }
}

/// Issue the payment transfers for one deduction schedule.
fn pay(
    ledger: &mut dyn Transfers,
    payment: PaymentKind,
    payer: Address,
    payouts: &[Payout],
    seller: Address,
    seller_proceeds: u128,
) -> Result<(), ExchangeError> {
    let mut send = |to: Address, amount: u128| match payment {
        PaymentKind::Native => ledger.transfer_native(payer, to, amount),
        PaymentKind::Token(token) => ledger.transfer_token(token, payer, to, amount),
    };
    for payout in payouts {
        send(payout.recipient, payout.amount)?;
    }
    send(seller, seller_proceeds)
}

// ============================================================================
// Unit Tests
// ============================================================================
