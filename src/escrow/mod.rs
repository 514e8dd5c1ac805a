//! Escrow-backed floor bids.
//!
//! A floor bid is a standing offer to buy up to `max_tokens` items from a
//! single collection, any item accepted, funded up front into an escrow
//! account. Sellers hit the bid with whatever items they hold; each item
//! pays out at the current floor price
//!
//! ```text
//! price = remaining_amount / (max_tokens - tokens_filled)
//! ```
//!
//! recomputed per match, so the per-item price never drifts as the bid
//! fills. Proceeds run through the same deduction cascade as negotiated
//! matches. The buyer can cancel an open bid at any time or reclaim the
//! remaining escrow after expiry; either way the funds flow back whole.
//!
//! Escrow state advances before any transfer is issued, so a failed
//! transfer can never leave a bid double-spendable.

use slab::Slab;

use crate::config::MarketplaceConfig;
use crate::error::ExchangeError;
use crate::fees::{FeeResolver, RoyaltyRegistry};
use crate::ledger::Transfers;
use crate::types::{Address, Event};

// ============================================================================
// Buy order state
// ============================================================================

/// Lifecycle state of a floor bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuyOrderState {
    /// Accepting matches (subject to expiry).
    #[default]
    Open,
    /// Cancelled by the buyer; escrow refunded.
    Cancelled,
    /// Expired and withdrawn; escrow refunded.
    Expired,
}

impl BuyOrderState {
    /// Convert to u8 for serialization.
    pub fn to_u8(self) -> u8 {
        match self {
            BuyOrderState::Open => 0,
            BuyOrderState::Cancelled => 1,
            BuyOrderState::Expired => 2,
        }
    }

    /// Convert from u8 for deserialization.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(BuyOrderState::Open),
            1 => Some(BuyOrderState::Cancelled),
            2 => Some(BuyOrderState::Expired),
            _ => None,
        }
    }
}

/// How a floor bid is funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentLeg {
    Native,
    Token(Address),
}

// ============================================================================
// BuyOrder
// ============================================================================

/// One escrowed floor bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyOrder {
    /// Stable identifier assigned at creation, starting from 1.
    pub id: u64,
    /// The bidding party; the only identity allowed to cancel or withdraw.
    pub buyer: Address,
    /// Collection whose items the bid accepts.
    pub collection: Address,
    /// Funding currency.
    pub payment: PaymentLeg,
    /// Escrowed at creation.
    pub total_amount: u128,
    /// Escrow not yet consumed by matches or refunds.
    pub remaining_amount: u128,
    /// Maximum items this bid absorbs.
    pub max_tokens: u32,
    /// Items matched so far.
    pub tokens_filled: u32,
    /// Expiry timestamp (seconds); matches fail strictly after it.
    pub end: u64,
    /// Lifecycle state.
    pub state: BuyOrderState,
}

impl BuyOrder {
    /// Items the bid can still absorb.
    #[inline]
    pub fn tokens_needed(&self) -> u32 {
        self.max_tokens - self.tokens_filled
    }

    /// Current per-item price, `remaining / needed`, truncating.
    /// Zero once the bid cannot absorb more items.
    pub fn floor_price(&self) -> u128 {
        match self.tokens_needed() {
            0 => 0,
            needed => self.remaining_amount / needed as u128,
        }
    }
}

// ============================================================================
// FloorBidMatcher
// ============================================================================

/// Floor-bid order store and matcher, slab-backed for dense ids.
pub struct FloorBidMatcher {
    config: MarketplaceConfig,
    escrow_account: Address,
    orders: Slab<BuyOrder>,
    events: Vec<Event>,
}

impl FloorBidMatcher {
    /// Create a matcher escrowing funds under `escrow_account`.
    pub fn new(config: MarketplaceConfig, escrow_account: Address) -> Self {
        Self {
            config,
            escrow_account,
            orders: Slab::new(),
            events: Vec::new(),
        }
    }

    /// The matcher's configuration.
    #[inline]
    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    /// Mutable configuration access.
    #[inline]
    pub fn config_mut(&mut self) -> &mut MarketplaceConfig {
        &mut self.config
    }

    /// The identity holding escrowed funds.
    #[inline]
    pub fn escrow_account(&self) -> Address {
        self.escrow_account
    }

    /// Total bids ever created (ids run from 1 to this count).
    #[inline]
    pub fn orders_count(&self) -> u64 {
        self.orders.len() as u64
    }

    /// Look up a bid by id.
    pub fn order(&self, order_id: u64) -> Option<&BuyOrder> {
        let key = (order_id as usize).checked_sub(1)?;
        self.orders.get(key)
    }

    /// Drain accumulated event notifications.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn order_mut(&mut self, order_id: u64) -> Result<&mut BuyOrder, ExchangeError> {
        (order_id as usize)
            .checked_sub(1)
            .and_then(|key| self.orders.get_mut(key))
            .ok_or(ExchangeError::UnknownOrder)
    }

    // ========================================================================
    // createBuyOrder
    // ========================================================================

    /// Escrow `amount` of `token` for a floor bid on `collection`.
    ///
    /// The token must be on the payment allow-list. `end` must lie in the
    /// future and `max_tokens` within the configured cap.
    #[allow(clippy::too_many_arguments)]
    pub fn create_buy_order(
        &mut self,
        ledger: &mut dyn Transfers,
        buyer: Address,
        collection: Address,
        token: Address,
        amount: u128,
        max_tokens: u32,
        end: u64,
        now: u64,
    ) -> Result<u64, ExchangeError> {
        if !self.config.is_payment_token_allowed(token) {
            return Err(ExchangeError::UnsupportedPaymentToken);
        }
        self.create_order(
            ledger,
            buyer,
            collection,
            PaymentLeg::Token(token),
            amount,
            max_tokens,
            end,
            now,
        )
    }

    /// Escrow attached native currency for a floor bid on `collection`.
    pub fn create_buy_order_native(
        &mut self,
        ledger: &mut dyn Transfers,
        buyer: Address,
        collection: Address,
        attached_value: u128,
        max_tokens: u32,
        end: u64,
        now: u64,
    ) -> Result<u64, ExchangeError> {
        self.create_order(
            ledger,
            buyer,
            collection,
            PaymentLeg::Native,
            attached_value,
            max_tokens,
            end,
            now,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn create_order(
        &mut self,
        ledger: &mut dyn Transfers,
        buyer: Address,
        collection: Address,
        payment: PaymentLeg,
        amount: u128,
        max_tokens: u32,
        end: u64,
        now: u64,
    ) -> Result<u64, ExchangeError> {
        if end <= now {
            return Err(ExchangeError::OrderExpired);
        }
        if max_tokens == 0 || max_tokens > self.config.max_floor_bid_tokens {
            return Err(ExchangeError::BatchTooLarge);
        }
        if amount == 0 {
            return Err(ExchangeError::InsufficientAttachedValue);
        }

        // Fund the escrow before the bid becomes visible
        match payment {
            PaymentLeg::Native => {
                ledger.transfer_native(buyer, self.escrow_account, amount)?
            }
            PaymentLeg::Token(token) => {
                ledger.transfer_token(token, buyer, self.escrow_account, amount)?
            }
        }

        let key = self.orders.insert(BuyOrder {
            id: 0, // patched below once the slab key is known
            buyer,
            collection,
            payment,
            total_amount: amount,
            remaining_amount: amount,
            max_tokens,
            tokens_filled: 0,
            end,
            state: BuyOrderState::Open,
        });
        let order_id = key as u64 + 1;
        self.orders[key].id = order_id;

        self.events.push(Event::CreateBuyOrder {
            order_id,
            buyer,
            amount,
        });
        Ok(order_id)
    }

    // ========================================================================
    // matchBuyOrder
    // ========================================================================

    /// Sell `item_ids` from the bid's collection into the bid at the
    /// current floor price. Returns the gross amount consumed from escrow.
    ///
    /// All items are ownership-checked before anything moves; escrow state
    /// updates before the transfers are issued.
    pub fn match_buy_order(
        &mut self,
        ledger: &mut dyn Transfers,
        registry: &dyn RoyaltyRegistry,
        order_id: u64,
        item_ids: &[u128],
        seller: Address,
        now: u64,
    ) -> Result<u128, ExchangeError> {
        let resolver = FeeResolver::new(&self.config);
        let escrow_account = self.escrow_account;

        let order = self.order_mut(order_id)?;
        if order.state != BuyOrderState::Open {
            return Err(ExchangeError::OrderExpired);
        }
        if now > order.end {
            return Err(ExchangeError::OrderExpired);
        }
        if order.tokens_needed() == 0 || order.remaining_amount == 0 {
            return Err(ExchangeError::AlreadyFullyFilled);
        }
        if item_ids.is_empty() {
            return Err(ExchangeError::MalformedAsset);
        }
        let n = u32::try_from(item_ids.len())
            .map_err(|_| ExchangeError::BatchTooLarge)?;
        if n > order.tokens_needed() {
            return Err(ExchangeError::BatchTooLarge);
        }

        let price = order.floor_price();
        if price == 0 {
            return Err(ExchangeError::AlreadyFullyFilled);
        }
        let gross = price * n as u128;

        let collection = order.collection;
        let buyer = order.buyer;
        let payment = order.payment;

        // Every item must belong to the seller before anything moves
        for item_id in item_ids {
            if ledger.owner_of(collection, *item_id) != Some(seller) {
                return Err(ExchangeError::NotOwner);
            }
        }

        // Deduction schedule per item at the floor price, no payout splits
        let mut payouts = Vec::new();
        let mut seller_proceeds = 0u128;
        for item_id in item_ids {
            let schedule = resolver.resolve(registry, price, collection, *item_id, &[]);
            payouts.extend(schedule.payouts);
            seller_proceeds += schedule.remainder;
        }

        // Escrow state strictly before transfers
        order.remaining_amount -= gross;
        order.tokens_filled += n;

        for item_id in item_ids {
            ledger.transfer_item(collection, *item_id, seller, buyer)?;
        }
        let mut send = |to: Address, amount: u128| match payment {
            PaymentLeg::Native => ledger.transfer_native(escrow_account, to, amount),
            PaymentLeg::Token(token) => {
                ledger.transfer_token(token, escrow_account, to, amount)
            }
        };
        for payout in &payouts {
            send(payout.recipient, payout.amount)?;
        }
        send(seller, seller_proceeds)?;

        self.events.push(Event::MatchBuyOrder {
            order_id,
            item_ids: item_ids.to_vec(),
            amount: gross,
        });
        Ok(gross)
    }

    // ========================================================================
    // cancelOrder / withdrawFundsFromExpiredOrder
    // ========================================================================

    /// Cancel an open bid and refund the remaining escrow to the buyer.
    /// Only the buyer may cancel. Returns the refunded amount.
    pub fn cancel_order(
        &mut self,
        ledger: &mut dyn Transfers,
        order_id: u64,
        caller: Address,
    ) -> Result<u128, ExchangeError> {
        let escrow_account = self.escrow_account;
        let order = self.order_mut(order_id)?;
        if caller != order.buyer {
            return Err(ExchangeError::NotOwner);
        }
        if order.state != BuyOrderState::Open || order.remaining_amount == 0 {
            return Err(ExchangeError::NothingToWithdraw);
        }

        let refund = order.remaining_amount;
        let buyer = order.buyer;
        let payment = order.payment;
        order.remaining_amount = 0;
        order.state = BuyOrderState::Cancelled;

        match payment {
            PaymentLeg::Native => {
                ledger.transfer_native(escrow_account, buyer, refund)?
            }
            PaymentLeg::Token(token) => {
                ledger.transfer_token(token, escrow_account, buyer, refund)?
            }
        }

        self.events.push(Event::CancelOrder { order_id });
        Ok(refund)
    }

    /// Reclaim the remaining escrow of an expired bid. Only the buyer may
    /// withdraw, and only strictly after expiry. Returns the refunded
    /// amount.
    pub fn withdraw_expired(
        &mut self,
        ledger: &mut dyn Transfers,
        order_id: u64,
        caller: Address,
        now: u64,
    ) -> Result<u128, ExchangeError> {
        let escrow_account = self.escrow_account;
        let order = self.order_mut(order_id)?;
        if caller != order.buyer {
            return Err(ExchangeError::NotOwner);
        }
        if now <= order.end {
            return Err(ExchangeError::OrderNotExpired);
        }
        if order.state != BuyOrderState::Open || order.remaining_amount == 0 {
            return Err(ExchangeError::NothingToWithdraw);
        }

        let refund = order.remaining_amount;
        let buyer = order.buyer;
        let payment = order.payment;
        order.remaining_amount = 0;
        order.state = BuyOrderState::Expired;

        match payment {
            PaymentLeg::Native => {
                ledger.transfer_native(escrow_account, buyer, refund)?
            }
            PaymentLeg::Token(token) => {
                ledger.transfer_token(token, escrow_account, buyer, refund)?
            }
        }

        self.events.push(Event::TokenWithdrawal {
            order_id,
            amount: refund,
        });
        Ok(refund)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
