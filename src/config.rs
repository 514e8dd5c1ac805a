//! Marketplace configuration surface.
//!
//! All limits and fee parameters are set at construction and mutable only
//! by the administrative identity. Both the matching engine and the
//! floor-bid matcher are constructed with a [`MarketplaceConfig`]; each
//! owns its copy, mirroring independently initialized subsystems.

use std::collections::HashSet;

use crate::error::ExchangeError;
use crate::types::Address;

/// Default protocol fee: 2500 bps = 25%.
pub const DEFAULT_PROTOCOL_FEE_BPS: u16 = 2_500;

/// Default maximum number of items in a single bundle.
pub const DEFAULT_MAX_BUNDLE_SIZE: usize = 10;

/// Default maximum tokens a single floor bid may absorb.
pub const DEFAULT_MAX_FLOOR_BID_TOKENS: u32 = 20;

/// Default maximum items per batch transfer call.
pub const DEFAULT_MAX_BATCH_TRANSFER: usize = 50;

/// Default maximum payout-split entries applied per order.
pub const DEFAULT_MAX_PAYOUT_SPLITS: usize = 10;

/// Administrative configuration for the exchange subsystems.
///
/// Mutators take the caller's identity and fail with
/// [`ExchangeError::NotOwner`] unless it matches the admin set at
/// construction.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Administrative identity allowed to mutate this configuration.
    admin: Address,

    /// Protocol fee in basis points, applied inside the fee cascade.
    pub protocol_fee_bps: u16,

    /// Recipient of the protocol fee.
    pub protocol_fee_recipient: Address,

    /// Maximum total items across all collections in one bundle.
    pub max_bundle_size: usize,

    /// Maximum tokens a single floor-bid order may request.
    pub max_floor_bid_tokens: u32,

    /// Maximum single items moved by one batch transfer call.
    pub max_batch_transfer: usize,

    /// Maximum payout-split entries applied from order data.
    pub max_payout_splits: usize,

    /// Fungible tokens accepted as floor-bid payment.
    allowed_payment_tokens: HashSet<Address>,

    /// Identities allowed to drive the transfer collaborators.
    operators: HashSet<Address>,
}

impl MarketplaceConfig {
    /// Create a configuration with the default limits.
    pub fn new(admin: Address, protocol_fee_recipient: Address) -> Self {
        Self {
            admin,
            protocol_fee_bps: DEFAULT_PROTOCOL_FEE_BPS,
            protocol_fee_recipient,
            max_bundle_size: DEFAULT_MAX_BUNDLE_SIZE,
            max_floor_bid_tokens: DEFAULT_MAX_FLOOR_BID_TOKENS,
            max_batch_transfer: DEFAULT_MAX_BATCH_TRANSFER,
            max_payout_splits: DEFAULT_MAX_PAYOUT_SPLITS,
            allowed_payment_tokens: HashSet::new(),
            operators: HashSet::new(),
        }
    }

    /// The administrative identity.
    #[inline]
    pub fn admin(&self) -> Address {
        self.admin
    }

    fn require_admin(&self, caller: Address) -> Result<(), ExchangeError> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(ExchangeError::NotOwner)
        }
    }

    // ========================================================================
    // Admin-gated mutators
    // ========================================================================

    /// Update the protocol fee in basis points.
    pub fn set_protocol_fee(
        &mut self,
        caller: Address,
        bps: u16,
    ) -> Result<(), ExchangeError> {
        self.require_admin(caller)?;
        self.protocol_fee_bps = bps;
        Ok(())
    }

    /// Update the protocol fee recipient.
    pub fn set_protocol_fee_recipient(
        &mut self,
        caller: Address,
        recipient: Address,
    ) -> Result<(), ExchangeError> {
        self.require_admin(caller)?;
        self.protocol_fee_recipient = recipient;
        Ok(())
    }

    /// Update the maximum bundle size.
    pub fn set_max_bundle_size(
        &mut self,
        caller: Address,
        max: usize,
    ) -> Result<(), ExchangeError> {
        self.require_admin(caller)?;
        self.max_bundle_size = max;
        Ok(())
    }

    /// Update the per-order floor-bid token cap.
    pub fn set_max_floor_bid_tokens(
        &mut self,
        caller: Address,
        max: u32,
    ) -> Result<(), ExchangeError> {
        self.require_admin(caller)?;
        self.max_floor_bid_tokens = max;
        Ok(())
    }

    /// Update the batch transfer limit.
    pub fn set_max_batch_transfer(
        &mut self,
        caller: Address,
        max: usize,
    ) -> Result<(), ExchangeError> {
        self.require_admin(caller)?;
        self.max_batch_transfer = max;
        Ok(())
    }

    /// Add a fungible token to the floor-bid payment allow-list.
    pub fn allow_payment_token(
        &mut self,
        caller: Address,
        token: Address,
    ) -> Result<(), ExchangeError> {
        self.require_admin(caller)?;
        self.allowed_payment_tokens.insert(token);
        Ok(())
    }

    /// Remove a fungible token from the floor-bid payment allow-list.
    pub fn revoke_payment_token(
        &mut self,
        caller: Address,
        token: Address,
    ) -> Result<(), ExchangeError> {
        self.require_admin(caller)?;
        self.allowed_payment_tokens.remove(&token);
        Ok(())
    }

    /// Authorize an operator for the transfer collaborators.
    pub fn add_operator(
        &mut self,
        caller: Address,
        operator: Address,
    ) -> Result<(), ExchangeError> {
        self.require_admin(caller)?;
        self.operators.insert(operator);
        Ok(())
    }

    /// Revoke an operator.
    pub fn remove_operator(
        &mut self,
        caller: Address,
        operator: Address,
    ) -> Result<(), ExchangeError> {
        self.require_admin(caller)?;
        self.operators.remove(&operator);
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether the token is accepted as floor-bid payment.
    #[inline]
    pub fn is_payment_token_allowed(&self, token: Address) -> bool {
        self.allowed_payment_tokens.contains(&token)
    }

    /// Whether the identity is an authorized operator.
    #[inline]
    pub fn is_operator(&self, operator: Address) -> bool {
        self.operators.contains(&operator)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
