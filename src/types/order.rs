//! Order type and the payout-split order-data codec.
//!
//! An order describes the asset its maker offers (`make_asset`) and the
//! asset it wants back (`take_asset`), with a validity window, a salt, and
//! optional data. The only data format interpreted by the engine is the
//! payout-split list, selected by [`DataKind::PayoutSplits`]; it instructs
//! the fee cascade how to split the seller's proceeds.

use crate::error::ExchangeError;
use crate::types::asset::{Address, Asset, ADDRESS_BYTES};

// ============================================================================
// DataKind
// ============================================================================

/// Tag selecting how an order's `data` field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataKind {
    /// No interpreted data.
    #[default]
    None,
    /// `data` carries an encoded payout-split list.
    PayoutSplits,
}

impl DataKind {
    /// Convert to u8 for serialization.
    pub fn to_u8(self) -> u8 {
        match self {
            DataKind::None => 0,
            DataKind::PayoutSplits => 1,
        }
    }

    /// Convert from u8 for deserialization.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DataKind::None),
            1 => Some(DataKind::PayoutSplits),
            _ => None,
        }
    }
}

// ============================================================================
// Payout splits
// ============================================================================

/// One payout-split entry: `bps` of the running remainder to `recipient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutSplit {
    pub recipient: Address,
    pub bps: u16,
}

/// Encode a payout-split list into order data bytes.
///
/// Layout: u16 entry count, then 20-byte recipient + u16 bps per entry,
/// all big-endian.
pub fn encode_order_data(splits: &[PayoutSplit]) -> Result<Vec<u8>, ExchangeError> {
    let count =
        u16::try_from(splits.len()).map_err(|_| ExchangeError::MalformedAsset)?;
    let mut out = Vec::with_capacity(2 + splits.len() * (ADDRESS_BYTES + 2));
    out.extend_from_slice(&count.to_be_bytes());
    for split in splits {
        out.extend_from_slice(&split.recipient.0);
        out.extend_from_slice(&split.bps.to_be_bytes());
    }
    Ok(out)
}

/// Decode order data bytes back into a payout-split list.
pub fn decode_order_data(bytes: &[u8]) -> Result<Vec<PayoutSplit>, ExchangeError> {
    const ENTRY: usize = ADDRESS_BYTES + 2;

    if bytes.len() < 2 {
        return Err(ExchangeError::MalformedAsset);
    }
    let count = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    let body = &bytes[2..];
    if body.len() != count * ENTRY {
        return Err(ExchangeError::MalformedAsset);
    }

    let mut splits = Vec::with_capacity(count);
    for chunk in body.chunks_exact(ENTRY) {
        let mut recipient = [0u8; ADDRESS_BYTES];
        recipient.copy_from_slice(&chunk[..ADDRESS_BYTES]);
        let bps = u16::from_be_bytes([chunk[ADDRESS_BYTES], chunk[ADDRESS_BYTES + 1]]);
        splits.push(PayoutSplit {
            recipient: Address(recipient),
            bps,
        });
    }
    Ok(splits)
}

// ============================================================================
// Order
// ============================================================================

/// A signed exchange order.
///
/// ## Validity window
///
/// `start <= now <= end` must hold at match time; `end == 0` means the
/// order never expires.
///
/// ## Taker restriction
///
/// `taker == None` lets anyone fill the order; `Some(identity)` restricts
/// the counterparty's maker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Order {
    /// The party that authorized this order.
    pub maker: Address,

    /// The asset the maker gives up.
    pub make_asset: Asset,

    /// Optional counterparty restriction.
    pub taker: Option<Address>,

    /// The asset the maker wants in return.
    pub take_asset: Asset,

    /// Uniqueness nonce; nonzero for orders that must stay individually
    /// revocable.
    pub salt: u128,

    /// Earliest match timestamp (seconds).
    pub start: u64,

    /// Latest match timestamp (seconds); 0 = never expires.
    pub end: u64,

    /// How `data` is interpreted.
    pub data_kind: DataKind,

    /// Auxiliary data, currently only payout splits.
    pub data: Vec<u8>,
}

impl Order {
    /// Create an order with no taker restriction and no data.
    pub fn new(maker: Address, make_asset: Asset, take_asset: Asset, salt: u128) -> Self {
        Self {
            maker,
            make_asset,
            taker: None,
            take_asset,
            salt,
            start: 0,
            end: 0,
            data_kind: DataKind::None,
            data: Vec::new(),
        }
    }

    /// Attach a payout-split list to this order.
    pub fn with_payout_splits(
        mut self,
        splits: &[PayoutSplit],
    ) -> Result<Self, ExchangeError> {
        self.data = encode_order_data(splits)?;
        self.data_kind = DataKind::PayoutSplits;
        Ok(self)
    }

    /// Restrict the counterparty maker.
    pub fn with_taker(mut self, taker: Address) -> Self {
        self.taker = Some(taker);
        self
    }

    /// Set the validity window.
    pub fn with_window(mut self, start: u64, end: u64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Check the validity window against the supplied time oracle.
    pub fn check_window(&self, now: u64) -> Result<(), ExchangeError> {
        if self.start > now {
            return Err(ExchangeError::OrderNotYetStarted);
        }
        if self.end != 0 && now > self.end {
            return Err(ExchangeError::OrderExpired);
        }
        Ok(())
    }

    /// The payout splits carried by this order, empty unless `data_kind`
    /// selects the split format.
    pub fn payout_splits(&self) -> Result<Vec<PayoutSplit>, ExchangeError> {
        match self.data_kind {
            DataKind::None => Ok(Vec::new()),
            DataKind::PayoutSplits => decode_order_data(&self.data),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
