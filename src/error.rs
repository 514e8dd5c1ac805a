//! Error taxonomy for the exchange core.
//!
//! Every failure here is a local, non-retryable validation error surfaced
//! synchronously to the caller. No operation leaves partial state behind:
//! all internal bookkeeping happens before external transfers are issued,
//! and every validation runs before either.

use thiserror::Error;

/// Errors returned by the matching engine, the floor-bid matcher,
/// the asset codec, and the ledger collaborators.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeError {
    /// An asset payload does not decode unambiguously for its kind,
    /// or encode-side lengths/quantities are inconsistent.
    #[error("malformed asset payload")]
    MalformedAsset,

    /// Neither a valid recovered signature nor the initiator-is-maker
    /// shortcut authorizes the order.
    #[error("invalid order signature")]
    InvalidSignature,

    /// The order's start timestamp is in the future.
    #[error("order not yet started")]
    OrderNotYetStarted,

    /// The order's end timestamp has passed (or the escrow order is no
    /// longer active).
    #[error("order expired")]
    OrderExpired,

    /// The two orders' make/take sides do not line up by kind, identity,
    /// quantity, or taker restriction.
    #[error("orders have incompatible assets")]
    IncompatibleAssets,

    /// A bundle's total item count exceeds the configured maximum.
    #[error("bundle exceeds maximum size")]
    BundleTooLarge,

    /// A batch operation exceeds its configured limit (batch transfer size,
    /// or floor-bid token headroom).
    #[error("batch exceeds configured limit")]
    BatchTooLarge,

    /// The attached native value does not cover the required payment.
    #[error("insufficient attached native value")]
    InsufficientAttachedValue,

    /// The requested fill would exceed the order's stated quantity.
    #[error("order already fully filled")]
    AlreadyFullyFilled,

    /// Caller is not the owner of the resource it is acting on (item
    /// transfer, escrow cancel/withdraw, admin configuration).
    #[error("caller is not the owner")]
    NotOwner,

    /// The chosen payment token is not on the configured allow-list.
    #[error("unsupported payment token")]
    UnsupportedPaymentToken,

    /// Withdrawal attempted before the escrow order's end timestamp.
    #[error("order has not expired yet")]
    OrderNotExpired,

    /// The escrow order holds no remaining funds to refund.
    #[error("nothing to withdraw")]
    NothingToWithdraw,

    /// The ledger collaborator cannot fund a transfer.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// No escrow order exists under the given id.
    #[error("unknown order id")]
    UnknownOrder,
}
