//! Order hashing and signature verification.
//!
//! ## Order digest
//!
//! [`order_hash`] is a domain-separated SHA-256 over every economically
//! meaningful order field. Variable-length fields (payloads, data) are
//! length-prefixed, so the preimage encoding is injective: changing any
//! field changes the digest.
//!
//! ## Authorization
//!
//! An order is authorized when either
//!
//! 1. a recoverable secp256k1 signature over the digest recovers the
//!    claimed signer, or
//! 2. the execution environment attests that the claimed signer is the
//!    transaction's direct initiator and that initiator is the order's
//!    maker (a maker submitting in person skips off-band signing).
//!
//! Identities are derived from public keys as the last 20 bytes of the
//! SHA-256 of the uncompressed curve point.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::error::ExchangeError;
use crate::types::{Address, Asset, Order};

/// Domain separator for order digests.
const ORDER_DOMAIN: &[u8] = b"exchange-core/order/v1";

/// A 32-byte order digest.
pub type OrderHash = [u8; 32];

// ============================================================================
// Hashing
// ============================================================================

fn hash_asset(hasher: &mut Sha256, asset: &Asset) {
    hasher.update([asset.kind.to_u8()]);
    hasher.update((asset.payload.len() as u32).to_be_bytes());
    hasher.update(&asset.payload);
    hasher.update(asset.quantity.to_be_bytes());
}

/// Compute the canonical digest of an order's economic terms.
pub fn order_hash(order: &Order) -> OrderHash {
    let mut hasher = Sha256::new();
    hasher.update(ORDER_DOMAIN);
    hasher.update(order.maker.0);
    hash_asset(&mut hasher, &order.make_asset);
    match order.taker {
        None => hasher.update([0u8]),
        Some(taker) => {
            hasher.update([1u8]);
            hasher.update(taker.0);
        }
    }
    hash_asset(&mut hasher, &order.take_asset);
    hasher.update(order.salt.to_be_bytes());
    hasher.update(order.start.to_be_bytes());
    hasher.update(order.end.to_be_bytes());
    hasher.update([order.data_kind.to_u8()]);
    hasher.update((order.data.len() as u32).to_be_bytes());
    hasher.update(&order.data);

    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

// ============================================================================
// Signatures
// ============================================================================

/// A recoverable signature: 32-byte r, 32-byte s, 1-byte recovery id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSignature(pub [u8; 65]);

impl OrderSignature {
    /// Parse from a 65-byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExchangeError> {
        let arr: [u8; 65] = bytes
            .try_into()
            .map_err(|_| ExchangeError::InvalidSignature)?;
        Ok(Self(arr))
    }

    /// Recover the signer identity from this signature over `digest`.
    pub fn recover(&self, digest: &OrderHash) -> Result<Address, ExchangeError> {
        let signature = EcdsaSignature::from_slice(&self.0[..64])
            .map_err(|_| ExchangeError::InvalidSignature)?;
        let recovery_id = RecoveryId::from_byte(self.0[64])
            .ok_or(ExchangeError::InvalidSignature)?;
        let key = VerifyingKey::recover_from_prehash(digest, &signature, recovery_id)
            .map_err(|_| ExchangeError::InvalidSignature)?;
        Ok(address_of(&key))
    }
}

/// Derive the 20-byte identity of a public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = Sha256::digest(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address(out)
}

/// Verify that `claimed` authorized `order`.
///
/// Passes when the signature recovers `claimed`, or when the transaction
/// initiator (`sender`) is both the claimed signer and the order's maker.
/// Fails with [`ExchangeError::InvalidSignature`] otherwise.
pub fn verify_order(
    order: &Order,
    signature: Option<&OrderSignature>,
    claimed: Address,
    sender: Option<Address>,
) -> Result<(), ExchangeError> {
    if sender == Some(claimed) && claimed == order.maker {
        return Ok(());
    }
    let signature = signature.ok_or(ExchangeError::InvalidSignature)?;
    let recovered = signature.recover(&order_hash(order))?;
    if recovered == claimed {
        Ok(())
    } else {
        Err(ExchangeError::InvalidSignature)
    }
}

// ============================================================================
// Test support
// ============================================================================


// ============================================================================
// Unit Tests
// ============================================================================
