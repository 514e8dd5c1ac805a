//! Asset model and deterministic payload codec.
//!
//! ## Payload Layout
//!
//! Each asset kind fixes its own payload layout; decoding rejects anything
//! that does not parse exactly (wrong length, truncation, trailing bytes):
//!
//! - `Native`: empty payload
//! - `FungibleToken`: 20-byte contract address
//! - `NonFungibleItem`: 20-byte contract address + 16-byte big-endian item id
//! - `NonFungibleBundle`: u16 collection count, then per collection a
//!   20-byte address, a u16 item count, and the big-endian item ids
//!
//! All multi-byte integers are big-endian. The encoding is injective for
//! valid inputs, so `decode(encode(x)) == x` for every supported kind.

use std::fmt;

use crate::error::ExchangeError;

/// Byte width of an identity (account, token contract, collection).
pub const ADDRESS_BYTES: usize = 20;

/// Byte width of an encoded item id (u128, big-endian).
pub const ITEM_ID_BYTES: usize = 16;

// ============================================================================
// Address
// ============================================================================

/// A 20-byte identity: an account, a token contract, or a collection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_BYTES]);

impl Address {
    /// The all-zero identity, used for "any taker".
    pub const ZERO: Address = Address([0u8; ADDRESS_BYTES]);

    /// Hex representation without a prefix.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

// ============================================================================
// AssetKind
// ============================================================================

/// Type tag of a tradable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssetKind {
    /// The execution environment's native currency.
    #[default]
    Native,
    /// A fungible token contract.
    FungibleToken,
    /// A single non-fungible item (collection + item id).
    NonFungibleItem,
    /// Multiple non-fungible items, possibly across collections,
    /// priced as a whole.
    NonFungibleBundle,
}

impl AssetKind {
    /// Convert to u8 for serialization.
    pub fn to_u8(self) -> u8 {
        match self {
            AssetKind::Native => 0,
            AssetKind::FungibleToken => 1,
            AssetKind::NonFungibleItem => 2,
            AssetKind::NonFungibleBundle => 3,
        }
    }

    /// Convert from u8 for deserialization.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AssetKind::Native),
            1 => Some(AssetKind::FungibleToken),
            2 => Some(AssetKind::NonFungibleItem),
            3 => Some(AssetKind::NonFungibleBundle),
            _ => None,
        }
    }

    /// Whether this kind can serve as a payment leg.
    #[inline]
    pub fn is_payment(self) -> bool {
        matches!(self, AssetKind::Native | AssetKind::FungibleToken)
    }

    /// Whether this kind carries non-fungible items.
    #[inline]
    pub fn is_items(self) -> bool {
        matches!(
            self,
            AssetKind::NonFungibleItem | AssetKind::NonFungibleBundle
        )
    }
}

// ============================================================================
// Payload encoding
// ============================================================================

/// Encode a single-contract payload: fungible token (`item_id == None`)
/// or non-fungible item (`item_id == Some(id)`).
pub fn encode_single(contract: Address, item_id: Option<u128>) -> Vec<u8> {
    match item_id {
        None => contract.0.to_vec(),
        Some(id) => {
            let mut out = Vec::with_capacity(ADDRESS_BYTES + ITEM_ID_BYTES);
            out.extend_from_slice(&contract.0);
            out.extend_from_slice(&id.to_be_bytes());
            out
        }
    }
}

/// Encode a bundle payload from parallel collection and item-id lists.
///
/// Fails with [`ExchangeError::MalformedAsset`] when the lists' lengths
/// differ or a count does not fit in u16.
pub fn encode_bundle(
    collections: &[Address],
    item_ids: &[Vec<u128>],
) -> Result<Vec<u8>, ExchangeError> {
    if collections.len() != item_ids.len() {
        return Err(ExchangeError::MalformedAsset);
    }
    let count =
        u16::try_from(collections.len()).map_err(|_| ExchangeError::MalformedAsset)?;

    let mut out = Vec::new();
    out.extend_from_slice(&count.to_be_bytes());
    for (contract, ids) in collections.iter().zip(item_ids) {
        let n = u16::try_from(ids.len()).map_err(|_| ExchangeError::MalformedAsset)?;
        out.extend_from_slice(&contract.0);
        out.extend_from_slice(&n.to_be_bytes());
        for id in ids {
            out.extend_from_slice(&id.to_be_bytes());
        }
    }
    Ok(out)
}

// ============================================================================
// Decoded forms
// ============================================================================

/// A decoded bundle: ordered `(collection, item ids)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleInfo {
    pub collections: Vec<(Address, Vec<u128>)>,
}

impl BundleInfo {
    /// Total number of items across all collections.
    pub fn total_items(&self) -> usize {
        self.collections.iter().map(|(_, ids)| ids.len()).sum()
    }

    /// Iterate `(collection, item id)` pairs in encoded order.
    pub fn items(&self) -> impl Iterator<Item = (Address, u128)> + '_ {
        self.collections
            .iter()
            .flat_map(|(c, ids)| ids.iter().map(move |id| (*c, *id)))
    }

    /// Whether every item of `other` appears in this bundle.
    pub fn contains_all(&self, other: &BundleInfo) -> bool {
        other.items().all(|(c, id)| {
            self.collections
                .iter()
                .any(|(col, ids)| *col == c && ids.contains(&id))
        })
    }
}

/// Structured view of a decoded asset payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedAsset {
    Native,
    FungibleToken { contract: Address },
    NonFungibleItem { contract: Address, item_id: u128 },
    NonFungibleBundle(BundleInfo),
}

// ============================================================================
// Asset
// ============================================================================

/// A tradable asset: a type tag, the kind-specific payload, and a quantity.
///
/// For payment kinds the quantity is the amount; for a single item it is 1;
/// for a bundle it equals the total item count (validated at match time
/// against the configured maximum, not at encode time).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Asset {
    pub kind: AssetKind,
    pub payload: Vec<u8>,
    pub quantity: u128,
}

impl Asset {
    /// Native currency amount.
    pub fn native(amount: u128) -> Self {
        Self {
            kind: AssetKind::Native,
            payload: Vec::new(),
            quantity: amount,
        }
    }

    /// Fungible token amount.
    pub fn fungible(contract: Address, amount: u128) -> Self {
        Self {
            kind: AssetKind::FungibleToken,
            payload: encode_single(contract, None),
            quantity: amount,
        }
    }

    /// A single non-fungible item.
    pub fn item(contract: Address, item_id: u128) -> Self {
        Self {
            kind: AssetKind::NonFungibleItem,
            payload: encode_single(contract, Some(item_id)),
            quantity: 1,
        }
    }

    /// A bundle across one or more collections. Quantity is set to the
    /// total item count.
    pub fn bundle(
        collections: &[Address],
        item_ids: &[Vec<u128>],
    ) -> Result<Self, ExchangeError> {
        let payload = encode_bundle(collections, item_ids)?;
        let quantity = item_ids.iter().map(|ids| ids.len() as u128).sum();
        Ok(Self {
            kind: AssetKind::NonFungibleBundle,
            payload,
            quantity,
        })
    }

    /// Decode the payload for this asset's kind.
    ///
    /// Strict: any leftover or missing bytes fail with
    /// [`ExchangeError::MalformedAsset`].
    pub fn decode_payload(&self) -> Result<DecodedAsset, ExchangeError> {
        let mut r = Reader::new(&self.payload);
        let decoded = match self.kind {
            AssetKind::Native => DecodedAsset::Native,
            AssetKind::FungibleToken => DecodedAsset::FungibleToken {
                contract: r.address()?,
            },
            AssetKind::NonFungibleItem => DecodedAsset::NonFungibleItem {
                contract: r.address()?,
                item_id: r.item_id()?,
            },
            AssetKind::NonFungibleBundle => {
                let count = r.u16()?;
                let mut collections = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let contract = r.address()?;
                    let n = r.u16()?;
                    let mut ids = Vec::with_capacity(n as usize);
                    for _ in 0..n {
                        ids.push(r.item_id()?);
                    }
                    collections.push((contract, ids));
                }
                DecodedAsset::NonFungibleBundle(BundleInfo { collections })
            }
        };
        r.finish()?;
        Ok(decoded)
    }

    /// Decode as an item set: a single item becomes a one-entry bundle view.
    pub fn decode_items(&self) -> Result<BundleInfo, ExchangeError> {
        match self.decode_payload()? {
            DecodedAsset::NonFungibleItem { contract, item_id } => Ok(BundleInfo {
                collections: vec![(contract, vec![item_id])],
            }),
            DecodedAsset::NonFungibleBundle(info) => Ok(info),
            _ => Err(ExchangeError::MalformedAsset),
        }
    }
}

// ============================================================================
// Payload reader
// ============================================================================

/// Cursor over a payload; every read is bounds-checked and `finish`
/// rejects trailing bytes.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ExchangeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ExchangeError::MalformedAsset)?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn address(&mut self) -> Result<Address, ExchangeError> {
        let mut out = [0u8; ADDRESS_BYTES];
        out.copy_from_slice(self.take(ADDRESS_BYTES)?);
        Ok(Address(out))
    }

    fn item_id(&mut self) -> Result<u128, ExchangeError> {
        let mut out = [0u8; ITEM_ID_BYTES];
        out.copy_from_slice(self.take(ITEM_ID_BYTES)?);
        Ok(u128::from_be_bytes(out))
    }

    fn u16(&mut self) -> Result<u16, ExchangeError> {
        let mut out = [0u8; 2];
        out.copy_from_slice(self.take(2)?);
        Ok(u16::from_be_bytes(out))
    }

    fn finish(&self) -> Result<(), ExchangeError> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(ExchangeError::MalformedAsset)
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
