//! Event notifications emitted by the engines.
//!
//! Both the matching engine and the floor-bid matcher accumulate typed
//! events and hand them out via `take_events()`; the embedding environment
//! decides how to publish them.

use crate::types::asset::Address;

/// A notification emitted by a completed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Two orders were matched; `fill_amount` is the payment consumed.
    Match {
        left_hash: [u8; 32],
        right_hash: [u8; 32],
        fill_amount: u128,
    },

    /// A floor bid was created with `amount` escrowed.
    CreateBuyOrder {
        order_id: u64,
        buyer: Address,
        amount: u128,
    },

    /// A seller filled part of a floor bid; `amount` is the gross escrow
    /// consumed.
    MatchBuyOrder {
        order_id: u64,
        item_ids: Vec<u128>,
        amount: u128,
    },

    /// A floor bid was cancelled and its remainder refunded.
    CancelOrder { order_id: u64 },

    /// Escrowed funds were withdrawn from an expired floor bid.
    TokenWithdrawal { order_id: u64, amount: u128 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_equality() {
        let a = Event::CancelOrder { order_id: 3 };
        assert_eq!(a, Event::CancelOrder { order_id: 3 });
        assert_ne!(a, Event::CancelOrder { order_id: 4 });
    }
}
