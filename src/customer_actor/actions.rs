use crate::domain::{DeliveryOutcome, ReliabilityPolicy};

/// Ledger updates applied inside the customer store, so increments never race.
#[derive(Debug, Clone)]
pub enum CustomerAction {
    /// Records a delivered or failed delivery against the customer.
    ApplyOutcome {
        outcome: DeliveryOutcome,
        policy: ReliabilityPolicy,
    },
    /// Undoes the order count bump of an upsert whose order was never stored.
    RetractOrder,
}
