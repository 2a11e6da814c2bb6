use crate::domain::{OrderEvent, OrderStatus};

/// Changes applied inside the order store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderAction {
    /// A lifecycle event, checked against the status table.
    Apply(OrderEvent),
    /// Puts the status back to `to` when it is still `from`. Undoes an
    /// event whose customer ledger update failed.
    Restore { from: OrderStatus, to: OrderStatus },
}
