//! Purchase status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a purchase.
///
/// This pipeline only ever writes `Completed` (immediately for free
/// products, on verified webhook for paid ones). `Failed` and `Refunded`
/// exist for gateway event types that do not re-enter the happy path.
///
/// # State Transitions
///
/// ```text
/// Pending ──> Completed ──> Refunded
///    │
///    └──────> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    /// Payment initiated but not yet confirmed.
    Pending,

    /// Payment confirmed; the product is owed (or delivered) to the customer.
    Completed,

    /// Payment failed. Terminal.
    Failed,

    /// Payment was refunded after completion. Terminal.
    Refunded,
}

impl PurchaseStatus {
    /// Returns the display name for this status.
    pub fn display_name(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "Pending",
            PurchaseStatus::Completed => "Completed",
            PurchaseStatus::Failed => "Failed",
            PurchaseStatus::Refunded => "Refunded",
        }
    }

    /// Returns true if this status represents a fulfilled purchase.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, PurchaseStatus::Completed)
    }
}

impl StateMachine for PurchaseStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PurchaseStatus::*;
        matches!(
            (self, target),
            (Pending, Completed) | (Pending, Failed) | (Completed, Refunded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PurchaseStatus::*;
        match self {
            Pending => vec![Completed, Failed],
            Completed => vec![Refunded],
            Failed => vec![],
            Refunded => vec![],
        }
    }
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
