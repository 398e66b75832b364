//! Delivery log port.
//!
//! Append-only persistence for delivery attempt audit records. Every send
//! attempt, dev-mode no-ops included, writes exactly one row here.

use crate::domain::foundation::DomainError;
use crate::domain::order::DeliveryAttempt;
use async_trait::async_trait;

/// Port for the append-only delivery audit log.
#[async_trait]
pub trait DeliveryLog: Send + Sync {
    /// Append one delivery attempt record.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn record(&self, attempt: &DeliveryAttempt) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn delivery_log_is_object_safe() {
        fn _accepts_dyn(_log: &dyn DeliveryLog) {}
    }
}
