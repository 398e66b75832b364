//! Validated state transitions for status enums.

use super::ValidationError;

/// Interface for status enums with a fixed transition graph.
///
/// An implementor declares its graph twice, as a predicate and as an
/// adjacency list, and the two must agree. In return it gets
/// [`transition_to`](StateMachine::transition_to) and
/// [`is_terminal`](StateMachine::is_terminal) for free.
///
/// ```ignore
/// let status = PurchaseStatus::Pending;
/// let status = status.transition_to(PurchaseStatus::Completed)?;
/// assert!(!status.can_transition_to(&PurchaseStatus::Pending));
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Whether the edge `self -> target` exists.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Every state reachable from `self` in one step.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Moves to `target`, rejecting edges the graph does not have.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {self:?} to {target:?}"),
            ));
        }
        Ok(target)
    }

    /// True when no outgoing edges remain.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestStatus {
        Queued,
        Sending,
        Delivered,
        Bounced,
    }

    impl StateMachine for TestStatus {
        fn can_transition_to(&self, target: &Self) -> bool {
            use TestStatus::*;
            matches!(
                (self, target),
                (Queued, Sending) | (Sending, Delivered) | (Sending, Bounced)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use TestStatus::*;
            match self {
                Queued => vec![Sending],
                Sending => vec![Delivered, Bounced],
                Delivered => vec![],
                Bounced => vec![],
            }
        }
    }

    #[test]
    fn declared_edges_are_allowed() {
        assert_eq!(
            TestStatus::Queued.transition_to(TestStatus::Sending),
            Ok(TestStatus::Sending)
        );
        assert_eq!(
            TestStatus::Sending.transition_to(TestStatus::Bounced),
            Ok(TestStatus::Bounced)
        );
    }

    #[test]
    fn skipping_a_state_is_rejected() {
        let result = TestStatus::Queued.transition_to(TestStatus::Delivered);
        assert!(result.is_err());
    }

    #[test]
    fn self_transitions_are_rejected() {
        assert!(TestStatus::Sending.transition_to(TestStatus::Sending).is_err());
    }

    #[test]
    fn terminal_means_no_outgoing_edges() {
        assert!(TestStatus::Delivered.is_terminal());
        assert!(TestStatus::Bounced.is_terminal());
        assert!(!TestStatus::Queued.is_terminal());
        assert!(!TestStatus::Sending.is_terminal());
    }

    #[test]
    fn adjacency_list_matches_the_graph() {
        assert_eq!(
            TestStatus::Sending.valid_transitions(),
            vec![TestStatus::Delivered, TestStatus::Bounced]
        );
        assert_eq!(TestStatus::Delivered.valid_transitions(), vec![]);
    }

    #[test]
    fn predicate_and_adjacency_list_agree() {
        let all = [
            TestStatus::Queued,
            TestStatus::Sending,
            TestStatus::Delivered,
            TestStatus::Bounced,
        ];
        for from in all {
            for to in all {
                let listed = from.valid_transitions().contains(&to);
                assert_eq!(
                    from.can_transition_to(&to),
                    listed,
                    "graph views disagree on {from:?} -> {to:?}"
                );
            }
        }
    }
}
