//! Lifecycle enums with an explicit transition table.

use std::fmt::Debug;

use super::ValidationError;

/// A lifecycle enum whose allowed moves are listed per state.
///
/// Implementors only supply [`StateMachine::next_states`]; checking and
/// performing a transition come from the table.
pub trait StateMachine: Sized + Copy + PartialEq + Debug + 'static {
    /// States reachable from `self` in one step.
    fn next_states(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.next_states().contains(target)
    }

    /// Returns `target` if the move is allowed.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            return Ok(target);
        }
        Err(ValidationError::invalid(
            "state",
            format!("cannot move from {:?} to {:?}", self, target),
        ))
    }

    /// No state can follow this one.
    fn is_terminal(&self) -> bool {
        self.next_states().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Window {
        Scheduled,
        Open,
        Done,
    }

    impl StateMachine for Window {
        fn next_states(&self) -> &'static [Self] {
            match self {
                Window::Scheduled => &[Window::Open, Window::Done],
                Window::Open => &[Window::Done],
                Window::Done => &[],
            }
        }
    }

    #[test]
    fn listed_moves_are_allowed() {
        assert_eq!(Window::Scheduled.transition_to(Window::Open), Ok(Window::Open));
        assert!(Window::Open.can_transition_to(&Window::Done));
    }

    #[test]
    fn unlisted_moves_are_refused() {
        let err = Window::Done.transition_to(Window::Open).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "state", .. }));
        assert!(!Window::Open.can_transition_to(&Window::Scheduled));
    }

    #[test]
    fn terminal_state_has_no_successors() {
        assert!(Window::Done.is_terminal());
        assert!(!Window::Scheduled.is_terminal());
    }
}
