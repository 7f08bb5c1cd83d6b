//! Focus-cycle state.
//!
//! Remembers which owner currently holds the primary column of the focus
//! layout and decides who gets it next.  The state is a plain value owned by
//! the [`LayoutDispatcher`](crate::dispatcher::LayoutDispatcher), so every
//! dispatcher (and every test) has its own.

use crate::window::{EligibleWindow, OwnerId};
use std::fmt;

/// Direction of a focus-cycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleDirection {
    Next,
    Prev,
}

impl fmt::Display for CycleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleDirection::Next => write!(f, "next"),
            CycleDirection::Prev => write!(f, "prev"),
        }
    }
}

/// Which owner holds the primary column, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusCycleState {
    /// Nothing has been focused yet.
    #[default]
    Unset,
    Focused(OwnerId),
}

impl FocusCycleState {
    pub fn new() -> Self {
        Self::Unset
    }

    /// The owner currently holding the primary column.
    pub fn owner(&self) -> Option<OwnerId> {
        match self {
            FocusCycleState::Unset => None,
            FocusCycleState::Focused(owner) => Some(*owner),
        }
    }

    /// Advance the cycle over `candidates` and return the new owner.
    ///
    /// If nothing is focused yet, or the focused owner is no longer a
    /// candidate, the cycle resets: `frontmost` wins if it is a candidate,
    /// else the first candidate.  A reset does not step in `direction`.
    /// Otherwise the focused owner's circular successor (or predecessor) is
    /// chosen.
    ///
    /// With no candidates the state is left untouched and `None` returned.
    pub fn advance(
        &mut self,
        direction: CycleDirection,
        candidates: &[OwnerId],
        frontmost: Option<OwnerId>,
    ) -> Option<OwnerId> {
        let first = *candidates.first()?;
        let current = self
            .owner()
            .and_then(|owner| candidates.iter().position(|c| *c == owner));

        let target = match current {
            None => frontmost
                .filter(|owner| candidates.contains(owner))
                .unwrap_or(first),
            Some(i) => {
                let n = candidates.len();
                let j = match direction {
                    CycleDirection::Next => (i + 1) % n,
                    CycleDirection::Prev => (i + n - 1) % n,
                };
                candidates[j]
            }
        };

        *self = FocusCycleState::Focused(target);
        Some(target)
    }
}

/// Distinct owners of `windows` in order of first appearance.
pub fn candidate_owners(windows: &[EligibleWindow]) -> Vec<OwnerId> {
    let mut owners: Vec<OwnerId> = Vec::new();
    for w in windows {
        if !owners.contains(&w.owner) {
            owners.push(w.owner);
        }
    }
    owners
}
