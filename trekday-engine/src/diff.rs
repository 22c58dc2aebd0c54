//! Before/after comparison of two selections.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::catalog::DayNumber;
use crate::state::SelectionState;

/// Signal that an edited selection equals the original one.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no changes were made to the selection")]
pub struct NoChangeDetected;

/// Set-difference report between an old and a new selection.
///
/// `unchanged` is the authority on "nothing changed"; it is true iff the two
/// sets are equal, regardless of how either was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionDiff {
    pub added: BTreeSet<DayNumber>,
    pub removed: BTreeSet<DayNumber>,
    pub unchanged: bool,
}

impl SelectionDiff {
    /// Pass the diff through when something changed.
    ///
    /// # Errors
    ///
    /// Returns `NoChangeDetected` when the selections are equal, so callers
    /// can skip redundant persistence or pricing work with `?`.
    pub fn require_change(self) -> Result<Self, NoChangeDetected> {
        if self.unchanged {
            Err(NoChangeDetected)
        } else {
            Ok(self)
        }
    }

    /// The diff of the reverse edit.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            added: self.removed.clone(),
            removed: self.added.clone(),
            unchanged: self.unchanged,
        }
    }

    /// Days that entered or left the selection.
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.added.len() + self.removed.len()
    }
}

#[must_use]
pub fn diff(old: &SelectionState, new: &SelectionState) -> SelectionDiff {
    let added: BTreeSet<DayNumber> = new.days().difference(old.days()).copied().collect();
    let removed: BTreeSet<DayNumber> = old.days().difference(new.days()).copied().collect();
    let unchanged = added.is_empty() && removed.is_empty();
    SelectionDiff {
        added,
        removed,
        unchanged,
    }
}
