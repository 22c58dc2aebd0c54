//! Caller-owned selection value.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::DayNumber;

/// Set of selected days.
///
/// Never mutated in place by the engine: every accepted toggle produces a
/// new value and the caller decides which one is current.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState(BTreeSet<DayNumber>);

impl SelectionState {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Seed a selection from raw day numbers, e.g. a prior registration.
    /// Duplicates collapse; validity is checked separately with `audit`.
    #[must_use]
    pub fn from_days<I>(days: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self(days.into_iter().map(DayNumber).collect())
    }

    #[must_use]
    pub fn contains(&self, day: DayNumber) -> bool {
        self.0.contains(&day)
    }

    /// Returns true when every listed day is selected.
    #[must_use]
    pub fn contains_all(&self, days: &[DayNumber]) -> bool {
        days.iter().all(|day| self.0.contains(day))
    }

    /// Listed days that are not selected yet.
    #[must_use]
    pub fn missing_from(&self, days: &[DayNumber]) -> Vec<DayNumber> {
        days.iter()
            .copied()
            .filter(|day| !self.0.contains(day))
            .collect()
    }

    /// New selection with `days` added.
    #[must_use]
    pub fn with(&self, days: &[DayNumber]) -> Self {
        let mut next = self.0.clone();
        next.extend(days.iter().copied());
        Self(next)
    }

    /// New selection with `days` removed.
    #[must_use]
    pub fn without(&self, days: &[DayNumber]) -> Self {
        let mut next = self.0.clone();
        for day in days {
            next.remove(day);
        }
        Self(next)
    }

    /// Selected days in ascending day-number order.
    pub fn iter(&self) -> impl Iterator<Item = DayNumber> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub const fn days(&self) -> &BTreeSet<DayNumber> {
        &self.0
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<DayNumber> {
        self.0.iter().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<DayNumber> for SelectionState {
    fn from_iter<T: IntoIterator<Item = DayNumber>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeSet<DayNumber>> for SelectionState {
    fn from(value: BTreeSet<DayNumber>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_and_without_leave_original_untouched() {
        let base = SelectionState::from_days([1, 2]);
        let grown = base.with(&[DayNumber(4), DayNumber(5)]);
        let shrunk = grown.without(&[DayNumber(1), DayNumber(9)]);
        assert_eq!(base, SelectionState::from_days([1, 2]));
        assert_eq!(grown, SelectionState::from_days([1, 2, 4, 5]));
        assert_eq!(shrunk, SelectionState::from_days([2, 4, 5]));
    }

    #[test]
    fn insertion_order_does_not_matter() {
        assert_eq!(
            SelectionState::from_days([3, 1, 2, 1]),
            SelectionState::from_days([1, 2, 3])
        );
    }

    #[test]
    fn missing_from_reports_unselected_members() {
        let state = SelectionState::from_days([4]);
        let component = [DayNumber(4), DayNumber(5)];
        assert!(!state.contains_all(&component));
        assert_eq!(state.missing_from(&component), vec![DayNumber(5)]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let state = SelectionState::from_days([2, 1]);
        assert_eq!(serde_json::to_string(&state).unwrap(), "[1,2]");
    }
}
