//! Category quotas and the overall selection cap.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::catalog::{CategoryId, DayNumber, TrekDayCatalog};
use crate::state::SelectionState;

/// Which limit a batch of days would break.
///
/// Ordering places every category before `Overall` and categories by id, so
/// the first element of a violation set is the one reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaScope {
    Category(CategoryId),
    Overall,
}

impl QuotaScope {
    #[must_use]
    pub const fn category(&self) -> Option<&CategoryId> {
        match self {
            Self::Category(id) => Some(id),
            Self::Overall => None,
        }
    }
}

impl fmt::Display for QuotaScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(id) => write!(f, "category {id}"),
            Self::Overall => write!(f, "overall"),
        }
    }
}

/// Room left under a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remaining {
    Bounded(u32),
    Unbounded,
}

impl Remaining {
    /// Whether `count` more days fit.
    #[must_use]
    pub const fn allows(self, count: u32) -> bool {
        match self {
            Self::Bounded(left) => count <= left,
            Self::Unbounded => true,
        }
    }
}

/// Per-category selectable-day limits plus an optional overall cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaPolicy {
    limits: BTreeMap<CategoryId, u32>,
    overall_max: Option<u32>,
    day_categories: HashMap<DayNumber, Option<CategoryId>>,
}

impl QuotaPolicy {
    /// Snapshot limits and day categories from the catalog.
    #[must_use]
    pub fn from_catalog(catalog: &TrekDayCatalog, overall_max: Option<u32>) -> Self {
        let limits = catalog
            .categories()
            .filter_map(|c| c.max_selectable_days.map(|max| (c.id.clone(), max)))
            .collect();
        let day_categories = catalog
            .days()
            .iter()
            .map(|d| (d.day_number, d.category_id.clone()))
            .collect();
        Self {
            limits,
            overall_max,
            day_categories,
        }
    }

    #[must_use]
    pub fn limit(&self, category: &CategoryId) -> Option<u32> {
        self.limits.get(category).copied()
    }

    #[must_use]
    pub const fn overall_max(&self) -> Option<u32> {
        self.overall_max
    }

    #[must_use]
    pub fn limit_for(&self, scope: &QuotaScope) -> Option<u32> {
        match scope {
            QuotaScope::Category(id) => self.limit(id),
            QuotaScope::Overall => self.overall_max,
        }
    }

    /// Quota-bearing categories in id order.
    pub fn bounded_categories(&self) -> impl Iterator<Item = (&CategoryId, u32)> {
        self.limits.iter().map(|(id, &max)| (id, max))
    }

    /// Selected days that belong to `category`.
    #[must_use]
    pub fn count_in(&self, selection: &SelectionState, category: &CategoryId) -> u32 {
        let count = selection
            .iter()
            .filter(|day| self.category_of(*day) == Some(category))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Selected days known to the catalog.
    #[must_use]
    pub fn count_overall(&self, selection: &SelectionState) -> u32 {
        let count = selection
            .iter()
            .filter(|day| self.day_categories.contains_key(day))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn remaining(&self, selection: &SelectionState, category: &CategoryId) -> Remaining {
        self.limit(category).map_or(Remaining::Unbounded, |max| {
            Remaining::Bounded(max.saturating_sub(self.count_in(selection, category)))
        })
    }

    #[must_use]
    pub fn remaining_overall(&self, selection: &SelectionState) -> Remaining {
        self.overall_max.map_or(Remaining::Unbounded, |max| {
            Remaining::Bounded(max.saturating_sub(self.count_overall(selection)))
        })
    }

    /// Every scope whose limit would be broken by adding `candidate` to
    /// `selection`. Empty means the batch is acceptable.
    ///
    /// Candidates that are already selected, repeated, or unknown to the
    /// catalog do not count.
    #[must_use]
    pub fn would_exceed(
        &self,
        selection: &SelectionState,
        candidate: &[DayNumber],
    ) -> BTreeSet<QuotaScope> {
        let fresh: BTreeSet<DayNumber> = candidate
            .iter()
            .copied()
            .filter(|day| !selection.contains(*day) && self.day_categories.contains_key(day))
            .collect();

        let mut additions: BTreeMap<&CategoryId, u32> = BTreeMap::new();
        for day in &fresh {
            if let Some(category) = self.category_of(*day) {
                *additions.entry(category).or_default() += 1;
            }
        }

        let mut violated = BTreeSet::new();
        for (category, added) in additions {
            if !self.remaining(selection, category).allows(added) {
                violated.insert(QuotaScope::Category(category.clone()));
            }
        }

        let added_total = u32::try_from(fresh.len()).unwrap_or(u32::MAX);
        if !self.remaining_overall(selection).allows(added_total) {
            violated.insert(QuotaScope::Overall);
        }
        violated
    }

    fn category_of(&self, day: DayNumber) -> Option<&CategoryId> {
        self.day_categories.get(&day).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Day};

    fn policy(overall: Option<u32>) -> QuotaPolicy {
        let catalog = TrekDayCatalog::new(
            vec![
                Day::new(1).in_category("Q"),
                Day::new(2).in_category("Q"),
                Day::new(3).in_category("Q"),
                Day::new(4).in_category("A"),
                Day::new(5).in_category("A"),
                Day::new(6),
            ],
            vec![Category::with_quota("Q", 2), Category::with_quota("A", 1)],
        )
        .unwrap();
        QuotaPolicy::from_catalog(&catalog, overall)
    }

    fn days(values: &[u32]) -> Vec<DayNumber> {
        values.iter().copied().map(DayNumber).collect()
    }

    #[test]
    fn counts_and_remaining_track_category_membership() {
        let policy = policy(None);
        let selection = SelectionState::from_days([1, 4, 6]);
        let q = CategoryId::new("Q");
        assert_eq!(policy.count_in(&selection, &q), 1);
        assert_eq!(policy.remaining(&selection, &q), Remaining::Bounded(1));
        assert_eq!(
            policy.remaining(&selection, &CategoryId::new("none")),
            Remaining::Unbounded
        );
        assert_eq!(policy.remaining_overall(&selection), Remaining::Unbounded);
    }

    #[test]
    fn remaining_saturates_when_over_limit() {
        let policy = policy(Some(1));
        let selection = SelectionState::from_days([1, 2, 3]);
        let q = CategoryId::new("Q");
        assert_eq!(policy.remaining(&selection, &q), Remaining::Bounded(0));
        assert_eq!(policy.remaining_overall(&selection), Remaining::Bounded(0));
    }

    #[test]
    fn would_exceed_reports_every_broken_scope_in_order() {
        let policy = policy(Some(3));
        let selection = SelectionState::from_days([1, 4]);
        let violated = policy.would_exceed(&selection, &days(&[2, 3, 5]));
        let scopes: Vec<QuotaScope> = violated.into_iter().collect();
        assert_eq!(
            scopes,
            vec![
                QuotaScope::Category(CategoryId::new("A")),
                QuotaScope::Category(CategoryId::new("Q")),
                QuotaScope::Overall,
            ]
        );
    }

    #[test]
    fn already_selected_and_unknown_candidates_are_not_counted() {
        let policy = policy(Some(2));
        let selection = SelectionState::from_days([1, 2]);
        assert!(policy.would_exceed(&selection, &days(&[1, 2, 99])).is_empty());
        assert!(!policy.would_exceed(&selection, &days(&[6])).is_empty());
    }

    #[test]
    fn limit_for_resolves_each_scope() {
        let policy = policy(Some(4));
        assert_eq!(
            policy.limit_for(&QuotaScope::Category(CategoryId::new("Q"))),
            Some(2)
        );
        assert_eq!(policy.limit_for(&QuotaScope::Overall), Some(4));
        let bounded: Vec<&str> = policy
            .bounded_categories()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(bounded, vec!["A", "Q"]);
    }

    #[test]
    fn only_category_scopes_name_a_category() {
        let q = CategoryId::new("Q");
        assert_eq!(QuotaScope::Category(q.clone()).category(), Some(&q));
        assert_eq!(QuotaScope::Overall.category(), None);
    }
}
