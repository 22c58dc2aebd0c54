//! Selection engine: the sole mutator of `SelectionState`.
//!
//! Every function here is pure. Inputs are the itinerary configuration
//! (catalog, linkage, quota) and the caller's current selection; the output
//! is a fresh value. Failures are reported through `Rejection`, never by
//! panicking or returning an error.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::{DayNumber, TrekDayCatalog};
use crate::linkage::{LinkageComponent, LinkageIndex};
use crate::quota::{QuotaPolicy, QuotaScope};
use crate::state::SelectionState;

/// Why a toggle was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// Adding the day's component would break the limit of `scope`.
    QuotaExceeded { scope: QuotaScope, limit: u32 },
    /// The day is not in the catalog.
    UnknownDay { day: DayNumber },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuotaExceeded { scope, limit } => {
                write!(f, "{scope} is at its limit of {limit} days")
            }
            Self::UnknownDay { day } => write!(f, "day {day} is not part of this itinerary"),
        }
    }
}

/// Result of a single toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The day's whole component was added.
    Selected { selection: SelectionState },
    /// The day's whole component was removed.
    Deselected { selection: SelectionState },
    /// Nothing changed; `selection` is the caller's input.
    Rejected {
        selection: SelectionState,
        reason: Rejection,
    },
}

impl ToggleOutcome {
    /// Selection the caller should hold after this outcome.
    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        match self {
            Self::Selected { selection }
            | Self::Deselected { selection }
            | Self::Rejected { selection, .. } => selection,
        }
    }

    #[must_use]
    pub fn into_selection(self) -> SelectionState {
        match self {
            Self::Selected { selection }
            | Self::Deselected { selection }
            | Self::Rejected { selection, .. } => selection,
        }
    }

    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }

    #[must_use]
    pub const fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// True iff `day`'s component is not fully selected and selecting it would
/// pull in other days. Lets a caller interpose a confirmation step; the
/// engine itself never gates on it.
#[must_use]
pub fn requires_confirmation(
    selection: &SelectionState,
    day: DayNumber,
    linkage: &LinkageIndex,
) -> bool {
    let component = linkage.component_of(day);
    component.len() > 1 && !selection.contains_all(&component)
}

/// Toggle `day` and its whole linkage component.
///
/// A component counts as selected only when every member is present. A
/// partially present component (possible only through external data) is
/// completed rather than removed.
#[must_use]
pub fn toggle(
    selection: &SelectionState,
    day: DayNumber,
    catalog: &TrekDayCatalog,
    linkage: &LinkageIndex,
    quota: &QuotaPolicy,
) -> ToggleOutcome {
    if !catalog.contains(day) {
        log::debug!("toggle rejected: day {day} is not in the catalog");
        return ToggleOutcome::Rejected {
            selection: selection.clone(),
            reason: Rejection::UnknownDay { day },
        };
    }

    let component = linkage.component_of(day);
    if selection.contains_all(&component) {
        let next = selection.without(&component);
        log::debug!("day {day}: deselected {} day(s)", component.len());
        return ToggleOutcome::Deselected { selection: next };
    }

    let candidate = selection.missing_from(&component);
    let violated = quota.would_exceed(selection, &candidate);
    if let Some(scope) = violated.into_iter().next() {
        let limit = quota.limit_for(&scope).unwrap_or_default();
        log::debug!("day {day}: rejected, {scope} limit {limit} reached");
        return ToggleOutcome::Rejected {
            selection: selection.clone(),
            reason: Rejection::QuotaExceeded { scope, limit },
        };
    }

    log::debug!("day {day}: selected {} day(s)", candidate.len());
    ToggleOutcome::Selected {
        selection: selection.with(&candidate),
    }
}

/// Outcomes of replaying a sequence of toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleReplay {
    pub steps: Vec<(DayNumber, ToggleOutcome)>,
    pub selection: SelectionState,
}

impl ToggleReplay {
    /// Number of toggles that were refused.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.steps
            .iter()
            .filter(|(_, outcome)| !outcome.is_accepted())
            .count()
    }
}

/// Apply `days` in order, threading each outcome's selection into the next.
#[must_use]
pub fn apply_toggles(
    selection: &SelectionState,
    days: &[DayNumber],
    catalog: &TrekDayCatalog,
    linkage: &LinkageIndex,
    quota: &QuotaPolicy,
) -> ToggleReplay {
    let mut current = selection.clone();
    let mut steps = Vec::with_capacity(days.len());
    for &day in days {
        let outcome = toggle(&current, day, catalog, linkage, quota);
        current = outcome.selection().clone();
        steps.push((day, outcome));
    }
    ToggleReplay {
        steps,
        selection: current,
    }
}

/// Days whose toggle would currently be rejected, with the reason.
/// Used to grey out cards before the user clicks them.
#[must_use]
pub fn blocked_days(
    selection: &SelectionState,
    catalog: &TrekDayCatalog,
    linkage: &LinkageIndex,
    quota: &QuotaPolicy,
) -> BTreeMap<DayNumber, Rejection> {
    catalog
        .day_numbers()
        .filter_map(|day| {
            toggle(selection, day, catalog, linkage, quota)
                .rejection()
                .cloned()
                .map(|reason| (day, reason))
        })
        .collect()
}

/// A broken invariant found in an externally supplied selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantViolation {
    UnknownDay {
        day: DayNumber,
    },
    PartialComponent {
        component: LinkageComponent,
        missing: Vec<DayNumber>,
    },
    QuotaExceeded {
        scope: QuotaScope,
        count: u32,
        limit: u32,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDay { day } => write!(f, "day {day} is not in the catalog"),
            Self::PartialComponent { component, missing } => write!(
                f,
                "linked days {component:?} are only partially selected (missing {missing:?})"
            ),
            Self::QuotaExceeded {
                scope,
                count,
                limit,
            } => write!(f, "{scope} has {count} days selected, limit is {limit}"),
        }
    }
}

/// Check a selection against every invariant. Empty means valid.
///
/// Intended for selections the engine did not produce, such as a prior
/// registration loaded for editing.
#[must_use]
pub fn audit(
    selection: &SelectionState,
    catalog: &TrekDayCatalog,
    linkage: &LinkageIndex,
    quota: &QuotaPolicy,
) -> Vec<InvariantViolation> {
    let mut violations: Vec<InvariantViolation> = selection
        .iter()
        .filter(|day| !catalog.contains(*day))
        .map(|day| InvariantViolation::UnknownDay { day })
        .collect();

    for component in linkage.components() {
        let missing = selection.missing_from(component);
        if !missing.is_empty() && missing.len() < component.len() {
            violations.push(InvariantViolation::PartialComponent {
                component: LinkageComponent::from_slice(component),
                missing,
            });
        }
    }

    for (category, limit) in quota.bounded_categories() {
        let count = quota.count_in(selection, category);
        if count > limit {
            violations.push(InvariantViolation::QuotaExceeded {
                scope: QuotaScope::Category(category.clone()),
                count,
                limit,
            });
        }
    }
    if let Some(limit) = quota.overall_max() {
        let count = quota.count_overall(selection);
        if count > limit {
            violations.push(InvariantViolation::QuotaExceeded {
                scope: QuotaScope::Overall,
                count,
                limit,
            });
        }
    }
    violations
}

/// Drop unknown days and complete partially present components, the same
/// way `toggle` treats a partial component as "not yet selected".
///
/// Quota is not enforced here; run `audit` on the result.
#[must_use]
pub fn repair_partial_components(
    selection: &SelectionState,
    catalog: &TrekDayCatalog,
    linkage: &LinkageIndex,
) -> SelectionState {
    let known: SelectionState = selection.iter().filter(|d| catalog.contains(*d)).collect();
    let mut completed = Vec::new();
    for component in linkage.components() {
        let missing = known.missing_from(component);
        if !missing.is_empty() && missing.len() < component.len() {
            completed.extend(missing);
        }
    }
    known.with(&completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, CategoryId, Day};
    use crate::linkage::LinkDeclaration;

    struct Fixture {
        catalog: TrekDayCatalog,
        linkage: LinkageIndex,
        quota: QuotaPolicy,
    }

    impl Fixture {
        fn new(overall: Option<u32>) -> Self {
            let catalog = TrekDayCatalog::new(
                vec![
                    Day::new(1).in_category("Q"),
                    Day::new(2).in_category("Q"),
                    Day::new(3).in_category("Q"),
                    Day::new(4),
                    Day::new(5),
                ],
                vec![Category::with_quota("Q", 2)],
            )
            .unwrap();
            let linkage = LinkageIndex::build(&catalog, &[LinkDeclaration::new(4, 5)]).unwrap();
            let quota = QuotaPolicy::from_catalog(&catalog, overall);
            Self {
                catalog,
                linkage,
                quota,
            }
        }

        fn toggle(&self, selection: &SelectionState, day: u32) -> ToggleOutcome {
            toggle(
                selection,
                DayNumber(day),
                &self.catalog,
                &self.linkage,
                &self.quota,
            )
        }
    }

    #[test]
    fn unknown_day_is_rejected_without_change() {
        let fx = Fixture::new(None);
        let start = SelectionState::from_days([1]);
        let outcome = fx.toggle(&start, 42);
        assert_eq!(
            outcome,
            ToggleOutcome::Rejected {
                selection: start,
                reason: Rejection::UnknownDay { day: DayNumber(42) },
            }
        );
    }

    #[test]
    fn overall_cap_is_reported_after_categories() {
        let fx = Fixture::new(Some(2));
        let outcome = fx.toggle(&SelectionState::from_days([1]), 4);
        assert_eq!(
            outcome.rejection(),
            Some(&Rejection::QuotaExceeded {
                scope: QuotaScope::Overall,
                limit: 2,
            })
        );
        assert_eq!(outcome.selection(), &SelectionState::from_days([1]));
    }

    #[test]
    fn category_violation_wins_over_overall() {
        let fx = Fixture::new(Some(2));
        let outcome = fx.toggle(&SelectionState::from_days([1, 2]), 3);
        assert_eq!(
            outcome.rejection(),
            Some(&Rejection::QuotaExceeded {
                scope: QuotaScope::Category(CategoryId::new("Q")),
                limit: 2,
            })
        );
    }

    #[test]
    fn partial_component_is_completed_not_removed() {
        let fx = Fixture::new(None);
        let outcome = fx.toggle(&SelectionState::from_days([5]), 5);
        assert_eq!(
            outcome,
            ToggleOutcome::Selected {
                selection: SelectionState::from_days([4, 5]),
            }
        );
    }

    #[test]
    fn partial_component_asks_for_confirmation() {
        let fx = Fixture::new(None);
        let partial = SelectionState::from_days([5]);
        assert!(requires_confirmation(&partial, DayNumber(5), &fx.linkage));
        assert!(requires_confirmation(&partial, DayNumber(4), &fx.linkage));
        assert!(matches!(
            fx.toggle(&partial, 5),
            ToggleOutcome::Selected { .. }
        ));
    }

    #[test]
    fn confirmation_only_for_unselected_multi_day_components() {
        let fx = Fixture::new(None);
        let empty = SelectionState::empty();
        assert!(requires_confirmation(&empty, DayNumber(4), &fx.linkage));
        assert!(!requires_confirmation(&empty, DayNumber(1), &fx.linkage));
        let linked = SelectionState::from_days([4, 5]);
        assert!(!requires_confirmation(&linked, DayNumber(5), &fx.linkage));
    }

    #[test]
    fn replay_threads_selection_and_counts_rejections() {
        let fx = Fixture::new(None);
        let days: Vec<DayNumber> = [1, 2, 3, 4, 1].into_iter().map(DayNumber).collect();
        let replay = apply_toggles(
            &SelectionState::empty(),
            &days,
            &fx.catalog,
            &fx.linkage,
            &fx.quota,
        );
        assert_eq!(replay.rejected(), 1);
        assert_eq!(replay.selection, SelectionState::from_days([2, 4, 5]));
        assert_eq!(replay.steps.len(), 5);
    }

    #[test]
    fn blocked_days_lists_quota_blocked_cards() {
        let fx = Fixture::new(None);
        let blocked = blocked_days(
            &SelectionState::from_days([1, 2]),
            &fx.catalog,
            &fx.linkage,
            &fx.quota,
        );
        assert_eq!(
            blocked.keys().copied().collect::<Vec<_>>(),
            vec![DayNumber(3)]
        );
    }

    #[test]
    fn audit_reports_each_broken_invariant() {
        let fx = Fixture::new(Some(3));
        let corrupt = SelectionState::from_days([1, 2, 3, 5, 77]);
        let violations = audit(&corrupt, &fx.catalog, &fx.linkage, &fx.quota);
        assert!(violations.contains(&InvariantViolation::UnknownDay { day: DayNumber(77) }));
        assert!(violations.iter().any(|v| matches!(
            v,
            InvariantViolation::PartialComponent { missing, .. } if missing == &vec![DayNumber(4)]
        )));
        assert!(violations.contains(&InvariantViolation::QuotaExceeded {
            scope: QuotaScope::Category(CategoryId::new("Q")),
            count: 3,
            limit: 2,
        }));
        assert!(violations.contains(&InvariantViolation::QuotaExceeded {
            scope: QuotaScope::Overall,
            count: 4,
            limit: 3,
        }));
        let clean = SelectionState::from_days([1, 4, 5]);
        assert!(audit(&clean, &fx.catalog, &fx.linkage, &fx.quota).is_empty());
    }

    #[test]
    fn repair_completes_components_and_drops_strangers() {
        let fx = Fixture::new(None);
        let repaired = repair_partial_components(
            &SelectionState::from_days([1, 4, 99]),
            &fx.catalog,
            &fx.linkage,
        );
        assert_eq!(repaired, SelectionState::from_days([1, 4, 5]));
    }

    #[test]
    fn rejection_messages_name_the_limit() {
        let reason = Rejection::QuotaExceeded {
            scope: QuotaScope::Category(CategoryId::new("Q")),
            limit: 2,
        };
        assert_eq!(reason.to_string(), "category Q is at its limit of 2 days");
    }
}
