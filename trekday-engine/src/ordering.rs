//! Canonical display/export ordering of day subsets.
use chrono::NaiveDate;

use crate::catalog::{Day, DayNumber, TrekDayCatalog};
use crate::state::SelectionState;

/// Sort by `(day_number, date)`, ascending. Undated days sort before dated
/// ones on a tie. The sort is stable, so equal keys keep their input order.
#[must_use]
pub fn canonical_order<'a, I>(days: I) -> Vec<&'a Day>
where
    I: IntoIterator<Item = &'a Day>,
{
    let mut ordered: Vec<&Day> = days.into_iter().collect();
    ordered.sort_by(|a, b| {
        a.day_number
            .cmp(&b.day_number)
            .then_with(|| a.date.cmp(&b.date))
    });
    ordered
}

/// Selected days in canonical order.
///
/// Walks the catalog rather than the selection, so ties fall back to catalog
/// order and the result does not depend on how the selection was built.
/// Selected days missing from the catalog are skipped.
#[must_use]
pub fn ordered_selection<'a>(
    catalog: &'a TrekDayCatalog,
    selection: &SelectionState,
) -> Vec<&'a Day> {
    canonical_order(
        catalog
            .days()
            .iter()
            .filter(|day| selection.contains(day.day_number)),
    )
}

#[must_use]
pub fn ordered_day_numbers(catalog: &TrekDayCatalog, selection: &SelectionState) -> Vec<DayNumber> {
    ordered_selection(catalog, selection)
        .into_iter()
        .map(|day| day.day_number)
        .collect()
}

/// First and last dated day of the selection, for export headers.
#[must_use]
pub fn date_span(
    catalog: &TrekDayCatalog,
    selection: &SelectionState,
) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = ordered_selection(catalog, selection)
        .into_iter()
        .filter_map(|day| day.date);
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(lo, hi), date| (lo.min(date), hi.max(date)));
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, day).unwrap()
    }

    fn catalog() -> TrekDayCatalog {
        TrekDayCatalog::new(
            vec![
                Day::new(3).on(date(3)).titled("Col de Balme"),
                Day::new(1).on(date(1)).titled("Les Houches"),
                Day::new(2).titled("Rest day"),
                Day::new(5).on(date(4)).in_category("glacier"),
            ],
            vec![Category::unbounded("glacier")],
        )
        .unwrap()
    }

    fn numbers(days: &[&Day]) -> Vec<u32> {
        days.iter().map(|d| d.day_number.get()).collect()
    }

    #[test]
    fn selection_order_does_not_leak_into_output() {
        let catalog = catalog();
        let forward = SelectionState::from_days([1, 3, 5]);
        let backward = SelectionState::from_days([5, 3, 1]);
        assert_eq!(
            ordered_day_numbers(&catalog, &forward),
            ordered_day_numbers(&catalog, &backward)
        );
        assert_eq!(numbers(&ordered_selection(&catalog, &forward)), vec![1, 3, 5]);
    }

    #[test]
    fn canonical_order_is_stable_on_equal_keys() {
        let a = Day::new(7).titled("first");
        let b = Day::new(7).titled("second");
        let c = Day::new(6);
        let ordered = canonical_order([&a, &c, &b]);
        let titles: Vec<&str> = ordered.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["", "first", "second"]);
    }

    #[test]
    fn date_breaks_day_number_ties() {
        let late = Day::new(4).on(date(9));
        let early = Day::new(4).on(date(2));
        let undated = Day::new(4);
        let ordered = canonical_order([&late, &early, &undated]);
        let dates: Vec<Option<NaiveDate>> = ordered.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![None, Some(date(2)), Some(date(9))]);
    }

    #[test]
    fn unknown_selected_days_are_skipped() {
        let catalog = catalog();
        let selection = SelectionState::from_days([2, 99]);
        assert_eq!(
            ordered_day_numbers(&catalog, &selection),
            vec![DayNumber(2)]
        );
    }

    #[test]
    fn date_span_ignores_undated_days() {
        let catalog = catalog();
        let selection = SelectionState::from_days([1, 2, 5]);
        assert_eq!(date_span(&catalog, &selection), Some((date(1), date(4))));
        assert_eq!(
            date_span(&catalog, &SelectionState::from_days([2])),
            None
        );
    }
}
