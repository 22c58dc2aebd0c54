use anyhow::{Context, Result};
use trekday_engine::{
    CategoryId, DayNumber, Itinerary, QuotaScope, Rejection, SelectionState, ToggleOutcome,
};

use crate::common::scenario::TestScenario;

/// Days 1-5; category "Q" = {1, 2, 3} capped at 2; days 4 and 5 linked.
const REFERENCE_FIXTURE: &str = include_str!("../../../../assets/itineraries/reference.json");

pub fn reference_fixture() -> Result<Itinerary> {
    Itinerary::from_json(REFERENCE_FIXTURE).context("reference fixture")
}

pub fn catalog_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::scripted("Select First Day", select_first_day_expectation),
        TestScenario::scripted("Select Within Quota", select_within_quota_expectation),
        TestScenario::scripted("Reject At Quota", reject_at_quota_expectation),
        TestScenario::scripted("Select Linked Pair", select_linked_pair_expectation),
        TestScenario::scripted("Deselect Linked Pair", deselect_linked_pair_expectation),
        TestScenario::scripted("Diff After Edit", diff_after_edit_expectation),
    ]
}

pub fn find_catalog_scenario(name: &str) -> Option<TestScenario> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.name == name)
}

fn days(values: &[u32]) -> SelectionState {
    SelectionState::from_days(values.iter().copied())
}

fn expect_outcome(actual: &ToggleOutcome, expected: &ToggleOutcome) -> Result<()> {
    anyhow::ensure!(
        actual == expected,
        "expected {expected:?}, engine returned {actual:?}"
    );
    Ok(())
}

fn select_first_day_expectation(itinerary: &Itinerary) -> Result<()> {
    let outcome = itinerary.toggle(&days(&[]), DayNumber(1));
    expect_outcome(
        &outcome,
        &ToggleOutcome::Selected {
            selection: days(&[1]),
        },
    )?;
    anyhow::ensure!(
        !itinerary.requires_confirmation(&days(&[]), DayNumber(1)),
        "an unlinked day must not ask for confirmation"
    );
    Ok(())
}

fn select_within_quota_expectation(itinerary: &Itinerary) -> Result<()> {
    let outcome = itinerary.toggle(&days(&[1]), DayNumber(2));
    expect_outcome(
        &outcome,
        &ToggleOutcome::Selected {
            selection: days(&[1, 2]),
        },
    )
}

fn reject_at_quota_expectation(itinerary: &Itinerary) -> Result<()> {
    let start = days(&[1, 2]);
    let outcome = itinerary.toggle(&start, DayNumber(3));
    expect_outcome(
        &outcome,
        &ToggleOutcome::Rejected {
            selection: start.clone(),
            reason: Rejection::QuotaExceeded {
                scope: QuotaScope::Category(CategoryId::new("Q")),
                limit: 2,
            },
        },
    )?;
    let blocked = itinerary.blocked_days(&start);
    anyhow::ensure!(
        blocked.contains_key(&DayNumber(3)),
        "day 3 should be reported as blocked"
    );
    Ok(())
}

fn select_linked_pair_expectation(itinerary: &Itinerary) -> Result<()> {
    anyhow::ensure!(
        itinerary.requires_confirmation(&days(&[]), DayNumber(4)),
        "a linked day must ask for confirmation"
    );
    let outcome = itinerary.toggle(&days(&[]), DayNumber(4));
    expect_outcome(
        &outcome,
        &ToggleOutcome::Selected {
            selection: days(&[4, 5]),
        },
    )
}

fn deselect_linked_pair_expectation(itinerary: &Itinerary) -> Result<()> {
    let outcome = itinerary.toggle(&days(&[4, 5]), DayNumber(5));
    expect_outcome(
        &outcome,
        &ToggleOutcome::Deselected {
            selection: days(&[]),
        },
    )
}

fn diff_after_edit_expectation(itinerary: &Itinerary) -> Result<()> {
    let report = itinerary.diff(&days(&[1, 2]), &days(&[1, 2, 4, 5]));
    let added: Vec<u32> = report.added.iter().map(|d| d.get()).collect();
    anyhow::ensure!(added == [4, 5], "expected days 4 and 5 added, got {added:?}");
    anyhow::ensure!(report.removed.is_empty(), "nothing should be removed");
    anyhow::ensure!(!report.unchanged, "the edit changed the selection");
    anyhow::ensure!(
        itinerary.diff(&days(&[1, 2]), &days(&[2, 1])).unchanged,
        "equal sets must compare unchanged"
    );
    Ok(())
}
