use anyhow::Result;
use trekday_engine::Itinerary;

use crate::common::scenario::TestScenario;
use crate::logic::walk::{DEFAULT_WALK_STEPS, WalkPlan, WalkSummary, run_walk};

fn no_violations_expectation(_itinerary: &Itinerary, summary: &WalkSummary) -> Result<()> {
    if let Some(first) = summary.violations.first() {
        anyhow::bail!(
            "{} invariant violation(s), first: {first}",
            summary.violations.len()
        );
    }
    Ok(())
}

fn quota_bound_expectation(itinerary: &Itinerary, summary: &WalkSummary) -> Result<()> {
    let quota = itinerary.quota();
    for (category, limit) in quota.bounded_categories() {
        let count = quota.count_in(&summary.final_selection, category);
        anyhow::ensure!(
            count <= limit,
            "category {category} ended with {count} days, limit {limit}"
        );
    }
    if let Some(limit) = quota.overall_max() {
        let peak = u32::try_from(summary.peak_size()).unwrap_or(u32::MAX);
        anyhow::ensure!(peak <= limit, "selection peaked at {peak} days, cap {limit}");
    }
    Ok(())
}

fn deterministic_expectation(itinerary: &Itinerary, summary: &WalkSummary) -> Result<()> {
    let plan = WalkPlan::new().with_steps(summary.steps.len());
    let replay = run_walk(itinerary, &plan, summary.seed);
    anyhow::ensure!(
        replay.steps == summary.steps,
        "seed {} produced a different walk on replay",
        summary.seed
    );
    anyhow::ensure!(
        replay.final_selection == summary.final_selection,
        "seed {} ended on a different selection on replay",
        summary.seed
    );
    Ok(())
}

fn ordering_expectation(itinerary: &Itinerary, summary: &WalkSummary) -> Result<()> {
    let ordered = itinerary.ordered_day_numbers(&summary.final_selection);
    anyhow::ensure!(
        ordered.len() == summary.final_selection.len(),
        "ordering dropped {} selected day(s)",
        summary.final_selection.len() - ordered.len()
    );
    anyhow::ensure!(
        ordered.windows(2).all(|pair| pair[0] < pair[1]),
        "ordering is not ascending: {ordered:?}"
    );
    Ok(())
}

pub fn random_walk_scenario() -> TestScenario {
    TestScenario::walk(
        "Random Walk Invariants",
        WalkPlan::new().with_expectation(no_violations_expectation),
    )
}

pub fn quota_pressure_scenario() -> TestScenario {
    TestScenario::walk(
        "Quota Pressure Walk",
        WalkPlan::new()
            .with_steps(DEFAULT_WALK_STEPS * 5)
            .with_expectation(no_violations_expectation)
            .with_expectation(quota_bound_expectation),
    )
}

pub fn deterministic_walk_scenario() -> TestScenario {
    TestScenario::walk(
        "Deterministic Walk Replay",
        WalkPlan::new().with_expectation(deterministic_expectation),
    )
}

pub fn ordering_walk_scenario() -> TestScenario {
    TestScenario::walk(
        "Canonical Ordering Walk",
        WalkPlan::new()
            .with_expectation(no_violations_expectation)
            .with_expectation(ordering_expectation),
    )
}
