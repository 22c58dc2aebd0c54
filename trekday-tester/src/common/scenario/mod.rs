use anyhow::Result;
use std::fmt;
use trekday_engine::Itinerary;

use crate::logic::WalkPlan;

pub mod catalog;
pub mod walks;

pub use catalog::reference_fixture;

/// Fixed check run once against the five-day reference fixture.
pub type ScriptedCheck = fn(&Itinerary) -> Result<()>;

#[derive(Clone)]
pub enum ScenarioKind {
    Scripted(ScriptedCheck),
    /// Seeded random walks over the itinerary under test.
    Walk(WalkPlan),
}

impl fmt::Debug for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scripted(_) => f.write_str("Scripted"),
            Self::Walk(plan) => f.debug_tuple("Walk").field(plan).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub kind: ScenarioKind,
}

impl TestScenario {
    #[must_use]
    pub fn scripted(name: impl Into<String>, check: ScriptedCheck) -> Self {
        Self {
            name: name.into(),
            kind: ScenarioKind::Scripted(check),
        }
    }

    #[must_use]
    pub fn walk(name: impl Into<String>, plan: WalkPlan) -> Self {
        Self {
            name: name.into(),
            kind: ScenarioKind::Walk(plan),
        }
    }

    #[must_use]
    pub const fn is_walk(&self) -> bool {
        matches!(self.kind, ScenarioKind::Walk(_))
    }
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" | "random-walk" | "walk" => Some(walks::random_walk_scenario()),
        "quota-pressure" | "pressure" => Some(walks::quota_pressure_scenario()),
        "deterministic-walk" | "deterministic" => Some(walks::deterministic_walk_scenario()),
        "ordering-walk" | "ordering" => Some(walks::ordering_walk_scenario()),

        "select-first-day" | "first-day" => catalog::find_catalog_scenario("Select First Day"),
        "select-within-quota" | "within-quota" => {
            catalog::find_catalog_scenario("Select Within Quota")
        }
        "reject-at-quota" | "quota" => catalog::find_catalog_scenario("Reject At Quota"),
        "select-linked-pair" | "linked" => catalog::find_catalog_scenario("Select Linked Pair"),
        "deselect-linked-pair" | "unlink" => {
            catalog::find_catalog_scenario("Deselect Linked Pair")
        }
        "diff-after-edit" | "diff" => catalog::find_catalog_scenario("Diff After Edit"),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Random Walk Invariants"),
        ("quota-pressure", "Quota Pressure Walk"),
        ("deterministic-walk", "Deterministic Walk Replay"),
        ("ordering-walk", "Canonical Ordering Walk"),
        ("select-first-day", "Select First Day"),
        ("select-within-quota", "Select Within Quota"),
        ("reject-at-quota", "Reject At Quota"),
        ("select-linked-pair", "Select Linked Pair"),
        ("deselect-linked-pair", "Deselect Linked Pair"),
        ("diff-after-edit", "Diff After Edit"),
    ]
}
