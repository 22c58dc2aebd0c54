use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use trekday_engine::{DayNumber, Itinerary, SelectionState, ToggleOutcome, diff};

pub const DEFAULT_WALK_STEPS: usize = 200;

/// Share of steps that target a day outside the catalog.
const UNKNOWN_DAY_RATE: f64 = 0.05;

pub type WalkExpectation = fn(&Itinerary, &WalkSummary) -> Result<()>;

/// A seeded random toggle walk over one itinerary.
#[derive(Clone)]
pub struct WalkPlan {
    pub steps: usize,
    pub expectations: Vec<WalkExpectation>,
}

impl WalkPlan {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            steps: DEFAULT_WALK_STEPS,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: WalkExpectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

impl Default for WalkPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WalkPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkPlan")
            .field("steps", &self.steps)
            .field("expectations", &self.expectations.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Selected,
    Deselected,
    Rejected,
}

impl From<&ToggleOutcome> for StepKind {
    fn from(outcome: &ToggleOutcome) -> Self {
        match outcome {
            ToggleOutcome::Selected { .. } => Self::Selected,
            ToggleOutcome::Deselected { .. } => Self::Deselected,
            ToggleOutcome::Rejected { .. } => Self::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkStep {
    pub day: DayNumber,
    pub kind: StepKind,
    pub size_after: usize,
}

/// Everything observed during one walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkSummary {
    pub seed: u64,
    pub steps: Vec<WalkStep>,
    pub final_selection: SelectionState,
    /// Broken invariants, one message per offending step.
    pub violations: Vec<String>,
}

impl WalkSummary {
    #[must_use]
    pub fn count(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|step| step.kind == kind).count()
    }

    #[must_use]
    pub fn peak_size(&self) -> usize {
        self.steps
            .iter()
            .map(|step| step.size_after)
            .max()
            .unwrap_or(0)
    }
}

/// Walk `plan.steps` random toggles from the empty selection, checking the
/// engine's guarantees after every step.
#[must_use]
pub fn run_walk(itinerary: &Itinerary, plan: &WalkPlan, seed: u64) -> WalkSummary {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let days: Vec<DayNumber> = itinerary.catalog().day_numbers().collect();
    let stranger = unknown_day(&days);

    let mut current = SelectionState::empty();
    let mut steps = Vec::with_capacity(plan.steps);
    let mut violations = Vec::new();

    for index in 0..plan.steps {
        let day = match stranger {
            Some(stranger) if days.is_empty() || rng.gen_bool(UNKNOWN_DAY_RATE) => stranger,
            _ if days.is_empty() => break,
            _ => days[rng.gen_range(0..days.len())],
        };
        let needs_confirmation = itinerary.requires_confirmation(&current, day);
        let outcome = itinerary.toggle(&current, day);
        for message in check_step(itinerary, &current, day, needs_confirmation, &outcome) {
            violations.push(format!("step {} (day {day}): {message}", index + 1));
        }

        current = outcome.selection().clone();
        steps.push(WalkStep {
            day,
            kind: StepKind::from(&outcome),
            size_after: current.len(),
        });
    }

    WalkSummary {
        seed,
        steps,
        final_selection: current,
        violations,
    }
}

/// A day number outside the catalog: one past the largest day, or the
/// lowest free number when the largest is `u32::MAX`.
fn unknown_day(days: &[DayNumber]) -> Option<DayNumber> {
    let Some(max) = days.iter().map(|d| d.get()).max() else {
        return Some(DayNumber(1));
    };
    max.checked_add(1)
        .or_else(|| (0..u32::MAX).find(|n| !days.contains(&DayNumber(*n))))
        .map(DayNumber)
}

fn check_step(
    itinerary: &Itinerary,
    before: &SelectionState,
    day: DayNumber,
    needs_confirmation: bool,
    outcome: &ToggleOutcome,
) -> Vec<String> {
    let mut problems: Vec<String> = itinerary
        .audit(outcome.selection())
        .iter()
        .map(ToString::to_string)
        .collect();

    let change = diff(before, outcome.selection());
    match outcome {
        ToggleOutcome::Rejected { selection, .. } => {
            if selection != before {
                problems.push("rejection changed the selection".to_string());
            }
        }
        ToggleOutcome::Selected { .. } => {
            if !change.removed.is_empty() {
                problems.push("selection removed days".to_string());
            }
            let linked = itinerary.linkage().component_of(day).len() > 1;
            if needs_confirmation != linked {
                problems.push(format!(
                    "confirmation flag {needs_confirmation} but {} day(s) added",
                    change.added.len()
                ));
            }
        }
        ToggleOutcome::Deselected { .. } => {
            if !change.added.is_empty() {
                problems.push("deselection added days".to_string());
            }
            if needs_confirmation {
                problems.push("deselection asked for confirmation".to_string());
            }
        }
    }

    if outcome.is_accepted() {
        let undo = itinerary.toggle(outcome.selection(), day);
        if undo.selection() != before {
            problems.push("toggling again did not restore the previous selection".to_string());
        }
    }

    if itinerary.toggle(before, day) != *outcome {
        problems.push("toggle is not deterministic".to_string());
    }

    problems
}
