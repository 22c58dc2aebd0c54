use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use trekday_engine::Itinerary;

use crate::common::scenario::{ScenarioKind, ScriptedCheck, TestScenario};
use crate::logic::walk::{WalkPlan, WalkSummary, run_walk};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    /// `None` for scripted scenarios, which do not depend on a seed.
    pub seed: Option<u64>,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// Inputs shared by every scenario in one run.
pub struct RunContext<'a> {
    /// Itinerary the walks run against.
    pub itinerary: &'a Itinerary,
    /// Reference fixture the scripted examples run against.
    pub fixture: &'a Itinerary,
    pub seeds: &'a [u64],
    pub iterations: usize,
}

pub struct LogicTester {
    verbose: bool,
    walk_steps: Option<usize>,
}

impl LogicTester {
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            walk_steps: None,
        }
    }

    /// Override the step count of every walk plan.
    #[must_use]
    pub const fn with_walk_steps(mut self, steps: Option<usize>) -> Self {
        self.walk_steps = steps;
        self
    }

    pub fn run_scenario(&self, scenario: &TestScenario, ctx: &RunContext<'_>) -> Vec<ScenarioResult> {
        match &scenario.kind {
            ScenarioKind::Scripted(check) => {
                if self.verbose {
                    println!(
                        "🧪 Checking scripted example: {}",
                        scenario.name.bright_white()
                    );
                }
                vec![self.run_scripted(&scenario.name, *check, ctx.fixture)]
            }
            ScenarioKind::Walk(plan) => {
                let plan = self.effective_plan(plan);
                ctx.seeds
                    .iter()
                    .map(|&seed| {
                        if self.verbose {
                            println!(
                                "🧪 Testing scenario: {} (itinerary: {} seed: {} steps: {})",
                                scenario.name.bright_white(),
                                ctx.itinerary.name(),
                                seed,
                                plan.steps
                            );
                        }
                        self.run_walk_scenario(&scenario.name, &plan, ctx, seed)
                    })
                    .collect()
            }
        }
    }

    fn effective_plan(&self, plan: &WalkPlan) -> WalkPlan {
        match self.walk_steps {
            Some(steps) => plan.clone().with_steps(steps),
            None => plan.clone(),
        }
    }

    fn run_scripted(&self, name: &str, check: ScriptedCheck, fixture: &Itinerary) -> ScenarioResult {
        let start_time = Instant::now();
        let outcome = check(fixture);
        let duration = start_time.elapsed();

        let (successes, failures) = match outcome {
            Ok(()) => (1, Vec::new()),
            Err(err) => {
                if self.verbose {
                    println!("  ❌ {}", format!("{err:#}").red());
                }
                (0, vec![format!("{err:#}")])
            }
        };

        ScenarioResult {
            scenario_name: name.to_string(),
            seed: None,
            passed: failures.is_empty(),
            iterations_run: 1,
            successful_iterations: successes,
            failures,
            average_duration: duration,
            performance_data: vec![duration],
        }
    }

    fn run_walk_scenario(
        &self,
        name: &str,
        plan: &WalkPlan,
        ctx: &RunContext<'_>,
        seed: u64,
    ) -> ScenarioResult {
        let (successes, failures, performance_data) =
            self.run_walk_iterations(plan, ctx, seed);

        let avg_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: name.to_string(),
            seed: Some(seed),
            passed: failures.is_empty(),
            iterations_run: ctx.iterations,
            successful_iterations: successes,
            failures,
            average_duration: avg_duration,
            performance_data,
        }
    }

    fn run_walk_iterations(
        &self,
        plan: &WalkPlan,
        ctx: &RunContext<'_>,
        seed: u64,
    ) -> (usize, Vec<String>, Vec<Duration>) {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..ctx.iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let summary = run_walk(ctx.itinerary, plan, iteration_seed);

            if let Some(err) = evaluate_expectations(plan, ctx.itinerary, &summary) {
                failures.push(format!(
                    "Iteration {} (seed {}, steps {}, final selection {:?}): {}",
                    i + 1,
                    summary.seed,
                    summary.steps.len(),
                    summary.final_selection.to_vec(),
                    err
                ));
                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        ctx.iterations,
                        err.red()
                    );
                }
            } else {
                successes += 1;
                let duration = start_time.elapsed();
                performance_data.push(duration);

                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) {}",
                        i + 1,
                        ctx.iterations,
                        summarize_walk(&summary)
                    );
                }
            }
        }

        (successes, failures, performance_data)
    }
}

fn evaluate_expectations(
    plan: &WalkPlan,
    itinerary: &Itinerary,
    summary: &WalkSummary,
) -> Option<String> {
    for expectation in &plan.expectations {
        if let Err(err) = expectation(itinerary, summary) {
            return Some(format!("{err:#}"));
        }
    }
    None
}

fn summarize_walk(summary: &WalkSummary) -> String {
    use crate::logic::walk::StepKind;

    format!(
        "selected:{} deselected:{} rejected:{} peak:{}",
        summary.count(StepKind::Selected),
        summary.count(StepKind::Deselected),
        summary.count(StepKind::Rejected),
        summary.peak_size()
    )
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let micros: Vec<u128> = durations.iter().map(Duration::as_micros).collect();
        micros.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(micros_vec
            .into_iter()
            .map(|m| Duration::from_micros(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
