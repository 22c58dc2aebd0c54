pub mod reports;
pub mod seeds;
pub mod tester;
pub mod walk;

pub use seeds::resolve_seed_inputs;
pub use tester::*;
pub use walk::WalkPlan;
