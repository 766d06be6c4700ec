pub mod live;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use live::run_live_session;
pub use policy::{AnswerDecision, GameplayStrategy, PlayerPolicy};
pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use simulation::{GameTester, SimulationExpectation, SimulationPlan, SimulationSummary};
pub use tester::*;
