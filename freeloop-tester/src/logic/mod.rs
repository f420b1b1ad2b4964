pub mod policy;
pub mod quiz_player;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use policy::Strategy;
pub use quiz_player::QuizProfile;
pub use reports::{CareerFailure, StrategyAggregate, aggregate};
pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use simulation::{CareerRecord, SimulationConfig, run_career};
