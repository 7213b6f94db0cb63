pub mod policy;
pub mod reports;
pub mod simulation;

pub use policy::GameplayStrategy;
pub use reports::RunResult;
pub use simulation::{RunRecord, SimulationConfig, run_simulation};
