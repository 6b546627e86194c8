mod action_map;
mod nav_env;
mod obstacle_layout;
mod resetter;
mod reward;
mod step_engine;
mod termination;
#[cfg(test)]
mod tests;

pub use action_map::ActionMap;
pub use nav_env::{NavEnv, SimLinks, sensing_for};
pub use obstacle_layout::ObstacleGrid;
pub use resetter::{EpisodeResetter, ResetPlan, ResetReport};
pub use reward::{RewardPolicy, ShapingParams};
pub use step_engine::{EpisodeState, ScanDiscretization, StepContext, StepEngine, StepInfo, StepResult};
pub use termination::{TerminationLatch, TerminationReason};
