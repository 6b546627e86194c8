/// Breakpoints of the range-shaped reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapingParams {
    /// Above this range the vehicle counts as flying safe.
    pub far_range: f64,
    /// Range at which the vehicle counts as crashed.
    pub crash_range: f64,
    pub reward_at_far: f64,
    pub reward_before_crash: f64,
    pub crash_reward: f64,
    pub safe_reward: f64,
    pub forward_bonus: f64,
}

impl Default for ShapingParams {
    fn default() -> Self {
        Self {
            far_range: 2.0,
            crash_range: 1.0,
            reward_at_far: 0.0,
            reward_before_crash: -5.0,
            crash_reward: -10.0,
            safe_reward: 0.25,
            forward_bonus: 0.25,
        }
    }
}

/// How a tick is scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RewardPolicy {
    /// Fixed per-tick rewards for the discretized ranging state.
    Discretized { forward: f64, other: f64, terminal: f64 },
    /// Piecewise-linear shaping in the minimum observed range.
    ContinuousShaped(ShapingParams),
}

impl RewardPolicy {
    pub fn discretized() -> Self { RewardPolicy::Discretized { forward: 5.0, other: 1.0, terminal: -200.0 } }

    pub fn shaped() -> Self { RewardPolicy::ContinuousShaped(ShapingParams::default()) }

    /// Scores one tick.
    ///
    /// # Arguments
    /// * `forward` - Whether the tick's action was the forward action.
    /// * `min_range` - Minimum range of the tick's observation.
    /// * `done` - Whether the episode ended during the tick.
    pub fn reward(&self, forward: bool, min_range: f64, done: bool) -> f64 {
        match self {
            RewardPolicy::Discretized { forward: fwd, other, terminal } => {
                if done {
                    *terminal
                } else if forward {
                    *fwd
                } else {
                    *other
                }
            }
            RewardPolicy::ContinuousShaped(p) => {
                if done {
                    p.crash_reward
                } else if min_range > p.far_range {
                    if forward { p.safe_reward + p.forward_bonus } else { p.safe_reward }
                } else {
                    // linear from `reward_at_far` at `far_range` to `reward_before_crash` at `crash_range`
                    let slope = (p.reward_before_crash - p.reward_at_far) / (p.crash_range - p.far_range);
                    p.reward_at_far + slope * (min_range - p.far_range)
                }
            }
        }
    }
}
