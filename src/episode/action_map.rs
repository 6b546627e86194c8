use crate::error::EnvError;
use crate::flight_control::{ActuatorCommand, FlightCommand, RC_NEUTRAL, VelocityCommand};

/// Pitch pulse width of the forward heading.
const FORWARD_PITCH: u16 = 1450;
/// Pitch pulse width of the back-off heading.
const BACK_OFF_PITCH: u16 = 1550;
/// Yaw offset between two neighbouring headings of the bank.
const YAW_STEP: u16 = 150;

/// Fixed lookup from a discrete action index to one actuator command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionMap {
    /// Eight RC override headings: forward, three graduated turns to either side, back-off.
    HeadingBank,
    /// Constant forward speed with a yaw rate proportional to the distance from `center`.
    TurnRate { actions: usize, center: usize, speed: f64, step_deg: f64 },
}

impl ActionMap {
    pub fn turn_rate() -> Self { ActionMap::TurnRate { actions: 9, center: 4, speed: 2.5, step_deg: 10.0 } }

    pub fn num_actions(&self) -> usize {
        match self {
            ActionMap::HeadingBank => 8,
            ActionMap::TurnRate { actions, .. } => *actions,
        }
    }

    /// The action that keeps the current heading. Rewarded as "forward-safe".
    pub fn forward_action(&self) -> usize {
        match self {
            ActionMap::HeadingBank => 0,
            ActionMap::TurnRate { center, .. } => *center,
        }
    }

    /// Builds a fresh command for `action`.
    ///
    /// # Errors
    /// `EnvError::InvalidAction` if `action` is outside the action space.
    pub fn command(&self, action: usize) -> Result<ActuatorCommand, EnvError> {
        if action >= self.num_actions() {
            return Err(EnvError::InvalidAction(action));
        }
        Ok(match self {
            ActionMap::HeadingBank => {
                let base = FlightCommand::new().with_throttle(RC_NEUTRAL).with_pitch(FORWARD_PITCH);
                #[allow(clippy::cast_possible_truncation)]
                let cmd = match action {
                    0 => base.with_yaw(RC_NEUTRAL),
                    1..=3 => base.with_yaw(RC_NEUTRAL + YAW_STEP * action as u16),
                    4..=6 => base.with_yaw(RC_NEUTRAL - YAW_STEP * (action as u16 - 3)),
                    _ => base.with_pitch(BACK_OFF_PITCH).with_yaw(RC_NEUTRAL),
                };
                ActuatorCommand::RcOverride(cmd)
            }
            ActionMap::TurnRate { center, speed, step_deg, .. } => {
                #[allow(clippy::cast_precision_loss)]
                let offset = action as f64 - *center as f64;
                ActuatorCommand::Velocity(VelocityCommand::forward_turn(
                    *speed,
                    (offset * step_deg).to_radians(),
                ))
            }
        })
    }

    /// Command published after the hold period of a tick, `None` if the command
    /// stays active until the next tick.
    pub fn release(&self) -> Option<ActuatorCommand> {
        match self {
            ActionMap::HeadingBank => Some(ActuatorCommand::RcOverride(
                FlightCommand::new().with_throttle(RC_NEUTRAL).with_pitch(RC_NEUTRAL),
            )),
            ActionMap::TurnRate { .. } => None,
        }
    }

    /// Command that brings the vehicle to rest before a reset.
    pub fn idle(&self) -> ActuatorCommand {
        match self {
            ActionMap::HeadingBank => ActuatorCommand::RcOverride(FlightCommand::new()),
            ActionMap::TurnRate { .. } => ActuatorCommand::Velocity(VelocityCommand::zero()),
        }
    }
}
