use super::pose::Vec3;

/// Number of RC override channels the autopilot accepts.
pub const RC_CHANNELS: usize = 8;
/// Channel value telling the autopilot to ignore the override for that channel.
pub const RC_NO_OVERRIDE: u16 = 0;
/// Center of the pulse-width range; hover throttle and neutral stick.
pub const RC_NEUTRAL: u16 = 1500;

// channel 0 (roll) is never driven and always carries RC_NO_OVERRIDE
const PITCH: usize = 1;
const THROTTLE: usize = 2;
const YAW: usize = 3;

/// A single RC override frame.
///
/// Every control tick builds a fresh command starting from [`FlightCommand::new`], so
/// channels that are not set explicitly always carry [`RC_NO_OVERRIDE`] instead of a
/// value left over from the previous tick.
#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightCommand {
    channels: [u16; RC_CHANNELS],
}

impl FlightCommand {
    pub const fn new() -> Self { Self { channels: [RC_NO_OVERRIDE; RC_CHANNELS] } }

    /// Throttle at hover, every other channel released.
    pub const fn neutral_hold() -> Self { Self::new().with_throttle(RC_NEUTRAL) }

    pub const fn with_pitch(self, val: u16) -> Self { self.with_channel(PITCH, val) }
    pub const fn with_throttle(self, val: u16) -> Self { self.with_channel(THROTTLE, val) }
    pub const fn with_yaw(self, val: u16) -> Self { self.with_channel(YAW, val) }

    const fn with_channel(mut self, i: usize, val: u16) -> Self {
        self.channels[i] = val;
        self
    }

    pub fn pitch(&self) -> u16 { self.channels[PITCH] }
    pub fn throttle(&self) -> u16 { self.channels[THROTTLE] }
    pub fn yaw(&self) -> u16 { self.channels[YAW] }
    pub fn channels(&self) -> &[u16; RC_CHANNELS] { &self.channels }
}

impl Default for FlightCommand {
    fn default() -> Self { Self::new() }
}

/// Body-frame velocity setpoint for backends that accept twist commands.
#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityCommand {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl VelocityCommand {
    pub const fn zero() -> Self { Self { linear: Vec3::zero(), angular: Vec3::zero() } }

    /// Constant forward speed while turning at `yaw_rate` rad/s.
    pub const fn forward_turn(speed: f64, yaw_rate: f64) -> Self {
        Self { linear: Vec3::new(speed, 0.0, 0.0), angular: Vec3::new(0.0, 0.0, yaw_rate) }
    }
}

/// The command published on the actuator channel during one control tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCommand {
    RcOverride(FlightCommand),
    Velocity(VelocityCommand),
}

impl std::fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActuatorCommand::RcOverride(cmd) => write!(f, "RC {:?}", cmd.channels()),
            ActuatorCommand::Velocity(cmd) => {
                write!(f, "VEL lin {} ang {}", cmd.linear, cmd.angular)
            }
        }
    }
}
