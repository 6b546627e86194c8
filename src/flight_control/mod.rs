mod flight_command;
mod flight_mode;
mod mode_controller;
mod pose;
mod takeoff_sequencer;
#[cfg(test)]
mod tests;

pub use flight_command::{
    ActuatorCommand, FlightCommand, RC_CHANNELS, RC_NEUTRAL, RC_NO_OVERRIDE, VelocityCommand,
};
pub use flight_mode::FlightMode;
pub use mode_controller::FlightModeController;
pub use pose::{FlightBounds, Pose, Quaternion, Vec3};
pub use takeoff_sequencer::{
    TakeoffFailure, TakeoffOutcome, TakeoffReport, TakeoffSequencer, TakeoffState, TakeoffTiming,
};
