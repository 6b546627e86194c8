use strum_macros::{Display, EnumIter};

/// Autopilot flight modes used by the control loop.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter)]
pub enum FlightMode {
    Stabilize,
    Guided,
    AltHold,
}

impl From<&str> for FlightMode {
    fn from(value: &str) -> Self {
        match value.to_uppercase().as_str() {
            "GUIDED" => FlightMode::Guided,
            "ALT_HOLD" => FlightMode::AltHold,
            _ => FlightMode::Stabilize,
        }
    }
}

impl From<FlightMode> for &'static str {
    fn from(value: FlightMode) -> Self {
        match value {
            FlightMode::Stabilize => "STABILIZE",
            FlightMode::Guided => "GUIDED",
            FlightMode::AltHold => "ALT_HOLD",
        }
    }
}
