use crate::episode::{ActionMap, ObstacleGrid, ResetPlan, RewardPolicy, ScanDiscretization};
use crate::flight_control::{FlightBounds, Pose, TakeoffTiming};
use crate::warn;
use std::{str::FromStr, time::Duration};
use strum_macros::Display;

const DEFAULT_BRIDGE_URL: &str = "http://localhost:8000";

/// The simulated vehicle and how it is actuated.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Autopilot-flown multicopter, RC override headings, discretized reward.
    RcOverride,
    /// Kinematic vehicle taking velocity setpoints, range-shaped reward.
    Velocity,
}

impl From<&str> for Backend {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "velocity" | "fakesim" | "dji" => Backend::Velocity,
            _ => Backend::RcOverride,
        }
    }
}

/// Every constant of the environment. Durations other than [`EnvConfig::time_unit`]
/// and [`EnvConfig::sync_slop`] are given in time units.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub backend: Backend,
    pub bridge_url: String,
    pub time_unit: Duration,
    pub service_wait: f64,
    pub telemetry_wait: f64,
    pub model_state_wait: f64,
    pub sync_wait: f64,
    /// Maximum stamp difference of a ranging scan and a camera frame to be paired.
    pub sync_slop: Duration,
    pub takeoff_altitude: f64,
    /// Factor from the simulator's entity-state height to the autopilot's altitude.
    pub altitude_scale: f64,
    pub vehicle_name: String,
    pub reset_pose: Pose,
    pub bounds: Option<FlightBounds>,
    pub obstacles: Option<ObstacleGrid>,
    pub randomize_obstacles: bool,
    pub reset_tolerance: f64,
    pub max_relocation_attempts: Option<usize>,
    pub relocation_poll: f64,
    /// Target number of discretized scan bins, `None` keeps every reading.
    pub scan_bins: Option<usize>,
    /// Raw-reading distance that ends the episode, checked at step time.
    pub proximity_range: Option<f64>,
    /// Minimum range that ends the episode, checked on every synchronized pair.
    pub crash_range: Option<f64>,
    pub startup_countdown: u32,
    pub reset_settle: f64,
}

impl EnvConfig {
    pub fn for_backend(backend: Backend) -> Self {
        let base = Self {
            backend,
            bridge_url: DEFAULT_BRIDGE_URL.to_string(),
            time_unit: Duration::from_secs(1),
            service_wait: 5.0,
            telemetry_wait: 5.0,
            model_state_wait: 10.0,
            sync_wait: 5.0,
            sync_slop: Duration::from_millis(50),
            takeoff_altitude: 2.0,
            altitude_scale: 1.0,
            vehicle_name: String::new(),
            reset_pose: Pose::default(),
            bounds: None,
            obstacles: None,
            randomize_obstacles: true,
            reset_tolerance: 1e-2,
            max_relocation_attempts: None,
            relocation_poll: 0.1,
            scan_bins: None,
            proximity_range: None,
            crash_range: None,
            startup_countdown: 10,
            reset_settle: 3.0,
        };
        match backend {
            Backend::RcOverride => Self {
                vehicle_name: "erlecopter".to_string(),
                reset_pose: Pose::at(0.0, 0.0, 0.0),
                altitude_scale: 2.0,
                proximity_range: Some(2.5),
                ..base
            },
            Backend::Velocity => Self {
                vehicle_name: "dji".to_string(),
                reset_pose: Pose::at(0.0, 0.0, 2.0),
                bounds: Some(FlightBounds { min_x: 0.0, max_x: 90.0, max_abs_y: 30.0 }),
                obstacles: Some(ObstacleGrid::default()),
                crash_range: Some(1.0),
                ..base
            },
        }
    }

    /// Defaults of `NAV_BACKEND` overlaid with the process environment.
    pub fn from_env() -> Self { Self::from_lookup(|key| std::env::var(key).ok()) }

    /// Like [`EnvConfig::from_env`] but reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let backend = lookup("NAV_BACKEND").map_or(Backend::RcOverride, |b| Backend::from(b.as_str()));
        let mut config = Self::for_backend(backend);
        if let Some(url) = lookup("NAV_BRIDGE_URL") {
            config.bridge_url = url;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "NAV_TIME_UNIT_MS") {
            config.time_unit = Duration::from_millis(ms);
        }
        if let Some(val) = lookup("NAV_RANDOMIZE_OBSTACLES") {
            config.randomize_obstacles = matches!(val.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(max) = parse_var::<usize>(&lookup, "NAV_MAX_RELOCATIONS") {
            config.max_relocation_attempts = Some(max);
        }
        if let Some(bins) = parse_var::<usize>(&lookup, "NAV_SCAN_BINS") {
            config.scan_bins = Some(bins);
        }
        config
    }

    pub fn units(&self, n: f64) -> Duration { crate::timing::units(self.time_unit, n) }

    /// Whether the vehicle is flown by an autopilot that has to take off.
    pub fn needs_autopilot(&self) -> bool { self.backend == Backend::RcOverride }

    pub fn action_map(&self) -> ActionMap {
        match self.backend {
            Backend::RcOverride => ActionMap::HeadingBank,
            Backend::Velocity => ActionMap::turn_rate(),
        }
    }

    pub fn reward_policy(&self) -> RewardPolicy {
        match self.backend {
            Backend::RcOverride => RewardPolicy::discretized(),
            Backend::Velocity => RewardPolicy::shaped(),
        }
    }

    pub fn discretization(&self) -> Option<ScanDiscretization> {
        self.proximity_range.map(|proximity| ScanDiscretization { bins: self.scan_bins, proximity })
    }

    pub fn takeoff_timing(&self) -> TakeoffTiming {
        TakeoffTiming {
            time_unit: self.time_unit,
            telemetry_wait: self.units(self.telemetry_wait),
            model_state_wait: self.units(self.model_state_wait),
            altitude_scale: self.altitude_scale,
        }
    }

    pub fn reset_plan(&self) -> ResetPlan {
        ResetPlan {
            vehicle: self.vehicle_name.clone(),
            reset_pose: self.reset_pose,
            obstacles: self.obstacles.clone(),
            randomize_obstacles: self.randomize_obstacles,
            tolerance: self.reset_tolerance,
            max_relocation_attempts: self.max_relocation_attempts,
            relocation_poll: self.units(self.relocation_poll),
            service_wait: self.units(self.service_wait),
            sync_wait: self.units(self.sync_wait),
            time_unit: self.time_unit,
            reset_settle: self.reset_settle,
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = raw.trim().parse::<T>().ok();
    if parsed.is_none() {
        warn!("Ignoring {key}={raw}: not a valid value");
    }
    parsed
}
