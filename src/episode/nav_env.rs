use super::{
    resetter::EpisodeResetter,
    step_engine::{EpisodeState, StepContext, StepEngine, StepResult},
    termination::TerminationLatch,
};
use crate::config::EnvConfig;
use crate::error::EnvError;
use crate::flight_control::{FlightModeController, TakeoffReport, TakeoffSequencer};
use crate::sensing::{Observation, SensorSynchronizer, TelemetryHub};
use crate::sim_link::{ActuatorSink, AutopilotLink, WorldLink};
use crate::timing::pause;
use crate::{info, log};
use chrono::TimeDelta;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The collaborators an environment talks to.
#[derive(Clone)]
pub struct SimLinks {
    /// Only needed by backends flown through an autopilot.
    pub autopilot: Option<Arc<dyn AutopilotLink>>,
    pub world: Arc<dyn WorldLink>,
    pub actuator: Arc<dyn ActuatorSink>,
}

/// Builds the telemetry hub and the sensor synchronizer `config` asks for, both
/// feeding `latch`.
pub fn sensing_for(
    config: &EnvConfig,
    latch: &Arc<TerminationLatch>,
) -> (Arc<TelemetryHub>, Arc<SensorSynchronizer>) {
    let slop = TimeDelta::from_std(config.sync_slop).unwrap_or(TimeDelta::milliseconds(50));
    let hub = TelemetryHub::new(config.bounds, Arc::clone(latch));
    let sync = SensorSynchronizer::new(slop, config.crash_range, Arc::clone(latch));
    (Arc::new(hub), Arc::new(sync))
}

/// Episodic environment exposed to a learner: `reset`, `step`, `seed`.
pub struct NavEnv {
    config: EnvConfig,
    ctx: StepContext,
    modes: Option<Arc<FlightModeController>>,
    takeoff: Option<TakeoffSequencer>,
    engine: StepEngine,
    resetter: EpisodeResetter,
    rng: StdRng,
    c_tok: CancellationToken,
    episode: usize,
}

impl NavEnv {
    /// Wires the environment for `config.backend`.
    ///
    /// # Errors
    /// `EnvError::MissingAutopilot` if the backend is autopilot-flown but `links` has
    /// no autopilot.
    pub fn new(
        links: SimLinks,
        telemetry: Arc<TelemetryHub>,
        sync: Arc<SensorSynchronizer>,
        latch: Arc<TerminationLatch>,
        config: EnvConfig,
        c_tok: CancellationToken,
    ) -> Result<Self, EnvError> {
        let ctx = StepContext { actuator: links.actuator, sync, telemetry, latch };
        let modes = if config.needs_autopilot() {
            let link = links.autopilot.ok_or(EnvError::MissingAutopilot)?;
            Some(Arc::new(FlightModeController::new(
                link,
                config.units(config.service_wait),
                c_tok.clone(),
            )))
        } else {
            None
        };
        let takeoff = modes.as_ref().map(|m| {
            TakeoffSequencer::new(
                Arc::clone(m),
                Arc::clone(&ctx.telemetry),
                Arc::clone(&ctx.actuator),
                &config.vehicle_name,
                config.takeoff_timing(),
            )
        });
        let actions = config.action_map();
        let engine = StepEngine::new(
            ctx.clone(),
            actions,
            config.reward_policy(),
            config.bounds,
            config.discretization(),
            config.time_unit,
            config.units(config.sync_wait),
        );
        let resetter =
            EpisodeResetter::new(links.world, modes.clone(), ctx.clone(), actions.idle(), config.reset_plan());
        Ok(Self {
            config,
            ctx,
            modes,
            takeoff,
            engine,
            resetter,
            rng: StdRng::from_os_rng(),
            c_tok,
            episode: 0,
        })
    }

    pub fn config(&self) -> &EnvConfig { &self.config }

    pub fn action_space(&self) -> usize { self.engine.actions().num_actions() }

    pub fn episode(&self) -> usize { self.episode }

    pub fn episode_state(&self) -> EpisodeState { self.engine.episode_state() }

    /// One-time startup of an autopilot-flown vehicle: parameter repair, a countdown
    /// and the first takeoff.
    ///
    /// # Errors
    /// `EnvError::Cancelled` if the root token fires.
    pub async fn initialize(&mut self) -> Result<Option<TakeoffReport>, EnvError> {
        let (Some(modes), Some(takeoff)) = (&self.modes, &mut self.takeoff) else {
            return Ok(None);
        };
        EnvError::advisory(modes.repair_rtl_altitude().await, "RTL_ALT repair")?;
        for remaining in (1..=self.config.startup_countdown).rev() {
            info!("Taking off in {remaining}s");
            pause(self.config.units(1.0), &self.c_tok).await?;
        }
        takeoff.run(self.config.takeoff_altitude, &self.c_tok).await.map(Some)
    }

    /// Starts a new episode and returns its first observation.
    ///
    /// # Errors
    /// `EnvError::Cancelled` if the root token fires, `EnvError::ResetDiverged` if the
    /// vehicle cannot be relocated within the configured attempts.
    pub async fn reset(&mut self) -> Result<Arc<Observation>, EnvError> {
        let report = self.resetter.reset(&self.c_tok).await?;
        log!(
            "Reset done: {} obstacles moved, {} relocation requests",
            report.obstacles_moved,
            report.relocation_attempts
        );
        let observation = if let Some(takeoff) = &mut self.takeoff {
            takeoff.run(self.config.takeoff_altitude, &self.c_tok).await?;
            self.ctx.sync.mark_stale().await;
            self.ctx
                .sync
                .await_fresh(self.config.units(self.config.sync_wait), &self.c_tok)
                .await
                .map_err(|_| EnvError::Cancelled)?
        } else {
            report.observation
        };
        self.engine.restart();
        self.episode += 1;
        info!("Episode {} started", self.episode);
        Ok(observation)
    }

    /// Applies `action` for one tick.
    ///
    /// # Errors
    /// `EnvError::InvalidAction` for indices outside the action space,
    /// `EnvError::Cancelled` if the root token fires.
    pub async fn step(&mut self, action: usize) -> Result<StepResult, EnvError> {
        self.engine.step(action, &self.c_tok).await
    }

    /// Reseeds the action-space RNG. `None` draws a fresh seed from OS entropy.
    ///
    /// # Returns
    /// The seed actually used.
    pub fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        self.rng = StdRng::seed_from_u64(seed);
        vec![seed]
    }

    /// Draws a uniformly random action from the seeded RNG.
    pub fn sample_action(&mut self) -> usize {
        let n = self.action_space();
        self.rng.random_range(0..n)
    }
}
