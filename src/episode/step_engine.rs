use super::{
    action_map::ActionMap,
    reward::RewardPolicy,
    termination::{TerminationLatch, TerminationReason},
};
use crate::error::EnvError;
use crate::flight_control::{FlightBounds, Vec3};
use crate::sensing::{Observation, SensorSynchronizer, TelemetryHub};
use crate::sim_link::ActuatorSink;
use crate::timing::{pause, units};
use crate::{step, warn};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// Decimation of the scan handed out with every tick, including the proximity check
/// that runs over the raw readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanDiscretization {
    pub bins: Option<usize>,
    pub proximity: f64,
}

/// Side information of a tick. Never part of the reward.
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    pub tick: usize,
    pub termination: Option<TerminationReason>,
    pub min_range: f64,
    pub discretized: Option<Vec<u16>>,
    pub goal_distance: Option<f64>,
    /// `(max_x - goal_distance) / max_x`, 1.0 at the goal.
    pub goal_progress: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub observation: Arc<Observation>,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// What the control loop currently knows about the running episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeState {
    pub position: Option<Vec3>,
    pub min_range: Option<f64>,
    pub done: bool,
}

/// Everything a [`StepEngine`] reads from and writes to.
#[derive(Clone)]
pub struct StepContext {
    pub actuator: Arc<dyn ActuatorSink>,
    pub sync: Arc<SensorSynchronizer>,
    pub telemetry: Arc<TelemetryHub>,
    pub latch: Arc<TerminationLatch>,
}

/// Runs one actuation tick: command, fresh observation, termination and reward.
pub struct StepEngine {
    ctx: StepContext,
    actions: ActionMap,
    reward: RewardPolicy,
    bounds: Option<FlightBounds>,
    discretization: Option<ScanDiscretization>,
    time_unit: Duration,
    sync_wait: Duration,
    tick: usize,
}

impl StepEngine {
    pub fn new(
        ctx: StepContext,
        actions: ActionMap,
        reward: RewardPolicy,
        bounds: Option<FlightBounds>,
        discretization: Option<ScanDiscretization>,
        time_unit: Duration,
        sync_wait: Duration,
    ) -> Self {
        Self { ctx, actions, reward, bounds, discretization, time_unit, sync_wait, tick: 0 }
    }

    pub fn actions(&self) -> &ActionMap { &self.actions }

    /// Restarts the tick counter for a new episode.
    pub fn restart(&mut self) { self.tick = 0; }

    pub fn episode_state(&self) -> EpisodeState {
        EpisodeState {
            position: self.ctx.telemetry.vehicle_position(),
            min_range: self.ctx.sync.min_range(),
            done: self.ctx.latch.is_done(),
        }
    }

    async fn actuate(&self, action: usize, c_tok: &CancellationToken) -> Result<(), EnvError> {
        let cmd = self.actions.command(action)?;
        EnvError::advisory(self.ctx.actuator.publish(cmd).await, "Actuator command")?;
        if let Some(release) = self.actions.release() {
            // hold, then go back to neutral so the command cannot leak into the next tick
            pause(units(self.time_unit, 1.0), c_tok).await?;
            EnvError::advisory(self.ctx.actuator.publish(release).await, "Actuator release")?;
            pause(units(self.time_unit, 1.0), c_tok).await?;
        }
        Ok(())
    }

    /// Applies `action` and scores the resulting observation.
    ///
    /// # Errors
    /// `EnvError::InvalidAction` for an index outside the action space (nothing is
    /// published then), `EnvError::Cancelled` if `c_tok` fires during a wait.
    pub async fn step(&mut self, action: usize, c_tok: &CancellationToken) -> Result<StepResult, EnvError> {
        self.actuate(action, c_tok).await?;

        self.ctx.sync.mark_stale().await;
        let observation = self
            .ctx
            .sync
            .await_fresh(self.sync_wait, c_tok)
            .await
            .map_err(|_| EnvError::Cancelled)?;
        self.tick += 1;

        let position = self.ctx.telemetry.vehicle_position();
        if let (Some(bounds), Some(pos)) = (&self.bounds, position) {
            if !bounds.contains(&pos) && self.ctx.latch.latch(TerminationReason::BoundaryViolation { x: pos.x, y: pos.y }) {
                warn!("Went out of range at {pos}. Ending episode.");
            }
        }

        let min_range = observation.min_range();
        let discretized = self.discretization.map(|d| {
            let disc = observation.scan().discretize(d.bins, d.proximity);
            if disc.proximity_alert && self.ctx.latch.latch(TerminationReason::RangeCrash { min_range }) {
                warn!("Obstacle closer than {}. Ending episode.", d.proximity);
            }
            disc.bins
        });

        let termination = self.ctx.latch.reason();
        let done = termination.is_some();
        let forward = action == self.actions.forward_action();
        let reward = self.reward.reward(forward, min_range, done);

        let goal = self.bounds.map(|b| b.goal());
        let goal_distance = goal.zip(position).map(|(g, p)| p.planar_dist(&g));
        let goal_progress = goal.zip(goal_distance).map(|(g, d)| (g.x - d) / g.x);

        step!(
            tick: self.tick,
            action: action,
            min_range: min_range,
            goal_dist: goal_distance,
            reward: reward,
            done: done,
        );
        Ok(StepResult {
            observation,
            reward,
            done,
            info: StepInfo { tick: self.tick, termination, min_range, discretized, goal_distance, goal_progress },
        })
    }
}
