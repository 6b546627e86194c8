use super::{obstacle_layout::ObstacleGrid, step_engine::StepContext};
use crate::error::EnvError;
use crate::flight_control::{ActuatorCommand, FlightMode, FlightModeController, Pose};
use crate::sensing::Observation;
use crate::sim_link::{ReferenceFrame, Service, ServiceError, WorldLink, wait_for_service};
use crate::timing::{pause, units};
use crate::{info, log, warn};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// Static parameters of the reset procedure.
#[derive(Debug, Clone)]
pub struct ResetPlan {
    pub vehicle: String,
    pub reset_pose: Pose,
    pub obstacles: Option<ObstacleGrid>,
    /// Jitter the obstacle grid from OS entropy, otherwise use the bare slots.
    pub randomize_obstacles: bool,
    /// Per-component deviation from the reset pose that counts as converged.
    pub tolerance: f64,
    /// `None` keeps relocating until the vehicle converges.
    pub max_relocation_attempts: Option<usize>,
    pub relocation_poll: Duration,
    pub service_wait: Duration,
    pub sync_wait: Duration,
    pub time_unit: Duration,
    /// Units to let the world settle after an autopilot-side reset.
    pub reset_settle: f64,
}

#[derive(Debug, Clone)]
pub struct ResetReport {
    pub obstacles_moved: usize,
    pub relocation_attempts: usize,
    pub observation: Arc<Observation>,
}

/// Owns the transition between two episodes.
pub struct EpisodeResetter {
    world: Arc<dyn WorldLink>,
    modes: Option<Arc<FlightModeController>>,
    ctx: StepContext,
    idle: ActuatorCommand,
    plan: ResetPlan,
}

impl EpisodeResetter {
    pub fn new(
        world: Arc<dyn WorldLink>,
        modes: Option<Arc<FlightModeController>>,
        ctx: StepContext,
        idle: ActuatorCommand,
        plan: ResetPlan,
    ) -> Self {
        Self { world, modes, ctx, idle, plan }
    }

    pub fn plan(&self) -> &ResetPlan { &self.plan }

    async fn world_ready(&self, service: Service, c_tok: &CancellationToken) -> Result<(), EnvError> {
        wait_for_service(&*self.world, service, self.plan.service_wait, c_tok)
            .await
            .map_err(|_| EnvError::Cancelled)
    }

    /// Brings an autopilot-controlled vehicle down to a known state before the world is
    /// rearranged.
    async fn reset_autopilot(&self, modes: &FlightModeController, c_tok: &CancellationToken) -> Result<(), EnvError> {
        let unit = |n| units(self.plan.time_unit, n);
        pause(unit(2.0), c_tok).await?;
        EnvError::advisory(modes.set_mode(FlightMode::Stabilize).await, "STABILIZE")?;
        pause(unit(2.0), c_tok).await?;
        info!("World RESET");
        self.world_ready(Service::ResetWorld, c_tok).await?;
        EnvError::advisory(self.world.reset_world().await, "World reset")?;
        pause(unit(self.plan.reset_settle), c_tok).await
    }

    async fn place_obstacles(&self, c_tok: &CancellationToken) -> Result<usize, EnvError> {
        let Some(grid) = &self.plan.obstacles else { return Ok(0) };
        let layout = if self.plan.randomize_obstacles { grid.randomized() } else { grid.unperturbed() };
        let mut moved = 0;
        for (name, pose) in layout {
            self.world_ready(Service::SetEntityState, c_tok).await?;
            let res = self.world.set_entity_pose(&name, pose, ReferenceFrame::Inherit).await;
            if EnvError::advisory(res, &format!("Placing {name}"))?.is_some() {
                moved += 1;
            }
        }
        info!("Obstacle positions updated ({moved}/{}).", grid.len());
        Ok(moved)
    }

    /// Re-issues the relocation request until the vehicle's broadcast pose matches the
    /// reset pose. Convergence is checked before every request.
    async fn relocate_vehicle(&self, c_tok: &CancellationToken) -> Result<usize, EnvError> {
        let target = self.plan.reset_pose;
        let mut attempts = 0;
        loop {
            let pose = self.ctx.telemetry.vehicle_pose();
            if pose.is_some_and(|p| p.converged_to(&target, self.plan.tolerance)) {
                return Ok(attempts);
            }
            if self.plan.max_relocation_attempts.is_some_and(|max| attempts >= max) {
                return Err(EnvError::ResetDiverged(attempts));
            }
            self.world_ready(Service::SetEntityState, c_tok).await?;
            match self.world.set_entity_pose(&self.plan.vehicle, target, ReferenceFrame::World).await {
                Ok(()) => log!(
                    "{} position updated, last known {}",
                    self.plan.vehicle,
                    pose.map_or_else(|| "unknown".to_string(), |p| p.position.to_string())
                ),
                Err(ServiceError::Cancelled) => return Err(EnvError::Cancelled),
                Err(e) => warn!("Relocating {} failed: {e}", self.plan.vehicle),
            }
            attempts += 1;
            pause(self.plan.relocation_poll, c_tok).await?;
        }
    }

    /// Ends the current episode and prepares the next one.
    ///
    /// The termination latch is cleared only after the first post-reset observation
    /// arrived, so nothing from the old episode can leak into the new one.
    ///
    /// # Errors
    /// `EnvError::Cancelled` if `c_tok` fires, `EnvError::ResetDiverged` if a bounded
    /// relocation loop gives up.
    pub async fn reset(&self, c_tok: &CancellationToken) -> Result<ResetReport, EnvError> {
        info!("Resetting episode, sending {}", self.idle);
        EnvError::advisory(self.ctx.actuator.publish(self.idle).await, "Idle command")?;
        if let Some(modes) = &self.modes {
            self.reset_autopilot(modes, c_tok).await?;
        }

        let obstacles_moved = self.place_obstacles(c_tok).await?;
        let relocation_attempts = self.relocate_vehicle(c_tok).await?;

        self.ctx.sync.mark_stale().await;
        let observation = self
            .ctx
            .sync
            .await_fresh(self.plan.sync_wait, c_tok)
            .await
            .map_err(|_| EnvError::Cancelled)?;
        self.ctx.latch.clear();
        Ok(ResetReport { obstacles_moved, relocation_attempts, observation })
    }
}
