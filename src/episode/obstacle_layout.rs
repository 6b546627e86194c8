use crate::flight_control::Pose;
use itertools::Itertools;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Grid of obstacle slots, each jittered independently on every reset.
///
/// Obstacle names are stable across resets, so the simulator only ever moves the
/// same entities around instead of spawning new ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleGrid {
    pub nx: usize,
    pub ny: usize,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Jitter range along x as a fraction of `spacing_x`, centered on the slot.
    pub jitter_x: f64,
    pub jitter_y: f64,
    pub height: f64,
    pub name_prefix: String,
}

impl Default for ObstacleGrid {
    fn default() -> Self {
        Self {
            nx: 15,
            ny: 10,
            spacing_x: 6.0,
            spacing_y: 6.0,
            offset_x: 5.0,
            offset_y: -27.0,
            jitter_x: 1.0 / 3.0,
            jitter_y: 1.0,
            height: 5.0,
            name_prefix: "unit_cylinder_".to_string(),
        }
    }
}

impl ObstacleGrid {
    pub fn len(&self) -> usize { self.nx * self.ny }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn name(&self, i: usize) -> String { format!("{}{i}", self.name_prefix) }

    /// Unperturbed slot centers, x-major like the obstacle naming.
    #[allow(clippy::cast_precision_loss)]
    pub fn slots(&self) -> Vec<(f64, f64)> {
        (0..self.nx)
            .cartesian_product(0..self.ny)
            .map(|(i, j)| {
                (
                    self.offset_x + i as f64 * self.spacing_x,
                    self.offset_y + j as f64 * self.spacing_y,
                )
            })
            .collect()
    }

    /// Jitters every slot with uniform noise drawn from `rng`.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vec<(String, Pose)> {
        let half_x = self.spacing_x * self.jitter_x / 2.0;
        let half_y = self.spacing_y * self.jitter_y / 2.0;
        self.slots()
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| {
                let dx = if half_x > 0.0 { rng.random_range(-half_x..half_x) } else { 0.0 };
                let dy = if half_y > 0.0 { rng.random_range(-half_y..half_y) } else { 0.0 };
                (self.name(i), Pose::at(x + dx, y + dy, self.height))
            })
            .collect()
    }

    /// A fresh layout from OS entropy, independent of the action-space seed.
    pub fn randomized(&self) -> Vec<(String, Pose)> { self.generate(&mut StdRng::from_os_rng()) }

    /// The layout without jitter.
    pub fn unperturbed(&self) -> Vec<(String, Pose)> {
        self.slots()
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| (self.name(i), Pose::at(x, y, self.height)))
            .collect()
    }
}
