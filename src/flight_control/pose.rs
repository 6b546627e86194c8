use std::fmt::{Display, Formatter};

/// A point or direction in the simulator's world frame.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }

    pub const fn zero() -> Self { Self::new(0.0, 0.0, 0.0) }

    /// Planar (x/y) euclidean distance to `other`.
    pub fn planar_dist(&self, other: &Vec3) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl Display for Vec3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.3}, {:.3}, {:.3}]", self.x, self.y, self.z)
    }
}

/// Orientation as a unit quaternion.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const fn identity() -> Self { Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 } }
}

impl Default for Quaternion {
    fn default() -> Self { Self::identity() }
}

/// Position and orientation of a simulated entity.
///
/// Poses are only ever written by the simulator's state broadcast. The control loop
/// reads them and *requests* changes through a `WorldLink`.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quaternion,
}

impl Pose {
    /// Creates an upright pose at the given position.
    pub const fn at(x: f64, y: f64, z: f64) -> Self {
        Self { position: Vec3::new(x, y, z), orientation: Quaternion::identity() }
    }

    /// Checks whether this pose has converged to `target`.
    ///
    /// The height is compared by magnitude since some odometry sources report it
    /// with a flipped sign.
    ///
    /// # Arguments
    /// * `target` - The pose that was requested.
    /// * `tol` - Maximum allowed deviation per component.
    pub fn converged_to(&self, target: &Pose, tol: f64) -> bool {
        let p = &self.position;
        let t = &target.position;
        (p.x - t.x).abs() <= tol && (p.y - t.y).abs() <= tol && (p.z.abs() - t.z).abs() <= tol
    }
}

/// Axis-aligned corridor the vehicle has to stay in during an episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub max_abs_y: f64,
}

impl FlightBounds {
    pub fn contains(&self, pos: &Vec3) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x && pos.y.abs() <= self.max_abs_y
    }

    /// The point the vehicle is heading for: the far end of the corridor, centered.
    pub fn goal(&self) -> Vec3 { Vec3::new(self.max_x, 0.0, 0.0) }
}
