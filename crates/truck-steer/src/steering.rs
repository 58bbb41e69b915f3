//! Per-frame kinematic steering.
//!
//! Each frame the truck turns to face the pivot and, while driving, covers a
//! fixed fraction of the remaining horizontal distance. The approach is an
//! exponential decay rather than constant-speed travel, and nothing ever
//! moves the truck vertically.

use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::model::Transform3;

/// Fraction of the remaining distance covered per frame.
pub const DEFAULT_APPROACH_FACTOR: f32 = 0.03;

/// Correction between the model's authored forward axis (+X) and the
/// look-at axis (+Z), in degrees about +Y.
pub const DEFAULT_HEADING_OFFSET_DEGREES: f32 = -90.0;

/// Position and heading of the truck.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    /// Rotation about +Y in radians.
    pub yaw: f32,
}

impl Pose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Orientation as a quaternion.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// The model's front axis (local +X) in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Rigid transform placing the model's root.
    pub fn transform(&self) -> Transform3 {
        Transform3::from_translation(self.position).with_rotation(self.rotation())
    }

    /// Distance to `target` in the ground plane.
    pub fn horizontal_distance_to(&self, target: Vec3) -> f32 {
        horizontal(target - self.position).length()
    }
}

/// Tunable steering constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringParams {
    /// Fraction of the remaining horizontal distance covered per frame, in `(0, 1]`.
    pub approach_factor: f32,
    /// Heading correction applied after facing the pivot, in degrees.
    pub heading_offset_degrees: f32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            approach_factor: DEFAULT_APPROACH_FACTOR,
            heading_offset_degrees: DEFAULT_HEADING_OFFSET_DEGREES,
        }
    }
}

impl SteeringParams {
    /// Heading correction in radians.
    pub fn heading_offset(&self) -> f32 {
        self.heading_offset_degrees.to_radians()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.approach_factor > 0.0 && self.approach_factor <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "steering.approach_factor",
                value: self.approach_factor,
                expected: "(0, 1]",
            });
        }
        if !self.heading_offset_degrees.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "steering.heading_offset_degrees",
                value: self.heading_offset_degrees,
                expected: "a finite angle",
            });
        }
        Ok(())
    }
}

/// The per-frame steering update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SteeringEngine {
    params: SteeringParams,
}

impl SteeringEngine {
    pub fn new(params: SteeringParams) -> Self {
        Self { params }
    }

    /// Yaw that points the model's front at `target`, or `None` when the two
    /// share a horizontal position and no direction exists.
    pub fn facing_yaw(&self, from: Vec3, target: Vec3) -> Option<f32> {
        let delta = horizontal(target - from);
        if delta == Vec2::ZERO {
            return None;
        }
        // Look-at yaw turns +Z towards the target; the offset then brings
        // the model's +X there.
        let look = delta.x.atan2(delta.y);
        Some(wrap_angle(look + self.params.heading_offset()))
    }

    /// Advance one frame.
    ///
    /// Orientation always tracks the pivot; position only moves when
    /// `movement_enabled` is set. The vertical coordinate is never touched.
    /// The approach decays geometrically until `f32` rounding stalls it,
    /// roughly 1e-4 units from the pivot after a few hundred frames.
    pub fn step(&self, pose: Pose, pivot: Vec3, movement_enabled: bool) -> Pose {
        let yaw = self.facing_yaw(pose.position, pivot).unwrap_or(pose.yaw);

        let mut position = pose.position;
        if movement_enabled {
            let remaining = horizontal(pivot - position) * self.params.approach_factor;
            position.x += remaining.x;
            position.z += remaining.y;
        }

        Pose { position, yaw }
    }
}

/// Project onto the ground plane as `(x, z)`.
fn horizontal(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Wrap an angle into `(-π, π]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}
