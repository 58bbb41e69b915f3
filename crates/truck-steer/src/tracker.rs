//! The pivot the truck steers towards.

use glam::{Vec2, Vec3};

use crate::pick::{HitResult, PickCamera, cast_ray};
use crate::shape::Intersect;

/// Holds the pivot and updates it from pointer movement over the ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetTracker {
    pivot: Vec3,
}

impl TargetTracker {
    /// Start with the pivot at `initial`.
    pub fn new(initial: Vec3) -> Self {
        Self { pivot: initial }
    }

    /// A pivot directly at the truck's own position, so the first frames
    /// leave its heading alone.
    pub fn beneath(vehicle_position: Vec3) -> Self {
        Self::new(vehicle_position)
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    /// Where a ground marker of the given rest height should stand.
    pub fn marker_position(&self, rest_height: f32) -> Vec3 {
        Vec3::new(self.pivot.x, rest_height, self.pivot.z)
    }

    /// Handle a pointer move: pick the ground and retarget on a hit.
    ///
    /// The pivot's height is pinned to `vehicle_height` whatever the ground's
    /// height at the hit, keeping steering planar. A miss leaves the pivot
    /// unchanged.
    pub fn on_pointer_move(
        &mut self,
        pointer_ndc: Vec2,
        camera: &PickCamera,
        ground: &[&dyn Intersect],
        vehicle_height: f32,
    ) -> HitResult {
        let hit = cast_ray(pointer_ndc, camera, ground);
        if let Some(point) = hit.point() {
            self.retarget(point, vehicle_height);
        }
        hit
    }

    /// Move the pivot over a ground point.
    pub fn retarget(&mut self, ground_point: Vec3, vehicle_height: f32) {
        self.pivot = Vec3::new(ground_point.x, vehicle_height, ground_point.z);
        tracing::trace!(pivot = ?self.pivot, "pivot moved");
    }
}
