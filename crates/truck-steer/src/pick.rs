//! Surface hit-testing: pointer coordinates to world-space hits.
//!
//! A pointer position is first normalised to device coordinates, then
//! unprojected through the camera into a [`Ray`], which is tested against an
//! explicit set of target shapes. Only the supplied targets are considered,
//! so a vehicle pick never matches the ground and vice versa.

use glam::{Mat4, Vec2, Vec3};

use crate::shape::Intersect;

/// Clip-space depths used to unproject the pointer.
///
/// Both lie strictly inside the depth range of OpenGL-style (`[-1, 1]`),
/// `[0, 1]` and reverse-Z infinite projections, so either convention yields
/// two finite points on the pick line.
const UNPROJECT_DEPTHS: (f32, f32) = (0.25, 0.75);

/// A half-line with a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalising the direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Outcome of a pick. Produced and consumed within a single pointer event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitResult {
    /// The ray struck a target.
    Hit {
        /// World-space intersection point.
        point: Vec3,
        /// Distance from the ray origin.
        distance: f32,
    },
    /// Nothing was hit.
    Miss,
}

impl HitResult {
    /// The hit point, if any.
    pub fn point(&self) -> Option<Vec3> {
        match self {
            Self::Hit { point, .. } => Some(*point),
            Self::Miss => None,
        }
    }

    /// Whether the pick struck a target.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }
}

/// Camera state needed to turn pointer coordinates into rays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickCamera {
    /// Camera-to-world transform.
    pub world_from_view: Mat4,
    /// Projection matrix.
    pub clip_from_view: Mat4,
}

impl PickCamera {
    /// Create a pick camera from its world transform and projection.
    pub fn new(world_from_view: Mat4, clip_from_view: Mat4) -> Self {
        Self {
            world_from_view,
            clip_from_view,
        }
    }

    /// Build the pick ray through a pointer position in normalised device
    /// coordinates.
    ///
    /// The ray starts on the camera plane and points away from the camera.
    /// Returns `None` for a degenerate projection.
    pub fn ray(&self, ndc: Vec2) -> Option<Ray> {
        // Unproject in view space, where coordinates stay small, then move
        // the finished line into the world.
        let view_from_clip = self.clip_from_view.inverse();
        let a = view_from_clip.project_point3(ndc.extend(UNPROJECT_DEPTHS.0));
        let b = view_from_clip.project_point3(ndc.extend(UNPROJECT_DEPTHS.1));
        if !a.is_finite() || !b.is_finite() {
            return None;
        }

        let mut direction = (b - a).normalize_or_zero();
        // Depth conventions disagree on which unprojected point is nearer;
        // the view looks down -Z.
        if direction.z > 0.0 {
            direction = -direction;
        }
        if direction.z.abs() < f32::EPSILON {
            return None;
        }

        // Slide along the line to the z = 0 plane through the camera.
        let origin = a - direction * (a.z / direction.z);

        let direction = self
            .world_from_view
            .transform_vector3(direction)
            .normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        Some(Ray {
            origin: self.world_from_view.transform_point3(origin),
            direction,
        })
    }
}

/// Convert a window-space pointer position to normalised device coordinates.
///
/// Window coordinates have their origin at the top-left with y growing
/// downwards; NDC spans `[-1, 1]` with y up. Returns `None` for an empty
/// viewport.
pub fn pointer_to_ndc(cursor: Vec2, viewport_size: Vec2) -> Option<Vec2> {
    if viewport_size.x <= 0.0 || viewport_size.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        (cursor.x / viewport_size.x) * 2.0 - 1.0,
        -(cursor.y / viewport_size.y) * 2.0 + 1.0,
    ))
}

/// Nearest hit of `ray` among `targets`.
pub fn nearest_hit(ray: &Ray, targets: &[&dyn Intersect]) -> HitResult {
    targets
        .iter()
        .filter_map(|target| target.intersect(ray))
        .min_by(f32::total_cmp)
        .map_or(HitResult::Miss, |distance| HitResult::Hit {
            point: ray.at(distance),
            distance,
        })
}

/// Cast a ray from `camera` through `pointer_ndc` against `targets` only.
pub fn cast_ray(pointer_ndc: Vec2, camera: &PickCamera, targets: &[&dyn Intersect]) -> HitResult {
    let Some(ray) = camera.ray(pointer_ndc) else {
        tracing::trace!(?pointer_ndc, "degenerate pick camera");
        return HitResult::Miss;
    };
    nearest_hit(&ray, targets)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::shape::{Cuboid, Rectangle};
    use glam::Quat;

    /// Camera at (0, 200, 500) looking at the origin, like the default scene.
    fn scene_camera(projection: Mat4) -> PickCamera {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 200.0, 500.0), Vec3::ZERO, Vec3::Y);
        PickCamera::new(view.inverse(), projection)
    }

    fn ground() -> Rectangle {
        Rectangle::horizontal(Vec3::new(0.0, -10.0, 0.0), 1000.0, 1000.0)
    }

    #[test]
    fn test_pointer_to_ndc_corners() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(pointer_to_ndc(Vec2::ZERO, size), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(pointer_to_ndc(size, size), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(
            pointer_to_ndc(Vec2::new(400.0, 300.0), size),
            Some(Vec2::ZERO)
        );
    }

    #[test]
    fn test_pointer_to_ndc_empty_viewport() {
        assert_eq!(pointer_to_ndc(Vec2::ONE, Vec2::new(0.0, 600.0)), None);
    }

    #[test]
    fn test_center_ray_follows_view_direction() {
        let projection = Mat4::perspective_rh_gl(FRAC_PI_2, 16.0 / 9.0, 0.1, 1000.0);
        let camera = scene_camera(projection);
        let ray = camera.ray(Vec2::ZERO).unwrap();
        assert!(ray.origin.distance(Vec3::new(0.0, 200.0, 500.0)) < 1e-2);
        let forward = camera
            .world_from_view
            .transform_vector3(Vec3::NEG_Z)
            .normalize();
        assert!(ray.direction.dot(forward) > 0.9999);
    }

    #[test]
    fn test_depth_conventions_agree() {
        let aspect = 16.0 / 9.0;
        let projections = [
            Mat4::perspective_rh_gl(FRAC_PI_2, aspect, 0.1, 1000.0),
            Mat4::perspective_rh(FRAC_PI_2, aspect, 0.1, 1000.0),
            Mat4::perspective_infinite_reverse_rh(FRAC_PI_2, aspect, 0.1),
        ];
        let pointer = Vec2::new(0.3, -0.4);
        let hits: Vec<Vec3> = projections
            .iter()
            .map(|&p| {
                cast_ray(pointer, &scene_camera(p), &[&ground()])
                    .point()
                    .unwrap()
            })
            .collect();
        assert!(hits[0].distance(hits[1]) < 1e-2);
        assert!(hits[0].distance(hits[2]) < 1e-2);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let projection = Mat4::orthographic_rh(-100.0, 100.0, -100.0, 100.0, 0.1, 1000.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 300.0, 0.0), Vec3::ZERO, Vec3::NEG_Z);
        let camera = PickCamera::new(view.inverse(), projection);

        let left = camera.ray(Vec2::new(-0.5, 0.0)).unwrap();
        let right = camera.ray(Vec2::new(0.5, 0.0)).unwrap();
        assert!(left.direction.dot(right.direction) > 0.9999);

        let hit = cast_ray(Vec2::new(0.5, 0.0), &camera, &[&ground()]);
        let point = hit.point().unwrap();
        assert!((point.x - 50.0).abs() < 1e-2);
        assert!((point.y + 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_miss_when_pointing_at_sky() {
        let projection = Mat4::perspective_rh_gl(FRAC_PI_2, 1.0, 0.1, 1000.0);
        let camera = scene_camera(projection);
        assert_eq!(
            cast_ray(Vec2::new(0.0, 1.0), &camera, &[&ground()]),
            HitResult::Miss
        );
    }

    #[test]
    fn test_degenerate_projection_is_miss() {
        let camera = scene_camera(Mat4::ZERO);
        assert_eq!(cast_ray(Vec2::ZERO, &camera, &[&ground()]), HitResult::Miss);
    }

    #[test]
    fn test_nearest_target_wins() {
        let truck = Cuboid::new(Vec3::new(0.0, 8.0, 0.0), Vec3::new(40.0, 10.0, 12.0), Quat::IDENTITY);
        let ray = Ray::new(Vec3::new(0.0, 100.0, 0.0), Vec3::NEG_Y);
        let both: [&dyn Intersect; 2] = [&ground(), &truck];
        let hit = nearest_hit(&ray, &both);
        assert!((hit.point().unwrap().y - 18.0).abs() < 1e-4);

        // Scoped to the ground only, the truck is invisible to the pick.
        let hit = nearest_hit(&ray, &[&ground()]);
        assert!((hit.point().unwrap().y + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_target_set_is_miss() {
        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y);
        assert_eq!(nearest_hit(&ray, &[]), HitResult::Miss);
    }
}
