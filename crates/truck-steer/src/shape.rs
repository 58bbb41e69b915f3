//! Intersectable shapes for pointer picking.
//!
//! Only the intersection test of a shape matters to picking; how it is drawn
//! is the renderer's business. Every test returns the ray parameter `t` of
//! the nearest hit in front of the ray origin.

use glam::{Quat, Vec3};

use crate::model::Transform3;
use crate::pick::Ray;

/// Tolerance below which a ray is treated as parallel to a surface.
const PARALLEL_EPSILON: f32 = 1e-6;

/// A surface that can be hit-tested by a ray.
pub trait Intersect {
    /// Distance along `ray` to the nearest intersection at or in front of the
    /// origin, or `None` if the ray misses.
    fn intersect(&self, ray: &Ray) -> Option<f32>;
}

impl<T: Intersect + ?Sized> Intersect for &T {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        (**self).intersect(ray)
    }
}

// ============================================================================
// Rectangle
// ============================================================================

/// A finite, double-sided planar quad.
///
/// Spanned by two half-axes from its centre; the quad covers
/// `centre + a * half_u + b * half_v` for `a, b` in `[-1, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle {
    pub center: Vec3,
    pub half_u: Vec3,
    pub half_v: Vec3,
}

impl Rectangle {
    /// Create a rectangle from its centre and two half-axes.
    pub fn new(center: Vec3, half_u: Vec3, half_v: Vec3) -> Self {
        Self {
            center,
            half_u,
            half_v,
        }
    }

    /// A level rectangle of `width` (along X) by `depth` (along Z).
    pub fn horizontal(center: Vec3, width: f32, depth: f32) -> Self {
        Self::new(
            center,
            Vec3::X * (width * 0.5),
            Vec3::Z * (depth * 0.5),
        )
    }

    /// Unit normal of the rectangle's plane.
    pub fn normal(&self) -> Vec3 {
        self.half_v.cross(self.half_u).normalize_or_zero()
    }
}

impl Intersect for Rectangle {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        let normal = self.normal();
        let denom = normal.dot(ray.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = normal.dot(self.center - ray.origin) / denom;
        if t < 0.0 {
            return None;
        }

        // Project the hit onto both half-axes; inside means |coord| <= 1.
        let offset = ray.at(t) - self.center;
        let u = offset.dot(self.half_u) / self.half_u.length_squared();
        let v = offset.dot(self.half_v) / self.half_v.length_squared();
        (u.abs() <= 1.0 && v.abs() <= 1.0).then_some(t)
    }
}

// ============================================================================
// Cuboid
// ============================================================================

/// An oriented box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cuboid {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

impl Cuboid {
    /// Create an oriented box.
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self {
            center,
            half_extents,
            rotation,
        }
    }

    /// Place a box of full `size` using a world transform.
    ///
    /// Scale is applied to the extents, so the transform is expected to
    /// carry no shear (the part tree only produces uniform scales).
    pub fn from_transform(size: Vec3, transform: &Transform3) -> Self {
        Self::new(
            transform.translation,
            size * 0.5 * transform.scale.abs(),
            transform.rotation,
        )
    }
}

impl Intersect for Cuboid {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        // Slab test in box-local space.
        let inverse = self.rotation.inverse();
        let origin = inverse * (ray.origin - self.center);
        let direction = inverse * ray.direction;

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let h = self.half_extents[axis];

            if d.abs() < PARALLEL_EPSILON {
                if o.abs() > h {
                    return None;
                }
                continue;
            }

            let t1 = (-h - o) / d;
            let t2 = (h - o) / d;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }

        if t_exit < t_enter.max(0.0) {
            return None;
        }

        // Origin inside the box: report the exit face.
        Some(if t_enter >= 0.0 { t_enter } else { t_exit })
    }
}

// ============================================================================
// Triangle mesh
// ============================================================================

/// Indexed triangle soup, tested double-sided.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create a mesh from vertices and triangle indices.
    ///
    /// Triangles that reference missing vertices are skipped during tests.
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    fn triangle(&self, indices: [u32; 3]) -> Option<[Vec3; 3]> {
        let vertex = |i: u32| self.vertices.get(i as usize).copied();
        Some([vertex(indices[0])?, vertex(indices[1])?, vertex(indices[2])?])
    }
}

impl Intersect for TriangleMesh {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        self.triangles
            .iter()
            .filter_map(|&indices| self.triangle(indices))
            .filter_map(|[a, b, c]| intersect_triangle(ray, a, b, c))
            .min_by(f32::total_cmp)
    }
}

/// Möller–Trumbore ray/triangle test, double-sided.
fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use super::*;

    fn down_from(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 100.0, z), Vec3::NEG_Y)
    }

    #[test]
    fn test_rectangle_hit_inside_bounds() {
        let ground = Rectangle::horizontal(Vec3::new(0.0, -10.0, 0.0), 1000.0, 1000.0);
        let t = ground.intersect(&down_from(120.0, -40.0)).unwrap();
        assert!((t - 110.0).abs() < 1e-4);
    }

    #[test]
    fn test_rectangle_miss_outside_bounds() {
        let ground = Rectangle::horizontal(Vec3::new(0.0, -10.0, 0.0), 1000.0, 1000.0);
        assert!(ground.intersect(&down_from(501.0, 0.0)).is_none());
    }

    #[test]
    fn test_rectangle_is_double_sided() {
        let ground = Rectangle::horizontal(Vec3::ZERO, 10.0, 10.0);
        let from_below = Ray::new(Vec3::new(0.0, -5.0, 0.0), Vec3::Y);
        assert!((ground.intersect(&from_below).unwrap() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_rectangle_behind_origin_is_ignored() {
        let ground = Rectangle::horizontal(Vec3::ZERO, 10.0, 10.0);
        let away = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert!(ground.intersect(&away).is_none());
    }

    #[test]
    fn test_rectangle_parallel_ray_misses() {
        let ground = Rectangle::horizontal(Vec3::ZERO, 10.0, 10.0);
        let grazing = Ray::new(Vec3::new(-20.0, 0.0, 0.0), Vec3::X);
        assert!(ground.intersect(&grazing).is_none());
    }

    #[test]
    fn test_cuboid_axis_aligned_hit() {
        let body = Cuboid::new(Vec3::ZERO, Vec3::new(50.0, 12.5, 15.0), Quat::IDENTITY);
        let ray = Ray::new(Vec3::new(-200.0, 0.0, 0.0), Vec3::X);
        assert!((body.intersect(&ray).unwrap() - 150.0).abs() < 1e-4);
    }

    #[test]
    fn test_cuboid_respects_rotation() {
        // A long thin box rotated 90° about Y now extends along Z.
        let body = Cuboid::new(
            Vec3::ZERO,
            Vec3::new(50.0, 5.0, 5.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        assert!(body.intersect(&down_from(0.0, 40.0)).is_some());
        assert!(body.intersect(&down_from(40.0, 0.0)).is_none());
    }

    #[test]
    fn test_cuboid_diagonal_rotation() {
        let body = Cuboid::new(Vec3::ZERO, Vec3::splat(1.0), Quat::from_rotation_y(FRAC_PI_4));
        // The rotated corner reaches sqrt(2) along X.
        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X);
        let t = body.intersect(&ray).unwrap();
        assert!((t - (10.0 - std::f32::consts::SQRT_2)).abs() < 1e-4);
    }

    #[test]
    fn test_cuboid_origin_inside_reports_exit() {
        let body = Cuboid::new(Vec3::ZERO, Vec3::splat(2.0), Quat::IDENTITY);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!((body.intersect(&ray).unwrap() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_cuboid_from_transform_applies_scale() {
        let transform = Transform3 {
            translation: Vec3::new(0.0, 8.0, 0.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(0.8),
        };
        let body = Cuboid::from_transform(Vec3::new(100.0, 25.0, 30.0), &transform);
        assert!((body.half_extents.x - 40.0).abs() < 1e-5);
        assert!((body.center.y - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_mesh_nearest_triangle_wins() {
        // Two stacked quads; the upper one is hit first from above.
        let vertices = vec![
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(-1.0, 3.0, -1.0),
            Vec3::new(1.0, 3.0, -1.0),
            Vec3::new(0.0, 3.0, 1.0),
        ];
        let mesh = TriangleMesh::new(vertices, vec![[0, 1, 2], [3, 4, 5]]);
        let t = mesh.intersect(&Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y));
        assert!((t.unwrap() - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_mesh_skips_bad_indices() {
        let mesh = TriangleMesh::new(vec![Vec3::ZERO, Vec3::X], vec![[0, 1, 7]]);
        assert!(mesh.intersect(&down_from(0.1, 0.0)).is_none());
    }
}
