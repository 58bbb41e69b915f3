//! Vehicle and marker part trees.
//!
//! A model is an explicit tree of parts. Every part owns a transform local to
//! its parent and receives exactly one parent when it is created, so the
//! structure is a tree by construction. World transforms are composed top
//! down. Builders return typed handles to the parts that later code needs
//! (headlights, pickable bodies) instead of leaving them to be found by name.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};

use crate::shape::Cuboid;
use crate::steering::Pose;

// ============================================================================
// Transforms
// ============================================================================

/// Translation, rotation and scale, composed like a scene-graph node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3 {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform3 {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_translation(Vec3::new(x, y, z))
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Compose `child` expressed in this transform's space.
    #[must_use]
    pub fn mul_transform(&self, child: &Transform3) -> Transform3 {
        Transform3 {
            translation: self.transform_point(child.translation),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }

    /// Map a point from local into parent space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }
}

// ============================================================================
// Parts
// ============================================================================

/// Handle to a part inside a [`PartTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(usize);

impl PartId {
    /// Position of the part in creation order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Geometry or attachment carried by a part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PartShape {
    /// Box with full edge lengths.
    Box { size: Vec3 },
    /// Cylinder along local Y.
    Cylinder { radius: f32, height: f32 },
    /// Cone along local Y, apex up.
    Cone { radius: f32, height: f32 },
    /// Full sphere.
    Sphere { radius: f32 },
    /// Upper half of a sphere.
    Hemisphere { radius: f32 },
    /// Spot light shining towards another part.
    SpotLight {
        target: PartId,
        /// Outer cone angle in radians.
        angle: f32,
        intensity: f32,
    },
}

/// What a part is for; the renderer picks materials from this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartRole {
    Body,
    Cabin,
    Wheel,
    HeadlightLens,
    HeadlightLamp,
    /// Invisible point a headlight aims at.
    HeadlightTarget,
    Marker,
}

impl PartRole {
    /// Whether pointer activation may hit this part. Only the body counts;
    /// double-clicking the cabin or wheels does nothing.
    pub fn is_pickable(self) -> bool {
        matches!(self, Self::Body)
    }

    /// Whether the part is drawn.
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::HeadlightTarget)
    }
}

/// One node of a [`PartTree`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Part {
    pub parent: Option<PartId>,
    pub local: Transform3,
    pub shape: PartShape,
    pub role: PartRole,
}

/// A tree of parts stored in creation order.
///
/// Parents are always created before their children, so a single forward
/// pass composes every world transform.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartTree {
    parts: Vec<Part>,
}

impl PartTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part with no parent.
    pub fn add_root(&mut self, local: Transform3, shape: PartShape, role: PartRole) -> PartId {
        self.push(None, local, shape, role)
    }

    /// Add a part under `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn add_child(
        &mut self,
        parent: PartId,
        local: Transform3,
        shape: PartShape,
        role: PartRole,
    ) -> PartId {
        assert!(
            parent.0 < self.parts.len(),
            "parent {parent:?} is not part of this tree"
        );
        self.push(Some(parent), local, shape, role)
    }

    fn push(
        &mut self,
        parent: Option<PartId>,
        local: Transform3,
        shape: PartShape,
        role: PartRole,
    ) -> PartId {
        let id = PartId(self.parts.len());
        self.parts.push(Part {
            parent,
            local,
            shape,
            role,
        });
        id
    }

    pub fn get(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// All parts with their handles, parents first.
    pub fn iter(&self) -> impl Iterator<Item = (PartId, &Part)> {
        self.parts.iter().enumerate().map(|(i, part)| (PartId(i), part))
    }

    /// World transforms of every part, indexed like [`PartId::index`], with
    /// roots placed by `root`.
    pub fn world_transforms(&self, root: &Transform3) -> Vec<Transform3> {
        let mut world: Vec<Transform3> = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            let parent = part.parent.map_or(*root, |p| world[p.0]);
            world.push(parent.mul_transform(&part.local));
        }
        world
    }
}

// ============================================================================
// Truck
// ============================================================================

/// Body box edge lengths.
pub const TRUCK_BODY_SIZE: Vec3 = Vec3::new(100.0, 25.0, 30.0);
/// Cabin box edge lengths.
pub const TRUCK_CABIN_SIZE: Vec3 = Vec3::new(25.0, 20.0, 25.0);
/// Uniform scale applied to the whole truck.
pub const TRUCK_SCALE: f32 = 0.8;

const WHEEL_RADIUS: f32 = 6.0;
const WHEEL_WIDTH: f32 = 4.0;
const WHEEL_DROP: f32 = -12.0;
const HEADLIGHT_LENS_SIZE: Vec3 = Vec3::new(1.0, 3.0, 3.0);
const HEADLIGHT_REACH: f32 = 100.0;
const HEADLIGHT_TARGET_RADIUS: f32 = 5.0;
const HEADLIGHT_ANGLE: f32 = PI / 16.0;
const HEADLIGHT_INTENSITY: f32 = 1.0;

/// Handles to one headlight assembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Headlight {
    pub lens: PartId,
    pub lamp: PartId,
    pub target: PartId,
}

/// The truck part tree plus handles to its interesting parts.
#[derive(Clone, Debug, PartialEq)]
pub struct TruckModel {
    pub tree: PartTree,
    pub body: PartId,
    pub cabin: PartId,
    pub wheels: Vec<PartId>,
    /// Left then right.
    pub headlights: [Headlight; 2],
}

impl TruckModel {
    /// Build the truck. Its front (cabin side) is local +X.
    pub fn build() -> Self {
        let mut tree = PartTree::new();
        let body = tree.add_root(
            Transform3::IDENTITY.with_scale(Vec3::splat(TRUCK_SCALE)),
            PartShape::Box {
                size: TRUCK_BODY_SIZE,
            },
            PartRole::Body,
        );

        // Wheels lie on their side, axle along Z.
        let wheel_axle = Quat::from_rotation_x(FRAC_PI_2);
        let wheel = PartShape::Cylinder {
            radius: WHEEL_RADIUS,
            height: WHEEL_WIDTH,
        };
        let mut wheels = Vec::new();
        for (x, z) in [
            (-33.0, -15.0),
            (-33.0, 15.0),
            (-20.0, -15.0),
            (-20.0, 15.0),
            (-33.0, -10.0),
            (-33.0, 10.0),
            (-20.0, -10.0),
            (-20.0, 10.0),
            (30.0, -15.0),
            (30.0, 15.0),
        ] {
            wheels.push(tree.add_child(
                body,
                Transform3::from_xyz(x, WHEEL_DROP, z).with_rotation(wheel_axle),
                wheel,
                PartRole::Wheel,
            ));
        }

        let cabin_x = TRUCK_BODY_SIZE.x / 2.0 + TRUCK_CABIN_SIZE.x / 2.0 + 1.0;
        let cabin = tree.add_child(
            body,
            Transform3::from_xyz(cabin_x, 0.0, 0.0),
            PartShape::Box {
                size: TRUCK_CABIN_SIZE,
            },
            PartRole::Cabin,
        );

        let lamp_y = -5.0;
        let lamp_z = TRUCK_CABIN_SIZE.z / 2.0 - 2.0;
        let mut headlight = |z: f32| {
            let target = tree.add_child(
                cabin,
                Transform3::from_xyz(HEADLIGHT_REACH, lamp_y, z),
                PartShape::Sphere {
                    radius: HEADLIGHT_TARGET_RADIUS,
                },
                PartRole::HeadlightTarget,
            );
            let lens_at = Transform3::from_xyz(TRUCK_CABIN_SIZE.x / 2.0, lamp_y, z);
            let lens = tree.add_child(
                cabin,
                lens_at,
                PartShape::Box {
                    size: HEADLIGHT_LENS_SIZE,
                },
                PartRole::HeadlightLens,
            );
            let lamp = tree.add_child(
                cabin,
                lens_at,
                PartShape::SpotLight {
                    target,
                    angle: HEADLIGHT_ANGLE,
                    intensity: HEADLIGHT_INTENSITY,
                },
                PartRole::HeadlightLamp,
            );
            Headlight { lens, lamp, target }
        };
        let left = headlight(lamp_z);
        let right = headlight(-lamp_z);

        let cabin_wheel_x = TRUCK_CABIN_SIZE.x / 10.0;
        for z in [TRUCK_CABIN_SIZE.x / 2.0, -TRUCK_CABIN_SIZE.x / 2.0] {
            wheels.push(tree.add_child(
                cabin,
                Transform3::from_xyz(cabin_wheel_x, WHEEL_DROP, z).with_rotation(wheel_axle),
                wheel,
                PartRole::Wheel,
            ));
        }

        Self {
            tree,
            body,
            cabin,
            wheels,
            headlights: [left, right],
        }
    }

    /// Hit boxes of the pickable parts for a truck standing at `pose`.
    pub fn pick_shapes(&self, pose: &Pose) -> Vec<Cuboid> {
        let world = self.tree.world_transforms(&pose.transform());
        self.tree
            .iter()
            .filter(|(_, part)| part.role.is_pickable())
            .filter_map(|(id, part)| match part.shape {
                PartShape::Box { size } => Some(Cuboid::from_transform(size, &world[id.index()])),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// Target marker
// ============================================================================

/// Default height of the target marker.
pub const PIN_HEIGHT: f32 = 50.0;
const PIN_SCALE: f32 = 0.8;

/// The pin-shaped target marker: a downward cone capped by a half sphere.
#[derive(Clone, Debug, PartialEq)]
pub struct PinModel {
    pub tree: PartTree,
    pub cone: PartId,
    pub head: PartId,
    /// Height of the cone's centre above the ground the pin stands on.
    pub rest_height: f32,
}

impl PinModel {
    /// Build a pin of the given overall height.
    pub fn build(height: f32) -> Self {
        let radius = height / 6.0;
        let rest_height = height * 5.0 / 12.0;

        let mut tree = PartTree::new();
        let cone = tree.add_root(
            Transform3::IDENTITY
                .with_rotation(Quat::from_rotation_x(PI))
                .with_scale(Vec3::splat(PIN_SCALE)),
            PartShape::Cone {
                radius,
                height: height * 5.0 / 6.0,
            },
            PartRole::Marker,
        );
        // The cone is upside down, so its local -Y is world up.
        let head = tree.add_child(
            cone,
            Transform3::from_xyz(0.0, -rest_height, 0.0).with_rotation(Quat::from_rotation_x(PI)),
            PartShape::Hemisphere { radius },
            PartRole::Marker,
        );

        Self {
            tree,
            cone,
            head,
            rest_height,
        }
    }
}
