//! Debug helpers drawn with gizmos: headlight cones and the shadow volume.

use bevy::prelude::*;
use truck_steer::PartShape;

use crate::config::ActiveConfig;
use crate::scene::{Sun, TruckEntities};

/// Number of edge lines drawn for each headlight cone.
const CONE_EDGES: usize = 8;

/// Plugin for the debug helper gizmos.
pub struct HelperGizmosPlugin;

impl Plugin for HelperGizmosPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (draw_headlight_helpers, draw_shadow_helper));
    }
}

/// Points around the rim of a cone with apex at the origin, opening along +Z.
pub fn cone_rim(length: f32, half_angle: f32, edges: usize) -> Vec<Vec3> {
    let radius = length * half_angle.tan();
    (0..edges)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let theta = std::f32::consts::TAU * i as f32 / edges as f32;
            Vec3::new(radius * theta.cos(), radius * theta.sin(), length)
        })
        .collect()
}

/// Outline each headlight's cone from lamp to target.
fn draw_headlight_helpers(
    mut gizmos: Gizmos,
    config: Res<ActiveConfig>,
    truck: Option<Res<TruckEntities>>,
    transforms: Query<&GlobalTransform>,
) {
    if !config.0.vehicle.headlight_helpers_visible {
        return;
    }
    let Some(truck) = truck else {
        return;
    };
    let color = Color::srgb(1.0, 0.9, 0.3);

    for (headlight, (lamp, target)) in truck.model.headlights.iter().zip(truck.headlights()) {
        let Ok([lamp_transform, target_transform]) = transforms.get_many([lamp, target]) else {
            continue;
        };
        let Some(PartShape::SpotLight { angle, .. }) =
            truck.model.tree.get(headlight.lamp).map(|part| part.shape)
        else {
            continue;
        };

        let apex = lamp_transform.translation();
        let aim = target_transform.translation();
        let length = apex.distance(aim);
        if length <= f32::EPSILON {
            continue;
        }
        let frame = Transform::from_translation(apex).looking_at(aim, Vec3::Y);
        gizmos.line(apex, aim, color);
        let rim: Vec<Vec3> = cone_rim(length, angle, CONE_EDGES)
            .into_iter()
            // The cone opens along +Z; the look frame's forward is -Z.
            .map(|p| frame.transform_point(Vec3::new(p.x, p.y, -p.z)))
            .collect();
        for (i, &point) in rim.iter().enumerate() {
            gizmos.line(apex, point, color);
            gizmos.line(point, rim[(i + 1) % rim.len()], color);
        }
    }
}

/// Outline the region that receives the sun's shadows.
fn draw_shadow_helper(
    mut gizmos: Gizmos,
    config: Res<ActiveConfig>,
    suns: Query<&GlobalTransform, With<Sun>>,
) {
    let light = &config.0.light;
    if !light.helper_visible {
        return;
    }
    let Ok(sun) = suns.single() else {
        return;
    };
    let bounds = &light.shadow_bounds;
    let forward = sun.forward();
    let depth = bounds.far - bounds.near;
    let center = sun.translation() + forward * (bounds.near + depth * 0.5);
    let volume = Transform::from_translation(center)
        .with_rotation(sun.rotation())
        .with_scale(Vec3::new(
            bounds.half_extent * 2.0,
            bounds.half_extent * 2.0,
            depth,
        ));
    gizmos.cube(volume, Color::srgb(0.3, 0.8, 1.0));
}
