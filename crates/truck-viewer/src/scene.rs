//! Scene assembly: ground, sun, truck and target pin.
//!
//! The truck and pin are spawned from the part trees built by `truck-steer`,
//! one entity per part, parented the same way. [`TruckEntities`] maps part
//! handles back to entities so other systems never look parts up by name.

use bevy::{
    light::{CascadeShadowConfig, CascadeShadowConfigBuilder, DirectionalLightShadowMap},
    prelude::*,
};
use truck_steer::{
    Headlight, PartId, PartRole, PartShape, PartTree, PinModel, Pose, Rectangle, SceneConfig,
    ShadowBounds, Transform3, TruckModel,
    config::{GroundConfig, LightConfig},
};

use crate::config::{ActiveConfig, ApplySceneConfig, hex_color};
use crate::steering::{TruckDrive, TruckPose};

/// Spot light intensity per unit of part intensity, in lumens.
const HEADLIGHT_LUMENS: f32 = 400_000.0;
/// How far the headlights reach.
const HEADLIGHT_RANGE: f32 = 250.0;

// ============================================================================
// Plugin
// ============================================================================

/// Plugin that builds the static scene and keeps it in sync with the config.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_observer(apply_light_config)
            .add_observer(apply_ground_config)
            .add_observer(apply_material_config)
            .add_observer(apply_marker_config);
    }
}

// ============================================================================
// Components and resources
// ============================================================================

/// Marker for the directional light.
#[derive(Component)]
pub struct Sun;

/// The ground's pickable surface in world space.
#[derive(Component)]
pub struct GroundSurface(pub Rectangle);

/// Marker for the truck's root entity.
#[derive(Component)]
pub struct Truck;

/// The target pin and its model.
#[derive(Component)]
pub struct TargetPin {
    pub height: f32,
    pub model: PinModel,
}

/// Entities spawned for each truck part, indexed by [`PartId`].
#[derive(Resource)]
pub struct TruckEntities {
    pub model: TruckModel,
    parts: Vec<Entity>,
}

impl TruckEntities {
    pub fn entity(&self, id: PartId) -> Option<Entity> {
        self.parts.get(id.index()).copied()
    }

    /// Lamp and target entities of each headlight.
    pub fn headlights(&self) -> impl Iterator<Item = (Entity, Entity)> + '_ {
        self.model
            .headlights
            .iter()
            .filter_map(|&Headlight { lamp, target, .. }| {
                Some((self.entity(lamp)?, self.entity(target)?))
            })
    }
}

/// Shared materials, one per part role.
#[derive(Resource)]
pub struct SceneMaterials {
    pub ground: Handle<StandardMaterial>,
    pub body: Handle<StandardMaterial>,
    pub cabin: Handle<StandardMaterial>,
    pub wheel: Handle<StandardMaterial>,
    pub headlight: Handle<StandardMaterial>,
    pub marker: Handle<StandardMaterial>,
}

impl SceneMaterials {
    fn for_role(&self, role: PartRole) -> Option<&Handle<StandardMaterial>> {
        match role {
            PartRole::Body => Some(&self.body),
            PartRole::Cabin => Some(&self.cabin),
            PartRole::Wheel => Some(&self.wheel),
            PartRole::HeadlightLens => Some(&self.headlight),
            PartRole::Marker => Some(&self.marker),
            PartRole::HeadlightLamp | PartRole::HeadlightTarget => None,
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert a core transform into a Bevy transform.
pub fn to_transform(t: &Transform3) -> Transform {
    Transform {
        translation: t.translation,
        rotation: t.rotation,
        scale: t.scale,
    }
}

/// Root transform of the truck standing at `pose`.
pub fn truck_root_transform(model: &TruckModel, pose: &Pose) -> Transform {
    let root_local = model
        .tree
        .get(model.body)
        .map_or(Transform3::IDENTITY, |part| part.local);
    to_transform(&pose.transform().mul_transform(&root_local))
}

/// World-space ground rectangle for a ground config.
pub fn ground_surface(ground: &GroundConfig) -> Rectangle {
    Rectangle::horizontal(Vec3::new(0.0, ground.height, 0.0), ground.size, ground.size)
}

/// Height of the pin's centre when it stands on the ground.
pub fn pin_rest_y(ground: &GroundConfig, model: &PinModel) -> f32 {
    ground.height + model.rest_height
}

fn sun_transform(light: &LightConfig) -> Transform {
    Transform::from_translation(light.position).looking_at(Vec3::ZERO, Vec3::Y)
}

fn cascade_config(bounds: &ShadowBounds) -> CascadeShadowConfig {
    CascadeShadowConfigBuilder {
        num_cascades: 1,
        minimum_distance: bounds.near,
        maximum_distance: bounds.far,
        first_cascade_far_bound: bounds.far,
        ..default()
    }
    .build()
}

fn visibility(visible: bool) -> Visibility {
    if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

// ============================================================================
// Setup
// ============================================================================

/// Spawn everything except the camera.
fn setup_scene(
    mut commands: Commands,
    config: Res<ActiveConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let config = &config.0;
    let scene_materials = SceneMaterials {
        ground: materials.add(StandardMaterial {
            base_color: hex_color(config.ground.color),
            perceptual_roughness: 0.9,
            ..default()
        }),
        body: materials.add(hex_color(config.vehicle.body_color)),
        cabin: materials.add(hex_color(config.vehicle.cabin_color)),
        wheel: materials.add(hex_color(config.vehicle.wheel_color)),
        headlight: materials.add(StandardMaterial {
            base_color: hex_color(config.vehicle.headlight_color),
            emissive: hex_color(config.vehicle.headlight_color).to_linear() * 4.0,
            ..default()
        }),
        marker: materials.add(StandardMaterial {
            base_color: hex_color(config.marker.color),
            unlit: true,
            ..default()
        }),
    };

    commands.insert_resource(DirectionalLightShadowMap {
        size: config.light.shadow_map_size as usize,
    });
    commands.spawn((
        Name::new("Sun"),
        Sun,
        DirectionalLight {
            color: hex_color(config.light.color),
            illuminance: config.light.illuminance,
            shadows_enabled: true,
            ..default()
        },
        cascade_config(&config.light.shadow_bounds),
        sun_transform(&config.light),
        visibility(config.light.visible),
    ));

    let ground = &config.ground;
    commands.spawn((
        Name::new("Ground"),
        GroundSurface(ground_surface(ground)),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(ground.size, ground.size))),
        MeshMaterial3d(scene_materials.ground.clone()),
        Transform::from_xyz(0.0, ground.height, 0.0),
    ));

    let truck = spawn_truck(&mut commands, &mut meshes, &scene_materials, config);
    commands.insert_resource(truck);

    spawn_pin(&mut commands, &mut meshes, &scene_materials, config);

    commands.insert_resource(scene_materials);
    tracing::info!("Scene setup complete - move the pointer to steer, double-click the truck to drive");
}

/// Spawn one entity per part; returns them in part order.
fn spawn_parts(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &SceneMaterials,
    tree: &PartTree,
    root: Transform,
    spotlight_color: Color,
) -> Vec<Entity> {
    let mut entities: Vec<Entity> = Vec::with_capacity(tree.len());
    for (id, part) in tree.iter() {
        let mut transform = match part.parent {
            None => root,
            Some(_) => to_transform(&part.local),
        };
        let mut entity = commands.spawn((Name::new(format!("{:?} {}", part.role, id.index())),));

        if let Some(parent) = part.parent.and_then(|p| entities.get(p.index()).copied()) {
            entity.insert(ChildOf(parent));
        }

        let mesh = match part.shape {
            PartShape::Box { size } => Some(meshes.add(Cuboid::from_size(size))),
            PartShape::Cylinder { radius, height } => Some(meshes.add(Cylinder::new(radius, height))),
            PartShape::Cone { radius, height } => Some(meshes.add(Cone { radius, height })),
            // Bevy has no hemisphere primitive; the lower half mostly sits inside the cone.
            PartShape::Sphere { radius } | PartShape::Hemisphere { radius } => {
                Some(meshes.add(Sphere::new(radius)))
            }
            PartShape::SpotLight {
                target,
                angle,
                intensity,
            } => {
                // Siblings share a parent, so aiming in local space is enough.
                if let Some(target) = tree.get(target) {
                    transform = transform.looking_at(target.local.translation, Vec3::Y);
                }
                entity.insert(SpotLight {
                    color: spotlight_color,
                    intensity: intensity * HEADLIGHT_LUMENS,
                    range: HEADLIGHT_RANGE,
                    outer_angle: angle,
                    inner_angle: angle * 0.8,
                    shadows_enabled: false,
                    ..default()
                });
                None
            }
        };

        if let (Some(mesh), Some(material)) = (mesh, materials.for_role(part.role)) {
            entity.insert((Mesh3d(mesh), MeshMaterial3d(material.clone())));
        }
        entity.insert((transform, visibility(part.role.is_visible())));
        entities.push(entity.id());
    }
    entities
}

fn spawn_truck(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &SceneMaterials,
    config: &SceneConfig,
) -> TruckEntities {
    let model = TruckModel::build();
    let pose = config.initial_pose();
    let parts = spawn_parts(
        commands,
        meshes,
        materials,
        &model.tree,
        truck_root_transform(&model, &pose),
        hex_color(config.vehicle.headlight_color),
    );
    commands
        .entity(parts[model.body.index()])
        .insert((Truck, TruckPose(pose), TruckDrive::default()));

    TruckEntities { model, parts }
}

fn spawn_pin(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &SceneMaterials,
    config: &SceneConfig,
) {
    let model = PinModel::build(config.marker.height);
    let start = config.initial_pose().position;
    let cone_local = model
        .tree
        .get(model.cone)
        .map_or(Transform3::IDENTITY, |part| part.local);
    let root = to_transform(
        &Transform3::from_xyz(start.x, pin_rest_y(&config.ground, &model), start.z)
            .mul_transform(&cone_local),
    );
    let parts = spawn_parts(commands, meshes, materials, &model.tree, root, Color::WHITE);
    commands.entity(parts[model.cone.index()]).insert((
        TargetPin {
            height: config.marker.height,
            model,
        },
        visibility(config.marker.visible),
    ));
}

// ============================================================================
// Configuration observers
// ============================================================================

fn apply_light_config(
    trigger: On<ApplySceneConfig>,
    mut shadow_map: ResMut<DirectionalLightShadowMap>,
    mut suns: Query<
        (
            &mut DirectionalLight,
            &mut CascadeShadowConfig,
            &mut Transform,
            &mut Visibility,
        ),
        With<Sun>,
    >,
) {
    let light = &trigger.event().0.light;
    shadow_map.size = light.shadow_map_size as usize;
    for (mut sun, mut cascades, mut transform, mut vis) in &mut suns {
        sun.color = hex_color(light.color);
        sun.illuminance = light.illuminance;
        *cascades = cascade_config(&light.shadow_bounds);
        *transform = sun_transform(light);
        *vis = visibility(light.visible);
    }
}

fn apply_ground_config(
    trigger: On<ApplySceneConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut grounds: Query<(&mut GroundSurface, &mut Mesh3d, &mut Transform)>,
) {
    let ground = &trigger.event().0.ground;
    for (mut surface, mut mesh, mut transform) in &mut grounds {
        if surface.0 != ground_surface(ground) {
            *mesh = Mesh3d(meshes.add(Plane3d::default().mesh().size(ground.size, ground.size)));
            surface.0 = ground_surface(ground);
            transform.translation.y = ground.height;
        }
    }
}

fn apply_material_config(
    trigger: On<ApplySceneConfig>,
    handles: Option<Res<SceneMaterials>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(handles) = handles else {
        return;
    };
    let config = &trigger.event().0;
    let mut set = |handle: &Handle<StandardMaterial>, rgb: u32| {
        if let Some(material) = materials.get_mut(handle) {
            material.base_color = hex_color(rgb);
        }
    };
    set(&handles.ground, config.ground.color);
    set(&handles.body, config.vehicle.body_color);
    set(&handles.cabin, config.vehicle.cabin_color);
    set(&handles.wheel, config.vehicle.wheel_color);
    set(&handles.headlight, config.vehicle.headlight_color);
    set(&handles.marker, config.marker.color);
}

/// Rebuild the pin when its height changes; otherwise just toggle visibility.
fn apply_marker_config(
    trigger: On<ApplySceneConfig>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    handles: Option<Res<SceneMaterials>>,
    mut pins: Query<(Entity, &TargetPin, &Transform, &mut Visibility)>,
) {
    let config = &trigger.event().0;
    for (entity, pin, transform, mut vis) in &mut pins {
        if (pin.height - config.marker.height).abs() < f32::EPSILON {
            *vis = visibility(config.marker.visible);
            continue;
        }
        let Some(handles) = handles.as_deref() else {
            continue;
        };
        let at = transform.translation;
        commands.entity(entity).despawn();
        let mut rebuilt = config.clone();
        rebuilt.vehicle.start = Vec2::new(at.x, at.z);
        spawn_pin(&mut commands, &mut meshes, handles, &rebuilt);
    }
}

#[cfg(test)]
mod tests {
    use truck_steer::{Intersect, Ray};

    use super::*;

    #[test]
    fn test_truck_root_carries_model_scale() {
        let model = TruckModel::build();
        let pose = Pose::new(Vec3::new(5.0, 8.0, -3.0), 0.5);
        let root = truck_root_transform(&model, &pose);
        assert_eq!(root.translation, pose.position);
        assert!(root.rotation.angle_between(pose.rotation()) < 1e-6);
        assert!((root.scale - Vec3::splat(truck_steer::model::TRUCK_SCALE)).length() < 1e-6);
    }

    #[test]
    fn test_ground_surface_follows_config() {
        let ground = GroundConfig {
            size: 200.0,
            height: -4.0,
            ..GroundConfig::default()
        };
        let surface = ground_surface(&ground);
        let ray = Ray::new(Vec3::new(99.0, 50.0, -99.0), Vec3::NEG_Y);
        assert!((surface.intersect(&ray).unwrap() - 54.0).abs() < 1e-4);
        let outside = Ray::new(Vec3::new(101.0, 50.0, 0.0), Vec3::NEG_Y);
        assert_eq!(surface.intersect(&outside), None);
    }

    #[test]
    fn test_to_transform_copies_every_component() {
        let t = Transform3::from_xyz(1.0, 2.0, 3.0)
            .with_rotation(Quat::from_rotation_y(1.0))
            .with_scale(Vec3::splat(2.0));
        let bevy = to_transform(&t);
        assert_eq!(bevy.translation, t.translation);
        assert_eq!(bevy.rotation, t.rotation);
        assert_eq!(bevy.scale, t.scale);
    }

    #[test]
    fn test_materials_cover_every_drawn_role() {
        let handles = SceneMaterials {
            ground: Handle::default(),
            body: Handle::default(),
            cabin: Handle::default(),
            wheel: Handle::default(),
            headlight: Handle::default(),
            marker: Handle::default(),
        };
        let model = TruckModel::build();
        for (_, part) in model.tree.iter() {
            let drawn = !matches!(part.shape, PartShape::SpotLight { .. }) && part.role.is_visible();
            assert_eq!(handles.for_role(part.role).is_some(), drawn, "{:?}", part.role);
        }
    }
}
