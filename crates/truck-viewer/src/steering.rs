//! Per-frame truck steering.
//!
//! Pointer messages are drained first (pivot, then drive mode), then the
//! truck takes one steering step and its transform is written back. Within
//! a frame each piece of state has exactly one writer:
//!
//! - [`Pivot`]: `retarget_pivot`
//! - [`TruckDrive`]: `toggle_drive`
//! - [`TruckPose`]: `step_truck`
//!
//! Applying a configuration only records the new [`RideHeight`]; the pivot
//! and the truck pick it up on their writers' next run.

use bevy::{
    ecs::message::MessageReader,
    prelude::*,
    window::PrimaryWindow,
};
use truck_steer::{
    Intersect, MovementToggle, PickCamera, Pose, SteeringEngine, TargetTracker, pointer_to_ndc,
};
use truck_viewer::telemetry::{
    FileTelemetryOutput, TelemetrySnapshot, emit_telemetry_to, reset_telemetry_to,
};

use crate::camera::OrbitCamera;
use crate::config::{ActiveConfig, ApplySceneConfig};
use crate::input::{PointerActivated, PointerMoved};
use crate::scene::{
    GroundSurface, TargetPin, Truck, TruckEntities, pin_rest_y, truck_root_transform,
};

// ============================================================================
// Plugin
// ============================================================================

/// Ordering of the frame's steering work.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SteeringSet {
    /// Raw input becomes pointer messages.
    Input,
    /// Pointer messages update the pivot and drive mode.
    Pointer,
    /// The truck steps once.
    Step,
    /// Followers (pin, telemetry) read the new state.
    Present,
}

/// Plugin for the steering core integration.
pub struct SteeringPlugin;

impl Plugin for SteeringPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Pivot>()
            .init_resource::<Steering>()
            .init_resource::<RideHeight>()
            .init_resource::<TelemetryRecorder>()
            .configure_sets(
                Update,
                (
                    SteeringSet::Input,
                    SteeringSet::Pointer,
                    SteeringSet::Step,
                    SteeringSet::Present,
                )
                    .chain(),
            )
            .add_systems(Startup, init_steering)
            .add_systems(
                Update,
                (retarget_pivot, toggle_drive)
                    .chain()
                    .in_set(SteeringSet::Pointer),
            )
            .add_systems(Update, step_truck.in_set(SteeringSet::Step))
            .add_systems(
                Update,
                (follow_pivot, record_telemetry).in_set(SteeringSet::Present),
            )
            .add_observer(apply_steering_config);
    }
}

// ============================================================================
// State
// ============================================================================

/// The point the truck faces.
#[derive(Resource, Debug)]
pub struct Pivot(pub TargetTracker);

impl Default for Pivot {
    fn default() -> Self {
        Self(TargetTracker::new(Vec3::ZERO))
    }
}

/// The truck's steering constants.
#[derive(Resource, Debug, Default)]
pub struct Steering(pub SteeringEngine);

/// Height the truck drives at, from the active configuration.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct RideHeight(pub f32);

/// The truck's position and heading.
#[derive(Component, Debug, Clone, Copy)]
pub struct TruckPose(pub Pose);

/// Whether the truck drives towards the pivot.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct TruckDrive(pub MovementToggle);

/// CSV telemetry of every frame while enabled.
#[derive(Resource, Default)]
pub struct TelemetryRecorder {
    enabled: bool,
    frame: u64,
    output: FileTelemetryOutput,
}

impl TelemetryRecorder {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start or stop recording; starting truncates the file.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.frame = 0;
            reset_telemetry_to(&mut self.output);
            tracing::info!("Telemetry recording started");
        } else if !enabled && self.enabled {
            tracing::info!("Telemetry recording stopped after {} frames", self.frame);
        }
        self.enabled = enabled;
    }
}

// ============================================================================
// Picking helpers
// ============================================================================

/// Build a pick camera from a Bevy camera's projection and placement.
///
/// Bevy keeps the projection's aspect ratio in step with the viewport, so
/// this matches the matrix the renderer uses.
pub fn pick_camera(projection: &Projection, transform: &GlobalTransform) -> PickCamera {
    PickCamera::new(transform.to_matrix(), projection.get_clip_from_view())
}

/// The primary window's cursor position in NDC.
fn cursor_ndc(window: &Window, cursor: Vec2) -> Option<Vec2> {
    pointer_to_ndc(cursor, window.size())
}

// ============================================================================
// Systems
// ============================================================================

fn init_steering(
    config: Res<ActiveConfig>,
    mut pivot: ResMut<Pivot>,
    mut steering: ResMut<Steering>,
    mut ride_height: ResMut<RideHeight>,
) {
    let config = &config.0;
    pivot.0 = TargetTracker::beneath(config.initial_pose().position);
    steering.0 = SteeringEngine::new(config.steering);
    ride_height.0 = config.vehicle_height();
}

/// Move the pivot to the ground point under the pointer.
fn retarget_pivot(
    mut moved: MessageReader<PointerMoved>,
    window: Single<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Projection, &GlobalTransform), With<OrbitCamera>>,
    grounds: Query<&GroundSurface>,
    ride_height: Res<RideHeight>,
    mut pivot: ResMut<Pivot>,
) {
    // Follow a ride height change even without pointer movement.
    let current = pivot.0.pivot();
    if current.with_y(ride_height.0) != current {
        pivot.0.retarget(current, ride_height.0);
    }

    // Only the latest position this frame matters.
    let Some(PointerMoved { cursor }) = moved.read().last().copied() else {
        return;
    };
    let Ok((projection, camera_transform)) = cameras.single() else {
        return;
    };
    let Some(ndc) = cursor_ndc(&window, cursor) else {
        return;
    };

    let ground: Vec<&dyn Intersect> = grounds.iter().map(|g| &g.0 as &dyn Intersect).collect();
    pivot.0.on_pointer_move(
        ndc,
        &pick_camera(projection, camera_transform),
        &ground,
        ride_height.0,
    );
}

/// Flip the drive mode when an activation hits the truck.
fn toggle_drive(
    mut activated: MessageReader<PointerActivated>,
    window: Single<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Projection, &GlobalTransform), With<OrbitCamera>>,
    truck_entities: Option<Res<TruckEntities>>,
    mut trucks: Query<(&TruckPose, &mut TruckDrive), With<Truck>>,
) {
    let Some(truck_entities) = truck_entities else {
        activated.clear();
        return;
    };
    let Ok((projection, camera_transform)) = cameras.single() else {
        return;
    };
    let pick = pick_camera(projection, camera_transform);

    for PointerActivated { cursor } in activated.read().copied() {
        let Ok((pose, mut drive)) = trucks.single_mut() else {
            return;
        };
        let Some(ndc) = cursor_ndc(&window, cursor) else {
            continue;
        };
        let shapes = truck_entities.model.pick_shapes(&pose.0);
        let targets: Vec<&dyn Intersect> = shapes.iter().map(|s| s as &dyn Intersect).collect();
        if drive.0.on_pointer_activate(ndc, &pick, &targets).is_hit() {
            tracing::info!("Truck is now {}", drive.0.mode().label());
        }
    }
}

/// Advance the truck one frame and write its transform.
///
/// A changed [`RideHeight`] is applied here, before the step, so the pose
/// keeps a single writer.
fn step_truck(
    steering: Res<Steering>,
    pivot: Res<Pivot>,
    ride_height: Res<RideHeight>,
    truck_entities: Option<Res<TruckEntities>>,
    mut trucks: Query<(&mut TruckPose, &TruckDrive, &mut Transform), With<Truck>>,
) {
    for (mut pose, drive, mut transform) in &mut trucks {
        let mut current = pose.0;
        current.position.y = ride_height.0;
        pose.0 = steering
            .0
            .step(current, pivot.0.pivot(), drive.0.is_enabled());
        if let Some(truck_entities) = &truck_entities {
            *transform = truck_root_transform(&truck_entities.model, &pose.0);
        }
    }
}

/// Keep the pin over the pivot, standing on the ground.
fn follow_pivot(
    config: Res<ActiveConfig>,
    pivot: Res<Pivot>,
    mut pins: Query<(&TargetPin, &mut Transform)>,
) {
    for (pin, mut transform) in &mut pins {
        transform.translation = pivot
            .0
            .marker_position(pin_rest_y(&config.0.ground, &pin.model));
    }
}

fn record_telemetry(
    time: Res<Time>,
    pivot: Res<Pivot>,
    mut recorder: ResMut<TelemetryRecorder>,
    trucks: Query<(&TruckPose, &TruckDrive), With<Truck>>,
) {
    if !recorder.enabled {
        return;
    }
    let Ok((pose, drive)) = trucks.single() else {
        return;
    };
    let snapshot = TelemetrySnapshot {
        frame: recorder.frame,
        elapsed: time.elapsed_secs(),
        mode: drive.0.mode(),
        pose: pose.0,
        pivot: pivot.0.pivot(),
    };
    recorder.frame += 1;
    emit_telemetry_to(&snapshot, &mut recorder.output);
}

/// Swap steering constants and record the configured ride height.
fn apply_steering_config(
    trigger: On<ApplySceneConfig>,
    mut steering: ResMut<Steering>,
    mut ride_height: ResMut<RideHeight>,
) {
    let config = &trigger.event().0;
    steering.0 = SteeringEngine::new(config.steering);
    ride_height.0 = config.vehicle_height();
}

#[cfg(test)]
mod tests {
    use bevy::ecs::{message::MessageWriter, system::RunSystemOnce};
    use truck_steer::{PinModel, SceneConfig, model::PIN_HEIGHT};

    use super::*;
    use crate::config::{ConfigPlugin, request_apply};
    use crate::scene::ground_surface;

    /// Headless app with a window, the stock camera and ground, and a parked
    /// truck at its starting pose.
    fn steering_app() -> App {
        let mut app = App::new();
        app.add_plugins((ConfigPlugin, SteeringPlugin))
            .init_resource::<Time>()
            .add_message::<PointerMoved>()
            .add_message::<PointerActivated>();

        let config = SceneConfig::default();
        let camera = &config.camera;
        let placement =
            Transform::from_translation(camera.position).looking_at(camera.target, Vec3::Y);

        let world = app.world_mut();
        world.spawn((
            Window {
                resolution: (1280_u32, 720_u32).into(),
                ..default()
            },
            PrimaryWindow,
        ));
        world.spawn((
            OrbitCamera::from_look(camera.position, camera.target),
            Projection::Perspective(PerspectiveProjection {
                fov: camera.fov_degrees.to_radians(),
                aspect_ratio: 1280.0 / 720.0,
                near: camera.near,
                far: camera.far,
                ..default()
            }),
            GlobalTransform::from(placement),
        ));
        world.spawn(GroundSurface(ground_surface(&config.ground)));
        world.spawn((
            Truck,
            TruckPose(config.initial_pose()),
            TruckDrive::default(),
            Transform::default(),
        ));
        app
    }

    fn move_pointer(app: &mut App, cursor: Vec2) {
        app.world_mut()
            .run_system_once(move |mut moved: MessageWriter<PointerMoved>| {
                moved.write(PointerMoved { cursor });
            })
            .unwrap();
    }

    fn apply(app: &mut App, config: SceneConfig) {
        app.world_mut()
            .run_system_once(move |mut commands: Commands| {
                request_apply(&mut commands, config.clone())
            })
            .unwrap()
            .unwrap();
    }

    fn truck_pose(app: &mut App) -> Pose {
        let world = app.world_mut();
        world
            .query_filtered::<&TruckPose, With<Truck>>()
            .single(world)
            .unwrap()
            .0
    }

    fn pivot(app: &App) -> Vec3 {
        app.world().resource::<Pivot>().0.pivot()
    }

    #[test]
    fn test_pointer_move_is_faced_in_the_same_frame() {
        let mut app = steering_app();
        move_pointer(&mut app, Vec2::new(640.0, 360.0));
        app.update();

        // The view ray from (0, 200, 500) towards the origin meets the
        // ground (y = -10) at z = -25; the pivot keeps the truck's height.
        let pivot = pivot(&app);
        assert!(pivot.distance(Vec3::new(0.0, 8.0, -25.0)) < 1e-2, "{pivot}");

        let pose = truck_pose(&mut app);
        assert_eq!(pose.position, Vec3::new(0.0, 8.0, 0.0));
        let to_pivot = (pivot - pose.position).normalize();
        assert!(pose.forward().dot(to_pivot) > 0.9999);
    }

    #[test]
    fn test_pointer_off_the_ground_keeps_the_pivot() {
        let mut app = steering_app();
        app.update();
        let before = pivot(&app);

        // The top of the window looks over the horizon.
        move_pointer(&mut app, Vec2::new(640.0, 1.0));
        app.update();
        assert_eq!(pivot(&app), before);
    }

    #[test]
    fn test_ride_height_change_waits_for_the_next_step() {
        let mut app = steering_app();
        app.update();

        let mut raised = SceneConfig::default();
        raised.vehicle.ride_height = 30.0;
        apply(&mut app, raised);

        // Applying only records the height.
        assert_eq!(app.world().resource::<RideHeight>().0, 20.0);
        assert_eq!(truck_pose(&mut app).position.y, 8.0);
        assert_eq!(pivot(&app).y, 8.0);

        app.update();
        assert_eq!(truck_pose(&mut app).position.y, 20.0);
        assert_eq!(pivot(&app).y, 20.0);
    }

    #[test]
    fn test_pin_stands_on_raised_ground() {
        let mut app = steering_app();
        let model = PinModel::build(PIN_HEIGHT);
        let rest_height = model.rest_height;
        app.world_mut().spawn((
            TargetPin {
                height: PIN_HEIGHT,
                model,
            },
            Transform::default(),
        ));
        app.update();

        let mut raised = SceneConfig::default();
        raised.ground.height = 40.0;
        apply(&mut app, raised);
        app.update();

        let world = app.world_mut();
        let pin = world
            .query_filtered::<&Transform, With<TargetPin>>()
            .single(world)
            .unwrap()
            .translation;
        assert!((pin.y - (40.0 + rest_height)).abs() < 1e-4);
    }
}
