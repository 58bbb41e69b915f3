//! Orbit camera.
//!
//! Right-drag orbits around the focus point, scrolling zooms. The camera's
//! starting position and lens come from the scene configuration.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use truck_steer::CameraConfig;

use crate::config::{ActiveConfig, ApplySceneConfig};
use crate::input::SceneAction;

/// Radians of orbit per pixel of mouse motion.
const ORBIT_SENSITIVITY: f32 = 0.005;
/// Fraction of the radius zoomed per scroll step.
const ZOOM_STEP: f32 = 0.1;
/// Closest the camera gets to its focus.
const MIN_RADIUS: f32 = 10.0;
/// Keeps the camera off the poles, where the up vector degenerates.
const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;

// ============================================================================
// Plugin
// ============================================================================

/// Plugin for the orbit camera.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(Update, orbit_camera_system)
            .add_observer(apply_camera_config);
    }
}

// ============================================================================
// Orbit model
// ============================================================================

/// Spherical camera placement around a focus point.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub radius: f32,
    /// Rotation about +Y, zero looking down -Z.
    pub yaw: f32,
    /// Elevation above the focus's horizon.
    pub pitch: f32,
}

impl OrbitCamera {
    /// Orbit that places the camera at `position` looking at `focus`.
    pub fn from_look(position: Vec3, focus: Vec3) -> Self {
        let offset = position - focus;
        let radius = offset.length().max(MIN_RADIUS);
        let horizontal = Vec2::new(offset.x, offset.z).length();
        Self {
            focus,
            radius,
            yaw: offset.x.atan2(offset.z),
            pitch: offset.y.atan2(horizontal).clamp(-MAX_PITCH, MAX_PITCH),
        }
    }

    /// Camera position for this orbit.
    pub fn position(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.focus + self.radius * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.focus, Vec3::Y)
    }

    /// Orbit by a pointer delta in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw -= delta.x * ORBIT_SENSITIVITY;
        self.pitch = (self.pitch + delta.y * ORBIT_SENSITIVITY).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Zoom by scroll steps; positive moves closer.
    pub fn zoom(&mut self, steps: f32, max_radius: f32) {
        let scale = (1.0 - ZOOM_STEP).powf(steps);
        self.radius = (self.radius * scale).clamp(MIN_RADIUS, max_radius.max(MIN_RADIUS));
    }
}

fn projection(config: &CameraConfig) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: config.fov_degrees.to_radians(),
        near: config.near,
        far: config.far,
        ..default()
    })
}

// ============================================================================
// Systems
// ============================================================================

fn spawn_camera(mut commands: Commands, config: Res<ActiveConfig>) {
    let camera = &config.0.camera;
    let orbit = OrbitCamera::from_look(camera.position, camera.target);
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        projection(camera),
        orbit.transform(),
        orbit,
    ));
}

fn orbit_camera_system(
    config: Res<ActiveConfig>,
    action_query: Query<&ActionState<SceneAction>>,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform)>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };
    let Ok((mut orbit, mut transform)) = cameras.single_mut() else {
        return;
    };

    let before = *orbit;
    if action_state.pressed(&SceneAction::OrbitDrag) {
        orbit.rotate(action_state.axis_pair(&SceneAction::Orbit));
    }
    let scroll = action_state.value(&SceneAction::Zoom);
    if scroll != 0.0 {
        orbit.zoom(scroll, config.0.camera.far * 0.9);
    }
    if *orbit != before {
        *transform = orbit.transform();
    }
}

fn apply_camera_config(
    trigger: On<ApplySceneConfig>,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform, &mut Projection)>,
) {
    let camera = &trigger.event().0.camera;
    for (mut orbit, mut transform, mut projection_component) in &mut cameras {
        *orbit = OrbitCamera::from_look(camera.position, camera.target);
        *transform = orbit.transform();
        *projection_component = projection(camera);
    }
}
