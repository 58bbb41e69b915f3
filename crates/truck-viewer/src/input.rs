//! Input action definitions and pointer event extraction.
//!
//! Defines the scene's actions using `leafwing-input-manager` and turns raw
//! cursor and touch input into the two pointer messages the steering core
//! consumes: [`PointerMoved`] and [`PointerActivated`].

use bevy::{
    ecs::message::{Message, MessageWriter},
    prelude::*,
    window::PrimaryWindow,
};
use bevy_egui::EguiContexts;
use leafwing_input_manager::{plugin::InputManagerSystem, prelude::*};
use web_time::{Duration, Instant};

use crate::steering::SteeringSet;

// ============================================================================
// Action enums
// ============================================================================

/// Actions for pointer, camera and UI control.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum SceneAction {
    /// Primary press (left click); two in quick succession activate.
    Select,
    /// Hold to orbit the camera (right mouse).
    OrbitDrag,
    /// Mouse motion while orbiting.
    #[actionlike(DualAxis)]
    Orbit,
    /// Zoom with mouse scroll.
    #[actionlike(Axis)]
    Zoom,
    /// Toggle UI visibility (Q).
    ToggleUi,
}

/// Create the default input map for scene actions.
pub fn default_scene_input_map() -> InputMap<SceneAction> {
    InputMap::default()
        .with(SceneAction::Select, MouseButton::Left)
        .with(SceneAction::OrbitDrag, MouseButton::Right)
        .with_dual_axis(SceneAction::Orbit, MouseMove::default())
        .with_axis(SceneAction::Zoom, MouseScrollAxis::Y)
        .with(SceneAction::ToggleUi, KeyCode::KeyQ)
}

// ============================================================================
// Messages
// ============================================================================

/// The pointer moved to a new window position (logical pixels, origin top-left).
#[derive(Message, Clone, Copy, Debug)]
pub struct PointerMoved {
    pub cursor: Vec2,
}

/// The pointer activated (double-click or double-tap) at a window position.
#[derive(Message, Clone, Copy, Debug)]
pub struct PointerActivated {
    pub cursor: Vec2,
}

// ============================================================================
// Double-click detection
// ============================================================================

/// Longest gap between the two presses of a double-click.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(300);
/// Furthest the pointer may travel between the two presses, in pixels.
pub const DOUBLE_CLICK_DISTANCE: f32 = 8.0;

/// Pairs primary presses into activations.
#[derive(Resource, Debug, Clone)]
pub struct DoubleClick {
    window: Duration,
    max_distance: f32,
    last_press: Option<(Instant, Vec2)>,
}

impl Default for DoubleClick {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_WINDOW, DOUBLE_CLICK_DISTANCE)
    }
}

impl DoubleClick {
    pub fn new(window: Duration, max_distance: f32) -> Self {
        Self {
            window,
            max_distance,
            last_press: None,
        }
    }

    /// Register a press. Returns true when it completes a double-click.
    ///
    /// A completed pair is consumed, so a triple click yields one activation.
    pub fn press(&mut self, at: Instant, position: Vec2) -> bool {
        if let Some((previous_at, previous_position)) = self.last_press {
            let quick = at.saturating_duration_since(previous_at) <= self.window;
            let close = previous_position.distance(position) <= self.max_distance;
            if quick && close {
                self.last_press = None;
                return true;
            }
        }
        self.last_press = Some((at, position));
        false
    }
}

// ============================================================================
// Plugin
// ============================================================================

/// Plugin that registers input actions and pointer message extraction.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<SceneAction>::default())
            .add_message::<PointerMoved>()
            .add_message::<PointerActivated>()
            .init_resource::<DoubleClick>()
            .add_systems(Startup, spawn_input_map)
            .add_systems(Update, read_pointer.in_set(SteeringSet::Input))
            .add_systems(
                PreUpdate,
                manage_input_focus.after(InputManagerSystem::Update),
            );
    }
}

fn spawn_input_map(mut commands: Commands) {
    commands.spawn((Name::new("Scene input"), default_scene_input_map()));
}

/// Whether egui is using the pointer this frame.
fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.is_pointer_over_area() || ctx.wants_pointer_input())
}

/// Disable pointer actions while egui owns the pointer. `ToggleUi` stays on.
fn manage_input_focus(
    mut action_query: Query<&mut ActionState<SceneAction>>,
    mut contexts: EguiContexts,
) {
    let over_ui = egui_wants_pointer(&mut contexts);
    for mut action_state in &mut action_query {
        action_state.enable_action(&SceneAction::ToggleUi);
        for action in [
            SceneAction::Select,
            SceneAction::OrbitDrag,
            SceneAction::Orbit,
            SceneAction::Zoom,
        ] {
            if over_ui {
                action_state.disable_action(&action);
            } else {
                action_state.enable_action(&action);
            }
        }
    }
}

// ============================================================================
// Pointer extraction
// ============================================================================

/// Emit pointer messages from the mouse and touch screen.
#[allow(clippy::too_many_arguments)]
fn read_pointer(
    action_query: Query<&ActionState<SceneAction>>,
    window: Single<&Window, With<PrimaryWindow>>,
    touches: Res<Touches>,
    mut double_click: ResMut<DoubleClick>,
    mut contexts: EguiContexts,
    mut last_cursor: Local<Option<Vec2>>,
    mut moved: MessageWriter<PointerMoved>,
    mut activated: MessageWriter<PointerActivated>,
) {
    if egui_wants_pointer(&mut contexts) {
        return;
    }
    let now = Instant::now();

    if let Some(cursor) = window.cursor_position()
        && *last_cursor != Some(cursor)
    {
        *last_cursor = Some(cursor);
        moved.write(PointerMoved { cursor });
    }

    if let Ok(action_state) = action_query.single()
        && action_state.just_pressed(&SceneAction::Select)
        && let Some(cursor) = window.cursor_position()
        && double_click.press(now, cursor)
    {
        activated.write(PointerActivated { cursor });
    }

    for touch in touches.iter() {
        if touch.delta() != Vec2::ZERO || touches.just_pressed(touch.id()) {
            moved.write(PointerMoved {
                cursor: touch.position(),
            });
        }
    }
    for touch in touches.iter_just_pressed() {
        if double_click.press(now, touch.position()) {
            activated.write(PointerActivated {
                cursor: touch.position(),
            });
        }
    }
}
