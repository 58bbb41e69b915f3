//! Debug UI for tuning the scene and watching the steering state.
//!
//! Configuration tabs edit a draft; nothing changes in the scene until the
//! draft is applied as a whole.

mod camera;
mod diagnostics;
mod light;
mod vehicle;

use bevy::{diagnostic::FrameTimeDiagnosticsPlugin, prelude::*};
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use leafwing_input_manager::prelude::*;
use truck_steer::SceneConfig;

use crate::config::{ActiveConfig, request_apply};
use crate::input::SceneAction;
use crate::steering::SteeringSet;

/// Resource controlling whether the debug UI is visible.
#[derive(Resource)]
pub struct UiVisible(pub bool);

impl Default for UiVisible {
    fn default() -> Self {
        Self(true)
    }
}

/// Plugin for debug UI overlay.
pub struct DebugUiPlugin;

impl Plugin for DebugUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_plugins(FrameTimeDiagnosticsPlugin::default())
            .init_resource::<DebugUiState>()
            .init_resource::<ConfigDraft>()
            .init_resource::<diagnostics::DistanceHistory>()
            .init_resource::<UiVisible>()
            .add_systems(PostStartup, init_draft)
            .add_systems(Update, toggle_ui_visible)
            .add_systems(
                Update,
                diagnostics::sample_distance.in_set(SteeringSet::Present),
            )
            .add_systems(
                EguiPrimaryContextPass,
                debug_ui_system.run_if(|visible: Res<UiVisible>| visible.0),
            );
    }
}

/// Which tab is currently selected in the debug UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DebugTab {
    #[default]
    Light,
    Camera,
    Vehicle,
    Diagnostics,
}

/// State for the debug UI.
#[derive(Resource, Default)]
struct DebugUiState {
    /// Currently selected tab.
    selected_tab: DebugTab,
}

/// Configuration being edited, plus the last apply error.
#[derive(Resource, Default)]
pub(crate) struct ConfigDraft {
    pub config: SceneConfig,
    pub error: Option<String>,
}

fn init_draft(active: Res<ActiveConfig>, mut draft: ResMut<ConfigDraft>) {
    draft.config = active.0.clone();
}

/// Toggle UI visibility with Q.
fn toggle_ui_visible(
    action_query: Query<&ActionState<SceneAction>>,
    mut visible: ResMut<UiVisible>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    if action_state.just_pressed(&SceneAction::ToggleUi) {
        visible.0 = !visible.0;
    }
}

/// Render the debug UI overlay.
fn debug_ui_system(
    mut contexts: EguiContexts,
    mut commands: Commands,
    mut ui_state: ResMut<DebugUiState>,
    mut draft: ResMut<ConfigDraft>,
    active: Res<ActiveConfig>,
    mut diag_params: diagnostics::DiagnosticsParams,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    egui::Window::new("Scene")
        .default_pos([10.0, 10.0])
        .show(ctx, |ui| {
            // Tab bar.
            ui.horizontal(|ui| {
                for (tab, label) in [
                    (DebugTab::Light, "Light"),
                    (DebugTab::Camera, "Camera"),
                    (DebugTab::Vehicle, "Vehicle"),
                    (DebugTab::Diagnostics, "Diagnostics"),
                ] {
                    if ui
                        .selectable_label(ui_state.selected_tab == tab, label)
                        .clicked()
                    {
                        ui_state.selected_tab = tab;
                    }
                }
            });
            ui.separator();

            match ui_state.selected_tab {
                DebugTab::Light => light::render_light_tab(ui, &mut draft.config),
                DebugTab::Camera => camera::render_camera_tab(ui, &mut draft.config.camera),
                DebugTab::Vehicle => vehicle::render_vehicle_tab(ui, &mut draft.config),
                DebugTab::Diagnostics => {
                    diagnostics::render_diagnostics_tab(ui, &mut diag_params);
                    return;
                }
            }

            ui.separator();
            render_apply_row(ui, &mut commands, &mut draft, &active.0);
        });

    Ok(())
}

/// Apply and revert buttons for the draft.
fn render_apply_row(
    ui: &mut egui::Ui,
    commands: &mut Commands,
    draft: &mut ConfigDraft,
    active: &SceneConfig,
) {
    let dirty = draft.config != *active;
    ui.horizontal(|ui| {
        if ui.add_enabled(dirty, egui::Button::new("Apply")).clicked() {
            draft.error = request_apply(commands, draft.config.clone())
                .err()
                .map(|e| e.to_string());
        }
        if ui.add_enabled(dirty, egui::Button::new("Revert")).clicked() {
            draft.config = active.clone();
            draft.error = None;
        }
        if dirty {
            ui.label("(unapplied changes)");
        }
    });
    if let Some(error) = &draft.error {
        ui.colored_label(egui::Color32::LIGHT_RED, error);
    }
}

// ============================================================================
// UI helpers
// ============================================================================

/// Render sliders for a Vec3 with configurable range (but uncapped input).
///
/// Returns true if any component was changed.
pub fn vec3_sliders(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut Vec3,
    range: std::ops::RangeInclusive<f32>,
) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(label);
    });
    ui.horizontal(|ui| {
        for (axis, component) in [("X:", &mut value.x), ("Y:", &mut value.y), ("Z:", &mut value.z)] {
            ui.label(axis);
            changed |= ui
                .add(
                    egui::DragValue::new(component)
                        .range(range.clone())
                        .speed(0.5),
                )
                .changed();
        }
    });
    changed
}

/// Render a colour picker for a `0xRRGGBB` value.
pub fn hex_color_edit(ui: &mut egui::Ui, label: &str, value: &mut u32) -> bool {
    let mut rgb = crate::config::hex_to_rgb(*value);
    let changed = ui
        .horizontal(|ui| {
            ui.label(label);
            ui.color_edit_button_srgb(&mut rgb).changed()
        })
        .inner;
    if changed {
        *value = crate::config::rgb_to_hex(rgb);
    }
    changed
}
