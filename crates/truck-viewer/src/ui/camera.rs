//! Camera tab for the debug UI.

use bevy_egui::egui;
use truck_steer::CameraConfig;

use super::vec3_sliders;

/// Render the camera tab content.
pub(super) fn render_camera_tab(ui: &mut egui::Ui, camera: &mut CameraConfig) {
    ui.label("Right-drag to orbit, scroll to zoom.");
    ui.separator();

    vec3_sliders(ui, "Position:", &mut camera.position, 0.0..=500.0);
    vec3_sliders(ui, "Look at:", &mut camera.target, -500.0..=500.0);
    ui.add(egui::Slider::new(&mut camera.fov_degrees, 10.0..=150.0).text("Field of view (°)"));
    ui.add(
        egui::Slider::new(&mut camera.near, 0.01..=10.0)
            .logarithmic(true)
            .text("Near"),
    );
    ui.add(egui::Slider::new(&mut camera.far, 100.0..=5000.0).text("Far"));
}
