//! Vehicle tab for the debug UI.
//!
//! Truck appearance, steering constants, ground and target pin.

use bevy_egui::egui;
use truck_steer::SceneConfig;

use super::hex_color_edit;

/// Render the vehicle tab content.
pub(super) fn render_vehicle_tab(ui: &mut egui::Ui, config: &mut SceneConfig) {
    ui.collapsing("Steering", |ui| {
        let steering = &mut config.steering;
        ui.add(
            egui::Slider::new(&mut steering.approach_factor, 0.001..=1.0)
                .logarithmic(true)
                .text("Approach per frame"),
        );
        ui.add(
            egui::Slider::new(&mut steering.heading_offset_degrees, -180.0..=180.0)
                .text("Heading offset (°)"),
        );
    });

    ui.collapsing("Truck", |ui| {
        let vehicle = &mut config.vehicle;
        ui.add(egui::Slider::new(&mut vehicle.ride_height, 0.0..=100.0).text("Ride height"));
        hex_color_edit(ui, "Body:", &mut vehicle.body_color);
        hex_color_edit(ui, "Cabin:", &mut vehicle.cabin_color);
        hex_color_edit(ui, "Wheels:", &mut vehicle.wheel_color);
        hex_color_edit(ui, "Headlights:", &mut vehicle.headlight_color);
        ui.checkbox(&mut vehicle.headlight_helpers_visible, "Headlight helpers");
    });

    ui.collapsing("Ground", |ui| {
        let ground = &mut config.ground;
        ui.add(egui::Slider::new(&mut ground.size, 100.0..=5000.0).text("Size"));
        ui.add(egui::Slider::new(&mut ground.height, -100.0..=100.0).text("Height"));
        hex_color_edit(ui, "Color:", &mut ground.color);
    });

    ui.collapsing("Target pin", |ui| {
        let marker = &mut config.marker;
        ui.checkbox(&mut marker.visible, "Visible");
        ui.add(egui::Slider::new(&mut marker.height, 5.0..=200.0).text("Height"));
        hex_color_edit(ui, "Color:", &mut marker.color);
    });
}
