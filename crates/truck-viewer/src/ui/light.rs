//! Light tab for the debug UI.

use bevy_egui::egui;
use truck_steer::{SceneConfig, config::SHADOW_MAP_SIZES};

use super::{hex_color_edit, vec3_sliders};

/// Render the light tab content.
pub(super) fn render_light_tab(ui: &mut egui::Ui, config: &mut SceneConfig) {
    let light = &mut config.light;

    ui.checkbox(&mut light.visible, "Visible");
    hex_color_edit(ui, "Color:", &mut light.color);
    ui.add(
        egui::Slider::new(&mut light.illuminance, 0.0..=100_000.0)
            .logarithmic(true)
            .text("Illuminance (lux)"),
    );
    vec3_sliders(ui, "Position:", &mut light.position, -5.0..=1000.0);

    ui.separator();

    ui.horizontal(|ui| {
        ui.label("Shadow map:");
        egui::ComboBox::from_id_salt("shadow_map_size")
            .selected_text(format!("{0}×{0}", light.shadow_map_size))
            .show_ui(ui, |ui| {
                for size in SHADOW_MAP_SIZES {
                    ui.selectable_value(&mut light.shadow_map_size, size, format!("{size}"));
                }
            });
    });

    let bounds = &mut light.shadow_bounds;
    ui.add(egui::Slider::new(&mut bounds.half_extent, 10.0..=1000.0).text("Shadow half extent"));
    ui.add(egui::Slider::new(&mut bounds.near, 0.0..=100.0).text("Shadow near"));
    ui.add(egui::Slider::new(&mut bounds.far, 0.1..=1000.0).text("Shadow far"));
    ui.checkbox(&mut light.helper_visible, "Helper visible");
}
