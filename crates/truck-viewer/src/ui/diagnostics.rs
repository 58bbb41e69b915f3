//! Diagnostics tab for the debug UI.
//!
//! Displays FPS, the truck's steering state, a distance-to-pivot plot and the
//! telemetry recording toggle.

use std::collections::VecDeque;

use bevy::{
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    ecs::system::SystemParam,
    prelude::*,
};
use bevy_egui::egui;
use egui_extras::{Column, TableBuilder};
use egui_plot::{Line, Plot, PlotPoints};
use truck_viewer::telemetry::TELEMETRY_PATH;

use crate::scene::Truck;
use crate::steering::{Pivot, TelemetryRecorder, TruckDrive, TruckPose};

/// Number of samples to keep in the distance history.
const HISTORY_SIZE: usize = 240;

/// Recent horizontal distances to the pivot.
#[derive(Resource, Default)]
pub struct DistanceHistory {
    samples: VecDeque<f32>,
}

impl DistanceHistory {
    /// Push a new sample, maintaining the history size limit.
    fn push_sample(&mut self, distance: f32) {
        self.samples
            .push_back(if distance.is_finite() { distance } else { 0.0 });
        if self.samples.len() > HISTORY_SIZE {
            self.samples.pop_front();
        }
    }

    fn points(&self) -> PlotPoints<'static> {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &v)| [i as f64, f64::from(v)])
            .collect()
    }
}

/// Record the truck's distance to the pivot once per frame, whether or not
/// the tab is open.
pub(super) fn sample_distance(
    pivot: Res<Pivot>,
    trucks: Query<&TruckPose, With<Truck>>,
    mut history: ResMut<DistanceHistory>,
) {
    let Ok(pose) = trucks.single() else {
        return;
    };
    history.push_sample(pose.0.horizontal_distance_to(pivot.0.pivot()));
}

/// Resources for the diagnostics tab.
#[derive(SystemParam)]
pub(super) struct DiagnosticsParams<'w, 's> {
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub pivot: Res<'w, Pivot>,
    pub truck_query: Query<'w, 's, (&'static TruckPose, &'static TruckDrive), With<Truck>>,
    pub history: Res<'w, DistanceHistory>,
    pub recorder: ResMut<'w, TelemetryRecorder>,
}

/// Render the diagnostics tab content.
pub(super) fn render_diagnostics_tab(ui: &mut egui::Ui, diag: &mut DiagnosticsParams) {
    let fps = diag
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(bevy::diagnostic::Diagnostic::smoothed)
        .unwrap_or(0.0);
    ui.label(format!("FPS: {fps:.0}"));

    ui.separator();

    let Ok((pose, drive)) = diag.truck_query.single() else {
        ui.label("No truck");
        return;
    };
    let pose = pose.0;
    let pivot = diag.pivot.0.pivot();
    let distance = pose.horizontal_distance_to(pivot);

    ui.heading(format!("Truck: {}", drive.0.mode().label()));
    ui.label("Double-click the truck to start or stop driving.");

    TableBuilder::new(ui)
        .column(Column::exact(80.0))
        .column(Column::exact(180.0))
        .body(|mut body| {
            let rows = [
                (
                    "Position:",
                    format!(
                        "({:.1}, {:.1}, {:.1})",
                        pose.position.x, pose.position.y, pose.position.z
                    ),
                ),
                ("Heading:", format!("{:.1}°", pose.yaw.to_degrees())),
                ("Pivot:", format!("({:.1}, {:.1})", pivot.x, pivot.z)),
                ("Distance:", format!("{distance:.2}")),
            ];
            for (label, value) in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(label);
                    });
                    row.col(|ui| {
                        ui.label(value);
                    });
                });
            }
        });

    ui.separator();

    ui.label("Distance history:");
    Plot::new("distance_plot")
        .height(60.0)
        .show_axes(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new("distance", diag.history.points()).color(egui::Color32::LIGHT_BLUE),
            );
        });

    ui.separator();

    let mut recording = diag.recorder.is_enabled();
    if ui
        .checkbox(&mut recording, format!("Record telemetry to {TELEMETRY_PATH}"))
        .changed()
    {
        diag.recorder.set_enabled(recording);
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;
    use truck_steer::{DriveMode, MovementToggle, Pose, TargetTracker};

    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut history = DistanceHistory::default();
        for i in 0..(HISTORY_SIZE + 10) {
            #[allow(clippy::cast_precision_loss)]
            history.push_sample(i as f32);
        }
        assert_eq!(history.samples.len(), HISTORY_SIZE);
        assert_eq!(history.samples.front().copied(), Some(10.0));
    }

    #[test]
    fn test_non_finite_samples_become_zero() {
        let mut history = DistanceHistory::default();
        history.push_sample(f32::NAN);
        history.push_sample(f32::INFINITY);
        assert!(history.samples.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_distance_is_sampled_every_frame() {
        let mut world = World::new();
        world.init_resource::<DistanceHistory>();
        world.insert_resource(Pivot(TargetTracker::new(Vec3::new(3.0, 8.0, 4.0))));
        world.spawn((
            Truck,
            TruckPose(Pose::new(Vec3::new(0.0, 8.0, 0.0), 0.0)),
            TruckDrive(MovementToggle::new(DriveMode::Parked)),
        ));

        for _ in 0..3 {
            world.run_system_once(sample_distance).unwrap();
        }
        let history = world.resource::<DistanceHistory>();
        assert_eq!(history.samples.len(), 3);
        assert!(history.samples.iter().all(|&d| (d - 5.0).abs() < 1e-5));
    }
}
