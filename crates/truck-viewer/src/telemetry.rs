//! Steering telemetry logging.
//!
//! Outputs CSV data for analysis. Supports multiple output destinations via
//! the `TelemetryOutput` trait. File output is reset each time recording
//! starts.

use std::{
    fs::{File, OpenOptions},
    io::Write,
};

use glam::Vec3;
use truck_steer::{DriveMode, Pose};

/// Telemetry output file path.
pub const TELEMETRY_PATH: &str = "telemetry.csv";

/// Snapshot of the steering state for one frame.
pub struct TelemetrySnapshot {
    pub frame: u64,
    pub elapsed: f32,
    pub mode: DriveMode,
    pub pose: Pose,
    pub pivot: Vec3,
}

/// Trait for telemetry output destinations.
pub trait TelemetryOutput: Send + Sync {
    /// Write the CSV header.
    fn write_header(&mut self, header: &str);
    /// Write a data row.
    fn write_row(&mut self, row: &str);
}

/// File-based output.
#[derive(Default)]
pub struct FileTelemetryOutput;

impl TelemetryOutput for FileTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        match File::create(TELEMETRY_PATH) {
            Ok(mut file) => {
                let _ = writeln!(file, "{header}");
            }
            Err(e) => tracing::warn!("Failed to create {TELEMETRY_PATH}: {e}"),
        }
    }

    fn write_row(&mut self, row: &str) {
        if let Ok(mut file) = OpenOptions::new().append(true).open(TELEMETRY_PATH) {
            let _ = writeln!(file, "{row}");
        }
    }
}

/// Stdout output for the headless trace.
pub struct StdoutTelemetryOutput;

impl TelemetryOutput for StdoutTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        println!("{header}");
    }

    fn write_row(&mut self, row: &str) {
        println!("{row}");
    }
}

/// In-memory output, one string per line.
#[derive(Default)]
pub struct BufferTelemetryOutput {
    pub lines: Vec<String>,
}

impl TelemetryOutput for BufferTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        self.lines.clear();
        self.lines.push(header.to_owned());
    }

    fn write_row(&mut self, row: &str) {
        self.lines.push(row.to_owned());
    }
}

/// Macro to define CSV schema and generate telemetry functions.
///
/// This generates `reset_telemetry_to()` and `emit_telemetry_to()` from a
/// single schema definition, keeping column names and formats in sync.
macro_rules! define_telemetry {
    (
        columns: { $( $name:ident : $fmt:literal ),* $(,)? },
        prelude: |$snapshot:ident| { $( $prelude:stmt );* $(;)? },
        row_values: { $( $val:expr ),* $(,)? }
    ) => {
        /// CSV header string.
        const CSV_HEADER: &str = concat!( $( stringify!($name), "," ),* );

        /// Reset telemetry (write header) to the specified output.
        pub fn reset_telemetry_to(output: &mut dyn TelemetryOutput) {
            output.write_header(CSV_HEADER.trim_end_matches(','));
        }

        /// Write telemetry data to the specified output.
        pub fn emit_telemetry_to($snapshot: &TelemetrySnapshot, output: &mut dyn TelemetryOutput) {
            $( $prelude )*

            // Generate row from schema, then trim trailing comma.
            let line = format!( concat!( $( $fmt, "," ),* ), $( $val ),* );
            let line = line.trim_end_matches(',');

            output.write_row(line);
        }
    };
}

define_telemetry! {
    columns: {
        frame: "{}",
        t: "{:.4}",
        mode: "{}",
        pos_x: "{:.3}",
        pos_y: "{:.3}",
        pos_z: "{:.3}",
        yaw_deg: "{:.2}",
        pivot_x: "{:.3}",
        pivot_z: "{:.3}",
        distance: "{:.4}",
    },
    prelude: |s| {
        let distance = s.pose.horizontal_distance_to(s.pivot);
    },
    row_values: {
        s.frame,
        s.elapsed,
        s.mode.label(),
        s.pose.position.x,
        s.pose.position.y,
        s.pose.position.z,
        s.pose.yaw.to_degrees(),
        s.pivot.x,
        s.pivot.z,
        distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> TelemetrySnapshot {
        TelemetrySnapshot {
            frame: 7,
            elapsed: 0.125,
            mode: DriveMode::Pursuing,
            pose: Pose::new(Vec3::new(3.0, 18.0, 4.0), 0.0),
            pivot: Vec3::new(0.0, 18.0, 0.0),
        }
    }

    #[test]
    fn test_header_has_no_trailing_comma() {
        let mut out = BufferTelemetryOutput::default();
        reset_telemetry_to(&mut out);
        assert_eq!(
            out.lines,
            ["frame,t,mode,pos_x,pos_y,pos_z,yaw_deg,pivot_x,pivot_z,distance"]
        );
    }

    #[test]
    fn test_row_matches_header() {
        let mut out = BufferTelemetryOutput::default();
        reset_telemetry_to(&mut out);
        emit_telemetry_to(&snapshot(), &mut out);

        assert_eq!(
            out.lines[1],
            "7,0.1250,Pursuing,3.000,18.000,4.000,0.00,0.000,0.000,5.0000"
        );
        let columns = out.lines[0].split(',').count();
        assert_eq!(out.lines[1].split(',').count(), columns);
    }

    #[test]
    fn test_reset_clears_buffer() {
        let mut out = BufferTelemetryOutput::default();
        reset_telemetry_to(&mut out);
        emit_telemetry_to(&snapshot(), &mut out);
        reset_telemetry_to(&mut out);
        assert_eq!(out.lines.len(), 1);
    }
}
