//! Headless steering trace.
//!
//! Runs the steering session without a window and prints one CSV row per
//! frame to stdout, in the same format the viewer records to
//! `telemetry.csv`.
//!
//! Run with: cargo run -p truck-viewer --bin steer-trace -- --pivot 200,-150 --drive

#[cfg(target_family = "wasm")]
fn main() {}

#[cfg(not(target_family = "wasm"))]
mod tracer {
    use std::path::PathBuf;

    use clap::Parser;
    use glam::Vec3;
    use truck_steer::{SceneConfig, SteeringSession};
    use truck_viewer::telemetry::{
        StdoutTelemetryOutput, TelemetrySnapshot, emit_telemetry_to, reset_telemetry_to,
    };

    /// Nominal frame length used for the `t` column.
    const FRAME_SECONDS: f32 = 1.0 / 60.0;

    #[derive(Parser, Debug)]
    #[command(about = "Print a per-frame CSV trace of the truck steering towards a pivot")]
    pub struct TraceArgs {
        /// Number of frames to simulate.
        #[arg(long, default_value_t = 300)]
        pub frames: u64,

        /// Ground point to face, as `X,Z`.
        #[arg(long, value_parser = parse_pivot, allow_hyphen_values = true)]
        pub pivot: Option<(f32, f32)>,

        /// Start in the driving mode instead of parked.
        #[arg(long)]
        pub drive: bool,

        /// JSON scene configuration file.
        #[arg(long)]
        pub config: Option<PathBuf>,
    }

    /// Parse an `X,Z` pair.
    pub fn parse_pivot(text: &str) -> Result<(f32, f32), String> {
        let (x, z) = text
            .split_once(',')
            .ok_or_else(|| format!("expected X,Z but got {text:?}"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("{part:?} is not a finite number"))
        };
        Ok((parse(x)?, parse(z)?))
    }

    pub fn run(args: &TraceArgs) -> Result<(), truck_steer::ConfigError> {
        let config = match &args.config {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::default(),
        };

        let mut session = SteeringSession::from_config(&config);
        if let Some((x, z)) = args.pivot {
            session.retarget(Vec3::new(x, config.ground.height, z));
        }
        if args.drive {
            session.toggle_mode();
        }
        tracing::info!(
            frames = args.frames,
            mode = session.mode().label(),
            "Tracing towards ({:.1}, {:.1})",
            session.pivot().x,
            session.pivot().z
        );

        let mut output = StdoutTelemetryOutput;
        reset_telemetry_to(&mut output);
        for frame in 0..args.frames {
            let pose = session.tick();
            #[allow(clippy::cast_precision_loss)]
            let elapsed = (frame + 1) as f32 * FRAME_SECONDS;
            let snapshot = TelemetrySnapshot {
                frame,
                elapsed,
                mode: session.mode(),
                pose,
                pivot: session.pivot(),
            };
            emit_telemetry_to(&snapshot, &mut output);
        }

        tracing::info!(
            "Finished with {:.3} units remaining",
            session.remaining_distance()
        );
        Ok(())
    }

}

#[cfg(not(target_family = "wasm"))]
fn main() {
    use clap::Parser;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Logs go to stderr so stdout stays pure CSV.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = tracer::TraceArgs::parse();
    if let Err(e) = tracer::run(&args) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
