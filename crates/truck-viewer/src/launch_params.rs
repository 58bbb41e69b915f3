//! Launch parameter parsing for the viewer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use std::path::PathBuf;

use bevy::prelude::*;

/// Default window width in logical pixels.
const DEFAULT_WIDTH: u32 = 1280;
/// Default window height in logical pixels.
const DEFAULT_HEIGHT: u32 = 720;

/// Launch parameters for the viewer.
#[derive(Resource, Debug)]
pub struct LaunchParams {
    /// Scene configuration file, if any.
    pub config: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            config: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    #[command(about = "Steer a truck towards the point under the pointer")]
    struct CliArgs {
        /// JSON scene configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Window width in logical pixels.
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u32,

        /// Window height in logical pixels.
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: u32,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            config: args.config,
            width: args.width,
            height: args.height,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
