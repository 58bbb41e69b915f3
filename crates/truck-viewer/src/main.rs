//! Truck steering viewer using Bevy.
//!
//! A truck sits on a ground plane and always faces the point under the
//! pointer. Double-clicking the truck makes it drive towards that point,
//! covering a fixed fraction of the remaining distance every frame.

mod camera;
mod config;
mod gizmos;
mod input;
mod launch_params;
mod scene;
mod steering;
mod ui;

use bevy::prelude::*;
use camera::CameraPlugin;
use config::{ActiveConfig, ConfigPlugin, load_startup_config};
use gizmos::HelperGizmosPlugin;
use input::InputPlugin;
use scene::ScenePlugin;
use steering::SteeringPlugin;
use ui::DebugUiPlugin;

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            ConfigPlugin,
            InputPlugin,
            ScenePlugin,
            CameraPlugin,
            SteeringPlugin,
            HelperGizmosPlugin,
            DebugUiPlugin,
        ));
    }
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();
    let config = load_startup_config(params.config.as_deref());

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "truck-viewer".to_string(),
        resolution: (params.width, params.height).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    // Inserted before `ConfigPlugin`, whose `init_resource` keeps it.
    app.insert_resource(ActiveConfig(config))
        .insert_resource(params);

    app.add_plugins(AppPlugin).run();
}
