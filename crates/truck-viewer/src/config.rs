//! Scene configuration as a Bevy resource.
//!
//! The active [`SceneConfig`] lives in [`ActiveConfig`]. Changes go through
//! [`request_apply`], which validates the new configuration and triggers
//! [`ApplySceneConfig`]; each scene module observes that event and updates
//! the parts it owns.

use std::path::Path;

use bevy::prelude::*;
use truck_steer::{ConfigResult, SceneConfig};

/// The configuration the scene currently reflects.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveConfig(pub SceneConfig);

/// A validated configuration to push into the scene.
#[derive(Event, Debug, Clone)]
pub struct ApplySceneConfig(pub SceneConfig);

/// Plugin for configuration application.
pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveConfig>()
            .add_observer(store_active_config);
    }
}

/// Validate `config` and apply it to the scene.
///
/// An invalid configuration is returned as an error and nothing changes.
pub fn request_apply(commands: &mut Commands, config: SceneConfig) -> ConfigResult<()> {
    config.validate()?;
    commands.trigger(ApplySceneConfig(config));
    Ok(())
}

/// Load the startup configuration, falling back to defaults on any error.
pub fn load_startup_config(path: Option<&Path>) -> SceneConfig {
    let Some(path) = path else {
        return SceneConfig::default();
    };
    match SceneConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load scene config: {e}; using defaults");
            SceneConfig::default()
        }
    }
}

fn store_active_config(trigger: On<ApplySceneConfig>, mut active: ResMut<ActiveConfig>) {
    active.0 = trigger.event().0.clone();
    tracing::info!("Scene configuration applied");
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert a `0xRRGGBB` colour into a Bevy colour.
pub fn hex_color(rgb: u32) -> Color {
    let [_, r, g, b] = rgb.to_be_bytes();
    Color::srgb_u8(r, g, b)
}

/// Split a `0xRRGGBB` colour into bytes for colour pickers.
pub fn hex_to_rgb(rgb: u32) -> [u8; 3] {
    let [_, r, g, b] = rgb.to_be_bytes();
    [r, g, b]
}

/// Pack colour picker bytes back into `0xRRGGBB`.
pub fn rgb_to_hex([r, g, b]: [u8; 3]) -> u32 {
    u32::from_be_bytes([0, r, g, b])
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;

    #[test]
    fn test_hex_round_trips_through_picker_bytes() {
        assert_eq!(hex_to_rgb(0x12_34_56), [0x12, 0x34, 0x56]);
        assert_eq!(rgb_to_hex([0x12, 0x34, 0x56]), 0x12_34_56);
    }

    #[test]
    fn test_hex_color_ignores_high_byte() {
        assert_eq!(hex_color(0xff_ff_00_00), hex_color(0x00_ff_00_00));
        assert_eq!(hex_color(0xff_00_00), Color::srgb_u8(255, 0, 0));
    }

    #[test]
    fn test_missing_path_uses_defaults() {
        assert_eq!(load_startup_config(None), SceneConfig::default());
        assert_eq!(
            load_startup_config(Some(Path::new("/nonexistent/scene.json"))),
            SceneConfig::default()
        );
    }

    #[test]
    fn test_invalid_config_is_not_triggered() {
        let mut app = App::new();
        app.add_plugins(ConfigPlugin);

        let mut bad = SceneConfig::default();
        bad.light.shadow_map_size = 100;
        let mut good = SceneConfig::default();
        good.ground.height = -20.0;

        let results = app
            .world_mut()
            .run_system_once(move |mut commands: Commands| {
                (
                    request_apply(&mut commands, bad.clone()).is_err(),
                    request_apply(&mut commands, good.clone()).is_ok(),
                )
            })
            .unwrap();
        assert_eq!(results, (true, true));
        app.update();
        assert_eq!(app.world().resource::<ActiveConfig>().0.ground.height, -20.0);
    }
}
