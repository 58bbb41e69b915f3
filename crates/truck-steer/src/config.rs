//! Scene configuration.
//!
//! Every tunable of the scene lives in one explicit [`SceneConfig`]. It is
//! loaded from JSON, validated, and handed to the scene as a whole; missing
//! fields fall back to the values of the stock scene.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::model::PIN_HEIGHT;
use crate::steering::{Pose, SteeringParams};

/// Shadow map resolutions the renderer accepts.
pub const SHADOW_MAP_SIZES: [u32; 5] = [256, 512, 1024, 2048, 4096];

/// Complete scene configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub light: LightConfig,
    pub camera: CameraConfig,
    pub ground: GroundConfig,
    pub vehicle: VehicleConfig,
    pub marker: MarkerConfig,
    pub steering: SteeringParams,
}

/// The directional "sun" light.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub visible: bool,
    /// sRGB colour as `0xRRGGBB`.
    pub color: u32,
    /// Illuminance in lux.
    pub illuminance: f32,
    pub position: Vec3,
    /// Shadow map edge length in texels, one of [`SHADOW_MAP_SIZES`].
    pub shadow_map_size: u32,
    pub shadow_bounds: ShadowBounds,
    /// Draw the shadow volume outline.
    pub helper_visible: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            visible: true,
            color: 0xff_ff_ff,
            illuminance: 10_000.0,
            position: Vec3::new(100.0, 300.0, 100.0),
            shadow_map_size: 512,
            shadow_bounds: ShadowBounds::default(),
            helper_visible: false,
        }
    }
}

/// Extent of the region that receives directional shadows.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowBounds {
    /// Half the width and depth of the shadowed square around the origin.
    pub half_extent: f32,
    /// Distance from the light where shadows start.
    pub near: f32,
    /// Distance from the light where shadows end.
    pub far: f32,
}

impl Default for ShadowBounds {
    fn default() -> Self {
        Self {
            half_extent: 200.0,
            near: 0.0,
            far: 1000.0,
        }
    }
}

/// The viewing camera.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Orbit focus.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 200.0, 500.0),
            target: Vec3::ZERO,
            fov_degrees: 90.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// The ground the pointer picks against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Edge length of the square ground.
    pub size: f32,
    /// Height of the ground plane.
    pub height: f32,
    pub color: u32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            size: 1000.0,
            height: -10.0,
            color: 0x7c_a4_6b,
        }
    }
}

/// The truck.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Height of the truck's centre above the ground.
    pub ride_height: f32,
    /// Starting position on the ground as `(x, z)`.
    pub start: Vec2,
    pub body_color: u32,
    pub cabin_color: u32,
    pub wheel_color: u32,
    pub headlight_color: u32,
    /// Draw headlight cones.
    pub headlight_helpers_visible: bool,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            ride_height: 18.0,
            start: Vec2::ZERO,
            body_color: 0xc2_3b_22,
            cabin_color: 0x2f_4f_8f,
            wheel_color: 0x22_22_22,
            headlight_color: 0xff_f2_b3,
            headlight_helpers_visible: true,
        }
    }
}

/// The pin marking the pivot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub visible: bool,
    pub height: f32,
    pub color: u32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            visible: true,
            height: PIN_HEIGHT,
            color: 0xe6_1e_63,
        }
    }
}

impl SceneConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Height at which the truck drives.
    pub fn vehicle_height(&self) -> f32 {
        self.ground.height + self.vehicle.ride_height
    }

    /// The truck's pose at session start.
    pub fn initial_pose(&self) -> Pose {
        let start = self.vehicle.start;
        Pose::new(Vec3::new(start.x, self.vehicle_height(), start.y), 0.0)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> ConfigResult<()> {
        let light = &self.light;
        if !SHADOW_MAP_SIZES.contains(&light.shadow_map_size) {
            return Err(ConfigError::InvalidShadowMapSize(light.shadow_map_size));
        }
        check(
            "light.illuminance",
            light.illuminance,
            light.illuminance >= 0.0,
            ">= 0",
        )?;
        check_finite("light.position", light.position)?;

        let bounds = &light.shadow_bounds;
        check(
            "light.shadow_bounds.half_extent",
            bounds.half_extent,
            bounds.half_extent > 0.0,
            "> 0",
        )?;
        check(
            "light.shadow_bounds.near",
            bounds.near,
            bounds.near >= 0.0,
            ">= 0",
        )?;
        check(
            "light.shadow_bounds.far",
            bounds.far,
            bounds.far > bounds.near,
            "> shadow_bounds.near",
        )?;

        let camera = &self.camera;
        check_finite("camera.position", camera.position)?;
        check_finite("camera.target", camera.target)?;
        check(
            "camera.fov_degrees",
            camera.fov_degrees,
            camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0,
            "(0, 180)",
        )?;
        check("camera.near", camera.near, camera.near > 0.0, "> 0")?;
        check("camera.far", camera.far, camera.far > camera.near, "> camera.near")?;

        check("ground.size", self.ground.size, self.ground.size > 0.0, "> 0")?;
        check(
            "ground.height",
            self.ground.height,
            self.ground.height.is_finite(),
            "a finite height",
        )?;
        check(
            "vehicle.ride_height",
            self.vehicle.ride_height,
            self.vehicle.ride_height.is_finite(),
            "a finite height",
        )?;
        check("marker.height", self.marker.height, self.marker.height > 0.0, "> 0")?;

        self.steering.validate()
    }
}

fn check(field: &'static str, value: f32, ok: bool, expected: &'static str) -> ConfigResult<()> {
    // NaN fails every comparison above, so it lands here too.
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected,
        })
    }
}

fn check_finite(field: &'static str, value: Vec3) -> ConfigResult<()> {
    match value.to_array().into_iter().find(|v| !v.is_finite()) {
        Some(bad) => Err(ConfigError::OutOfRange {
            field,
            value: bad,
            expected: "finite components",
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_scene() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vehicle_height(), 8.0);
        assert_eq!(config.initial_pose().position, Vec3::new(0.0, 8.0, 0.0));
        assert_eq!(config.steering.approach_factor, 0.03);
        assert_eq!(config.steering.heading_offset_degrees, -90.0);
        assert_eq!(config.light.shadow_map_size, 512);
        assert_eq!(config.camera.position, Vec3::new(0.0, 200.0, 500.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SceneConfig::from_json_str(
            r#"{
                "light": { "shadow_map_size": 2048, "color": 16711680 },
                "steering": { "approach_factor": 0.1 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.light.shadow_map_size, 2048);
        assert_eq!(config.light.color, 0xff_00_00);
        assert_eq!(config.light.position, Vec3::new(100.0, 300.0, 100.0));
        assert_eq!(config.steering.approach_factor, 0.1);
        assert_eq!(config.steering.heading_offset_degrees, -90.0);
    }

    #[test]
    fn test_vectors_parse_as_arrays() {
        let config =
            SceneConfig::from_json_str(r#"{ "camera": { "position": [1.0, 2.0, 3.0] } }"#)
                .unwrap();
        assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_rejects_unsupported_shadow_map_size() {
        let err = SceneConfig::from_json_str(r#"{ "light": { "shadow_map_size": 300 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidShadowMapSize(300)));
    }

    #[test]
    fn test_rejects_inverted_shadow_bounds() {
        let mut config = SceneConfig::default();
        config.light.shadow_bounds.far = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "light.shadow_bounds.far",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_nan_camera_position() {
        let mut config = SceneConfig::default();
        config.camera.position.y = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_steering() {
        let err = SceneConfig::from_json_str(r#"{ "steering": { "approach_factor": 0.0 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "steering.approach_factor",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = SceneConfig::from_json_str("{ light: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SceneConfig::load(Path::new("/nonexistent/truck-steer.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
