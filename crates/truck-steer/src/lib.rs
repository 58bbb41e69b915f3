//! Pointer picking and kinematic steering for the truck scene.
//!
//! This crate holds everything in the scene that has state or an algorithm
//! worth testing: turning a pointer position into a point on the ground,
//! tracking the pivot the truck should face, toggling whether it drives, and
//! the per-frame steering step. It has no renderer dependency; the viewer
//! feeds it camera matrices and shapes and reads back poses.
//!
//! # Design principles
//!
//! - **Synchronous**: every operation is a pure in-memory computation
//! - **Single writer**: pivot, drive mode and pose each have one mutator
//! - **Engine-agnostic**: shapes and cameras are plain `glam` values

pub mod config;
pub mod error;
pub mod model;
pub mod pick;
pub mod session;
pub mod shape;
pub mod steering;
pub mod toggle;
pub mod tracker;

pub use config::{
    CameraConfig, GroundConfig, LightConfig, MarkerConfig, SceneConfig, ShadowBounds,
    VehicleConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use model::{
    Headlight, Part, PartId, PartRole, PartShape, PartTree, PinModel, Transform3, TruckModel,
};
pub use pick::{HitResult, PickCamera, Ray, cast_ray, pointer_to_ndc};
pub use session::SteeringSession;
pub use shape::{Cuboid, Intersect, Rectangle, TriangleMesh};
pub use steering::{Pose, SteeringEngine, SteeringParams};
pub use toggle::{DriveMode, MovementToggle};
pub use tracker::TargetTracker;
