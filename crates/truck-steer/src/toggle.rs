//! Drive mode switching by activating the truck itself.
//!
//! ```text
//! Parked --activate--> Pursuing --activate--> Parked
//! ```
//!
//! Orientation tracks the pivot in both modes; only `Pursuing` moves.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::pick::{HitResult, PickCamera, cast_ray};
use crate::shape::Intersect;

/// Whether the truck only turns or also drives towards the pivot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveMode {
    /// Turns in place.
    #[default]
    Parked,
    /// Turns and closes in on the pivot.
    Pursuing,
}

impl DriveMode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Parked => Self::Pursuing,
            Self::Pursuing => Self::Parked,
        }
    }

    pub fn is_moving(self) -> bool {
        self == Self::Pursuing
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Parked => "Parked",
            Self::Pursuing => "Pursuing",
        }
    }
}

/// The movement flag owned by the truck.
///
/// Flipped only by an activate event that hits the truck's own shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementToggle {
    mode: DriveMode,
}

impl MovementToggle {
    pub fn new(mode: DriveMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.mode.is_moving()
    }

    /// Handle an activate event (double-click or tap).
    ///
    /// Picks against `vehicle` only; a hit flips the mode, a miss does
    /// nothing.
    pub fn on_pointer_activate(
        &mut self,
        pointer_ndc: Vec2,
        camera: &PickCamera,
        vehicle: &[&dyn Intersect],
    ) -> HitResult {
        let hit = cast_ray(pointer_ndc, camera, vehicle);
        if hit.is_hit() {
            self.mode = self.mode.toggled();
            tracing::debug!(mode = self.mode.label(), "drive mode toggled");
        }
        hit
    }
}
