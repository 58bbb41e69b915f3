//! One truck, one pivot, one drive mode.
//!
//! [`SteeringSession`] wires the tracker, the toggle and the engine together
//! so that a frontend only forwards pointer events and ticks once per frame.

use glam::{Vec2, Vec3};

use crate::config::SceneConfig;
use crate::pick::{HitResult, PickCamera};
use crate::shape::Intersect;
use crate::steering::{Pose, SteeringEngine, SteeringParams};
use crate::toggle::{DriveMode, MovementToggle};
use crate::tracker::TargetTracker;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteeringSession {
    pose: Pose,
    tracker: TargetTracker,
    toggle: MovementToggle,
    engine: SteeringEngine,
}

impl SteeringSession {
    /// Parked at `pose`, with the pivot directly beneath it.
    pub fn new(pose: Pose, params: SteeringParams) -> Self {
        Self {
            pose,
            tracker: TargetTracker::beneath(pose.position),
            toggle: MovementToggle::default(),
            engine: SteeringEngine::new(params),
        }
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(config.initial_pose(), config.steering)
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn pivot(&self) -> Vec3 {
        self.tracker.pivot()
    }

    pub fn mode(&self) -> DriveMode {
        self.toggle.mode()
    }

    /// Horizontal distance left to the pivot.
    pub fn remaining_distance(&self) -> f32 {
        self.pose.horizontal_distance_to(self.tracker.pivot())
    }

    pub fn on_pointer_move(
        &mut self,
        pointer_ndc: Vec2,
        camera: &PickCamera,
        ground: &[&dyn Intersect],
    ) -> HitResult {
        self.tracker
            .on_pointer_move(pointer_ndc, camera, ground, self.pose.position.y)
    }

    /// Set the pivot directly from a ground point.
    pub fn retarget(&mut self, ground_point: Vec3) {
        self.tracker.retarget(ground_point, self.pose.position.y);
    }

    pub fn on_pointer_activate(
        &mut self,
        pointer_ndc: Vec2,
        camera: &PickCamera,
        vehicle: &[&dyn Intersect],
    ) -> HitResult {
        self.toggle.on_pointer_activate(pointer_ndc, camera, vehicle)
    }

    /// Flip the drive mode without picking.
    pub fn toggle_mode(&mut self) {
        self.toggle = MovementToggle::new(self.toggle.mode().toggled());
    }

    /// Advance one frame and return the new pose.
    pub fn tick(&mut self) -> Pose {
        self.pose = self
            .engine
            .step(self.pose, self.tracker.pivot(), self.toggle.is_enabled());
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::model::TruckModel;
    use crate::shape::{Cuboid, Rectangle};

    fn top_down_camera() -> PickCamera {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 400.0, 0.0), Vec3::ZERO, Vec3::NEG_Z);
        PickCamera::new(
            view.inverse(),
            Mat4::orthographic_rh(-500.0, 500.0, -500.0, 500.0, 0.1, 1000.0),
        )
    }

    fn session() -> SteeringSession {
        SteeringSession::new(
            Pose::new(Vec3::new(0.0, 18.0, 0.0), 0.0),
            SteeringParams::default(),
        )
    }

    fn ground() -> Rectangle {
        Rectangle::horizontal(Vec3::new(0.0, -10.0, 0.0), 1000.0, 1000.0)
    }

    fn truck_shapes(session: &SteeringSession) -> Vec<Cuboid> {
        TruckModel::build().pick_shapes(&session.pose())
    }

    #[test]
    fn test_starts_parked_over_itself() {
        let mut session = session();
        assert_eq!(session.mode(), DriveMode::Parked);
        assert_eq!(session.pivot(), session.pose().position);
        let before = session.pose();
        assert_eq!(session.tick(), before);
    }

    #[test]
    fn test_parked_turns_in_place() {
        let mut session = session();
        session.retarget(Vec3::new(100.0, -10.0, 0.0));
        for _ in 0..10 {
            session.tick();
        }
        assert_eq!(session.pose().position, Vec3::new(0.0, 18.0, 0.0));
        assert!(session.pose().forward().distance(Vec3::X) < 1e-5);
    }

    #[test]
    fn test_pointer_move_then_drive() {
        let mut session = session();
        let camera = top_down_camera();
        // (0.2, 0.0) lands on (100, -10, 0).
        let hit = session.on_pointer_move(Vec2::new(0.2, 0.0), &camera, &[&ground()]);
        assert!(hit.is_hit());
        assert!((session.pivot().x - 100.0).abs() < 1e-2);
        assert_eq!(session.pivot().y, 18.0);

        let shapes = truck_shapes(&session);
        let targets: Vec<&dyn Intersect> = shapes.iter().map(|s| s as &dyn Intersect).collect();
        assert!(session.on_pointer_activate(Vec2::ZERO, &camera, &targets).is_hit());
        assert_eq!(session.mode(), DriveMode::Pursuing);

        let pose = session.tick();
        assert!((pose.position.x - 3.0).abs() < 0.01);
        assert_eq!(pose.position.y, 18.0);
    }

    #[test]
    fn test_pivot_reached_asymptotically() {
        let mut session = session();
        session.retarget(Vec3::new(0.0, 0.0, -200.0));
        session.toggle_mode();
        let mut last = session.remaining_distance();
        for _ in 0..300 {
            session.tick();
            let now = session.remaining_distance();
            assert!(now < last);
            last = now;
        }
        assert!(last < 1.0);
        assert!(last > 0.0);
    }

    #[test]
    fn test_second_activation_parks() {
        let mut session = session();
        session.retarget(Vec3::new(-80.0, 0.0, 60.0));
        session.toggle_mode();
        for _ in 0..5 {
            session.tick();
        }
        session.toggle_mode();
        let parked_at = session.pose().position;
        for _ in 0..5 {
            session.tick();
        }
        assert_eq!(session.pose().position, parked_at);
    }

    #[test]
    fn test_missed_activation_keeps_mode() {
        let mut session = session();
        let camera = top_down_camera();
        let shapes = truck_shapes(&session);
        let targets: Vec<&dyn Intersect> = shapes.iter().map(|s| s as &dyn Intersect).collect();
        let hit = session.on_pointer_activate(Vec2::new(-0.8, 0.8), &camera, &targets);
        assert_eq!(hit, HitResult::Miss);
        assert_eq!(session.mode(), DriveMode::Parked);
    }

    #[test]
    fn test_from_config_uses_vehicle_height() {
        let session = SteeringSession::from_config(&SceneConfig::default());
        assert_eq!(session.pose().position, Vec3::new(0.0, 8.0, 0.0));
        assert_eq!(session.pivot().y, 8.0);
    }
}
