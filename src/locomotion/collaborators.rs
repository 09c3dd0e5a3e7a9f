//! Interfaces to the systems the controller drives but does not own.
//!
//! Convention: +Y is up, body forward is +Z and body right is +X before any
//! yaw is applied.

use crossbeam_channel::Sender;
use nalgebra::{UnitQuaternion, Vector2, Vector3};

use super::ground_sensor::LayerMask;

/// How a force passed to [`CharacterBody::add_force`] is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Continuous acceleration for the next physics step, independent of mass.
    Acceleration,
    /// Instantaneous change in momentum.
    Impulse,
}

/// Rigid body controlled by the locomotion controller.
pub trait CharacterBody {
    /// World-space position of the body origin.
    fn position(&self) -> Vector3<f32>;

    fn velocity(&self) -> Vector3<f32>;

    fn set_velocity(&mut self, velocity: Vector3<f32>);

    fn add_force(&mut self, force: Vector3<f32>, mode: ForceMode);

    fn set_linear_damping(&mut self, damping: f32);

    /// Total height of the capsule collider, or `None` if the body has none.
    fn capsule_height(&self) -> Option<f32>;
}

/// Scene query used by the ground probe.
pub trait GroundQuery {
    /// True iff a ray cast straight down from `origin` hits geometry on
    /// `mask` within `max_distance`.
    fn cast_ray_down(&self, origin: Vector3<f32>, max_distance: f32, mask: LayerMask) -> bool;
}

/// Discrete input events delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Jump,
    SprintStarted,
    SprintStopped,
    CrouchStarted,
    CrouchStopped,
}

/// Identifies one registered event subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Source of continuous move/look signals and discrete events.
pub trait InputSource {
    /// Current 2D move vector: x is strafe, y is forward.
    fn move_vector(&self) -> Vector2<f32>;

    /// Look delta for the current frame.
    fn look_delta(&self) -> Vector2<f32>;

    /// Register a sink for discrete events.
    fn subscribe(&mut self, sink: Sender<InputEvent>) -> SubscriptionId;

    /// Drop a sink. Returns false if `id` was not registered.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// Render-side sinks for orientation and cursor state.
pub trait Presentation {
    fn set_camera_orientation(&mut self, orientation: UnitQuaternion<f32>);

    fn set_body_orientation(&mut self, orientation: UnitQuaternion<f32>);

    fn set_cursor_locked(&mut self, locked: bool);

    /// Debug visualization hook; ignored unless overridden.
    fn draw_debug_ray(&mut self, _origin: Vector3<f32>, _direction: Vector3<f32>, _length: f32) {}
}
