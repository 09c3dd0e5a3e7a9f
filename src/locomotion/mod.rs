//! First-person locomotion: ground probe, movement modes, look, movement
//! force, speed limiting and the jump gate, wired together by
//! [`LocomotionController`].

pub mod collaborators;
pub mod controller;
pub mod ground_sensor;
pub mod jump_gate;
pub mod look;
pub mod motion;
pub mod movement_state;
pub mod speed_limit;

#[cfg(test)]
pub(crate) mod test_support;

pub use collaborators::{
    CharacterBody, ForceMode, GroundQuery, InputEvent, InputSource, Presentation, SubscriptionId,
};
pub use controller::{LocomotionController, LocomotionSnapshot, TickEvents};
pub use ground_sensor::{GroundSensor, LayerMask, ProbeRay};
pub use jump_gate::{CooldownTimer, JumpGate, JumpOutcome, JumpPhase};
pub use look::{LookController, LookOrientation};
pub use motion::{movement_force, normalize_or_zero, MotionPlanner};
pub use movement_state::{resolve_speed, MovementMode, MovementStateMachine};
pub use speed_limit::SpeedLimiter;
