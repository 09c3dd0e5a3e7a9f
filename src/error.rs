//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::script::ScriptError;

/// Errors raised while wiring a controller to its collaborators.
///
/// Nothing on the controller's per-frame or per-tick path returns an error;
/// every runtime edge case is resolved by policy instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The character handle does not resolve to a rigid body.
    #[error("character has no rigid body")]
    MissingRigidBody,

    /// The rigid body exists but carries no capsule collider.
    #[error("character rigid body has no capsule collider")]
    MissingCollider,

    #[error("capsule height must be positive and finite, got {0}")]
    InvalidCapsuleHeight(f32),

    /// A simulation time step, duration or rate that is negative or not finite.
    #[error("invalid {what}: {value}")]
    InvalidTiming { what: &'static str, value: f32 },
}
