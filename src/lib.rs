//! Strider: a first-person locomotion controller.
//!
//! The controller turns move/look input and ground contact into rigid-body
//! forces and camera orientation. Physics, input and presentation are
//! collaborators behind traits; `physics` and `input` provide concrete ones.

pub mod config;
pub mod error;
pub mod input;
pub mod locomotion;
pub mod physics;
pub mod script;
pub mod sim;

pub use config::{Abilities, ConfigError, DebugConfig, LocomotionConfig};
pub use error::Error;
pub use input::InputBus;
pub use locomotion::LocomotionController;
