use serde::Serialize;

use crate::config::LocomotionConfig;

/// Movement mode; exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    #[default]
    Idle,
    Walking,
    Sprinting,
    Crouching,
}

/// Map a mode to its target speed. Idle moves at walk speed.
pub fn resolve_speed(mode: MovementMode, config: &LocomotionConfig) -> f32 {
    match mode {
        MovementMode::Walking => config.walk_speed,
        MovementMode::Sprinting => config.sprint_speed,
        MovementMode::Crouching => config.crouch_speed,
        MovementMode::Idle => config.walk_speed,
    }
}

/// Mode holder driven by discrete sprint/crouch events.
///
/// Stopping a sprint or a crouch always lands in `Walking`, regardless of
/// the mode that was active before it started.
#[derive(Debug, Clone)]
pub struct MovementStateMachine {
    mode: MovementMode,
    speed: f32,
}

impl MovementStateMachine {
    pub fn new(config: &LocomotionConfig) -> Self {
        let mode = MovementMode::default();
        Self {
            mode,
            speed: resolve_speed(mode, config),
        }
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    /// Target speed cached by the last [`resolve`](Self::resolve).
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn on_sprint_start(&mut self) {
        self.transition(MovementMode::Sprinting);
    }

    pub fn on_sprint_stop(&mut self) {
        self.transition(MovementMode::Walking);
    }

    pub fn on_crouch_start(&mut self) {
        self.transition(MovementMode::Crouching);
    }

    pub fn on_crouch_stop(&mut self) {
        self.transition(MovementMode::Walking);
    }

    /// Refresh the cached target speed from the current mode.
    pub fn resolve(&mut self, config: &LocomotionConfig) -> f32 {
        self.speed = resolve_speed(self.mode, config);
        self.speed
    }

    fn transition(&mut self, next: MovementMode) {
        if self.mode != next {
            tracing::debug!(from = ?self.mode, to = ?next, "movement mode changed");
        }
        self.mode = next;
    }
}
