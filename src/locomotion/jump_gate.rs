use nalgebra::Vector3;
use serde::Serialize;
use std::time::Duration;

use super::collaborators::{CharacterBody, ForceMode};

/// Deadline-based one-shot timer.
///
/// Polled against a monotonic timestamp; fires exactly once per arm.
#[derive(Debug, Clone, Copy, Default)]
pub struct CooldownTimer {
    deadline: Option<Duration>,
}

impl CooldownTimer {
    pub fn arm(&mut self, now: Duration, duration: Duration) {
        self.deadline = Some(now + duration);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Returns true on the first poll at or after the deadline, false otherwise.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Disarm without firing. Returns true if the timer was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpPhase {
    Ready,
    Cooling,
}

/// Result of a jump trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    Fired,
    CoolingDown,
    NotGrounded,
}

/// Ready/Cooling gate in front of the jump impulse.
///
/// Triggers while cooling or airborne are dropped, never queued.
#[derive(Debug, Clone)]
pub struct JumpGate {
    cooldown: Duration,
    rearm: CooldownTimer,
}

impl JumpGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            rearm: CooldownTimer::default(),
        }
    }

    pub fn phase(&self) -> JumpPhase {
        if self.rearm.is_armed() {
            JumpPhase::Cooling
        } else {
            JumpPhase::Ready
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == JumpPhase::Ready
    }

    /// Re-arm the gate if the cooldown has elapsed. Returns true exactly
    /// once per jump.
    pub fn poll(&mut self, now: Duration) -> bool {
        let rearmed = self.rearm.poll(now);
        if rearmed {
            tracing::debug!(at = ?now, "jump re-armed");
        }
        rearmed
    }

    pub fn trigger<B: CharacterBody + ?Sized>(
        &mut self,
        body: &mut B,
        grounded: bool,
        jump_force: f32,
        now: Duration,
    ) -> JumpOutcome {
        self.poll(now);

        if !self.is_ready() {
            tracing::trace!("jump ignored: cooling down");
            return JumpOutcome::CoolingDown;
        }
        if !grounded {
            tracing::trace!("jump ignored: not grounded");
            return JumpOutcome::NotGrounded;
        }

        let velocity = body.velocity();
        body.set_velocity(Vector3::new(velocity.x, 0.0, velocity.z));
        body.add_force(Vector3::y() * jump_force, ForceMode::Impulse);
        self.rearm.arm(now, self.cooldown);

        tracing::debug!(force = jump_force, at = ?now, "jumped");
        JumpOutcome::Fired
    }

    /// Drop a pending re-arm and return to `Ready`.
    pub fn cancel(&mut self) {
        if self.rearm.cancel() {
            tracing::debug!("pending jump re-arm cancelled");
        }
    }
}
