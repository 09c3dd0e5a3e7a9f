use crossbeam_channel::Receiver;
use nalgebra::Vector3;
use serde::Serialize;
use std::time::Duration;

use super::collaborators::{CharacterBody, GroundQuery, InputEvent, InputSource, Presentation, SubscriptionId};
use super::ground_sensor::GroundSensor;
use super::jump_gate::{JumpGate, JumpOutcome, JumpPhase};
use super::look::{yaw_rotation, LookController};
use super::motion::MotionPlanner;
use super::movement_state::{MovementMode, MovementStateMachine};
use super::speed_limit::SpeedLimiter;
use crate::config::{Abilities, LocomotionConfig};
use crate::error::Error;

/// Mutable per-session state, owned by exactly one controller.
#[derive(Debug, Clone)]
struct LocomotionState {
    abilities: Abilities,
    grounded: bool,
    movement: MovementStateMachine,
    look: LookController,
    planner: MotionPlanner,
    jump: JumpGate,
}

/// What happened during one frame or physics tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickEvents {
    pub jumped: bool,
    pub jump_rearmed: bool,
}

/// Read-only view for animation/UI consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocomotionSnapshot {
    pub grounded: bool,
    pub mode: MovementMode,
    pub move_speed: f32,
    pub move_direction: [f32; 3],
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub jump_phase: JumpPhase,
}

/// First-person locomotion controller.
///
/// Driven by two external clocks:
/// - [`frame_tick`](Self::frame_tick) at the variable frame rate: ground probe,
///   drag, speed resolution, direction sampling, look and speed limiting.
/// - [`physics_tick`](Self::physics_tick) at the fixed physics rate: movement force.
///
/// Discrete input events are queued on a channel registered at activation
/// and handled at the start of whichever tick runs next. Timestamps passed
/// to either tick must come from one monotonic clock.
pub struct LocomotionController {
    config: LocomotionConfig,
    capsule_height: f32,
    sensor: GroundSensor,
    state: LocomotionState,
    subscription: SubscriptionId,
    events: Receiver<InputEvent>,
}

impl LocomotionController {
    /// Validate the configuration and collaborators, subscribe to input
    /// events and lock the cursor.
    pub fn activate<B, I, P>(
        config: LocomotionConfig,
        body: &B,
        input: &mut I,
        presentation: &mut P,
    ) -> Result<Self, Error>
    where
        B: CharacterBody + ?Sized,
        I: InputSource + ?Sized,
        P: Presentation + ?Sized,
    {
        config.validate()?;
        let cooldown = config.jump_cooldown_duration()?;
        let capsule_height = body.capsule_height().ok_or(Error::MissingCollider)?;
        if !capsule_height.is_finite() || capsule_height <= 0.0 {
            return Err(Error::InvalidCapsuleHeight(capsule_height));
        }

        let (sink, events) = crossbeam_channel::unbounded();
        let subscription = input.subscribe(sink);
        presentation.set_cursor_locked(true);

        let state = LocomotionState {
            abilities: config.abilities,
            grounded: false,
            movement: MovementStateMachine::new(&config),
            look: LookController::new(config.pitch_clamp_degrees),
            planner: MotionPlanner::new(),
            jump: JumpGate::new(cooldown),
        };

        tracing::debug!(
            capsule_height,
            subscription = subscription.0,
            "locomotion controller activated"
        );

        Ok(Self {
            sensor: GroundSensor::new(config.ground_probe_length_factor, config.ground_mask),
            config,
            capsule_height,
            state,
            subscription,
            events,
        })
    }

    /// Unsubscribe from input, cancel any pending jump re-arm and release
    /// the cursor. Runtime state is discarded; the configuration is handed
    /// back for a later activation.
    pub fn deactivate<I, P>(mut self, input: &mut I, presentation: &mut P) -> LocomotionConfig
    where
        I: InputSource + ?Sized,
        P: Presentation + ?Sized,
    {
        input.unsubscribe(self.subscription);
        self.state.jump.cancel();
        presentation.set_cursor_locked(false);
        tracing::debug!(subscription = self.subscription.0, "locomotion controller deactivated");
        self.config
    }

    pub fn frame_tick<B, I, P>(
        &mut self,
        dt: f32,
        now: Duration,
        body: &mut B,
        input: &I,
        presentation: &mut P,
    ) -> TickEvents
    where
        B: CharacterBody + GroundQuery + ?Sized,
        I: InputSource + ?Sized,
        P: Presentation + ?Sized,
    {
        let mut events = TickEvents {
            jump_rearmed: self.state.jump.poll(now),
            ..TickEvents::default()
        };

        self.update_grounded(&*body, presentation);
        body.set_linear_damping(if self.state.grounded {
            self.config.ground_drag
        } else {
            0.0
        });

        self.dispatch_pending(body, now, &mut events);
        let target_speed = self.state.movement.resolve(&self.config);

        if self.state.abilities.can_move {
            // Axes come from the facing left by the previous look update.
            let facing = yaw_rotation(self.state.look.yaw());
            self.state.planner.sample_direction(
                input.move_vector(),
                facing * Vector3::z(),
                facing * Vector3::x(),
            );
        }

        if self.state.abilities.can_look {
            let orientation =
                self.state
                    .look
                    .update(input.look_delta(), dt, self.config.look_sensitivity);
            presentation.set_camera_orientation(orientation.camera);
            presentation.set_body_orientation(orientation.body);
        }

        if self.state.abilities.can_move {
            let velocity = body.velocity();
            let limited = SpeedLimiter::clamp(velocity, target_speed);
            if limited != velocity {
                body.set_velocity(limited);
            }
        }

        events
    }

    pub fn physics_tick<B>(&mut self, now: Duration, body: &mut B) -> TickEvents
    where
        B: CharacterBody + ?Sized,
    {
        let mut events = TickEvents {
            jump_rearmed: self.state.jump.poll(now),
            ..TickEvents::default()
        };
        self.dispatch_pending(body, now, &mut events);

        if self.state.abilities.can_move {
            self.state.planner.apply_force(
                body,
                self.state.movement.speed(),
                self.config.air_multiplier,
                self.state.grounded,
            );
        }
        events
    }

    /// Jump hook. Gated by the jump ability, the cooldown and the most
    /// recent ground probe.
    pub fn on_jump<B>(&mut self, body: &mut B, now: Duration) -> Option<JumpOutcome>
    where
        B: CharacterBody + ?Sized,
    {
        if !self.state.abilities.can_jump {
            return None;
        }
        Some(
            self.state
                .jump
                .trigger(body, self.state.grounded, self.config.jump_force, now),
        )
    }

    pub fn on_sprint_start(&mut self) {
        if self.state.abilities.can_sprint {
            self.state.movement.on_sprint_start();
        }
    }

    pub fn on_sprint_stop(&mut self) {
        if self.state.abilities.can_sprint {
            self.state.movement.on_sprint_stop();
        }
    }

    pub fn on_crouch_start(&mut self) {
        if self.state.abilities.can_crouch {
            self.state.movement.on_crouch_start();
        }
    }

    pub fn on_crouch_stop(&mut self) {
        if self.state.abilities.can_crouch {
            self.state.movement.on_crouch_stop();
        }
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn abilities(&self) -> Abilities {
        self.state.abilities
    }

    pub fn abilities_mut(&mut self) -> &mut Abilities {
        &mut self.state.abilities
    }

    pub fn is_grounded(&self) -> bool {
        self.state.grounded
    }

    pub fn mode(&self) -> MovementMode {
        self.state.movement.mode()
    }

    /// Target speed resolved on the last frame tick.
    pub fn move_speed(&self) -> f32 {
        self.state.movement.speed()
    }

    pub fn move_direction(&self) -> Vector3<f32> {
        self.state.planner.direction()
    }

    pub fn yaw_degrees(&self) -> f32 {
        self.state.look.yaw()
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.state.look.pitch()
    }

    pub fn jump_phase(&self) -> JumpPhase {
        self.state.jump.phase()
    }

    pub fn jump_ready(&self) -> bool {
        self.state.jump.is_ready()
    }

    pub fn snapshot(&self) -> LocomotionSnapshot {
        let direction = self.state.planner.direction();
        LocomotionSnapshot {
            grounded: self.state.grounded,
            mode: self.mode(),
            move_speed: self.move_speed(),
            move_direction: [direction.x, direction.y, direction.z],
            yaw_degrees: self.yaw_degrees(),
            pitch_degrees: self.pitch_degrees(),
            jump_phase: self.jump_phase(),
        }
    }

    fn update_grounded<B, P>(&mut self, body: &B, presentation: &mut P)
    where
        B: CharacterBody + GroundQuery + ?Sized,
        P: Presentation + ?Sized,
    {
        let origin = body.position();
        let height = body.capsule_height().unwrap_or(self.capsule_height);
        self.state.grounded = self.sensor.probe(body, origin, height);

        if self.config.debug.draw_ground_probe {
            let ray = self.sensor.ray(origin, height);
            presentation.draw_debug_ray(ray.origin, ray.direction, ray.length);
            tracing::trace!(
                origin = ?ray.origin,
                length = ray.length,
                grounded = self.state.grounded,
                "ground probe"
            );
        }
    }

    fn dispatch_pending<B>(&mut self, body: &mut B, now: Duration, events: &mut TickEvents)
    where
        B: CharacterBody + ?Sized,
    {
        let pending: Vec<InputEvent> = self.events.try_iter().collect();
        for event in pending {
            match event {
                InputEvent::Jump => {
                    if self.on_jump(body, now) == Some(JumpOutcome::Fired) {
                        events.jumped = true;
                    }
                }
                InputEvent::SprintStarted => self.on_sprint_start(),
                InputEvent::SprintStopped => self.on_sprint_stop(),
                InputEvent::CrouchStarted => self.on_crouch_start(),
                InputEvent::CrouchStopped => self.on_crouch_stop(),
            }
        }
    }
}
