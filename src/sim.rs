//! Headless simulation: one character on flat ground driven by an input script.
//!
//! Each frame runs: script events -> controller frame tick -> as many fixed
//! physics ticks as the accumulator allows (controller force, then physics step).

use nalgebra::{UnitQuaternion, Vector3};
use rapier3d::prelude::RigidBodyHandle;
use serde::Serialize;
use std::time::Duration;

use crate::config::LocomotionConfig;
use crate::error::Error;
use crate::input::InputBus;
use crate::locomotion::{LayerMask, LocomotionController, LocomotionSnapshot, Presentation, TickEvents};
use crate::physics::PhysicsWorld;
use crate::script::{InputScript, ScriptPlayer};

/// Layer the simulated floor lives on.
pub const GROUND_LAYER: LayerMask = LayerMask::layer(0);

#[derive(Debug, Clone, Copy)]
pub struct SimulationSettings {
    /// Fixed physics ticks per second.
    pub physics_rate: f32,
    pub capsule_radius: f32,
    pub capsule_height: f32,
    pub spawn: Vector3<f32>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            physics_rate: 50.0,
            capsule_radius: 0.4,
            capsule_height: 2.0,
            spawn: Vector3::new(0.0, 1.0, 0.0),
        }
    }
}

/// Presentation sink that just remembers what it was told.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    pub camera: Option<UnitQuaternion<f32>>,
    pub body: Option<UnitQuaternion<f32>>,
    pub cursor_locked: bool,
    pub debug_rays: u64,
}

impl Presentation for Viewport {
    fn set_camera_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.camera = Some(orientation);
    }

    fn set_body_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.body = Some(orientation);
    }

    fn set_cursor_locked(&mut self, locked: bool) {
        self.cursor_locked = locked;
    }

    fn draw_debug_ray(&mut self, _origin: Vector3<f32>, _direction: Vector3<f32>, _length: f32) {
        self.debug_rays += 1;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub elapsed_secs: f32,
    pub frames: u64,
    pub physics_steps: u64,
    pub jumps: u32,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub cursor_locked: bool,
    pub state: LocomotionSnapshot,
}

pub struct Simulation {
    world: PhysicsWorld,
    character: RigidBodyHandle,
    controller: LocomotionController,
    input: InputBus,
    view: Viewport,
    script: ScriptPlayer,
    elapsed: Duration,
    accumulator: f32,
    physics_dt: f32,
    frames: u64,
    physics_steps: u64,
    jumps: u32,
}

impl Simulation {
    pub fn new(
        config: LocomotionConfig,
        script: InputScript,
        settings: SimulationSettings,
    ) -> Result<Self, Error> {
        if !settings.physics_rate.is_finite() || settings.physics_rate <= 0.0 {
            return Err(Error::InvalidTiming {
                what: "physics rate",
                value: settings.physics_rate,
            });
        }
        let mut world = PhysicsWorld::new();
        world.add_ground(
            Vector3::new(0.0, -0.5, 0.0),
            Vector3::new(500.0, 0.5, 500.0),
            GROUND_LAYER,
        );
        let character = world.add_character(
            settings.spawn,
            settings.capsule_radius,
            settings.capsule_height,
        );
        world.refresh_queries();

        let mut input = InputBus::new();
        let mut view = Viewport::default();
        let controller = {
            let body = world.character(character)?;
            LocomotionController::activate(config, &body, &mut input, &mut view)?
        };

        Ok(Self {
            world,
            character,
            controller,
            input,
            view,
            script: ScriptPlayer::new(script),
            elapsed: Duration::ZERO,
            accumulator: 0.0,
            physics_dt: 1.0 / settings.physics_rate.max(1.0),
            frames: 0,
            physics_steps: 0,
            jumps: 0,
        })
    }

    pub fn controller(&self) -> &LocomotionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut LocomotionController {
        &mut self.controller
    }

    pub fn input_mut(&mut self) -> &mut InputBus {
        &mut self.input
    }

    pub fn view(&self) -> &Viewport {
        &self.view
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn character(&self) -> RigidBodyHandle {
        self.character
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advance one frame of `dt` seconds. `dt` must be finite and non-negative.
    pub fn frame(&mut self, dt: f32) -> Result<TickEvents, Error> {
        let step = non_negative("frame time step", dt)?;
        self.script
            .advance(self.elapsed.as_secs_f32(), &mut self.input);

        let mut events = {
            let mut body = self.world.character(self.character)?;
            self.controller
                .frame_tick(dt, self.elapsed, &mut body, &self.input, &mut self.view)
        };
        self.record(events);

        if let Some(facing) = self.view.body {
            self.world.set_character_rotation(self.character, facing);
        }

        self.accumulator += dt;
        while self.accumulator >= self.physics_dt {
            let tick = {
                let mut body = self.world.character(self.character)?;
                self.controller.physics_tick(self.elapsed, &mut body)
            };
            self.record(tick);
            events.jumped |= tick.jumped;
            events.jump_rearmed |= tick.jump_rearmed;

            self.world.step(self.physics_dt);
            self.accumulator -= self.physics_dt;
            self.physics_steps += 1;
        }

        self.elapsed += step;
        self.frames += 1;
        Ok(events)
    }

    /// Run for `seconds` at `frame_rate` frames per second.
    pub fn run(&mut self, seconds: f32, frame_rate: f32) -> Result<SimulationReport, Error> {
        let seconds = non_negative("run duration", seconds)?.as_secs_f32();
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(Error::InvalidTiming {
                what: "frame rate",
                value: frame_rate,
            });
        }
        let frame_rate = frame_rate.max(1.0);
        let frame_dt = 1.0 / frame_rate;
        let frames = (seconds * frame_rate).round() as u64;
        for _ in 0..frames {
            self.frame(frame_dt)?;
        }
        Ok(self.report())
    }

    pub fn report(&self) -> SimulationReport {
        let position = self.world.position(self.character).unwrap_or_else(Vector3::zeros);
        let velocity = self.world.velocity(self.character).unwrap_or_else(Vector3::zeros);
        SimulationReport {
            elapsed_secs: self.elapsed.as_secs_f32(),
            frames: self.frames,
            physics_steps: self.physics_steps,
            jumps: self.jumps,
            position: [position.x, position.y, position.z],
            velocity: [velocity.x, velocity.y, velocity.z],
            cursor_locked: self.view.cursor_locked,
            state: self.controller.snapshot(),
        }
    }

    /// Deactivate the controller and hand back its configuration.
    pub fn shutdown(mut self) -> LocomotionConfig {
        self.controller.deactivate(&mut self.input, &mut self.view)
    }

    fn record(&mut self, events: TickEvents) {
        if events.jumped {
            self.jumps += 1;
            tracing::debug!(at = ?self.elapsed, "simulation: jump fired");
        }
    }
}

fn non_negative(what: &'static str, seconds: f32) -> Result<Duration, Error> {
    Duration::try_from_secs_f32(seconds).map_err(|_| Error::InvalidTiming {
        what,
        value: seconds,
    })
}
