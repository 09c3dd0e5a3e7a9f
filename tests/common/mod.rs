//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

use nalgebra::{UnitQuaternion, Vector3};
use strider::locomotion::{CharacterBody, ForceMode, GroundQuery, LayerMask, Presentation};

/// Rigid body stand-in that records every force it receives.
#[derive(Debug, Clone)]
pub struct FakeBody {
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub damping: f32,
    pub capsule_height: Option<f32>,
    pub forces: Vec<(Vector3<f32>, ForceMode)>,
    pub grounded: bool,
}

impl FakeBody {
    pub fn grounded() -> Self {
        Self {
            position: Vector3::new(0.0, 1.0, 0.0),
            velocity: Vector3::zeros(),
            damping: 0.0,
            capsule_height: Some(2.0),
            forces: Vec::new(),
            grounded: true,
        }
    }

    pub fn airborne() -> Self {
        Self {
            grounded: false,
            ..Self::grounded()
        }
    }

    pub fn impulses(&self) -> Vec<Vector3<f32>> {
        self.of(ForceMode::Impulse)
    }

    pub fn accelerations(&self) -> Vec<Vector3<f32>> {
        self.of(ForceMode::Acceleration)
    }

    pub fn total_acceleration(&self) -> Vector3<f32> {
        self.accelerations().into_iter().fold(Vector3::zeros(), |a, b| a + b)
    }

    fn of(&self, mode: ForceMode) -> Vec<Vector3<f32>> {
        self.forces
            .iter()
            .filter(|(_, m)| *m == mode)
            .map(|(f, _)| *f)
            .collect()
    }
}

impl CharacterBody for FakeBody {
    fn position(&self) -> Vector3<f32> {
        self.position
    }

    fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vector3<f32>) {
        self.velocity = velocity;
    }

    fn add_force(&mut self, force: Vector3<f32>, mode: ForceMode) {
        self.forces.push((force, mode));
    }

    fn set_linear_damping(&mut self, damping: f32) {
        self.damping = damping;
    }

    fn capsule_height(&self) -> Option<f32> {
        self.capsule_height
    }
}

impl GroundQuery for FakeBody {
    fn cast_ray_down(&self, _origin: Vector3<f32>, _max_distance: f32, mask: LayerMask) -> bool {
        self.grounded && mask != LayerMask::NONE
    }
}

#[derive(Debug, Default)]
pub struct FakeView {
    pub camera: Option<UnitQuaternion<f32>>,
    pub body: Option<UnitQuaternion<f32>>,
    pub cursor_locked: Option<bool>,
}

impl Presentation for FakeView {
    fn set_camera_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.camera = Some(orientation);
    }

    fn set_body_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.body = Some(orientation);
    }

    fn set_cursor_locked(&mut self, locked: bool) {
        self.cursor_locked = Some(locked);
    }
}
