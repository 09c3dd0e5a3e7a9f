//! In-memory collaborators for unit tests.

use nalgebra::{UnitQuaternion, Vector3};

use super::collaborators::{CharacterBody, ForceMode, GroundQuery, Presentation};
use super::ground_sensor::LayerMask;

#[derive(Debug, Clone)]
pub struct RecordingBody {
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub damping: f32,
    pub capsule_height: Option<f32>,
    pub forces: Vec<(Vector3<f32>, ForceMode)>,
    /// Height of an infinite floor on layer 0, if any.
    pub floor: Option<f32>,
}

impl RecordingBody {
    pub fn standing() -> Self {
        Self {
            position: Vector3::new(0.0, 1.0, 0.0),
            velocity: Vector3::zeros(),
            damping: 0.0,
            capsule_height: Some(2.0),
            forces: Vec::new(),
            floor: Some(0.0),
        }
    }

    pub fn airborne() -> Self {
        Self {
            floor: None,
            ..Self::standing()
        }
    }

    pub fn impulses(&self) -> Vec<Vector3<f32>> {
        self.forces_of(ForceMode::Impulse)
    }

    pub fn accelerations(&self) -> Vec<Vector3<f32>> {
        self.forces_of(ForceMode::Acceleration)
    }

    fn forces_of(&self, mode: ForceMode) -> Vec<Vector3<f32>> {
        self.forces
            .iter()
            .filter(|(_, m)| *m == mode)
            .map(|(f, _)| *f)
            .collect()
    }
}

impl CharacterBody for RecordingBody {
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

impl GroundQuery for RecordingBody {
    fn cast_ray_down(&self, origin: Vector3<f32>, max_distance: f32, mask: LayerMask) -> bool {
        match self.floor {
            Some(height) => {
                mask.intersects(LayerMask::layer(0))
                    && origin.y >= height
                    && origin.y - height <= max_distance
            }
            None => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub camera: Option<UnitQuaternion<f32>>,
    pub body: Option<UnitQuaternion<f32>>,
    pub cursor_locked: Option<bool>,
    pub debug_rays: usize,
}

impl Presentation for RecordingView {
    fn set_camera_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.camera = Some(orientation);
    }

    fn set_body_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.body = Some(orientation);
    }

    fn set_cursor_locked(&mut self, locked: bool) {
        self.cursor_locked = Some(locked);
    }

    fn draw_debug_ray(&mut self, _origin: Vector3<f32>, _direction: Vector3<f32>, _length: f32) {
        self.debug_rays += 1;
    }
}
