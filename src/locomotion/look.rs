use nalgebra::{UnitQuaternion, Vector2, Vector3};

/// Orientations produced by one look update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookOrientation {
    /// Pitch and yaw; applied to the camera.
    pub camera: UnitQuaternion<f32>,
    /// Yaw only; applied to the body so pitch never tilts the capsule.
    pub body: UnitQuaternion<f32>,
}

/// Integrates look deltas into yaw/pitch accumulators (degrees).
///
/// Yaw is unbounded. Pitch stays inside `[-pitch_limit, pitch_limit]`;
/// positive pitch looks down.
#[derive(Debug, Clone)]
pub struct LookController {
    yaw: f32,
    pitch: f32,
    pitch_limit: f32,
}

impl LookController {
    pub fn new(pitch_limit_degrees: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            pitch_limit: pitch_limit_degrees.abs(),
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn update(&mut self, look_delta: Vector2<f32>, dt: f32, sensitivity: f32) -> LookOrientation {
        let scale = dt * sensitivity;
        self.yaw += look_delta.x * scale;
        self.pitch = (self.pitch - look_delta.y * scale).clamp(-self.pitch_limit, self.pitch_limit);
        self.orientation()
    }

    pub fn orientation(&self) -> LookOrientation {
        let body = yaw_rotation(self.yaw);
        let camera = body * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch.to_radians());
        LookOrientation { camera, body }
    }
}

/// Rotation about the up axis by `yaw_degrees`.
pub fn yaw_rotation(yaw_degrees: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw_degrees.to_radians())
}
