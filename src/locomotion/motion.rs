use nalgebra::{Vector2, Vector3};

use super::collaborators::{CharacterBody, ForceMode};

/// Normalize `v`, mapping the zero vector to zero instead of NaN.
pub fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    v.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
}

/// Movement force for one physics tick.
///
/// Magnitude is `target_speed` on the ground and `target_speed * air_multiplier`
/// in the air, along the normalized direction. The direction is always
/// normalized; callers cannot opt out.
pub fn movement_force(
    direction: Vector3<f32>,
    target_speed: f32,
    air_multiplier: f32,
    grounded: bool,
) -> Vector3<f32> {
    let magnitude = if grounded {
        target_speed
    } else {
        target_speed * air_multiplier
    };
    normalize_or_zero(direction) * magnitude
}

/// Samples a world-space move direction every frame and turns the latest
/// sample into a force on every physics tick.
///
/// The force uses whatever was sampled last, so it may lag the newest frame
/// by up to one physics step.
#[derive(Debug, Clone, Default)]
pub struct MotionPlanner {
    direction: Vector3<f32>,
}

impl MotionPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last sampled direction, not normalized.
    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn sample_direction(
        &mut self,
        move_input: Vector2<f32>,
        forward: Vector3<f32>,
        right: Vector3<f32>,
    ) -> Vector3<f32> {
        self.direction = forward * move_input.y + right * move_input.x;
        self.direction
    }

    /// Apply the last sampled direction as an acceleration force.
    /// Returns the force handed to the body.
    pub fn apply_force<B: CharacterBody + ?Sized>(
        &self,
        body: &mut B,
        target_speed: f32,
        air_multiplier: f32,
        grounded: bool,
    ) -> Vector3<f32> {
        let force = movement_force(self.direction, target_speed, air_multiplier, grounded);
        if force != Vector3::zeros() {
            body.add_force(force, ForceMode::Acceleration);
        }
        force
    }
}
