use nalgebra::Vector3;

/// Caps horizontal speed, leaving the vertical component alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeedLimiter;

impl SpeedLimiter {
    /// Rescale the XZ part of `velocity` to `target_speed` if it is faster.
    pub fn clamp(velocity: Vector3<f32>, target_speed: f32) -> Vector3<f32> {
        let flat = Vector3::new(velocity.x, 0.0, velocity.z);
        let speed = flat.norm();
        if speed <= target_speed {
            return velocity;
        }
        let limited = flat / speed * target_speed;
        Vector3::new(limited.x, velocity.y, limited.z)
    }
}
