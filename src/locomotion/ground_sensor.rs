use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::collaborators::GroundQuery;

/// Collision-layer bitmask used to filter the ground probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub const fn from_bits(bits: u32) -> Self {
        LayerMask(bits)
    }

    /// Mask containing only layer `index`. Indices past 31 give [`LayerMask::NONE`].
    pub const fn layer(index: u32) -> Self {
        match 1u32.checked_shl(index) {
            Some(bits) => LayerMask(bits),
            None => LayerMask::NONE,
        }
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

/// Downward ray derived from the body origin and capsule height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeRay {
    pub origin: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub length: f32,
}

/// Single downward ground probe.
#[derive(Debug, Clone, Copy)]
pub struct GroundSensor {
    length_factor: f32,
    mask: LayerMask,
}

impl GroundSensor {
    pub fn new(length_factor: f32, mask: LayerMask) -> Self {
        Self { length_factor, mask }
    }

    pub fn mask(&self) -> LayerMask {
        self.mask
    }

    /// Ray used by [`probe`](Self::probe): half the capsule height plus a
    /// small margin so a body resting slightly inside the surface still hits it.
    pub fn ray(&self, origin: Vector3<f32>, capsule_height: f32) -> ProbeRay {
        ProbeRay {
            origin,
            direction: -Vector3::y(),
            length: capsule_height * self.length_factor,
        }
    }

    /// Returns true iff the downward ray from `origin` hits geometry on the ground mask.
    pub fn probe<Q: GroundQuery + ?Sized>(
        &self,
        query: &Q,
        origin: Vector3<f32>,
        capsule_height: f32,
    ) -> bool {
        let ray = self.ray(origin, capsule_height);
        query.cast_ray_down(ray.origin, ray.length, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Flat floor at a fixed height on a fixed layer.
    struct Floor {
        height: f32,
        layers: LayerMask,
        casts: RefCell<Vec<(Vector3<f32>, f32)>>,
    }

    impl GroundQuery for Floor {
        fn cast_ray_down(&self, origin: Vector3<f32>, max_distance: f32, mask: LayerMask) -> bool {
            self.casts.borrow_mut().push((origin, max_distance));
            mask.intersects(self.layers) && origin.y - self.height <= max_distance
        }
    }

    fn floor(height: f32, layers: LayerMask) -> Floor {
        Floor {
            height,
            layers,
            casts: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_probe_length_is_just_over_half_height() {
        let sensor = GroundSensor::new(0.51, LayerMask::ALL);
        let ray = sensor.ray(Vector3::new(0.0, 1.0, 0.0), 2.0);
        assert!((ray.length - 1.02).abs() < 1e-6);
        assert_eq!(ray.direction, Vector3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_probe_hits_floor_under_resting_capsule() {
        let sensor = GroundSensor::new(0.51, LayerMask::ALL);
        let ground = floor(0.0, LayerMask::layer(0));
        assert!(sensor.probe(&ground, Vector3::new(0.0, 1.0, 0.0), 2.0));
        assert_eq!(ground.casts.borrow().len(), 1);
    }

    #[test]
    fn test_probe_misses_when_airborne() {
        let sensor = GroundSensor::new(0.51, LayerMask::ALL);
        let ground = floor(0.0, LayerMask::layer(0));
        assert!(!sensor.probe(&ground, Vector3::new(0.0, 1.5, 0.0), 2.0));
    }

    #[test]
    fn test_probe_ignores_other_layers() {
        let sensor = GroundSensor::new(0.51, LayerMask::layer(3));
        let ground = floor(0.0, LayerMask::layer(0));
        assert!(!sensor.probe(&ground, Vector3::new(0.0, 1.0, 0.0), 2.0));
    }

    #[test]
    fn test_layer_mask_bits() {
        assert_eq!(LayerMask::layer(2).bits(), 4);
        assert!(LayerMask::ALL.intersects(LayerMask::layer(31)));
        assert!(!LayerMask::NONE.intersects(LayerMask::ALL));
    }

    #[test]
    fn test_layer_index_out_of_range_is_empty() {
        assert_eq!(LayerMask::layer(31).bits(), 1 << 31);
        assert_eq!(LayerMask::layer(32), LayerMask::NONE);
        assert_eq!(LayerMask::layer(u32::MAX), LayerMask::NONE);
    }
}
