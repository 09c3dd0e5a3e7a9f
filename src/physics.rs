//! Rapier3D-backed physics collaborator: a dynamic capsule character on
//! static ground geometry.

use nalgebra::{UnitQuaternion, Vector3};
use rapier3d::prelude::*;

use crate::error::Error;
use crate::locomotion::{CharacterBody, ForceMode, GroundQuery, LayerMask};

/// Default gravity in m/s² (applied along -Y)
pub const DEFAULT_GRAVITY: f32 = 9.81;

/// Character capsule mass in kg
pub const CHARACTER_MASS: f32 = 1.0;

// Characters sit on their own group; ground geometry takes its memberships
// from the caller's layer mask.
const GROUP_CHARACTER: Group = Group::GROUP_32;

fn layer_group(mask: LayerMask) -> Group {
    Group::from_bits_truncate(mask.bits())
}

/// Wrapper around the Rapier3D pipeline.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,

    /// Bodies whose accumulated forces are cleared after every step
    characters: Vec<RigidBodyHandle>,
}

impl PhysicsWorld {
    /// Creates a new physics world with default gravity
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, -DEFAULT_GRAVITY, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            characters: Vec::new(),
        }
    }

    /// Sets the gravity magnitude (applied along -Y)
    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = vector![0.0, -gravity, 0.0];
    }

    /// Steps the simulation forward by dt seconds.
    ///
    /// Character forces only last for the step they were added in.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        for &handle in &self.characters {
            if let Some(body) = self.rigid_body_set.get_mut(handle) {
                body.reset_forces(false);
            }
        }
    }

    /// Rebuild the query pipeline so raycasts see colliders added since the last step.
    pub fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Adds a static box on the given layers. Returns its collider handle.
    pub fn add_ground(
        &mut self,
        center: Vector3<f32>,
        half_extents: Vector3<f32>,
        layers: LayerMask,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(center)
            .collision_groups(InteractionGroups::new(layer_group(layers), Group::ALL))
            .build();
        self.collider_set.insert(collider)
    }

    /// Adds a dynamic capsule character with rotations locked.
    /// `height` is the total capsule height including both caps.
    pub fn add_character(&mut self, position: Vector3<f32>, radius: f32, height: f32) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(position)
            .lock_rotations()
            .ccd_enabled(true)
            .build();
        let body_handle = self.rigid_body_set.insert(body);

        // Capsule half-height is the cylinder part: total = 2 * half_height + 2 * radius
        let half_height = (height - 2.0 * radius).max(0.0) / 2.0;
        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .mass(CHARACTER_MASS)
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .collision_groups(InteractionGroups::new(GROUP_CHARACTER, Group::ALL))
            .build();
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        self.characters.push(body_handle);
        body_handle
    }

    /// Borrow a character as a locomotion collaborator.
    pub fn character(&mut self, handle: RigidBodyHandle) -> Result<RapierCharacter<'_>, Error> {
        let collider = {
            let body = self
                .rigid_body_set
                .get(handle)
                .ok_or(Error::MissingRigidBody)?;
            body.colliders()
                .iter()
                .copied()
                .find(|ch| {
                    self.collider_set
                        .get(*ch)
                        .is_some_and(|c| c.shape().as_capsule().is_some())
                })
                .ok_or(Error::MissingCollider)?
        };

        Ok(RapierCharacter {
            bodies: &mut self.rigid_body_set,
            colliders: &self.collider_set,
            queries: &self.query_pipeline,
            body: handle,
            collider,
        })
    }

    /// Sets the facing of a character body
    pub fn set_character_rotation(&mut self, handle: RigidBodyHandle, rotation: UnitQuaternion<f32>) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_rotation(rotation, true);
        }
    }

    /// Gets the position of a rigid body
    pub fn position(&self, handle: RigidBodyHandle) -> Option<Vector3<f32>> {
        self.rigid_body_set.get(handle).map(|body| *body.translation())
    }

    /// Gets the velocity of a rigid body
    pub fn velocity(&self, handle: RigidBodyHandle) -> Option<Vector3<f32>> {
        self.rigid_body_set.get(handle).map(|body| *body.linvel())
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// One character body borrowed out of a [`PhysicsWorld`].
pub struct RapierCharacter<'a> {
    bodies: &'a mut RigidBodySet,
    colliders: &'a ColliderSet,
    queries: &'a QueryPipeline,
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

impl RapierCharacter<'_> {
    fn mass(&self) -> f32 {
        let mass = self.bodies[self.body].mass();
        if mass > 0.0 {
            mass
        } else {
            // Body mass properties are only refreshed on step.
            self.colliders[self.collider].mass()
        }
    }
}

impl CharacterBody for RapierCharacter<'_> {
    fn position(&self) -> Vector3<f32> {
        *self.bodies[self.body].translation()
    }

    fn velocity(&self) -> Vector3<f32> {
        *self.bodies[self.body].linvel()
    }

    fn set_velocity(&mut self, velocity: Vector3<f32>) {
        self.bodies[self.body].set_linvel(velocity, true);
    }

    fn add_force(&mut self, force: Vector3<f32>, mode: ForceMode) {
        match mode {
            ForceMode::Acceleration => {
                let mass = self.mass();
                self.bodies[self.body].add_force(force * mass, true);
            }
            ForceMode::Impulse => self.bodies[self.body].apply_impulse(force, true),
        }
    }

    fn set_linear_damping(&mut self, damping: f32) {
        self.bodies[self.body].set_linear_damping(damping);
    }

    fn capsule_height(&self) -> Option<f32> {
        let capsule = self.colliders.get(self.collider)?.shape().as_capsule()?;
        Some(2.0 * (capsule.half_height() + capsule.radius))
    }
}

impl GroundQuery for RapierCharacter<'_> {
    fn cast_ray_down(&self, origin: Vector3<f32>, max_distance: f32, mask: LayerMask) -> bool {
        let ray = Ray::new(point![origin.x, origin.y, origin.z], vector![0.0, -1.0, 0.0]);
        let filter = QueryFilter::default()
            .exclude_rigid_body(self.body)
            .exclude_sensors()
            .groups(InteractionGroups::new(Group::ALL, layer_group(mask)));

        self.queries
            .cast_ray(&*self.bodies, self.colliders, &ray, max_distance, true, filter)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn world_with_floor() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        // Top face at y = 0
        world.add_ground(
            Vector3::new(0.0, -0.5, 0.0),
            Vector3::new(50.0, 0.5, 50.0),
            LayerMask::layer(0),
        );
        world
    }

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.gravity.y, -DEFAULT_GRAVITY);
    }

    #[test]
    fn test_capsule_height_round_trips() {
        let mut world = PhysicsWorld::new();
        let handle = world.add_character(Vector3::new(0.0, 1.0, 0.0), 0.4, 2.0);
        let character = world.character(handle).unwrap();
        let height = character.capsule_height().unwrap();
        assert!((height - 2.0).abs() < 1e-5, "got {}", height);
    }

    #[test]
    fn test_missing_body_and_collider() {
        let mut world = PhysicsWorld::new();
        let bare = world.rigid_body_set.insert(RigidBodyBuilder::dynamic().build());
        assert!(matches!(world.character(bare), Err(Error::MissingCollider)));

        let handle = world.add_character(Vector3::new(0.0, 1.0, 0.0), 0.4, 2.0);
        world.rigid_body_set.remove(
            handle,
            &mut world.island_manager,
            &mut world.collider_set,
            &mut world.impulse_joint_set,
            &mut world.multibody_joint_set,
            true,
        );
        assert!(matches!(world.character(handle), Err(Error::MissingRigidBody)));
    }

    #[test]
    fn test_ground_probe_respects_layers() {
        let mut world = world_with_floor();
        let handle = world.add_character(Vector3::new(0.0, 1.0, 0.0), 0.4, 2.0);
        world.refresh_queries();

        let character = world.character(handle).unwrap();
        let origin = character.position();
        assert!(character.cast_ray_down(origin, 1.02, LayerMask::layer(0)));
        assert!(!character.cast_ray_down(origin, 1.02, LayerMask::layer(1)));
        assert!(!character.cast_ray_down(origin, 0.5, LayerMask::ALL));
    }

    #[test]
    fn test_probe_ignores_own_capsule() {
        let mut world = PhysicsWorld::new();
        let handle = world.add_character(Vector3::new(0.0, 10.0, 0.0), 0.4, 2.0);
        world.refresh_queries();

        let character = world.character(handle).unwrap();
        assert!(!character.cast_ray_down(character.position(), 1.02, LayerMask::ALL));
    }

    #[test]
    fn test_acceleration_force_moves_character() {
        let mut world = world_with_floor();
        let handle = world.add_character(Vector3::new(0.0, 1.0, 0.0), 0.4, 2.0);

        for _ in 0..30 {
            world
                .character(handle)
                .unwrap()
                .add_force(Vector3::new(8.0, 0.0, 0.0), ForceMode::Acceleration);
            world.step(DT);
        }

        let velocity = world.velocity(handle).unwrap();
        assert!(velocity.x > 1.0, "expected +X speed, got {:?}", velocity);
        assert!(velocity.z.abs() < 0.1);
    }

    #[test]
    fn test_forces_are_cleared_after_step() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(0.0);
        let handle = world.add_character(Vector3::new(0.0, 5.0, 0.0), 0.4, 2.0);

        world
            .character(handle)
            .unwrap()
            .add_force(Vector3::new(10.0, 0.0, 0.0), ForceMode::Acceleration);
        world.step(DT);
        let after_push = world.velocity(handle).unwrap().x;
        assert!(after_push > 0.0);

        for _ in 0..10 {
            world.step(DT);
        }
        let coasting = world.velocity(handle).unwrap().x;
        assert!((coasting - after_push).abs() < 1e-3, "force kept accelerating: {} vs {}", coasting, after_push);
    }

    #[test]
    fn test_impulse_launches_character() {
        let mut world = world_with_floor();
        let handle = world.add_character(Vector3::new(0.0, 1.0, 0.0), 0.4, 2.0);
        world.step(DT);

        world
            .character(handle)
            .unwrap()
            .add_force(Vector3::new(0.0, 6.0, 0.0), ForceMode::Impulse);
        world.step(DT);

        let velocity = world.velocity(handle).unwrap();
        assert!(velocity.y > 4.0, "expected upward launch, got {:?}", velocity);
    }
}
