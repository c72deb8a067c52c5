//! Rigid-body world orchestration over rapier3d.
//!
//! The demo authors no simulation code of its own: numerical integration,
//! broad/narrow-phase collision and contact resolution all live in rapier.
//! This module owns the solver state and exposes the handful of operations
//! the scene needs: spawning walls and balls, driving bodies with continuous
//! forces or kinematic targets, and reading back translations.

use glam::Vec3;
use rapier3d::prelude::*;

use crate::time::FIXED_DT;

/// Rapier solver state plus the demo's gravity and timestep settings.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl PhysicsWorld {
    /// Create an empty world with zero gravity and the fixed demo timestep.
    pub fn new() -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = FIXED_DT;

        Self {
            gravity: vector![0.0, 0.0, 0.0],
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Advance the simulation by one fixed step.
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    /// Insert a static cuboid body (a wall).
    pub fn add_static_box(&mut self, center: Vec3, half_extents: Vec3) -> RigidBodyHandle {
        let handle = self
            .bodies
            .insert(RigidBodyBuilder::fixed().translation(to_vector(center)));
        self.colliders.insert_with_parent(
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z),
            handle,
            &mut self.bodies,
        );
        handle
    }

    /// Insert a dynamic ball body of the given mass.
    pub fn add_dynamic_ball(&mut self, position: Vec3, radius: f32, mass: f32) -> RigidBodyHandle {
        let handle = self
            .bodies
            .insert(RigidBodyBuilder::dynamic().translation(to_vector(position)));
        self.colliders.insert_with_parent(
            ColliderBuilder::ball(radius).mass(mass),
            handle,
            &mut self.bodies,
        );
        handle
    }

    /// World-space translation of a body.
    pub fn translation(&self, handle: RigidBodyHandle) -> Vec3 {
        to_vec3(self.bodies[handle].translation())
    }

    /// Linear velocity of a body.
    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Vec3 {
        to_vec3(self.bodies[handle].linvel())
    }

    /// Replace the continuous central force on a body.
    ///
    /// The force persists across steps until replaced, matching the
    /// apply-every-frame semantics of the input mapping.
    pub fn set_force(&mut self, handle: RigidBodyHandle, force: Vec3) {
        let body = &mut self.bodies[handle];
        if force == Vec3::ZERO {
            body.reset_forces(false);
        } else {
            body.reset_forces(true);
            body.add_force(to_vector(force), true);
        }
    }

    /// Switch a body between force-driven dynamic and position-driven
    /// kinematic simulation.
    pub fn set_kinematic(&mut self, handle: RigidBodyHandle, kinematic: bool) {
        let ty = if kinematic {
            RigidBodyType::KinematicPositionBased
        } else {
            RigidBodyType::Dynamic
        };
        self.bodies[handle].set_body_type(ty, true);
    }

    /// Whether a body is currently kinematic.
    pub fn is_kinematic(&self, handle: RigidBodyHandle) -> bool {
        self.bodies[handle].is_kinematic()
    }

    /// Set the translation a kinematic body moves to over the next step.
    pub fn set_kinematic_target(&mut self, handle: RigidBodyHandle, position: Vec3) {
        self.bodies[handle].set_next_kinematic_translation(to_vector(position));
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_accelerates_ball() {
        let mut world = PhysicsWorld::new();
        let ball = world.add_dynamic_ball(Vec3::ZERO, 0.25, 1.0);
        world.set_force(ball, Vec3::new(1.0, 0.0, 0.0));

        for _ in 0..60 {
            world.step();
        }

        assert!(world.translation(ball).x > 0.1);
        assert!(world.linear_velocity(ball).x > 0.5);
    }

    #[test]
    fn test_zero_gravity_leaves_ball_at_rest() {
        let mut world = PhysicsWorld::new();
        let ball = world.add_dynamic_ball(Vec3::new(0.3, 0.4, 0.5), 0.25, 1.0);

        for _ in 0..60 {
            world.step();
        }

        assert!((world.translation(ball) - Vec3::new(0.3, 0.4, 0.5)).length() < 1e-4);
    }

    #[test]
    fn test_clearing_force_stops_acceleration() {
        let mut world = PhysicsWorld::new();
        let ball = world.add_dynamic_ball(Vec3::ZERO, 0.25, 1.0);
        world.set_force(ball, Vec3::new(2.0, 0.0, 0.0));
        for _ in 0..30 {
            world.step();
        }
        let coasting = world.linear_velocity(ball);

        world.set_force(ball, Vec3::ZERO);
        for _ in 0..30 {
            world.step();
        }

        // No force, no gravity, no damping: velocity holds.
        assert!((world.linear_velocity(ball) - coasting).length() < 1e-4);
    }

    #[test]
    fn test_static_box_blocks_ball() {
        let mut world = PhysicsWorld::new();
        // Floor with its top face at y = -0.5.
        world.add_static_box(Vec3::new(0.0, -1.0, 0.0), Vec3::new(5.0, 0.5, 5.0));
        let ball = world.add_dynamic_ball(Vec3::ZERO, 0.25, 1.0);
        world.set_force(ball, Vec3::new(0.0, -10.0, 0.0));

        for _ in 0..300 {
            world.step();
        }

        // Ball rests on the floor instead of passing through.
        assert!(world.translation(ball).y > -0.4);
    }

    #[test]
    fn test_kinematic_body_reaches_target() {
        let mut world = PhysicsWorld::new();
        let ball = world.add_dynamic_ball(Vec3::ZERO, 0.25, 1.0);
        world.set_kinematic(ball, true);
        assert!(world.is_kinematic(ball));

        let target = Vec3::new(1.0, 2.0, 3.0);
        world.set_kinematic_target(ball, target);
        world.step();

        assert!((world.translation(ball) - target).length() < 1e-4);

        world.set_kinematic(ball, false);
        assert!(!world.is_kinematic(ball));
    }
}
