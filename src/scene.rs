//! Scene assembly and the per-frame update.
//!
//! The scene is a sealed box with a player sphere and a cloud of point
//! bodies inside it. Each frame the resolved input either positions the
//! player from a palm (kinematic) or pushes it with a force (dynamic), the
//! grab strength attracts or repels every point, and the physics world
//! advances by the frame's fixed steps.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rapier3d::prelude::RigidBodyHandle;

use crate::color::CyclingColor;
use crate::input::{map_range, Drive};
use crate::physics::PhysicsWorld;

/// Number of point bodies unless overridden.
pub const DEFAULT_POINT_COUNT: u32 = 500;

/// Player sphere radius.
pub const PLAYER_RADIUS: f32 = 0.25;

/// Point sphere radius.
pub const POINT_RADIUS: f32 = 0.12;

const PLAYER_MASS: f32 = 1.0;
const POINT_MASS: f32 = 0.1;

/// Inner half-extents of the boundary box.
pub const BOX_HALF_EXTENTS: Vec3 = Vec3::new(1.5, 2.0, 1.0);

const WALL_THICKNESS: f32 = 0.5;

/// Extra in-plane half-extent on each wall so the corners stay sealed.
const WALL_PAD: f32 = WALL_THICKNESS;

/// Points spawn uniformly inside this half-extent cube.
const SPAWN_HALF_EXTENT: f32 = 1.0;

/// Grab strength above this attracts points to the player.
const ATTRACT_THRESHOLD: f32 = 0.9;

/// Grab strength below this repels points from the player.
const REPEL_THRESHOLD: f32 = 0.1;

/// Point force at a fully closed fist (negative: toward the player).
const ATTRACT_PEAK: f32 = -0.5;

/// Point force at a fully open hand (positive: away from the player).
const REPEL_PEAK: f32 = 0.5;

/// The demo world: player, points, walls, and the player's visual state.
pub struct Scene {
    physics: PhysicsWorld,
    player: RigidBodyHandle,
    points: Vec<RigidBodyHandle>,
    player_color: CyclingColor,
    hand_active: bool,
}

impl Scene {
    /// Build the boundary box, the player at the origin, and `point_count`
    /// points scattered in the spawn cube.
    pub fn new(point_count: u32) -> Self {
        let mut rng = SmallRng::from_entropy();
        let positions: Vec<Vec3> = (0..point_count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
                    rng.gen_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
                    rng.gen_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
                )
            })
            .collect();
        Self::with_point_positions(&positions)
    }

    fn with_point_positions(positions: &[Vec3]) -> Self {
        let mut physics = PhysicsWorld::new();
        build_walls(&mut physics);

        let player = physics.add_dynamic_ball(Vec3::ZERO, PLAYER_RADIUS, PLAYER_MASS);
        let points = positions
            .iter()
            .map(|&p| physics.add_dynamic_ball(p, POINT_RADIUS, POINT_MASS))
            .collect();

        Self {
            physics,
            player,
            points,
            player_color: CyclingColor::new(),
            hand_active: false,
        }
    }

    /// One frame of simulation: apply the resolved input, run `steps` fixed
    /// physics steps, and advance the visual state by `dt` seconds.
    pub fn update(&mut self, drive: Drive, steps: u32, dt: f32) {
        match drive {
            Drive::Palm { position, grab } => {
                if !self.hand_active {
                    self.physics.set_kinematic(self.player, true);
                    self.hand_active = true;
                }
                self.physics.set_kinematic_target(self.player, position);
                self.apply_grab_forces(grab);
            }
            Drive::Force(force) => {
                if self.hand_active {
                    self.physics.set_kinematic(self.player, false);
                    self.hand_active = false;
                }
                self.physics.set_force(self.player, force);
                self.clear_point_forces();
            }
        }

        for _ in 0..steps {
            self.physics.step();
        }

        self.player_color.advance(dt);
    }

    /// Apply the grab-strength force to every point.
    ///
    /// Past the attract threshold the force ramps from zero to
    /// [`ATTRACT_PEAK`] toward the player; below the repel threshold it
    /// ramps from zero to [`REPEL_PEAK`] away. In between, points drift
    /// freely.
    fn apply_grab_forces(&mut self, grab: f32) {
        let magnitude = if grab > ATTRACT_THRESHOLD {
            map_range(grab, ATTRACT_THRESHOLD, 1.0, 0.0, ATTRACT_PEAK)
        } else if grab < REPEL_THRESHOLD {
            map_range(grab, REPEL_THRESHOLD, 0.0, 0.0, REPEL_PEAK)
        } else {
            self.clear_point_forces();
            return;
        };

        let player_position = self.physics.translation(self.player);
        for i in 0..self.points.len() {
            let handle = self.points[i];
            let away = self.physics.translation(handle) - player_position;
            // A point sitting exactly on the player has no direction.
            let Some(direction) = away.try_normalize() else {
                continue;
            };
            self.physics.set_force(handle, direction * magnitude);
        }
    }

    fn clear_point_forces(&mut self) {
        for &handle in &self.points {
            self.physics.set_force(handle, Vec3::ZERO);
        }
    }

    /// Current player position.
    pub fn player_position(&self) -> Vec3 {
        self.physics.translation(self.player)
    }

    /// Current player (and light) color.
    pub fn player_color(&self) -> Vec3 {
        self.player_color.rgb()
    }

    /// Number of point bodies.
    pub fn point_count(&self) -> u32 {
        self.points.len() as u32
    }

    /// Iterate the current point translations in spawn order.
    pub fn point_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.points.iter().map(|&h| self.physics.translation(h))
    }

    #[cfg(test)]
    fn player_is_kinematic(&self) -> bool {
        self.physics.is_kinematic(self.player)
    }
}

/// Six static walls sealing the box, each padded in-plane so the corners
/// overlap.
fn build_walls(physics: &mut PhysicsWorld) {
    let half_thickness = WALL_THICKNESS / 2.0;
    for axis in 0..3 {
        for sign in [-1.0f32, 1.0] {
            let mut center = Vec3::ZERO;
            center[axis] = sign * (BOX_HALF_EXTENTS[axis] + half_thickness);

            let mut half_extents = BOX_HALF_EXTENTS + Vec3::splat(WALL_PAD);
            half_extents[axis] = half_thickness;

            physics.add_static_box(center, half_extents);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_scene(positions: &[Vec3]) -> Scene {
        Scene::with_point_positions(positions)
    }

    /// Two points well clear of the player, each other, and the walls.
    const APART: [Vec3; 2] = [Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.8, 0.5)];

    #[test]
    fn test_new_scene_layout() {
        let scene = Scene::new(50);
        assert_eq!(scene.point_count(), 50);
        assert_eq!(scene.player_position(), Vec3::ZERO);
        for p in scene.point_positions() {
            assert!(p.abs().max_element() <= SPAWN_HALF_EXTENT);
        }
    }

    #[test]
    fn test_force_drive_moves_player() {
        let mut scene = quiet_scene(&[]);
        scene.update(Drive::Force(Vec3::new(20.0, 0.0, 0.0)), 12, 0.2);

        let x = scene.player_position().x;
        assert!(x > 0.1, "player should accelerate along +x, got {}", x);
        // The +x wall face is at 1.5; the player cannot pass it.
        assert!(x < BOX_HALF_EXTENTS.x);
    }

    #[test]
    fn test_palm_drive_is_kinematic_and_follows() {
        let mut scene = quiet_scene(&[]);
        let target = Vec3::new(0.5, -1.0, 0.3);
        scene.update(
            Drive::Palm {
                position: target,
                grab: 0.5,
            },
            2,
            0.03,
        );

        assert!(scene.player_is_kinematic());
        assert!((scene.player_position() - target).length() < 1e-3);

        // Hand lost: back to force-driven dynamics.
        scene.update(Drive::Force(Vec3::ZERO), 1, 0.016);
        assert!(!scene.player_is_kinematic());
    }

    #[test]
    fn test_full_grab_attracts_points() {
        let mut scene = quiet_scene(&APART);
        let before: Vec<f32> = APART.iter().map(|p| p.length()).collect();

        scene.update(
            Drive::Palm {
                position: Vec3::ZERO,
                grab: 1.0,
            },
            30,
            0.5,
        );

        for (p, d) in scene.point_positions().zip(before) {
            assert!(
                p.length() < d - 0.005,
                "point should close on the player: {} -> {}",
                d,
                p.length()
            );
        }
    }

    #[test]
    fn test_open_hand_repels_points() {
        let mut scene = quiet_scene(&[Vec3::new(0.8, 0.0, 0.0)]);
        scene.update(
            Drive::Palm {
                position: Vec3::ZERO,
                grab: 0.0,
            },
            30,
            0.5,
        );

        let p = scene.point_positions().next().unwrap();
        assert!(p.x > 0.805, "point should be pushed along +x, got {}", p.x);
    }

    #[test]
    fn test_mid_grab_leaves_points_alone() {
        let mut scene = quiet_scene(&APART);
        scene.update(
            Drive::Palm {
                position: Vec3::new(0.0, -1.5, 0.0),
                grab: 0.5,
            },
            30,
            0.5,
        );

        for (p, &spawn) in scene.point_positions().zip(APART.iter()) {
            assert!((p - spawn).length() < 1e-3);
        }
    }

    #[test]
    fn test_points_stay_in_the_box() {
        let positions = [
            Vec3::new(0.9, 0.0, 0.0),
            Vec3::new(-0.9, 0.4, 0.0),
            Vec3::new(0.0, 0.9, 0.6),
            Vec3::new(0.0, -0.9, -0.6),
        ];
        let mut scene = quiet_scene(&positions);

        // A sustained open hand shoves every point toward the walls.
        for _ in 0..20 {
            scene.update(
                Drive::Palm {
                    position: Vec3::ZERO,
                    grab: 0.0,
                },
                5,
                0.08,
            );
        }

        let limit = BOX_HALF_EXTENTS + Vec3::splat(0.05);
        for p in scene.point_positions() {
            assert!(
                p.x.abs() <= limit.x && p.y.abs() <= limit.y && p.z.abs() <= limit.z,
                "point escaped the box: {:?}",
                p
            );
        }
    }

    #[test]
    fn test_player_color_cycles() {
        let mut scene = quiet_scene(&[]);
        let before = scene.player_color();
        scene.update(Drive::Force(Vec3::ZERO), 0, 1.0);
        let after = scene.player_color();
        assert!((after - before).length() > 0.1);
    }
}
