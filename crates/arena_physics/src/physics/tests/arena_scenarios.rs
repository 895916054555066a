//! Scenario tests for bodies moving through an arena over many ticks

use crate::config::PhysicsConfig;
use crate::foundation::math::{Axis, Vec3};
use crate::physics::collision::{ConvexVolume, GroupTag, Plane, SurfaceKind, VolumeId};
use crate::physics::{BlockedAxes, CollisionWorld, Integrator, Kinematic, KinematicState};
use crate::spatial::AABB;
use approx::assert_relative_eq;

const DT: f32 = 1.0 / 60.0;

/// A gameplay entity that embeds its movement state
#[derive(Debug, Clone, PartialEq)]
struct Grunt {
    state: KinematicState,
    health: i32,
}

impl Kinematic for Grunt {
    fn state(&self) -> &KinematicState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut KinematicState {
        &mut self.state
    }
}

fn block(min: [f32; 3], max: [f32; 3]) -> ConvexVolume {
    ConvexVolume::from_aabb(AABB::new(Vec3::from(min), Vec3::from(max)), 0, None).unwrap()
}

/// Floor, two side walls and a door across the corridor at x = 256
fn corridor_with_door() -> CollisionWorld {
    CollisionWorld::build(vec![
        block([-256.0, -16.0, -64.0], [1024.0, 0.0, 64.0]),
        block([-256.0, 0.0, 48.0], [1024.0, 128.0, 64.0]),
        block([-256.0, 0.0, -64.0], [1024.0, 128.0, -48.0]),
        ConvexVolume::from_aabb(
            AABB::new(Vec3::new(256.0, 0.0, -48.0), Vec3::new(272.0, 128.0, 48.0)),
            1,
            Some(GroupTag::DOOR),
        )
        .unwrap(),
    ])
}

/// Ramp rising along +X: `0 < y < x / 2` for `x` in `[0, 256]`
fn ramp() -> ConvexVolume {
    let planes = vec![
        Plane::new(Vec3::new(-0.5, 1.0, 0.0), 0.0).unwrap(),
        Plane::new(Vec3::new(0.0, -1.0, 0.0), 0.0).unwrap(),
        Plane::new(Vec3::new(1.0, 0.0, 0.0), 256.0).unwrap(),
        Plane::new(Vec3::new(0.0, 0.0, 1.0), 128.0).unwrap(),
        Plane::new(Vec3::new(0.0, 0.0, -1.0), 128.0).unwrap(),
    ];
    ConvexVolume::new(planes, 0, None).unwrap()
}

fn grunt_at(position: Vec3) -> Grunt {
    Grunt {
        state: KinematicState::new(position, Vec3::new(12.0, 24.0, 12.0)),
        health: 100,
    }
}

#[test]
fn test_grunt_falls_and_settles_on_floor() {
    let world = corridor_with_door();
    let integrator = Integrator::default();
    let mut grunt = grunt_at(Vec3::new(0.0, 200.0, 0.0));

    for _ in 0..120 {
        integrator.step(&mut grunt, &world, DT);
    }

    assert!(grunt.state().on_ground);
    assert_relative_eq!(grunt.state().position.y, 24.0, epsilon = 1.0e-2);
    assert_eq!(grunt.health, 100);
}

#[test]
fn test_closed_door_blocks_until_raised() {
    let mut world = corridor_with_door();
    let integrator = Integrator::new(PhysicsConfig::default().with_friction(0.0));
    let mut grunt = grunt_at(Vec3::new(200.0, 24.0, 0.0));

    let mut hit_door = false;
    for _ in 0..30 {
        grunt.state_mut().velocity.x = 300.0;
        let report = integrator.step(&mut grunt, &world, DT);
        hit_door |= report.surface(Axis::X) == Some(SurfaceKind::Wall);
    }
    assert!(hit_door);
    assert_relative_eq!(grunt.state().position.x, 244.0, epsilon = 1.0e-2);

    let door = world.volumes_in_group(GroupTag::DOOR).next().unwrap();
    world.reposition(door, Vec3::new(0.0, 128.0, 0.0)).unwrap();

    for _ in 0..30 {
        grunt.state_mut().velocity.x = 300.0;
        integrator.step(&mut grunt, &world, DT);
    }
    assert!(grunt.state().position.x > 300.0);
}

#[test]
fn test_side_walls_keep_body_in_corridor() {
    let world = corridor_with_door();
    let integrator = Integrator::default();
    let mut grunt = grunt_at(Vec3::new(0.0, 24.0, 0.0));
    grunt.state_mut().velocity = Vec3::new(-100.0, 0.0, 3000.0);

    let report = integrator.step(&mut grunt, &world, DT);
    let state = grunt.state();

    assert!(report.blocked.contains(BlockedAxes::Z));
    assert!(!report.blocked.contains(BlockedAxes::X));
    assert!(state.bounds().max.z <= 48.0 + 1.0e-3);
    assert!(state.position.x < 0.0);
}

#[test]
fn test_point_lands_on_ramp() {
    let world = CollisionWorld::build(vec![ramp()]);
    let integrator = Integrator::default();
    let mut body = KinematicState::new(Vec3::new(200.0, 150.0, 0.0), Vec3::zeros())
        .with_velocity(Vec3::new(0.0, -500.0, 0.0));

    let mut landed = None;
    for _ in 0..60 {
        let report = integrator.step(&mut body, &world, DT);
        if report.on_ground {
            landed = Some(report);
            break;
        }
    }

    let report = landed.unwrap();
    assert_eq!(report.surface(Axis::Y), Some(SurfaceKind::Floor));
    assert_relative_eq!(body.position.y, 100.0, epsilon = 1.0e-2);
}

#[test]
fn test_identical_inputs_give_identical_results() {
    let world = corridor_with_door();
    let integrator = Integrator::default();
    let mut bodies = vec![
        grunt_at(Vec3::new(0.0, 90.0, 0.0)),
        grunt_at(Vec3::new(-100.0, 30.0, 10.0)),
    ];
    bodies[0].state_mut().velocity = Vec3::new(450.0, 120.0, 333.0);
    bodies[1].state_mut().velocity = Vec3::new(-20.0, 0.0, -700.0);
    let mut replay = bodies.clone();

    for _ in 0..90 {
        let first = integrator.step_all(&mut bodies, &world, DT);
        let second = integrator.step_all(&mut replay, &world, DT);
        assert_eq!(first, second);
    }
    assert_eq!(bodies, replay);
}

#[test]
fn test_projectile_resting_on_door_still_sees_it() {
    let mut world = corridor_with_door();
    let integrator = Integrator::default();
    let mut bolt = KinematicState::new(Vec3::new(0.0, 64.0, 0.0), Vec3::zeros())
        .with_velocity(Vec3::new(2000.0, 0.0, 0.0))
        .with_gravity_scale(0.0);

    for _ in 0..20 {
        integrator.step(&mut bolt, &world, DT);
    }
    assert_relative_eq!(bolt.position.x, 256.0, epsilon = 1.0e-3);

    let ahead = bolt.position + Vec3::new(400.0, 0.0, 0.0);
    let hit = world.raycast(&bolt.position, &ahead).unwrap();
    assert_eq!(hit.volume, VolumeId(3));
    assert!(!world.line_of_sight(&bolt.position, &ahead));

    world.set_solid(VolumeId(3), false).unwrap();
    assert!(world.line_of_sight(&bolt.position, &ahead));
}

#[test]
fn test_repositioned_volume_is_found_at_new_location() {
    let mut world = corridor_with_door();
    let door = VolumeId(3);
    world.reposition(door, Vec3::new(0.0, 0.0, 512.0)).unwrap();

    let old_spot = Vec3::new(264.0, 64.0, 0.0);
    assert!(world.volumes_at_point(&old_spot).all(|(id, _)| id != door));
    assert!(world
        .volumes_at_point(&Vec3::new(264.0, 64.0, 512.0))
        .any(|(id, _)| id == door));
}
