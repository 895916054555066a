//! Physics integrator
//!
//! Advances one body by one tick: integrate velocity, split the displacement
//! into bounded substeps, then resolve each substep one axis at a time (X,
//! then Y, then Z) against the solid volumes of the world.
//!
//! Substeps never move a body further than [`MAX_STEP_DISTANCE`], which is
//! below the thinnest wall a level may contain. Each axis move is also swept
//! against the volumes it would cross, so even a large substep stops at the
//! first contact instead of skipping past it.

use crate::config::PhysicsConfig;
use crate::foundation::math::{Axis, Vec3};
use crate::physics::collision::{SurfaceKind, SweepHit};
use crate::spatial::{VolumeQuery, AABB};
use bitflags::bitflags;

/// Longest distance a body may move in one substep
pub const MAX_STEP_DISTANCE: f32 = 8.0;

/// Thinnest wall the level compiler emits
pub const MIN_WALL_THICKNESS: f32 = 16.0;

/// Upper bound on substeps per tick
///
/// Only reached above `MAX_SUBSTEPS * MAX_STEP_DISTANCE` units per tick.
/// Longer substeps are still swept, so they stop at the first contact.
pub const MAX_SUBSTEPS: u32 = 1024;

bitflags! {
    /// Axes along which movement was stopped by geometry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlockedAxes: u8 {
        /// Stopped along X
        const X = 1 << 0;
        /// Stopped along Y
        const Y = 1 << 1;
        /// Stopped along Z
        const Z = 1 << 2;
    }
}

impl Default for BlockedAxes {
    fn default() -> Self {
        Self::empty()
    }
}

impl BlockedAxes {
    /// Flag for a single axis
    pub const fn from_axis(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::X,
            Axis::Y => Self::Y,
            Axis::Z => Self::Z,
        }
    }
}

/// Movement state of one body
///
/// The body is an axis-aligned box centred on `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicState {
    /// Box center
    pub position: Vec3,
    /// Units per second
    pub velocity: Vec3,
    /// Self-propelled acceleration, excluding gravity
    pub acceleration: Vec3,
    /// Half the box size on each axis
    pub half_extents: Vec3,
    /// Multiplier on world gravity; 0 for flying bodies
    pub gravity_scale: f32,
    /// Whether the body ended its last tick standing on a floor
    pub on_ground: bool,
    /// Axes blocked during the last tick
    pub blocked: BlockedAxes,
}

impl KinematicState {
    /// Resting body at `position`
    pub fn new(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            half_extents,
            gravity_scale: 1.0,
            on_ground: false,
            blocked: BlockedAxes::empty(),
        }
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the gravity multiplier
    pub fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }

    /// Current world-space box
    pub fn bounds(&self) -> AABB {
        AABB::from_center_extents(self.position, self.half_extents)
    }
}

/// Anything the integrator can move
///
/// Players, enemies, projectiles and pickups differ in gameplay but share
/// this one movement model.
pub trait Kinematic {
    /// Read the movement state
    fn state(&self) -> &KinematicState;

    /// Mutate the movement state
    fn state_mut(&mut self) -> &mut KinematicState;
}

impl Kinematic for KinematicState {
    fn state(&self) -> &KinematicState {
        self
    }

    fn state_mut(&mut self) -> &mut KinematicState {
        self
    }
}

/// What happened to a body during one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepReport {
    /// Axes stopped by geometry
    pub blocked: BlockedAxes,
    /// Surface touched on each blocked axis, indexed by [`Axis::index`]
    pub surfaces: [Option<SurfaceKind>; 3],
    /// Number of substeps taken
    pub substeps: u32,
    /// Whether the body landed on or stayed on a floor
    pub on_ground: bool,
}

impl StepReport {
    /// Surface touched along `axis`, if that axis was blocked
    pub fn surface(&self, axis: Axis) -> Option<SurfaceKind> {
        self.surfaces[axis.index()]
    }

    /// Whether the body hit a wall on either horizontal axis
    pub fn hit_wall(&self) -> bool {
        [Axis::X, Axis::Z]
            .iter()
            .any(|&axis| self.surface(axis) == Some(SurfaceKind::Wall))
    }
}

/// Fixed-tick movement integrator
#[derive(Debug, Clone, Default)]
pub struct Integrator {
    config: PhysicsConfig,
}

impl Integrator {
    /// Create an integrator with the given tunables
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    /// Physics tunables in use
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Advance `body` by `dt` seconds through `world`
    ///
    /// Never fails. A body that starts inside a volume is not pushed out and
    /// is free to leave it.
    pub fn step<K, W>(&self, body: &mut K, world: &W, dt: f32) -> StepReport
    where
        K: Kinematic + ?Sized,
        W: VolumeQuery + ?Sized,
    {
        let state = body.state_mut();

        let gravity = self.config.gravity * state.gravity_scale;
        state.velocity += (state.acceleration + gravity) * dt;
        if state.on_ground {
            let damping = (1.0 - self.config.friction * dt).max(0.0);
            state.velocity.x *= damping;
            state.velocity.z *= damping;
        }

        let displacement = state.velocity * dt;
        let distance = displacement.norm();
        let substeps = if distance > 0.0 {
            (distance / MAX_STEP_DISTANCE).ceil().min(MAX_SUBSTEPS as f32) as u32
        } else {
            0
        };

        let mut report = StepReport {
            substeps,
            ..StepReport::default()
        };

        if substeps > 0 {
            let step = displacement / substeps as f32;
            for _ in 0..substeps {
                for axis in Axis::ALL {
                    if report.blocked.contains(BlockedAxes::from_axis(axis)) {
                        continue;
                    }
                    let delta = step[axis.index()];
                    if delta == 0.0 {
                        continue;
                    }

                    if let Some(hit) = move_along_axis(world, state, axis, delta) {
                        let surface = SurfaceKind::from_normal(&hit.normal);
                        state.velocity[axis.index()] = 0.0;
                        report.blocked |= BlockedAxes::from_axis(axis);
                        report.surfaces[axis.index()] = Some(surface);
                        log::trace!(
                            "Blocked on {:?} by {:?} at {:?}",
                            axis,
                            surface,
                            state.position
                        );
                    }
                }
            }
        }

        report.on_ground = report.surface(Axis::Y) == Some(SurfaceKind::Floor);
        state.on_ground = report.on_ground;
        state.blocked = report.blocked;
        report
    }

    /// Step every body in `bodies` by one tick
    pub fn step_all<K, W>(&self, bodies: &mut [K], world: &W, dt: f32) -> Vec<StepReport>
    where
        K: Kinematic,
        W: VolumeQuery + ?Sized,
    {
        bodies.iter_mut().map(|body| self.step(body, world, dt)).collect()
    }
}

/// Move the body by `delta` along `axis`, stopping at the first solid volume
fn move_along_axis<W>(
    world: &W,
    state: &mut KinematicState,
    axis: Axis,
    delta: f32,
) -> Option<SweepHit>
where
    W: VolumeQuery + ?Sized,
{
    let i = axis.index();
    let bounds = state.bounds();

    let mut swept = bounds;
    swept.min[i] += delta.min(0.0);
    swept.max[i] += delta.max(0.0);

    let mut allowed = delta.abs();
    let mut contact = None;
    for (_, volume) in world.query_region(&swept) {
        if !volume.is_solid() {
            continue;
        }
        if let Some(hit) = volume.sweep_box(&bounds, axis, delta) {
            if hit.travel < allowed {
                allowed = hit.travel;
                contact = Some(hit);
            }
        }
    }

    state.position[i] += allowed * delta.signum();
    contact
}
