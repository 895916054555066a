//! Physics module for collision detection and response
//!
//! Bodies are axis-aligned boxes moved through a world of convex solid
//! volumes. The [`CollisionWorld`] indexes the volumes in a uniform grid,
//! the [`Integrator`] advances bodies one fixed tick at a time, and
//! [`CollisionWorld::raycast`] answers line-of-sight and impact queries.

pub mod collision;
pub mod collision_world;
pub mod integrator;
pub mod raycast;

#[cfg(test)]
mod tests;

pub use collision::{ConvexVolume, GroupTag, Plane, SurfaceKind, VolumeId};
pub use collision_world::{CollisionWorld, RegionQuery, WorldError};
pub use integrator::{
    BlockedAxes, Integrator, Kinematic, KinematicState, StepReport, MAX_STEP_DISTANCE,
    MAX_SUBSTEPS,
};
pub use raycast::RayHit;
