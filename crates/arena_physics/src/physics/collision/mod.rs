//! Collision geometry
//!
//! # Module Organization
//!
//! - [`primitives`] - Half-space planes and surface classification
//! - [`volume`] - Convex solid volumes and their narrow-phase tests
//!
//! # Key Types
//!
//! - [`ConvexVolume`] - A solid region bounded by planes
//! - [`VolumeId`] - Stable index of a volume in its world
//! - [`Plane`], [`SurfaceKind`] - Primitive geometric types

pub mod primitives;
pub mod volume;

pub use primitives::{Plane, SurfaceKind};
pub use volume::{
    ConvexVolume, GroupTag, SegmentHit, SweepHit, VolumeError, VolumeId, MIN_VOLUME_PLANES,
};
