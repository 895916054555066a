//! Abstract spatial query interface for broad-phase collision detection
//!
//! The integrator only needs "which volumes are near this box"; this trait
//! keeps it independent of how the world indexes its volumes.

use crate::physics::collision::{ConvexVolume, VolumeId};
use super::AABB;

/// Broad-phase lookup of solid volumes
pub trait VolumeQuery {
    /// Iterator returned by [`VolumeQuery::query_region`]
    type Region<'a>: Iterator<Item = (VolumeId, &'a ConvexVolume)>
    where
        Self: 'a;

    /// Every volume whose bounds intersect `region`, each reported once
    fn query_region(&self, region: &AABB) -> Self::Region<'_>;

    /// Look up a volume by id
    fn volume(&self, id: VolumeId) -> Option<&ConvexVolume>;
}
