//! Convex solid volumes
//!
//! A volume is the intersection of a set of half-space planes, as produced by
//! the level compiler. Volumes are immutable once built except for the
//! translation offset of animated blockers (doors).
//!
//! Two narrow-phase tests live here:
//!
//! - [`ConvexVolume::sweep_box`] moves an axis-aligned box along one axis and
//!   reports the first contact, used by the integrator.
//! - [`ConvexVolume::clip_segment`] clips a line segment against the planes,
//!   used by ray queries.
//!
//! Both clip an entry/exit interval against each plane in turn and keep the
//! latest entry and earliest exit.

use crate::foundation::math::{constants::DISTANCE_EPSILON, Axis, Vec3};
use crate::spatial::AABB;
use super::primitives::Plane;
use thiserror::Error;

/// Minimum number of planes that can enclose a region
pub const MIN_VOLUME_PLANES: usize = 4;

/// Rates below this are treated as moving parallel to a plane
const PARALLEL_EPSILON: f32 = 1.0e-6;

/// Stable index of a volume inside its collision world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeId(pub u32);

impl VolumeId {
    /// Index into the world's volume list
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Gameplay group a volume belongs to
///
/// Grouped volumes are animated blockers: gameplay may move them and toggle
/// their solidity. Ungrouped volumes are static level geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupTag(pub u8);

impl GroupTag {
    /// Doors, opened and closed by gameplay
    pub const DOOR: GroupTag = GroupTag(1);

    /// Decode the on-disk group byte, where zero means "no group"
    pub const fn from_byte(byte: u8) -> Option<Self> {
        if byte == 0 {
            None
        } else {
            Some(GroupTag(byte))
        }
    }
}

/// Reasons a plane set cannot form a volume
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VolumeError {
    /// Fewer planes than can close a region
    #[error("volume has {0} planes, at least 4 are required")]
    TooFewPlanes(usize),
    /// A plane with a zero-length normal
    #[error("plane {0} has a zero-length normal")]
    DegenerateNormal(usize),
    /// The planes do not enclose a finite region of non-zero size
    #[error("planes do not bound a closed, non-degenerate region")]
    Unbounded,
}

/// First contact found by [`ConvexVolume::sweep_box`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Distance the box may travel before touching the volume
    pub travel: f32,
    /// Outward normal of the plane that was touched
    pub normal: Vec3,
}

/// Entry point found by [`ConvexVolume::clip_segment`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Fraction of the segment travelled before entering the volume
    pub fraction: f32,
    /// Outward normal of the entry plane
    pub normal: Vec3,
}

/// A solid collision primitive: the intersection of half-spaces
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexVolume {
    /// Planes at zero offset
    planes: Vec<Plane>,
    /// Bounds at zero offset
    base_bounds: AABB,
    /// Texture table index, informational only
    texture: u8,
    /// Gameplay group, `None` for static geometry
    group: Option<GroupTag>,
    /// Current translation of an animated blocker
    offset: Vec3,
    /// Whether the volume currently blocks movement and rays
    solid: bool,
}

impl ConvexVolume {
    /// Build a volume from its bounding planes
    ///
    /// Rejects plane sets that cannot enclose a closed region of non-zero
    /// size. Bounds are computed from the region's corner vertices.
    pub fn new(
        planes: Vec<Plane>,
        texture: u8,
        group: Option<GroupTag>,
    ) -> Result<Self, VolumeError> {
        if planes.len() < MIN_VOLUME_PLANES {
            return Err(VolumeError::TooFewPlanes(planes.len()));
        }
        if let Some(index) = planes.iter().position(|p| p.normal.norm_squared() <= f32::EPSILON) {
            return Err(VolumeError::DegenerateNormal(index));
        }
        if has_recession_direction(&planes) {
            return Err(VolumeError::Unbounded);
        }

        let vertices = corner_vertices(&planes);
        let base_bounds = AABB::from_points(&vertices).ok_or(VolumeError::Unbounded)?;
        let size = base_bounds.size();
        if size.x <= DISTANCE_EPSILON || size.y <= DISTANCE_EPSILON || size.z <= DISTANCE_EPSILON {
            return Err(VolumeError::Unbounded);
        }

        Ok(Self {
            planes,
            base_bounds,
            texture,
            group,
            offset: Vec3::zeros(),
            solid: true,
        })
    }

    /// Axis-aligned box volume, mostly useful for tests and tooling
    pub fn from_aabb(
        bounds: AABB,
        texture: u8,
        group: Option<GroupTag>,
    ) -> Result<Self, VolumeError> {
        Self::new(Plane::box_planes(&bounds).to_vec(), texture, group)
    }

    /// Number of bounding planes
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    /// World-space planes, including the current offset
    pub fn planes(&self) -> impl Iterator<Item = Plane> + '_ {
        let offset = self.offset;
        self.planes.iter().map(move |plane| plane.translated(&offset))
    }

    /// World-space bounds, including the current offset
    pub fn bounds(&self) -> AABB {
        self.base_bounds.translated(&self.offset)
    }

    /// Texture table index
    pub fn texture(&self) -> u8 {
        self.texture
    }

    /// Gameplay group, if any
    pub fn group(&self) -> Option<GroupTag> {
        self.group
    }

    /// Whether this volume may be repositioned and toggled by gameplay
    pub fn is_animated(&self) -> bool {
        self.group.is_some()
    }

    /// Current translation offset
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Whether the volume blocks movement and rays
    pub fn is_solid(&self) -> bool {
        self.solid
    }

    pub(crate) fn set_offset(&mut self, offset: Vec3) {
        self.offset = offset;
    }

    pub(crate) fn set_solid(&mut self, solid: bool) {
        self.solid = solid;
    }

    /// Whether the point lies strictly inside the volume
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.planes().all(|plane| plane.distance_to_point(point) < -DISTANCE_EPSILON)
    }

    /// Whether the box penetrates the volume by more than the contact tolerance
    ///
    /// Conservative: only face normals and the world axes are tried as
    /// separating axes.
    pub fn overlaps_box(&self, aabb: &AABB) -> bool {
        self.separating_planes()
            .all(|plane| plane.box_gap(aabb) < -DISTANCE_EPSILON)
    }

    /// Sweep `aabb` along `axis` by the signed distance `delta`
    ///
    /// Returns the first contact if the box would penetrate the volume during
    /// the move. Boxes that already start inside the volume are not blocked,
    /// so they can leave it.
    pub fn sweep_box(&self, aabb: &AABB, axis: Axis, delta: f32) -> Option<SweepHit> {
        let travel = delta.abs();
        if travel <= 0.0 {
            return None;
        }
        let direction = delta.signum();

        let mut enter = f32::NEG_INFINITY;
        let mut enter_normal = None;
        let mut exit = f32::INFINITY;

        for plane in self.separating_planes() {
            let gap = plane.box_gap(aabb);
            let rate = plane.normal[axis.index()] * direction;

            if rate.abs() < PARALLEL_EPSILON {
                if gap >= -DISTANCE_EPSILON {
                    // Sliding along or away from this plane, never enters.
                    return None;
                }
                continue;
            }

            let t = -gap / rate;
            if rate < 0.0 {
                if t > enter {
                    enter = t;
                    enter_normal = Some(plane.normal);
                }
            } else if t < exit {
                exit = t;
            }
        }

        let normal = enter_normal?;
        if enter >= exit || enter >= travel || exit <= 0.0 || enter < -DISTANCE_EPSILON {
            return None;
        }

        Some(SweepHit {
            travel: enter.max(0.0),
            normal,
        })
    }

    /// Clip the segment `start -> end` against the volume
    ///
    /// Returns the entry fraction and entry plane normal. A segment starting
    /// on a face and heading inward enters at fraction 0. Segments starting
    /// strictly inside the volume report nothing, matching
    /// [`ConvexVolume::contains_point`].
    pub fn clip_segment(&self, start: &Vec3, end: &Vec3) -> Option<SegmentHit> {
        let mut enter = -1.0_f32;
        let mut enter_normal = None;
        let mut exit = 1.0_f32;

        for plane in self.planes() {
            let d1 = plane.distance_to_point(start);
            let d2 = plane.distance_to_point(end);

            if d1 >= -DISTANCE_EPSILON {
                // Outside or on this face: only an inward segment can enter.
                if d2 >= d1 {
                    return None;
                }
                let f = (d1 / (d1 - d2)).max(0.0);
                if f > enter {
                    enter = f;
                    enter_normal = Some(plane.normal);
                }
            } else if d2 > 0.0 {
                let f = d1 / (d1 - d2);
                if f < exit {
                    exit = f;
                }
            }
        }

        let normal = enter_normal?;
        if enter < exit && (0.0..=1.0).contains(&enter) {
            Some(SegmentHit { fraction: enter, normal })
        } else {
            None
        }
    }

    /// Face planes followed by the bounds planes
    ///
    /// The bounds planes add the world axes as candidate separating axes.
    fn separating_planes(&self) -> impl Iterator<Item = Plane> + '_ {
        self.planes().chain(Plane::box_planes(&self.bounds()))
    }
}

/// Whether the region `{p : n_i · p <= d_i}` extends to infinity
///
/// A pointed polyhedral cone's extreme rays lie on the intersection of two
/// constraint planes, so only directions `±(n_i × n_j)` need checking.
fn has_recession_direction(planes: &[Plane]) -> bool {
    for (i, a) in planes.iter().enumerate() {
        for b in &planes[i + 1..] {
            let edge = a.normal.cross(&b.normal);
            if edge.norm_squared() < PARALLEL_EPSILON {
                continue;
            }
            for direction in [edge, -edge] {
                if planes.iter().all(|p| p.normal.dot(&direction) <= PARALLEL_EPSILON) {
                    return true;
                }
            }
        }
    }
    false
}

/// Corner vertices of the region: intersections of plane triples lying inside
/// every plane
fn corner_vertices(planes: &[Plane]) -> Vec<Vec3> {
    let mut vertices = Vec::new();
    for i in 0..planes.len() {
        for j in i + 1..planes.len() {
            for k in j + 1..planes.len() {
                let (a, b, c) = (&planes[i], &planes[j], &planes[k]);
                let bc = b.normal.cross(&c.normal);
                let det = a.normal.dot(&bc);
                if det.abs() < PARALLEL_EPSILON {
                    continue;
                }
                let point = (bc * a.distance
                    + c.normal.cross(&a.normal) * b.distance
                    + a.normal.cross(&b.normal) * c.distance)
                    / det;
                if planes.iter().all(|p| p.distance_to_point(&point) <= DISTANCE_EPSILON) {
                    vertices.push(point);
                }
            }
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall() -> ConvexVolume {
        ConvexVolume::from_aabb(
            AABB::new(Vec3::new(500.0, -64.0, -64.0), Vec3::new(516.0, 64.0, 64.0)),
            0,
            None,
        )
        .unwrap()
    }

    fn wedge() -> ConvexVolume {
        // Ramp rising towards +X: floor, back wall, two sides and a 45° slope.
        let planes = vec![
            Plane::new(Vec3::new(0.0, -1.0, 0.0), 0.0).unwrap(),
            Plane::new(Vec3::new(1.0, 0.0, 0.0), 64.0).unwrap(),
            Plane::new(Vec3::new(0.0, 0.0, 1.0), 32.0).unwrap(),
            Plane::new(Vec3::new(0.0, 0.0, -1.0), 32.0).unwrap(),
            Plane::new(Vec3::new(-1.0, 1.0, 0.0), 0.0).unwrap(),
        ];
        ConvexVolume::new(planes, 3, None).unwrap()
    }

    #[test]
    fn test_box_volume_bounds() {
        let volume = wall();
        assert_eq!(volume.plane_count(), 6);
        assert_relative_eq!(volume.bounds().min, Vec3::new(500.0, -64.0, -64.0), epsilon = 1e-3);
        assert_relative_eq!(volume.bounds().max, Vec3::new(516.0, 64.0, 64.0), epsilon = 1e-3);
    }

    #[test]
    fn test_wedge_bounds_from_vertices() {
        let volume = wedge();
        let bounds = volume.bounds();
        assert_relative_eq!(bounds.min, Vec3::new(0.0, 0.0, -32.0), epsilon = 1e-3);
        assert_relative_eq!(bounds.max, Vec3::new(64.0, 64.0, 32.0), epsilon = 1e-3);
        assert_eq!(volume.texture(), 3);
    }

    #[test]
    fn test_rejects_too_few_planes() {
        let planes = vec![
            Plane::new(Vec3::new(1.0, 0.0, 0.0), 1.0).unwrap(),
            Plane::new(Vec3::new(-1.0, 0.0, 0.0), 1.0).unwrap(),
            Plane::new(Vec3::new(0.0, 1.0, 0.0), 1.0).unwrap(),
        ];
        assert_eq!(ConvexVolume::new(planes, 0, None), Err(VolumeError::TooFewPlanes(3)));
    }

    #[test]
    fn test_rejects_open_region() {
        // Four planes that leave the region open towards -Y.
        let planes = vec![
            Plane::new(Vec3::new(1.0, 0.0, 0.0), 1.0).unwrap(),
            Plane::new(Vec3::new(-1.0, 0.0, 0.0), 1.0).unwrap(),
            Plane::new(Vec3::new(0.0, 0.0, 1.0), 1.0).unwrap(),
            Plane::new(Vec3::new(0.0, 0.0, -1.0), 1.0).unwrap(),
        ];
        assert_eq!(ConvexVolume::new(planes, 0, None), Err(VolumeError::Unbounded));
    }

    #[test]
    fn test_rejects_empty_region() {
        // x < -1 and x > 1 at the same time.
        let unit = AABB::new(Vec3::repeat(-1.0), Vec3::repeat(1.0));
        let mut planes = Plane::box_planes(&unit).to_vec();
        planes[0] = Plane::new(Vec3::new(1.0, 0.0, 0.0), -1.0).unwrap();
        planes[1] = Plane::new(Vec3::new(-1.0, 0.0, 0.0), -1.0).unwrap();
        assert_eq!(ConvexVolume::new(planes, 0, None), Err(VolumeError::Unbounded));
    }

    #[test]
    fn test_sweep_box_into_wall() {
        let volume = wall();
        let entity = AABB::from_center_extents(Vec3::new(480.0, 0.0, 0.0), Vec3::repeat(8.0));
        let hit = volume.sweep_box(&entity, Axis::X, 20.0).unwrap();
        assert_relative_eq!(hit.travel, 12.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));

        // Short of the wall, or moving away from it.
        assert!(volume.sweep_box(&entity, Axis::X, 10.0).is_none());
        assert!(volume.sweep_box(&entity, Axis::X, -20.0).is_none());
    }

    #[test]
    fn test_sweep_box_slides_along_touching_face() {
        let volume = wall();
        let touching = AABB::new(Vec3::new(484.0, -8.0, -8.0), Vec3::new(500.0, 8.0, 8.0));
        assert!(volume.sweep_box(&touching, Axis::Z, 30.0).is_none());
        assert!(volume.sweep_box(&touching, Axis::Y, -30.0).is_none());

        let hit = volume.sweep_box(&touching, Axis::X, 4.0).unwrap();
        assert_relative_eq!(hit.travel, 0.0);
    }

    #[test]
    fn test_sweep_box_starting_inside_is_not_blocked() {
        let volume = wall();
        let inside = AABB::from_center_extents(Vec3::new(508.0, 0.0, 0.0), Vec3::repeat(4.0));
        assert!(volume.overlaps_box(&inside));
        assert!(volume.sweep_box(&inside, Axis::X, 10.0).is_none());
    }

    #[test]
    fn test_sweep_box_onto_slope() {
        let volume = wedge();
        // Point-sized box above x = 32, where the slope surface is at y = 32.
        let entity = AABB::from_center_extents(Vec3::new(32.0, 48.0, 0.0), Vec3::zeros());
        let hit = volume.sweep_box(&entity, Axis::Y, -40.0).unwrap();
        assert_relative_eq!(hit.travel, 16.0, epsilon = 1e-3);
        assert!(hit.normal.y > 0.7);
    }

    #[test]
    fn test_clip_segment_reports_entry_face() {
        let volume = wall();
        let hit = volume
            .clip_segment(&Vec3::zeros(), &Vec3::new(1000.0, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(hit.fraction, 0.5, epsilon = 1e-5);
        assert_relative_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));

        let from_inside =
            volume.clip_segment(&Vec3::new(508.0, 0.0, 0.0), &Vec3::new(1000.0, 0.0, 0.0));
        assert!(from_inside.is_none());

        let short = volume.clip_segment(&Vec3::zeros(), &Vec3::new(400.0, 0.0, 0.0));
        assert!(short.is_none());
    }

    #[test]
    fn test_clip_segment_from_face() {
        let volume = wall();
        let inward = volume
            .clip_segment(&Vec3::new(500.0, 0.0, 0.0), &Vec3::new(1000.0, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(inward.fraction, 0.0);
        assert_relative_eq!(inward.normal, Vec3::new(-1.0, 0.0, 0.0));

        // Leaving the face, or sliding along it, never enters.
        let outward = volume.clip_segment(&Vec3::new(500.0, 0.0, 0.0), &Vec3::new(0.0, 0.0, 0.0));
        assert!(outward.is_none());
        let along = volume.clip_segment(&Vec3::new(500.0, 0.0, 0.0), &Vec3::new(500.0, 0.0, 40.0));
        assert!(along.is_none());
    }

    #[test]
    fn test_offset_moves_planes_and_bounds() {
        let mut volume = ConvexVolume::from_aabb(
            AABB::new(Vec3::zeros(), Vec3::new(16.0, 64.0, 64.0)),
            0,
            Some(GroupTag::DOOR),
        )
        .unwrap();
        assert!(volume.is_animated());
        volume.set_offset(Vec3::new(0.0, 64.0, 0.0));
        assert_relative_eq!(volume.bounds().min.y, 64.0, epsilon = 1e-3);
        assert!(volume.contains_point(&Vec3::new(8.0, 96.0, 32.0)));
        assert!(!volume.contains_point(&Vec3::new(8.0, 32.0, 32.0)));
    }
}
