//! Primitive collision types
//!
//! Half-space planes and the surface classification derived from them.

use crate::foundation::math::Vec3;
use crate::spatial::AABB;

/// Normal Y component above which a surface counts as walkable floor
pub const FLOOR_NORMAL_Y: f32 = 0.7;

/// Half-space plane defined by an outward normal and a distance from origin
///
/// A point `p` lies inside the half-space when `normal · p < distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Outward unit normal
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane, normalizing `normal` and rescaling `distance` to match
    ///
    /// Returns `None` for a zero-length normal.
    pub fn new(normal: Vec3, distance: f32) -> Option<Self> {
        let length = normal.norm();
        if length <= f32::EPSILON {
            return None;
        }
        Some(Self {
            normal: normal / length,
            distance: distance / length,
        })
    }

    /// Signed distance from the plane to a point (positive in front)
    pub fn distance_to_point(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }

    /// Same plane moved by `offset`
    pub fn translated(&self, offset: &Vec3) -> Self {
        Self {
            normal: self.normal,
            distance: self.distance + self.normal.dot(offset),
        }
    }

    /// Smallest signed distance of any box corner to the plane
    ///
    /// Positive means the whole box lies in front of the plane.
    pub fn box_gap(&self, aabb: &AABB) -> f32 {
        let mut support = 0.0;
        for i in 0..3 {
            let n = self.normal[i];
            support += n * if n >= 0.0 { aabb.min[i] } else { aabb.max[i] };
        }
        support - self.distance
    }

    /// The six planes bounding an AABB, in `+X, -X, +Y, -Y, +Z, -Z` order
    pub fn box_planes(aabb: &AABB) -> [Plane; 6] {
        let plane = |normal: Vec3, distance: f32| Plane { normal, distance };
        [
            plane(Vec3::new(1.0, 0.0, 0.0), aabb.max.x),
            plane(Vec3::new(-1.0, 0.0, 0.0), -aabb.min.x),
            plane(Vec3::new(0.0, 1.0, 0.0), aabb.max.y),
            plane(Vec3::new(0.0, -1.0, 0.0), -aabb.min.y),
            plane(Vec3::new(0.0, 0.0, 1.0), aabb.max.z),
            plane(Vec3::new(0.0, 0.0, -1.0), -aabb.min.z),
        ]
    }
}

/// Kind of surface an entity came to rest against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Upward facing surface the entity can stand on
    Floor,
    /// Steep or vertical surface
    Wall,
    /// Downward facing surface above the entity
    Ceiling,
}

impl SurfaceKind {
    /// Classify a surface by the outward normal of the plane that was hit
    pub fn from_normal(normal: &Vec3) -> Self {
        if normal.y > FLOOR_NORMAL_Y {
            SurfaceKind::Floor
        } else if normal.y < -FLOOR_NORMAL_Y {
            SurfaceKind::Ceiling
        } else {
            SurfaceKind::Wall
        }
    }
}
