//! Axis-aligned bounding boxes
//!
//! Used for volume bounds in the collision grid and for entity boxes in the
//! integrator.

use crate::foundation::math::{utils, Vec3};

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest AABB containing every point, or `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::new(*first, *first);
        for point in rest {
            bounds.min = utils::min_vec3(&bounds.min, point);
            bounds.max = utils::max_vec3(&bounds.max, point);
        }
        Some(bounds)
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Full size along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Copy of this box moved by `offset`
    pub fn translated(&self, offset: &Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Copy of this box grown by `amount` on every side
    pub fn expanded(&self, amount: f32) -> Self {
        let grow = Vec3::repeat(amount);
        Self {
            min: self.min - grow,
            max: self.max + grow,
        }
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &AABB) -> Self {
        Self {
            min: utils::min_vec3(&self.min, &other.min),
            max: utils::max_vec3(&self.max, &other.max),
        }
    }

    /// Check if this AABB intersects another AABB
    ///
    /// Touching boxes count as intersecting, which is what the grid needs to
    /// stay free of false negatives.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Clip the segment `start + t * delta`, `t` in `[0, 1]`, against this box
    /// using the slab method.
    ///
    /// Returns the parametric `(t_enter, t_exit)` range inside the box.
    pub fn clip_segment(&self, start: &Vec3, delta: &Vec3) -> Option<(f32, f32)> {
        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;

        for i in 0..3 {
            if delta[i] == 0.0 {
                if start[i] < self.min[i] || start[i] > self.max[i] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / delta[i];
            let mut t1 = (self.min[i] - start[i]) * inv;
            let mut t2 = (self.max[i] - start[i]) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_enter = t_enter.max(t1);
            t_exit = t_exit.min(t2);
            if t_enter > t_exit {
                return None;
            }
        }

        Some((t_enter, t_exit))
    }
}
