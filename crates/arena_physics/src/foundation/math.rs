//! Math utilities and types
//!
//! Provides the vector types used by the decoders and the physics layer.
//! The world is Y-up: X and Z span the floor plan, Y is height.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// One of the three world axes.
///
/// The discriminant doubles as the component index into a [`Vec3`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis
    X = 0,
    /// Vertical axis (up is positive)
    Y = 1,
    /// Horizontal axis
    Z = 2,
}

impl Axis {
    /// All axes in resolution order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unit vector pointing along the positive direction of this axis
    pub fn unit(self) -> Vec3 {
        let mut v = Vec3::zeros();
        v[self.index()] = 1.0;
        v
    }

    /// Whether this axis lies in the horizontal (floor) plane
    pub const fn is_horizontal(self) -> bool {
        !matches!(self, Axis::Y)
    }
}

/// Math constants
pub mod constants {
    /// Tolerance used when comparing distances in world units.
    ///
    /// World geometry snaps to 16 unit blocks, so this is far below anything
    /// the level compiler can produce.
    pub const DISTANCE_EPSILON: f32 = 1.0e-3;
}

/// Math utility functions
pub mod utils {
    use super::Vec3;

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Component-wise linear interpolation between two vectors
    pub fn lerp_vec3(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
        a + (b - a) * t
    }

    /// Component-wise minimum
    pub fn min_vec3(a: &Vec3, b: &Vec3) -> Vec3 {
        a.zip_map(b, f32::min)
    }

    /// Component-wise maximum
    pub fn max_vec3(a: &Vec3, b: &Vec3) -> Vec3 {
        a.zip_map(b, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_unit_vectors() {
        assert_eq!(Axis::X.unit(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(Axis::Y.unit(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(Axis::Z.unit(), Vec3::new(0.0, 0.0, 1.0));
        assert!(Axis::X.is_horizontal());
        assert!(!Axis::Y.is_horizontal());
    }

    #[test]
    fn test_lerp_vec3_midpoint() {
        let a = Vec3::new(0.0, 2.0, -4.0);
        let b = Vec3::new(2.0, 4.0, 4.0);
        let mid = utils::lerp_vec3(&a, &b, 0.5);
        assert_relative_eq!(mid, Vec3::new(1.0, 3.0, 0.0));
        assert_relative_eq!(utils::lerp(1.0, 3.0, 0.25), 1.5);
    }

    #[test]
    fn test_component_min_max() {
        let a = Vec3::new(1.0, -5.0, 3.0);
        let b = Vec3::new(-1.0, 5.0, 3.0);
        assert_eq!(utils::min_vec3(&a, &b), Vec3::new(-1.0, -5.0, 3.0));
        assert_eq!(utils::max_vec3(&a, &b), Vec3::new(1.0, 5.0, 3.0));
    }
}
