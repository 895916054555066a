//! Uniform grid spatial partitioning
//!
//! Divides space into cubic cells of a fixed size. Each cell holds the ids of
//! the volumes whose bounds overlap it, so a volume may appear in several
//! cells. Levels are small and bounded, so a flat grid is enough; cells are
//! keyed by integer coordinates and only occupied cells are stored.

use crate::foundation::math::Vec3;
use crate::physics::collision::VolumeId;
use super::AABB;
use std::collections::HashMap;

/// Edge length of a grid cell in world units
///
/// Entity boxes are at most 64 units across, so an entity box spans at most
/// two cells per axis.
pub const GRID_CELL_SIZE: f32 = 128.0;

/// Integer coordinates of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Cell index along X
    pub x: i32,
    /// Cell index along Y
    pub y: i32,
    /// Cell index along Z
    pub z: i32,
}

impl CellCoord {
    /// Create a cell coordinate
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    fn min(self, other: CellCoord) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    fn max(self, other: CellCoord) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Component by axis index
    pub fn get(self, axis: usize) -> i32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

/// Inclusive box of cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// Lowest cell on every axis
    pub min: CellCoord,
    /// Highest cell on every axis
    pub max: CellCoord,
}

impl CellRange {
    /// A range holding no cells
    pub const EMPTY: CellRange = CellRange {
        min: CellCoord::new(1, 1, 1),
        max: CellCoord::new(0, 0, 0),
    };

    /// Whether the range contains no cells
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Overlap of two ranges (possibly empty)
    pub fn intersection(&self, other: &CellRange) -> CellRange {
        CellRange {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Smallest range covering both
    pub fn union(&self, other: &CellRange) -> CellRange {
        CellRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Iterate the cells in X, then Y, then Z order
    pub fn iter(&self) -> CellIter {
        CellIter {
            range: *self,
            next: if self.is_empty() { None } else { Some(self.min) },
        }
    }
}

/// Iterator over the cells of a [`CellRange`]
#[derive(Debug, Clone)]
pub struct CellIter {
    range: CellRange,
    next: Option<CellCoord>,
}

impl Iterator for CellIter {
    type Item = CellCoord;

    fn next(&mut self) -> Option<CellCoord> {
        let current = self.next?;
        let mut following = current;
        following.x += 1;
        if following.x > self.range.max.x {
            following.x = self.range.min.x;
            following.y += 1;
            if following.y > self.range.max.y {
                following.y = self.range.min.y;
                following.z += 1;
            }
        }
        self.next = (following.z <= self.range.max.z).then_some(following);
        Some(current)
    }
}

/// Sparse uniform grid of volume ids
#[derive(Debug, Clone)]
pub struct UniformGrid {
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<VolumeId>>,
    /// Cells that have ever held a volume; queries are clipped to this
    occupied: Option<CellRange>,
}

impl UniformGrid {
    /// Create an empty grid with the given cell size
    pub fn new(cell_size: f32) -> Self {
        debug_assert!(cell_size > 0.0, "grid cell size must be positive");
        Self {
            cell_size,
            cells: HashMap::new(),
            occupied: None,
        }
    }

    /// Edge length of a cell
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.values().filter(|ids| !ids.is_empty()).count()
    }

    /// Cell containing a point
    pub fn cell_of(&self, point: &Vec3) -> CellCoord {
        let index = |v: f32| (v / self.cell_size).floor() as i32;
        CellCoord::new(index(point.x), index(point.y), index(point.z))
    }

    /// Every cell touched by `bounds`
    pub fn cell_range(&self, bounds: &AABB) -> CellRange {
        CellRange {
            min: self.cell_of(&bounds.min),
            max: self.cell_of(&bounds.max),
        }
    }

    /// Cells touched by `bounds` that can hold anything
    pub fn occupied_range(&self, bounds: &AABB) -> Option<CellRange> {
        let range = self.cell_range(bounds).intersection(&self.occupied?);
        (!range.is_empty()).then_some(range)
    }

    /// World-space box covered by a cell
    pub fn cell_bounds(&self, coord: CellCoord) -> AABB {
        let min = Vec3::new(coord.x as f32, coord.y as f32, coord.z as f32) * self.cell_size;
        AABB::new(min, min + Vec3::repeat(self.cell_size))
    }

    /// World-space box covering every cell that has held a volume
    pub fn occupied_bounds(&self) -> Option<AABB> {
        let occupied = self.occupied?;
        Some(self.cell_bounds(occupied.min).union(&self.cell_bounds(occupied.max)))
    }

    /// Ids stored in a cell
    pub fn cell(&self, coord: CellCoord) -> &[VolumeId] {
        self.cells.get(&coord).map_or(&[], Vec::as_slice)
    }

    /// Add `id` to every cell its bounds touch
    pub fn insert(&mut self, id: VolumeId, bounds: &AABB) {
        let range = self.cell_range(bounds);
        for coord in range.iter() {
            self.cells.entry(coord).or_default().push(id);
        }
        self.occupied = Some(match self.occupied {
            Some(occupied) => occupied.union(&range),
            None => range,
        });
    }

    /// Remove `id` from every cell its bounds touch
    ///
    /// `bounds` must be the bounds the id was inserted with.
    pub fn remove(&mut self, id: VolumeId, bounds: &AABB) {
        for coord in self.cell_range(bounds).iter() {
            if let Some(ids) = self.cells.get_mut(&coord) {
                ids.retain(|&other| other != id);
                if ids.is_empty() {
                    self.cells.remove(&coord);
                }
            }
        }
    }
}

impl Default for UniformGrid {
    fn default() -> Self {
        Self::new(GRID_CELL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_of_handles_negative_coordinates() {
        let grid = UniformGrid::new(128.0);
        assert_eq!(grid.cell_of(&Vec3::new(0.0, 0.0, 0.0)), CellCoord::new(0, 0, 0));
        assert_eq!(grid.cell_of(&Vec3::new(-0.5, 127.9, 128.0)), CellCoord::new(-1, 0, 1));
    }

    #[test]
    fn test_cell_range_iteration_order() {
        let range = CellRange {
            min: CellCoord::new(0, 0, 0),
            max: CellCoord::new(1, 1, 0),
        };
        let cells: Vec<_> = range.iter().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 0, 0),
                CellCoord::new(1, 0, 0),
                CellCoord::new(0, 1, 0),
                CellCoord::new(1, 1, 0),
            ]
        );

        let empty = CellRange {
            min: CellCoord::new(1, 0, 0),
            max: CellCoord::new(0, 0, 0),
        };
        assert_eq!(empty.iter().count(), 0);
    }

    #[test]
    fn test_insert_spans_multiple_cells() {
        let mut grid = UniformGrid::new(128.0);
        let bounds = AABB::new(Vec3::new(100.0, 0.0, 0.0), Vec3::new(300.0, 16.0, 16.0));
        grid.insert(VolumeId(7), &bounds);

        assert_eq!(grid.cell_count(), 3);
        assert_eq!(grid.cell(CellCoord::new(0, 0, 0)), &[VolumeId(7)]);
        assert_eq!(grid.cell(CellCoord::new(2, 0, 0)), &[VolumeId(7)]);
        assert!(grid.cell(CellCoord::new(3, 0, 0)).is_empty());
    }

    #[test]
    fn test_remove_clears_cells() {
        let mut grid = UniformGrid::new(128.0);
        let bounds = AABB::new(Vec3::zeros(), Vec3::new(200.0, 16.0, 16.0));
        grid.insert(VolumeId(0), &bounds);
        grid.insert(VolumeId(1), &bounds);
        grid.remove(VolumeId(0), &bounds);

        assert_eq!(grid.cell(CellCoord::new(1, 0, 0)), &[VolumeId(1)]);
        grid.remove(VolumeId(1), &bounds);
        assert_eq!(grid.cell_count(), 0);
    }

    #[test]
    fn test_occupied_range_clips_queries() {
        let mut grid = UniformGrid::new(128.0);
        grid.insert(VolumeId(0), &AABB::new(Vec3::zeros(), Vec3::repeat(16.0)));

        let huge = AABB::new(Vec3::repeat(-1.0e6), Vec3::repeat(1.0e6));
        let range = grid.occupied_range(&huge).unwrap();
        assert_eq!(range.iter().count(), 1);

        let far = AABB::new(Vec3::repeat(1000.0), Vec3::repeat(1100.0));
        assert!(grid.occupied_range(&far).is_none());
    }
}
