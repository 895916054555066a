//! Spatial partitioning data structures
//!
//! Provides the bounding boxes and the coarse uniform grid used to limit
//! collision queries to nearby volumes.

mod aabb;
pub mod grid;
pub mod spatial_query;

pub use aabb::AABB;
pub use grid::{CellCoord, CellIter, CellRange, UniformGrid, GRID_CELL_SIZE};
pub use spatial_query::VolumeQuery;
