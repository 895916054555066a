//! Collision world
//!
//! Owns the level's convex volumes and the uniform grid over them. Built once
//! after the level is decoded; afterwards the only mutation is moving or
//! toggling animated blockers, which must happen between ticks. Both need
//! `&mut self`, so no region query can be in flight at the same time.

use crate::foundation::math::Vec3;
use crate::physics::collision::{ConvexVolume, GroupTag, VolumeId};
use crate::spatial::{
    CellCoord, CellIter, CellRange, UniformGrid, VolumeQuery, AABB, GRID_CELL_SIZE,
};
use thiserror::Error;

/// Errors from mutating the collision world
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// No volume with this id
    #[error("unknown volume {0:?}")]
    UnknownVolume(VolumeId),
    /// The volume is static geometry and cannot be moved or toggled
    #[error("volume {0:?} is not an animated blocker")]
    NotAnimated(VolumeId),
}

/// Convex volumes plus the grid indexing them
#[derive(Debug, Clone)]
pub struct CollisionWorld {
    volumes: Vec<ConvexVolume>,
    grid: UniformGrid,
}

impl CollisionWorld {
    /// Build a world over `volumes` using the default cell size
    pub fn build(volumes: Vec<ConvexVolume>) -> Self {
        Self::with_cell_size(volumes, GRID_CELL_SIZE)
    }

    /// Build a world with a custom cell size
    pub fn with_cell_size(volumes: Vec<ConvexVolume>, cell_size: f32) -> Self {
        let mut grid = UniformGrid::new(cell_size);
        for (index, volume) in volumes.iter().enumerate() {
            grid.insert(VolumeId(index as u32), &volume.bounds());
        }

        log::debug!(
            "Built collision world: {} volumes in {} cells (cell size {})",
            volumes.len(),
            grid.cell_count(),
            cell_size
        );

        Self { volumes, grid }
    }

    /// Number of volumes
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// Whether the world has no volumes
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// The grid indexing the volumes
    pub fn grid(&self) -> &UniformGrid {
        &self.grid
    }

    /// Look up a volume by id
    pub fn volume(&self, id: VolumeId) -> Option<&ConvexVolume> {
        self.volumes.get(id.index())
    }

    /// All volumes with their ids
    pub fn volumes(&self) -> impl Iterator<Item = (VolumeId, &ConvexVolume)> {
        self.volumes
            .iter()
            .enumerate()
            .map(|(index, volume)| (VolumeId(index as u32), volume))
    }

    /// Ids of the volumes tagged with `group`
    pub fn volumes_in_group(&self, group: GroupTag) -> impl Iterator<Item = VolumeId> + '_ {
        self.volumes()
            .filter(move |(_, volume)| volume.group() == Some(group))
            .map(|(id, _)| id)
    }

    /// Every volume whose bounds intersect `region`, each reported once
    ///
    /// Lazily walks the grid cells under `region`. Bounds that merely touch the
    /// region are reported, so there are no false negatives; the only false
    /// positives come from comparing bounds rather than exact shapes.
    pub fn query_region(&self, region: &AABB) -> RegionQuery<'_> {
        let cells = match self.grid.occupied_range(region) {
            Some(range) => range.iter(),
            None => CellRange::EMPTY.iter(),
        };

        RegionQuery {
            world: self,
            region: *region,
            query_cells: self.grid.cell_range(region),
            cells,
            bucket: [].iter(),
            cell: None,
        }
    }

    /// Solid or non-solid volumes that contain `point`
    pub fn volumes_at_point(
        &self,
        point: &Vec3,
    ) -> impl Iterator<Item = (VolumeId, &ConvexVolume)> {
        let point = *point;
        self.query_region(&AABB::new(point, point))
            .filter(move |(_, volume)| volume.contains_point(&point))
    }

    /// Move an animated blocker to `new_offset` from its decoded position
    ///
    /// Removes the volume from the cells it covered and reinserts it under its
    /// new bounds.
    pub fn reposition(&mut self, id: VolumeId, new_offset: Vec3) -> Result<(), WorldError> {
        let volume = self.volumes.get_mut(id.index()).ok_or(WorldError::UnknownVolume(id))?;
        if !volume.is_animated() {
            return Err(WorldError::NotAnimated(id));
        }

        let old_bounds = volume.bounds();
        volume.set_offset(new_offset);
        let new_bounds = volume.bounds();

        self.grid.remove(id, &old_bounds);
        self.grid.insert(id, &new_bounds);

        log::trace!("Repositioned {:?} to offset {:?}", id, new_offset);
        Ok(())
    }

    /// Make an animated blocker solid or passable
    pub fn set_solid(&mut self, id: VolumeId, solid: bool) -> Result<(), WorldError> {
        let volume = self.volumes.get_mut(id.index()).ok_or(WorldError::UnknownVolume(id))?;
        if !volume.is_animated() {
            return Err(WorldError::NotAnimated(id));
        }
        volume.set_solid(solid);
        Ok(())
    }
}

impl VolumeQuery for CollisionWorld {
    type Region<'a> = RegionQuery<'a>;

    fn query_region(&self, region: &AABB) -> RegionQuery<'_> {
        CollisionWorld::query_region(self, region)
    }

    fn volume(&self, id: VolumeId) -> Option<&ConvexVolume> {
        CollisionWorld::volume(self, id)
    }
}

/// Single-pass iterator over the volumes near a box
///
/// A volume spanning several cells is only reported from the first cell
/// (lowest coordinates) shared by the volume and the query, which keeps the
/// walk free of allocation while still deduplicating.
#[derive(Debug, Clone)]
pub struct RegionQuery<'a> {
    world: &'a CollisionWorld,
    region: AABB,
    query_cells: CellRange,
    cells: CellIter,
    bucket: std::slice::Iter<'a, VolumeId>,
    cell: Option<CellCoord>,
}

impl<'a> Iterator for RegionQuery<'a> {
    type Item = (VolumeId, &'a ConvexVolume);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(&id) = self.bucket.next() {
                let cell = self.cell?;
                let volume = &self.world.volumes[id.index()];
                let bounds = volume.bounds();
                let shared = self.world.grid.cell_range(&bounds).intersection(&self.query_cells);
                if shared.min != cell || !bounds.intersects(&self.region) {
                    continue;
                }
                return Some((id, volume));
            }

            let cell = self.cells.next()?;
            self.cell = Some(cell);
            self.bucket = self.world.grid.cell(cell).iter();
        }
    }
}
