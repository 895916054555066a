//! Segment casts through the collision world
//!
//! Walks the grid cells the segment passes through in order (a 3D DDA),
//! clipping the segment against each volume the first time it is seen. The
//! walk ends as soon as the nearest hit so far lies inside the cells already
//! visited, since nothing further along can be closer.

use crate::foundation::math::Vec3;
use crate::physics::collision::VolumeId;
use crate::physics::CollisionWorld;
use std::collections::HashSet;

/// First solid volume along a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Volume that was hit
    pub volume: VolumeId,
    /// World-space impact point
    pub point: Vec3,
    /// Outward normal of the surface that was hit
    pub normal: Vec3,
    /// Fraction of the segment travelled, in `[0, 1]`
    pub fraction: f32,
    /// Distance travelled from the segment start
    pub distance: f32,
}

impl CollisionWorld {
    /// Cast the segment `start -> end` and report the nearest solid hit
    ///
    /// Non-solid volumes and volumes that contain `start` are ignored.
    pub fn raycast(&self, start: &Vec3, end: &Vec3) -> Option<RayHit> {
        let delta = end - start;
        let length = delta.norm();
        if length <= 0.0 {
            return None;
        }

        let (t_first, t_last) = self.grid().occupied_bounds()?.clip_segment(start, &delta)?;

        let grid = self.grid();
        let cell_size = grid.cell_size();
        let mut cell = grid.cell_of(&(start + delta * t_first));
        let mut step = [0_i32; 3];
        let mut t_max = [f32::INFINITY; 3];
        let mut t_delta = [f32::INFINITY; 3];
        for i in 0..3 {
            if delta[i] > 0.0 {
                step[i] = 1;
                t_max[i] = ((cell.get(i) + 1) as f32 * cell_size - start[i]) / delta[i];
                t_delta[i] = cell_size / delta[i];
            } else if delta[i] < 0.0 {
                step[i] = -1;
                t_max[i] = (cell.get(i) as f32 * cell_size - start[i]) / delta[i];
                t_delta[i] = -cell_size / delta[i];
            }
        }

        let mut tested = HashSet::new();
        let mut best: Option<RayHit> = None;

        loop {
            for &id in grid.cell(cell) {
                if !tested.insert(id) {
                    continue;
                }
                let Some(volume) = self.volume(id) else {
                    continue;
                };
                if !volume.is_solid() || volume.contains_point(start) {
                    continue;
                }
                let Some(hit) = volume.clip_segment(start, end) else {
                    continue;
                };
                if best.map_or(true, |b| hit.fraction < b.fraction) {
                    best = Some(RayHit {
                        volume: id,
                        point: start + delta * hit.fraction,
                        normal: hit.normal,
                        fraction: hit.fraction,
                        distance: length * hit.fraction,
                    });
                }
            }

            let axis = (0..3)
                .min_by(|&a, &b| t_max[a].total_cmp(&t_max[b]))
                .unwrap_or(0);
            let t_exit = t_max[axis];
            if best.is_some_and(|b| b.fraction <= t_exit) || t_exit > t_last {
                break;
            }

            match axis {
                0 => cell.x += step[0],
                1 => cell.y += step[1],
                _ => cell.z += step[2],
            }
            t_max[axis] += t_delta[axis];
        }

        best
    }

    /// Whether nothing solid lies between `from` and `to`
    pub fn line_of_sight(&self, from: &Vec3, to: &Vec3) -> bool {
        self.raycast(from, to).is_none()
    }
}
