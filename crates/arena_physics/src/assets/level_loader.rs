//! Compiled level decoder
//!
//! A level is a texture table, a list of convex volumes and a spawn table,
//! packed little-endian by the offline map compiler. Several levels may be
//! concatenated in one buffer; [`decode_level`] decodes from a byte window,
//! reports how many bytes it used so the caller can continue from there, and
//! [`LevelStream`] does that loop.
//!
//! Layout:
//!
//! ```text
//! u8  texture_count, u8 × texture_count
//! u16 volume_count
//!     u8 plane_count (>= 4), u8 texture, u8 group
//!     plane_count × (i8 nx, i8 ny, i8 nz, i16 distance)
//! u16 spawn_count
//!     u8 type (0..=16), u16 x, u16 y, u16 z, u8 param_a, u8 param_b
//! ```

use super::reader::{ByteReader, DataKind};
use super::DecodeError;
use crate::foundation::math::Vec3;
use crate::physics::collision::{ConvexVolume, GroupTag, Plane, MIN_VOLUME_PLANES};
use crate::physics::CollisionWorld;
use crate::spatial::AABB;

/// Scale of the quantized plane normal components
const NORMAL_QUANTIZATION: f32 = 127.0;

/// Highest valid spawn type code
pub const MAX_SPAWN_CODE: u8 = 16;

/// What a spawn record places in the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnKind {
    /// Where the player enters the level
    PlayerStart,
    /// Enemy, variant 0 to 4
    Enemy(u8),
    /// Collectible, variant 0 to 4
    Pickup(u8),
    /// Explosive barrel
    Barrel,
    /// Static light, parameters are intensity and color
    Light,
    /// Trigger that loads the next level
    LevelChange,
    /// Door, parameters are texture and direction
    Door,
    /// Key that unlocks doors
    Key,
    /// Wall torch
    Torch,
}

impl SpawnKind {
    /// Decode a spawn type code
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::PlayerStart,
            1..=5 => Self::Enemy(code - 1),
            6..=10 => Self::Pickup(code - 6),
            11 => Self::Barrel,
            12 => Self::Light,
            13 => Self::LevelChange,
            14 => Self::Door,
            15 => Self::Key,
            16 => Self::Torch,
            _ => return None,
        })
    }

    /// The on-disk type code
    pub const fn code(self) -> u8 {
        match self {
            Self::PlayerStart => 0,
            Self::Enemy(variant) => 1 + variant,
            Self::Pickup(variant) => 6 + variant,
            Self::Barrel => 11,
            Self::Light => 12,
            Self::LevelChange => 13,
            Self::Door => 14,
            Self::Key => 15,
            Self::Torch => 16,
        }
    }
}

/// Parameters of a light spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightParams {
    /// Brightness, 0 to 255
    pub intensity: u8,
    /// Palette index of the light color
    pub color: u8,
}

/// Parameters of a door spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorParams {
    /// Texture table index of the door surface
    pub texture: u8,
    /// Direction code the door opens towards
    pub direction: u8,
}

impl DoorParams {
    /// Unit vector the door slides along when opening
    ///
    /// Codes 0 to 5 are up, down, +X, -X, +Z, -Z.
    pub fn opening_direction(&self) -> Option<Vec3> {
        Some(match self.direction {
            0 => Vec3::y(),
            1 => -Vec3::y(),
            2 => Vec3::x(),
            3 => -Vec3::x(),
            4 => Vec3::z(),
            5 => -Vec3::z(),
            _ => return None,
        })
    }
}

/// One entry of the spawn table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRecord {
    /// What to spawn
    pub kind: SpawnKind,
    /// World position
    pub position: Vec3,
    /// Raw parameters, meaning depends on `kind`
    pub params: [u8; 2],
}

impl SpawnRecord {
    /// Light parameters, if this is a light
    pub fn light(&self) -> Option<LightParams> {
        (self.kind == SpawnKind::Light).then_some(LightParams {
            intensity: self.params[0],
            color: self.params[1],
        })
    }

    /// Door parameters, if this is a door
    pub fn door(&self) -> Option<DoorParams> {
        (self.kind == SpawnKind::Door).then_some(DoorParams {
            texture: self.params[0],
            direction: self.params[1],
        })
    }
}

/// A decoded level
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Texture ids referenced by volumes through their index
    pub textures: Vec<u8>,
    /// Solid geometry
    pub volumes: Vec<ConvexVolume>,
    /// Entities to place, in file order
    pub spawns: Vec<SpawnRecord>,
}

impl Level {
    /// Union of all volume bounds, `None` for a level without geometry
    pub fn bounds(&self) -> Option<AABB> {
        self.volumes
            .iter()
            .map(ConvexVolume::bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// First player start, if any
    pub fn player_start(&self) -> Option<&SpawnRecord> {
        self.spawns.iter().find(|s| s.kind == SpawnKind::PlayerStart)
    }

    /// Build a collision world over a copy of the volumes
    pub fn collision_world(&self) -> CollisionWorld {
        CollisionWorld::build(self.volumes.clone())
    }

    /// Split into a collision world and the spawn table
    pub fn into_world(self) -> (CollisionWorld, Vec<SpawnRecord>) {
        (CollisionWorld::build(self.volumes), self.spawns)
    }
}

/// Decode one level from the `len` bytes starting at `offset`
///
/// Returns the level and the number of bytes it occupied. A level running
/// past the end of its window is corrupt, whatever follows in `bytes`.
pub fn decode_level(
    bytes: &[u8],
    offset: usize,
    len: usize,
) -> Result<(Level, usize), DecodeError> {
    let mut reader = ByteReader::new(bytes, offset, len, DataKind::Level);

    let texture_count = reader.read_u8()?;
    let textures = (0..texture_count)
        .map(|_| reader.read_u8())
        .collect::<Result<Vec<_>, _>>()?;

    let volume_count = reader.read_u16()?;
    let mut volumes = Vec::with_capacity(usize::from(volume_count));
    for _ in 0..volume_count {
        volumes.push(read_volume(&mut reader, textures.len())?);
    }

    let spawn_count = reader.read_u16()?;
    let mut spawns = Vec::with_capacity(usize::from(spawn_count));
    for _ in 0..spawn_count {
        spawns.push(read_spawn(&mut reader)?);
    }

    if volumes.is_empty() {
        log::warn!("Level at byte {} has no geometry", offset);
    }
    log::debug!(
        "Decoded level at byte {}: {} textures, {} volumes, {} spawns ({} bytes)",
        offset,
        textures.len(),
        volumes.len(),
        spawns.len(),
        reader.consumed()
    );

    Ok((
        Level {
            textures,
            volumes,
            spawns,
        },
        reader.consumed(),
    ))
}

fn read_volume(
    reader: &mut ByteReader<'_>,
    texture_count: usize,
) -> Result<ConvexVolume, DecodeError> {
    let start = reader.position();

    let plane_count = reader.read_u8()?;
    if usize::from(plane_count) < MIN_VOLUME_PLANES {
        return Err(reader.corrupt_at(
            start,
            format!("volume has {} planes, at least {} required", plane_count, MIN_VOLUME_PLANES),
        ));
    }

    let texture = reader.read_u8()?;
    if usize::from(texture) >= texture_count {
        return Err(reader.corrupt_at(
            start + 1,
            format!("texture index {} outside table of {}", texture, texture_count),
        ));
    }
    let group = GroupTag::from_byte(reader.read_u8()?);

    let mut planes = Vec::with_capacity(usize::from(plane_count));
    for _ in 0..plane_count {
        let plane_offset = reader.position();
        let normal = Vec3::new(
            f32::from(reader.read_i8()?),
            f32::from(reader.read_i8()?),
            f32::from(reader.read_i8()?),
        ) / NORMAL_QUANTIZATION;
        let distance = f32::from(reader.read_i16()?);

        let length = normal.norm();
        if length <= f32::EPSILON {
            return Err(reader.corrupt_at(plane_offset, "plane has a zero-length normal"));
        }
        planes.push(Plane {
            normal: normal / length,
            distance,
        });
    }

    ConvexVolume::new(planes, texture, group).map_err(|e| reader.corrupt_at(start, e.to_string()))
}

fn read_spawn(reader: &mut ByteReader<'_>) -> Result<SpawnRecord, DecodeError> {
    let start = reader.position();
    let code = reader.read_u8()?;
    let kind = SpawnKind::from_code(code)
        .ok_or_else(|| reader.corrupt_at(start, format!("spawn type {} out of range", code)))?;

    let position = Vec3::new(
        f32::from(reader.read_u16()?),
        f32::from(reader.read_u16()?),
        f32::from(reader.read_u16()?),
    );
    let params = [reader.read_u8()?, reader.read_u8()?];

    Ok(SpawnRecord { kind, position, params })
}

/// Iterator over back-to-back levels in one buffer
///
/// Stops at the end of the buffer, or after yielding the first error.
#[derive(Debug, Clone)]
pub struct LevelStream<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> LevelStream<'a> {
    /// Start reading at the beginning of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            failed: false,
        }
    }

    /// Offset of the next level
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for LevelStream<'_> {
    type Item = Result<Level, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        let remaining = self.bytes.len() - self.offset;
        match decode_level(self.bytes, self.offset, remaining) {
            Ok((level, consumed)) => {
                self.offset += consumed;
                Some(Ok(level))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
