//! Compiled model decoder
//!
//! Models are tiny keyframe meshes: one triangle list shared by every frame
//! and a set of quantized vertex positions per frame.
//!
//! Layout:
//!
//! ```text
//! u8 frame_count (>= 1)
//! u8 face_count (<= 127), face_count × (u8 a, u8 b, u8 c)
//! frame_count × (u8 vertex_count (<= 127), vertex_count × (u8 x, u8 y, u8 z))
//! ```
//!
//! A coordinate byte `q` in `0..=240` decodes to `(q - 120) / 8`, so every
//! vertex lies in `[-15, 15]` on each axis.

use super::reader::{ByteReader, DataKind};
use super::DecodeError;
use crate::foundation::math::{utils, Vec3};
use crate::spatial::AABB;
use bytemuck::{Pod, Zeroable};

/// Most vertices a frame may hold
pub const MAX_MODEL_VERTICES: usize = 127;

/// Most faces a model may hold
pub const MAX_MODEL_FACES: usize = 127;

/// Largest valid coordinate byte
const MAX_QUANTIZED: u8 = 240;

/// Coordinate byte that decodes to zero
const QUANTIZED_ORIGIN: f32 = 120.0;

/// Quantization steps per world unit
const QUANTIZED_SCALE: f32 = 8.0;

/// Triangle as three vertex indices
pub type Face = [u8; 3];

/// Vertex layout handed to the renderer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ModelVertex {
    /// Model-space position
    pub position: [f32; 3],
    /// Face normal
    pub normal: [f32; 3],
}

/// Vertex positions of one animation frame
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFrame {
    /// Dequantized positions
    pub vertices: Vec<Vec3>,
}

impl ModelFrame {
    /// Bounds of the frame, `None` when it has no vertices
    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(&self.vertices)
    }
}

/// A decoded model
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Triangles shared by every frame
    pub faces: Vec<Face>,
    /// Animation frames, at least one
    pub frames: Vec<ModelFrame>,
}

impl Model {
    /// Vertices per frame
    pub fn vertex_count(&self) -> usize {
        self.frames.first().map_or(0, |frame| frame.vertices.len())
    }

    /// Bounds over every frame
    pub fn bounds(&self) -> Option<AABB> {
        self.frames
            .iter()
            .filter_map(ModelFrame::bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Half extents of a physics box enclosing the model at `scale`
    ///
    /// The box is centred on the model origin, so it uses the larger of the
    /// two distances from the origin on each axis.
    pub fn half_extents(&self, scale: f32) -> Vec3 {
        self.bounds().map_or_else(Vec3::zeros, |b| {
            utils::max_vec3(&b.max.abs(), &b.min.abs()) * scale
        })
    }

    /// Linear blend of frames `from` and `to` at `t` in `[0, 1]`
    pub fn interpolate(&self, from: usize, to: usize, t: f32) -> Option<ModelFrame> {
        let a = self.frames.get(from)?;
        let b = self.frames.get(to)?;
        let t = t.clamp(0.0, 1.0);
        Some(ModelFrame {
            vertices: a
                .vertices
                .iter()
                .zip(&b.vertices)
                .map(|(va, vb)| utils::lerp_vec3(va, vb, t))
                .collect(),
        })
    }

    /// Unindexed triangle list for one frame, three vertices per face
    pub fn vertex_buffer(&self, frame: usize) -> Option<Vec<ModelVertex>> {
        let frame = self.frames.get(frame)?;
        let mut out = Vec::with_capacity(self.faces.len() * 3);
        let vertex = |i: u8| frame.vertices.get(usize::from(i)).copied();
        for face in &self.faces {
            let [a, b, c] = face.map(vertex);
            let (Some(a), Some(b), Some(c)) = (a, b, c) else {
                continue;
            };
            let normal = (b - a)
                .cross(&(c - a))
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vec3::zeros);
            for p in [a, b, c] {
                out.push(ModelVertex {
                    position: p.into(),
                    normal: normal.into(),
                });
            }
        }
        Some(out)
    }
}

/// Decode one model from the `len` bytes starting at `offset`
///
/// Returns the model and the number of bytes it occupied.
pub fn decode_model(
    bytes: &[u8],
    offset: usize,
    len: usize,
) -> Result<(Model, usize), DecodeError> {
    let mut reader = ByteReader::new(bytes, offset, len, DataKind::Model);

    let frame_count = reader.read_u8()?;
    if frame_count == 0 {
        return Err(reader.corrupt_at(offset, "model has no frames"));
    }

    let faces_offset = reader.position();
    let face_count = usize::from(reader.read_u8()?);
    if face_count > MAX_MODEL_FACES {
        return Err(reader.corrupt_at(
            faces_offset,
            format!("{} faces exceeds the limit of {}", face_count, MAX_MODEL_FACES),
        ));
    }
    let mut faces = Vec::with_capacity(face_count);
    for _ in 0..face_count {
        faces.push([reader.read_u8()?, reader.read_u8()?, reader.read_u8()?]);
    }

    let mut frames = Vec::with_capacity(usize::from(frame_count));
    for _ in 0..frame_count {
        let frame_offset = reader.position();
        let vertex_count = usize::from(reader.read_u8()?);
        if vertex_count > MAX_MODEL_VERTICES {
            return Err(reader.corrupt_at(
                frame_offset,
                format!("{} vertices exceeds the limit of {}", vertex_count, MAX_MODEL_VERTICES),
            ));
        }
        if let Some(first) = frames.first().map(|f: &ModelFrame| f.vertices.len()) {
            if vertex_count != first {
                return Err(reader.corrupt_at(
                    frame_offset,
                    format!("frame has {} vertices, first frame has {}", vertex_count, first),
                ));
            }
        }

        let mut vertices = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            vertices.push(Vec3::new(
                read_coordinate(&mut reader)?,
                read_coordinate(&mut reader)?,
                read_coordinate(&mut reader)?,
            ));
        }
        frames.push(ModelFrame { vertices });
    }

    let vertex_count = frames[0].vertices.len();
    let out_of_range = |face: &Face| face.iter().any(|&i| usize::from(i) >= vertex_count);
    if let Some(index) = faces.iter().position(out_of_range) {
        return Err(reader.corrupt_at(
            faces_offset + 1 + index * 3,
            format!("face {} references a vertex outside {} vertices", index, vertex_count),
        ));
    }

    if faces.is_empty() {
        log::warn!("Model at byte {} has no faces", offset);
    }
    log::debug!(
        "Decoded model at byte {}: {} frames, {} vertices, {} faces",
        offset,
        frames.len(),
        vertex_count,
        faces.len()
    );

    Ok((Model { faces, frames }, reader.consumed()))
}

fn read_coordinate(reader: &mut ByteReader<'_>) -> Result<f32, DecodeError> {
    let at = reader.position();
    let q = reader.read_u8()?;
    if q > MAX_QUANTIZED {
        let reason = format!("coordinate byte {} above {}", q, MAX_QUANTIZED);
        return Err(reader.corrupt_at(at, reason));
    }
    Ok((f32::from(q) - QUANTIZED_ORIGIN) / QUANTIZED_SCALE)
}

/// Iterator over back-to-back models in one buffer
///
/// Stops at the end of the buffer, or after yielding the first error.
#[derive(Debug, Clone)]
pub struct ModelStream<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> ModelStream<'a> {
    /// Start reading at the beginning of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            failed: false,
        }
    }
}

impl Iterator for ModelStream<'_> {
    type Item = Result<Model, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        let remaining = self.bytes.len() - self.offset;
        match decode_model(self.bytes, self.offset, remaining) {
            Ok((model, consumed)) => {
                self.offset += consumed;
                Some(Ok(model))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
