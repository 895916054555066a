//! Little-endian cursor over compiled asset bytes

use super::DecodeError;

/// Which decoder owns a reader, so failures carry the right error variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataKind {
    Level,
    Model,
}

/// Bounds-checked cursor reading little-endian integers
///
/// Reads stop at the end of the declared window even when the buffer goes
/// on. Offsets in errors are absolute positions in the underlying buffer.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    start: usize,
    position: usize,
    kind: DataKind,
}

impl<'a> ByteReader<'a> {
    /// Cursor over the `len` bytes starting at `offset`
    pub(crate) fn new(bytes: &'a [u8], offset: usize, len: usize, kind: DataKind) -> Self {
        let end = offset.saturating_add(len).min(bytes.len());
        Self {
            bytes: &bytes[..end],
            start: offset,
            position: offset,
            kind,
        }
    }

    /// Absolute position of the next byte
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    /// Bytes read since construction
    pub(crate) fn consumed(&self) -> usize {
        self.position - self.start
    }

    /// Error for the data at `offset`
    pub(crate) fn corrupt_at(&self, offset: usize, reason: impl Into<String>) -> DecodeError {
        let reason = reason.into();
        match self.kind {
            DataKind::Level => DecodeError::CorruptLevelData { offset, reason },
            DataKind::Model => DecodeError::CorruptModelData { offset, reason },
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.position.checked_add(N).filter(|&end| end <= self.bytes.len());
        let Some(end) = end else {
            return Err(self.corrupt_at(
                self.position,
                format!("unexpected end of data, needed {} more byte(s)", N),
            ));
        };

        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.position..end]);
        self.position = end;
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take::<1>()?[0])
    }

    pub(crate) fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(i8::from_le_bytes(self.take::<1>()?))
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.take::<2>()?))
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_le_bytes(self.take::<2>()?))
    }
}
