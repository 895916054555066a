//! Compiled asset decoding
//!
//! Levels and models arrive as compact little-endian blobs from the offline
//! compilers. Decoding validates everything the physics layer relies on and
//! fails the whole load on the first inconsistency.

pub mod level_loader;
pub mod model_loader;
mod reader;

pub use level_loader::{
    decode_level, DoorParams, Level, LevelStream, LightParams, SpawnKind, SpawnRecord,
};
pub use model_loader::{decode_model, Face, Model, ModelFrame, ModelStream, ModelVertex};

use std::path::Path;
use thiserror::Error;

/// Malformed compiled data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Level bytes are truncated or inconsistent
    #[error("corrupt level data at byte {offset}: {reason}")]
    CorruptLevelData {
        /// Absolute byte offset of the offending field
        offset: usize,
        /// What was wrong
        reason: String,
    },

    /// Model bytes are truncated or inconsistent
    #[error("corrupt model data at byte {offset}: {reason}")]
    CorruptModelData {
        /// Absolute byte offset of the offending field
        offset: usize,
        /// What was wrong
        reason: String,
    },
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// IO error during asset loading
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file was read but its contents are invalid
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Read a file of concatenated compiled levels
pub fn load_levels(path: impl AsRef<Path>) -> Result<Vec<Level>, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let levels = LevelStream::new(&bytes).collect::<Result<Vec<_>, _>>()?;
    log::info!("Loaded {} level(s) from {}", levels.len(), path.display());
    Ok(levels)
}

/// Read a file of concatenated compiled models
pub fn load_models(path: impl AsRef<Path>) -> Result<Vec<Model>, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let models = ModelStream::new(&bytes).collect::<Result<Vec<_>, _>>()?;
    log::info!("Loaded {} model(s) from {}", models.len(), path.display());
    Ok(models)
}
