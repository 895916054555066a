//! # Arena Physics
//!
//! Movement and collision core for a first-person arena shooter.
//!
//! ## Features
//!
//! - **Compiled Assets**: Decoders for packed level and model data
//! - **Convex Worlds**: Levels as convex solid volumes indexed by a uniform grid
//! - **Substepped Movement**: Per-axis box resolution that cannot tunnel through walls
//! - **Line of Sight**: Segment casts for visibility and projectile impacts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arena_physics::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let level = load_levels("levels.bin")?.remove(0);
//!     let (world, spawns) = level.into_world();
//!
//!     let start = spawns
//!         .iter()
//!         .find(|s| s.kind == SpawnKind::PlayerStart)
//!         .map_or(Vec3::zeros(), |s| s.position);
//!     let mut player = KinematicState::new(start, Vec3::new(16.0, 28.0, 16.0));
//!
//!     let integrator = Integrator::new(PhysicsConfig::default());
//!     let report = integrator.step(&mut player, &world, 1.0 / 60.0);
//!     println!("on ground: {}", report.on_ground);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for users of the physics core
pub mod prelude {
    pub use crate::{
        assets::{load_levels, load_models, DecodeError, Level, Model, SpawnKind, SpawnRecord},
        config::{Config, PhysicsConfig},
        foundation::math::{Axis, Vec3},
        physics::{
            BlockedAxes, CollisionWorld, Integrator, Kinematic, KinematicState, RayHit, StepReport,
            SurfaceKind, VolumeId,
        },
        spatial::{VolumeQuery, AABB},
    };
}
