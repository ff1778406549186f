//! Navigation mesh build adapter
//!
//! [`NavMeshBuilder`] validates triangle input and a world-unit
//! [`NavMeshConfig`], converts the configuration to voxel units and hands the
//! geometry to a [`NavMeshEngine`]. The engine's [`NavMesh`] is wrapped in a
//! [`NavMeshHandle`] that answers path and debug queries.
//!
//! [`VoxelEngine`] is the bundled engine.
//!
//! # Example
//!
//! ```no_run
//! use glam::Vec3;
//! use mazenav_navmesh::{NavMeshBuilder, NavMeshConfig};
//!
//! let vertices = [-1.0, 0.0, -1.0, 1.0, 0.0, -1.0, 1.0, 0.0, 1.0, -1.0, 0.0, 1.0];
//! let indices = [0, 2, 1, 0, 3, 2];
//! let config = NavMeshConfig { cell_size: 0.1, ..Default::default() };
//!
//! let navmesh = NavMeshBuilder::new().build(&vertices, &indices, &config)?;
//! if let Some(path) = navmesh.find_path(Vec3::new(-0.8, 0.0, -0.8), Vec3::new(0.8, 0.0, 0.8)) {
//!     println!("{} waypoints", path.len());
//! }
//! # Ok::<(), mazenav_navmesh::NavMeshError>(())
//! ```

mod builder;
mod config;
pub mod context;
mod engine;
mod path;
pub mod voxel;

pub use builder::{NavMeshBuilder, NavMeshHandle};
pub use config::NavMeshConfig;
pub use context::{BuildContext, BuildStage};
pub use engine::{BuildInput, EngineConfig, EngineError, NavMesh, NavMeshEngine};
pub use path::PathResult;
pub use voxel::VoxelEngine;

/// Message used when an engine fails without giving a reason
pub const BUILD_FAILED_MESSAGE: &str = "NavMesh build failed.";

/// Error types for navmesh building
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NavMeshError {
    /// Input rejected before the engine ran
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The engine failed without a reason
    #[error("{0}")]
    BuildFailed(String),

    /// Failure reported by the engine
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result type for navmesh operations
pub type Result<T> = std::result::Result<T, NavMeshError>;
