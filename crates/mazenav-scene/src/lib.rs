//! Interactive maze navigation session
//!
//! [`MazeScene`] ties the pieces together: it generates the maze, builds the
//! scene geometry and its navmesh, and spawns an agent. Afterwards the host
//! feeds it taps and frame ticks.

mod session;

pub use session::{MazeScene, NAVMESH_DEBUG_LIFT};

use mazenav_maze::MazeError;
use mazenav_navmesh::NavMeshError;

/// Errors that abort scene setup
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("maze generation failed: {0}")]
    Maze(#[from] MazeError),

    #[error("navmesh build failed: {0}")]
    NavMesh(#[from] NavMeshError),
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
