//! Common utilities and data structures shared by the maze, geometry, navmesh
//! and agent crates

mod geometry;
mod mesh;

pub use geometry::*;
pub use mesh::*;

/// Represents a 3D position
pub type Vec3 = glam::Vec3;

/// Error types for mesh handling
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input mesh: {0}")]
    InvalidMesh(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mesh operations
pub type Result<T> = std::result::Result<T, Error>;
