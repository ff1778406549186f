//! Capability traits a navigation engine implements
//!
//! The adapter only talks to an engine through [`NavMeshEngine`] and the
//! [`NavMesh`] it returns, so any voxel pipeline can sit behind it.

use std::fmt;

use glam::Vec3;

/// Engine configuration in voxel units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Horizontal voxel size in world units
    pub cell_size: f32,
    /// Vertical voxel size in world units
    pub cell_height: f32,
    /// Maximum walkable slope in degrees
    pub walkable_slope_angle: f32,
    /// Minimum clearance in voxels
    pub walkable_height: i32,
    /// Maximum step in voxels
    pub walkable_climb: i32,
    /// Erosion radius in voxels
    pub walkable_radius: i32,
    /// Regions with fewer cells are discarded
    pub min_region_area: i32,
    /// Regions with fewer cells may be merged into neighbours
    pub merge_region_area: i32,
    /// Search box half size used to snap query points onto the mesh
    pub query_half_extents: Vec3,
}

/// Geometry and configuration handed to an engine
#[derive(Debug, Clone, Copy)]
pub struct BuildInput<'a> {
    pub vertices: &'a [f32],
    pub vertex_count: usize,
    pub indices: &'a [i32],
    pub index_count: usize,
    pub config: EngineConfig,
}

impl<'a> BuildInput<'a> {
    pub fn new(vertices: &'a [f32], indices: &'a [i32], config: EngineConfig) -> Self {
        Self {
            vertices,
            vertex_count: vertices.len() / 3,
            indices,
            index_count: indices.len(),
            config,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.index_count / 3
    }

    /// Vertex `i` as a vector
    pub fn vertex(&self, i: usize) -> Vec3 {
        Vec3::new(
            self.vertices[i * 3],
            self.vertices[i * 3 + 1],
            self.vertices[i * 3 + 2],
        )
    }

    /// Corner positions of triangle `t`
    pub fn triangle(&self, t: usize) -> [Vec3; 3] {
        let i = &self.indices[t * 3..t * 3 + 3];
        [
            self.vertex(i[0] as usize),
            self.vertex(i[1] as usize),
            self.vertex(i[2] as usize),
        ]
    }
}

/// Failure reported by an engine
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct EngineError {
    pub reason: String,
}

impl EngineError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A built, immutable navigation mesh
pub trait NavMesh: Send + Sync + fmt::Debug {
    /// Waypoints from `from` to `to`, or `None` when either point is off the
    /// mesh or the two are not connected
    fn find_path(&self, from: Vec3, to: Vec3) -> Option<Vec<Vec3>>;

    /// Walkable surface as flat triangle vertices, 9 floats per triangle
    fn debug_triangle_vertices(&self) -> Vec<f32>;
}

/// Builds a [`NavMesh`] from triangle geometry.
///
/// `Ok(None)` means the engine failed without giving a reason.
pub trait NavMeshEngine {
    fn build(&self, input: &BuildInput<'_>) -> Result<Option<Box<dyn NavMesh>>, EngineError>;
}

impl<E: NavMeshEngine + ?Sized> NavMeshEngine for &E {
    fn build(&self, input: &BuildInput<'_>) -> Result<Option<Box<dyn NavMesh>>, EngineError> {
        (**self).build(input)
    }
}

impl<E: NavMeshEngine + ?Sized> NavMeshEngine for Box<E> {
    fn build(&self, input: &BuildInput<'_>) -> Result<Option<Box<dyn NavMesh>>, EngineError> {
        (**self).build(input)
    }
}
