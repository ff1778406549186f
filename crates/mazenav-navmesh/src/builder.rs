//! Validating front end over a [`NavMeshEngine`]

use std::fmt;

use glam::Vec3;
use mazenav_common::TriangleSoup;

use crate::config::NavMeshConfig;
use crate::engine::{BuildInput, NavMesh, NavMeshEngine};
use crate::path::PathResult;
use crate::voxel::VoxelEngine;
use crate::{NavMeshError, Result, BUILD_FAILED_MESSAGE};

/// Checks raw triangle buffers before they reach an engine
pub fn validate_input(vertices: &[f32], indices: &[i32]) -> Result<()> {
    if vertices.is_empty() || indices.is_empty() {
        return Err(NavMeshError::InvalidInput(
            "vertices or indices is empty.".to_string(),
        ));
    }
    if vertices.len() % 3 != 0 {
        return Err(NavMeshError::InvalidInput(format!(
            "vertices must be xyz triplets, got {} floats",
            vertices.len()
        )));
    }
    if indices.len() % 3 != 0 {
        return Err(NavMeshError::InvalidInput(format!(
            "indices must be triangle triplets, got {} indices",
            indices.len()
        )));
    }
    if let Some(pos) = vertices.iter().position(|v| !v.is_finite()) {
        return Err(NavMeshError::InvalidInput(format!(
            "vertex {} has a non-finite coordinate",
            pos / 3
        )));
    }
    let vertex_count = (vertices.len() / 3) as i64;
    if let Some((pos, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &i)| i < 0 || i as i64 >= vertex_count)
    {
        return Err(NavMeshError::InvalidInput(format!(
            "index {} at position {} is out of range for {} vertices",
            index, pos, vertex_count
        )));
    }
    Ok(())
}

/// Builds navigation meshes through an engine
#[derive(Debug, Clone, Default)]
pub struct NavMeshBuilder<E = VoxelEngine> {
    engine: E,
}

impl NavMeshBuilder<VoxelEngine> {
    /// Builder backed by [`VoxelEngine`]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: NavMeshEngine> NavMeshBuilder<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Validates the input, then runs the engine once.
    ///
    /// Engine failures are returned as [`NavMeshError::Engine`]; an engine
    /// that yields nothing without a reason gives [`NavMeshError::BuildFailed`].
    pub fn build(
        &self,
        vertices: &[f32],
        indices: &[i32],
        config: &NavMeshConfig,
    ) -> Result<NavMeshHandle> {
        validate_input(vertices, indices)?;
        config.validate()?;

        let input = BuildInput::new(vertices, indices, config.to_engine_config());
        log::debug!(
            "building navmesh from {} vertices, {} triangles",
            input.vertex_count,
            input.triangle_count()
        );

        match self.engine.build(&input)? {
            Some(mesh) => Ok(NavMeshHandle::new(mesh, config.clone())),
            None => Err(NavMeshError::BuildFailed(BUILD_FAILED_MESSAGE.to_string())),
        }
    }

    pub fn build_soup(&self, soup: &TriangleSoup, config: &NavMeshConfig) -> Result<NavMeshHandle> {
        self.build(&soup.vertices, &soup.indices, config)
    }
}

/// A built navigation mesh. Immutable and safe to share across threads.
pub struct NavMeshHandle {
    mesh: Box<dyn NavMesh>,
    config: NavMeshConfig,
}

impl fmt::Debug for NavMeshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavMeshHandle")
            .field("mesh", &self.mesh)
            .field("cell_size", &self.config.cell_size)
            .finish()
    }
}

impl NavMeshHandle {
    pub fn new(mesh: Box<dyn NavMesh>, config: NavMeshConfig) -> Self {
        Self { mesh, config }
    }

    pub fn config(&self) -> &NavMeshConfig {
        &self.config
    }

    /// Path from `start` to `goal`; `None` when either is off the mesh or
    /// the two are not connected
    pub fn find_path(&self, start: Vec3, goal: Vec3) -> Option<PathResult> {
        let points = self.mesh.find_path(start, goal)?;
        PathResult::new(points)
    }

    /// Walkable surface for visualization
    pub fn debug_triangles(&self) -> TriangleSoup {
        TriangleSoup::from_triangle_vertices(&self.mesh.debug_triangle_vertices())
    }
}
