//! Reference voxel engine
//!
//! The pipeline runs:
//! 1. mark triangles walkable by slope
//! 2. rasterize into a span heightfield
//! 3. filter low obstacles, ledges and low clearance
//! 4. link walkable cells
//! 5. erode by the agent radius
//! 6. flood fill regions and drop small ones
//!
//! Queries then run directly on the cell graph.

mod cells;
mod heightfield;
mod query;
mod rasterization;

pub use cells::{CellGrid, NavCell, RegionStats};
pub use heightfield::{Heightfield, Span, MAX_COLUMNS, NULL_AREA, WALKABLE_AREA};
pub use rasterization::{mark_walkable_triangles, rasterize_triangle, rasterize_triangles};

use glam::Vec3;

use crate::context::{BuildContext, BuildStage};
use crate::engine::{BuildInput, EngineError, NavMesh, NavMeshEngine};

/// Reason reported when nothing walkable is left
pub const NO_WALKABLE_SPANS: &str = "no walkable spans survived voxelization";

/// Voxel engine implementing [`NavMeshEngine`]
#[derive(Debug, Clone, Copy, Default)]
pub struct VoxelEngine;

impl VoxelEngine {
    pub fn new() -> Self {
        Self
    }

    /// Runs the pipeline, recording stage timings in `ctx`
    pub fn build_with_context(
        &self,
        input: &BuildInput<'_>,
        ctx: &mut BuildContext,
    ) -> Result<VoxelNavMesh, EngineError> {
        let cfg = input.config;
        ctx.start_timer(BuildStage::Total);

        let triangles: Vec<[Vec3; 3]> = (0..input.triangle_count())
            .map(|t| input.triangle(t))
            .collect();
        if triangles.is_empty() {
            return Err(EngineError::new("input has no triangles"));
        }

        let (bmin, bmax) = (0..input.vertex_count)
            .map(|i| input.vertex(i))
            .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        let areas = ctx.timed(BuildStage::AreaMarking, |_| {
            mark_walkable_triangles(&triangles, cfg.walkable_slope_angle)
        });

        let mut hf = match Heightfield::from_bounds(bmin, bmax, cfg.cell_size, cfg.cell_height) {
            Some(hf) => hf,
            None => {
                let (width, height) = Heightfield::grid_size(bmin, bmax, cfg.cell_size);
                return Err(EngineError::new(format!(
                    "heightfield too large: {}x{} columns",
                    width, height
                )));
            }
        };
        log::debug!(
            "voxelizing {} triangles into {}x{} columns",
            triangles.len(),
            hf.width,
            hf.height
        );
        ctx.timed(BuildStage::Rasterization, |_| {
            rasterize_triangles(&mut hf, &triangles, &areas, cfg.walkable_climb)
        });

        ctx.timed(BuildStage::Filtering, |_| {
            hf.filter_low_hanging_walkable_obstacles(cfg.walkable_climb);
            hf.filter_ledge_spans(cfg.walkable_height, cfg.walkable_climb);
            hf.filter_walkable_low_height_spans(cfg.walkable_height);
        });

        let mut grid = ctx.timed(BuildStage::Cells, |_| {
            CellGrid::build(&hf, cfg.walkable_height, cfg.walkable_climb)
        });
        if grid.is_empty() {
            return Err(EngineError::new(NO_WALKABLE_SPANS));
        }

        let eroded = ctx.timed(BuildStage::Erosion, |_| grid.erode(cfg.walkable_radius));
        let stats = ctx.timed(BuildStage::Regions, |_| {
            grid.build_regions(cfg.min_region_area, cfg.merge_region_area)
        });
        if stats.removed_regions > 0 {
            ctx.log_warning(format!(
                "dropped {} regions ({} cells) below {} cells",
                stats.removed_regions, stats.removed_cells, cfg.min_region_area
            ));
        }
        if stats.merge_candidates > 0 {
            log::debug!(
                "{} regions below merge area {}; regions are disjoint so none merged",
                stats.merge_candidates,
                cfg.merge_region_area
            );
        }
        if grid.is_empty() {
            return Err(EngineError::new(NO_WALKABLE_SPANS));
        }

        ctx.stop_timer(BuildStage::Total);
        ctx.log_info(format!(
            "navmesh built: {} cells in {} regions, {} eroded",
            grid.len(),
            stats.regions,
            eroded
        ));

        Ok(VoxelNavMesh {
            grid,
            query_half_extents: cfg.query_half_extents,
        })
    }
}

impl NavMeshEngine for VoxelEngine {
    fn build(&self, input: &BuildInput<'_>) -> Result<Option<Box<dyn NavMesh>>, EngineError> {
        let mut ctx = BuildContext::new();
        let mesh = self.build_with_context(input, &mut ctx)?;
        ctx.log_timings();
        Ok(Some(Box::new(mesh)))
    }
}

/// Navigation mesh produced by [`VoxelEngine`]
#[derive(Debug, Clone)]
pub struct VoxelNavMesh {
    grid: CellGrid,
    query_half_extents: Vec3,
}

impl VoxelNavMesh {
    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Nearest walkable point within the query box
    pub fn nearest_point(&self, p: Vec3) -> Option<Vec3> {
        query::find_nearest_cell(&self.grid, p, self.query_half_extents).map(|(_, point)| point)
    }
}

impl NavMesh for VoxelNavMesh {
    fn find_path(&self, from: Vec3, to: Vec3) -> Option<Vec<Vec3>> {
        let (start, start_pos) = query::find_nearest_cell(&self.grid, from, self.query_half_extents)?;
        let (goal, goal_pos) = query::find_nearest_cell(&self.grid, to, self.query_half_extents)?;
        let cells = query::find_cell_path(&self.grid, start, goal)?;
        Some(query::string_pull(&self.grid, &cells, start_pos, goal_pos))
    }

    fn debug_triangle_vertices(&self) -> Vec<f32> {
        self.grid.debug_triangle_vertices()
    }
}
