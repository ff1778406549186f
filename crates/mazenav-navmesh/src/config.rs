//! Navmesh build configuration in world units

use glam::Vec3;

use crate::engine::EngineConfig;
use crate::{NavMeshError, Result};

/// Build configuration in world units.
///
/// Agent dimensions are converted to voxels by [`NavMeshConfig::to_engine_config`]:
/// height and radius round up, climb rounds down.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NavMeshConfig {
    /// Horizontal voxel size
    pub cell_size: f32,
    /// Vertical voxel size
    pub cell_height: f32,
    /// Maximum walkable slope in degrees
    pub walkable_slope_angle: f32,
    /// Agent height
    pub agent_height: f32,
    /// Agent radius, used to erode the walkable area away from walls
    pub agent_radius: f32,
    /// Highest step the agent can climb
    pub agent_climb: f32,
    /// Minimum region size in cells
    pub min_region_area: i32,
    /// Region merge threshold in cells
    pub merge_region_area: i32,
    /// Half size of the box searched when snapping query points
    pub query_half_extents: Vec3,
    /// Skip erosion and region culling. Useful to inspect raw voxelization.
    pub debug_disable_erosion: bool,
}

impl Default for NavMeshConfig {
    fn default() -> Self {
        Self {
            // Fine voxels so thin maze walls do not swallow the corridors
            cell_size: 0.05,
            cell_height: 0.05,
            walkable_slope_angle: 45.0,
            agent_height: 0.2,
            agent_radius: 0.06,
            agent_climb: 0.1,
            min_region_area: 64,
            merge_region_area: 400,
            query_half_extents: Vec3::new(0.5, 1.0, 0.5),
            debug_disable_erosion: false,
        }
    }
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

fn non_negative(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

impl NavMeshConfig {
    /// Checks every value before a build is attempted
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(NavMeshError::InvalidInput(msg));

        if !positive(self.cell_size) {
            return invalid(format!("cell_size must be positive, got {}", self.cell_size));
        }
        if !positive(self.cell_height) {
            return invalid(format!(
                "cell_height must be positive, got {}",
                self.cell_height
            ));
        }
        if !(positive(self.walkable_slope_angle) && self.walkable_slope_angle < 90.0) {
            return invalid(format!(
                "walkable_slope_angle must be in (0, 90) degrees, got {}",
                self.walkable_slope_angle
            ));
        }
        if !positive(self.agent_height) {
            return invalid(format!(
                "agent_height must be positive, got {}",
                self.agent_height
            ));
        }
        if !non_negative(self.agent_radius) {
            return invalid(format!(
                "agent_radius must be non-negative, got {}",
                self.agent_radius
            ));
        }
        if !non_negative(self.agent_climb) {
            return invalid(format!(
                "agent_climb must be non-negative, got {}",
                self.agent_climb
            ));
        }
        if self.min_region_area < 0 || self.merge_region_area < 0 {
            return invalid("region areas must be non-negative".to_string());
        }
        let e = self.query_half_extents;
        if !(positive(e.x) && positive(e.y) && positive(e.z)) {
            return invalid(format!("query_half_extents must be positive, got {}", e));
        }
        Ok(())
    }

    /// Converts to voxel units
    pub fn to_engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            walkable_slope_angle: self.walkable_slope_angle,
            walkable_height: (self.agent_height / self.cell_height).ceil() as i32,
            walkable_climb: (self.agent_climb / self.cell_height).floor() as i32,
            walkable_radius: (self.agent_radius / self.cell_size).ceil() as i32,
            min_region_area: self.min_region_area,
            merge_region_area: self.merge_region_area,
            query_half_extents: self.query_half_extents,
        };
        if self.debug_disable_erosion {
            config.walkable_radius = 0;
            config.min_region_area = 0;
            config.merge_region_area = 0;
        }
        config
    }
}
