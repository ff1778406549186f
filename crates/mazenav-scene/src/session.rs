//! Scene session driving one agent across a generated maze

use glam::Vec3;
use mazenav_agent::{AgentController, AgentParams, AgentStep, MarkerPose, TargetMarker};
use mazenav_common::TriangleSoup;
use mazenav_geometry::{build_scene, Scene, SceneConfig};
use mazenav_maze::MazeGrid;
use mazenav_navmesh::{NavMeshBuilder, NavMeshConfig, NavMeshEngine, NavMeshHandle, PathResult};
use web_time::Instant;

use crate::Result;

/// Height the debug navmesh is raised above the floor to avoid z-fighting
pub const NAVMESH_DEBUG_LIFT: f32 = 0.005;

/// A generated maze with its navmesh, one agent and a destination marker
#[derive(Debug)]
pub struct MazeScene {
    maze: MazeGrid,
    scene: Scene,
    navmesh: NavMeshHandle,
    agent: AgentController,
    marker: Option<TargetMarker>,
    path: Option<PathResult>,
}

impl MazeScene {
    /// Generates the maze, builds geometry and navmesh, and spawns the agent.
    ///
    /// Any failure aborts setup; nothing is retried.
    pub fn setup<E: NavMeshEngine>(
        scene_config: SceneConfig,
        navmesh_config: NavMeshConfig,
        agent_params: AgentParams,
        engine: E,
    ) -> Result<Self> {
        let start = Instant::now();

        let maze = MazeGrid::generate(scene_config.maze.clone())?;
        let scene = build_scene(&maze, &scene_config);
        log::debug!(
            "scene geometry: {} elements, {} triangles",
            scene.elements.len(),
            scene.nav_geometry.triangle_count()
        );

        let navmesh =
            NavMeshBuilder::with_engine(engine).build_soup(&scene.nav_geometry, &navmesh_config)?;
        let agent = AgentController::new(agent_params, scene.spawn);

        log::info!(
            "maze scene ready in {:.2}ms ({}x{}, seed {:#x})",
            start.elapsed().as_secs_f64() * 1000.0,
            maze.width(),
            maze.height(),
            maze.seed()
        );

        Ok(Self {
            maze,
            scene,
            navmesh,
            agent,
            marker: None,
            path: None,
        })
    }

    pub fn maze(&self) -> &MazeGrid {
        &self.maze
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn navmesh(&self) -> &NavMeshHandle {
        &self.navmesh
    }

    pub fn agent(&self) -> &AgentController {
        &self.agent
    }

    pub fn marker(&self) -> Option<&TargetMarker> {
        self.marker.as_ref()
    }

    pub fn marker_pose(&self) -> Option<MarkerPose> {
        self.marker.as_ref().map(TargetMarker::pose)
    }

    /// Surface path from the last successful tap
    pub fn path(&self) -> Option<&PathResult> {
        self.path.as_ref()
    }

    /// Places the marker at `target` and sends the agent there.
    ///
    /// When no path exists the agent stops where it is and `None` is
    /// returned.
    pub fn tap(&mut self, target: Vec3) -> Option<&PathResult> {
        match self.marker.as_mut() {
            Some(marker) => marker.place(target),
            None => self.marker = Some(TargetMarker::new(target)),
        }

        self.path = self.navmesh.find_path(self.agent.position(), target);
        match &self.path {
            Some(path) => self.agent.assign_lifted_path(path.points()),
            None => {
                log::debug!("no path to {:?}", target);
                self.agent.stop();
            }
        }
        self.path.as_ref()
    }

    /// Moves the agent to `position` and stops it
    pub fn respawn(&mut self, position: Vec3) {
        log::debug!("agent respawned at {:?}", position);
        self.agent.stop();
        self.agent.set_position(position);
        self.path = None;
    }

    /// Advances the marker animation and the agent by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> AgentStep {
        if let Some(marker) = self.marker.as_mut() {
            marker.advance(dt);
        }
        self.agent.update(dt)
    }

    /// Walkable surface raised slightly above the floor for drawing
    pub fn navmesh_debug(&self) -> TriangleSoup {
        self.navmesh
            .debug_triangles()
            .translated(Vec3::new(0.0, NAVMESH_DEBUG_LIFT, 0.0))
    }
}
