//! Waypoint follower
//!
//! An agent walks a path one waypoint at a time at constant speed. Assigning
//! a new path replaces the current one.

use glam::Vec3;

/// Default movement speed in world units per second
const DEFAULT_AGENT_SPEED: f32 = 0.5;

/// Default distance at which a waypoint counts as reached
const DEFAULT_ARRIVAL_TOLERANCE: f32 = 0.02;

/// Default body radius
const DEFAULT_AGENT_RADIUS: f32 = 0.06;

/// Agent movement parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AgentParams {
    /// Movement speed in world units per second
    pub speed: f32,
    /// A waypoint closer than this is reached
    pub arrival_tolerance: f32,
    /// Body radius. Waypoints given to [`AgentController::assign_lifted_path`]
    /// are raised by this amount so the body rests on the surface.
    pub radius: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            speed: DEFAULT_AGENT_SPEED,
            arrival_tolerance: DEFAULT_ARRIVAL_TOLERANCE,
            radius: DEFAULT_AGENT_RADIUS,
        }
    }
}

/// Whether the agent has a path to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentMotion {
    #[default]
    Idle,
    Following,
}

/// What a single [`AgentController::update`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentStep {
    /// Nothing to follow
    Idle,
    /// Moved toward the current waypoint by the given distance
    Moved(f32),
    /// Reached a waypoint and moved on to the next one
    Advanced,
    /// Reached the last waypoint
    Arrived,
}

/// Moves one agent along a waypoint list.
///
/// Assigning a path replaces whatever was being followed and restarts at the
/// first waypoint.
#[derive(Debug, Clone)]
pub struct AgentController {
    params: AgentParams,
    position: Vec3,
    path: Vec<Vec3>,
    index: usize,
    motion: AgentMotion,
}

impl AgentController {
    pub fn new(params: AgentParams, position: Vec3) -> Self {
        Self {
            params,
            position,
            path: Vec::new(),
            index: 0,
            motion: AgentMotion::Idle,
        }
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Teleports the agent. The current path is kept.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn motion(&self) -> AgentMotion {
        self.motion
    }

    pub fn is_idle(&self) -> bool {
        self.motion == AgentMotion::Idle
    }

    pub fn path(&self) -> &[Vec3] {
        &self.path
    }

    /// Index of the waypoint being approached
    pub fn path_index(&self) -> usize {
        self.index
    }

    pub fn current_waypoint(&self) -> Option<Vec3> {
        match self.motion {
            AgentMotion::Following => self.path.get(self.index).copied(),
            AgentMotion::Idle => None,
        }
    }

    /// Replaces the current path. An empty path stops the agent.
    pub fn assign_path(&mut self, path: Vec<Vec3>) {
        self.path = path;
        self.index = 0;
        self.motion = if self.path.is_empty() {
            AgentMotion::Idle
        } else {
            AgentMotion::Following
        };
        log::debug!(
            "agent path assigned: {} waypoints, {:?}",
            self.path.len(),
            self.motion
        );
    }

    /// Like [`assign_path`](Self::assign_path), with every waypoint raised
    /// by the body radius
    pub fn assign_lifted_path(&mut self, surface_points: &[Vec3]) {
        let lift = Vec3::new(0.0, self.params.radius, 0.0);
        self.assign_path(surface_points.iter().map(|p| *p + lift).collect());
    }

    /// Drops the current path
    pub fn stop(&mut self) {
        self.assign_path(Vec::new());
    }

    /// Advances the agent by `dt` seconds.
    ///
    /// Reaching a waypoint consumes the whole tick: the index moves on by one
    /// and the agent stays put until the next update.
    pub fn update(&mut self, dt: f32) -> AgentStep {
        if self.motion == AgentMotion::Idle {
            return AgentStep::Idle;
        }
        let Some(&target) = self.path.get(self.index) else {
            self.motion = AgentMotion::Idle;
            return AgentStep::Idle;
        };

        let to_target = target - self.position;
        let distance = to_target.length();
        if distance < self.params.arrival_tolerance {
            self.index += 1;
            if self.index >= self.path.len() {
                self.motion = AgentMotion::Idle;
                log::debug!("agent arrived at {:?}", target);
                return AgentStep::Arrived;
            }
            return AgentStep::Advanced;
        }

        let step = (self.params.speed * dt.max(0.0)).min(distance);
        self.position += to_target / distance * step;
        AgentStep::Moved(step)
    }
}
