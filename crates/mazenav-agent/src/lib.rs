//! Agent motion along navmesh paths
//!
//! [`AgentController`] walks a single agent through a list of waypoints at a
//! fixed speed. [`TargetMarker`] animates the destination marker from the
//! time since it was placed.
//!
//! ```
//! use glam::Vec3;
//! use mazenav_agent::{AgentController, AgentMotion, AgentParams};
//!
//! let mut agent = AgentController::new(AgentParams::default(), Vec3::ZERO);
//! agent.assign_path(vec![Vec3::new(0.1, 0.0, 0.0)]);
//! while agent.motion() == AgentMotion::Following {
//!     agent.update(1.0 / 60.0);
//! }
//! assert!(agent.position().distance(Vec3::new(0.1, 0.0, 0.0)) < 0.02);
//! ```

mod controller;
mod marker;

pub use controller::{AgentController, AgentMotion, AgentParams, AgentStep};
pub use marker::{MarkerPose, TargetMarker};
