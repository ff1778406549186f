//! Geometry synthesis for the maze scene
//!
//! [`GeometryBuilder`] turns planes, wall boxes and a ramp into one indexed
//! triangle soup whose winding marks walkable surfaces. [`build_scene`] lays
//! out the two-storey maze and produces both renderable elements and the
//! navmesh input from the same maze data.

mod builder;
mod scene;

pub use builder::GeometryBuilder;
pub use scene::{build_scene, Scene, SceneConfig, SceneElement, SceneElementKind, Shape};
