//! Path query results

use glam::Vec3;

/// Ordered waypoints from start to goal. Never empty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PathResult {
    points: Vec<Vec3>,
}

impl PathResult {
    /// Returns `None` for an empty point list
    pub fn new(points: Vec<Vec3>) -> Option<Self> {
        (!points.is_empty()).then_some(Self { points })
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Vec3> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Vec3 {
        self.points[0]
    }

    pub fn goal(&self) -> Vec3 {
        self.points[self.points.len() - 1]
    }

    /// Total length of the polyline
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Waypoints raised by `height`
    pub fn lifted(&self, height: f32) -> Vec<Vec3> {
        let offset = Vec3::new(0.0, height, 0.0);
        self.points.iter().map(|p| *p + offset).collect()
    }
}
