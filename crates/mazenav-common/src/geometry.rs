//! Small geometric helpers shared across crates

use glam::Vec3;

/// Unnormalized normal of triangle `(a, b, c)`: `(b - a) x (c - a)`.
///
/// A positive Y component means the triangle faces up.
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

/// Returns true when the triangle faces up and its slope is within
/// `walkable_slope_angle` degrees of horizontal.
pub fn is_walkable_triangle(a: Vec3, b: Vec3, c: Vec3, walkable_slope_angle: f32) -> bool {
    let n = triangle_normal(a, b, c);
    let len = n.length();
    if len <= f32::EPSILON {
        return false;
    }
    let threshold = walkable_slope_angle.to_radians().cos();
    n.y / len > threshold
}

/// Axis-aligned rectangle on the XZ plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectXZ {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl RectXZ {
    /// Creates a rectangle from its center and full extents
    pub fn from_center_size(center_x: f32, center_z: f32, size_x: f32, size_z: f32) -> Self {
        Self {
            min_x: center_x - size_x * 0.5,
            max_x: center_x + size_x * 0.5,
            min_z: center_z - size_z * 0.5,
            max_z: center_z + size_z * 0.5,
        }
    }

    /// Grows the rectangle by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min_x: self.min_x - margin,
            max_x: self.max_x + margin,
            min_z: self.min_z - margin,
            max_z: self.max_z + margin,
        }
    }

    /// Closed-interval overlap test; touching edges count as overlap
    pub fn overlaps(&self, other: &RectXZ) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_z < other.min_z
            || self.min_z > other.max_z)
    }

    /// Returns true when the point lies inside or on the boundary
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f32 {
        self.max_z - self.min_z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upward_normal() {
        // Same winding the geometry builder uses for floors
        let v0 = Vec3::new(-1.0, 0.0, -1.0);
        let v1 = Vec3::new(1.0, 0.0, -1.0);
        let v2 = Vec3::new(1.0, 0.0, 1.0);
        assert!(triangle_normal(v0, v2, v1).y > 0.0);
        assert!(triangle_normal(v0, v1, v2).y < 0.0);
    }

    #[test]
    fn test_walkable_slope() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 0.0, 1.0);
        // 45 degree incline along x
        let steep = Vec3::new(1.0, 1.0, 0.0);
        assert!(!is_walkable_triangle(a, c, steep, 30.0));
        assert!(is_walkable_triangle(a, c, steep, 50.0));
        // Vertical wall never walks
        let wall = Vec3::new(0.0, 1.0, 0.0);
        assert!(!is_walkable_triangle(a, wall, c, 89.0));
    }

    #[test]
    fn test_rect_overlap() {
        let a = RectXZ::from_center_size(0.0, 0.0, 2.0, 2.0);
        let b = RectXZ::from_center_size(2.0, 0.0, 2.0, 2.0);
        let c = RectXZ::from_center_size(2.5, 0.0, 1.0, 1.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.expanded(1.0).overlaps(&c));
        assert!(a.contains(1.0, -1.0));
        assert_eq!(a.width(), 2.0);
    }
}
