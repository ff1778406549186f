//! Accumulating triangle soup builder

use glam::{Vec2, Vec3};
use mazenav_common::TriangleSoup;

/// Owns growable vertex and index buffers that successive `append_*` calls
/// fill. Each call returns the index of its first vertex, or `None` when the
/// shape was degenerate and nothing was emitted.
#[derive(Debug, Clone, Default)]
pub struct GeometryBuilder {
    soup: TriangleSoup,
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

impl GeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues appending onto an existing soup
    pub fn from_soup(soup: TriangleSoup) -> Self {
        Self { soup }
    }

    pub fn vertex_count(&self) -> usize {
        self.soup.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.soup.triangle_count()
    }

    pub fn soup(&self) -> &TriangleSoup {
        &self.soup
    }

    pub fn into_soup(self) -> TriangleSoup {
        self.soup
    }

    /// Horizontal quad at `center.y` spanning `size.x` by `size.y` (world z),
    /// wound so its normal points +Y.
    pub fn append_plane(&mut self, center: Vec3, size: Vec2) -> Option<i32> {
        if !(positive(size.x) && positive(size.y)) {
            return None;
        }
        let hx = size.x * 0.5;
        let hz = size.y * 0.5;

        let base = self.soup.push_vertex(center + Vec3::new(-hx, 0.0, -hz));
        self.soup.push_vertex(center + Vec3::new(hx, 0.0, -hz));
        self.soup.push_vertex(center + Vec3::new(hx, 0.0, hz));
        self.soup.push_vertex(center + Vec3::new(-hx, 0.0, hz));

        self.soup.push_triangle(base, base + 2, base + 1);
        self.soup.push_triangle(base, base + 3, base + 2);
        Some(base)
    }

    /// Box side faces only. Top and bottom caps are left out so a wall never
    /// contributes a horizontal surface of its own.
    pub fn append_box(&mut self, center: Vec3, size: Vec3) -> Option<i32> {
        if !(positive(size.x) && positive(size.y) && positive(size.z)) {
            return None;
        }
        let h = size * 0.5;

        // 0..4 bottom ring, 4..8 top ring
        let base = self.soup.push_vertex(center + Vec3::new(-h.x, -h.y, -h.z));
        self.soup.push_vertex(center + Vec3::new(h.x, -h.y, -h.z));
        self.soup.push_vertex(center + Vec3::new(h.x, -h.y, h.z));
        self.soup.push_vertex(center + Vec3::new(-h.x, -h.y, h.z));
        self.soup.push_vertex(center + Vec3::new(-h.x, h.y, -h.z));
        self.soup.push_vertex(center + Vec3::new(h.x, h.y, -h.z));
        self.soup.push_vertex(center + Vec3::new(h.x, h.y, h.z));
        self.soup.push_vertex(center + Vec3::new(-h.x, h.y, h.z));

        const SIDES: [[i32; 3]; 8] = [
            // +Z
            [3, 2, 6],
            [3, 6, 7],
            // -Z
            [0, 5, 1],
            [0, 4, 5],
            // -X
            [0, 3, 7],
            [0, 7, 4],
            // +X
            [1, 6, 2],
            [1, 5, 6],
        ];
        for [a, b, c] in SIDES {
            self.soup.push_triangle(base + a, base + b, base + c);
        }
        Some(base)
    }

    /// Inclined quad centred on `origin`, rising along +X from `origin.y` at
    /// `-length/2` to `origin.y + height` at `+length/2`. Wound +Y so the
    /// incline itself is walkable. `height` may be zero or negative.
    pub fn append_ramp_top(
        &mut self,
        origin: Vec3,
        length: f32,
        width: f32,
        height: f32,
    ) -> Option<i32> {
        if !(positive(length) && positive(width) && height.is_finite()) {
            return None;
        }
        let hx = length * 0.5;
        let hz = width * 0.5;

        let base = self.soup.push_vertex(origin + Vec3::new(-hx, 0.0, -hz));
        self.soup.push_vertex(origin + Vec3::new(hx, height, -hz));
        self.soup.push_vertex(origin + Vec3::new(hx, height, hz));
        self.soup.push_vertex(origin + Vec3::new(-hx, 0.0, hz));

        self.soup.push_triangle(base, base + 2, base + 1);
        self.soup.push_triangle(base, base + 3, base + 2);
        Some(base)
    }
}
