//! Axis-aligned wall boxes derived from a maze

use glam::Vec3;
use mazenav_common::RectXZ;

use crate::direction::Direction;
use crate::grid::MazeGrid;

/// One wall segment as an axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallBox {
    /// Center of the box
    pub center: Vec3,
    /// Full extents of the box
    pub size: Vec3,
}

impl WallBox {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    /// The box's footprint on the floor plane
    pub fn footprint(&self) -> RectXZ {
        RectXZ::from_center_size(self.center.x, self.center.z, self.size.x, self.size.z)
    }

    /// Closed-interval overlap of the footprint with `rect`
    pub fn intersects_xz(&self, rect: &RectXZ) -> bool {
        self.footprint().overlaps(rect)
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            center: self.center + offset,
            size: self.size,
        }
    }
}

impl MazeGrid {
    /// Derives wall boxes with cell (0, 0)'s corner at `origin`.
    ///
    /// North and west walls come from the owning cell; south and east walls
    /// only along the outer boundary, so every wall segment appears once.
    pub fn wall_boxes(&self, origin: Vec3) -> Vec<WallBox> {
        let params = self.params();
        let cs = params.cell_size;
        let thickness = params.wall_thickness;
        let wall_height = params.wall_height;
        let center_y = origin.y + wall_height * 0.5;

        let along_x = Vec3::new(cs, wall_height, thickness);
        let along_z = Vec3::new(thickness, wall_height, cs);

        let (w, h) = (self.width(), self.height());
        let mut boxes = Vec::new();

        for y in 0..h {
            for x in 0..w {
                let corner_x = origin.x + x as f32 * cs;
                let corner_z = origin.z + y as f32 * cs;
                let walls = self.walls(x, y);

                if walls.has(Direction::North) {
                    boxes.push(WallBox::new(
                        Vec3::new(corner_x + cs * 0.5, center_y, corner_z),
                        along_x,
                    ));
                }
                if walls.has(Direction::West) {
                    boxes.push(WallBox::new(
                        Vec3::new(corner_x, center_y, corner_z + cs * 0.5),
                        along_z,
                    ));
                }
                if y == h - 1 && walls.has(Direction::South) {
                    boxes.push(WallBox::new(
                        Vec3::new(corner_x + cs * 0.5, center_y, corner_z + cs),
                        along_x,
                    ));
                }
                if x == w - 1 && walls.has(Direction::East) {
                    boxes.push(WallBox::new(
                        Vec3::new(corner_x + cs, center_y, corner_z + cs * 0.5),
                        along_z,
                    ));
                }
            }
        }

        boxes
    }
}
