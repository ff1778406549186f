//! Two-storey maze scene layout
//!
//! The ground floor holds the generated maze. A copy of the maze walls sits
//! on an upper floor shifted along +X, and a ramp climbs from the ground
//! through a hole in the upper floor. Walls overlapping the ramp hole are left
//! out on both storeys so the ramp stays reachable.

use glam::{Vec2, Vec3};
use mazenav_common::{RectXZ, TriangleSoup};
use mazenav_maze::{MazeGrid, MazeParams};

use crate::builder::GeometryBuilder;

/// Layout parameters for the scene around a maze
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SceneConfig {
    /// Maze size, seed and wall dimensions
    pub maze: MazeParams,
    /// Height of the upper floor surface
    pub upper_floor_y: f32,
    /// Upper floor shift along +X as a fraction of the floor width
    pub upper_floor_offset_ratio: f32,
    /// Ramp length in cells
    pub ramp_length_cells: f32,
    /// Ramp width in cells
    pub ramp_width_cells: f32,
    /// Ramp center, in cells from the maze origin (before the upper floor shift)
    pub ramp_cell: Vec2,
    /// Height of the spawned character's center above the floor
    pub spawn_height: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            maze: MazeParams::default(),
            upper_floor_y: 0.4,
            upper_floor_offset_ratio: 0.6,
            ramp_length_cells: 3.0,
            ramp_width_cells: 0.8,
            ramp_cell: Vec2::new(2.0, 2.0),
            spawn_height: 0.06,
        }
    }
}

/// What a scene element represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneElementKind {
    GroundFloor,
    UpperFloor,
    GroundWall,
    UpperWall,
    Ramp,
}

/// Primitive shape of a scene element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Plane {
        center: Vec3,
        size: Vec2,
    },
    Box {
        center: Vec3,
        size: Vec3,
    },
    RampTop {
        origin: Vec3,
        length: f32,
        width: f32,
        height: f32,
    },
}

impl Shape {
    /// Appends the shape's navmesh triangles
    pub fn append_to(&self, builder: &mut GeometryBuilder) -> Option<i32> {
        match *self {
            Shape::Plane { center, size } => builder.append_plane(center, size),
            Shape::Box { center, size } => builder.append_box(center, size),
            Shape::RampTop {
                origin,
                length,
                width,
                height,
            } => builder.append_ramp_top(origin, length, width, height),
        }
    }

    /// True when the shape has no area and emits nothing
    pub fn is_degenerate(&self) -> bool {
        match *self {
            Shape::Plane { size, .. } => !(size.x > 0.0 && size.y > 0.0),
            Shape::Box { size, .. } => !(size.x > 0.0 && size.y > 0.0 && size.z > 0.0),
            Shape::RampTop { length, width, .. } => !(length > 0.0 && width > 0.0),
        }
    }
}

/// A renderable piece of the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneElement {
    pub kind: SceneElementKind,
    pub shape: Shape,
}

/// The assembled scene: render elements plus the navmesh input built from
/// the same shapes
#[derive(Debug, Clone)]
pub struct Scene {
    pub elements: Vec<SceneElement>,
    pub nav_geometry: TriangleSoup,
    /// Starting position for the character
    pub spawn: Vec3,
    /// Ramp footprint grown by the wall thickness
    pub ramp_hole: RectXZ,
    /// Ground floor outline
    pub ground_bounds: RectXZ,
    /// Upper floor outline, including the hole
    pub upper_bounds: RectXZ,
}

impl Scene {
    /// Elements of one kind
    pub fn elements_of(&self, kind: SceneElementKind) -> impl Iterator<Item = &SceneElement> {
        self.elements.iter().filter(move |e| e.kind == kind)
    }
}

/// Lays out the scene for `maze` and synthesizes its navmesh geometry
pub fn build_scene(maze: &MazeGrid, config: &SceneConfig) -> Scene {
    let params = maze.params();
    let cs = params.cell_size;
    let thickness = params.wall_thickness;
    let origin = maze.origin();

    let floor_size = Vec2::new(maze.width() as f32 * cs, maze.height() as f32 * cs);
    let floor_center = origin + Vec3::new(floor_size.x * 0.5, 0.0, floor_size.y * 0.5);
    let ground_bounds =
        RectXZ::from_center_size(floor_center.x, floor_center.z, floor_size.x, floor_size.y);

    let upper_offset_x = floor_size.x * config.upper_floor_offset_ratio;
    let upper_y = config.upper_floor_y;
    let upper_bounds = RectXZ {
        min_x: ground_bounds.min_x + upper_offset_x,
        max_x: ground_bounds.max_x + upper_offset_x,
        ..ground_bounds
    };

    let ramp_length = cs * config.ramp_length_cells;
    let ramp_width = cs * config.ramp_width_cells;
    let ramp_origin = Vec3::new(
        origin.x + cs * config.ramp_cell.x + upper_offset_x,
        origin.y,
        origin.z + cs * config.ramp_cell.y,
    );
    let ramp_hole = RectXZ::from_center_size(ramp_origin.x, ramp_origin.z, ramp_length, ramp_width)
        .expanded(thickness);

    let mut elements = Vec::new();
    let mut push = |kind: SceneElementKind, shape: Shape| {
        if !shape.is_degenerate() {
            elements.push(SceneElement { kind, shape });
        }
    };

    push(
        SceneElementKind::GroundFloor,
        Shape::Plane {
            center: floor_center,
            size: floor_size,
        },
    );

    // Upper floor as four pieces framing the ramp hole
    let upper_pieces = [
        RectXZ {
            min_x: upper_bounds.min_x,
            max_x: ramp_hole.min_x,
            ..upper_bounds
        },
        RectXZ {
            min_x: ramp_hole.max_x,
            max_x: upper_bounds.max_x,
            ..upper_bounds
        },
        RectXZ {
            min_x: ramp_hole.min_x,
            max_x: ramp_hole.max_x,
            min_z: upper_bounds.min_z,
            max_z: ramp_hole.min_z,
        },
        RectXZ {
            min_x: ramp_hole.min_x,
            max_x: ramp_hole.max_x,
            min_z: ramp_hole.max_z,
            max_z: upper_bounds.max_z,
        },
    ];
    for piece in upper_pieces {
        push(
            SceneElementKind::UpperFloor,
            Shape::Plane {
                center: Vec3::new(
                    (piece.min_x + piece.max_x) * 0.5,
                    origin.y + upper_y,
                    (piece.min_z + piece.max_z) * 0.5,
                ),
                size: Vec2::new(piece.width(), piece.depth()),
            },
        );
    }

    let walls = maze.wall_boxes(origin);
    let upper_shift = Vec3::new(upper_offset_x, upper_y, 0.0);
    for wall in &walls {
        if !wall.intersects_xz(&ramp_hole) {
            push(
                SceneElementKind::GroundWall,
                Shape::Box {
                    center: wall.center,
                    size: wall.size,
                },
            );
        }
    }
    for wall in &walls {
        let upper = wall.translated(upper_shift);
        if !upper.intersects_xz(&ramp_hole) {
            push(
                SceneElementKind::UpperWall,
                Shape::Box {
                    center: upper.center,
                    size: upper.size,
                },
            );
        }
    }

    push(
        SceneElementKind::Ramp,
        Shape::RampTop {
            origin: ramp_origin,
            length: ramp_length,
            width: ramp_width,
            height: upper_y,
        },
    );

    let mut builder = GeometryBuilder::new();
    for element in &elements {
        element.shape.append_to(&mut builder);
    }
    let nav_geometry = builder.into_soup();

    let spawn = maze.cell_center(0, 0) + Vec3::new(0.0, config.spawn_height, 0.0);

    log::debug!(
        "scene: {} elements, {} vertices, {} triangles",
        elements.len(),
        nav_geometry.vertex_count(),
        nav_geometry.triangle_count()
    );

    Scene {
        elements,
        nav_geometry,
        spawn,
        ramp_hole,
        ground_bounds,
        upper_bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazenav_common::triangle_normal;

    fn default_scene() -> (MazeGrid, Scene) {
        let config = SceneConfig::default();
        let maze = MazeGrid::generate(config.maze.clone()).unwrap();
        let scene = build_scene(&maze, &config);
        (maze, scene)
    }

    #[test]
    fn test_default_layout() {
        let (_, scene) = default_scene();
        assert_eq!(scene.elements_of(SceneElementKind::GroundFloor).count(), 1);
        assert_eq!(scene.elements_of(SceneElementKind::UpperFloor).count(), 4);
        assert_eq!(scene.elements_of(SceneElementKind::Ramp).count(), 1);

        let hole = scene.ramp_hole;
        assert!((hole.min_x - 0.58).abs() < 1e-4);
        assert!((hole.max_x - 2.03).abs() < 1e-4);
        assert!((hole.min_z - -1.355).abs() < 1e-4);
        assert!((hole.max_z - -0.895).abs() < 1e-4);
    }

    #[test]
    fn test_walls_avoid_ramp_hole() {
        let (maze, scene) = default_scene();
        let total = maze.wall_boxes(maze.origin()).len();

        let ground: Vec<_> = scene.elements_of(SceneElementKind::GroundWall).collect();
        let upper: Vec<_> = scene.elements_of(SceneElementKind::UpperWall).collect();
        assert!(ground.len() <= total);
        assert!(upper.len() < total);

        for element in ground.iter().chain(upper.iter()) {
            if let Shape::Box { center, size } = element.shape {
                let fp = RectXZ::from_center_size(center.x, center.z, size.x, size.z);
                assert!(!fp.overlaps(&scene.ramp_hole));
            } else {
                panic!("wall element is not a box");
            }
        }
        for element in upper {
            if let Shape::Box { center, size } = element.shape {
                assert!((center.y - (0.4 + size.y * 0.5)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_upper_floor_pieces_frame_hole() {
        let (_, scene) = default_scene();
        let mut area = 0.0;
        for element in scene.elements_of(SceneElementKind::UpperFloor) {
            match element.shape {
                Shape::Plane { center, size } => {
                    assert!((center.y - 0.4).abs() < 1e-6);
                    let rect = RectXZ::from_center_size(center.x, center.z, size.x, size.y);
                    assert!(rect.width() > 0.0 && rect.depth() > 0.0);
                    // Pieces may touch the hole edge but not cover its interior
                    let inner = scene.ramp_hole.expanded(-1e-3);
                    assert!(!rect.overlaps(&inner));
                    area += size.x * size.y;
                }
                _ => panic!("upper floor piece is not a plane"),
            }
        }
        let upper_area = scene.upper_bounds.width() * scene.upper_bounds.depth();
        let hole_area = scene.ramp_hole.width() * scene.ramp_hole.depth();
        assert!((area - (upper_area - hole_area)).abs() < 1e-3);
    }

    #[test]
    fn test_nav_geometry_matches_elements() {
        let (_, scene) = default_scene();
        let mut expected_tris = 0;
        for element in &scene.elements {
            expected_tris += match element.shape {
                Shape::Plane { .. } | Shape::RampTop { .. } => 2,
                Shape::Box { .. } => 8,
            };
        }
        assert_eq!(scene.nav_geometry.triangle_count(), expected_tris);
        assert!(scene.nav_geometry.validate().is_ok());

        // Every horizontal or inclined triangle faces up
        for [a, b, c] in scene.nav_geometry.triangles() {
            let n = triangle_normal(a, b, c);
            assert!(n.y >= -1e-6);
        }
    }

    #[test]
    fn test_spawn_in_first_cell() {
        let (maze, scene) = default_scene();
        let c = maze.cell_center(0, 0);
        assert_eq!(scene.spawn, c + Vec3::new(0.0, 0.06, 0.0));
        assert!(scene.ground_bounds.contains(scene.spawn.x, scene.spawn.z));
    }

    #[test]
    fn test_small_maze_skips_degenerate_pieces() {
        let config = SceneConfig {
            maze: MazeParams::new(2, 2, 1),
            ..Default::default()
        };
        let maze = MazeGrid::generate(config.maze.clone()).unwrap();
        let scene = build_scene(&maze, &config);
        assert!(scene
            .elements
            .iter()
            .all(|e| !e.shape.is_degenerate()));
        assert!(scene.nav_geometry.validate().is_ok());
    }
}
