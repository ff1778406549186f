use std::collections::{HashMap, VecDeque};

use glam::{Vec2, Vec3, Vec3Swizzles};
use mazenav_common::RectXZ;
use mazenav_geometry::{build_scene, GeometryBuilder, SceneConfig};
use mazenav_maze::{Direction, MazeGrid};
use mazenav_navmesh::{NavMeshBuilder, NavMeshConfig, NavMeshError};

/// Cells on the maze route between two cells
fn maze_route(maze: &MazeGrid, from: (usize, usize), to: (usize, usize)) -> Vec<(usize, usize)> {
    let mut parent = HashMap::new();
    let mut queue = VecDeque::from([from]);
    parent.insert(from, from);
    while let Some(cell) = queue.pop_front() {
        if cell == to {
            break;
        }
        for dir in Direction::ALL {
            if maze.has_wall(cell.0, cell.1, dir) {
                continue;
            }
            if let Some(next) = maze.neighbor(cell.0, cell.1, dir) {
                if !parent.contains_key(&next) {
                    parent.insert(next, cell);
                    queue.push_back(next);
                }
            }
        }
    }

    let mut route = vec![to];
    let mut cell = to;
    while cell != from {
        cell = parent[&cell];
        route.push(cell);
    }
    route.reverse();
    route
}

/// Cell with the longest route from (0, 0) that keeps clear of the ramp,
/// which narrows the ground corridors it sits in
fn far_cell_clear_of(maze: &MazeGrid, hole: &RectXZ) -> (usize, usize) {
    let cs = maze.cell_size();
    let near_hole = |&(x, y): &(usize, usize)| {
        let c = maze.cell_center(x, y);
        RectXZ::from_center_size(c.x, c.z, cs, cs)
            .expanded(cs * 0.5)
            .overlaps(hole)
    };
    (0..maze.height())
        .flat_map(|y| (0..maze.width()).map(move |x| (x, y)))
        .map(|cell| maze_route(maze, (0, 0), cell))
        .filter(|route| !route.iter().any(near_hole))
        .max_by_key(Vec::len)
        .and_then(|route| route.last().copied())
        .unwrap()
}

#[test]
fn test_quad_corner_to_corner() {
    let mut geometry = GeometryBuilder::new();
    geometry.append_plane(Vec3::ZERO, Vec2::splat(2.0));
    let soup = geometry.into_soup();

    let config = NavMeshConfig {
        cell_size: 0.1,
        ..Default::default()
    };
    let navmesh = NavMeshBuilder::new().build_soup(&soup, &config).unwrap();

    let path = navmesh
        .find_path(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0))
        .expect("corners are connected");
    assert!(!path.is_empty());
    for p in [path.start(), path.goal()] {
        assert!(p.x >= -1.0 && p.x <= 1.0);
        assert!(p.z >= -1.0 && p.z <= 1.0);
        assert!(p.y >= 0.0 && p.y <= config.cell_height + 1e-4);
    }
    assert!(path.start().x < 0.0 && path.goal().x > 0.0);
}

#[test]
fn test_empty_soup_is_invalid_input() {
    let soup = GeometryBuilder::new().into_soup();
    let err = NavMeshBuilder::new()
        .build_soup(&soup, &NavMeshConfig::default())
        .unwrap_err();
    assert!(matches!(err, NavMeshError::InvalidInput(_)));
}

#[test]
fn test_wall_only_geometry_fails_in_engine() {
    let mut geometry = GeometryBuilder::new();
    geometry.append_box(Vec3::new(0.0, 0.5, 0.0), Vec3::new(2.0, 1.0, 0.1));
    let err = NavMeshBuilder::new()
        .build_soup(&geometry.into_soup(), &NavMeshConfig::default())
        .unwrap_err();
    assert!(matches!(err, NavMeshError::Engine(_)));
    assert_eq!(err.to_string(), "no walkable spans survived voxelization");
}

#[test]
fn test_maze_ground_floor_is_connected() {
    let config = SceneConfig::default();
    let maze = MazeGrid::generate(config.maze.clone()).unwrap();
    let scene = build_scene(&maze, &config);

    let navmesh = NavMeshBuilder::new()
        .build_soup(&scene.nav_geometry, &NavMeshConfig::default())
        .unwrap();

    let (tx, ty) = far_cell_clear_of(&maze, &scene.ramp_hole);
    assert!(maze_route(&maze, (0, 0), (tx, ty)).len() >= 4);
    let target = maze.cell_center(tx, ty);

    let path = navmesh
        .find_path(scene.spawn, target)
        .expect("maze corridors are walkable");
    assert!(path.len() >= 2);
    assert!(path.start().xz().distance(scene.spawn.xz()) < 0.1);
    assert!(path.goal().xz().distance(target.xz()) < 0.1);
    // Stays on the ground floor
    assert!(path.points().iter().all(|p| p.y < 0.2));
    assert!(path.length() + 1e-4 >= path.start().distance(path.goal()));

    let debug = navmesh.debug_triangles();
    assert!(debug.triangle_count() > 0);
    assert!(debug.validate().is_ok());
}

#[test]
fn test_ramp_joins_ground_and_upper_floor() {
    let config = SceneConfig::default();
    let maze = MazeGrid::generate(config.maze.clone()).unwrap();
    let scene = build_scene(&maze, &config);
    let hole = scene.ramp_hole;
    let z = (hole.min_z + hole.max_z) * 0.5;
    let start = Vec3::new(hole.min_x + 0.1, 0.0, z);
    let goal = Vec3::new(hole.max_x + 0.15, config.upper_floor_y, z);

    for nav_config in [
        NavMeshConfig::default(),
        NavMeshConfig {
            debug_disable_erosion: true,
            ..Default::default()
        },
    ] {
        let navmesh = NavMeshBuilder::new()
            .build_soup(&scene.nav_geometry, &nav_config)
            .unwrap();
        let path = navmesh
            .find_path(start, goal)
            .expect("ramp is walkable");
        assert!(path.start().y < 0.1);
        assert!((path.goal().y - config.upper_floor_y).abs() < 0.1);
        assert!(path.goal().x > hole.max_x);
        assert!(path.goal().xz().distance(goal.xz()) < 0.1);
    }
}

#[test]
fn test_huge_plane_is_an_engine_error() {
    let mut geometry = GeometryBuilder::new();
    geometry.append_plane(Vec3::ZERO, Vec2::splat(5000.0));
    let err = NavMeshBuilder::new()
        .build_soup(&geometry.into_soup(), &NavMeshConfig::default())
        .unwrap_err();
    assert!(matches!(err, NavMeshError::Engine(_)));
    assert!(err.to_string().starts_with("heightfield too large"));
}

#[test]
fn test_debug_override_keeps_more_cells() {
    let config = SceneConfig::default();
    let maze = MazeGrid::generate(config.maze.clone()).unwrap();
    let scene = build_scene(&maze, &config);

    let eroded = NavMeshBuilder::new()
        .build_soup(&scene.nav_geometry, &NavMeshConfig::default())
        .unwrap();
    let raw = NavMeshBuilder::new()
        .build_soup(
            &scene.nav_geometry,
            &NavMeshConfig {
                debug_disable_erosion: true,
                ..Default::default()
            },
        )
        .unwrap();

    let area = |soup: &mazenav_common::TriangleSoup| -> f32 {
        soup.triangles()
            .map(|[a, b, c]| (b - a).cross(c - a).length() * 0.5)
            .sum()
    };
    assert!(area(&raw.debug_triangles()) > area(&eroded.debug_triangles()));
}
