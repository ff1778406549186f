use std::collections::{HashMap, VecDeque};

use glam::{Vec3, Vec3Swizzles};
use mazenav_agent::{AgentParams, AgentStep};
use mazenav_geometry::SceneConfig;
use mazenav_common::RectXZ;
use mazenav_maze::{Direction, MazeGrid};
use mazenav_navmesh::{NavMeshConfig, VoxelEngine};
use mazenav_scene::{MazeScene, NAVMESH_DEBUG_LIFT};

const DT: f32 = 1.0 / 60.0;

fn default_scene() -> MazeScene {
    MazeScene::setup(
        SceneConfig::default(),
        NavMeshConfig::default(),
        AgentParams::default(),
        VoxelEngine::new(),
    )
    .unwrap()
}

/// Maze cells from (0, 0) to every cell, by breadth-first search
fn maze_routes(maze: &MazeGrid) -> HashMap<(usize, usize), Vec<(usize, usize)>> {
    let mut routes = HashMap::from([((0, 0), vec![(0, 0)])]);
    let mut queue = VecDeque::from([(0, 0)]);
    while let Some(cell) = queue.pop_front() {
        let route = routes[&cell].clone();
        for dir in Direction::ALL {
            if maze.has_wall(cell.0, cell.1, dir) {
                continue;
            }
            if let Some(next) = maze.neighbor(cell.0, cell.1, dir) {
                if !routes.contains_key(&next) {
                    let mut extended = route.clone();
                    extended.push(next);
                    routes.insert(next, extended);
                    queue.push_back(next);
                }
            }
        }
    }
    routes
}

/// Farthest cell whose route from the spawn cell keeps clear of the ramp
fn far_target(scene: &MazeScene) -> Vec3 {
    let maze = scene.maze();
    let cs = maze.cell_size();
    let hole = scene.scene().ramp_hole;
    let near_hole = |&(x, y): &(usize, usize)| {
        let c = maze.cell_center(x, y);
        RectXZ::from_center_size(c.x, c.z, cs, cs)
            .expanded(cs * 0.5)
            .overlaps(&hole)
    };

    let route = maze_routes(maze)
        .into_values()
        .filter(|route| !route.iter().any(near_hole))
        .max_by_key(|route| (route.len(), route.last().copied()))
        .unwrap();
    assert!(route.len() >= 4);
    let (x, y) = route[route.len() - 1];
    maze.cell_center(x, y)
}

fn run_until_idle(scene: &mut MazeScene) -> usize {
    let mut ticks = 0;
    while !scene.agent().is_idle() {
        scene.tick(DT);
        ticks += 1;
        assert!(ticks < 200_000, "agent never arrived");
    }
    ticks
}

#[test]
fn test_walk_to_far_cell() {
    let mut scene = default_scene();
    let target = far_target(&scene);

    let path = scene.tap(target).expect("maze corridors are walkable").clone();
    assert!(path.len() >= 2);
    assert!(!scene.agent().is_idle());

    let ticks = run_until_idle(&mut scene);
    assert!(ticks > 1);

    let end = scene.agent().position();
    assert!(end.distance(path.goal() + Vec3::new(0.0, 0.06, 0.0)) < 0.02);
    assert!(end.xz().distance(target.xz()) < 0.1);
    assert_eq!(scene.tick(DT), AgentStep::Idle);
}

#[test]
fn test_retarget_mid_walk() {
    let mut scene = default_scene();
    let maze = scene.maze().clone();

    let target = far_target(&scene);
    scene.tap(target).expect("maze corridors are walkable");
    for _ in 0..120 {
        scene.tick(DT);
    }
    assert!(!scene.agent().is_idle());

    let home = maze.cell_center(0, 0);
    let path = scene.tap(home).expect("spawn cell is reachable").clone();
    assert_eq!(scene.agent().path_index(), 0);
    assert_eq!(scene.agent().path().len(), path.len());

    run_until_idle(&mut scene);
    assert!(scene.agent().position().xz().distance(home.xz()) < 0.1);
}

#[test]
fn test_walk_up_the_ramp() {
    let mut scene = default_scene();
    let upper_floor_y = SceneConfig::default().upper_floor_y;
    let hole = scene.scene().ramp_hole;
    let z = (hole.min_z + hole.max_z) * 0.5;

    // Ground at the foot of the ramp, then the upper floor past its top
    scene.respawn(Vec3::new(hole.min_x + 0.1, 0.06, z));
    let target = Vec3::new(hole.max_x + 0.15, upper_floor_y, z);
    let path = scene.tap(target).expect("ramp joins the floors").clone();
    assert!(path.start().y < 0.1);
    assert!((path.goal().y - upper_floor_y).abs() < 0.1);

    run_until_idle(&mut scene);

    let end = scene.agent().position();
    assert!(end.distance(path.goal() + Vec3::new(0.0, 0.06, 0.0)) < 0.02);
    assert!(end.y > upper_floor_y);
    assert!(end.x > hole.max_x);
}

#[test]
fn test_tap_off_mesh_keeps_agent_still() {
    let mut scene = default_scene();
    let spawn = scene.agent().position();

    assert!(scene.tap(Vec3::new(25.0, 0.0, 25.0)).is_none());
    for _ in 0..10 {
        assert_eq!(scene.tick(DT), AgentStep::Idle);
    }
    assert_eq!(scene.agent().position(), spawn);
    assert!(scene.marker_pose().is_some());
}

#[test]
fn test_navmesh_debug_sits_above_floor() {
    let scene = default_scene();
    let debug = scene.navmesh_debug();
    assert!(debug.triangle_count() > 0);
    assert!(debug.validate().is_ok());

    let (min, _) = debug.calculate_bounds();
    assert!(min.y >= NAVMESH_DEBUG_LIFT - 1e-4);
}
