//! Path queries over walkable cells
//!
//! Query points snap to the nearest cell inside a search box. A* runs over
//! the 8-connected cell graph without cutting corners, and the resulting cell
//! chain is straightened by skipping waypoints in direct line of sight.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec3;

use super::cells::CellGrid;

const WEST: usize = 0;
const SOUTH: usize = 1;
const EAST: usize = 2;
const NORTH: usize = 3;

/// Entry in the open list, ordered so the lowest `f` pops first
#[derive(Debug, Clone, Copy)]
struct HeapNode {
    index: usize,
    f: f32,
}

impl PartialEq for HeapNode {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f
    }
}

impl Eq for HeapNode {}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap
        other.f.total_cmp(&self.f)
    }
}

/// Nearest cell whose floor lies inside the box `p ± half_extents`, with
/// the closest point on that cell's floor.
///
/// A box outside the grid or a non-finite point finds nothing.
pub fn find_nearest_cell(grid: &CellGrid, p: Vec3, half_extents: Vec3) -> Option<(usize, Vec3)> {
    if grid.is_empty() || !p.is_finite() || !half_extents.is_finite() {
        return None;
    }
    let to_column = |v: f32, origin: f32| ((v - origin) / grid.cs).floor() as i32;
    let x0 = to_column(p.x - half_extents.x, grid.bmin.x);
    let x1 = to_column(p.x + half_extents.x, grid.bmin.x);
    let z0 = to_column(p.z - half_extents.z, grid.bmin.z);
    let z1 = to_column(p.z + half_extents.z, grid.bmin.z);
    if x1 < 0 || z1 < 0 || x0 >= grid.width || z0 >= grid.height {
        return None;
    }
    let (x0, x1) = (x0.max(0), x1.min(grid.width - 1));
    let (z0, z1) = (z0.max(0), z1.min(grid.height - 1));

    let mut best: Option<(usize, Vec3, f32)> = None;
    for z in z0..=z1 {
        for x in x0..=x1 {
            for i in grid.column_cells(x, z) {
                let y = grid.surface_y(i);
                if (y - p.y).abs() > half_extents.y {
                    continue;
                }
                let closest = closest_point_on_cell(grid, i, p);
                let d = closest.distance_squared(p);
                if best.map_or(true, |(_, _, bd)| d < bd) {
                    best = Some((i, closest, d));
                }
            }
        }
    }
    best.map(|(i, point, _)| (i, point))
}

/// Clamps `p` into the cell's column, slightly inset, at the floor height
fn closest_point_on_cell(grid: &CellGrid, i: usize, p: Vec3) -> Vec3 {
    let (min_x, min_z, max_x, max_z) = grid.column_bounds(i);
    let inset = grid.cs * 0.01;
    Vec3::new(
        p.x.clamp(min_x + inset, max_x - inset),
        grid.surface_y(i),
        p.z.clamp(min_z + inset, max_z - inset),
    )
}

fn neighbours8(grid: &CellGrid, i: usize) -> [Option<usize>; 8] {
    [
        grid.neighbour(i, WEST),
        grid.neighbour(i, SOUTH),
        grid.neighbour(i, EAST),
        grid.neighbour(i, NORTH),
        grid.diagonal(i, WEST, SOUTH),
        grid.diagonal(i, SOUTH, EAST),
        grid.diagonal(i, EAST, NORTH),
        grid.diagonal(i, NORTH, WEST),
    ]
}

/// A* from `start` to `goal` over cell centers
pub fn find_cell_path(grid: &CellGrid, start: usize, goal: usize) -> Option<Vec<usize>> {
    if start == goal {
        return Some(vec![start]);
    }
    // Regions are connected components
    if grid.cell(start).region != grid.cell(goal).region {
        return None;
    }

    let n = grid.len();
    let mut g_cost = vec![f32::INFINITY; n];
    let mut parent = vec![usize::MAX; n];
    let mut closed = vec![false; n];
    let mut open = BinaryHeap::new();
    let goal_pos = grid.center(goal);

    g_cost[start] = 0.0;
    open.push(HeapNode {
        index: start,
        f: grid.center(start).distance(goal_pos),
    });

    while let Some(HeapNode { index, .. }) = open.pop() {
        if closed[index] {
            continue;
        }
        closed[index] = true;

        if index == goal {
            let mut path = vec![goal];
            let mut cur = goal;
            while cur != start {
                cur = parent[cur];
                path.push(cur);
            }
            path.reverse();
            return Some(path);
        }

        let pos = grid.center(index);
        for next in neighbours8(grid, index).into_iter().flatten() {
            if closed[next] {
                continue;
            }
            let next_pos = grid.center(next);
            let cost = g_cost[index] + pos.distance(next_pos);
            if cost < g_cost[next] {
                g_cost[next] = cost;
                parent[next] = index;
                open.push(HeapNode {
                    index: next,
                    f: cost + next_pos.distance(goal_pos),
                });
            }
        }
    }

    None
}

/// True when walking straight from `from` in `from_cell` to `to` in
/// `to_cell` only crosses linked cells
pub fn is_line_clear(
    grid: &CellGrid,
    from_cell: usize,
    from: Vec3,
    to_cell: usize,
    to: Vec3,
) -> bool {
    let target = grid.cell(to_cell);
    let (mut x, mut z) = (grid.cell(from_cell).x, grid.cell(from_cell).z);
    let mut cur = from_cell;

    let d = to - from;
    let step_x = if d.x > 0.0 { 1 } else if d.x < 0.0 { -1 } else { 0 };
    let step_z = if d.z > 0.0 { 1 } else if d.z < 0.0 { -1 } else { 0 };
    let dir_x = if step_x > 0 { EAST } else { WEST };
    let dir_z = if step_z > 0 { SOUTH } else { NORTH };

    let boundary_t = |step: i32, cell: i32, origin: f32, start: f32, delta: f32| {
        if step == 0 {
            return f32::INFINITY;
        }
        let edge = if step > 0 { cell + 1 } else { cell };
        (origin + edge as f32 * grid.cs - start) / delta
    };
    let mut t_max_x = boundary_t(step_x, x, grid.bmin.x, from.x, d.x);
    let mut t_max_z = boundary_t(step_z, z, grid.bmin.z, from.z, d.z);
    let t_delta_x = if step_x == 0 { f32::INFINITY } else { grid.cs / d.x.abs() };
    let t_delta_z = if step_z == 0 { f32::INFINITY } else { grid.cs / d.z.abs() };

    let max_steps = (target.x - x).abs() + (target.z - z).abs();
    let mut steps = 0;
    const EPS: f32 = 1e-5;

    while (x, z) != (target.x, target.z) {
        if steps >= max_steps || t_max_x.min(t_max_z) > 1.0 + EPS {
            return false;
        }
        let next = if (t_max_x - t_max_z).abs() <= EPS {
            x += step_x;
            z += step_z;
            t_max_x += t_delta_x;
            t_max_z += t_delta_z;
            steps += 2;
            grid.diagonal(cur, dir_x, dir_z)
        } else if t_max_x < t_max_z {
            x += step_x;
            t_max_x += t_delta_x;
            steps += 1;
            grid.neighbour(cur, dir_x)
        } else {
            z += step_z;
            t_max_z += t_delta_z;
            steps += 1;
            grid.neighbour(cur, dir_z)
        };
        match next {
            Some(n) => cur = n,
            None => return false,
        }
    }

    cur == to_cell
}

/// Turns a cell chain into waypoints, keeping only the cells where the
/// straight line from the previous waypoint would leave the walkable area
pub fn string_pull(grid: &CellGrid, cells: &[usize], start: Vec3, goal: Vec3) -> Vec<Vec3> {
    let Some(&last_cell) = cells.last() else {
        return Vec::new();
    };
    if cells.len() == 1 {
        return vec![start, goal];
    }

    let last = cells.len() - 1;
    let point = |k: usize| {
        if k == 0 {
            start
        } else if k == last {
            goal
        } else {
            grid.center(cells[k])
        }
    };

    let mut points = vec![start];
    let mut anchor = 0;
    while anchor < last {
        let mut reach = anchor + 1;
        for k in anchor + 2..=last {
            if is_line_clear(grid, cells[anchor], point(anchor), cells[k], point(k)) {
                reach = k;
            } else {
                break;
            }
        }
        points.push(point(reach));
        anchor = reach;
    }
    debug_assert_eq!(cells[anchor], last_cell);
    points
}

#[cfg(test)]
mod tests {
    use super::super::heightfield::{Heightfield, WALKABLE_AREA};
    use super::*;

    /// Floor of `w` by `h` unit columns; `solid` columns get a tall block
    fn grid_with(w: i32, h: i32, solid: &[(i32, i32)]) -> CellGrid {
        let mut hf = Heightfield::new(
            w,
            h,
            Vec3::ZERO,
            Vec3::new(w as f32, 10.0, h as f32),
            1.0,
            1.0,
        );
        for z in 0..h {
            for x in 0..w {
                hf.add_span(x, z, 0, 1, WALKABLE_AREA, 1);
            }
        }
        for &(x, z) in solid {
            hf.add_span(x, z, 0, 8, 0, 1);
        }
        let mut grid = CellGrid::build(&hf, 2, 1);
        grid.build_regions(0, 0);
        grid
    }

    fn cell_at(grid: &CellGrid, x: i32, z: i32) -> usize {
        grid.column_cells(x, z).start
    }

    #[test]
    fn test_heap_pops_lowest_first() {
        let mut heap = BinaryHeap::new();
        for (index, f) in [(0, 3.0), (1, 1.0), (2, 2.0)] {
            heap.push(HeapNode { index, f });
        }
        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|n| n.index)).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_nearest_cell_snaps_onto_floor() {
        let grid = grid_with(4, 4, &[]);
        let (i, p) = find_nearest_cell(&grid, Vec3::new(1.5, 0.5, 2.5), Vec3::ONE).unwrap();
        assert_eq!((grid.cell(i).x, grid.cell(i).z), (1, 2));
        assert_eq!(p, Vec3::new(1.5, 1.0, 2.5));

        // Outside the grid, clamped into the border cell
        let (i, p) = find_nearest_cell(&grid, Vec3::new(-0.4, 1.0, 0.5), Vec3::ONE).unwrap();
        assert_eq!((grid.cell(i).x, grid.cell(i).z), (0, 0));
        assert!(p.x > 0.0 && p.x < 0.05);

        // Too far above the floor
        assert!(find_nearest_cell(&grid, Vec3::new(1.5, 5.0, 1.5), Vec3::ONE).is_none());
    }

    #[test]
    fn test_nearest_cell_outside_grid() {
        // Border columns are walkable here, so only the bounds check rejects these
        let grid = grid_with(4, 4, &[]);
        let extents = Vec3::ONE;
        assert!(find_nearest_cell(&grid, Vec3::new(-3.0, 1.0, 1.0), extents).is_none());
        assert!(find_nearest_cell(&grid, Vec3::new(6.0, 1.0, 1.0), extents).is_none());
        assert!(find_nearest_cell(&grid, Vec3::new(1.0, 1.0, 9.0), extents).is_none());
        // Overlapping the edge still snaps onto the border column
        let (_, p) = find_nearest_cell(&grid, Vec3::new(-0.5, 1.0, 1.5), extents).unwrap();
        assert!(p.x > 0.0 && p.x < 0.05);
    }

    #[test]
    fn test_nearest_cell_rejects_non_finite_point() {
        let grid = grid_with(4, 4, &[]);
        for p in [
            Vec3::new(f32::NAN, 1.0, 1.0),
            Vec3::new(1.0, f32::INFINITY, 1.0),
            Vec3::new(1.0, 1.0, f32::NEG_INFINITY),
        ] {
            assert!(find_nearest_cell(&grid, p, Vec3::ONE).is_none());
        }
    }

    #[test]
    fn test_path_around_wall() {
        // Wall along x = 2 with a gap at z = 4
        let wall: Vec<_> = (0..4).map(|z| (2, z)).collect();
        let grid = grid_with(5, 5, &wall);
        let start = cell_at(&grid, 0, 0);
        let goal = cell_at(&grid, 4, 0);

        let cells = find_cell_path(&grid, start, goal).unwrap();
        assert_eq!(cells.first(), Some(&start));
        assert_eq!(cells.last(), Some(&goal));
        assert!(cells.iter().all(|&c| grid.cell(c).x != 2 || grid.cell(c).z == 4));
        for pair in cells.windows(2) {
            let (a, b) = (grid.cell(pair[0]), grid.cell(pair[1]));
            assert!((a.x - b.x).abs() <= 1 && (a.z - b.z).abs() <= 1);
        }

        let points = string_pull(
            &grid,
            &cells,
            grid.center(start),
            grid.center(goal),
        );
        assert!(points.len() >= 3);
        assert!(points.len() < cells.len());
        assert_eq!(points[0], grid.center(start));
        assert_eq!(*points.last().unwrap(), grid.center(goal));
    }

    #[test]
    fn test_no_corner_cutting() {
        // Blocks at (1,0) and (0,1) leave only a diagonal between (0,0) and (1,1)
        let grid = grid_with(3, 3, &[(1, 0), (0, 1)]);
        let start = cell_at(&grid, 0, 0);
        assert!(grid.diagonal(start, EAST, SOUTH).is_none());
        let goal = cell_at(&grid, 2, 2);
        assert!(find_cell_path(&grid, start, goal).is_none());
    }

    #[test]
    fn test_line_of_sight() {
        let grid = grid_with(5, 5, &[(2, 2)]);
        let a = cell_at(&grid, 0, 2);
        let b = cell_at(&grid, 4, 2);
        assert!(!is_line_clear(&grid, a, grid.center(a), b, grid.center(b)));

        let c = cell_at(&grid, 0, 0);
        let d = cell_at(&grid, 4, 0);
        assert!(is_line_clear(&grid, c, grid.center(c), d, grid.center(d)));
        assert!(is_line_clear(&grid, d, grid.center(d), c, grid.center(c)));

        // Exact diagonal through open corners
        let e = cell_at(&grid, 0, 4);
        let f = cell_at(&grid, 1, 3);
        assert!(is_line_clear(&grid, e, grid.center(e), f, grid.center(f)));
    }

    #[test]
    fn test_straight_path_collapses() {
        let grid = grid_with(6, 3, &[]);
        let start = cell_at(&grid, 0, 1);
        let goal = cell_at(&grid, 5, 1);
        let cells = find_cell_path(&grid, start, goal).unwrap();
        assert_eq!(cells.len(), 6);
        let points = string_pull(&grid, &cells, grid.center(start), grid.center(goal));
        assert_eq!(points, vec![grid.center(start), grid.center(goal)]);
    }
}
