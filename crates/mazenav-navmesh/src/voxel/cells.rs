//! Walkable cells built from the filtered heightfield
//!
//! A cell is the open space on top of a walkable span. Cells link to at most
//! one cell in each of the four neighbouring columns.

use std::collections::VecDeque;
use std::ops::Range;

use glam::Vec3;

use super::heightfield::{Heightfield, NULL_AREA};

const MAX_HEIGHT: i32 = 0xffff;

/// Column offsets per direction
pub const DIR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Region id of cells not assigned to any region
pub const NO_REGION: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavCell {
    pub x: i32,
    pub z: i32,
    /// Floor height in voxels
    pub y: i32,
    /// Free space above the floor in voxels
    pub h: i32,
    pub con: [Option<u32>; 4],
    pub region: u32,
}

/// Region statistics after flood fill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionStats {
    pub regions: usize,
    pub removed_regions: usize,
    pub removed_cells: usize,
    /// Surviving regions below the merge threshold
    pub merge_candidates: usize,
}

#[derive(Debug, Clone)]
pub struct CellGrid {
    pub width: i32,
    pub height: i32,
    pub bmin: Vec3,
    pub cs: f32,
    pub ch: f32,
    /// Start and count of each column's cells
    columns: Vec<(u32, u32)>,
    cells: Vec<NavCell>,
}

impl CellGrid {
    /// Collects the walkable spans of `hf` and links neighbours that share
    /// `walkable_height` of clearance and differ by at most `walkable_climb`.
    pub fn build(hf: &Heightfield, walkable_height: i32, walkable_climb: i32) -> Self {
        let mut columns = Vec::with_capacity((hf.width * hf.height) as usize);
        let mut cells = Vec::new();

        for z in 0..hf.height {
            for x in 0..hf.width {
                let start = cells.len() as u32;
                let column = hf.column(x, z);
                for (i, span) in column.iter().enumerate() {
                    if span.area == NULL_AREA {
                        continue;
                    }
                    let floor = span.max as i32;
                    let ceiling = column.get(i + 1).map_or(MAX_HEIGHT, |n| n.min as i32);
                    cells.push(NavCell {
                        x,
                        z,
                        y: floor,
                        h: ceiling - floor,
                        con: [None; 4],
                        region: NO_REGION,
                    });
                }
                columns.push((start, cells.len() as u32 - start));
            }
        }

        let mut grid = Self {
            width: hf.width,
            height: hf.height,
            bmin: hf.bmin,
            cs: hf.cs,
            ch: hf.ch,
            columns,
            cells,
        };
        grid.link(walkable_height, walkable_climb);
        grid
    }

    fn link(&mut self, walkable_height: i32, walkable_climb: i32) {
        for i in 0..self.cells.len() {
            let cell = self.cells[i];
            for (dir, (dx, dz)) in DIR_OFFSETS.iter().enumerate() {
                let found = self.column_cells(cell.x + dx, cell.z + dz).find(|&j| {
                    let n = &self.cells[j];
                    let bot = cell.y.max(n.y);
                    let top = (cell.y + cell.h).min(n.y + n.h);
                    top - bot >= walkable_height && (n.y - cell.y).abs() <= walkable_climb
                });
                self.cells[i].con[dir] = found.map(|j| j as u32);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, i: usize) -> &NavCell {
        &self.cells[i]
    }

    pub fn cells(&self) -> &[NavCell] {
        &self.cells
    }

    /// Indices of the cells stacked in column `(x, z)`
    pub fn column_cells(&self, x: i32, z: i32) -> Range<usize> {
        if x < 0 || z < 0 || x >= self.width || z >= self.height {
            return 0..0;
        }
        let (start, count) = self.columns[(x + z * self.width) as usize];
        start as usize..(start + count) as usize
    }

    pub fn neighbour(&self, i: usize, dir: usize) -> Option<usize> {
        self.cells[i].con[dir].map(|j| j as usize)
    }

    /// Diagonal neighbour between directions `a` and `b`, reachable only
    /// when both orthogonal routes lead to the same cell
    pub fn diagonal(&self, i: usize, a: usize, b: usize) -> Option<usize> {
        let via_a = self.neighbour(self.neighbour(i, a)?, b)?;
        let via_b = self.neighbour(self.neighbour(i, b)?, a)?;
        (via_a == via_b).then_some(via_a)
    }

    /// World height of the cell floor
    pub fn surface_y(&self, i: usize) -> f32 {
        self.bmin.y + self.cells[i].y as f32 * self.ch
    }

    /// Center of the cell's floor in world space
    pub fn center(&self, i: usize) -> Vec3 {
        let c = &self.cells[i];
        Vec3::new(
            self.bmin.x + (c.x as f32 + 0.5) * self.cs,
            self.surface_y(i),
            self.bmin.z + (c.z as f32 + 0.5) * self.cs,
        )
    }

    /// World XZ corners `(min_x, min_z, max_x, max_z)` of the cell's column
    pub fn column_bounds(&self, i: usize) -> (f32, f32, f32, f32) {
        let c = &self.cells[i];
        let min_x = self.bmin.x + c.x as f32 * self.cs;
        let min_z = self.bmin.z + c.z as f32 * self.cs;
        (min_x, min_z, min_x + self.cs, min_z + self.cs)
    }

    /// Drops cells for which `keep` is false and relinks the survivors
    fn retain(&mut self, keep: &[bool]) {
        let mut remap = vec![None; self.cells.len()];
        let mut cells = Vec::with_capacity(self.cells.len());
        let mut columns = Vec::with_capacity(self.columns.len());

        for &(start, count) in &self.columns {
            let new_start = cells.len() as u32;
            for i in start as usize..(start + count) as usize {
                if keep[i] {
                    remap[i] = Some(cells.len() as u32);
                    cells.push(self.cells[i]);
                }
            }
            columns.push((new_start, cells.len() as u32 - new_start));
        }
        for cell in &mut cells {
            for con in &mut cell.con {
                *con = con.and_then(|j| remap[j as usize]);
            }
        }

        self.cells = cells;
        self.columns = columns;
    }

    /// Removes cells closer than `radius` steps to the walkable border.
    /// Returns the number of cells removed.
    pub fn erode(&mut self, radius: i32) -> usize {
        if radius <= 0 || self.cells.is_empty() {
            return 0;
        }

        let mut dist = vec![i32::MAX; self.cells.len()];
        let mut queue = VecDeque::new();
        for (i, cell) in self.cells.iter().enumerate() {
            if cell.con.iter().any(Option::is_none) {
                dist[i] = 0;
                queue.push_back(i);
            }
        }
        while let Some(i) = queue.pop_front() {
            let next = dist[i] + 1;
            for dir in 0..4 {
                if let Some(j) = self.neighbour(i, dir) {
                    if dist[j] > next {
                        dist[j] = next;
                        queue.push_back(j);
                    }
                }
            }
        }

        let keep: Vec<bool> = dist.iter().map(|&d| d >= radius).collect();
        let removed = keep.iter().filter(|k| !**k).count();
        self.retain(&keep);
        removed
    }

    /// Flood fills connected cells into regions and drops regions smaller
    /// than `min_region_area`.
    pub fn build_regions(&mut self, min_region_area: i32, merge_region_area: i32) -> RegionStats {
        let mut sizes = vec![0usize];
        let mut stack = Vec::new();

        for seed in 0..self.cells.len() {
            if self.cells[seed].region != NO_REGION {
                continue;
            }
            let id = sizes.len() as u32;
            let mut size = 0;
            self.cells[seed].region = id;
            stack.push(seed);
            while let Some(i) = stack.pop() {
                size += 1;
                for dir in 0..4 {
                    if let Some(j) = self.neighbour(i, dir) {
                        if self.cells[j].region == NO_REGION {
                            self.cells[j].region = id;
                            stack.push(j);
                        }
                    }
                }
            }
            sizes.push(size);
        }

        let min_area = min_region_area.max(0) as usize;
        let merge_area = merge_region_area.max(0) as usize;
        let mut stats = RegionStats::default();
        for &size in &sizes[1..] {
            if size < min_area {
                stats.removed_regions += 1;
                stats.removed_cells += size;
            } else {
                stats.regions += 1;
                if size < merge_area {
                    stats.merge_candidates += 1;
                }
            }
        }

        if stats.removed_regions > 0 {
            let keep: Vec<bool> = self
                .cells
                .iter()
                .map(|c| sizes[c.region as usize] >= min_area)
                .collect();
            self.retain(&keep);
        }
        stats
    }

    /// Walkable floor as flat triangle vertices, one quad per run of
    /// neighbouring cells along x
    pub fn debug_triangle_vertices(&self) -> Vec<f32> {
        let mut out = Vec::new();
        let mut emit = |min_x: f32, max_x: f32, min_z: f32, max_z: f32, y: f32| {
            let a = [min_x, y, min_z];
            let b = [max_x, y, min_z];
            let c = [max_x, y, max_z];
            let d = [min_x, y, max_z];
            for v in [a, c, b, a, d, c] {
                out.extend_from_slice(&v);
            }
        };

        let east = 2;
        let mut in_run = vec![false; self.cells.len()];
        for start in 0..self.cells.len() {
            if in_run[start] {
                continue;
            }
            let mut end = start;
            while let Some(next) = self.neighbour(end, east) {
                if self.cells[next].y != self.cells[start].y || in_run[next] {
                    break;
                }
                in_run[next] = true;
                end = next;
            }
            in_run[start] = true;

            let (min_x, min_z, _, max_z) = self.column_bounds(start);
            let (_, _, max_x, _) = self.column_bounds(end);
            emit(min_x, max_x, min_z, max_z, self.surface_y(start));
        }
        out
    }
}
