//! Maze grid and randomized depth-first generation

use std::collections::VecDeque;
use std::fmt;

use glam::Vec3;
use rand::RngCore;

use crate::direction::{Direction, Walls};
use crate::rng::SeededLcg;
use crate::{MazeError, Result};

/// Generation and layout parameters for a maze
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct MazeParams {
    /// Number of cells along x
    pub width: usize,
    /// Number of cells along y (world z)
    pub height: usize,
    /// Edge length of one square cell in world units
    pub cell_size: f32,
    /// Thickness of a wall box
    pub wall_thickness: f32,
    /// Height of a wall box
    pub wall_height: f32,
    /// Seed for the default generator
    pub seed: u64,
}

impl Default for MazeParams {
    fn default() -> Self {
        Self {
            width: 9,
            height: 9,
            cell_size: 0.45,
            wall_thickness: 0.05,
            wall_height: 0.25,
            seed: 0xC0FFEE,
        }
    }
}

impl MazeParams {
    /// Creates parameters with the given size and seed and default geometry
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
            ..Default::default()
        }
    }

    /// Validates the parameters
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MazeError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(MazeError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(MazeError::InvalidParameter(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if !(self.wall_thickness.is_finite() && self.wall_thickness >= 0.0) {
            return Err(MazeError::InvalidParameter(format!(
                "wall thickness must be non-negative, got {}",
                self.wall_thickness
            )));
        }
        if !(self.wall_height.is_finite() && self.wall_height >= 0.0) {
            return Err(MazeError::InvalidParameter(format!(
                "wall height must be non-negative, got {}",
                self.wall_height
            )));
        }
        Ok(())
    }
}

/// A single maze cell and its walls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub walls: Walls,
}

/// A generated maze. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MazeGrid {
    params: MazeParams,
    origin: Vec3,
    walls: Vec<Walls>,
}

/// Generates a maze with default geometry using the built-in seeded generator
pub fn generate(width: usize, height: usize, seed: u64) -> Result<MazeGrid> {
    MazeGrid::generate(MazeParams::new(width, height, seed))
}

impl MazeGrid {
    /// Generates a maze using [`SeededLcg`] seeded with `params.seed`
    pub fn generate(params: MazeParams) -> Result<Self> {
        let mut rng = SeededLcg::new(params.seed);
        Self::generate_with_rng(params, &mut rng)
    }

    /// Generates a maze drawing choices from `rng`
    pub fn generate_with_rng<R: RngCore + ?Sized>(params: MazeParams, rng: &mut R) -> Result<Self> {
        params.validate()?;

        let width = params.width;
        let height = params.height;
        let origin = Vec3::new(
            -(width as f32) * params.cell_size * 0.5,
            0.0,
            -(height as f32) * params.cell_size * 0.5,
        );

        let mut grid = Self {
            params,
            origin,
            walls: vec![Walls::ALL; width * height],
        };

        let mut visited = vec![false; width * height];
        let mut stack: Vec<(usize, usize)> = Vec::with_capacity(width * height);
        let mut candidates: Vec<(Direction, usize, usize)> = Vec::with_capacity(4);

        visited[0] = true;
        stack.push((0, 0));

        while let Some(&(x, y)) = stack.last() {
            candidates.clear();
            for dir in Direction::ALL {
                if let Some((nx, ny)) = grid.neighbor(x, y, dir) {
                    if !visited[grid.index(nx, ny)] {
                        candidates.push((dir, nx, ny));
                    }
                }
            }

            if candidates.is_empty() {
                stack.pop();
                continue;
            }

            let pick = rng.next_u32() as usize % candidates.len();
            let (dir, nx, ny) = candidates[pick];
            grid.remove_wall(x, y, dir);
            visited[grid.index(nx, ny)] = true;
            stack.push((nx, ny));
        }

        log::debug!(
            "generated {}x{} maze (seed {:#x}), {} passages",
            width,
            height,
            grid.params.seed,
            grid.passages().len()
        );

        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.params.width
    }

    pub fn height(&self) -> usize {
        self.params.height
    }

    pub fn params(&self) -> &MazeParams {
        &self.params
    }

    pub fn cell_size(&self) -> f32 {
        self.params.cell_size
    }

    pub fn seed(&self) -> u64 {
        self.params.seed
    }

    /// World-space position of the outer corner of cell (0, 0)
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Raw wall sets in row-major order
    pub fn wall_masks(&self) -> &[Walls] {
        &self.walls
    }

    /// Wall set of cell `(x, y)`
    pub fn walls(&self, x: usize, y: usize) -> Walls {
        self.walls[self.index(x, y)]
    }

    pub fn cell(&self, x: usize, y: usize) -> Cell {
        Cell {
            x,
            y,
            walls: self.walls(x, y),
        }
    }

    pub fn has_wall(&self, x: usize, y: usize, dir: Direction) -> bool {
        self.walls(x, y).has(dir)
    }

    /// World-space center of cell `(x, y)` on the floor plane
    pub fn cell_center(&self, x: usize, y: usize) -> Vec3 {
        let cs = self.params.cell_size;
        self.origin + Vec3::new((x as f32 + 0.5) * cs, 0.0, (y as f32 + 0.5) * cs)
    }

    /// Neighbor coordinates in `dir`, or `None` past the grid boundary
    pub fn neighbor(&self, x: usize, y: usize, dir: Direction) -> Option<(usize, usize)> {
        let nx = x.checked_add_signed(dir.dx())?;
        let ny = y.checked_add_signed(dir.dy())?;
        (nx < self.params.width && ny < self.params.height).then_some((nx, ny))
    }

    /// Interior edges whose wall was removed, each reported once
    pub fn passages(&self) -> Vec<((usize, usize), (usize, usize))> {
        let mut out = Vec::new();
        for y in 0..self.params.height {
            for x in 0..self.params.width {
                for dir in [Direction::East, Direction::South] {
                    if let Some(n) = self.neighbor(x, y, dir) {
                        if !self.has_wall(x, y, dir) {
                            out.push(((x, y), n));
                        }
                    }
                }
            }
        }
        out
    }

    /// Number of cells reachable from `(x, y)` through open walls
    pub fn reachable_count(&self, x: usize, y: usize) -> usize {
        let mut seen = vec![false; self.walls.len()];
        let mut queue = VecDeque::new();
        seen[self.index(x, y)] = true;
        queue.push_back((x, y));
        let mut count = 0;

        while let Some((cx, cy)) = queue.pop_front() {
            count += 1;
            for dir in Direction::ALL {
                if self.has_wall(cx, cy, dir) {
                    continue;
                }
                if let Some((nx, ny)) = self.neighbor(cx, cy, dir) {
                    let ni = self.index(nx, ny);
                    if !seen[ni] {
                        seen[ni] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }
        }
        count
    }

    /// True when the open passages form a spanning tree over all cells
    pub fn is_perfect(&self) -> bool {
        let cells = self.walls.len();
        self.passages().len() == cells - 1 && self.reachable_count(0, 0) == cells
    }

    /// Checks that every open wall is open from both sides and that the
    /// outer boundary is closed
    pub fn walls_consistent(&self) -> bool {
        for y in 0..self.params.height {
            for x in 0..self.params.width {
                for dir in Direction::ALL {
                    match self.neighbor(x, y, dir) {
                        Some((nx, ny)) => {
                            if self.has_wall(x, y, dir) != self.has_wall(nx, ny, dir.opposite()) {
                                return false;
                            }
                        }
                        None => {
                            if !self.has_wall(x, y, dir) {
                                return false;
                            }
                        }
                    }
                }
            }
        }
        true
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.params.width + x
    }

    fn remove_wall(&mut self, x: usize, y: usize, dir: Direction) {
        if let Some((nx, ny)) = self.neighbor(x, y, dir) {
            let a = self.index(x, y);
            let b = self.index(nx, ny);
            self.walls[a].remove(dir);
            self.walls[b].remove(dir.opposite());
        }
    }
}

impl fmt::Display for MazeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = (self.params.width, self.params.height);
        for y in 0..h {
            for x in 0..w {
                let top = if self.has_wall(x, y, Direction::North) {
                    "---"
                } else {
                    "   "
                };
                write!(f, "+{}", top)?;
            }
            writeln!(f, "+")?;
            for x in 0..w {
                let side = if self.has_wall(x, y, Direction::West) {
                    '|'
                } else {
                    ' '
                };
                write!(f, "{}   ", side)?;
            }
            let east = if self.has_wall(w - 1, y, Direction::East) {
                '|'
            } else {
                ' '
            };
            writeln!(f, "{}", east)?;
        }
        for x in 0..w {
            let bottom = if self.has_wall(x, h - 1, Direction::South) {
                "---"
            } else {
                "   "
            };
            write!(f, "+{}", bottom)?;
        }
        writeln!(f, "+")
    }
}
