//! Procedural maze generation
//!
//! Mazes are perfect (spanning-tree) mazes produced by a randomized
//! depth-first search driven by an injectable, seedable generator. The same
//! seed always yields the same maze.
//!
//! # Example
//!
//! ```
//! use mazenav_maze::{generate, Direction};
//!
//! let maze = generate(4, 3, 42).unwrap();
//! assert!(maze.is_perfect());
//! assert!(maze.has_wall(0, 0, Direction::North));
//! ```

mod direction;
mod grid;
mod rng;
mod wall_box;

pub use direction::{Direction, Walls};
pub use grid::{generate, Cell, MazeGrid, MazeParams};
pub use rng::SeededLcg;
pub use wall_box::WallBox;

/// Errors raised while generating a maze
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MazeError {
    #[error("invalid maze dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid maze parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for maze operations
pub type Result<T> = std::result::Result<T, MazeError>;
