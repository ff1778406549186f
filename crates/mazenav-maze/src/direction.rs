//! Cardinal directions and the per-cell wall flag set

use std::fmt;

/// One of the four grid directions.
///
/// North is toward decreasing `y` (world -Z), east toward increasing `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions in neighbor inspection order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Grid offset along x
    pub fn dx(self) -> isize {
        match self {
            Direction::East => 1,
            Direction::West => -1,
            _ => 0,
        }
    }

    /// Grid offset along y
    pub fn dy(self) -> isize {
        match self {
            Direction::South => 1,
            Direction::North => -1,
            _ => 0,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// The wall flag for this direction
    pub fn wall(self) -> Walls {
        match self {
            Direction::North => Walls::NORTH,
            Direction::South => Walls::SOUTH,
            Direction::East => Walls::EAST,
            Direction::West => Walls::WEST,
        }
    }
}

/// Set of walls present around a cell
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Walls(u8);

impl Walls {
    pub const NONE: Walls = Walls(0);
    pub const NORTH: Walls = Walls(0b0001);
    pub const SOUTH: Walls = Walls(0b0010);
    pub const EAST: Walls = Walls(0b0100);
    pub const WEST: Walls = Walls(0b1000);
    pub const ALL: Walls = Walls(0b1111);

    /// Raw 4-bit mask
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Builds a set from a raw mask, ignoring bits above the low four
    pub fn from_bits_truncate(bits: u8) -> Self {
        Walls(bits & Self::ALL.0)
    }

    pub fn has(self, dir: Direction) -> bool {
        self.0 & dir.wall().0 != 0
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= dir.wall().0;
    }

    pub fn remove(&mut self, dir: Direction) {
        self.0 &= !dir.wall().0;
    }

    /// Number of walls present
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Walls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Direction::ALL
            .iter()
            .filter(|d| self.has(**d))
            .map(|d| match d {
                Direction::North => "N",
                Direction::South => "S",
                Direction::East => "E",
                Direction::West => "W",
            })
            .collect();
        write!(f, "Walls({})", names.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_cancel_offsets() {
        for dir in Direction::ALL {
            let opp = dir.opposite();
            assert_eq!(dir.dx() + opp.dx(), 0);
            assert_eq!(dir.dy() + opp.dy(), 0);
            assert_eq!(opp.opposite(), dir);
        }
    }

    #[test]
    fn test_wall_flags() {
        let mut walls = Walls::ALL;
        assert_eq!(walls.count(), 4);

        walls.remove(Direction::East);
        assert!(!walls.has(Direction::East));
        assert!(walls.has(Direction::West));
        assert_eq!(walls.bits(), 0b1011);

        walls.insert(Direction::East);
        assert_eq!(walls, Walls::ALL);
        assert_eq!(Walls::from_bits_truncate(0xFF), Walls::ALL);
        assert!(Walls::NONE.is_empty());
        assert_eq!(format!("{:?}", Walls::NORTH), "Walls(N)");
    }
}
