//! Span heightfield and walkability filters
//!
//! Each column holds solid spans sorted bottom to top. Spans added to a
//! column merge with any span they overlap.

use glam::Vec3;

/// Area id of solid, non-walkable spans
pub const NULL_AREA: u8 = 0;
/// Area id of walkable spans
pub const WALKABLE_AREA: u8 = 63;
/// Largest representable span height
pub const SPAN_MAX_HEIGHT: u16 = (1 << 13) - 1;

/// Most columns a single heightfield may hold
pub const MAX_COLUMNS: usize = 1 << 24;

const MAX_HEIGHT: i32 = 0xffff;
const DIR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// A solid span in voxel units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub min: u16,
    pub max: u16,
    pub area: u8,
}

#[derive(Debug, Clone)]
pub struct Heightfield {
    /// Columns along x
    pub width: i32,
    /// Columns along z
    pub height: i32,
    pub bmin: Vec3,
    pub bmax: Vec3,
    pub cs: f32,
    pub ch: f32,
    columns: Vec<Vec<Span>>,
}

impl Heightfield {
    pub fn new(width: i32, height: i32, bmin: Vec3, bmax: Vec3, cs: f32, ch: f32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            bmin,
            bmax,
            cs,
            ch,
            columns: vec![Vec::new(); width as usize * height as usize],
        }
    }

    /// Columns along x and z needed to cover `bmin..bmax`
    pub fn grid_size(bmin: Vec3, bmax: Vec3, cs: f32) -> (usize, usize) {
        // Float to int casts saturate, so huge extents stay huge
        let columns = |extent: f32| (extent / cs + 0.5).max(0.0) as usize;
        (columns(bmax.x - bmin.x), columns(bmax.z - bmin.z))
    }

    /// Sizes the grid to cover `bmin..bmax`.
    ///
    /// Returns `None` when the grid would exceed [`MAX_COLUMNS`].
    pub fn from_bounds(bmin: Vec3, bmax: Vec3, cs: f32, ch: f32) -> Option<Self> {
        let (width, height) = Self::grid_size(bmin, bmax, cs);
        if width.max(height) > MAX_COLUMNS {
            return None;
        }
        width.checked_mul(height).filter(|&n| n <= MAX_COLUMNS)?;
        Some(Self::new(width as i32, height as i32, bmin, bmax, cs, ch))
    }

    pub fn in_bounds(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && x < self.width && z < self.height
    }

    pub fn column(&self, x: i32, z: i32) -> &[Span] {
        if !self.in_bounds(x, z) {
            return &[];
        }
        &self.columns[(x + z * self.width) as usize]
    }

    /// Adds a span, merging it with every span it overlaps.
    ///
    /// The merged span keeps the higher area id only when its top lies within
    /// `merge_threshold` of the existing span's top.
    pub fn add_span(&mut self, x: i32, z: i32, min: u16, max: u16, area: u8, merge_threshold: i32) {
        if !self.in_bounds(x, z) {
            return;
        }
        let column = &mut self.columns[(x + z * self.width) as usize];
        let mut span = Span { min, max, area };

        let mut i = 0;
        while i < column.len() {
            let cur = column[i];
            if cur.min > span.max {
                break;
            }
            if cur.max < span.min {
                i += 1;
                continue;
            }
            span.min = span.min.min(cur.min);
            span.max = span.max.max(cur.max);
            if (span.max as i32 - cur.max as i32).abs() <= merge_threshold {
                span.area = span.area.max(cur.area);
            }
            column.remove(i);
        }
        column.insert(i, span);
    }

    pub fn span_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn walkable_span_count(&self) -> usize {
        self.columns
            .iter()
            .flatten()
            .filter(|s| s.area != NULL_AREA)
            .count()
    }

    /// Lets the agent step over low obstacles: a solid span directly above
    /// a walkable one becomes walkable when its top is within climb.
    pub fn filter_low_hanging_walkable_obstacles(&mut self, walkable_climb: i32) {
        for column in &mut self.columns {
            let mut previous: Option<Span> = None;
            let mut previous_walkable = false;
            for span in column.iter_mut() {
                let walkable = span.area != NULL_AREA;
                if let Some(prev) = previous {
                    if !walkable
                        && previous_walkable
                        && (span.max as i32 - prev.max as i32).abs() <= walkable_climb
                    {
                        span.area = prev.area;
                    }
                }
                // Keep the original flag so a stack of obstacles is not lifted
                previous_walkable = walkable;
                previous = Some(*span);
            }
        }
    }

    /// Clears walkable spans next to drops deeper than climb, or on slopes
    /// whose traversable neighbours differ by more than climb.
    pub fn filter_ledge_spans(&mut self, walkable_height: i32, walkable_climb: i32) {
        let mut ledges = Vec::new();

        for z in 0..self.height {
            for x in 0..self.width {
                let column = self.column(x, z);
                for (i, span) in column.iter().enumerate() {
                    if span.area == NULL_AREA {
                        continue;
                    }
                    let floor = span.max as i32;
                    let ceiling = column.get(i + 1).map_or(MAX_HEIGHT, |n| n.min as i32);

                    if self.is_ledge(x, z, floor, ceiling, walkable_height, walkable_climb) {
                        ledges.push((x, z, i));
                    }
                }
            }
        }

        for (x, z, i) in ledges {
            self.columns[(x + z * self.width) as usize][i].area = NULL_AREA;
        }
    }

    fn is_ledge(
        &self,
        x: i32,
        z: i32,
        floor: i32,
        ceiling: i32,
        walkable_height: i32,
        walkable_climb: i32,
    ) -> bool {
        let mut lowest_difference = MAX_HEIGHT;
        let mut lowest_traversable = floor;
        let mut highest_traversable = floor;

        for (dx, dz) in DIR_OFFSETS {
            let (nx, nz) = (x + dx, z + dz);
            if !self.in_bounds(nx, nz) {
                return true;
            }
            let neighbour = self.column(nx, nz);

            // Drop to the bottom of the neighbour column
            let first_ceiling = neighbour.first().map_or(MAX_HEIGHT, |s| s.min as i32);
            if ceiling.min(first_ceiling) - floor >= walkable_height {
                return true;
            }

            for (j, n) in neighbour.iter().enumerate() {
                let n_floor = n.max as i32;
                let n_ceiling = neighbour.get(j + 1).map_or(MAX_HEIGHT, |s| s.min as i32);
                if ceiling.min(n_ceiling) - floor.max(n_floor) < walkable_height {
                    continue;
                }
                let difference = n_floor - floor;
                lowest_difference = lowest_difference.min(difference);
                if difference.abs() <= walkable_climb {
                    lowest_traversable = lowest_traversable.min(n_floor);
                    highest_traversable = highest_traversable.max(n_floor);
                } else if difference < -walkable_climb {
                    break;
                }
            }
        }

        lowest_difference < -walkable_climb
            || highest_traversable - lowest_traversable > walkable_climb
    }

    /// Clears walkable spans without `walkable_height` of free space above
    pub fn filter_walkable_low_height_spans(&mut self, walkable_height: i32) {
        for column in &mut self.columns {
            for i in 0..column.len() {
                let floor = column[i].max as i32;
                let ceiling = column.get(i + 1).map_or(MAX_HEIGHT, |s| s.min as i32);
                if ceiling - floor < walkable_height {
                    column[i].area = NULL_AREA;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(width: i32, height: i32) -> Heightfield {
        Heightfield::new(
            width,
            height,
            Vec3::ZERO,
            Vec3::new(width as f32, 10.0, height as f32),
            1.0,
            1.0,
        )
    }

    #[test]
    fn test_from_bounds_rounds_grid() {
        let hf = Heightfield::from_bounds(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.5, 1.04),
            0.1,
            0.05,
        )
        .unwrap();
        assert_eq!(hf.width, 20);
        assert_eq!(hf.height, 20);
    }

    #[test]
    fn test_from_bounds_rejects_huge_grid() {
        let bmax = Vec3::new(5000.0, 0.0, 5000.0);
        assert_eq!(Heightfield::grid_size(Vec3::ZERO, bmax, 0.05), (100_000, 100_000));
        assert!(Heightfield::from_bounds(Vec3::ZERO, bmax, 0.05, 0.05).is_none());

        // Long and thin overflows nothing but is still too wide
        let strip = Vec3::new(f32::MAX, 0.0, 0.0);
        assert!(Heightfield::from_bounds(Vec3::ZERO, strip, 0.05, 0.05).is_none());
    }

    #[test]
    fn test_add_span_sorted() {
        let mut hf = field(2, 2);
        hf.add_span(0, 0, 10, 12, WALKABLE_AREA, 1);
        hf.add_span(0, 0, 0, 2, WALKABLE_AREA, 1);
        hf.add_span(0, 0, 5, 6, NULL_AREA, 1);
        let col = hf.column(0, 0);
        assert_eq!(col.len(), 3);
        assert_eq!((col[0].min, col[1].min, col[2].min), (0, 5, 10));
    }

    #[test]
    fn test_add_span_merge_area() {
        let mut hf = field(1, 1);
        hf.add_span(0, 0, 10, 20, 1, 1);
        hf.add_span(0, 0, 15, 21, 2, 1);
        let col = hf.column(0, 0);
        assert_eq!(col.len(), 1);
        assert_eq!((col[0].min, col[0].max, col[0].area), (10, 21, 2));

        // A much taller solid span swallows the walkable one
        let mut hf = field(1, 1);
        hf.add_span(0, 0, 0, 1, WALKABLE_AREA, 2);
        hf.add_span(0, 0, 0, 5, NULL_AREA, 2);
        assert_eq!(hf.column(0, 0)[0].area, NULL_AREA);
    }

    #[test]
    fn test_add_span_bridges_several() {
        let mut hf = field(1, 1);
        hf.add_span(0, 0, 0, 2, NULL_AREA, 1);
        hf.add_span(0, 0, 4, 6, NULL_AREA, 1);
        hf.add_span(0, 0, 8, 9, NULL_AREA, 1);
        hf.add_span(0, 0, 1, 8, WALKABLE_AREA, 1);
        let col = hf.column(0, 0);
        assert_eq!(col.len(), 1);
        assert_eq!((col[0].min, col[0].max), (0, 9));
        assert_eq!(col[0].area, WALKABLE_AREA);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut hf = field(2, 2);
        hf.add_span(-1, 0, 0, 1, WALKABLE_AREA, 1);
        hf.add_span(0, 2, 0, 1, WALKABLE_AREA, 1);
        assert_eq!(hf.span_count(), 0);
        assert!(hf.column(5, 5).is_empty());
    }

    #[test]
    fn test_low_hanging_obstacle() {
        let mut hf = field(1, 1);
        hf.add_span(0, 0, 0, 1, WALKABLE_AREA, 0);
        hf.add_span(0, 0, 2, 3, NULL_AREA, 0);
        hf.add_span(0, 0, 4, 5, NULL_AREA, 0);
        hf.filter_low_hanging_walkable_obstacles(2);
        let col = hf.column(0, 0);
        assert_eq!(col[1].area, WALKABLE_AREA);
        // Second obstacle sits on a span that was not walkable originally
        assert_eq!(col[2].area, NULL_AREA);
    }

    #[test]
    fn test_ledge_filter_clears_border() {
        let mut hf = field(5, 5);
        for z in 0..5 {
            for x in 0..5 {
                hf.add_span(x, z, 0, 1, WALKABLE_AREA, 1);
            }
        }
        hf.filter_ledge_spans(2, 1);
        for z in 0..5 {
            for x in 0..5 {
                let border = x == 0 || z == 0 || x == 4 || z == 4;
                let area = hf.column(x, z)[0].area;
                assert_eq!(area == NULL_AREA, border, "cell {} {}", x, z);
            }
        }
    }

    #[test]
    fn test_ledge_filter_next_to_drop() {
        let mut hf = field(5, 3);
        for z in 0..3 {
            for x in 0..5 {
                let top = if x >= 3 { 10 } else { 1 };
                hf.add_span(x, z, 0, top, WALKABLE_AREA, 1);
            }
        }
        hf.filter_ledge_spans(2, 1);
        // Column 3 overlooks a drop of 9 voxels
        assert_eq!(hf.column(3, 1)[0].area, NULL_AREA);
        // Column 2 faces a wall, which is not a ledge
        assert_eq!(hf.column(2, 1)[0].area, WALKABLE_AREA);
    }

    #[test]
    fn test_low_height_filter() {
        let mut hf = field(1, 1);
        hf.add_span(0, 0, 0, 1, WALKABLE_AREA, 0);
        hf.add_span(0, 0, 3, 4, WALKABLE_AREA, 0);
        hf.filter_walkable_low_height_spans(3);
        let col = hf.column(0, 0);
        assert_eq!(col[0].area, NULL_AREA);
        assert_eq!(col[1].area, WALKABLE_AREA);
        assert_eq!(hf.walkable_span_count(), 1);
    }
}
