// THEORY:
// The region counter is the spatial grouping layer. It answers "how many separate
// marks are on this page?" by finding connected clusters of strong ink.
//
// Counting every pixel's connectivity on large scans is expensive, so the counter
// works on a sampled lattice instead:
// 1.  **Sampling**: Only pixels where `x % STEP == 0 && y % STEP == 0` are looked at.
//     An image smaller than STEP in both directions still has exactly one sample,
//     the pixel at (0, 0).
// 2.  **Activation**: A sample is active when its mask intensity exceeds
//     REGION_THRESHOLD. Faint ink does not seed or bridge regions.
// 3.  **Region Growing**: Samples are scanned row-major. Each unvisited active sample
//     seeds a flood fill over its 4 lattice neighbours (±STEP in x or y), using a
//     LIFO stack. Every sample reached is marked visited and the region count rises
//     by one. The count does not depend on traversal order.
// 4.  **Floor**: The reported count is never below 1, even for a blank page. That is
//     a display policy carried over from the product, not a statement that ink exists.
//
// Like the blob detector it descends from, this is a stateless utility.

use crate::core_modules::ink_mask::InkMask;

/// A pixel coordinate on the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// One connected cluster of active samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkRegion {
    /// Position of this region in scan order, starting at 0.
    pub id: u64,
    /// Top-left and bottom-right sampled pixels of the region.
    pub bounding_box: (Point, Point),
    /// Number of lattice samples the region covers.
    pub sample_count: usize,
}

pub mod region_counter {
    use super::*;
    use fixedbitset::FixedBitSet;

    /// Lattice spacing in pixels.
    pub const STEP: u32 = 4;
    /// A sample is active when its intensity is strictly greater than this.
    pub const REGION_THRESHOLD: u8 = 30;

    /// Shape of the sampling lattice laid over a `width x height` image.
    struct Lattice {
        columns: usize,
        rows: usize,
    }

    impl Lattice {
        fn new(width: u32, height: u32) -> Self {
            Self {
                columns: width.div_ceil(STEP) as usize,
                rows: height.div_ceil(STEP) as usize,
            }
        }

        fn over(mask: &InkMask) -> Self {
            Self::new(mask.width(), mask.height())
        }

        fn index(&self, column: usize, row: usize) -> usize {
            row * self.columns + column
        }

        /// Pixel under a lattice sample. Samples inside the lattice always land
        /// inside the image; anything past it saturates to `u32::MAX`, which no
        /// mask contains.
        fn pixel(&self, column: usize, row: usize) -> Point {
            let scale = |index: usize| {
                u32::try_from((index as u64).saturating_mul(STEP as u64)).unwrap_or(u32::MAX)
            };
            Point {
                x: scale(column),
                y: scale(row),
            }
        }
    }

    #[cfg(test)]
    mod lattice_tests {
        use super::*;

        #[test]
        fn widest_image_keeps_last_sample_in_range() {
            let lattice = Lattice::new(u32::MAX, u32::MAX);
            assert_eq!(lattice.columns, 1 << 30);
            let last = lattice.pixel(lattice.columns - 1, lattice.rows - 1);
            assert_eq!(last, Point { x: u32::MAX - 3, y: u32::MAX - 3 });
            // One past the edge saturates instead of wrapping.
            assert_eq!(lattice.pixel(lattice.columns, 0).x, u32::MAX);
            assert_eq!(lattice.pixel(usize::MAX, 0).x, u32::MAX);
        }

        #[test]
        fn lattice_rounds_partial_cells_up() {
            let lattice = Lattice::new(9, 4);
            assert_eq!((lattice.columns, lattice.rows), (3, 1));
            assert_eq!(lattice.pixel(2, 0), Point { x: 8, y: 0 });
        }
    }

    fn is_active(mask: &InkMask, point: Point) -> bool {
        mask.get(point.x, point.y)
            .is_some_and(|value| value > REGION_THRESHOLD)
    }

    /// Finds every connected region of active samples, in row-major seed order.
    pub fn find_regions(mask: &InkMask) -> Vec<InkRegion> {
        let lattice = Lattice::over(mask);
        let mut visited = FixedBitSet::with_capacity(lattice.columns * lattice.rows);
        let mut regions = Vec::new();

        for row in 0..lattice.rows {
            for column in 0..lattice.columns {
                let index = lattice.index(column, row);
                if visited.contains(index) || !is_active(mask, lattice.pixel(column, row)) {
                    continue;
                }
                let region = grow_region(mask, &lattice, &mut visited, (column, row), regions.len() as u64);
                regions.push(region);
            }
        }

        log::debug!(
            "found {} ink regions on a {}x{} sample lattice",
            regions.len(),
            lattice.columns,
            lattice.rows
        );
        regions
    }

    /// Counts ink regions, floored at 1.
    pub fn count_regions(mask: &InkMask) -> usize {
        find_regions(mask).len().max(1)
    }

    /// Depth-first flood fill from `seed` across active lattice neighbours.
    fn grow_region(
        mask: &InkMask,
        lattice: &Lattice,
        visited: &mut FixedBitSet,
        seed: (usize, usize),
        region_id: u64,
    ) -> InkRegion {
        let mut stack = vec![seed];
        visited.insert(lattice.index(seed.0, seed.1));

        let mut min = lattice.pixel(seed.0, seed.1);
        let mut max = min;
        let mut sample_count = 0usize;

        while let Some((column, row)) = stack.pop() {
            sample_count += 1;
            let here = lattice.pixel(column, row);
            min = Point {
                x: min.x.min(here.x),
                y: min.y.min(here.y),
            };
            max = Point {
                x: max.x.max(here.x),
                y: max.y.max(here.y),
            };

            // 4-connected on the lattice, not on raw pixels.
            for (dx, dy) in [(0i64, 1i64), (0, -1), (1, 0), (-1, 0)] {
                let nx = column as i64 + dx;
                let ny = row as i64 + dy;
                if nx < 0 || ny < 0 || nx >= lattice.columns as i64 || ny >= lattice.rows as i64 {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                let index = lattice.index(nx, ny);
                if !visited.contains(index) && is_active(mask, lattice.pixel(nx, ny)) {
                    visited.insert(index);
                    stack.push((nx, ny));
                }
            }
        }

        InkRegion {
            id: region_id,
            bounding_box: (min, max),
            sample_count,
        }
    }
}
