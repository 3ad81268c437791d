// THEORY:
// The histogram is the first stage of every pass. It scans a `PixelGrid` exactly
// once and counts how many positions hold each distinct packed color. Colors are
// matched by exact value only, so this is a plain hash-map tally: O(W·H) time and
// O(D) space for D distinct colors.
//
// Key architectural principles:
// 1.  **Fresh per pass**: A `FrequencyMap` only ever describes one grid. The
//     reusable `HistogramBuilder` keeps the map's allocation between passes but
//     clears it before each scan, so counts from a previous frame can never leak
//     into the next one.
// 2.  **Self-checking total**: The map remembers how many pixels it counted. The
//     ranking layer compares that against the caller's declared total instead of
//     re-summing every count.
// 3.  **Pure**: Building a map touches nothing but the map. No display state, no
//     locks. Synchronization lives in the scheduler.

use std::collections::HashMap;
use std::collections::hash_map;

use tracing::trace;

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_grid::PixelGrid;
use crate::error::Result;

/// Exact-value color histogram for a single grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyMap {
    counts: HashMap<Pixel, usize>,
    total: usize,
}

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashMap::with_capacity(capacity),
            total: 0,
        }
    }

    /// Counts one more occurrence of `color`.
    pub fn record(&mut self, color: Pixel) {
        *self.counts.entry(color).or_insert(0) += 1;
        self.total += 1;
    }

    /// Occurrences of `color`, zero if it never appeared.
    pub fn count(&self, color: Pixel) -> usize {
        self.counts.get(&color).copied().unwrap_or(0)
    }

    /// Number of distinct colors.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, Pixel, usize> {
        self.counts.iter()
    }

    fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }

    fn tally(&mut self, grid: &PixelGrid) -> Result<()> {
        grid.validate()?;
        self.clear();
        for &pixel in grid.pixels() {
            self.record(pixel);
        }
        trace!(
            pixels = self.total,
            distinct = self.distinct(),
            "histogram built"
        );
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FrequencyMap {
    type Item = (&'a Pixel, &'a usize);
    type IntoIter = hash_map::Iter<'a, Pixel, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Pixel> for FrequencyMap {
    fn from_iter<I: IntoIterator<Item = Pixel>>(iter: I) -> Self {
        let mut map = FrequencyMap::new();
        for pixel in iter {
            map.record(pixel);
        }
        map
    }
}

/// Builds a new `FrequencyMap` for `grid`.
///
/// Fails with `DimensionMismatch` if the grid's width and height do not describe
/// its backing data. Empty grids yield an empty map.
pub fn build_histogram(grid: &PixelGrid) -> Result<FrequencyMap> {
    let mut map = FrequencyMap::new();
    map.tally(grid)?;
    Ok(map)
}

/// A histogram builder that recycles its map's allocation across passes.
#[derive(Debug, Default)]
pub struct HistogramBuilder {
    map: FrequencyMap,
}

impl HistogramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the internal map from scratch for `grid` and returns it.
    ///
    /// On error the previous contents are left untouched and nothing is returned,
    /// so a failed pass cannot be mistaken for a successful one.
    pub fn build(&mut self, grid: &PixelGrid) -> Result<&FrequencyMap> {
        self.map.tally(grid)?;
        Ok(&self.map)
    }

    /// Current map capacity, useful for seeing whether reuse is paying off.
    pub fn capacity(&self) -> usize {
        self.map.counts.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn striped_grid() -> PixelGrid {
        let red = Pixel::rgb(255, 0, 0);
        let blue = Pixel::rgb(0, 0, 255);
        let pixels: Vec<Pixel> = (0..12).map(|i| if i % 3 == 0 { blue } else { red }).collect();
        PixelGrid::new(4, 3, pixels)
    }

    #[test]
    fn counts_every_position_once() {
        let map = build_histogram(&striped_grid()).unwrap();
        assert_eq!(map.total(), 12);
        assert_eq!(map.distinct(), 2);
        assert_eq!(map.count(Pixel::rgb(255, 0, 0)), 8);
        assert_eq!(map.count(Pixel::rgb(0, 0, 255)), 4);
        assert_eq!(map.count(Pixel::rgb(0, 255, 0)), 0);
        assert_eq!(map.iter().map(|(_, c)| c).sum::<usize>(), 12);
    }

    #[test]
    fn one_unit_apart_is_a_different_color() {
        let grid = PixelGrid::new(
            3,
            1,
            vec![
                Pixel::rgb(100, 100, 100),
                Pixel::rgb(100, 100, 101),
                Pixel::new(100, 100, 100, 254),
            ],
        );
        let map = build_histogram(&grid).unwrap();
        assert_eq!(map.distinct(), 3);
    }

    #[test]
    fn empty_grid_gives_empty_map() {
        for grid in [
            PixelGrid::empty(),
            PixelGrid::new(0, 5, Vec::new()),
            PixelGrid::new(5, 0, Vec::new()),
        ] {
            let map = build_histogram(&grid).unwrap();
            assert!(map.is_empty());
            assert_eq!(map.total(), 0);
        }
    }

    #[test]
    fn mismatched_dimensions_are_invalid_input() {
        let grid = PixelGrid::new(2, 2, vec![Pixel::BLACK; 3]);
        assert_eq!(
            build_histogram(&grid).unwrap_err(),
            Error::DimensionMismatch {
                width: 2,
                height: 2,
                len: 3
            }
        );
    }

    #[test]
    fn builder_does_not_leak_previous_pass() {
        let mut builder = HistogramBuilder::new();
        builder.build(&striped_grid()).unwrap();
        let capacity = builder.capacity();

        let green = Pixel::rgb(0, 255, 0);
        let map = builder.build(&PixelGrid::filled(2, 2, green)).unwrap();
        assert_eq!(map.distinct(), 1);
        assert_eq!(map.count(green), 4);
        assert_eq!(map.count(Pixel::rgb(255, 0, 0)), 0);
        assert_eq!(map.total(), 4);
        assert!(builder.capacity() >= capacity);
    }

    #[test]
    fn builder_keeps_previous_map_on_error() {
        let mut builder = HistogramBuilder::new();
        builder.build(&striped_grid()).unwrap();
        assert!(builder.build(&PixelGrid::new(9, 9, Vec::new())).is_err());
        assert_eq!(builder.map.total(), 12);
    }

    #[test]
    fn collects_from_pixel_iterator() {
        let map: FrequencyMap = [Pixel::WHITE, Pixel::WHITE, Pixel::BLACK].into_iter().collect();
        assert_eq!(map.count(Pixel::WHITE), 2);
        assert_eq!(map.total(), 3);
    }
}
