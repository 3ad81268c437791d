// THEORY:
// Ranking turns a `FrequencyMap` into the ordered top-K list. Entries are sorted by
// descending pixel count. Ties are broken by the lower packed color value first,
// which makes every pass over the same grid produce the same list regardless of how
// the hash map happened to iterate.
//
// Ordering always uses the integer count. The floating-point percentage is derived
// afterwards and only for display, so rounding can never reorder two entries.

use std::cmp::Ordering;

use tracing::trace;

use crate::core_modules::histogram::FrequencyMap;
use crate::core_modules::pixel::pixel::Pixel;
use crate::error::{Error, Result};

/// Number of colors reported per pass.
pub const TOP_K: usize = 5;

/// One color in the ranked list.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedEntry {
    pub color: Pixel,
    pub count: usize,
    /// Share of all pixels in the grid, `count * 100 / total`, unrounded.
    pub percentage: f64,
    total: usize,
}

impl RankedEntry {
    fn new(color: Pixel, count: usize, total: usize) -> Self {
        Self {
            color,
            count,
            percentage: count as f64 * 100.0 / total as f64,
            total,
        }
    }

    /// The percentage in hundredths of a percent, rounded half-up.
    ///
    /// Computed from the integer count so `x.xx5` always rounds up, which plain
    /// float formatting does not guarantee.
    pub fn hundredths(&self) -> u64 {
        let count = self.count as u128;
        let total = self.total as u128;
        ((count * 20_000 + total) / (2 * total)) as u64
    }

    /// Percentage formatted with exactly two decimals, e.g. `"33.33"`.
    pub fn percentage_text(&self) -> String {
        let hundredths = self.hundredths();
        format!("{}.{:02}", hundredths / 100, hundredths % 100)
    }
}

/// Descending count, then ascending packed color.
fn by_rank(a: &(Pixel, usize), b: &(Pixel, usize)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Orders `map` by frequency and keeps the `top_k` most frequent colors.
///
/// `total` is the grid's pixel count and must equal the map's summed counts. A
/// zero total with an empty map is an empty grid and returns an empty list. A zero
/// total with colors present would divide by zero and is rejected.
pub fn rank_colors(map: &FrequencyMap, total: usize, top_k: usize) -> Result<Vec<RankedEntry>> {
    if total == 0 {
        if map.is_empty() {
            return Ok(Vec::new());
        }
        return Err(Error::ZeroTotal {
            distinct: map.distinct(),
        });
    }
    if map.total() != total {
        return Err(Error::TotalMismatch {
            declared: total,
            counted: map.total(),
        });
    }

    let mut entries: Vec<(Pixel, usize)> = map.iter().map(|(&color, &count)| (color, count)).collect();

    // Partition first so only the survivors get fully sorted.
    if top_k == 0 {
        entries.clear();
    } else if entries.len() > top_k {
        entries.select_nth_unstable_by(top_k - 1, by_rank);
        entries.truncate(top_k);
    }
    entries.sort_unstable_by(by_rank);

    trace!(distinct = map.distinct(), kept = entries.len(), "colors ranked");

    Ok(entries
        .into_iter()
        .map(|(color, count)| RankedEntry::new(color, count, total))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(counts: &[(Pixel, usize)]) -> FrequencyMap {
        counts
            .iter()
            .flat_map(|&(color, n)| std::iter::repeat_n(color, n))
            .collect()
    }

    #[test]
    fn orders_by_count_then_packed_value() {
        let a = Pixel::rgb(9, 9, 9);
        let b = Pixel::rgb(0, 0, 2);
        let c = Pixel::rgb(0, 0, 1);
        let map = map_of(&[(a, 100), (b, 50), (c, 50)]);

        let ranked = rank_colors(&map, 200, TOP_K).unwrap();
        let order: Vec<Pixel> = ranked.iter().map(|e| e.color).collect();
        assert_eq!(order, vec![a, c, b]);
        assert_eq!(ranked[0].percentage_text(), "50.00");
        assert_eq!(ranked[1].percentage_text(), "25.00");
        assert_eq!(ranked[2].percentage_text(), "25.00");
    }

    #[test]
    fn truncates_to_top_k() {
        let counts: Vec<(Pixel, usize)> = (1..=9u8).map(|i| (Pixel::rgb(i, 0, 0), i as usize)).collect();
        let map = map_of(&counts);
        let ranked = rank_colors(&map, map.total(), TOP_K).unwrap();
        let kept: Vec<usize> = ranked.iter().map(|e| e.count).collect();
        assert_eq!(kept, vec![9, 8, 7, 6, 5]);
    }

    #[test]
    fn fewer_colors_than_k_are_not_padded() {
        let map = map_of(&[(Pixel::WHITE, 3), (Pixel::BLACK, 1)]);
        assert_eq!(rank_colors(&map, 4, TOP_K).unwrap().len(), 2);
    }

    #[test]
    fn selection_keeps_ties_deterministic_at_the_cut() {
        let counts: Vec<(Pixel, usize)> = (0..20u8).rev().map(|i| (Pixel::rgb(0, i, 0), 4)).collect();
        let map = map_of(&counts);
        let ranked = rank_colors(&map, 80, 3).unwrap();
        let greens: Vec<u8> = ranked.iter().map(|e| e.color.green()).collect();
        assert_eq!(greens, vec![0, 1, 2]);
    }

    #[test]
    fn empty_map_with_zero_total_is_empty() {
        assert!(rank_colors(&FrequencyMap::new(), 0, TOP_K).unwrap().is_empty());
    }

    #[test]
    fn zero_total_with_colors_is_rejected() {
        let map = map_of(&[(Pixel::WHITE, 2)]);
        assert_eq!(
            rank_colors(&map, 0, TOP_K).unwrap_err(),
            Error::ZeroTotal { distinct: 1 }
        );
    }

    #[test]
    fn mismatched_total_is_rejected() {
        let map = map_of(&[(Pixel::WHITE, 2)]);
        assert_eq!(
            rank_colors(&map, 3, TOP_K).unwrap_err(),
            Error::TotalMismatch {
                declared: 3,
                counted: 2
            }
        );
    }

    #[test]
    fn percentages_round_half_up() {
        // 1/8 = 12.5% exactly, 1/3 = 33.333..%, 2/3 = 66.666..%
        assert_eq!(RankedEntry::new(Pixel::BLACK, 1, 8).percentage_text(), "12.50");
        assert_eq!(RankedEntry::new(Pixel::BLACK, 1, 3).percentage_text(), "33.33");
        assert_eq!(RankedEntry::new(Pixel::BLACK, 2, 3).percentage_text(), "66.67");
        // 1/800 = 0.125%
        assert_eq!(RankedEntry::new(Pixel::BLACK, 1, 800).percentage_text(), "0.13");
        assert_eq!(RankedEntry::new(Pixel::BLACK, 1, 1).percentage_text(), "100.00");
    }
}
