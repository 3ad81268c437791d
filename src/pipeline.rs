// THEORY:
// The `pipeline` module is the top-level synchronous API of the analyzer. One call
// runs a full pass over a single grid: histogram, ranking, presentation. It owns no
// threads and no timers; the `scheduler` module decides when and where a pass runs.
// Everything here is a pure function of the grid plus the configuration, which is
// what lets the scheduler push it onto a worker context without locks.

use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use crate::core_modules::histogram::HistogramBuilder;
use crate::core_modules::pixel_grid::PixelGrid;
use crate::core_modules::presentation::present;
use crate::core_modules::ranking::rank_colors;
use crate::error::Result;

// Re-export key data structures for the public API.
pub use crate::core_modules::pixel::pixel::{LABEL_BRIGHTNESS_THRESHOLD, Pixel};
pub use crate::core_modules::presentation::{LabelColor, PresentationRecord};
pub use crate::core_modules::ranking::{RankedEntry, TOP_K};

/// Delay between the end of one pass and the start of the next.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

/// Configuration for the analyzer and its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// How many colors each pass reports.
    pub top_k: usize,
    /// Fixed delay between passes.
    pub interval: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            top_k: TOP_K,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl AnalyzerConfig {
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::default()
    }
}

/// Builder for AnalyzerConfig
#[derive(Debug, Default)]
pub struct AnalyzerConfigBuilder {
    top_k: Option<usize>,
    interval: Option<Duration>,
}

impl AnalyzerConfigBuilder {
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn build(self) -> AnalyzerConfig {
        let default = AnalyzerConfig::default();
        AnalyzerConfig {
            top_k: self.top_k.unwrap_or(default.top_k).max(1),
            interval: self.interval.unwrap_or(default.interval),
        }
    }
}

/// What the display collaborator receives after a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Report {
    /// No colors to show; every swatch should be blanked.
    Clear,
    /// The full ranked list, most frequent first.
    TopColors(Vec<PresentationRecord>),
}

impl Report {
    pub fn records(&self) -> &[PresentationRecord] {
        match self {
            Report::Clear => &[],
            Report::TopColors(records) => records,
        }
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Report::Clear)
    }
}

/// Runs passes over grids, reusing its histogram allocation between them.
#[derive(Debug, Default)]
pub struct ColorAnalyzer {
    config: AnalyzerConfig,
    histogram: HistogramBuilder,
}

impl ColorAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            histogram: HistogramBuilder::new(),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// One full pass: histogram then ranking.
    #[instrument(level = "debug", skip_all, fields(width = grid.width(), height = grid.height()))]
    pub fn analyze(&mut self, grid: &PixelGrid) -> Result<Vec<RankedEntry>> {
        let started = Instant::now();

        // Stage 1: Exact-value histogram
        let map = self.histogram.build(grid)?;

        // Stage 2: Ranking against the declared pixel count
        let ranked = rank_colors(map, grid.declared_len(), self.config.top_k)?;

        debug!(
            distinct = map.distinct(),
            ranked = ranked.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "pass complete"
        );
        Ok(ranked)
    }

    /// A pass that always yields something displayable.
    ///
    /// Analysis errors are local to the pass: they are logged and turned into
    /// `Report::Clear`, never escalated.
    pub fn generate_report(&mut self, grid: &PixelGrid) -> Report {
        match self.analyze(grid) {
            Ok(ranked) if ranked.is_empty() => Report::Clear,
            Ok(ranked) => Report::TopColors(present(&ranked)),
            Err(e) => {
                warn!("Discarding pass: {}", e);
                Report::Clear
            }
        }
    }
}

/// Ranks the dominant colors of `grid` with the default configuration.
pub fn analyze(grid: &PixelGrid) -> Result<Vec<RankedEntry>> {
    ColorAnalyzer::default().analyze(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_falls_back_to_defaults() {
        let config = AnalyzerConfig::builder().build();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.top_k, 5);
        assert_eq!(config.interval, Duration::from_millis(50));
    }

    #[test]
    fn builder_overrides_and_clamps() {
        let config = AnalyzerConfig::builder()
            .top_k(0)
            .interval(Duration::from_millis(5))
            .build();
        assert_eq!(config.top_k, 1);
        assert_eq!(config.interval, Duration::from_millis(5));
    }

    #[test]
    fn single_pixel_grid_is_one_hundred_percent() {
        let ranked = analyze(&PixelGrid::filled(1, 1, Pixel::rgb(3, 4, 5))).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].count, 1);
        assert_eq!(ranked[0].percentage_text(), "100.00");
    }

    #[test]
    fn empty_grid_reports_clear() {
        let mut analyzer = ColorAnalyzer::default();
        assert!(analyzer.analyze(&PixelGrid::empty()).unwrap().is_empty());
        assert_eq!(analyzer.generate_report(&PixelGrid::empty()), Report::Clear);
    }

    #[test]
    fn invalid_grid_reports_clear() {
        let mut analyzer = ColorAnalyzer::default();
        let broken = PixelGrid::new(4, 4, vec![Pixel::WHITE; 3]);
        assert!(analyzer.analyze(&broken).is_err());
        assert!(analyzer.generate_report(&broken).is_clear());
    }

    #[test]
    fn configured_top_k_limits_the_report() {
        let pixels: Vec<Pixel> = (0..10u8).map(|i| Pixel::rgb(i, i, i)).collect();
        let grid = PixelGrid::new(10, 1, pixels);
        let mut analyzer = ColorAnalyzer::new(AnalyzerConfig::builder().top_k(2).build());
        let report = analyzer.generate_report(&grid);
        assert_eq!(report.records().len(), 2);
        assert_eq!(report.records()[0].text, "10.00%\nR:0 G:0 B:0");
    }

    #[test]
    fn repeated_passes_are_identical() {
        let pixels: Vec<Pixel> = (0..64u32).map(|i| Pixel::rgb((i % 7) as u8, 0, 0)).collect();
        let grid = PixelGrid::new(8, 8, pixels);
        let mut analyzer = ColorAnalyzer::default();
        let first = analyzer.analyze(&grid).unwrap();
        let second = analyzer.analyze(&grid).unwrap();
        assert_eq!(first, second);
    }
}
