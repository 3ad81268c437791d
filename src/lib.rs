// THEORY:
// This file is the main entry point for the `color_tally` library crate. It exposes
// a small, layered API for finding the dominant exact colors of video frames:
//
// - `pipeline`: the synchronous pass. Give it a `PixelGrid`, get back the ranked
//   top-K colors (`analyze`) or display-ready swatches (`ColorAnalyzer::generate_report`).
// - `scheduler`: the real-time driver. Runs passes on a fixed-delay cadence off the
//   caller's thread and delivers complete `Report`s over a channel, under an explicit
//   start/pause/resume/stop lifecycle.
//
// The building blocks (`core_modules`) stay public for callers that want to run a
// single stage, e.g. build a histogram without ranking it. Capturing frames and
// drawing swatches are left to the host.

pub mod core_modules;
pub mod error;
pub mod logger;
pub mod pipeline;
pub mod scheduler;

pub use core_modules::pixel_grid::PixelGrid;
pub use error::{Error, Result};
pub use pipeline::{AnalyzerConfig, ColorAnalyzer, Pixel, RankedEntry, Report, analyze};
pub use scheduler::{FrameSlot, FrameSource, PeriodicScheduler, SchedulerState, Signal};
