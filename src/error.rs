use thiserror::Error;

use crate::scheduler::{SchedulerState, Signal};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Pixel grid is {width}x{height} but holds {len} pixels")]
    DimensionMismatch {
        width: usize,
        height: usize,
        len: usize,
    },

    #[error("Declared pixel total {declared} does not match counted total {counted}")]
    TotalMismatch { declared: usize, counted: usize },

    #[error("Cannot compute percentages over zero pixels ({distinct} colors in map)")]
    ZeroTotal { distinct: usize },

    #[error("Signal {signal:?} is not valid while {state:?}")]
    InvalidTransition {
        state: SchedulerState,
        signal: Signal,
    },

    #[error("Worker error: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, Error>;
