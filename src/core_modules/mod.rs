pub mod histogram;
pub mod pixel;
pub mod pixel_grid;
pub mod presentation;
pub mod ranking;
