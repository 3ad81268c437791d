// Demo runner for the `color_tally` library.
//
// A synthetic camera publishes shifting color bands into a `FrameSlot` while the
// scheduler analyzes them. The swatches it would display are logged instead. The
// run walks the whole lifecycle: start, pause (as if backgrounded), resume, stop.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use color_tally::{AnalyzerConfig, FrameSlot, PeriodicScheduler, Pixel, PixelGrid, Report, logger};
use tokio::sync::mpsc;
use tracing::info;

const FRAME_WIDTH: usize = 320;
const FRAME_HEIGHT: usize = 180;
const FRAME_PERIOD: Duration = Duration::from_millis(33);

const BANDS: [Pixel; 6] = [
    Pixel::rgb(220, 20, 60),
    Pixel::rgb(30, 144, 255),
    Pixel::rgb(250, 250, 240),
    Pixel::rgb(34, 139, 34),
    Pixel::rgb(255, 215, 0),
    Pixel::rgb(20, 20, 20),
];

/// Vertical bands whose widths drift with `tick`, so the ranking keeps changing.
fn synthetic_frame(tick: usize) -> PixelGrid {
    let mut pixels = Vec::with_capacity(FRAME_WIDTH * FRAME_HEIGHT);
    for _ in 0..FRAME_HEIGHT {
        for x in 0..FRAME_WIDTH {
            let shifted = (x * x / FRAME_WIDTH + tick * 3) % FRAME_WIDTH;
            pixels.push(BANDS[shifted * BANDS.len() / FRAME_WIDTH]);
        }
    }
    PixelGrid::new(FRAME_WIDTH, FRAME_HEIGHT, pixels)
}

async fn display(mut reports: mpsc::UnboundedReceiver<Report>) -> usize {
    let mut shown = 0;
    while let Some(report) = reports.recv().await {
        shown += 1;
        match report {
            Report::Clear => info!("swatches cleared"),
            Report::TopColors(records) => {
                for (rank, record) in records.iter().enumerate() {
                    info!("#{} {}", rank + 1, record);
                }
            }
        }
    }
    shown
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();

    let seconds: u64 = match env::args().nth(1) {
        Some(arg) => arg.parse::<u64>().context("usage: color_tally [seconds]")?,
        None => 2,
    };
    let run_for = Duration::from_secs(seconds.max(1));

    info!("Color Tally - Demo Runner");

    let slot = Arc::new(FrameSlot::new());
    let camera_slot = slot.clone();
    let camera = tokio::spawn(async move {
        let mut tick = 0usize;
        loop {
            camera_slot.publish(synthetic_frame(tick));
            tick += 1;
            tokio::time::sleep(FRAME_PERIOD).await;
        }
    });

    let config = AnalyzerConfig::builder().interval(Duration::from_millis(250)).build();
    let (mut scheduler, reports) = PeriodicScheduler::new(slot, config);
    let presenter = tokio::spawn(display(reports));

    scheduler.start()?;
    tokio::time::sleep(run_for / 2).await;

    scheduler.pause()?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    scheduler.resume()?;

    tokio::time::sleep(run_for / 2).await;
    scheduler.stop()?;

    camera.abort();
    // Dropping the scheduler closes the report channel and lets the presenter finish.
    drop(scheduler);
    let shown = presenter.await.context("presenter task failed")?;
    info!("Done, {} reports shown", shown);
    Ok(())
}
