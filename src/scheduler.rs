// THEORY:
// The scheduler is the only part of the crate that knows about time and threads.
// It drives `ColorAnalyzer` passes on a fixed-delay cadence and hands finished
// `Report`s to whoever owns the presentation side.
//
// Two execution contexts are involved:
// 1.  **Worker context**: A spawned tokio task polls the `FrameSource` once, runs
//     the pass inside `spawn_blocking`, then sleeps for the interval. The first
//     cycle fires as soon as the run starts. A pass is plain CPU work with no
//     internal await points, so it belongs on the blocking pool, away from whatever
//     is keeping the host responsive.
// 2.  **Presentation context**: Owns the `mpsc::UnboundedReceiver<Report>` returned
//     by `PeriodicScheduler::new`. Only complete reports cross the channel. No raw
//     pixels, no partial histograms.
//
// Lifecycle is an explicit three-state machine (`Idle`, `Active`, `Suspended`)
// driven by abstract start/pause/resume/stop signals. Each time the state changes,
// the scheduler bumps an epoch under its lock. A worker only delivers a report if
// its own epoch is still current, and it checks and sends while holding that same
// lock. Once `stop()` returns, nothing from an earlier run can reach the receiver.
//
// A second, async lock is held for the full duration of every pass. An aborted
// worker's blocking pass keeps running to completion, and the lock makes the next
// run wait for it, so two passes never overlap.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

use crate::core_modules::pixel_grid::PixelGrid;
use crate::error::{Error, Result};
use crate::pipeline::{AnalyzerConfig, ColorAnalyzer, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// No recurring job exists.
    Idle,
    /// The recurring job is scheduled and running passes.
    Active,
    /// Halted by a pause signal, resumable.
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Start,
    Pause,
    Resume,
    Stop,
}

impl SchedulerState {
    /// The state `signal` leads to, or `None` if the signal is not valid here.
    pub fn transition(self, signal: Signal) -> Option<SchedulerState> {
        use SchedulerState::*;
        match (self, signal) {
            (Idle, Signal::Start) => Some(Active),
            (Active, Signal::Pause) => Some(Suspended),
            (Suspended, Signal::Resume) => Some(Active),
            (Active | Suspended, Signal::Stop) => Some(Idle),
            _ => None,
        }
    }
}

/// The capture side: hands out the most recent frame, if there is one.
pub trait FrameSource: Send + Sync + 'static {
    fn latest_frame(&self) -> Option<PixelGrid>;
}

impl<F> FrameSource for F
where
    F: Fn() -> Option<PixelGrid> + Send + Sync + 'static,
{
    fn latest_frame(&self) -> Option<PixelGrid> {
        self()
    }
}

/// Single-slot, latest-wins frame mailbox.
///
/// The capture side `publish`es, each scheduler cycle takes whatever is pending.
/// A cycle that finds the slot empty does nothing.
#[derive(Debug, Default)]
pub struct FrameSlot {
    pending: Mutex<Option<PixelGrid>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pending frame. Returns true if an unread frame was dropped.
    pub fn publish(&self, grid: PixelGrid) -> bool {
        lock(&self.pending).replace(grid).is_some()
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }
}

impl FrameSource for FrameSlot {
    fn latest_frame(&self) -> Option<PixelGrid> {
        lock(&self.pending).take()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct Lifecycle {
    state: SchedulerState,
    epoch: u64,
}

#[derive(Debug, PartialEq, Eq)]
enum Delivery {
    Sent,
    Stale,
    Closed,
}

/// Hands `report` to the presentation side if run `epoch` is still the live one.
fn deliver(
    lifecycle: &Mutex<Lifecycle>,
    reports: &mpsc::UnboundedSender<Report>,
    epoch: u64,
    report: Report,
) -> Delivery {
    let lifecycle = lock(lifecycle);
    if lifecycle.epoch != epoch || lifecycle.state != SchedulerState::Active {
        return Delivery::Stale;
    }
    match reports.send(report) {
        Ok(()) => Delivery::Sent,
        Err(_) => Delivery::Closed,
    }
}

/// Everything a worker run needs, moved into its task.
struct WorkerRun<S: FrameSource> {
    source: Arc<S>,
    config: AnalyzerConfig,
    lifecycle: Arc<Mutex<Lifecycle>>,
    pass_lock: Arc<tokio::sync::Mutex<()>>,
    reports: mpsc::UnboundedSender<Report>,
    epoch: u64,
}

impl<S: FrameSource> WorkerRun<S> {
    async fn run(self) {
        let mut analyzer = ColorAnalyzer::new(self.config);

        // Fixed delay: the wait starts when a cycle ends, so a slow pass pushes the
        // next one back instead of piling up behind it.
        while self.cycle(&mut analyzer).await.is_continue() {
            tokio::time::sleep(self.config.interval).await;
        }
    }

    /// One poll of the source and, if it had a frame, one pass plus hand-off.
    async fn cycle(&self, analyzer: &mut ColorAnalyzer) -> ControlFlow<()> {
        let Some(grid) = self.source.latest_frame() else {
            trace!(epoch = self.epoch, "No frame available, skipping cycle");
            return ControlFlow::Continue(());
        };

        let guard = self.pass_lock.clone().lock_owned().await;
        let mut pass_analyzer = std::mem::replace(analyzer, ColorAnalyzer::new(self.config));
        let pass = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let report = pass_analyzer.generate_report(&grid);
            (pass_analyzer, report)
        });

        let report = match pass.await {
            Ok((used, report)) => {
                *analyzer = used;
                report
            }
            Err(e) => {
                error!("Pass failed on worker: {}", e);
                return ControlFlow::Continue(());
            }
        };

        match deliver(&self.lifecycle, &self.reports, self.epoch, report) {
            Delivery::Sent => ControlFlow::Continue(()),
            Delivery::Stale => {
                debug!(epoch = self.epoch, "Run superseded, dropping its report");
                ControlFlow::Break(())
            }
            Delivery::Closed => {
                debug!("Presentation side hung up, ending run");
                ControlFlow::Break(())
            }
        }
    }
}

/// Runs analysis passes periodically against a `FrameSource`.
pub struct PeriodicScheduler<S: FrameSource> {
    source: Arc<S>,
    config: AnalyzerConfig,
    lifecycle: Arc<Mutex<Lifecycle>>,
    pass_lock: Arc<tokio::sync::Mutex<()>>,
    reports: mpsc::UnboundedSender<Report>,
    worker: Option<JoinHandle<()>>,
}

impl<S: FrameSource> PeriodicScheduler<S> {
    /// Creates an idle scheduler and the receiving end for its reports.
    pub fn new(source: Arc<S>, config: AnalyzerConfig) -> (Self, mpsc::UnboundedReceiver<Report>) {
        let (reports, receiver) = mpsc::unbounded_channel();
        let scheduler = Self {
            source,
            config,
            lifecycle: Arc::new(Mutex::new(Lifecycle {
                state: SchedulerState::Idle,
                epoch: 0,
            })),
            pass_lock: Arc::new(tokio::sync::Mutex::new(())),
            reports,
            worker: None,
        };
        (scheduler, receiver)
    }

    pub fn state(&self) -> SchedulerState {
        lock(&self.lifecycle).state
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn start(&mut self) -> Result<SchedulerState> {
        self.signal(Signal::Start)
    }

    pub fn pause(&mut self) -> Result<SchedulerState> {
        self.signal(Signal::Pause)
    }

    pub fn resume(&mut self) -> Result<SchedulerState> {
        self.signal(Signal::Resume)
    }

    pub fn stop(&mut self) -> Result<SchedulerState> {
        self.signal(Signal::Stop)
    }

    /// Applies a lifecycle signal. Invalid signals leave the state unchanged.
    ///
    /// Entering `Active` spawns a worker onto the current tokio runtime, so it must
    /// be called from within one.
    pub fn signal(&mut self, signal: Signal) -> Result<SchedulerState> {
        let mut lifecycle = lock(&self.lifecycle);
        let from = lifecycle.state;
        let to = from
            .transition(signal)
            .ok_or(Error::InvalidTransition {
                state: from,
                signal,
            })?;

        let runtime = if to == SchedulerState::Active {
            Some(Handle::try_current().map_err(|e| Error::Worker(e.to_string()))?)
        } else {
            None
        };

        lifecycle.state = to;
        lifecycle.epoch += 1;
        let epoch = lifecycle.epoch;
        drop(lifecycle);

        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
        if let Some(runtime) = runtime {
            let run = WorkerRun {
                source: self.source.clone(),
                config: self.config,
                lifecycle: self.lifecycle.clone(),
                pass_lock: self.pass_lock.clone(),
                reports: self.reports.clone(),
                epoch,
            };
            self.worker = Some(runtime.spawn(run.run()));
        }

        info!(?signal, ?from, ?to, "Scheduler transition");
        Ok(to)
    }
}

impl<S: FrameSource> Drop for PeriodicScheduler<S> {
    fn drop(&mut self) {
        // Same teardown as stop: a worker mid-cycle on another thread must find its
        // epoch stale before it can deliver.
        let mut lifecycle = lock(&self.lifecycle);
        lifecycle.state = SchedulerState::Idle;
        lifecycle.epoch += 1;
        drop(lifecycle);

        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}
