//! Operator-feedback progression, decoupled from real completion timing.
//!
//! Two independent indicators:
//!
//! - [`StageTracker`] walks the named pipeline stages on a fixed wall-clock
//!   schedule while the real run is in flight. The schedule is illustrative;
//!   the real outcome reconciles it (success forces the final stage, failure
//!   resets). Every deferred transition is keyed to the run that scheduled
//!   it and is cancelled the moment that run ends — a stale timer must never
//!   write after the fact.
//! - [`ProgressGauge`] is a coarse percentage advanced at real pipeline
//!   milestones, for a linear progress indicator.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// The named stages shown to the operator during a run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    Upload,
    Scan,
    Identify,
    Detect,
    Report,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::Upload,
        PipelineStage::Scan,
        PipelineStage::Identify,
        PipelineStage::Detect,
        PipelineStage::Report,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::Upload => "Upload",
            PipelineStage::Scan => "Scan",
            PipelineStage::Identify => "Identify",
            PipelineStage::Detect => "Detect",
            PipelineStage::Report => "Report",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PipelineStage::Upload => "Uploading image",
            PipelineStage::Scan => "Scanning object",
            PipelineStage::Identify => "Identifying material",
            PipelineStage::Detect => "Detecting defects",
            PipelineStage::Report => "Generating report",
        }
    }
}

/// Wall-clock schedule for the illustrative stage advancement.
#[derive(Debug, Clone)]
pub struct StageSchedule {
    /// Delay from run start to entering Scan, Identify, Detect, Report.
    pub advance_after: [Duration; 4],
    /// Pause after success so the operator sees the finished animation
    /// before navigation.
    pub completion_grace: Duration,
}

impl Default for StageSchedule {
    fn default() -> Self {
        Self {
            advance_after: [
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(7),
                Duration::from_secs(10),
            ],
            completion_grace: Duration::from_millis(800),
        }
    }
}

/// Point-in-time view of the stage tracker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct StageSnapshot {
    /// `None` outside a run (and after failure/reset).
    pub current: Option<PipelineStage>,
    pub complete: bool,
}

#[derive(Debug, Default)]
struct TrackerState {
    /// Identity of the owning run; bumped on start, completion and reset so
    /// a timer scheduled by an earlier run can never apply its transition.
    run: u64,
    current: Option<PipelineStage>,
    complete: bool,
    timers: Vec<JoinHandle<()>>,
}

impl TrackerState {
    fn cancel_timers(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }
}

/// Timer-driven stage progression with a hard cancellation contract.
#[derive(Debug)]
pub struct StageTracker {
    inner: Arc<Mutex<TrackerState>>,
    schedule: StageSchedule,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new(StageSchedule::default())
    }
}

impl StageTracker {
    pub fn new(schedule: StageSchedule) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrackerState::default())),
            schedule,
        }
    }

    pub fn snapshot(&self) -> StageSnapshot {
        let state = self.inner.lock().unwrap();
        StageSnapshot {
            current: state.current,
            complete: state.complete,
        }
    }

    pub fn schedule(&self) -> &StageSchedule {
        &self.schedule
    }

    /// Enter the first stage immediately and schedule the one-shot deferred
    /// advancements. Must run inside a tokio runtime.
    pub fn start(&self) {
        let mut state = self.inner.lock().unwrap();
        state.cancel_timers();
        state.run = state.run.wrapping_add(1);
        state.current = Some(PipelineStage::Upload);
        state.complete = false;
        let run = state.run;

        let later = [
            PipelineStage::Scan,
            PipelineStage::Identify,
            PipelineStage::Detect,
            PipelineStage::Report,
        ];
        for (stage, delay) in later.into_iter().zip(self.schedule.advance_after) {
            let inner = Arc::clone(&self.inner);
            state.timers.push(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let mut state = inner.lock().unwrap();
                // Stale-timer guard: only the run that scheduled this
                // transition may apply it, and never after completion.
                if state.run == run && !state.complete {
                    debug!(stage = stage.label(), "stage advanced");
                    state.current = Some(stage);
                }
            }));
        }
    }

    /// Success path: cancel everything pending and force the final stage,
    /// regardless of where the deferred schedule had reached.
    pub fn complete(&self) {
        let mut state = self.inner.lock().unwrap();
        state.run = state.run.wrapping_add(1);
        state.cancel_timers();
        state.current = Some(PipelineStage::Report);
        state.complete = true;
    }

    /// Failure/abort path: cancel everything pending and return to the
    /// pre-pipeline state.
    pub fn reset(&self) {
        let mut state = self.inner.lock().unwrap();
        state.run = state.run.wrapping_add(1);
        state.cancel_timers();
        state.current = None;
        state.complete = false;
    }

    /// The post-success grace pause, awaited before signalling downstream.
    pub async fn settle(&self) {
        tokio::time::sleep(self.schedule.completion_grace).await;
    }
}

/// Percent milestones of the real pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Milestone {
    Started,
    Validated,
    Uploaded,
    Invoking,
    Invoked,
    Finished,
}

impl Milestone {
    pub fn percent(self) -> u8 {
        match self {
            Milestone::Started => 10,
            Milestone::Validated => 20,
            Milestone::Uploaded => 40,
            Milestone::Invoking => 50,
            Milestone::Invoked => 90,
            Milestone::Finished => 100,
        }
    }
}

/// Coarse linear progress indicator, 0-100.
#[derive(Debug, Default)]
pub struct ProgressGauge {
    percent: AtomicU8,
}

impl ProgressGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    pub fn advance(&self, milestone: Milestone) {
        self.percent.store(milestone.percent(), Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.percent.store(0, Ordering::Relaxed);
    }
}
