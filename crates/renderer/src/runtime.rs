use std::time::{Duration, Instant};

/// Paces redraws at a fixed frame rate.
///
/// Deadlines advance by whole intervals so the cadence stays steady; a frame
/// that lands more than one interval late re-anchors the schedule instead of
/// firing a burst of catch-up frames.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    next_deadline: Option<Instant>,
}

impl FrameScheduler {
    /// `None` or a non-positive rate renders on every loop iteration.
    pub fn new(fps: Option<f32>) -> Self {
        Self {
            interval: interval_for(fps),
            next_deadline: None,
        }
    }

    pub fn set_rate(&mut self, fps: Option<f32>) {
        self.interval = interval_for(fps);
        self.next_deadline = None;
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        self.next_deadline.is_none_or(|deadline| now >= deadline)
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        let Some(interval) = self.interval else {
            self.next_deadline = None;
            return;
        };
        let next = match self.next_deadline {
            Some(previous) if now.saturating_duration_since(previous) < interval => {
                previous + interval
            }
            _ => now + interval,
        };
        self.next_deadline = Some(next);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_deadline
    }
}

/// Wall-clock instant at which a bounded run ends.
///
/// `None` when the duration does not fit in an `Instant`; such a run is
/// treated as unbounded.
pub fn run_deadline(start: Instant, run_for: Duration) -> Option<Instant> {
    start.checked_add(run_for)
}

fn interval_for(fps: Option<f32>) -> Option<Duration> {
    fps.filter(|fps| fps.is_finite() && *fps > 0.0)
        .map(|fps| Duration::from_secs_f32(1.0 / fps))
}

/// Host-owned frame counter handed to the sketch on every draw.
///
/// The first drawn frame observes `1`, and the counter only ever grows.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCounter {
    count: u64,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances to the next frame and returns its number.
    pub fn advance(&mut self) -> u64 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Number of the most recently started frame (`0` before the first).
    pub fn current(&self) -> u64 {
        self.count
    }
}

/// Rolling frames-per-second estimate logged once per window.
#[derive(Debug, Clone)]
pub struct FrameStats {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FrameStats {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Records a presented frame; true once per window, when [`FrameStats::fps`]
    /// has just been refreshed.
    pub fn record(&mut self, now: Instant) -> bool {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Self::WINDOW {
            return false;
        }
        self.fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        true
    }

    /// Most recent estimate; `0.0` until the first window completes.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}
