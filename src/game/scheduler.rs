//! Frame Scheduling
//!
//! The game never schedules itself. A [`FrameScheduler`] hands out frame
//! timestamps until it runs out or is stopped, and the session loop runs
//! one frame per timestamp.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::config::MAX_TICK_RATE;
use crate::core::clock::{Clock, SystemClock};

/// Source of frame timestamps.
pub trait FrameScheduler {
    /// Wait for the next frame. `None` ends the run.
    fn next_frame(&mut self) -> impl Future<Output = Option<i64>> + Send;
}

/// Cancels a running scheduler.
#[derive(Clone, Debug)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Signal every scheduler sharing this handle to stop.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    /// True once stop was requested.
    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

// =============================================================================
// REAL TIME
// =============================================================================

/// Fixed-rate frames from a tokio interval, stamped with wall-clock time.
///
/// Late frames are skipped rather than bunched.
pub struct IntervalScheduler<C: Clock = SystemClock> {
    interval: Interval,
    stop: watch::Receiver<bool>,
    remaining: Option<u64>,
    clock: C,
}

impl IntervalScheduler<SystemClock> {
    /// `tick_rate` frames per second, at most `frame_limit` frames.
    ///
    /// The rate is clamped to `1..=MAX_TICK_RATE`.
    pub fn new(tick_rate: u32, frame_limit: Option<u64>) -> (Self, StopHandle) {
        Self::with_clock(tick_rate, frame_limit, SystemClock)
    }
}

impl<C: Clock> IntervalScheduler<C> {
    /// Same as [`IntervalScheduler::new`] with a caller-supplied clock.
    pub fn with_clock(tick_rate: u32, frame_limit: Option<u64>, clock: C) -> (Self, StopHandle) {
        let tick_rate = tick_rate.clamp(1, MAX_TICK_RATE);
        let tick_duration = Duration::from_micros(1_000_000 / u64::from(tick_rate));
        let mut interval = interval(tick_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let (tx, rx) = watch::channel(false);
        let scheduler = Self { interval, stop: rx, remaining: frame_limit, clock };
        (scheduler, StopHandle { tx: Arc::new(tx) })
    }
}

impl<C: Clock> FrameScheduler for IntervalScheduler<C> {
    fn next_frame(&mut self) -> impl Future<Output = Option<i64>> + Send {
        async move {
            let stopped = *self.stop.borrow();
            if self.remaining == Some(0) || stopped {
                return None;
            }

            let stop = &mut self.stop;
            let interval = &mut self.interval;
            loop {
                tokio::select! {
                    biased;
                    changed = stop.changed() => {
                        // Sender gone counts as stop too
                        if changed.is_err() {
                            return None;
                        }
                        let stopped = *stop.borrow();
                        if stopped {
                            return None;
                        }
                    }
                    _ = interval.tick() => break,
                }
            }

            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            Some(self.clock.now_ms())
        }
    }
}

// =============================================================================
// STEPPED
// =============================================================================

/// Frames at a fixed simulated step, without waiting.
#[derive(Clone, Debug)]
pub struct SteppedScheduler {
    now_ms: i64,
    step_ms: i64,
    remaining: u64,
}

impl SteppedScheduler {
    /// `frames` frames starting at `start_ms`, `step_ms` apart.
    pub fn new(start_ms: i64, step_ms: i64, frames: u64) -> Self {
        Self { now_ms: start_ms, step_ms, remaining: frames }
    }

    /// Frames left.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl FrameScheduler for SteppedScheduler {
    fn next_frame(&mut self) -> impl Future<Output = Option<i64>> + Send {
        let frame = if self.remaining == 0 {
            None
        } else {
            let now = self.now_ms;
            self.remaining -= 1;
            self.now_ms += self.step_ms;
            Some(now)
        };
        std::future::ready(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;

    #[tokio::test]
    async fn test_stepped_frames() {
        let mut scheduler = SteppedScheduler::new(100, 16, 3);
        assert_eq!(scheduler.next_frame().await, Some(100));
        assert_eq!(scheduler.next_frame().await, Some(116));
        assert_eq!(scheduler.next_frame().await, Some(132));
        assert_eq!(scheduler.next_frame().await, None);
        assert_eq!(scheduler.remaining(), 0);
    }

    #[tokio::test]
    async fn test_interval_frame_limit() {
        let (mut scheduler, _stop) = IntervalScheduler::with_clock(60, Some(2), ManualClock::new(42));
        assert_eq!(scheduler.next_frame().await, Some(42));
        assert_eq!(scheduler.next_frame().await, Some(42));
        assert_eq!(scheduler.next_frame().await, None);
    }

    #[tokio::test]
    async fn test_interval_clamps_extreme_rates() {
        let (mut fast, _stop) = IntervalScheduler::with_clock(u32::MAX, Some(1), ManualClock::new(5));
        assert_eq!(fast.next_frame().await, Some(5));

        let (mut slow, _stop) = IntervalScheduler::with_clock(0, Some(1), ManualClock::new(6));
        assert_eq!(slow.next_frame().await, Some(6));
    }

    #[tokio::test]
    async fn test_interval_stops_on_signal() {
        let (mut scheduler, stop) = IntervalScheduler::with_clock(60, None, ManualClock::new(0));
        assert!(scheduler.next_frame().await.is_some());

        stop.stop();
        assert!(stop.is_stopped());
        assert_eq!(scheduler.next_frame().await, None);
    }

    #[tokio::test]
    async fn test_stop_handle_clones_share_signal() {
        let (mut scheduler, stop) = IntervalScheduler::with_clock(30, None, ManualClock::new(0));
        let other = stop.clone();
        other.stop();
        assert!(stop.is_stopped());
        assert_eq!(scheduler.next_frame().await, None);
    }
}
