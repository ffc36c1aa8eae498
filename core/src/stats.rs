//! Frame rate counters
//!
//! Three independent counters shared between the producer and the consumer.
//! They feed the debug overlay only and carry no correctness guarantees.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Consumer invocations between rate recalculations.
pub const RATE_RECALC_INTERVAL: u64 = 60;

/// Monotonic counters for emulated, drawn and blitted frames.
#[derive(Debug, Default)]
pub struct FrameRates {
    emulated: AtomicU64,
    drawn: AtomicU64,
    blit: AtomicU64,
}

impl FrameRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame left the emulation core.
    pub fn record_emulated(&self) {
        self.emulated.fetch_add(1, Ordering::Relaxed);
    }

    /// A new frame was bound for drawing.
    pub fn record_drawn(&self) {
        self.drawn.fetch_add(1, Ordering::Relaxed);
    }

    /// The display was redrawn.
    pub fn record_blit(&self) {
        self.blit.fetch_add(1, Ordering::Relaxed);
    }

    pub fn counts(&self) -> FrameCounts {
        FrameCounts {
            emulated: self.emulated.load(Ordering::Relaxed),
            drawn: self.drawn.load(Ordering::Relaxed),
            blit: self.blit.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameCounts {
    pub emulated: u64,
    pub drawn: u64,
    pub blit: u64,
}

/// Rates in frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateSnapshot {
    pub virt: f32,
    pub drawn: f32,
    pub blit: f32,
}

impl RateSnapshot {
    pub fn labels(&self) -> [String; 3] {
        [
            format!("{:.1} virt", self.virt),
            format!("{:.1} drawn", self.drawn),
            format!("{:.1} blit", self.blit),
        ]
    }
}

impl fmt::Display for RateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [virt, drawn, blit] = self.labels();
        write!(f, "{} {} {}", virt, drawn, blit)
    }
}

/// Turns counter deltas into rates over wall-clock time.
#[derive(Debug, Clone)]
pub struct RateSampler {
    last_counts: FrameCounts,
    last_time: Option<Instant>,
    current: RateSnapshot,
}

impl RateSampler {
    pub fn new() -> Self {
        Self {
            last_counts: FrameCounts::default(),
            last_time: None,
            current: RateSnapshot::default(),
        }
    }

    /// Recompute rates from the counts accumulated since the last call.
    ///
    /// The first call only records a baseline.
    pub fn calculate(&mut self, counts: FrameCounts, now: Instant) -> RateSnapshot {
        if let Some(last) = self.last_time {
            let elapsed = now.duration_since(last).as_secs_f32();
            if elapsed > 0.0 {
                let rate = |new: u64, old: u64| new.saturating_sub(old) as f32 / elapsed;
                self.current = RateSnapshot {
                    virt: rate(counts.emulated, self.last_counts.emulated),
                    drawn: rate(counts.drawn, self.last_counts.drawn),
                    blit: rate(counts.blit, self.last_counts.blit),
                };
            }
        }
        self.last_counts = counts;
        self.last_time = Some(now);
        self.current
    }

    pub fn current(&self) -> RateSnapshot {
        self.current
    }
}

impl Default for RateSampler {
    fn default() -> Self {
        Self::new()
    }
}
