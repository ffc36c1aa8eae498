//! Fixed timestep pacing for the emulation loop

use std::time::{Duration, Instant};

use crate::config::EmulationConfig;

/// Pacing parameters.
#[derive(Debug, Clone)]
pub struct PacerConfig {
    /// Target frame rate in Hz. Zero runs frames back to back.
    pub tick_rate: u32,
    /// Maximum delta time clamp (prevents spiral of death)
    pub max_delta: Duration,
    /// CPU budget warning threshold per frame
    pub cpu_budget: Duration,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self::from(&EmulationConfig::default())
    }
}

impl From<&EmulationConfig> for PacerConfig {
    fn from(config: &EmulationConfig) -> Self {
        Self {
            tick_rate: config.tick_rate,
            max_delta: config.max_delta(),
            cpu_budget: config.cpu_budget(),
        }
    }
}

impl PacerConfig {
    pub fn unpaced() -> Self {
        Self {
            tick_rate: 0,
            ..Self::default()
        }
    }
}

/// Accumulates wall-clock time and releases it in fixed ticks.
#[derive(Debug)]
pub struct FramePacer {
    config: PacerConfig,
    tick_duration: Duration,
    accumulator: Duration,
    last_update: Option<Instant>,
}

impl FramePacer {
    pub fn new(config: PacerConfig) -> Self {
        let tick_duration = match config.tick_rate {
            0 => Duration::ZERO,
            hz => Duration::from_secs(1) / hz,
        };
        Self {
            config,
            tick_duration,
            accumulator: Duration::ZERO,
            last_update: None,
        }
    }

    pub fn is_paced(&self) -> bool {
        !self.tick_duration.is_zero()
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Add the time elapsed since the previous call.
    ///
    /// The first call credits exactly one tick.
    pub fn accumulate(&mut self, now: Instant) {
        let delta = match self.last_update {
            Some(last) => now.saturating_duration_since(last).min(self.config.max_delta),
            None => self.tick_duration,
        };
        self.last_update = Some(now);
        self.accumulator += delta;
    }

    /// Consume one tick if enough time has accumulated.
    pub fn try_tick(&mut self) -> bool {
        if !self.is_paced() {
            return true;
        }
        if self.accumulator >= self.tick_duration {
            self.accumulator -= self.tick_duration;
            true
        } else {
            false
        }
    }

    /// Time left until the next tick is due.
    pub fn time_until_next_tick(&self) -> Duration {
        self.tick_duration.saturating_sub(self.accumulator)
    }

    /// Warn when a frame ran past the CPU budget.
    pub fn check_budget(&self, frame_time: Duration) -> bool {
        if frame_time > self.config.cpu_budget {
            tracing::warn!(
                "Frame took {:?}, exceeds budget of {:?}",
                frame_time,
                self.config.cpu_budget
            );
            return false;
        }
        true
    }
}
