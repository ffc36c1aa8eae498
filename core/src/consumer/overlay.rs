//! Frame rate debug overlay

use std::time::Instant;

use super::Display;
use crate::pixel::Rgba;
use crate::stats::{FrameCounts, RATE_RECALC_INTERVAL, RateSampler, RateSnapshot};
use crate::surface::DisplayRect;

pub const OVERLAY_X: i32 = 10;
pub const OVERLAY_Y: i32 = 30;
pub const OVERLAY_TEXT_PX: u32 = 14;
pub const OVERLAY_PADDING: u32 = 2;
pub const OVERLAY_BACKGROUND: Rgba = Rgba::from_u32(0x0000_0080);

/// Recomputes rates on a fixed cadence and draws them when enabled.
#[derive(Debug, Clone)]
pub struct DebugOverlay {
    enabled: bool,
    invocations: u64,
    sampler: RateSampler,
    text: String,
}

impl DebugOverlay {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            invocations: 0,
            sampler: RateSampler::new(),
            text: RateSnapshot::default().to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rates(&self) -> RateSnapshot {
        self.sampler.current()
    }

    /// Count one invocation; every [`RATE_RECALC_INTERVAL`]th one recalculates.
    ///
    /// Returns true when the rates were recalculated.
    pub fn tick(&mut self, counts: FrameCounts, now: Instant) -> bool {
        let due = self.invocations % RATE_RECALC_INTERVAL == 0;
        self.invocations += 1;
        if due {
            self.text = self.sampler.calculate(counts, now).to_string();
        }
        due
    }

    pub fn draw<D: Display + ?Sized>(&self, display: &mut D) {
        if !self.enabled {
            return;
        }
        let width = display.text_width(OVERLAY_TEXT_PX, &self.text);
        let pad = OVERLAY_PADDING as i32;
        let background = DisplayRect::new(
            OVERLAY_X - pad,
            OVERLAY_Y - pad,
            width + 2 * OVERLAY_PADDING,
            OVERLAY_TEXT_PX + 2 * OVERLAY_PADDING,
        );
        display.fill_rect(background, OVERLAY_BACKGROUND);
        display.draw_text(OVERLAY_X, OVERLAY_Y, OVERLAY_TEXT_PX, &self.text, Rgba::WHITE);
    }
}
