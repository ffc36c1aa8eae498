//! Test doubles for the emulation core and the display
//!
//! `ScriptedCore` fills each frame with a color derived from its frame number
//! and can be told to halt or fail at a given frame. `RecordingDisplay` keeps
//! a log of every draw command.

use std::sync::{Arc, Mutex};

use crate::consumer::{ColorFilter, Display};
use crate::error::CoreError;
use crate::handoff::ConsumedFrame;
use crate::modes::StereoLayout;
use crate::pixel::{Rgb, Rgba};
use crate::producer::{EmulationCore, FrameTarget, StepOutcome};
use crate::surface::DisplayRect;

/// Color `ScriptedCore` paints frame `n` with (1-based).
pub fn frame_color(n: u64) -> Rgb {
    Rgb::from_u32((n as u32).wrapping_mul(0x0101_0101) | 0x10)
}

/// Directives received by a [`ScriptedCore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedDirectives {
    pub parallax_disabled: Option<bool>,
    pub anaglyph: Option<(Rgb, Rgb)>,
    pub layout: Option<StereoLayout>,
}

/// Deterministic core for tests.
#[derive(Debug, Default)]
pub struct ScriptedCore {
    pub frames_run: u64,
    pub halt_at: Option<u64>,
    pub fail_at: Option<u64>,
    pub display: Option<DisplayRect>,
    pub directives: Arc<Mutex<ReceivedDirectives>>,
}

impl ScriptedCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `Halted` instead of frame `n`.
    pub fn halting_at(mut self, n: u64) -> Self {
        self.halt_at = Some(n);
        self
    }

    /// Fail instead of producing frame `n`.
    pub fn failing_at(mut self, n: u64) -> Self {
        self.fail_at = Some(n);
        self
    }
}

impl EmulationCore for ScriptedCore {
    fn set_parallax_disabled(&mut self, disabled: bool) {
        self.directives.lock().unwrap().parallax_disabled = Some(disabled);
    }

    fn set_anaglyph_colors(&mut self, left: Rgb, right: Rgb) {
        self.directives.lock().unwrap().anaglyph = Some((left, right));
    }

    fn set_stereo_layout(&mut self, layout: StereoLayout) {
        self.directives.lock().unwrap().layout = Some(layout);
    }

    fn run_frame(&mut self, target: &mut FrameTarget<'_>) -> Result<StepOutcome, CoreError> {
        let n = self.frames_run + 1;
        if self.halt_at == Some(n) {
            return Ok(StepOutcome::Halted);
        }
        if self.fail_at == Some(n) {
            // Leave a half-written frame behind
            target.surface.fill(Rgb::WHITE);
            return Err(CoreError::Fault(format!("scripted failure at frame {n}")));
        }
        target.surface.fill(frame_color(n));
        target.widths.fill_full(target.surface.width());
        self.frames_run = n;
        let display = self.display.unwrap_or_else(|| {
            DisplayRect::new(0, 0, target.surface.width(), target.surface.height())
        });
        Ok(StepOutcome::Frame { display })
    }
}

/// A recorded draw command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Rgb),
    Surface {
        sequence: u64,
        top_left: Rgb,
        src: DisplayRect,
        dst: DisplayRect,
        filter: ColorFilter,
    },
    Rect(DisplayRect, Rgba),
    Text {
        x: i32,
        y: i32,
        px: u32,
        text: String,
    },
    Present,
}

/// Display that records draw commands instead of rendering.
#[derive(Debug, Clone)]
pub struct RecordingDisplay {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

impl RecordingDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Commands issued since the last `Present`.
    pub fn last_refresh(&self) -> &[DrawOp] {
        let end = self.ops.len().saturating_sub(1);
        let start = self.ops[..end]
            .iter()
            .rposition(|op| *op == DrawOp::Present)
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.ops[start..]
    }

    pub fn surface_draws(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Surface { .. }))
    }

    pub fn presents(&self) -> usize {
        self.ops.iter().filter(|op| **op == DrawOp::Present).count()
    }
}

impl Display for RecordingDisplay {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgb) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn draw_surface(
        &mut self,
        frame: &ConsumedFrame,
        src: DisplayRect,
        dst: DisplayRect,
        filter: ColorFilter,
    ) {
        self.ops.push(DrawOp::Surface {
            sequence: frame.sequence,
            top_left: frame.surface.get(0, 0),
            src,
            dst,
            filter,
        });
    }

    fn fill_rect(&mut self, rect: DisplayRect, color: Rgba) {
        self.ops.push(DrawOp::Rect(rect, color));
    }

    fn draw_text(&mut self, x: i32, y: i32, px: u32, text: &str, _color: Rgba) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            px,
            text: text.to_string(),
        });
    }

    fn text_width(&self, px: u32, text: &str) -> u32 {
        text.chars().count() as u32 * px / 2
    }

    fn present(&mut self) {
        self.ops.push(DrawOp::Present);
    }
}
