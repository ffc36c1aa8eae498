//! Render consumer
//!
//! Runs inside the platform's per-refresh render callback. Each invocation
//! takes the newest published frame if there is one, otherwise redraws the
//! frame it already holds, then composites it for the session's 3D mode.
//!
//! ```text
//! IDLE ──(first frame consumed)──► FRAME_BOUND ──┐
//!                                      ▲         │ new frame or redraw
//!                                      └─────────┘
//! ```

mod composite;
mod overlay;

pub use composite::{DrawCall, plan, screen_quad};
pub use overlay::{
    DebugOverlay, OVERLAY_BACKGROUND, OVERLAY_PADDING, OVERLAY_TEXT_PX, OVERLAY_X, OVERLAY_Y,
};

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::handoff::ConsumedFrame;
use crate::modes::{Mode3D, StereoLayout};
use crate::pipeline::Pipeline;
use crate::pixel::{Rgb, Rgba};
use crate::surface::DisplayRect;

/// The output device the consumer draws on.
pub trait Display {
    /// Output size in pixels.
    fn size(&self) -> (u32, u32);

    fn clear(&mut self, color: Rgb);

    /// Scale `src` of `frame` into `dst`, applying `filter` to every pixel.
    fn draw_surface(
        &mut self,
        frame: &ConsumedFrame,
        src: DisplayRect,
        dst: DisplayRect,
        filter: ColorFilter,
    );

    /// Alpha-blended rectangle.
    fn fill_rect(&mut self, rect: DisplayRect, color: Rgba);

    /// Draw `text` with its top-left corner at (x, y), `px` pixels tall.
    fn draw_text(&mut self, x: i32, y: i32, px: u32, text: &str, color: Rgba);

    fn text_width(&self, px: u32, text: &str) -> u32;

    /// Called once after all drawing for a refresh.
    fn present(&mut self) {}
}

/// Per-pixel color operation applied while drawing a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFilter {
    /// Passthrough
    None,
    /// Channel-wise multiply
    Tint(Rgb),
    /// Keep only the channels the two eye filters pass
    Anaglyph { left: Rgb, right: Rgb },
}

impl ColorFilter {
    pub fn for_mode(mode: &Mode3D) -> Self {
        match mode.layout {
            StereoLayout::Mono if mode.left_color == Rgb::WHITE => ColorFilter::None,
            StereoLayout::Mono => ColorFilter::Tint(mode.left_color),
            StereoLayout::Anaglyph => ColorFilter::Anaglyph {
                left: mode.left_color,
                right: mode.right_color,
            },
            StereoLayout::SideBySide => ColorFilter::None,
        }
    }

    pub fn apply(self, color: Rgb) -> Rgb {
        match self {
            ColorFilter::None => color,
            ColorFilter::Tint(tint) => color.modulate(tint),
            ColorFilter::Anaglyph { left, right } => color.min(left.max(right)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    /// Nothing consumed yet; the display is cleared.
    Idle,
    /// A frame is bound and redrawn until a newer one arrives.
    FrameBound,
}

/// Consumes published frames and draws them for one session.
pub struct RenderConsumer<D: Display> {
    pipeline: Arc<Pipeline>,
    display: D,
    layout: StereoLayout,
    filter: ColorFilter,
    screen: (u32, u32),
    bound: ConsumedFrame,
    state: ConsumerState,
    overlay: DebugOverlay,
}

impl<D: Display> RenderConsumer<D> {
    pub fn new(
        pipeline: Arc<Pipeline>,
        display: D,
        mode: &Mode3D,
        screen: (u32, u32),
        show_fps: bool,
    ) -> Self {
        Self {
            pipeline,
            display,
            layout: mode.layout,
            filter: ColorFilter::for_mode(mode),
            screen,
            bound: ConsumedFrame::empty(),
            state: ConsumerState::Idle,
            overlay: DebugOverlay::new(show_fps),
        }
    }

    pub fn state(&self) -> ConsumerState {
        self.state
    }

    /// The frame currently drawn, once one has been consumed.
    pub fn bound_frame(&self) -> Option<&ConsumedFrame> {
        match self.state {
            ConsumerState::Idle => None,
            ConsumerState::FrameBound => Some(&self.bound),
        }
    }

    pub fn overlay(&self) -> &DebugOverlay {
        &self.overlay
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }

    /// One display refresh.
    pub fn on_refresh(&mut self) {
        let pipeline = &self.pipeline;
        if pipeline
            .channel
            .try_consume_into(&pipeline.frames, &mut self.bound)
        {
            if self.state == ConsumerState::Idle {
                debug!("First frame bound (seq {})", self.bound.sequence);
            }
            self.state = ConsumerState::FrameBound;
            pipeline.rates.record_drawn();
        }

        self.display.clear(Rgb::BLACK);
        if self.state == ConsumerState::FrameBound {
            let quad = screen_quad(self.display.size(), self.screen);
            for call in plan(self.layout, self.filter, &self.bound.rects, quad) {
                self.display
                    .draw_surface(&self.bound, call.src, call.dst, call.filter);
            }
        }

        pipeline.rates.record_blit();
        self.overlay.tick(pipeline.rates.counts(), Instant::now());
        self.overlay.draw(&mut self.display);
        self.display.present();
    }
}
