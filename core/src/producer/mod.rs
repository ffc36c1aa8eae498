//! Emulation producer
//!
//! Runs the emulation core one frame at a time on its own thread, writes each
//! finished frame into the inactive buffer and publishes it to the consumer.
//!
//! ```text
//! Emulation Thread                          Render Callback
//!     │                                           │
//! [begin_frame] (lock inactive slot)              │
//! [core.run_frame → surface + widths]             │
//! [publish: tag widths, rects, surface]           │
//!     │──────────(ready word)───────────────────►[try_consume]
//! [flip write index]                              │
//! ```
//!
//! The mode is resolved once when the producer is built; its directives stay
//! fixed until the session is restarted.

mod handle;
mod pacing;

pub use handle::{ProducerHandle, ProducerReport, StopToken};
pub use pacing::{FramePacer, PacerConfig};

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{CoreError, PipelineError};
pub use crate::frame_buffer::FrameTarget;
use crate::modes::{Mode3D, StereoLayout};
use crate::pipeline::Pipeline;
use crate::pixel::Rgb;
use crate::surface::{DisplayRect, DisplayRects};

/// What one emulation step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A frame is complete; `display` is the region the core drew.
    Frame { display: DisplayRect },
    /// The game ended normally.
    Halted,
}

/// The emulation core's video-facing interface.
pub trait EmulationCore: Send {
    /// Disable generation of per-eye parallax.
    fn set_parallax_disabled(&mut self, disabled: bool);

    /// Tint colors for the left and right eye.
    fn set_anaglyph_colors(&mut self, left: Rgb, right: Rgb);

    /// How the two eyes should be laid out on the output surface.
    fn set_stereo_layout(&mut self, layout: StereoLayout);

    /// Emulate one frame into `target`.
    fn run_frame(&mut self, target: &mut FrameTarget<'_>) -> Result<StepOutcome, CoreError>;
}

/// Per-session settings a mode translates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreDirectives {
    pub parallax_disabled: bool,
    pub left_color: Rgb,
    pub right_color: Rgb,
    pub layout: StereoLayout,
}

impl CoreDirectives {
    pub fn for_mode(mode: &Mode3D) -> Self {
        Self {
            parallax_disabled: !mode.is_parallax,
            left_color: mode.left_color,
            right_color: mode.right_color,
            layout: mode.layout,
        }
    }

    pub fn apply<C: EmulationCore + ?Sized>(&self, core: &mut C) {
        core.set_parallax_disabled(self.parallax_disabled);
        core.set_anaglyph_colors(self.left_color, self.right_color);
        core.set_stereo_layout(self.layout);
    }
}

/// Source rects for a frame: one view, or left and right halves for side by side.
pub fn display_rects(layout: StereoLayout, display: DisplayRect) -> DisplayRects {
    match layout {
        StereoLayout::SideBySide => {
            let (left, right) = display.split_halves();
            DisplayRects::stereo(left, right)
        }
        StereoLayout::Mono | StereoLayout::Anaglyph => DisplayRects::mono(display),
    }
}

/// Why the producer loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducerExit {
    /// A stop was requested.
    Stopped,
    /// The core reported the game ended.
    Halted,
    /// The configured frame count was reached.
    FrameLimit,
    /// The core failed; buffers keep the last published frame.
    Failed(CoreError),
    /// The frame buffer was torn down underneath the producer.
    TornDown,
    /// The producer thread panicked.
    Panicked,
}

impl ProducerExit {
    /// Whether the loop ended without a fault.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Stopped | Self::Halted | Self::FrameLimit)
    }
}

/// Drives an [`EmulationCore`] and publishes its frames.
pub struct EmulationProducer<C: EmulationCore> {
    core: C,
    pipeline: Arc<Pipeline>,
    layout: StereoLayout,
    pacer: FramePacer,
    frame_limit: Option<u64>,
    frames: u64,
}

impl<C: EmulationCore> EmulationProducer<C> {
    /// Apply the mode's directives to `core` and prepare the loop.
    pub fn new(
        mut core: C,
        pipeline: Arc<Pipeline>,
        mode: &Mode3D,
        pacing: PacerConfig,
        frame_limit: Option<u64>,
    ) -> Self {
        let directives = CoreDirectives::for_mode(mode);
        directives.apply(&mut core);
        debug!("Core directives for '{}': {:?}", mode.key, directives);
        Self {
            core,
            pipeline,
            layout: mode.layout,
            pacer: FramePacer::new(pacing),
            frame_limit,
            frames: 0,
        }
    }

    /// Frames published so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn into_core(self) -> C {
        self.core
    }

    /// Emulate and publish one frame.
    ///
    /// Returns the published sequence number, or the reason the loop must end.
    pub fn step(&mut self) -> Result<u64, ProducerExit> {
        let mut writer = self.pipeline.frames.begin_frame().map_err(|e| match e {
            PipelineError::TornDown => ProducerExit::TornDown,
            other => {
                warn!("Cannot begin frame: {}", other);
                ProducerExit::TornDown
            }
        })?;

        let outcome = self.core.run_frame(&mut writer.target());
        match outcome {
            Ok(StepOutcome::Frame { display }) => {
                let rects = display_rects(self.layout, display);
                let seq = self.pipeline.channel.publish(writer, rects);
                self.pipeline.rates.record_emulated();
                self.frames += 1;
                Ok(seq)
            }
            Ok(StepOutcome::Halted) => {
                info!("Emulation halted after {} frames", self.frames);
                Err(ProducerExit::Halted)
            }
            Err(e) => {
                warn!("Emulation step failed after {} frames: {}", self.frames, e);
                Err(ProducerExit::Failed(e))
            }
        }
    }

    /// Run paced frames until stopped, halted, failed or out of frames.
    pub fn run(&mut self, stop: &StopToken) -> ProducerExit {
        debug!("Emulation loop started");
        loop {
            if stop.is_stopped() {
                return ProducerExit::Stopped;
            }
            self.pacer.accumulate(Instant::now());
            while self.pacer.try_tick() {
                if stop.is_stopped() {
                    return ProducerExit::Stopped;
                }
                if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
                    return ProducerExit::FrameLimit;
                }
                let frame_start = Instant::now();
                if let Err(exit) = self.step() {
                    return exit;
                }
                self.pacer.check_budget(frame_start.elapsed());
            }
            std::thread::sleep(self.pacer.time_until_next_tick());
        }
    }
}

#[cfg(test)]
mod tests;
