//! redview core - frame pipeline for stereoscopic emulator output
//!
//! Hands emulated frames from a real-time emulation thread to a
//! display-synchronized renderer and composites them for one of a fixed set
//! of 3D presentation modes.
//!
//! # Architecture
//!
//! - [`ModeCatalog`] - Read-only table of 3D modes
//! - [`FrameBuffer`] - Double-buffered surfaces with scanline widths
//! - [`HandoffChannel`] - Most-recent-wins publish/consume of finished frames
//! - [`EmulationProducer`] - Drives an [`EmulationCore`] and publishes frames
//! - [`RenderConsumer`] - Draws the newest frame on every display refresh
//! - [`Session`] - Wires the above together for one emulation run

pub mod config;
pub mod consumer;
pub mod error;
pub mod frame_buffer;
pub mod handoff;
pub mod modes;
pub mod pipeline;
pub mod pixel;
pub mod platform;
pub mod producer;
pub mod session;
pub mod stats;
pub mod surface;
#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use consumer::{ColorFilter, ConsumerState, Display, RenderConsumer};
pub use error::{ConfigError, CoreError, PipelineError};
pub use frame_buffer::{BLANK_COLOR, FrameBuffer, FrameTags, FrameTarget, FrameWriter};
pub use handoff::{Consume, ConsumedFrame, HandoffChannel, HandoffStats};
pub use modes::{DEFAULT_MODE_KEY, Mode3D, ModeCatalog, StereoLayout};
pub use pipeline::Pipeline;
pub use pixel::{Pixel, PixelFormat, PixelRepr, Rgb, Rgba};
pub use platform::{RenderCallbackSlot, VsyncDriver};
pub use producer::{
    CoreDirectives, EmulationCore, EmulationProducer, PacerConfig, ProducerExit, ProducerHandle,
    StepOutcome, StopToken,
};
pub use session::{Session, SessionConfig, SessionOutcome, SessionReport};
pub use stats::{FrameRates, RateSnapshot};
pub use surface::{
    DEFAULT_SCREEN_X, DEFAULT_SCREEN_Y, DisplayRect, DisplayRects, ScanlineWidths, Surface,
    VB_HEIGHT, VB_WIDTH,
};
