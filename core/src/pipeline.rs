//! The shared pipeline object: frame buffer, handoff channel and rate counters
//!
//! Constructed once per session, shared between the producer thread and the
//! render callback, and torn down after both have stopped.

use crate::error::PipelineError;
use crate::frame_buffer::FrameBuffer;
use crate::handoff::HandoffChannel;
use crate::stats::FrameRates;

#[derive(Debug)]
pub struct Pipeline {
    pub frames: FrameBuffer,
    pub channel: HandoffChannel,
    pub rates: FrameRates,
}

impl Pipeline {
    /// Allocate the frame buffer at native resolution.
    pub fn initialize() -> Result<Self, PipelineError> {
        Ok(Self::from_frames(FrameBuffer::initialize()?))
    }

    pub fn with_size(width: u32, height: u32) -> Result<Self, PipelineError> {
        Ok(Self::from_frames(FrameBuffer::with_size(width, height)?))
    }

    fn from_frames(frames: FrameBuffer) -> Self {
        Self {
            frames,
            channel: HandoffChannel::new(),
            rates: FrameRates::new(),
        }
    }

    /// Blank both buffers so the first displayed frame is never garbage.
    pub fn clear_all(&self) -> Result<(), PipelineError> {
        self.frames.clear(0)?;
        self.frames.clear(1)
    }

    pub fn teardown(&self) {
        self.frames.teardown();
    }
}
