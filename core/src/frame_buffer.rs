//! Double-buffered frame storage
//!
//! Two slots, each holding a surface, its scanline widths, the display rects
//! for the frame and the sequence tags stamped at publish time. The producer
//! alternates between the slots on every completed frame; the write index is
//! owned by the producer side and never touched by the consumer.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::pixel::Rgb;
use crate::surface::{DisplayRects, ScanlineWidths, Surface, VB_HEIGHT, VB_WIDTH};

/// Color surfaces are cleared to at pipeline start.
pub const BLANK_COLOR: Rgb = Rgb::BLACK;

/// Frame sequence numbers stamped on each component of a slot.
///
/// Zero means "not published". A slot is consistent when all three carry the
/// same non-zero sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTags {
    pub surface: u64,
    pub widths: u64,
    pub rects: u64,
}

impl FrameTags {
    /// The sequence shared by all three components, if any.
    pub fn consistent(&self) -> Option<u64> {
        (self.surface != 0 && self.surface == self.widths && self.widths == self.rects)
            .then_some(self.surface)
    }
}

/// Contents of one buffer.
#[derive(Debug)]
pub(crate) struct FrameSlot {
    pub(crate) surface: Surface,
    pub(crate) widths: ScanlineWidths,
    pub(crate) rects: DisplayRects,
    pub(crate) tags: FrameTags,
    pub(crate) live: bool,
}

impl FrameSlot {
    fn allocate(width: u32, height: u32) -> Result<Self, PipelineError> {
        Ok(Self {
            surface: Surface::new(width, height)?,
            widths: ScanlineWidths::new(height)?,
            rects: DisplayRects::default(),
            tags: FrameTags::default(),
            live: true,
        })
    }

    fn release(&mut self) {
        self.surface.release();
        self.widths.release();
        self.rects = DisplayRects::default();
        self.tags = FrameTags::default();
        self.live = false;
    }
}

/// Where the emulation core writes one frame.
pub struct FrameTarget<'a> {
    pub surface: &'a mut Surface,
    pub widths: &'a mut ScanlineWidths,
}

/// The pair of frame slots shared by producer and consumer.
#[derive(Debug)]
pub struct FrameBuffer {
    slots: [Mutex<FrameSlot>; 2],
    write_index: AtomicUsize,
    live: AtomicBool,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    /// Allocate both buffers at the native resolution.
    pub fn initialize() -> Result<Self, PipelineError> {
        Self::with_size(VB_WIDTH, VB_HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Result<Self, PipelineError> {
        let slots = [
            Mutex::new(FrameSlot::allocate(width, height)?),
            Mutex::new(FrameSlot::allocate(width, height)?),
        ];
        debug!("Frame buffer allocated: 2 x {}x{}", width, height);
        Ok(Self {
            slots,
            write_index: AtomicUsize::new(0),
            live: AtomicBool::new(true),
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Buffer holding the most recently completed frame.
    pub fn active_index(&self) -> usize {
        1 - self.inactive_index()
    }

    /// Buffer the producer writes the next frame into.
    pub fn inactive_index(&self) -> usize {
        self.write_index.load(Ordering::Relaxed)
    }

    /// Fill a buffer with [`BLANK_COLOR`] and reset its metadata.
    pub fn clear(&self, index: usize) -> Result<(), PipelineError> {
        let slot = self.slots.get(index).ok_or(PipelineError::InvalidIndex(index))?;
        let mut slot = lock_slot(slot);
        if !slot.live {
            return Err(PipelineError::TornDown);
        }
        slot.surface.fill(BLANK_COLOR);
        slot.widths.reset();
        slot.rects = DisplayRects::default();
        slot.tags = FrameTags::default();
        Ok(())
    }

    /// Start writing the next frame into the inactive buffer.
    ///
    /// The returned writer holds the slot until it is published.
    pub fn begin_frame(&self) -> Result<FrameWriter<'_>, PipelineError> {
        if !self.is_live() {
            return Err(PipelineError::TornDown);
        }
        let index = self.inactive_index();
        let mut slot = lock_slot(&self.slots[index]);
        // teardown may have run between the live check and the lock
        if !slot.live {
            return Err(PipelineError::TornDown);
        }
        slot.tags = FrameTags::default();
        Ok(FrameWriter {
            buffer: self,
            index,
            slot,
        })
    }

    /// Release both surfaces and width arrays. Safe to call repeatedly.
    pub fn teardown(&self) {
        if !self.live.swap(false, Ordering::AcqRel) {
            return;
        }
        for slot in &self.slots {
            lock_slot(slot).release();
        }
        debug!("Frame buffer torn down");
    }

    pub(crate) fn slot(&self, index: usize) -> &Mutex<FrameSlot> {
        &self.slots[index & 1]
    }
}

fn lock_slot(slot: &Mutex<FrameSlot>) -> MutexGuard<'_, FrameSlot> {
    slot.lock().unwrap_or_else(|e| {
        warn!("Frame slot mutex poisoned, recovering");
        e.into_inner()
    })
}

/// Exclusive write access to the inactive buffer for one frame.
pub struct FrameWriter<'a> {
    buffer: &'a FrameBuffer,
    index: usize,
    slot: MutexGuard<'a, FrameSlot>,
}

impl<'a> FrameWriter<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn target(&mut self) -> FrameTarget<'_> {
        let slot = &mut *self.slot;
        FrameTarget {
            surface: &mut slot.surface,
            widths: &mut slot.widths,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.slot.surface
    }

    pub fn widths(&self) -> &ScanlineWidths {
        &self.slot.widths
    }

    /// Stamp the frame, release the slot and flip the write index.
    ///
    /// Widths and rects are tagged before the surface so that a consistent
    /// tag triple always describes one frame.
    pub(crate) fn commit(mut self, seq: u64, rects: DisplayRects) -> usize {
        let slot = &mut *self.slot;
        slot.rects = rects;
        slot.tags.widths = seq;
        slot.tags.rects = seq;
        slot.tags.surface = seq;

        let Self { buffer, index, slot } = self;
        drop(slot);
        buffer.write_index.store(1 - index, Ordering::Relaxed);
        index
    }
}
