//! Single-producer / single-consumer frame handoff
//!
//! The producer announces a finished buffer through one atomic ready word
//! (`seq << 1 | index`, zero = nothing ready). The slot contents are written
//! and tagged under the slot lock before the word is stored, so a consumer
//! that sees the word also sees the finished metadata. A publish that lands
//! before the previous one is consumed simply replaces it.
//!
//! The consumer never blocks: it takes the word, tries the slot lock, and
//! copies the frame into its own [`ConsumedFrame`]. If the producer has
//! already started rewriting that slot the announcement is stale and the
//! consumer keeps its previous frame.

use std::sync::TryLockError;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{trace, warn};

use crate::frame_buffer::{FrameBuffer, FrameWriter};
use crate::surface::{DisplayRects, ScanlineWidths, Surface};

/// A frame copied out of the frame buffer for drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedFrame {
    pub surface: Surface,
    pub widths: ScanlineWidths,
    pub rects: DisplayRects,
    pub sequence: u64,
    /// Buffer the frame was read from.
    pub index: usize,
}

impl ConsumedFrame {
    pub fn empty() -> Self {
        Self {
            surface: Surface::empty(),
            widths: ScanlineWidths::default(),
            rects: DisplayRects::default(),
            sequence: 0,
            index: 0,
        }
    }
}

impl Default for ConsumedFrame {
    fn default() -> Self {
        Self::empty()
    }
}

/// Result of [`HandoffChannel::try_consume`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consume {
    Ready(ConsumedFrame),
    NothingNew,
}

/// Handoff counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandoffStats {
    pub published: u64,
    pub consumed: u64,
    /// Publishes that replaced a frame the consumer never took.
    pub superseded: u64,
    /// Announcements dropped because the slot was already being rewritten.
    pub stale: u64,
}

#[derive(Debug, Default)]
pub struct HandoffChannel {
    ready: AtomicU64,
    next_seq: AtomicU64,
    last_consumed: AtomicU64,
    published: AtomicU64,
    consumed: AtomicU64,
    superseded: AtomicU64,
    stale: AtomicU64,
}

impl HandoffChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a finished frame. Producer only.
    ///
    /// Returns the frame's sequence number.
    pub fn publish(&self, writer: FrameWriter<'_>, rects: DisplayRects) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let index = writer.commit(seq, rects);

        let word = (seq << 1) | index as u64;
        let previous = self.ready.swap(word, Ordering::AcqRel);
        self.published.fetch_add(1, Ordering::Relaxed);
        if previous != 0 {
            self.superseded.fetch_add(1, Ordering::Relaxed);
            trace!("Frame {} superseded by {}", previous >> 1, seq);
        }
        seq
    }

    /// Take the newest published frame, if any.
    pub fn try_consume(&self, frames: &FrameBuffer) -> Consume {
        let mut out = ConsumedFrame::empty();
        if self.try_consume_into(frames, &mut out) {
            Consume::Ready(out)
        } else {
            Consume::NothingNew
        }
    }

    /// Like [`try_consume`](Self::try_consume) but copies into `out`,
    /// reusing its allocations. `out` is untouched when nothing is new.
    pub fn try_consume_into(&self, frames: &FrameBuffer, out: &mut ConsumedFrame) -> bool {
        let word = self.ready.swap(0, Ordering::AcqRel);
        if word == 0 {
            return false;
        }
        let index = (word & 1) as usize;

        let slot = match frames.slot(index).try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                self.stale.fetch_add(1, Ordering::Relaxed);
                trace!("Frame {} slot busy, keeping previous frame", word >> 1);
                return false;
            }
            Err(TryLockError::Poisoned(e)) => {
                warn!("Frame slot mutex poisoned, recovering");
                e.into_inner()
            }
        };

        // The slot may hold a newer complete frame than announced, never a partial one
        let Some(seq) = slot.tags.consistent() else {
            self.stale.fetch_add(1, Ordering::Relaxed);
            return false;
        };
        if !slot.live || seq <= self.last_consumed.load(Ordering::Relaxed) {
            self.stale.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        out.surface.copy_from(&slot.surface);
        out.widths.copy_from(&slot.widths);
        out.rects = slot.rects;
        out.sequence = seq;
        out.index = index;
        drop(slot);

        self.last_consumed.store(seq, Ordering::Relaxed);
        self.consumed.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Whether a frame is waiting to be consumed.
    pub fn has_pending(&self) -> bool {
        self.ready.load(Ordering::Acquire) != 0
    }

    pub fn stats(&self) -> HandoffStats {
        HandoffStats {
            published: self.published.load(Ordering::Relaxed),
            consumed: self.consumed.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
        }
    }
}
