//! Fixed-size pixel surfaces and their per-scanline metadata

use crate::error::PipelineError;
use crate::pixel::{Pixel, PixelFormat, PixelRepr, Rgb};

/// Native horizontal resolution of the emulated display.
pub const VB_WIDTH: u32 = 384;
/// Native vertical resolution of the emulated display.
pub const VB_HEIGHT: u32 = 224;

/// Default on-screen quad: 1.3x the native resolution.
pub const DEFAULT_SCREEN_X: u32 = VB_WIDTH * 13 / 10;
pub const DEFAULT_SCREEN_Y: u32 = VB_HEIGHT * 13 / 10;

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayRect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl DisplayRect {
    pub const EMPTY: DisplayRect = DisplayRect::new(0, 0, 0, 0);

    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// The full native frame.
    pub const fn full_frame() -> Self {
        Self::new(0, 0, VB_WIDTH, VB_HEIGHT)
    }

    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub const fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    /// Split horizontally into two halves. An odd pixel goes to the right half.
    pub const fn split_halves(&self) -> (DisplayRect, DisplayRect) {
        let left_w = self.w / 2;
        (
            DisplayRect::new(self.x, self.y, left_w, self.h),
            DisplayRect::new(self.x + left_w as i32, self.y, self.w - left_w, self.h),
        )
    }

    /// Center a `w`x`h` rect inside `self`.
    pub const fn centered(&self, w: u32, h: u32) -> DisplayRect {
        let x = self.x + (self.w as i32 - w as i32) / 2;
        let y = self.y + (self.h as i32 - h as i32) / 2;
        DisplayRect::new(x, y, w, h)
    }
}

/// Source regions for one frame: the primary (left) view and an optional
/// secondary (right) view for dual-view stereo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayRects {
    pub left: DisplayRect,
    pub right: Option<DisplayRect>,
}

impl DisplayRects {
    pub const fn mono(rect: DisplayRect) -> Self {
        Self {
            left: rect,
            right: None,
        }
    }

    pub const fn stereo(left: DisplayRect, right: DisplayRect) -> Self {
        Self {
            left,
            right: Some(right),
        }
    }

    pub fn is_dual(&self) -> bool {
        self.right.is_some()
    }
}

/// Pixel surface with fixed dimensions and format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<Pixel>,
}

impl Surface {
    /// Allocate a zero-filled surface.
    pub fn new(width: u32, height: u32) -> Result<Self, PipelineError> {
        let pixels = try_alloc_zeroed("surface", width as usize * height as usize)?;
        Ok(Self {
            width,
            height,
            format: PixelFormat::NATIVE,
            pixels,
        })
    }

    /// A surface that owns no memory.
    pub const fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            format: PixelFormat::NATIVE,
            pixels: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Raw bytes in native endianness.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn row(&self, y: u32) -> &[Pixel] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [Pixel] {
        let start = y as usize * self.width as usize;
        let width = self.width as usize;
        &mut self.pixels[start..start + width]
    }

    /// Color at (x, y), or black outside the surface.
    pub fn get(&self, x: i32, y: i32) -> Rgb {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return Rgb::BLACK;
        }
        self.pixels[y as usize * self.width as usize + x as usize].unpack()
    }

    pub fn set(&mut self, x: i32, y: i32, color: Rgb) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = Pixel::pack(color);
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(Pixel::pack(color));
    }

    /// Copy pixels and dimensions from `other`, reusing this allocation when possible.
    pub fn copy_from(&mut self, other: &Surface) {
        self.width = other.width;
        self.height = other.height;
        self.format = other.format;
        self.pixels.clear();
        self.pixels.extend_from_slice(&other.pixels);
    }

    pub(crate) fn release(&mut self) {
        *self = Surface::empty();
    }
}

/// Valid horizontal extent of every row written on the most recent frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanlineWidths {
    rows: Vec<DisplayRect>,
}

impl ScanlineWidths {
    /// Allocate `height` zeroed entries.
    pub fn new(height: u32) -> Result<Self, PipelineError> {
        let rows = try_alloc_zeroed("scanline widths", height as usize)?;
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn as_slice(&self) -> &[DisplayRect] {
        &self.rows
    }

    pub fn get(&self, row: usize) -> Option<DisplayRect> {
        self.rows.get(row).copied()
    }

    /// Record the valid extent of `row`. Out-of-range rows are ignored.
    pub fn set(&mut self, row: usize, x: i32, w: u32) {
        if let Some(entry) = self.rows.get_mut(row) {
            *entry = DisplayRect::new(x, row as i32, w, 1);
        }
    }

    /// Mark every row as spanning `width` pixels.
    pub fn fill_full(&mut self, width: u32) {
        for (y, entry) in self.rows.iter_mut().enumerate() {
            *entry = DisplayRect::new(0, y as i32, width, 1);
        }
    }

    pub fn reset(&mut self) {
        self.rows.fill(DisplayRect::EMPTY);
    }

    pub fn copy_from(&mut self, other: &ScanlineWidths) {
        self.rows.clear();
        self.rows.extend_from_slice(&other.rows);
    }

    pub(crate) fn release(&mut self) {
        self.rows = Vec::new();
    }
}

fn try_alloc_zeroed<T: Default + Clone>(
    what: &'static str,
    len: usize,
) -> Result<Vec<T>, PipelineError> {
    let bytes = len.saturating_mul(std::mem::size_of::<T>());
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| PipelineError::Allocation { what, bytes })?;
    v.resize(len, T::default());
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_screen_is_thirteen_tenths() {
        assert_eq!(DEFAULT_SCREEN_X, 499);
        assert_eq!(DEFAULT_SCREEN_Y, 291);
    }

    #[test]
    fn test_surface_zero_filled() {
        let s = Surface::new(VB_WIDTH, VB_HEIGHT).unwrap();
        assert_eq!(s.pixels().len(), (VB_WIDTH * VB_HEIGHT) as usize);
        assert!(s.pixels().iter().all(|&p| p == Pixel::default()));
        assert_eq!(s.format(), PixelFormat::NATIVE);
        assert_eq!(
            s.as_bytes().len(),
            s.pixels().len() * PixelFormat::NATIVE.bytes_per_pixel()
        );
    }

    #[test]
    fn test_surface_set_get_clips() {
        let mut s = Surface::new(4, 4).unwrap();
        s.set(1, 2, Rgb::WHITE);
        assert_eq!(s.get(1, 2), Rgb::WHITE);
        s.set(-1, 0, Rgb::WHITE);
        s.set(4, 0, Rgb::WHITE);
        assert_eq!(s.get(-1, 0), Rgb::BLACK);
        assert_eq!(s.get(4, 0), Rgb::BLACK);
    }

    #[test]
    fn test_oversized_allocation_reports_error() {
        let err = try_alloc_zeroed::<u64>("huge", usize::MAX / 4).unwrap_err();
        assert!(matches!(err, PipelineError::Allocation { what: "huge", .. }));
    }

    #[test]
    fn test_scanline_widths() {
        let mut w = ScanlineWidths::new(VB_HEIGHT).unwrap();
        assert_eq!(w.len(), VB_HEIGHT as usize);
        assert!(w.as_slice().iter().all(|r| *r == DisplayRect::EMPTY));

        w.fill_full(VB_WIDTH);
        assert_eq!(w.get(10), Some(DisplayRect::new(0, 10, VB_WIDTH, 1)));

        w.set(3, 8, 100);
        assert_eq!(w.get(3), Some(DisplayRect::new(8, 3, 100, 1)));
        w.set(9999, 0, 1);
        assert_eq!(w.get(9999), None);

        w.reset();
        assert_eq!(w.get(10), Some(DisplayRect::EMPTY));
    }

    #[test]
    fn test_rect_split_and_center() {
        let (l, r) = DisplayRect::new(10, 0, 499, 291).split_halves();
        assert_eq!(l, DisplayRect::new(10, 0, 249, 291));
        assert_eq!(r, DisplayRect::new(259, 0, 250, 291));

        let outer = DisplayRect::new(0, 0, 640, 480);
        assert_eq!(outer.centered(500, 300), DisplayRect::new(70, 90, 500, 300));
    }
}
