//! Software display: an RGBA8 canvas implementing [`Display`]

use redview_core::consumer::{ColorFilter, Display};
use redview_core::{ConsumedFrame, DisplayRect, Rgb, Rgba};

use crate::font;

/// CPU-side framebuffer the render consumer draws into.
#[derive(Debug, Clone)]
pub struct SoftwareDisplay {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
    presented: u64,
}

impl SoftwareDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0xFF]; width as usize * height as usize],
            presented: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of completed refreshes.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Color at (x, y), or black outside the canvas.
    pub fn pixel(&self, x: i32, y: i32) -> Rgb {
        match self.index(x, y) {
            Some(i) => {
                let [r, g, b, _] = self.pixels[i];
                Rgb::new(r, g, b)
            }
            None => Rgb::BLACK,
        }
    }

    /// Canvas as tightly packed RGBA8 rows.
    pub fn rgba_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn put(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            let [r, g, b] = color.channels();
            self.pixels[i] = [r, g, b, 0xFF];
        }
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            let [r, g, b, _] = self.pixels[i];
            let [r, g, b] = color.blend_over(Rgb::new(r, g, b)).channels();
            self.pixels[i] = [r, g, b, 0xFF];
        }
    }

    /// Clip `rect` to the canvas, returning x and y ranges.
    fn clip(&self, rect: DisplayRect) -> (std::ops::Range<i32>, std::ops::Range<i32>) {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = rect.right().min(self.width as i32);
        let y1 = rect.bottom().min(self.height as i32);
        (x0..x1.max(x0), y0..y1.max(y0))
    }
}

/// Whether column `x` of source row `y` was written this frame.
fn in_scanline(frame: &ConsumedFrame, x: i32, y: i32) -> bool {
    if frame.widths.is_empty() {
        return true;
    }
    match frame.widths.get(y as usize) {
        Some(extent) => x >= extent.x && x < extent.right(),
        None => false,
    }
}

impl Display for SoftwareDisplay {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgb) {
        let [r, g, b] = color.channels();
        self.pixels.fill([r, g, b, 0xFF]);
    }

    fn draw_surface(
        &mut self,
        frame: &ConsumedFrame,
        src: DisplayRect,
        dst: DisplayRect,
        filter: ColorFilter,
    ) {
        if src.is_empty() || dst.is_empty() {
            return;
        }
        let (xs, ys) = self.clip(dst);
        for y in ys {
            let sy = src.y + ((y - dst.y) as i64 * src.h as i64 / dst.h as i64) as i32;
            for x in xs.clone() {
                let sx = src.x + ((x - dst.x) as i64 * src.w as i64 / dst.w as i64) as i32;
                let color = if in_scanline(frame, sx, sy) {
                    filter.apply(frame.surface.get(sx, sy))
                } else {
                    Rgb::BLACK
                };
                self.put(x, y, color);
            }
        }
    }

    fn fill_rect(&mut self, rect: DisplayRect, color: Rgba) {
        let (xs, ys) = self.clip(rect);
        for y in ys {
            for x in xs.clone() {
                self.blend(x, y, color);
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, px: u32, text: &str, color: Rgba) {
        font::rasterize(x, y, px, text, |gx, gy| self.blend(gx, gy, color));
    }

    fn text_width(&self, px: u32, text: &str) -> u32 {
        font::text_width(px, text)
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redview_core::{DisplayRects, ScanlineWidths, Surface};

    fn frame(width: u32, height: u32, color: Rgb) -> ConsumedFrame {
        let mut surface = Surface::new(width, height).unwrap();
        surface.fill(color);
        let mut widths = ScanlineWidths::new(height).unwrap();
        widths.fill_full(width);
        ConsumedFrame {
            surface,
            widths,
            rects: DisplayRects::mono(DisplayRect::new(0, 0, width, height)),
            sequence: 1,
            index: 0,
        }
    }

    #[test]
    fn test_clear() {
        let mut display = SoftwareDisplay::new(4, 3);
        display.clear(Rgb(0x123456));
        assert_eq!(display.pixel(3, 2), Rgb(0x123456));
        assert_eq!(display.rgba_bytes().len(), 4 * 3 * 4);
        assert_eq!(&display.rgba_bytes()[..4], &[0x12, 0x34, 0x56, 0xFF]);
    }

    #[test]
    fn test_draw_surface_scales_nearest() {
        let mut f = frame(2, 2, Rgb::BLACK);
        f.surface.set(1, 0, Rgb::WHITE);
        let mut display = SoftwareDisplay::new(8, 8);
        display.draw_surface(
            &f,
            DisplayRect::new(0, 0, 2, 2),
            DisplayRect::new(0, 0, 8, 8),
            ColorFilter::None,
        );
        assert_eq!(display.pixel(0, 0), Rgb::BLACK);
        assert_eq!(display.pixel(4, 0), Rgb::WHITE);
        assert_eq!(display.pixel(7, 3), Rgb::WHITE);
        assert_eq!(display.pixel(7, 4), Rgb::BLACK);
    }

    #[test]
    fn test_draw_surface_applies_filter() {
        let f = frame(4, 4, Rgb::WHITE);
        let mut display = SoftwareDisplay::new(4, 4);
        let filter = ColorFilter::Anaglyph {
            left: Rgb(0xFF0000),
            right: Rgb(0x00FFFF),
        };
        display.draw_surface(
            &f,
            DisplayRect::new(0, 0, 4, 4),
            DisplayRect::new(0, 0, 4, 4),
            filter,
        );
        assert_eq!(display.pixel(2, 2), Rgb::WHITE);

        display.draw_surface(
            &f,
            DisplayRect::new(0, 0, 4, 4),
            DisplayRect::new(0, 0, 4, 4),
            ColorFilter::Tint(Rgb(0xFF0000)),
        );
        assert_eq!(display.pixel(2, 2), Rgb(0xFF0000));
    }

    #[test]
    fn test_zero_width_rows_draw_black() {
        let mut f = frame(4, 4, Rgb::WHITE);
        f.widths.set(0, 0, 0);
        f.widths.set(1, 1, 2);
        let mut display = SoftwareDisplay::new(4, 4);
        display.clear(Rgb(0x00FF00));
        display.draw_surface(
            &f,
            DisplayRect::new(0, 0, 4, 4),
            DisplayRect::new(0, 0, 4, 4),
            ColorFilter::None,
        );
        assert_eq!(display.pixel(2, 0), Rgb::BLACK);
        assert_eq!(display.pixel(0, 1), Rgb::BLACK);
        assert_eq!(display.pixel(1, 1), Rgb::WHITE);
        assert_eq!(display.pixel(3, 1), Rgb::BLACK);
        assert_eq!(display.pixel(3, 2), Rgb::WHITE);
    }

    #[test]
    fn test_draw_clips_offscreen_quad() {
        let f = frame(4, 4, Rgb::WHITE);
        let mut display = SoftwareDisplay::new(4, 4);
        display.draw_surface(
            &f,
            DisplayRect::new(0, 0, 4, 4),
            DisplayRect::new(-2, -2, 8, 8),
            ColorFilter::None,
        );
        assert_eq!(display.pixel(0, 0), Rgb::WHITE);
        assert_eq!(display.pixel(3, 3), Rgb::WHITE);
    }

    #[test]
    fn test_fill_rect_blends() {
        let mut display = SoftwareDisplay::new(4, 4);
        display.clear(Rgb::WHITE);
        display.fill_rect(DisplayRect::new(1, 1, 2, 2), Rgba::from_u32(0x0000_0080));
        assert_eq!(display.pixel(0, 0), Rgb::WHITE);
        let dimmed = display.pixel(1, 1);
        assert!(dimmed.r() < 0x80 && dimmed.r() > 0x70);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let mut display = SoftwareDisplay::new(64, 16);
        display.draw_text(0, 0, 8, "1", Rgba::WHITE);
        // '1' has its stem in column 2
        assert_eq!(display.pixel(2, 3), Rgb::WHITE);
        assert_eq!(display.pixel(0, 3), Rgb::BLACK);
        assert_eq!(display.text_width(8, "12"), 12);
    }
}
