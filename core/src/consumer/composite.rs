//! Per-mode placement of frame regions on screen

use smallvec::SmallVec;

use super::ColorFilter;
use crate::modes::StereoLayout;
use crate::surface::{DisplayRect, DisplayRects};

/// One surface draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub src: DisplayRect,
    pub dst: DisplayRect,
    pub filter: ColorFilter,
}

/// The screen quad of `screen` size centered in a display of `display` size.
pub fn screen_quad(display: (u32, u32), screen: (u32, u32)) -> DisplayRect {
    DisplayRect::new(0, 0, display.0, display.1).centered(screen.0, screen.1)
}

/// Draw calls for one frame.
///
/// Side by side places the left view on the left half of the quad and the
/// right view on the right half. Every other layout draws the primary rect
/// over the whole quad.
pub fn plan(
    layout: StereoLayout,
    filter: ColorFilter,
    rects: &DisplayRects,
    quad: DisplayRect,
) -> SmallVec<[DrawCall; 2]> {
    let mut calls = SmallVec::new();
    match (layout, rects.right) {
        (StereoLayout::SideBySide, Some(right)) => {
            let (left_dst, right_dst) = quad.split_halves();
            calls.push(DrawCall {
                src: rects.left,
                dst: left_dst,
                filter,
            });
            calls.push(DrawCall {
                src: right,
                dst: right_dst,
                filter,
            });
        }
        _ => {
            if !rects.left.is_empty() {
                calls.push(DrawCall {
                    src: rects.left,
                    dst: quad,
                    filter,
                });
            }
        }
    }
    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Rgb;
    use crate::surface::{VB_HEIGHT, VB_WIDTH};

    #[test]
    fn test_quad_centered() {
        let quad = screen_quad((640, 480), (499, 291));
        assert_eq!(quad, DisplayRect::new(70, 94, 499, 291));
    }

    #[test]
    fn test_quad_larger_than_display() {
        let quad = screen_quad((320, 200), (499, 291));
        assert_eq!(quad.x, -89);
        assert_eq!(quad.w, 499);
    }

    #[test]
    fn test_mono_single_call() {
        let rects = DisplayRects::mono(DisplayRect::full_frame());
        let quad = DisplayRect::new(0, 0, 499, 291);
        let calls = plan(StereoLayout::Mono, ColorFilter::None, &rects, quad);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].src, DisplayRect::full_frame());
        assert_eq!(calls[0].dst, quad);
    }

    #[test]
    fn test_anaglyph_single_filtered_call() {
        let filter = ColorFilter::Anaglyph {
            left: Rgb(0xFF0000),
            right: Rgb(0x0000FF),
        };
        let rects = DisplayRects::mono(DisplayRect::full_frame());
        let calls = plan(StereoLayout::Anaglyph, filter, &rects, DisplayRect::new(0, 0, 10, 10));
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].filter, filter);
    }

    #[test]
    fn test_side_by_side_two_calls() {
        let half = VB_WIDTH / 2;
        let rects = DisplayRects::stereo(
            DisplayRect::new(0, 0, half, VB_HEIGHT),
            DisplayRect::new(half as i32, 0, half, VB_HEIGHT),
        );
        let quad = DisplayRect::new(70, 94, 500, 291);
        let calls = plan(StereoLayout::SideBySide, ColorFilter::None, &rects, quad);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].src, rects.left);
        assert_eq!(calls[0].dst, DisplayRect::new(70, 94, 250, 291));
        assert_eq!(Some(calls[1].src), rects.right);
        assert_eq!(calls[1].dst, DisplayRect::new(320, 94, 250, 291));
    }

    #[test]
    fn test_side_by_side_without_right_view_falls_back() {
        let rects = DisplayRects::mono(DisplayRect::full_frame());
        let quad = DisplayRect::new(0, 0, 8, 8);
        let calls = plan(StereoLayout::SideBySide, ColorFilter::None, &rects, quad);
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn test_empty_rect_draws_nothing() {
        let calls = plan(
            StereoLayout::Mono,
            ColorFilter::None,
            &DisplayRects::default(),
            DisplayRect::new(0, 0, 8, 8),
        );
        assert!(calls.is_empty());
    }
}
