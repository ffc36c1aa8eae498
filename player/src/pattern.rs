//! Demo emulation core
//!
//! Draws a scrolling checkerboard at screen depth with a square floating in
//! front of it. The square is offset horizontally between the eyes, so stereo
//! modes show it popping out of the screen. The top and bottom rows are
//! letterboxed and reported as zero-width scanlines.

use redview_core::{
    CoreError, DisplayRect, EmulationCore, FrameTarget, Rgb, StepOutcome, StereoLayout,
};

/// Rows blanked at the top and at the bottom of every frame.
pub const LETTERBOX_ROWS: u32 = 8;

const CHECKER: i32 = 16;
const CHECKER_DARK: u8 = 0x30;
const CHECKER_LIGHT: u8 = 0x60;
const SQUARE_SIZE: i32 = 48;
const SQUARE_LEVEL: u8 = 0xFF;
/// Horizontal offset between the eyes' views of the square.
pub const SQUARE_DISPARITY: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eye {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct PatternCore {
    frame: u64,
    length: Option<u64>,
    parallax_disabled: bool,
    left_color: Rgb,
    right_color: Rgb,
    layout: StereoLayout,
}

impl Default for PatternCore {
    fn default() -> Self {
        Self {
            frame: 0,
            length: None,
            parallax_disabled: true,
            left_color: Rgb::WHITE,
            right_color: Rgb::BLACK,
            layout: StereoLayout::Mono,
        }
    }
}

impl PatternCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Halt after `frames` frames.
    pub fn with_length(mut self, frames: u64) -> Self {
        self.length = Some(frames);
        self
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Left edge of the square as seen by `eye` on the current frame.
    ///
    /// The square holds still at the left edge when the surface is too narrow
    /// for it to move.
    fn square_x(&self, width: i32, eye: Eye) -> i32 {
        let travel = (width - SQUARE_SIZE) / 2;
        let base = if travel > 0 {
            let phase = (self.frame % (2 * travel as u64)) as i32;
            travel / 2 + (phase - travel).abs()
        } else {
            0
        };
        let half = if self.parallax_disabled {
            0
        } else {
            SQUARE_DISPARITY / 2
        };
        // Crossed disparity: the object sits in front of the screen
        match eye {
            Eye::Left => base + half,
            Eye::Right => base - half,
        }
    }

    /// Scene brightness at (x, y) for one eye.
    fn level(&self, x: i32, y: i32, width: i32, height: i32, eye: Eye) -> u8 {
        let sq_x = self.square_x(width, eye);
        let sq_y = (height - SQUARE_SIZE) / 2;
        if (sq_x..sq_x + SQUARE_SIZE).contains(&x) && (sq_y..sq_y + SQUARE_SIZE).contains(&y) {
            return SQUARE_LEVEL;
        }
        let scroll = (self.frame % (2 * CHECKER as u64)) as i32;
        if ((x + scroll) / CHECKER + y / CHECKER) % 2 == 0 {
            CHECKER_DARK
        } else {
            CHECKER_LIGHT
        }
    }

    fn shade(&self, x: i32, y: i32, width: i32, height: i32) -> Rgb {
        match self.layout {
            StereoLayout::Mono => self.left_color.scale(self.level(x, y, width, height, Eye::Left)),
            StereoLayout::Anaglyph => {
                let left = self.left_color.scale(self.level(x, y, width, height, Eye::Left));
                let right = self.right_color.scale(self.level(x, y, width, height, Eye::Right));
                left.saturating_add(right)
            }
            StereoLayout::SideBySide => {
                // Each eye is squeezed into half the surface
                let half = width / 2;
                let (eye, color, sx) = if x < half {
                    (Eye::Left, self.left_color, x * 2)
                } else {
                    (Eye::Right, self.right_color, (x - half) * 2)
                };
                color.scale(self.level(sx, y, width, height, eye))
            }
        }
    }
}

impl EmulationCore for PatternCore {
    fn set_parallax_disabled(&mut self, disabled: bool) {
        self.parallax_disabled = disabled;
    }

    fn set_anaglyph_colors(&mut self, left: Rgb, right: Rgb) {
        self.left_color = left;
        self.right_color = right;
    }

    fn set_stereo_layout(&mut self, layout: StereoLayout) {
        self.layout = layout;
    }

    fn run_frame(&mut self, target: &mut FrameTarget<'_>) -> Result<StepOutcome, CoreError> {
        if self.length.is_some_and(|len| self.frame >= len) {
            return Ok(StepOutcome::Halted);
        }

        let width = target.surface.width();
        let height = target.surface.height();
        if width == 0 || height == 0 {
            return Err(CoreError::Fault("frame target has no pixels".into()));
        }
        let (w, h) = (width as i32, height as i32);
        let content = LETTERBOX_ROWS..height.saturating_sub(LETTERBOX_ROWS);

        for y in 0..height {
            if content.contains(&y) {
                for x in 0..w {
                    let color = self.shade(x, y as i32, w, h);
                    target.surface.set(x, y as i32, color);
                }
                target.widths.set(y as usize, 0, width);
            } else {
                for x in 0..w {
                    target.surface.set(x, y as i32, Rgb::BLACK);
                }
                target.widths.set(y as usize, 0, 0);
            }
        }

        self.frame += 1;
        Ok(StepOutcome::Frame {
            display: DisplayRect::new(0, 0, width, height),
        })
    }
}
