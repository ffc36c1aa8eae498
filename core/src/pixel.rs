//! Colors and surface pixel representations
//!
//! Mode tints and all compositing math use [`Rgb`] (packed `0xRRGGBB`).
//! Surfaces store pixels in a representation picked at build time:
//!
//! - `bpp8`  feature: RGB332 in a `u8`
//! - `bpp16` feature: RGB565 in a `u16`
//! - default:         XRGB8888 in a `u32`

use bytemuck::Pod;

#[cfg(all(feature = "bpp8", feature = "bpp16"))]
compile_error!("features `bpp8` and `bpp16` are mutually exclusive");

/// Native pixel storage type for surfaces.
#[cfg(feature = "bpp8")]
pub type Pixel = u8;
/// Native pixel storage type for surfaces.
#[cfg(all(feature = "bpp16", not(feature = "bpp8")))]
pub type Pixel = u16;
/// Native pixel storage type for surfaces.
#[cfg(not(any(feature = "bpp8", feature = "bpp16")))]
pub type Pixel = u32;

/// 24-bit RGB color packed as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const WHITE: Rgb = Rgb(0xFFFFFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Build from a packed value, ignoring anything above bit 23.
    pub const fn from_u32(value: u32) -> Self {
        Rgb(value & 0x00FF_FFFF)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    pub const fn channels(self) -> [u8; 3] {
        [self.r(), self.g(), self.b()]
    }

    pub const fn from_channels(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    /// Scale every channel by `level / 255`.
    pub fn scale(self, level: u8) -> Self {
        self.map(|c| mul_div_255(c, level))
    }

    /// Multiply channel-wise by `tint` (white leaves the color untouched).
    pub fn modulate(self, tint: Rgb) -> Self {
        self.zip(tint, mul_div_255)
    }

    pub fn saturating_add(self, other: Rgb) -> Self {
        self.zip(other, u8::saturating_add)
    }

    /// Channel-wise minimum.
    pub fn min(self, other: Rgb) -> Self {
        self.zip(other, Ord::min)
    }

    /// Channel-wise maximum.
    pub fn max(self, other: Rgb) -> Self {
        self.zip(other, Ord::max)
    }

    /// Rec.601 luma.
    pub fn luma(self) -> u8 {
        let [r, g, b] = self.channels();
        ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
    }

    fn map(self, f: impl Fn(u8) -> u8) -> Self {
        let [r, g, b] = self.channels();
        Self::new(f(r), f(g), f(b))
    }

    fn zip(self, other: Rgb, f: impl Fn(u8, u8) -> u8) -> Self {
        let [r0, g0, b0] = self.channels();
        let [r1, g1, b1] = other.channels();
        Self::new(f(r0, r1), f(g0, g1), f(b0, b1))
    }
}

fn mul_div_255(a: u8, b: u8) -> u8 {
    ((a as u32 * b as u32 + 127) / 255) as u8
}

/// RGB color with alpha, used for overlay drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::from_u32(0xFFFF_FFFF);

    /// Build from a packed `0xRRGGBBAA` value.
    pub const fn from_u32(value: u32) -> Self {
        Self {
            r: (value >> 24) as u8,
            g: (value >> 16) as u8,
            b: (value >> 8) as u8,
            a: value as u8,
        }
    }

    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Alpha-blend `self` over `dst`.
    pub fn blend_over(self, dst: Rgb) -> Rgb {
        let a = self.a as u32;
        let inv = 255 - a;
        let mix = |src: u8, dst: u8| ((src as u32 * a + dst as u32 * inv + 127) / 255) as u8;
        Rgb::new(mix(self.r, dst.r()), mix(self.g, dst.g()), mix(self.b, dst.b()))
    }
}

/// Colorspace tag carried by surfaces. Only RGB is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colorspace {
    Rgb,
}

/// Pixel format of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub bpp: u8,
    pub colorspace: Colorspace,
}

impl PixelFormat {
    /// Format of the build's native [`Pixel`].
    pub const NATIVE: PixelFormat = PixelFormat {
        bpp: <Pixel as PixelRepr>::BPP,
        colorspace: Colorspace::Rgb,
    };

    pub const fn bytes_per_pixel(self) -> usize {
        self.bpp as usize / 8
    }
}

/// A storable pixel representation.
pub trait PixelRepr: Pod + Default + Send + Sync + 'static {
    /// Bits per pixel.
    const BPP: u8;

    fn pack(color: Rgb) -> Self;

    fn unpack(self) -> Rgb;
}

/// RGB332
impl PixelRepr for u8 {
    const BPP: u8 = 8;

    fn pack(color: Rgb) -> Self {
        (color.r() & 0xE0) | ((color.g() & 0xE0) >> 3) | (color.b() >> 6)
    }

    fn unpack(self) -> Rgb {
        let r = (self >> 5) & 0x7;
        let g = (self >> 2) & 0x7;
        let b = self & 0x3;
        let expand3 = |v: u8| (v << 5) | (v << 2) | (v >> 1);
        Rgb::new(expand3(r), expand3(g), b * 0x55)
    }
}

/// RGB565
impl PixelRepr for u16 {
    const BPP: u8 = 16;

    fn pack(color: Rgb) -> Self {
        ((color.r() as u16 & 0xF8) << 8)
            | ((color.g() as u16 & 0xFC) << 3)
            | (color.b() as u16 >> 3)
    }

    fn unpack(self) -> Rgb {
        let r = ((self >> 11) & 0x1F) as u8;
        let g = ((self >> 5) & 0x3F) as u8;
        let b = (self & 0x1F) as u8;
        Rgb::new((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }
}

/// XRGB8888
impl PixelRepr for u32 {
    const BPP: u8 = 32;

    fn pack(color: Rgb) -> Self {
        color.0 & 0x00FF_FFFF
    }

    fn unpack(self) -> Rgb {
        Rgb::from_u32(self)
    }
}
