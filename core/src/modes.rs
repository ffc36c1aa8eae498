//! Stereoscopic 3D presentation modes
//!
//! The catalog is a fixed, ordered, read-only table. Lookups are by exact key.
//! A mode is resolved once per session; switching modes requires a restart.

use tracing::warn;

use crate::pixel::Rgb;

/// Key of the mode used when configuration names an unknown one.
pub const DEFAULT_MODE_KEY: &str = "white_black";

/// How a mode places the two eye views on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoLayout {
    /// One view, optionally tinted.
    Mono,
    /// One surface holding both eyes mixed by color filtering.
    Anaglyph,
    /// Left and right views side by side on a single surface.
    SideBySide,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode3D {
    pub key: &'static str,
    pub name: &'static str,
    pub left_color: Rgb,
    pub right_color: Rgb,
    pub is_parallax: bool,
    pub layout: StereoLayout,
}

impl Mode3D {
    const fn new(
        key: &'static str,
        name: &'static str,
        left: u32,
        right: u32,
        is_parallax: bool,
        layout: StereoLayout,
    ) -> Self {
        Self {
            key,
            name,
            left_color: Rgb::from_u32(left),
            right_color: Rgb::from_u32(right),
            is_parallax,
            layout,
        }
    }

    /// True when the mode needs two distinct eye views.
    pub fn is_stereo(&self) -> bool {
        self.layout != StereoLayout::Mono
    }
}

static CATALOG: [Mode3D; 9] = [
    Mode3D::new("red_black", "Red/Black", 0xFF0000, 0x000000, false, StereoLayout::Mono),
    Mode3D::new("white_black", "White/Black", 0xFFFFFF, 0x000000, false, StereoLayout::Mono),
    Mode3D::new("red_blue", "Red/Blue", 0xFF0000, 0x0000FF, true, StereoLayout::Anaglyph),
    Mode3D::new("red_cyan", "Red/Cyan", 0xFF0000, 0x00B7EB, true, StereoLayout::Anaglyph),
    Mode3D::new(
        "red_electric_cyan",
        "Red/Electric Cyan",
        0xFF0000,
        0x00FFFF,
        true,
        StereoLayout::Anaglyph,
    ),
    Mode3D::new("red_green", "Red/Green", 0xFF0000, 0x00FF00, true, StereoLayout::Anaglyph),
    Mode3D::new("green_red", "Green/Red", 0x00FF00, 0xFF0000, true, StereoLayout::Anaglyph),
    Mode3D::new("yellow_blue", "Yellow/Blue", 0xFFFF00, 0x0000FF, true, StereoLayout::Anaglyph),
    Mode3D::new(
        "side_by_side",
        "Side by Side",
        0xFFFFFF,
        0xFFFFFF,
        true,
        StereoLayout::SideBySide,
    ),
];

/// Read-only access to the mode table.
pub struct ModeCatalog;

impl ModeCatalog {
    pub fn count() -> usize {
        CATALOG.len()
    }

    /// Position of the entry whose key matches exactly.
    pub fn index_of(key: &str) -> Option<usize> {
        CATALOG.iter().position(|m| m.key == key)
    }

    pub fn entry_at(index: usize) -> Option<&'static Mode3D> {
        CATALOG.get(index)
    }

    pub fn default_mode() -> &'static Mode3D {
        let index = Self::index_of(DEFAULT_MODE_KEY).unwrap_or(0);
        &CATALOG[index]
    }

    /// The entry for `key`, or the default mode if the key is unknown.
    pub fn resolve(key: &str) -> &'static Mode3D {
        match Self::index_of(key) {
            Some(index) => &CATALOG[index],
            None => {
                let fallback = Self::default_mode();
                warn!(
                    "Unknown 3D mode '{}', falling back to '{}'",
                    key, fallback.key
                );
                fallback
            }
        }
    }

    pub fn iter() -> impl Iterator<Item = &'static Mode3D> {
        CATALOG.iter()
    }
}
