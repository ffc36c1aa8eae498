//! 5x7 bitmap font for overlay text
//!
//! Each glyph is 7 rows, 5 bits per row, bit 4 = leftmost column. Glyphs sit
//! in a 6x8 cell and are scaled by an integer factor. Lowercase letters use
//! the uppercase shapes; anything without a glyph draws as a hollow box.

pub const GLYPH_W: u32 = 5;
pub const GLYPH_H: u32 = 7;
pub const CELL_W: u32 = 6;
pub const CELL_H: u32 = 8;

type Glyph = [u8; GLYPH_H as usize];

const BOX: Glyph = [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F];

#[rustfmt::skip]
const LETTERS: [Glyph; 26] = [
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
];

#[rustfmt::skip]
const DIGITS: [Glyph; 10] = [
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // 0
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // 1
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // 2
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // 3
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // 4
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // 5
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // 6
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // 8
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // 9
];

pub fn glyph(c: char) -> &'static Glyph {
    match c {
        'a'..='z' => &LETTERS[c as usize - 'a' as usize],
        'A'..='Z' => &LETTERS[c as usize - 'A' as usize],
        '0'..='9' => &DIGITS[c as usize - '0' as usize],
        ' ' => &[0; 7],
        '.' => &[0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '-' => &[0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        ':' => &[0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '/' => &[0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '%' => &[0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        _ => &BOX,
    }
}

/// Integer scale that makes a cell roughly `px` pixels tall.
pub fn scale_for(px: u32) -> u32 {
    ((px + CELL_H / 2) / CELL_H).max(1)
}

pub fn text_width(px: u32, text: &str) -> u32 {
    text.chars().count() as u32 * CELL_W * scale_for(px)
}

/// Call `plot(x, y)` for every lit pixel of `text` drawn at (x, y).
pub fn rasterize(x: i32, y: i32, px: u32, text: &str, mut plot: impl FnMut(i32, i32)) {
    let scale = scale_for(px) as i32;
    for (i, c) in text.chars().enumerate() {
        let origin_x = x + i as i32 * CELL_W as i32 * scale;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_W {
                if *bits & (0x10u8 >> col) == 0 {
                    continue;
                }
                let gx = origin_x + col as i32 * scale;
                let gy = y + row as i32 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        plot(gx + dx, gy + dy);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_letters() {
        assert_eq!(glyph('v'), glyph('V'));
        assert_ne!(glyph('v'), glyph('w'));
    }

    #[test]
    fn test_unknown_char_is_box() {
        assert_eq!(glyph('#'), &BOX);
        assert_eq!(glyph('é'), &BOX);
    }

    #[test]
    fn test_scale_and_width() {
        assert_eq!(scale_for(8), 1);
        assert_eq!(scale_for(14), 2);
        assert_eq!(scale_for(1), 1);
        assert_eq!(text_width(14, "50.0 virt"), 9 * 6 * 2);
        assert_eq!(text_width(14, ""), 0);
    }

    #[test]
    fn test_rasterize_space_plots_nothing() {
        let mut count = 0;
        rasterize(0, 0, 8, "   ", |_, _| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_rasterize_scaled_minus() {
        let mut points = Vec::new();
        rasterize(10, 20, 16, "-", |x, y| points.push((x, y)));
        // 5 lit columns at scale 2 -> 10 x 2 block on row 3
        assert_eq!(points.len(), 5 * 4);
        assert!(points.iter().all(|&(x, y)| (10..20).contains(&x) && (26..28).contains(&y)));
    }
}
