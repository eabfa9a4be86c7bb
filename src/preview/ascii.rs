//! ASCII rendering of camera frames for the terminal preview.
//!
//! Pipeline: BT.601 luminance, cell averaging down to the character grid,
//! then brightness to character lookup. Each cell also keeps its average
//! colour so the TUI can draw it in true colour.

use crate::camera::Frame;

const STANDARD_CHARSET: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
const BLOCKS_CHARSET: &[char] = &[' ', '░', '▒', '▓', '█'];
const MINIMAL_CHARSET: &[char] = &[' ', '.', ':', '#'];

/// Character ramp used for the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharSet {
    #[default]
    Standard,
    Blocks,
    Minimal,
}

impl CharSet {
    /// Characters ordered from darkest to brightest.
    pub fn chars(&self) -> &'static [char] {
        match self {
            CharSet::Standard => STANDARD_CHARSET,
            CharSet::Blocks => BLOCKS_CHARSET,
            CharSet::Minimal => MINIMAL_CHARSET,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CharSet::Standard => "standard",
            CharSet::Blocks => "blocks",
            CharSet::Minimal => "minimal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" => Some(CharSet::Standard),
            "blocks" => Some(CharSet::Blocks),
            "minimal" => Some(CharSet::Minimal),
            _ => None,
        }
    }
}

/// RGB colour of one character cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A frame rendered to a character grid (row-major).
#[derive(Debug, Clone, Default)]
pub struct AsciiFrame {
    pub chars: Vec<char>,
    pub colors: Vec<CellColor>,
    pub width: u16,
    pub height: u16,
}

impl AsciiFrame {
    /// Rows of the grid as strings.
    pub fn lines(&self) -> Vec<String> {
        if self.width == 0 {
            return Vec::new();
        }
        self.chars
            .chunks(self.width as usize)
            .map(|row| row.iter().collect())
            .collect()
    }
}

fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// Render `frame` into a `cols` x `rows` character grid.
pub fn render_ascii(frame: &Frame, cols: u16, rows: u16, charset: CharSet, invert: bool) -> AsciiFrame {
    if cols == 0 || rows == 0 || frame.width == 0 || frame.height == 0 || !frame.is_consistent() {
        return AsciiFrame::default();
    }

    let ramp = charset.chars();
    let levels = ramp.len();
    let width = frame.width as usize;
    let cell_w = frame.width as f32 / cols as f32;
    let cell_h = frame.height as f32 / rows as f32;
    let cells = cols as usize * rows as usize;
    let mut chars = Vec::with_capacity(cells);
    let mut colors = Vec::with_capacity(cells);

    for cy in 0..rows as usize {
        let y0 = ((cy as f32 * cell_h) as usize).min(frame.height as usize - 1);
        let y1 = (((cy + 1) as f32 * cell_h) as usize).clamp(y0 + 1, frame.height as usize);
        for cx in 0..cols as usize {
            let x0 = ((cx as f32 * cell_w) as usize).min(width - 1);
            let x1 = (((cx + 1) as f32 * cell_w) as usize).clamp(x0 + 1, width);

            let (mut r, mut g, mut b, mut n) = (0u32, 0u32, 0u32, 0u32);
            for y in y0..y1 {
                let row = y * width;
                for x in x0..x1 {
                    let i = (row + x) * Frame::BYTES_PER_PIXEL;
                    r += frame.data[i] as u32;
                    g += frame.data[i + 1] as u32;
                    b += frame.data[i + 2] as u32;
                    n += 1;
                }
            }
            let n = n.max(1);
            let color = CellColor {
                r: (r / n) as u8,
                g: (g / n) as u8,
                b: (b / n) as u8,
            };

            let mut level = luminance(color.r, color.g, color.b);
            if invert {
                level = 255 - level;
            }
            chars.push(ramp[level as usize * (levels - 1) / 255]);
            colors.push(color);
        }
    }

    AsciiFrame {
        chars,
        colors,
        width: cols,
        height: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_frame_maps_to_brightest_char() {
        let frame = Frame::solid(10, 10, [255, 255, 255]);
        let ascii = render_ascii(&frame, 5, 2, CharSet::Standard, false);
        assert_eq!(ascii.chars.len(), 10);
        assert!(ascii.chars.iter().all(|&c| c == '@'));
        assert_eq!(ascii.colors[0], CellColor { r: 255, g: 255, b: 255 });
    }

    #[test]
    fn test_invert_flips_brightness() {
        let frame = Frame::solid(4, 4, [255, 255, 255]);
        let ascii = render_ascii(&frame, 2, 2, CharSet::Minimal, true);
        assert!(ascii.chars.iter().all(|&c| c == ' '));
    }

    #[test]
    fn test_grid_larger_than_frame() {
        let frame = Frame::solid(2, 2, [0, 0, 0]);
        let ascii = render_ascii(&frame, 8, 4, CharSet::Blocks, false);
        assert_eq!(ascii.chars.len(), 32);
        assert_eq!(ascii.lines().len(), 4);
        assert_eq!(ascii.lines()[0].chars().count(), 8);
    }

    #[test]
    fn test_empty_inputs_give_empty_frame() {
        let frame = Frame::solid(4, 4, [0, 0, 0]);
        assert!(render_ascii(&frame, 0, 4, CharSet::Standard, false).chars.is_empty());
        let broken = Frame::new(vec![1, 2], 4, 4);
        assert!(render_ascii(&broken, 2, 2, CharSet::Standard, false).chars.is_empty());
    }

    #[test]
    fn test_charset_names_round_trip() {
        for set in [CharSet::Standard, CharSet::Blocks, CharSet::Minimal] {
            assert_eq!(CharSet::from_name(set.name()), Some(set));
        }
        assert_eq!(CharSet::from_name("braille"), None);
    }
}
