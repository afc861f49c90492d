//! The 64x32 monochrome display buffer. Only 00E0 and DXYN change it; everything else reads it
use std::ops::Index;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// Color handed to software-blit hosts for lit and unlit pixels
pub const PIXEL_ON: u32 = 0xFFFFFF;
pub const PIXEL_OFF: u32 = 0x000000;

pub const NUM_FONT_CHARS: usize = 16;
pub const NUM_BYTES_IN_FONT_CHAR: u8 = 5;

/// Where in memory the font glyphs live
pub const FONT_START: u16 = 0x000;

/// The 16 hex glyphs 0-F, 5 rows each, stored at `FONT_START`
pub const FONT_SET: [u8; NUM_FONT_CHARS * NUM_BYTES_IN_FONT_CHAR as usize] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Address of the glyph for the low nibble of `value`
pub fn font_char_addr(value: u8) -> u16 {
    FONT_START + (value & 0xF) as u16 * NUM_BYTES_IN_FONT_CHAR as u16
}

#[derive(Clone, PartialEq)]
pub struct Graphics {
    buffer: [bool; WIDTH * HEIGHT],
}

impl Default for Graphics {
    fn default() -> Self {
        Graphics::new()
    }
}

impl std::fmt::Debug for Graphics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.buffer.chunks(WIDTH) {
            let line: String = row.iter().map(|&on| if on { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl Graphics {
    pub fn new() -> Self {
        Graphics {
            buffer: [false; WIDTH * HEIGHT],
        }
    }

    pub fn len(&self) -> usize {
        WIDTH * HEIGHT
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.iter().all(|&on| !on)
    }

    /// Given x and y coordinate for a bit in the buffer, return the corresponding
    /// index of that bit in the buffer. Coordinates past the edges wrap around
    pub fn get_graphics_idx(x: u8, y: u8) -> usize {
        let column = x as usize % WIDTH;
        let row = y as usize % HEIGHT;

        column + row * WIDTH
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.buffer = [false; WIDTH * HEIGHT];
    }

    /// XOR `enabled` into the pixel at (x, y). Returns true if a lit pixel got turned off
    pub fn xor_set(&mut self, x: u8, y: u8, enabled: bool) -> bool {
        let idx = Graphics::get_graphics_idx(x, y);
        let was_on = self.buffer[idx];
        self.buffer[idx] = was_on ^ enabled;

        was_on && enabled
    }

    /// Draw a sprite whose top left corner is at (x, y). Each byte of `rows` is one row of
    /// 8 pixels, most significant bit on the left. Pixels that fall off the right or bottom
    /// edge wrap around to the other side. Returns true if any lit pixel got turned off
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut collision = false;

        for (row, byte) in rows.iter().enumerate() {
            for col in 0..8u8 {
                if (byte >> (7 - col)) & 1 == 1 {
                    let px = ((x as usize + col as usize) % WIDTH) as u8;
                    let py = ((y as usize + row) % HEIGHT) as u8;
                    collision |= self.xor_set(px, py, true);
                }
            }
        }

        collision
    }

    /// Return true if the pixel at (x, y) is lit
    pub fn is_set(&self, x: u8, y: u8) -> bool {
        self.buffer[Graphics::get_graphics_idx(x, y)]
    }

    /// One bool per pixel, row major
    pub fn as_slice(&self) -> &[bool] {
        &self.buffer
    }

    /// The buffer as 0RGB pixels, ready for a software blit
    pub fn pixels(&self) -> Vec<u32> {
        self.buffer
            .iter()
            .map(|&on| if on { PIXEL_ON } else { PIXEL_OFF })
            .collect()
    }
}

impl Index<usize> for Graphics {
    type Output = bool;

    #[inline]
    fn index(&self, bit: usize) -> &Self::Output {
        &self.buffer[bit]
    }
}
