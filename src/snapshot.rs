use serde::Serialize;

use crate::graphics::{HEIGHT, WIDTH};
use crate::keyboard::NUM_KEYS;

/// A copy of everything a renderer or debugger might want to look at. Taking one never
/// touches the running emulator, and nothing done to the copy reaches back into it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    /// return addresses, oldest call first
    pub stack: Vec<u16>,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: Vec<u8>,
    /// row major, `WIDTH` pixels per row
    pub framebuffer: Vec<bool>,
    pub keys: [bool; NUM_KEYS],
    pub waiting_for_key: bool,
    pub stopped: bool,
}

impl Snapshot {
    /// Return true if the pixel at (x, y) is lit. Coordinates outside the screen are unlit
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        self.framebuffer[x + y * WIDTH]
    }

    /// Render the framebuffer as text, `#` for lit pixels
    pub fn framebuffer_to_string(&self) -> String {
        let mut out = String::with_capacity((WIDTH + 1) * HEIGHT);
        for row in self.framebuffer.chunks(WIDTH) {
            out.extend(row.iter().map(|&on| if on { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }
}
