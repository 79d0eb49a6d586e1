//! The windowed [`IoPort`] backing `coder run`.
//!
//! Grounded on the teacher's own `Monitor` device (a `minifb::Window`
//! plus a `Vec<u32>` pixel buffer blitted with `update_with_buffer`):
//! this is the same idea, generalized from toggling individual
//! memory-mapped pixels to drawing whole character cells. There is no
//! glyph renderer anywhere in the reference material to ground a true
//! font rasterizer on, so each character cell is drawn as a solid block
//! in its foreground color — legible enough to see the program's
//! output change, not a text renderer.

use std::collections::VecDeque;
use std::time::Duration;

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use coder_vm::io_port::{IoPort, Rgb, NO_KEY};
use coder_vm::Config;

pub struct WindowPort {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
    letter_w: usize,
    letter_h: usize,
    pending_keys: VecDeque<i32>,
}

impl WindowPort {
    pub fn new(config: &Config) -> WindowPort {
        let width = config.width as usize;
        let height = config.height as usize;

        let window = Window::new("Coder", width, height, WindowOptions::default())
            .unwrap_or_else(|e| panic!("failed to open window: {}", e));

        WindowPort {
            window,
            buffer: vec![0; width * height],
            width,
            height,
            letter_w: config.letter_w as usize,
            letter_h: config.letter_h as usize,
            pending_keys: VecDeque::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// Pumps the window's event queue and records any newly pressed
    /// keys. Call once per `run` tick, before `run` itself: `read_key`
    /// only ever drains what this collected.
    pub fn pump(&mut self) {
        for key in self.window.get_keys_pressed(KeyRepeat::No) {
            if let Some(code) = key_to_code(key) {
                self.pending_keys.push_back(code);
            }
        }
    }

    fn fill_cell(&mut self, px: i32, py: i32, color: u32) {
        let (px, py) = (px.max(0) as usize, py.max(0) as usize);
        for y in py..(py + self.letter_h).min(self.height) {
            let row = y * self.width;
            for x in px..(px + self.letter_w).min(self.width) {
                self.buffer[row + x] = color;
            }
        }
    }
}

fn rgb_to_u32(rgb: Rgb) -> u32 {
    let (r, g, b) = rgb;
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

fn key_to_code(key: Key) -> Option<i32> {
    let code = match key {
        Key::A => b'A',
        Key::B => b'B',
        Key::C => b'C',
        Key::D => b'D',
        Key::E => b'E',
        Key::F => b'F',
        Key::G => b'G',
        Key::H => b'H',
        Key::I => b'I',
        Key::J => b'J',
        Key::K => b'K',
        Key::L => b'L',
        Key::M => b'M',
        Key::N => b'N',
        Key::O => b'O',
        Key::P => b'P',
        Key::Q => b'Q',
        Key::R => b'R',
        Key::S => b'S',
        Key::T => b'T',
        Key::U => b'U',
        Key::V => b'V',
        Key::W => b'W',
        Key::X => b'X',
        Key::Y => b'Y',
        Key::Z => b'Z',
        Key::Key0 => b'0',
        Key::Key1 => b'1',
        Key::Key2 => b'2',
        Key::Key3 => b'3',
        Key::Key4 => b'4',
        Key::Key5 => b'5',
        Key::Key6 => b'6',
        Key::Key7 => b'7',
        Key::Key8 => b'8',
        Key::Key9 => b'9',
        Key::Space => b' ',
        Key::Backspace => 8,
        Key::Tab => 9,
        Key::Enter => 13,
        Key::Delete => 127,
        _ => return None,
    };
    Some(code as i32)
}

impl IoPort for WindowPort {
    fn read_key(&mut self) -> i32 {
        self.pending_keys.pop_front().unwrap_or(NO_KEY)
    }

    fn output_text(&mut self, _text: &str, px: i32, py: i32, fg: Rgb) {
        let color = rgb_to_u32(fg);
        self.fill_cell(px, py, color);
    }

    fn color(&mut self, _bg: Rgb) {
        // The background is currently a no-op: the VM calls this once
        // after the whole grid has already been drawn (see
        // dispatch_interrupt's SCREEN case), by which point there is
        // nothing left uncolored to apply it to.
    }

    fn refresh(&mut self) {
        let _ = self
            .window
            .update_with_buffer(&self.buffer, self.width, self.height);
    }

    fn timeout(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}
