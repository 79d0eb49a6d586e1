//! Abstract text-cell display/keyboard port.
//!
//! The VM never touches a window, a terminal or a keyboard directly: it
//! drives an `IoPort` trait object handed to it by the embedder, the way
//! the teacher's `memory/io.rs` drives a generic `IOHandler` instead of a
//! concrete device. `coder-cli` supplies the real, window-backed
//! implementation; [`NullIoPort`] below is the test/headless fake, the
//! direct analogue of `DelegateIOHandler`.

/// Key code returned by [`IoPort::read_key`] when no key is waiting.
pub const NO_KEY: i32 = -1;

/// An RGB color triple, channels in `[0, 255]`.
pub type Rgb = (u8, u8, u8);

/// The display/keyboard port the VM's `interrupt` instruction talks to.
///
/// `read_key` must never block: if no key is waiting it returns
/// [`NO_KEY`] immediately, so programs that poll input do so by
/// busy-looping across `run` ticks rather than suspending the VM.
pub trait IoPort {
    fn read_key(&mut self) -> i32;
    fn output_text(&mut self, text: &str, px: i32, py: i32, fg: Rgb);
    fn color(&mut self, bg: Rgb);
    fn refresh(&mut self);
    fn timeout(&mut self, ms: u64);
}

/// A port that draws nothing and never has a key waiting. Used by unit
/// and integration tests, and by any invocation that only cares about
/// final `Memory` contents.
#[derive(Default)]
pub struct NullIoPort {
    pub draws: Vec<(String, i32, i32)>,
    pub refreshes: u32,
    pub slept_ms: Vec<u64>,
}

impl IoPort for NullIoPort {
    fn read_key(&mut self) -> i32 {
        NO_KEY
    }

    fn output_text(&mut self, text: &str, px: i32, py: i32, _fg: Rgb) {
        self.draws.push((text.to_string(), px, py));
    }

    fn color(&mut self, _bg: Rgb) {}

    fn refresh(&mut self) {
        self.refreshes += 1;
    }

    fn timeout(&mut self, ms: u64) {
        self.slept_ms.push(ms);
    }
}

/// An `IoPort` that always returns the same key code, for tests that
/// drive the `INPUT` interrupt deterministically.
pub struct FixedKeyIoPort {
    pub key: i32,
    pub inner: NullIoPort,
}

impl FixedKeyIoPort {
    pub fn new(key: i32) -> FixedKeyIoPort {
        FixedKeyIoPort {
            key,
            inner: NullIoPort::default(),
        }
    }
}

impl IoPort for FixedKeyIoPort {
    fn read_key(&mut self) -> i32 {
        self.key
    }

    fn output_text(&mut self, text: &str, px: i32, py: i32, fg: Rgb) {
        self.inner.output_text(text, px, py, fg)
    }

    fn color(&mut self, bg: Rgb) {
        self.inner.color(bg)
    }

    fn refresh(&mut self) {
        self.inner.refresh()
    }

    fn timeout(&mut self, ms: u64) {
        self.inner.timeout(ms)
    }
}
