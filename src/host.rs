//! Host-side boundary traits the core calls into: frame output and
//! fatal-error reporting. The cartridge storage boundary lives in
//! `cartridge.rs` since it is intimately tied to MBC1 bank math.

use crate::error::Error;

/// Receives one rendered scanline at a time, up to 144 times per frame.
/// Each pixel is a 2-bit palette-mapped color index (0..3); upper bits
/// are reserved zero.
pub trait LcdHook {
    fn draw_line(&mut self, pixels: &[u8; 160], line: u8);
}

/// Receives fatal core errors. The core ceases stepping once this is
/// called; the host is expected to log and exit.
pub trait ErrorSink {
    fn on_error(&mut self, error: &Error);
}

/// An `ErrorSink` that does nothing; useful for headless tests that
/// only want the returned `Result` from `step()`.
pub struct NullErrorSink;

impl ErrorSink for NullErrorSink {
    fn on_error(&mut self, _error: &Error) {}
}

/// An `LcdHook` that discards every line; useful where only MMU/CPU
/// state is under test.
pub struct NullLcdHook;

impl LcdHook for NullLcdHook {
    fn draw_line(&mut self, _pixels: &[u8; 160], _line: u8) {}
}
