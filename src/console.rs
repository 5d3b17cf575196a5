//! Route `tracing` output to the browser console.
//!
//! The fmt subscriber writes each event into a fresh [`ConsoleWriter`];
//! the buffered line goes out through `console.log` when the writer drops.

use std::io;

/// Collects one formatted event.
#[derive(Default)]
pub struct ConsoleWriter {
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end();
        if !line.is_empty() {
            web_sys::console::log_1(&line.into());
        }
    }
}

/// Install the global subscriber. No timestamps (no clock in wasm std) and
/// no ANSI colours (the console does not render them).
pub fn init_logging() {
    let result = tracing_subscriber::fmt()
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(ConsoleWriter::default)
        .try_init();
    if result.is_err() {
        web_sys::console::warn_1(&"tracing subscriber already installed".into());
    }
}
