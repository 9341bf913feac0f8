//! Console logging
//!
//! Installs a `tracing` fmt subscriber whose lines go to the browser console.
//! Warnings and errors use `console.warn` and `console.error` so they keep
//! their styling in devtools.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleLevel {
    Log,
    Warn,
    Error,
}

impl From<&Level> for ConsoleLevel {
    fn from(level: &Level) -> Self {
        if *level == Level::ERROR {
            ConsoleLevel::Error
        } else if *level == Level::WARN {
            ConsoleLevel::Warn
        } else {
            ConsoleLevel::Log
        }
    }
}

/// Buffers one formatted event and writes it to the console on drop
pub struct ConsoleWriter {
    level: ConsoleLevel,
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buffer);
        let line: wasm_bindgen::JsValue = line.trim_end().into();
        match self.level {
            ConsoleLevel::Error => web_sys::console::error_1(&line),
            ConsoleLevel::Warn => web_sys::console::warn_1(&line),
            ConsoleLevel::Log => web_sys::console::log_1(&line),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: ConsoleLevel::Log,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: meta.level().into(),
            buffer: Vec::new(),
        }
    }
}

/// Install the console subscriber
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init() {
    // No clock in wasm32-unknown-unknown, so no timestamps
    let result = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .try_init();

    if result.is_err() {
        tracing::debug!("Console subscriber already installed");
    }
}
