//! Destinations for runtime log output.

use std::cell::RefCell;
use std::io::Write;

/// Where the runtime writes log text.
///
/// Methods take `&self` so a sink can be shared with an active
/// [`IndentGuard`](super::IndentGuard).
pub trait LogSink {
    fn write_str(&self, text: &str);

    fn write_line(&self, line: &str) {
        self.write_str(line);
        self.write_str("\n");
    }
}

/// Writes to standard output, like the emitted program's `print`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_str(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout is not an error the instrumented program sees.
        let _ = out.write_all(text.as_bytes());
    }
}

/// Collects output in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    buf: RefCell<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.buf.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.buf.borrow().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buf.borrow_mut().clear();
    }
}

impl LogSink for MemorySink {
    fn write_str(&self, text: &str) {
        self.buf.borrow_mut().push_str(text);
    }
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn write_str(&self, text: &str) {
        (**self).write_str(text)
    }
}
