//! A Rust model of the runtime helpers emitted programs call.
//!
//! The passes emit calls into a `metap` module. [`names`] holds the emitted
//! identifiers; [`Runtime`] implements the same contracts against a
//! pluggable [`LogSink`] so they can be exercised directly.
//!
//! ```
//! use metap_core::runtime::{MemorySink, Runtime};
//!
//! let rt = Runtime::new(MemorySink::new());
//! let v = rt.log_call(|| 40 + 2, "metap::Call(ln=1,call=f())");
//! assert_eq!(v, 42);
//! assert_eq!(rt.sink().lines(), vec!["metap::Call(ln=1,call=f())"]);
//! ```

mod relay;
mod sink;

use std::cell::Cell;
use std::time::Instant;

pub use relay::RelayEnv;
pub use sink::{LogSink, MemorySink, StdoutSink};

/// Identifiers used in emitted code.
pub mod names {
    /// Module the emitted program imports.
    pub const MODULE: &str = "metap";
    pub const LOG_RET: &str = "log_ret";
    pub const LOG_CALL: &str = "log_call";
    pub const LOG_CALL_START_END: &str = "log_call_start_end";
    pub const CVAR: &str = "_cvar";
    pub const CVAR_ALWAYS: &str = "_cvar_always";
    pub const RELAY: &str = "relay";
    pub const INDENT_PRINT: &str = "indent_print";
    pub const INDENT_CTX: &str = "indent_ctx";
    pub const TIME_EXEC: &str = "time_exec";

    /// Prefix of generated local names.
    pub const GENERATED_PREFIX: &str = "_metap_";

    /// Relay key for conditional-binding target `var`.
    pub fn relay_key(var: &str) -> String {
        format!("relay_{}", var)
    }
}

/// Width of one indentation level printed by [`Runtime::indent_print`].
pub const INDENT_WIDTH: usize = 2;

/// Runtime helper state: a log sink and the indentation counter.
#[derive(Debug, Default)]
pub struct Runtime<S: LogSink = StdoutSink> {
    sink: S,
    indent: Cell<usize>,
}

impl<S: LogSink> Runtime<S> {
    pub fn new(sink: S) -> Self {
        Runtime {
            sink,
            indent: Cell::new(0),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Print `log`, then pass `value` through.
    pub fn log_ret<T>(&self, value: T, log: &str) -> T {
        self.sink.write_line(log);
        value
    }

    /// Print `log`, then run `call` exactly once and return its result.
    pub fn log_call<T>(&self, call: impl FnOnce() -> T, log: &str) -> T {
        self.sink.write_line(log);
        call()
    }

    /// Print `<log> start`, run `call` once under [`Runtime::time_exec`],
    /// then print `<log> end elapsed_ns=<n>` and return the call's result.
    pub fn log_call_start_end<T>(&self, call: impl FnOnce() -> T, log: &str) -> T {
        self.sink.write_line(&format!("{} start", log));
        let (elapsed, value) = self.time_exec(call);
        self.sink
            .write_line(&format!("{} end elapsed_ns={}", log, elapsed));
        value
    }

    /// Run `thunk` once, returning the elapsed nanoseconds and its value.
    pub fn time_exec<T>(&self, thunk: impl FnOnce() -> T) -> (u128, T) {
        let start = Instant::now();
        let value = thunk();
        (start.elapsed().as_nanos(), value)
    }

    /// Write the current indentation without a newline.
    pub fn indent_print(&self) {
        let pad = " ".repeat(self.indent.get() * INDENT_WIDTH);
        self.sink.write_str(&pad);
    }

    /// Increase the indentation until the returned guard is dropped.
    pub fn indent_ctx(&self) -> IndentGuard<'_> {
        self.indent.set(self.indent.get() + 1);
        IndentGuard {
            level: &self.indent,
        }
    }

    pub fn indent_level(&self) -> usize {
        self.indent.get()
    }

    /// Reset the indentation counter.
    pub fn reset(&self) {
        self.indent.set(0);
    }
}

/// Scoped indentation. Dropping it, including during unwinding, undoes the
/// increment made by [`Runtime::indent_ctx`].
#[must_use = "the indentation is undone as soon as the guard is dropped"]
#[derive(Debug)]
pub struct IndentGuard<'a> {
    level: &'a Cell<usize>,
}

impl Drop for IndentGuard<'_> {
    fn drop(&mut self) {
        self.level.set(self.level.get().saturating_sub(1));
    }
}
