//! Log tags printed by instrumented programs.
//!
//! Every instrumentation pass prints a tag of the form
//! `metap::[<file>::]Kind(ln=N,key=value,...)`.

use std::fmt;

/// A log tag under construction. Fields render in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogInfo {
    kind: String,
    fname: Option<String>,
    fields: Vec<(String, String)>,
}

impl LogInfo {
    /// A tag for construct `kind` starting at `line`.
    pub fn new(kind: impl Into<String>, line: u32) -> Self {
        LogInfo {
            kind: kind.into(),
            fname: None,
            fields: vec![("ln".to_string(), line.to_string())],
        }
    }

    /// Prefix the tag with a file name.
    pub fn with_fname(mut self, fname: Option<&str>) -> Self {
        self.fname = fname.map(str::to_string);
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for LogInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("metap::")?;
        if let Some(fname) = &self.fname {
            write!(f, "{}::", fname)?;
        }
        write!(f, "{}(", self.kind)?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_str(")")
    }
}
