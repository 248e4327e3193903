// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Pass errors, advisories and reports.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A fatal pass failure. The transformation of the current file stops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassError {
    /// The tree is malformed for this pass (wrong macro arity, bad target).
    #[error("{pass}: {line}: {message}")]
    Structural {
        pass: &'static str,
        line: u32,
        message: String,
    },

    /// A node the pass must inspect carries no line number.
    #[error("{pass}: {node} node has no line number")]
    MissingLine { pass: &'static str, node: &'static str },

    /// An annotation outside the supported grammar.
    #[error("{pass}: {line}: {annotation} annotation is not supported.")]
    Unsupported {
        pass: &'static str,
        line: u32,
        annotation: String,
    },

    /// A macro call survived the pass that should have expanded it.
    #[error("compile: {line}: {macro_name} was not expanded")]
    Hygiene { macro_name: String, line: u32 },
}

impl PassError {
    pub(crate) fn structural(pass: &'static str, line: u32, message: impl Into<String>) -> Self {
        PassError::Structural {
            pass,
            line,
            message: message.into(),
        }
    }

    /// The source line the error points at, when known.
    pub fn line(&self) -> Option<u32> {
        match self {
            PassError::Structural { line, .. }
            | PassError::Unsupported { line, .. }
            | PassError::Hygiene { line, .. } => Some(*line),
            PassError::MissingLine { .. } => None,
        }
    }
}

pub type PassResult<T> = std::result::Result<T, PassError>;

/// A non-fatal notice: the construct was left unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub pass: &'static str,
    pub line: u32,
    pub message: String,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.pass, self.line, self.message)
    }
}

/// What a pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Number of constructs rewritten.
    pub rewrites: usize,
    /// The tree now calls into the `metap` runtime module.
    pub uses_runtime: bool,
    pub advisories: Vec<Advisory>,
}

impl PassReport {
    pub fn merge(&mut self, other: PassReport) {
        self.rewrites += other.rewrites;
        self.uses_runtime |= other.uses_runtime;
        self.advisories.extend(other.advisories);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message() {
        let err = PassError::Unsupported {
            pass: "dyn_typecheck",
            line: 2,
            annotation: "AnyStr".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "dyn_typecheck: 2: AnyStr annotation is not supported."
        );
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn merge_reports() {
        let mut a = PassReport {
            rewrites: 1,
            ..Default::default()
        };
        a.merge(PassReport {
            rewrites: 2,
            uses_runtime: true,
            advisories: vec![],
        });
        assert_eq!(a.rewrites, 3);
        assert!(a.uses_runtime);
    }
}
