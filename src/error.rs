//! Unified error type for the metap driver and CLI.
//!
//! `MetapError` bridges the errors of every layer (configuration, parsing,
//! passes, file I/O) into one type that knows its exit code and how to
//! render itself for a terminal.
//!
//! ## Error Code Mapping
//!
//! - `2`: invalid arguments, bad config, missing input file
//! - `3`: the input does not parse
//! - `4`: a pass rejected the input
//! - `10`: I/O failures other than a missing input

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use metap_ast::{prettify_error, ParserError};
use metap_core::{ConfigError, OutputErrorCode};
use metap_passes::PassError;

pub type MetapResult<T> = Result<T, MetapError>;

#[derive(Debug, Error)]
pub enum MetapError {
    /// Invalid arguments from the caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input file does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The input is not in the supported Python subset. Keeps the text so
    /// the error can be shown in context.
    #[error("{label}: {error}")]
    Parse {
        label: String,
        text: String,
        #[source]
        error: Box<ParserError>,
    },

    #[error(transparent)]
    Pass(#[from] PassError),

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MetapError {
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        MetapError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Wrap an I/O failure on `path`. A missing file becomes `FileNotFound`.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound && action == "read" {
            return MetapError::FileNotFound { path };
        }
        MetapError::Io {
            action,
            path,
            source,
        }
    }

    /// Exit code for this error.
    pub fn code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }

    /// Message for a terminal. Parse errors show the offending line.
    pub fn render(&self) -> String {
        match self {
            MetapError::Parse { label, text, error } => prettify_error(error, text, label),
            other => other.to_string(),
        }
    }

    /// Source line the error points at, when there is one.
    pub fn line(&self) -> Option<u32> {
        match self {
            MetapError::Parse { error, .. } => Some(error.line()),
            MetapError::Pass(err) => err.line(),
            _ => None,
        }
    }
}

impl From<&MetapError> for OutputErrorCode {
    fn from(err: &MetapError) -> Self {
        match err {
            MetapError::InvalidArguments { .. } | MetapError::FileNotFound { .. } => {
                OutputErrorCode::InvalidArguments
            }
            MetapError::Config(err) => OutputErrorCode::from(err),
            MetapError::Parse { .. } => OutputErrorCode::ParseError,
            MetapError::Pass(_) => OutputErrorCode::TransformError,
            MetapError::Io { .. } => OutputErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use metap_ast::parse_module;

    #[test]
    fn pass_errors_are_transform_errors() {
        let err = MetapError::from(PassError::Hygiene {
            macro_name: "_ret_ifnn".to_string(),
            line: 3,
        });
        assert_eq!(err.code(), OutputErrorCode::TransformError);
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.to_string(), "compile: 3: _ret_ifnn was not expanded");
    }

    #[test]
    fn parse_errors_render_with_context() {
        let text = "x = 1\ndef f(:\n  pass\n";
        let error = parse_module(text).unwrap_err();
        let err = MetapError::Parse {
            label: "prog.py".to_string(),
            text: text.to_string(),
            error: Box::new(error),
        };
        assert_eq!(err.code(), OutputErrorCode::ParseError);
        assert_eq!(err.line(), Some(2));
        let rendered = err.render();
        assert!(rendered.contains("prog.py"), "{}", rendered);
        assert!(rendered.contains("def f(:"), "{}", rendered);
    }

    #[test]
    fn missing_input_is_invalid_arguments() {
        let err = MetapError::io(
            "read",
            "nope.py",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, MetapError::FileNotFound { .. }));
        assert_eq!(err.code(), OutputErrorCode::InvalidArguments);

        let err = MetapError::io(
            "write",
            "out.py",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.code(), OutputErrorCode::InternalError);
        assert_eq!(err.to_string(), "failed to write out.py: denied");
    }

    #[test]
    fn config_errors_keep_their_code() {
        let err = MetapError::from(ConfigError::UnknownPass("nope".to_string()));
        assert_eq!(err.code(), OutputErrorCode::InvalidArguments);
        assert_eq!(err.to_string(), "unknown pass 'nope'");
    }
}
