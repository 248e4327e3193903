//! Error codes and configuration errors for metap.
//!
//! ## Error Code Mapping
//!
//! Exit codes:
//! - `2`: Invalid arguments (bad flags, bad config, bad range text)
//! - `3`: Parse errors (the input is not valid in the supported subset)
//! - `4`: Transform errors (a pass rejected the input)
//! - `10`: Internal errors (I/O, unexpected state)

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad flags, malformed config).
    InvalidArguments = 2,
    /// The source file could not be parsed.
    ParseError = 3,
    /// A pass failed on the input tree.
    TransformError = 4,
    /// Internal errors (I/O, bugs).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid line range '{text}': {reason}")]
    InvalidRange { text: String, reason: String },

    #[error("unknown pass '{0}'")]
    UnknownPass(String),

    #[error("unknown break strategy '{0}' (expected 'splice' or 'wrap')")]
    UnknownBreakStrategy(String),
}

impl From<&ConfigError> for OutputErrorCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::Read { .. } => OutputErrorCode::InternalError,
            ConfigError::Parse { .. }
            | ConfigError::InvalidRange { .. }
            | ConfigError::UnknownPass(_)
            | ConfigError::UnknownBreakStrategy(_) => OutputErrorCode::InvalidArguments,
        }
    }
}
