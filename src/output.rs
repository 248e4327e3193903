//! JSON output for the CLI.
//!
//! With `--json`, every invocation prints exactly one response object:
//! - **Status first:** every response starts with `status` (`"ok"` or `"error"`)
//! - **Versioned:** `schema_version` enables forward compatibility
//! - **Deterministic:** same input, same bytes

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use metap_core::PassName;
use metap_passes::Advisory;

use crate::driver::MetaP;
use crate::error::MetapError;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Successful transformation.
#[derive(Debug, Clone, Serialize)]
pub struct TransformResponse {
    pub status: String,
    pub schema_version: String,
    /// Input file.
    pub input: String,
    /// File written, absent when the program went to stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Passes run, in order.
    pub passes: Vec<PassName>,
    pub rewrites: usize,
    /// The output imports the `metap` runtime module.
    pub uses_runtime: bool,
    pub advisories: Vec<Advisory>,
}

impl TransformResponse {
    pub fn new(mp: &MetaP, output: Option<&Path>) -> Self {
        let report = mp.report();
        TransformResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            input: mp.label().to_string(),
            output: output.map(|p| p.display().to_string()),
            passes: mp.passes_run().to_vec(),
            rewrites: report.rewrites,
            uses_runtime: report.uses_runtime,
            advisories: report.advisories.clone(),
        }
    }
}

/// Error details.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code, equal to the exit status.
    pub code: u8,
    pub message: String,
    /// Source line the error points at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl ErrorInfo {
    pub fn from_error(err: &MetapError) -> Self {
        ErrorInfo {
            code: err.code().code(),
            message: err.to_string(),
            line: err.line(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &MetapError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use metap_core::range::RangeSelection;
    use metap_passes::PassError;

    fn emit<T: Serialize>(response: &T) -> serde_json::Value {
        let mut buf = Vec::new();
        emit_response(response, &mut buf).unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn status_comes_first() {
        let mp = MetaP::from_source("x = 1\n", "prog.py").unwrap();
        let mut buf = Vec::new();
        emit_response(&TransformResponse::new(&mp, None), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("{\n  \"status\": \"ok\""), "{}", text);
    }

    #[test]
    fn transform_response_fields() {
        let mut mp = MetaP::from_source("def f(a: int):\n  b: int = a\n  return b\n", "prog.py").unwrap();
        mp.dyn_typecheck().unwrap();
        mp.log_returns(&RangeSelection::all(), false).unwrap();
        let json = emit(&TransformResponse::new(&mp, Some(Path::new("prog.metap.py"))));
        assert_eq!(json["schema_version"], "1");
        assert_eq!(json["input"], "prog.py");
        assert_eq!(json["output"], "prog.metap.py");
        assert_eq!(json["passes"], serde_json::json!(["dyn_typecheck", "log_returns"]));
        assert_eq!(json["uses_runtime"], true);
        assert_eq!(json["advisories"], serde_json::json!([]));
    }

    #[test]
    fn output_is_absent_for_stdout() {
        let mp = MetaP::from_source("x = 1\n", "prog.py").unwrap();
        let json = emit(&TransformResponse::new(&mp, None));
        assert!(json.get("output").is_none());
    }

    #[test]
    fn error_response_carries_code_and_line() {
        let err = MetapError::from(PassError::Unsupported {
            pass: "dyn_typecheck",
            line: 4,
            annotation: "AnyStr".to_string(),
        });
        let json = emit(&ErrorResponse::from_error(&err));
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"]["code"], 4);
        assert_eq!(json["error"]["line"], 4);
        assert_eq!(
            json["error"]["message"],
            "dyn_typecheck: 4: AnyStr annotation is not supported."
        );
    }
}
