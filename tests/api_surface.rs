//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core Infrastructure Types
// ============================================================================

// config module - pipeline configuration
use metap::config::{BreakStrategy, Config, PassName, PipelineConfig, CONFIG_FILE_NAME};

// range module - line selection
use metap::range::{in_range, RangeSelection, Selector};

// log_info module - log tags
use metap::log_info::LogInfo;

// runtime module - model of the emitted helper calls
use metap::runtime::{names, IndentGuard, LogSink, MemorySink, RelayEnv, Runtime, StdoutSink};

// ============================================================================
// Passes
// ============================================================================

use metap::ops::{
    check_hygiene, compile, desugar_cvars, expand_ret_macros, expand_time_exec, log_breaks,
    log_calls, log_calls_start_end, log_continues, log_func_defs, log_ifs, log_returns,
    LogOptions, MACRO_NAMES,
};
use metap::typecheck::{compile_check, dyn_typecheck};

// ============================================================================
// Front Doors
// ============================================================================

use metap::cli::{run, Cli, LogLevel};
use metap::driver::{MetaP, OUTPUT_SUFFIX};
use metap::error::{MetapError, MetapResult};
use metap::output::{emit_response, ErrorInfo, ErrorResponse, TransformResponse, SCHEMA_VERSION};

// ============================================================================
// Test
// ============================================================================

#[test]
fn api_surface_compiles() {
    // The imports above form the public API contract.
    let _ = std::any::type_name::<MetaP>();
    let _ = std::any::type_name::<MetapError>();
    let _ = std::any::type_name::<PipelineConfig>();
    let _ = std::any::type_name::<RangeSelection>();
    let _ = std::any::type_name::<Runtime<MemorySink>>();
    let _ = std::any::type_name::<RelayEnv<i64>>();
    let _ = std::any::type_name::<TransformResponse>();
}

#[test]
fn schema_version_is_stable() {
    assert_eq!(SCHEMA_VERSION, "1");
}

#[test]
fn every_pass_has_a_stable_name() {
    let names: Vec<_> = PassName::ALL.iter().map(|p| p.as_str()).collect();
    assert_eq!(
        names,
        [
            "log_returns",
            "log_breaks",
            "log_continues",
            "log_calls",
            "log_calls_start_end",
            "log_func_defs",
            "log_ifs",
            "compile",
            "dyn_typecheck",
        ]
    );
}
