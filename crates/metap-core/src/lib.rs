//! Core infrastructure for metap.
//!
//! This crate provides the pass-independent pieces of the pipeline:
//! - Error codes for CLI output and configuration errors
//! - Line range selection used by every range-scoped pass
//! - Log tag formatting shared by the instrumentation passes
//! - Pipeline configuration loaded from TOML
//! - A Rust model of the runtime helpers the emitted code calls

pub mod config;
pub mod error;
pub mod log_info;
pub mod range;
pub mod runtime;

pub use config::{BreakStrategy, Config, PassName, PipelineConfig};
pub use error::{ConfigError, OutputErrorCode};
pub use log_info::LogInfo;
pub use range::{in_range, RangeSelection, Selector};
