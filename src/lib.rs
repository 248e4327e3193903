//! metap: source-to-source instrumentation and macro expansion for Python.
//!
//! Parse a program, run an ordered selection of rewrite passes over its
//! tree, and render the result:
//!
//! - logging passes print a tag at returns, breaks, continues, calls,
//!   function entries and branches
//! - `compile` expands the `_cvar`, `_ret_*` and `_time_e` macros
//! - `dyn_typecheck` turns annotations into runtime assertions

// Core infrastructure - re-exported from metap-core
pub use metap_core::config;
pub use metap_core::log_info;
pub use metap_core::range;
pub use metap_core::runtime;

// Passes
pub use metap_passes::ops;
pub use metap_passes::typecheck;

pub mod cli;
pub mod driver;
pub mod error;
pub mod output;

pub use driver::MetaP;
pub use error::{MetapError, MetapResult};
