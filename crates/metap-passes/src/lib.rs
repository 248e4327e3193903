// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Rewrite passes for metap.
//!
//! Every pass takes a parsed [`Module`](metap_ast::Module), rewrites it in
//! place and returns a [`PassReport`]. Passes are independent: the driver
//! runs any ordered subset of them over one tree.
//!
//! - [`ops`]: instrumentation (`log_*`) and macro expansion (`compile`)
//! - [`typecheck`]: runtime checks synthesized from annotations
//!
//! ```
//! use metap_ast::{parse_module, render_module};
//! use metap_passes::ops::{log_returns, LogOptions};
//!
//! let mut module = parse_module("def add_one(n):\n  return n + 1\n").unwrap();
//! let report = log_returns(&mut module, &LogOptions::default()).unwrap();
//! assert!(report.uses_runtime);
//! assert_eq!(
//!     render_module(&module),
//!     "def add_one(n):\n  return metap.log_ret(n + 1, 'metap::Return(ln=2)')\n"
//! );
//! ```

pub mod build;
pub mod deferred;
pub mod error;
pub mod ops;
pub mod typecheck;

pub use error::{Advisory, PassError, PassReport, PassResult};
pub use ops::LogOptions;
