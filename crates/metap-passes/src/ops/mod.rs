// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Instrumentation and macro-expansion passes.
//!
//! Each pass is a [`Transformer`] over the owned tree, wrapped in a function
//! that rewrites a [`Module`] in place and reports what it did. When a pass
//! fails, the module is left empty: the run for that file is over.

mod break_cont;
mod compile;
mod cvar;
mod func_defs;
mod hygiene;
mod log_calls;
mod log_ifs;
mod log_returns;
mod ret_macros;
mod time_exec;

pub use break_cont::{log_breaks, log_continues};
pub use compile::compile;
pub use cvar::desugar_cvars;
pub use func_defs::log_func_defs;
pub use hygiene::{check_hygiene, MACRO_NAMES};
pub use log_calls::{log_calls, log_calls_start_end};
pub use log_ifs::log_ifs;
pub use log_returns::log_returns;
pub use ret_macros::expand_ret_macros;
pub use time_exec::expand_time_exec;

use metap_ast::visitor::transform_body;
use metap_ast::{Module, Transformer};
use metap_core::{LogInfo, RangeSelection};

use crate::error::PassResult;

/// Options shared by the instrumentation passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Lines whose constructs are instrumented.
    pub range: RangeSelection,
    /// File name prefixed to every log tag.
    pub fname: Option<String>,
}

impl LogOptions {
    pub fn new(range: RangeSelection, fname: Option<String>) -> Self {
        LogOptions { range, fname }
    }

    pub fn selects(&self, line: u32) -> bool {
        self.range.contains(line)
    }

    pub fn tag(&self, kind: &str, line: u32) -> LogInfo {
        LogInfo::new(kind, line).with_fname(self.fname.as_deref())
    }
}

/// Run `transformer` over every statement of `module`.
pub(crate) fn rewrite_module<T>(transformer: &mut T, module: &mut Module) -> PassResult<()>
where
    T: Transformer<Error = crate::error::PassError>,
{
    let body = std::mem::take(&mut module.body);
    module.body = transform_body(transformer, body)?;
    Ok(())
}
