// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Deferred evaluation of an expression through a runtime helper.
//!
//! The expression is moved into a zero-parameter lambda and handed to the
//! helper together with any extra arguments:
//!
//! ```text
//! f(x)   =>   metap.log_call(lambda: f(x), 'metap::Call(ln=1,call=f(x))')
//! ```
//!
//! The helper decides when the lambda runs. `log_call` prints first and then
//! invokes it exactly once, so the call keeps its side effects and its value
//! and only gains a log line before it. `log_call_start_end` also logs after
//! the call, with the time it took.

use metap_ast::Expr;
use metap_core::runtime::names;

use crate::build::runtime_call;

/// `metap.<helper>(lambda: <expr>, extra...)`
pub fn defer(expr: Expr, helper: &str, extra: Vec<Expr>) -> Expr {
    let line = expr.line;
    let mut args = Vec::with_capacity(extra.len() + 1);
    args.push(Expr::thunk(expr));
    args.extend(extra);
    runtime_call(helper, args, line)
}

/// `metap.log_call(lambda: <call>, '<log>')`
pub fn deferred_log_call(call: Expr, log: String) -> Expr {
    let line = call.line;
    defer(call, names::LOG_CALL, vec![Expr::str(log, line)])
}

/// `metap.log_call_start_end(lambda: <call>, '<log>')`
pub fn deferred_timed_log_call(call: Expr, log: String) -> Expr {
    let line = call.line;
    defer(call, names::LOG_CALL_START_END, vec![Expr::str(log, line)])
}

/// `metap.time_exec(lambda: <expr>)`
pub fn deferred_time_exec(expr: Expr) -> Expr {
    defer(expr, names::TIME_EXEC, Vec::new())
}
