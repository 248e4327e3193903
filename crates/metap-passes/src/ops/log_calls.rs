// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Log call sites through the deferred-call wrapper.
//!
//! The tag records the call's own source, rendered before its arguments are
//! rewritten. Arguments are visited as well, so nested calls are logged
//! (innermost first at run time, since arguments are evaluated first).
//!
//! [`log_calls_start_end`] is the timed variant: the call is logged when it
//! starts and again when it returns, with the elapsed time.

use metap_ast::visitor::transform_expr_children;
use metap_ast::{render_expr, Expr, ExprKind, Module, Transformer};
use metap_core::PassName;

use super::{rewrite_module, LogOptions};
use crate::build::{is_runtime_call, require_line};
use crate::deferred::{deferred_log_call, deferred_timed_log_call};
use crate::error::{PassError, PassReport, PassResult};

struct CallLogger<'a> {
    pass: &'static str,
    wrap: fn(Expr, String) -> Expr,
    opts: &'a LogOptions,
    rewrites: usize,
}

impl Transformer for CallLogger<'_> {
    type Error = PassError;

    fn transform_expr(&mut self, expr: Expr) -> PassResult<Expr> {
        // Calls into the runtime come from other passes; leave them alone.
        if !matches!(expr.kind, ExprKind::Call { .. }) || is_runtime_call(&expr) {
            return transform_expr_children(self, expr);
        }
        let line = require_line(self.pass, "Call", expr.line)?;
        if !self.opts.selects(line) {
            return transform_expr_children(self, expr);
        }

        let source = render_expr(&expr);
        let call = transform_expr_children(self, expr)?;
        let tag = self.opts.tag("Call", line).field("call", source);
        self.rewrites += 1;
        Ok((self.wrap)(call, tag.to_string()))
    }
}

fn run_logger(mut logger: CallLogger<'_>, module: &mut Module) -> PassResult<PassReport> {
    rewrite_module(&mut logger, module)?;
    tracing::debug!(pass = logger.pass, rewrites = logger.rewrites, "logged calls");
    Ok(PassReport {
        rewrites: logger.rewrites,
        uses_runtime: logger.rewrites > 0,
        advisories: Vec::new(),
    })
}

/// Log every selected call before it runs.
pub fn log_calls(module: &mut Module, opts: &LogOptions) -> PassResult<PassReport> {
    let logger = CallLogger {
        pass: PassName::LogCalls.as_str(),
        wrap: deferred_log_call,
        opts,
        rewrites: 0,
    };
    run_logger(logger, module)
}

/// Log every selected call when it starts and when it returns, with the
/// elapsed time.
pub fn log_calls_start_end(module: &mut Module, opts: &LogOptions) -> PassResult<PassReport> {
    let logger = CallLogger {
        pass: PassName::LogCallsStartEnd.as_str(),
        wrap: deferred_timed_log_call,
        opts,
        rewrites: 0,
    };
    run_logger(logger, module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::log_returns;
    use metap_ast::{parse_module, render_module};

    fn run(src: &str) -> String {
        let mut module = parse_module(src).unwrap();
        log_calls(&mut module, &LogOptions::default()).unwrap();
        render_module(&module)
    }

    #[test]
    fn simple_call() {
        assert_eq!(
            run("x = f(a, b=2)\n"),
            "x = metap.log_call(lambda: f(a, b=2), 'metap::Call(ln=1,call=f(a, b=2))')\n"
        );
    }

    #[test]
    fn nested_calls_keep_original_source_in_tag() {
        assert_eq!(
            run("print(len(xs))\n"),
            "metap.log_call(lambda: print(metap.log_call(lambda: len(xs), 'metap::Call(ln=1,call=len(xs))')), 'metap::Call(ln=1,call=print(len(xs)))')\n"
        );
    }

    #[test]
    fn method_call_tag_uses_double_quotes_when_needed() {
        assert_eq!(
            run("s.startswith('# ')\n"),
            "metap.log_call(lambda: s.startswith('# '), \"metap::Call(ln=1,call=s.startswith('# '))\")\n"
        );
    }

    #[test]
    fn runtime_calls_are_not_logged() {
        let mut module = parse_module("def f():\n  return 1\n").unwrap();
        log_returns(&mut module, &LogOptions::default()).unwrap();
        let report = log_calls(&mut module, &LogOptions::default()).unwrap();
        assert_eq!(report.rewrites, 0);
    }

    #[test]
    fn start_end_wraps_with_the_timed_helper() {
        let mut module = parse_module("def find(limit):\n  return [n for n in range(limit) if is_prime(n)]\n").unwrap();
        let report = log_calls_start_end(&mut module, &LogOptions::default()).unwrap();
        assert_eq!(report.rewrites, 2);
        assert!(report.uses_runtime);
        assert_eq!(
            render_module(&module),
            "def find(limit):\n  return [n for n in metap.log_call_start_end(lambda: range(limit), 'metap::Call(ln=2,call=range(limit))') if metap.log_call_start_end(lambda: is_prime(n), 'metap::Call(ln=2,call=is_prime(n))')]\n"
        );
    }

    #[test]
    fn start_end_honors_range_and_skips_runtime_calls() {
        let mut module = parse_module("f()\ng()\n").unwrap();
        log_calls(&mut module, &LogOptions::new("1".parse().unwrap(), None)).unwrap();
        let opts = LogOptions::new("1-2".parse().unwrap(), Some("prog.py".to_string()));
        let report = log_calls_start_end(&mut module, &opts).unwrap();
        assert_eq!(report.rewrites, 1);
        assert_eq!(
            render_module(&module),
            "metap.log_call(lambda: f(), 'metap::Call(ln=1,call=f())')\nmetap.log_call_start_end(lambda: g(), 'metap::prog.py::Call(ln=2,call=g())')\n"
        );
    }

    #[test]
    fn range_restricts_by_call_line() {
        let mut module = parse_module("f()\ng()\nh()\n").unwrap();
        let opts = LogOptions::new("2".parse().unwrap(), None);
        log_calls(&mut module, &opts).unwrap();
        assert_eq!(
            render_module(&module),
            "f()\nmetap.log_call(lambda: g(), 'metap::Call(ln=2,call=g())')\nh()\n"
        );
    }
}
