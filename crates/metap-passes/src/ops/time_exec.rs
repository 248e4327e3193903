// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! `_time_e(e)` => `metap.time_exec(lambda: e)`.
//!
//! At run time the helper evaluates `e` once and returns
//! `(elapsed_ns, value)`.

use metap_ast::visitor::transform_expr_children;
use metap_ast::{Expr, ExprKind, Module, Transformer};
use metap_core::PassName;

use super::rewrite_module;
use crate::build::require_line;
use crate::deferred::deferred_time_exec;
use crate::error::{PassError, PassReport, PassResult};

const PASS: &str = PassName::Compile.as_str();

pub const TIME_MACRO: &str = "_time_e";

struct TimeExecExpander {
    rewrites: usize,
}

impl Transformer for TimeExecExpander {
    type Error = PassError;

    fn transform_expr(&mut self, expr: Expr) -> PassResult<Expr> {
        let expr = transform_expr_children(self, expr)?;
        if expr.called_name() != Some(TIME_MACRO) {
            return Ok(expr);
        }
        let line = require_line(PASS, "Call", expr.line)?;
        match expr.kind {
            ExprKind::Call {
                mut args, keywords, ..
            } if args.len() == 1 && keywords.is_empty() => {
                self.rewrites += 1;
                Ok(deferred_time_exec(args.remove(0)))
            }
            _ => Err(PassError::structural(
                PASS,
                line,
                format!("{} takes exactly one argument", TIME_MACRO),
            )),
        }
    }
}

/// Expand every `_time_e` call.
pub fn expand_time_exec(module: &mut Module) -> PassResult<PassReport> {
    let mut expander = TimeExecExpander { rewrites: 0 };
    rewrite_module(&mut expander, module)?;
    Ok(PassReport {
        rewrites: expander.rewrites,
        uses_runtime: expander.rewrites > 0,
        advisories: Vec::new(),
    })
}
