// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! `return v` => `return metap.log_ret(v, '<tag>')`.

use metap_ast::visitor::transform_stmt_children;
use metap_ast::{Expr, Module, Stmt, StmtKind, Transformer};
use metap_core::runtime::names;
use metap_core::PassName;

use super::{rewrite_module, LogOptions};
use crate::build::{require_line, runtime_call};
use crate::error::{PassError, PassReport, PassResult};

const PASS: &str = PassName::LogReturns.as_str();

struct ReturnLogger<'a> {
    opts: &'a LogOptions,
    rewrites: usize,
}

impl Transformer for ReturnLogger<'_> {
    type Error = PassError;

    fn transform_stmt(&mut self, stmt: Stmt) -> PassResult<Vec<Stmt>> {
        let stmt = transform_stmt_children(self, stmt)?;
        let StmtKind::Return(value) = stmt.kind else {
            return Ok(vec![stmt]);
        };
        let line = require_line(PASS, "Return", stmt.line)?;
        if !self.opts.selects(line) {
            return Ok(vec![Stmt::ret(value, stmt.line)]);
        }

        // `return` and `return None` are the same.
        let value = value.unwrap_or_else(|| Expr::none(stmt.line));
        let tag = self.opts.tag("Return", line).to_string();
        let logged = runtime_call(
            names::LOG_RET,
            vec![value, Expr::str(tag, stmt.line)],
            stmt.line,
        );
        self.rewrites += 1;
        Ok(vec![Stmt::ret(Some(logged), stmt.line)])
    }
}

/// Log every selected return statement and its value.
pub fn log_returns(module: &mut Module, opts: &LogOptions) -> PassResult<PassReport> {
    let mut logger = ReturnLogger { opts, rewrites: 0 };
    rewrite_module(&mut logger, module)?;
    tracing::debug!(pass = PASS, rewrites = logger.rewrites, "logged returns");
    Ok(PassReport {
        rewrites: logger.rewrites,
        uses_runtime: logger.rewrites > 0,
        advisories: Vec::new(),
    })
}
