// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Log `break` and `continue` statements.
//!
//! With [`BreakStrategy::Splice`] the print goes directly before the
//! statement in the enclosing block. With [`BreakStrategy::Wrap`] print and
//! statement are wrapped together in an `if True:` block, so the enclosing
//! block keeps its statement count.

use metap_ast::visitor::transform_stmt_children;
use metap_ast::{Expr, Module, Stmt, StmtKind, Transformer};
use metap_core::{BreakStrategy, PassName};

use super::{rewrite_module, LogOptions};
use crate::build::{print_stmt, require_line};
use crate::error::{PassError, PassReport, PassResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    Break,
    Continue,
}

impl LoopExit {
    fn pass(self) -> &'static str {
        match self {
            LoopExit::Break => PassName::LogBreaks.as_str(),
            LoopExit::Continue => PassName::LogContinues.as_str(),
        }
    }

    fn kind(self) -> &'static str {
        match self {
            LoopExit::Break => "Break",
            LoopExit::Continue => "Continue",
        }
    }

    fn matches(self, stmt: &Stmt) -> bool {
        match self {
            LoopExit::Break => matches!(stmt.kind, StmtKind::Break),
            LoopExit::Continue => matches!(stmt.kind, StmtKind::Continue),
        }
    }
}

struct LoopExitLogger<'a> {
    exit: LoopExit,
    strategy: BreakStrategy,
    opts: &'a LogOptions,
    rewrites: usize,
}

impl Transformer for LoopExitLogger<'_> {
    type Error = PassError;

    fn transform_stmt(&mut self, stmt: Stmt) -> PassResult<Vec<Stmt>> {
        if !self.exit.matches(&stmt) {
            return Ok(vec![transform_stmt_children(self, stmt)?]);
        }
        let line = require_line(self.exit.pass(), self.exit.kind(), stmt.line)?;
        if !self.opts.selects(line) {
            return Ok(vec![stmt]);
        }

        let print = print_stmt(self.opts.tag(self.exit.kind(), line).to_string(), stmt.line);
        self.rewrites += 1;
        Ok(match self.strategy {
            BreakStrategy::Splice => vec![print, stmt],
            BreakStrategy::Wrap => {
                let test = Expr::bool(true, stmt.line);
                vec![Stmt::if_(test, vec![print, stmt], Vec::new())]
            }
        })
    }
}

fn log_loop_exits(
    module: &mut Module,
    exit: LoopExit,
    opts: &LogOptions,
    strategy: BreakStrategy,
) -> PassResult<PassReport> {
    let mut logger = LoopExitLogger {
        exit,
        strategy,
        opts,
        rewrites: 0,
    };
    rewrite_module(&mut logger, module)?;
    tracing::debug!(pass = exit.pass(), rewrites = logger.rewrites, ?strategy, "logged loop exits");
    Ok(PassReport {
        rewrites: logger.rewrites,
        ..Default::default()
    })
}

/// Print a tag before every selected `break`.
pub fn log_breaks(
    module: &mut Module,
    opts: &LogOptions,
    strategy: BreakStrategy,
) -> PassResult<PassReport> {
    log_loop_exits(module, LoopExit::Break, opts, strategy)
}

/// Print a tag before every selected `continue`.
pub fn log_continues(
    module: &mut Module,
    opts: &LogOptions,
    strategy: BreakStrategy,
) -> PassResult<PassReport> {
    log_loop_exits(module, LoopExit::Continue, opts, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metap_ast::{parse_module, render_module};

    const LOOP: &str = "\nfor i in range(10):\n  if i == 3:\n    continue\n  if i == 5:\n    x = i\n    break\n";

    fn run(
        f: fn(&mut Module, &LogOptions, BreakStrategy) -> PassResult<PassReport>,
        strategy: BreakStrategy,
    ) -> String {
        let mut module = parse_module(LOOP).unwrap();
        f(&mut module, &LogOptions::default(), strategy).unwrap();
        render_module(&module)
    }

    #[test]
    fn splice_continue_only() {
        assert_eq!(
            run(log_continues, BreakStrategy::Splice),
            "for i in range(10):\n  if i == 3:\n    print('metap::Continue(ln=4)')\n    continue\n  if i == 5:\n    x = i\n    break\n"
        );
    }

    #[test]
    fn splice_break_in_multi_statement_block() {
        assert_eq!(
            run(log_breaks, BreakStrategy::Splice),
            "for i in range(10):\n  if i == 3:\n    continue\n  if i == 5:\n    x = i\n    print('metap::Break(ln=7)')\n    break\n"
        );
    }

    #[test]
    fn wrap_sole_statement() {
        assert_eq!(
            run(log_continues, BreakStrategy::Wrap),
            "for i in range(10):\n  if i == 3:\n    if True:\n      print('metap::Continue(ln=4)')\n      continue\n  if i == 5:\n    x = i\n    break\n"
        );
    }

    #[test]
    fn wrap_in_multi_statement_block() {
        let out = run(log_breaks, BreakStrategy::Wrap);
        assert!(
            out.ends_with("    x = i\n    if True:\n      print('metap::Break(ln=7)')\n      break\n"),
            "{}",
            out
        );
    }

    #[test]
    fn while_else_and_range() {
        let src = "while a:\n  break\nelse:\n  pass\nwhile b:\n  break\n";
        let mut module = parse_module(src).unwrap();
        let opts = LogOptions::new("5-6".parse().unwrap(), None);
        let report = log_breaks(&mut module, &opts, BreakStrategy::Splice).unwrap();
        assert_eq!(report.rewrites, 1);
        assert!(!report.uses_runtime);
        assert_eq!(
            render_module(&module),
            "while a:\n  break\nelse:\n  pass\nwhile b:\n  print('metap::Break(ln=6)')\n  break\n"
        );
    }
}
