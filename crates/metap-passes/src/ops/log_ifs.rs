// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Log which branch of an `if` runs.
//!
//! The then-branch gets `print('metap::If(ln=N)')`. The else-branch gets
//! `print('metap::Else(ln=N)')` only when it is a terminal `else`; an `elif`
//! link is an `If` of its own and is instrumented as one.

use metap_ast::visitor::transform_stmt_children;
use metap_ast::{Module, Stmt, StmtKind, Transformer};
use metap_core::PassName;

use super::{rewrite_module, LogOptions};
use crate::build::{print_stmt, require_line};
use crate::error::{PassError, PassReport, PassResult};

const PASS: &str = PassName::LogIfs.as_str();

struct IfLogger<'a> {
    opts: &'a LogOptions,
    rewrites: usize,
}

impl Transformer for IfLogger<'_> {
    type Error = PassError;

    fn transform_stmt(&mut self, stmt: Stmt) -> PassResult<Vec<Stmt>> {
        let stmt = transform_stmt_children(self, stmt)?;
        let StmtKind::If(mut node) = stmt.kind else {
            return Ok(vec![stmt]);
        };
        let line = require_line(PASS, "If", stmt.line)?;
        if self.opts.selects(line) {
            let then_print = print_stmt(self.opts.tag("If", line).to_string(), stmt.line);
            node.body.insert(0, then_print);
            if !node.orelse.is_empty() && !node.has_elif() {
                let else_print = print_stmt(self.opts.tag("Else", line).to_string(), stmt.line);
                node.orelse.insert(0, else_print);
            }
            self.rewrites += 1;
        }
        Ok(vec![Stmt::new(StmtKind::If(node), stmt.line)])
    }
}

/// Log the taken branch of every selected `if`.
pub fn log_ifs(module: &mut Module, opts: &LogOptions) -> PassResult<PassReport> {
    let mut logger = IfLogger { opts, rewrites: 0 };
    rewrite_module(&mut logger, module)?;
    tracing::debug!(pass = PASS, rewrites = logger.rewrites, "logged branches");
    Ok(PassReport {
        rewrites: logger.rewrites,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use metap_ast::{parse_module, render_module};

    fn run(src: &str, opts: &LogOptions) -> String {
        let mut module = parse_module(src).unwrap();
        log_ifs(&mut module, opts).unwrap();
        render_module(&module)
    }

    #[test]
    fn if_else() {
        assert_eq!(
            run("if a:\n  x = 1\nelse:\n  x = 2\n", &LogOptions::default()),
            "if a:\n  print('metap::If(ln=1)')\n  x = 1\nelse:\n  print('metap::Else(ln=1)')\n  x = 2\n"
        );
    }

    #[test]
    fn if_without_else() {
        assert_eq!(
            run("if a:\n  pass\n", &LogOptions::default()),
            "if a:\n  print('metap::If(ln=1)')\n  pass\n"
        );
    }

    #[test]
    fn elif_chain_only_terminal_else_is_logged() {
        assert_eq!(
            run(
                "if a:\n  x = 1\nelif b:\n  x = 2\nelse:\n  x = 3\n",
                &LogOptions::default()
            ),
            "if a:\n  print('metap::If(ln=1)')\n  x = 1\nelif b:\n  print('metap::If(ln=3)')\n  x = 2\nelse:\n  print('metap::Else(ln=3)')\n  x = 3\n"
        );
    }

    #[test]
    fn else_holding_a_nested_if_with_siblings_is_terminal() {
        assert_eq!(
            run(
                "if a:\n  pass\nelse:\n  y = 0\n  if b:\n    pass\n",
                &LogOptions::new("1".parse().unwrap(), None)
            ),
            "if a:\n  print('metap::If(ln=1)')\n  pass\nelse:\n  print('metap::Else(ln=1)')\n  y = 0\n  if b:\n    pass\n"
        );
    }
}
