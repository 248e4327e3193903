// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Log function entry.
//!
//! The plain variant prepends `print('<tag>')` to the body. The indented
//! variant prints through `metap.indent_print()` and runs the original body
//! under `with metap.indent_ctx():`, so nested instrumented calls print one
//! level deeper. A docstring stays first.

use metap_ast::visitor::transform_stmt_children;
use metap_ast::{split_docstring, Module, Stmt, StmtKind, Transformer, WithItem};
use metap_core::runtime::names;
use metap_core::PassName;

use super::{rewrite_module, LogOptions};
use crate::build::{print_stmt, require_line, runtime_call};
use crate::error::{PassError, PassReport, PassResult};

const PASS: &str = PassName::LogFuncDefs.as_str();

struct FuncDefLogger<'a> {
    opts: &'a LogOptions,
    indent: bool,
    rewrites: usize,
}

impl FuncDefLogger<'_> {
    fn instrument(&self, body: Vec<Stmt>, tag: String, line: Option<u32>) -> Vec<Stmt> {
        let (doc, rest) = split_docstring(body);
        let mut out: Vec<Stmt> = doc.into_iter().collect();
        if self.indent {
            out.push(Stmt::expr(runtime_call(names::INDENT_PRINT, Vec::new(), line)));
            out.push(print_stmt(tag, line));
            out.push(Stmt::new(
                StmtKind::With {
                    items: vec![WithItem {
                        context: runtime_call(names::INDENT_CTX, Vec::new(), line),
                        target: None,
                    }],
                    body: rest,
                },
                line,
            ));
        } else {
            out.push(print_stmt(tag, line));
            out.extend(rest);
        }
        out
    }
}

impl Transformer for FuncDefLogger<'_> {
    type Error = PassError;

    fn transform_stmt(&mut self, stmt: Stmt) -> PassResult<Vec<Stmt>> {
        let stmt = transform_stmt_children(self, stmt)?;
        let StmtKind::FunctionDef(mut def) = stmt.kind else {
            return Ok(vec![stmt]);
        };
        let line = require_line(PASS, "FunctionDef", stmt.line)?;
        if self.opts.selects(line) {
            let tag = self.opts.tag("FuncDef", line).field("func", def.name.clone());
            let body = std::mem::take(&mut def.body);
            def.body = self.instrument(body, tag.to_string(), stmt.line);
            self.rewrites += 1;
        }
        Ok(vec![Stmt::new(StmtKind::FunctionDef(def), stmt.line)])
    }
}

/// Log entry to every selected function; `indent` selects the nesting variant.
pub fn log_func_defs(module: &mut Module, opts: &LogOptions, indent: bool) -> PassResult<PassReport> {
    let mut logger = FuncDefLogger {
        opts,
        indent,
        rewrites: 0,
    };
    rewrite_module(&mut logger, module)?;
    tracing::debug!(pass = PASS, rewrites = logger.rewrites, indent, "logged function entry");
    Ok(PassReport {
        rewrites: logger.rewrites,
        uses_runtime: indent && logger.rewrites > 0,
        advisories: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use metap_ast::{parse_module, render_module};

    const VISITOR: &str = "import ast\n\nclass RandomVisitor(ast.NodeVisitor):\n  def visit_Assign(self, asgn: ast.Assign):\n    for t in asgn.targets:\n      self.visit(t)\n    self.visit(asgn.value)\n\n  def visit_BinOp(self, binop: ast.BinOp):\n    self.visit(binop.left)\n";

    #[test]
    fn plain_entry_print() {
        let mut module = parse_module("def f(x):\n  return x\n").unwrap();
        let report = log_func_defs(&mut module, &LogOptions::default(), false).unwrap();
        assert!(!report.uses_runtime);
        assert_eq!(
            render_module(&module),
            "def f(x):\n  print('metap::FuncDef(ln=1,func=f)')\n  return x\n"
        );
    }

    #[test]
    fn docstring_stays_first() {
        let mut module = parse_module("def f():\n  \"\"\"Doc.\"\"\"\n  pass\n").unwrap();
        log_func_defs(&mut module, &LogOptions::default(), false).unwrap();
        assert_eq!(
            render_module(&module),
            "def f():\n  'Doc.'\n  print('metap::FuncDef(ln=1,func=f)')\n  pass\n"
        );
    }

    #[test]
    fn indented_methods() {
        let mut module = parse_module(VISITOR).unwrap();
        let report = log_func_defs(&mut module, &LogOptions::default(), true).unwrap();
        assert_eq!(report.rewrites, 2);
        assert!(report.uses_runtime);
        assert_eq!(
            render_module(&module),
            "import ast\n\n\nclass RandomVisitor(ast.NodeVisitor):\n  def visit_Assign(self, asgn: ast.Assign):\n    metap.indent_print()\n    print('metap::FuncDef(ln=4,func=visit_Assign)')\n    with metap.indent_ctx():\n      for t in asgn.targets:\n        self.visit(t)\n      self.visit(asgn.value)\n\n  def visit_BinOp(self, binop: ast.BinOp):\n    metap.indent_print()\n    print('metap::FuncDef(ln=9,func=visit_BinOp)')\n    with metap.indent_ctx():\n      self.visit(binop.left)\n"
        );
    }

    #[test]
    fn file_tag() {
        let mut module = parse_module("def g():\n  pass\n").unwrap();
        let opts = LogOptions::new(Default::default(), Some("prog.py".to_string()));
        log_func_defs(&mut module, &opts, false).unwrap();
        assert!(render_module(&module).contains("print('metap::prog.py::FuncDef(ln=1,func=g)')"));
    }
}
