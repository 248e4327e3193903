// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Conditional-variable desugaring.
//!
//! An `if` test may bind a variable as a side effect:
//!
//! ```text
//! if _cvar(line.startswith('# '), hlvl, 1) or _cvar(line.startswith('## '), hlvl, 2):
//!   x = hlvl
//! ```
//!
//! Each `_cvar` call becomes a runtime call that stores the value in the
//! shared relay under `'relay_<var>'` and returns the condition, so the
//! `and`/`or` structure of the test and its short-circuit order are kept.
//! Both branches then copy the relay slot into the variable:
//!
//! - `_cvar(cond, var, value)` stores `value` only when `cond` holds, so the
//!   copy is guarded by `'relay_var' in metap.relay`.
//! - `_cvar(cond, var)` always stores the condition, so the copy is plain.
//!
//! Branches are desugared before the test, so nested ifs and `elif` links
//! (an `If` inside `orelse`) are handled by the same step.

use metap_ast::visitor::{transform_body, transform_expr_children, transform_stmt_children};
use metap_ast::{Expr, ExprKind, If, Module, Stmt, StmtKind, Transformer};
use metap_core::runtime::names;
use metap_core::PassName;

use super::rewrite_module;
use crate::build::{relay_has, relay_read, require_line, runtime_attr, runtime_call};
use crate::error::{PassError, PassReport, PassResult};

const PASS: &str = PassName::Compile.as_str();

/// Name of the conditional-binding macro.
pub const CVAR_MACRO: &str = "_cvar";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    var: String,
    /// Bound only when its condition holds (`_cvar` with a value).
    guarded: bool,
}

/// Rewrites the `_cvar` calls of one test and records their targets.
struct TestRewriter {
    line: u32,
    bindings: Vec<Binding>,
}

impl TestRewriter {
    fn expand(&mut self, args: Vec<Expr>, has_keywords: bool, line: Option<u32>) -> PassResult<Expr> {
        let arity_error = || {
            PassError::structural(
                PASS,
                self.line,
                format!("{} takes 2 or 3 positional arguments", CVAR_MACRO),
            )
        };
        if has_keywords || args.len() > 3 {
            return Err(arity_error());
        }
        let mut args = args.into_iter();
        let (Some(cond), Some(target)) = (args.next(), args.next()) else {
            return Err(arity_error());
        };
        let value = args.next();
        let Some(var) = target.as_name().map(str::to_string) else {
            return Err(PassError::structural(
                PASS,
                self.line,
                format!("{} target must be an identifier", CVAR_MACRO),
            ));
        };

        let key = Expr::str(names::relay_key(&var), line);
        let relay = runtime_attr(names::RELAY, line);
        self.bindings.push(Binding {
            var,
            guarded: value.is_some(),
        });
        Ok(match value {
            Some(value) => runtime_call(names::CVAR, vec![cond, relay, key, value], line),
            None => runtime_call(names::CVAR_ALWAYS, vec![cond, relay, key], line),
        })
    }
}

impl Transformer for TestRewriter {
    type Error = PassError;

    fn transform_expr(&mut self, expr: Expr) -> PassResult<Expr> {
        let expr = transform_expr_children(self, expr)?;
        if expr.called_name() != Some(CVAR_MACRO) {
            return Ok(expr);
        }
        let line = expr.line;
        match expr.kind {
            ExprKind::Call { args, keywords, .. } => {
                self.expand(args, !keywords.is_empty(), line)
            }
            kind => Ok(Expr::new(kind, line)),
        }
    }
}

/// One copy statement per distinct variable, in first-appearance order. A
/// variable bound by any guarded form gets a guarded copy.
fn relay_copies(bindings: &[Binding], line: Option<u32>) -> Vec<Stmt> {
    let mut vars: Vec<Binding> = Vec::new();
    for binding in bindings {
        match vars.iter_mut().find(|b| b.var == binding.var) {
            Some(seen) => seen.guarded |= binding.guarded,
            None => vars.push(binding.clone()),
        }
    }
    vars.into_iter()
        .map(|b| {
            let copy = Stmt::assign(Expr::name(&b.var, line), relay_read(&b.var, line));
            if b.guarded {
                Stmt::if_(relay_has(&b.var, line), vec![copy], Vec::new())
            } else {
                copy
            }
        })
        .collect()
}

fn prepend(body: &mut Vec<Stmt>, prefix: &[Stmt]) {
    body.splice(0..0, prefix.iter().cloned());
}

struct CvarDesugarer {
    rewrites: usize,
}

impl CvarDesugarer {
    fn desugar_if(&mut self, mut node: If, line: Option<u32>) -> PassResult<If> {
        node.body = transform_body(self, std::mem::take(&mut node.body))?;
        node.orelse = transform_body(self, std::mem::take(&mut node.orelse))?;

        let ln = require_line(PASS, "If", line)?;
        let mut rewriter = TestRewriter {
            line: ln,
            bindings: Vec::new(),
        };
        let test = std::mem::replace(&mut node.test, Expr::none(line));
        node.test = rewriter.transform_expr(test)?;
        if rewriter.bindings.is_empty() {
            return Ok(node);
        }

        let copies = relay_copies(&rewriter.bindings, line);
        prepend(&mut node.body, &copies);
        if !node.orelse.is_empty() {
            prepend(&mut node.orelse, &copies);
        }
        self.rewrites += rewriter.bindings.len();
        tracing::debug!(line = ln, bindings = rewriter.bindings.len(), "desugared _cvar");
        Ok(node)
    }
}

impl Transformer for CvarDesugarer {
    type Error = PassError;

    fn transform_stmt(&mut self, stmt: Stmt) -> PassResult<Vec<Stmt>> {
        match stmt.kind {
            StmtKind::If(node) => {
                let node = self.desugar_if(*node, stmt.line)?;
                Ok(vec![Stmt::new(StmtKind::If(Box::new(node)), stmt.line)])
            }
            kind => Ok(vec![transform_stmt_children(self, Stmt::new(kind, stmt.line))?]),
        }
    }

    // Only `if` tests are rewritten; a `_cvar` anywhere else is left for the
    // hygiene check to report.
    fn transform_expr(&mut self, expr: Expr) -> PassResult<Expr> {
        Ok(expr)
    }
}

/// Desugar every `_cvar` form in `if` tests.
pub fn desugar_cvars(module: &mut Module) -> PassResult<PassReport> {
    let mut desugarer = CvarDesugarer { rewrites: 0 };
    rewrite_module(&mut desugarer, module)?;
    Ok(PassReport {
        rewrites: desugarer.rewrites,
        uses_runtime: desugarer.rewrites > 0,
        advisories: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use metap_ast::{parse_module, render_module};

    fn run(src: &str) -> String {
        let mut module = parse_module(src).unwrap();
        desugar_cvars(&mut module).unwrap();
        render_module(&module)
    }

    #[test]
    fn bind_if_true() {
        assert_eq!(
            run("line = '# test'\nif _cvar(line.startswith('# '), hlvl, 1):\n  x = hlvl\n"),
            "line = '# test'\n\
if metap._cvar(line.startswith('# '), metap.relay, 'relay_hlvl', 1):\n\
\x20 if 'relay_hlvl' in metap.relay:\n\
\x20   hlvl = metap.relay['relay_hlvl']\n\
\x20 x = hlvl\n"
        );
    }

    #[test]
    fn always_bind_is_unconditional() {
        assert_eq!(
            run("if _cvar(line.startswith('# '), c):\n  x = c\n"),
            "if metap._cvar_always(line.startswith('# '), metap.relay, 'relay_c'):\n  c = metap.relay['relay_c']\n  x = c\n"
        );
    }

    #[test]
    fn boolean_structure_is_preserved_and_copies_deduplicated() {
        let out = run(
            "if _cvar(a, hlvl, 1) or _cvar(b, hlvl, 2) and not _cvar(c, d):\n  pass\nelse:\n  pass\n",
        );
        assert_eq!(
            out,
            "if metap._cvar(a, metap.relay, 'relay_hlvl', 1) or metap._cvar(b, metap.relay, 'relay_hlvl', 2) and not metap._cvar_always(c, metap.relay, 'relay_d'):\n\
\x20 if 'relay_hlvl' in metap.relay:\n\
\x20   hlvl = metap.relay['relay_hlvl']\n\
\x20 d = metap.relay['relay_d']\n\
\x20 pass\n\
else:\n\
\x20 if 'relay_hlvl' in metap.relay:\n\
\x20   hlvl = metap.relay['relay_hlvl']\n\
\x20 d = metap.relay['relay_d']\n\
\x20 pass\n"
        );
    }

    #[test]
    fn elif_chain_is_desugared_innermost_too() {
        let out = run(
            "if _cvar(c1, v, 1):\n  y = v\nelif _cvar(c2, v, 2):\n  x = v\n",
        );
        assert_eq!(
            out,
            "if metap._cvar(c1, metap.relay, 'relay_v', 1):\n\
\x20 if 'relay_v' in metap.relay:\n\
\x20   v = metap.relay['relay_v']\n\
\x20 y = v\n\
else:\n\
\x20 if 'relay_v' in metap.relay:\n\
\x20   v = metap.relay['relay_v']\n\
\x20 if metap._cvar(c2, metap.relay, 'relay_v', 2):\n\
\x20   if 'relay_v' in metap.relay:\n\
\x20     v = metap.relay['relay_v']\n\
\x20   x = v\n"
        );
    }

    #[test]
    fn nested_binding_inside_branch() {
        let out = run(
            "if _cvar(a, hlvl, 1):\n  x = hlvl\n  if _cvar(b, start, 't'):\n    z = start\n",
        );
        assert!(
            out.contains("  if metap._cvar(b, metap.relay, 'relay_start', 't'):\n    if 'relay_start' in metap.relay:\n      start = metap.relay['relay_start']\n    z = start\n"),
            "{}",
            out
        );
        assert!(out.starts_with("if metap._cvar(a, metap.relay, 'relay_hlvl', 1):\n"), "{}", out);
    }

    #[test]
    fn cvar_inside_function_body() {
        let out = run("def foo():\n  if _cvar(ok(), v, 2):\n    return v\n");
        assert!(out.contains("    if 'relay_v' in metap.relay:\n      v = metap.relay['relay_v']\n    return v\n"), "{}", out);
    }

    #[test]
    fn ifs_without_cvar_are_untouched() {
        let mut module = parse_module("if a:\n  pass\n").unwrap();
        let report = desugar_cvars(&mut module).unwrap();
        assert_eq!(report.rewrites, 0);
        assert!(!report.uses_runtime);
    }

    #[test]
    fn wrong_arity_is_structural() {
        let mut module = parse_module("\nif _cvar(a):\n  pass\n").unwrap();
        let err = desugar_cvars(&mut module).unwrap_err();
        assert!(matches!(err, PassError::Structural { line: 2, .. }), "{:?}", err);
    }

    #[test]
    fn non_identifier_target_is_structural() {
        let mut module = parse_module("if _cvar(a, d['k'], 1):\n  pass\n").unwrap();
        let err = desugar_cvars(&mut module).unwrap_err();
        assert_eq!(err.to_string(), "compile: 1: _cvar target must be an identifier");
    }
}
