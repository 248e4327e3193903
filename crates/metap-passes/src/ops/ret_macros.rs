// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Conditional-return statement macros.
//!
//! | macro          | expansion                                                        |
//! |----------------|------------------------------------------------------------------|
//! | `_ret_ifnn(e)` | `_metap_ret = e` / `if _metap_ret is not None: return _metap_ret` |
//! | `_ret_ifn(e)`  | `_metap_ret = e` / `if _metap_ret is None: return None`           |
//! | `_ret_iff(e)`  | `if e == False: return False`                                     |
//! | `_ret_ift(e)`  | `if e == True: return True`                                       |
//!
//! The double-underscore spellings `__ret_ifnn` and `__ret_ifn` are accepted
//! as aliases.

use metap_ast::visitor::transform_stmt_children;
use metap_ast::{CmpOp, Expr, ExprKind, Module, Stmt, StmtKind, Transformer};
use metap_core::runtime::names;
use metap_core::PassName;

use super::rewrite_module;
use crate::build::require_line;
use crate::error::{PassError, PassReport, PassResult};

const PASS: &str = PassName::Compile.as_str();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetMacro {
    IfNotNone,
    IfNone,
    IfFalse,
    IfTrue,
}

impl RetMacro {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "_ret_ifnn" | "__ret_ifnn" => Some(RetMacro::IfNotNone),
            "_ret_ifn" | "__ret_ifn" => Some(RetMacro::IfNone),
            "_ret_iff" => Some(RetMacro::IfFalse),
            "_ret_ift" => Some(RetMacro::IfTrue),
            _ => None,
        }
    }

    fn expand(self, value: Expr, line: Option<u32>) -> Vec<Stmt> {
        let tmp = || Expr::name(format!("{}ret", names::GENERATED_PREFIX), line);
        let store = |value| Stmt::assign(tmp(), value);
        let guard = |test, ret| vec![Stmt::if_(test, vec![Stmt::ret(Some(ret), line)], Vec::new())];
        match self {
            RetMacro::IfNotNone => {
                let mut out = vec![store(value)];
                out.extend(guard(
                    Expr::compare(tmp(), CmpOp::IsNot, Expr::none(line)),
                    tmp(),
                ));
                out
            }
            RetMacro::IfNone => {
                let mut out = vec![store(value)];
                out.extend(guard(
                    Expr::compare(tmp(), CmpOp::Is, Expr::none(line)),
                    Expr::none(line),
                ));
                out
            }
            RetMacro::IfFalse => guard(
                Expr::compare(value, CmpOp::Eq, Expr::bool(false, line)),
                Expr::bool(false, line),
            ),
            RetMacro::IfTrue => guard(
                Expr::compare(value, CmpOp::Eq, Expr::bool(true, line)),
                Expr::bool(true, line),
            ),
        }
    }
}

struct RetMacroExpander {
    rewrites: usize,
}

impl Transformer for RetMacroExpander {
    type Error = PassError;

    fn transform_stmt(&mut self, stmt: Stmt) -> PassResult<Vec<Stmt>> {
        let stmt = transform_stmt_children(self, stmt)?;
        let Some(mac) = macro_of(&stmt) else {
            return Ok(vec![stmt]);
        };
        let line = require_line(PASS, "Call", stmt.line)?;
        let StmtKind::Expr(Expr {
            kind: ExprKind::Call { mut args, keywords, .. },
            ..
        }) = stmt.kind
        else {
            return Ok(vec![stmt]);
        };
        let single = args.len() == 1 && !matches!(args[0].kind, ExprKind::Starred(_));
        if !single || !keywords.is_empty() {
            return Err(PassError::structural(
                PASS,
                line,
                "return macros take exactly one positional argument",
            ));
        }
        self.rewrites += 1;
        Ok(mac.expand(args.remove(0), stmt.line))
    }
}

fn macro_of(stmt: &Stmt) -> Option<RetMacro> {
    match &stmt.kind {
        StmtKind::Expr(value) => value.called_name().and_then(RetMacro::from_name),
        _ => None,
    }
}

/// Expand every return macro statement.
pub fn expand_ret_macros(module: &mut Module) -> PassResult<PassReport> {
    let mut expander = RetMacroExpander { rewrites: 0 };
    rewrite_module(&mut expander, module)?;
    Ok(PassReport {
        rewrites: expander.rewrites,
        ..Default::default()
    })
}
