// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Builders for synthetic nodes shared by the passes.
//!
//! Synthetic nodes take the line of the construct they replace.

use metap_ast::{CmpOp, Expr, Stmt};
use metap_core::runtime::names;

use crate::error::{PassError, PassResult};

/// The line of a node a pass inspects; its absence is a malformed tree.
pub fn require_line(pass: &'static str, node: &'static str, line: Option<u32>) -> PassResult<u32> {
    line.ok_or(PassError::MissingLine { pass, node })
}

/// `metap.<attr>`
pub fn runtime_attr(attr: &str, line: Option<u32>) -> Expr {
    Expr::attribute(Expr::name(names::MODULE, line), attr)
}

/// `metap.<helper>(args...)`
pub fn runtime_call(helper: &str, args: Vec<Expr>, line: Option<u32>) -> Expr {
    Expr::call(runtime_attr(helper, line), args)
}

/// True for a call of the form `metap.<helper>(...)`.
pub fn is_runtime_call(expr: &Expr) -> bool {
    use metap_ast::ExprKind;
    match &expr.kind {
        ExprKind::Call { func, .. } => matches!(
            &func.kind,
            ExprKind::Attribute { value, .. } if value.as_name() == Some(names::MODULE)
        ),
        _ => false,
    }
}

/// `print('<text>')`
pub fn print_stmt(text: impl Into<String>, line: Option<u32>) -> Stmt {
    Stmt::expr(Expr::call(
        Expr::name("print", line),
        vec![Expr::str(text, line)],
    ))
}

/// `print(<value>)`
pub fn print_value(value: Expr) -> Stmt {
    let line = value.line;
    Stmt::expr(Expr::call(Expr::name("print", line), vec![value]))
}

/// `metap.relay['relay_<var>']`
pub fn relay_read(var: &str, line: Option<u32>) -> Expr {
    Expr::subscript(
        runtime_attr(names::RELAY, line),
        Expr::str(names::relay_key(var), line),
    )
}

/// `'relay_<var>' in metap.relay`
pub fn relay_has(var: &str, line: Option<u32>) -> Expr {
    Expr::compare(
        Expr::str(names::relay_key(var), line),
        CmpOp::In,
        runtime_attr(names::RELAY, line),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use metap_ast::{parse_expression, render_expr};

    #[test]
    fn relay_expressions() {
        assert_eq!(render_expr(&relay_read("v", Some(1))), "metap.relay['relay_v']");
        assert_eq!(render_expr(&relay_has("v", Some(1))), "'relay_v' in metap.relay");
    }

    #[test]
    fn recognizes_runtime_calls() {
        assert!(is_runtime_call(&parse_expression("metap.log_ret(x, 'l')").unwrap()));
        assert!(!is_runtime_call(&parse_expression("other.log_ret(x)").unwrap()));
        assert!(!is_runtime_call(&parse_expression("metap").unwrap()));
    }

    #[test]
    fn missing_line() {
        let err = require_line("log_returns", "Return", None).unwrap_err();
        assert_eq!(err.to_string(), "log_returns: Return node has no line number");
    }
}
