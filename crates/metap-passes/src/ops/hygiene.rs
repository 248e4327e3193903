// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Verify that no macro call survived `compile`.

use metap_ast::visitor::{walk_module, VisitResult, Visitor};
use metap_ast::{Expr, Module};

use crate::build::require_line;
use crate::error::{PassError, PassResult};

/// Macro names `compile` must have expanded.
pub const MACRO_NAMES: &[&str] = &[
    "_cvar",
    "_ret_ifnn",
    "_ret_ifn",
    "_ret_iff",
    "_ret_ift",
    "__ret_ifnn",
    "__ret_ifn",
    "_time_e",
];

#[derive(Default)]
struct LeftoverFinder {
    found: Option<(String, Option<u32>)>,
}

impl Visitor for LeftoverFinder {
    fn visit_expr(&mut self, node: &Expr) -> VisitResult {
        match node.called_name() {
            Some(name) if MACRO_NAMES.contains(&name) => {
                self.found = Some((name.to_string(), node.line));
                VisitResult::Stop
            }
            _ => VisitResult::Continue,
        }
    }
}

/// Fail on the first remaining macro call, in source order.
pub fn check_hygiene(module: &Module) -> PassResult<()> {
    let mut finder = LeftoverFinder::default();
    walk_module(&mut finder, module);
    match finder.found {
        Some((macro_name, line)) => Err(PassError::Hygiene {
            macro_name,
            line: require_line("compile", "Call", line)?,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metap_ast::{parse_module, Stmt};

    #[test]
    fn clean_module_passes() {
        let module = parse_module("x = cvar(a)\nif ok:\n  pass\n").unwrap();
        assert!(check_hygiene(&module).is_ok());
    }

    #[test]
    fn leftover_cvar_outside_if_test() {
        let module = parse_module("x = 1\nwhile _cvar(a, b):\n  pass\n").unwrap();
        assert_eq!(
            check_hygiene(&module).unwrap_err(),
            PassError::Hygiene {
                macro_name: "_cvar".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn leftover_without_a_line_is_structural() {
        let call = Expr::call(Expr::name("_time_e", None), vec![Expr::name("f", None)]);
        let module = Module {
            body: vec![Stmt::expr(call)],
        };
        assert!(matches!(
            check_hygiene(&module).unwrap_err(),
            PassError::MissingLine { pass: "compile", .. }
        ));
    }
}
