// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! `compile`: expand every macro the emitted program needs in order to run.

use metap_ast::Module;

use super::{check_hygiene, desugar_cvars, expand_ret_macros, expand_time_exec};
use crate::error::{PassReport, PassResult};

/// Expand return macros, `_time_e` and `_cvar`, then verify nothing is left.
pub fn compile(module: &mut Module) -> PassResult<PassReport> {
    let mut report = expand_ret_macros(module)?;
    report.merge(expand_time_exec(module)?);
    report.merge(desugar_cvars(module)?);
    check_hygiene(module)?;
    tracing::debug!(rewrites = report.rewrites, "compiled macros");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PassError;
    use metap_ast::{parse_module, render_module};

    #[test]
    fn all_macros_in_one_program() {
        let src = "def first(xs):\n  for x in xs:\n    _ret_ifnn(pick(x))\n\nif _cvar(ready(), n, 3):\n  t = _time_e(first(range(n)))\n";
        let mut module = parse_module(src).unwrap();
        let report = compile(&mut module).unwrap();
        assert_eq!(report.rewrites, 3);
        assert!(report.uses_runtime);
        assert_eq!(
            render_module(&module),
            "def first(xs):\n  for x in xs:\n    _metap_ret = pick(x)\n    if _metap_ret is not None:\n      return _metap_ret\n\n\nif metap._cvar(ready(), metap.relay, 'relay_n', 3):\n  if 'relay_n' in metap.relay:\n    n = metap.relay['relay_n']\n  t = metap.time_exec(lambda: first(range(n)))\n"
        );
    }

    #[test]
    fn ret_macros_alone_need_no_runtime() {
        let mut module = parse_module("def f():\n  _ret_ift(x)\n").unwrap();
        assert!(!compile(&mut module).unwrap().uses_runtime);
    }

    #[test]
    fn misplaced_macro_fails_hygiene() {
        let mut module = parse_module("def f():\n  return _ret_ifn(x)\n").unwrap();
        assert!(matches!(
            compile(&mut module),
            Err(PassError::Hygiene { line: 2, .. })
        ));
    }
}
