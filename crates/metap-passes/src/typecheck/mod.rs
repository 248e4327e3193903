// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! `dyn_typecheck`: runtime checks synthesized from annotations.
//!
//! Three kinds of annotation are checked:
//!
//! 1. `x: T = v` gets a guard after the assignment. A target that is not an
//!    identifier is left alone with an [`Advisory`].
//! 2. Annotated parameters of an eligible function get one guard each,
//!    prepended in declaration order. A function is eligible when it has no
//!    decorators, no `*args`/`**kwargs`, no positional-only parameters and
//!    no defaults; otherwise its signature is left unchecked.
//! 3. A return annotation moves the (parameter-checked) body into a nested
//!    helper `_metap_<name>`. The visible function calls it, checks the
//!    stored result and returns it, so every `return` of the original body
//!    is covered without rewriting any of them.
//!
//! A guard is:
//!
//! ```text
//! if not (<check>):
//!   print(x)
//!   print(type(x))
//!   assert False
//! ```

mod compiler;

pub use compiler::compile_check;

use metap_ast::visitor::transform_stmt_children;
use metap_ast::{
    prepend_to_body, split_docstring, Expr, ExprKind, FunctionDef, Keyword, Module, Param,
    Parameters, Stmt, StmtKind, Transformer,
};
use metap_core::runtime::names;
use metap_core::PassName;

use crate::build::{print_value, require_line};
use crate::error::{Advisory, PassError, PassReport, PassResult};
use crate::ops::rewrite_module;

const PASS: &str = PassName::DynTypecheck.as_str();

const NON_NAME_TARGET: &str =
    "Annotations in assignments are only supported if the target (LHS) is an identifier. Skipping...";

/// `if not (<check>): print(obj); print(type(obj)); assert False`
fn guard(check: Expr, obj: &Expr) -> Stmt {
    let line = obj.line;
    let kind_of = Expr::call(Expr::name("type", line), vec![obj.clone()]);
    let fail = Stmt::new(
        StmtKind::Assert {
            test: Expr::bool(false, line),
            msg: None,
        },
        line,
    );
    Stmt::if_(
        Expr::not(check),
        vec![print_value(obj.clone()), print_value(kind_of), fail],
        Vec::new(),
    )
}

fn is_eligible(def: &FunctionDef) -> bool {
    let params = &def.params;
    def.decorators.is_empty()
        && params.vararg.is_none()
        && params.kwarg.is_none()
        && params.posonly.is_empty()
        && !params.has_defaults()
}

fn bare_params(params: &[Param]) -> Vec<Param> {
    params.iter().map(|p| Param::new(p.name.clone())).collect()
}

/// The parameters of an eligible function, without annotations.
fn strip_annotations(params: &Parameters) -> Parameters {
    Parameters {
        posonly: Vec::new(),
        args: bare_params(&params.args),
        vararg: None,
        kwonly: bare_params(&params.kwonly),
        kwarg: None,
    }
}

/// `helper(a, b, k=k)` forwarding every parameter of an eligible function.
fn forward_call(helper: &str, params: &Parameters, line: Option<u32>) -> Expr {
    let args = params
        .args
        .iter()
        .map(|p| Expr::name(&p.name, line))
        .collect();
    let keywords = params
        .kwonly
        .iter()
        .map(|p| Keyword {
            arg: Some(p.name.clone()),
            value: Expr::name(&p.name, line),
        })
        .collect();
    Expr::new(
        ExprKind::Call {
            func: Box::new(Expr::name(helper, line)),
            args,
            keywords,
        },
        line,
    )
}

struct DynTypechecker {
    rewrites: usize,
    advisories: Vec<Advisory>,
}

impl DynTypechecker {
    fn check_ann_assign(
        &mut self,
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
        line: Option<u32>,
    ) -> PassResult<Vec<Stmt>> {
        let ln = require_line(PASS, "AnnAssign", line)?;
        let check = if target.as_name().is_some() {
            Some(compile_check(PASS, ln, &target, &annotation)?)
        } else {
            tracing::debug!(line = ln, "skipping annotated assignment to non-identifier");
            self.advisories.push(Advisory {
                pass: PASS,
                line: ln,
                message: NON_NAME_TARGET.to_string(),
            });
            None
        };

        let has_value = value.is_some();
        let assign = Stmt::new(
            StmtKind::AnnAssign {
                target: target.clone(),
                annotation,
                value,
            },
            line,
        );
        match check {
            // A bare declaration binds nothing to check.
            Some(check) if has_value => {
                self.rewrites += 1;
                Ok(vec![assign, guard(check, &target)])
            }
            _ => Ok(vec![assign]),
        }
    }

    fn check_function(&mut self, mut def: FunctionDef, line: Option<u32>) -> PassResult<FunctionDef> {
        if !is_eligible(&def) {
            return Ok(def);
        }
        let ln = require_line(PASS, "FunctionDef", line)?;

        let mut guards = Vec::new();
        for param in def.params.args.iter().chain(&def.params.kwonly) {
            if let Some(annotation) = &param.annotation {
                let obj = Expr::name(&param.name, line);
                let check = compile_check(PASS, ln, &obj, annotation)?;
                guards.push(guard(check, &obj));
            }
        }
        self.rewrites += guards.len();

        let Some(returns) = &def.returns else {
            def.body = prepend_to_body(std::mem::take(&mut def.body), guards);
            return Ok(def);
        };

        let result = Expr::name(format!("{}ret", names::GENERATED_PREFIX), line);
        let ret_check = compile_check(PASS, ln, &result, returns)?;
        let helper_name = format!("{}{}", names::GENERATED_PREFIX, def.name);

        let (doc, rest) = split_docstring(std::mem::take(&mut def.body));
        let mut helper_body = guards;
        helper_body.extend(rest);
        if helper_body.is_empty() {
            helper_body.push(Stmt::new(StmtKind::Pass, line));
        }
        let helper = FunctionDef {
            name: helper_name.clone(),
            params: strip_annotations(&def.params),
            body: helper_body,
            decorators: Vec::new(),
            returns: None,
        };

        let mut body: Vec<Stmt> = doc.into_iter().collect();
        body.push(Stmt::new(StmtKind::FunctionDef(Box::new(helper)), line));
        body.push(Stmt::assign(
            result.clone(),
            forward_call(&helper_name, &def.params, line),
        ));
        body.push(guard(ret_check, &result));
        body.push(Stmt::ret(Some(result), line));
        def.body = body;
        self.rewrites += 1;
        tracing::debug!(line = ln, func = %def.name, "wrapped function for return check");
        Ok(def)
    }
}

impl Transformer for DynTypechecker {
    type Error = PassError;

    fn transform_stmt(&mut self, stmt: Stmt) -> PassResult<Vec<Stmt>> {
        let stmt = transform_stmt_children(self, stmt)?;
        match stmt.kind {
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
            } => self.check_ann_assign(target, annotation, value, stmt.line),
            StmtKind::FunctionDef(def) => {
                let def = self.check_function(*def, stmt.line)?;
                Ok(vec![Stmt::new(StmtKind::FunctionDef(Box::new(def)), stmt.line)])
            }
            kind => Ok(vec![Stmt::new(kind, stmt.line)]),
        }
    }
}

/// Insert runtime checks for annotated assignments, parameters and returns.
pub fn dyn_typecheck(module: &mut Module) -> PassResult<PassReport> {
    let mut checker = DynTypechecker {
        rewrites: 0,
        advisories: Vec::new(),
    };
    rewrite_module(&mut checker, module)?;
    Ok(PassReport {
        rewrites: checker.rewrites,
        uses_runtime: false,
        advisories: checker.advisories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use metap_ast::{parse_module, render_module};

    fn run(src: &str) -> PassResult<(String, PassReport)> {
        let mut module = parse_module(src).unwrap();
        let report = dyn_typecheck(&mut module)?;
        Ok((render_module(&module), report))
    }

    #[test]
    fn annotated_assignment() {
        let (out, report) = run("x: Optional[int] = f()\n").unwrap();
        assert_eq!(report.rewrites, 1);
        assert_eq!(
            out,
            "x: Optional[int] = f()\nif not (x is None or isinstance(x, int)):\n  print(x)\n  print(type(x))\n  assert False\n"
        );
    }

    #[test]
    fn container_checks_reject_wrong_kinds_without_raising() {
        let (out, _) = run("p: Optional[Tuple[str, int]] = None\nq: List[int] = 5\n").unwrap();
        assert!(
            out.contains("if not (p is None or isinstance(p, tuple) and len(p) == 2 and "),
            "{}",
            out
        );
        assert!(
            out.contains("if not (isinstance(q, list) and all([isinstance(_metap_el, int) for _metap_el in q])):"),
            "{}",
            out
        );
    }

    #[test]
    fn declaration_without_value_is_not_checked() {
        let (out, report) = run("x: int\n").unwrap();
        assert_eq!(report.rewrites, 0);
        assert_eq!(out, "x: int\n");
    }

    #[test]
    fn non_name_target_is_an_advisory() {
        let (out, report) = run("\nd['test']: int = 2\n").unwrap();
        assert_eq!(out, "d['test']: int = 2\n");
        assert_eq!(report.advisories.len(), 1);
        assert_eq!(
            report.advisories[0].to_string(),
            "dyn_typecheck: 2: Annotations in assignments are only supported if the target (LHS) is an identifier. Skipping..."
        );
    }

    #[test]
    fn parameters_are_guarded_in_order() {
        let (out, _) = run("def f(a: int, b, *, c: str):\n  \"\"\"Doc.\"\"\"\n  return a\n").unwrap();
        assert_eq!(
            out,
            "def f(a: int, b, *, c: str):\n  'Doc.'\n  if not isinstance(a, int):\n    print(a)\n    print(type(a))\n    assert False\n  if not isinstance(c, str):\n    print(c)\n    print(type(c))\n    assert False\n  return a\n"
        );
    }

    #[test]
    fn return_check_wraps_body() {
        let (out, report) = run("def f(x: int) -> int:\n  return x\n").unwrap();
        assert_eq!(report.rewrites, 2);
        assert_eq!(
            out,
            "def f(x: int) -> int:\n\
\x20 def _metap_f(x):\n\
\x20   if not isinstance(x, int):\n\
\x20     print(x)\n\
\x20     print(type(x))\n\
\x20     assert False\n\
\x20   return x\n\
\x20 _metap_ret = _metap_f(x)\n\
\x20 if not isinstance(_metap_ret, int):\n\
\x20   print(_metap_ret)\n\
\x20   print(type(_metap_ret))\n\
\x20   assert False\n\
\x20 return _metap_ret\n"
        );
    }

    #[test]
    fn keyword_only_parameters_are_forwarded_by_name() {
        let (out, _) = run("def f(a, *, k) -> bool:\n  return a == k\n").unwrap();
        assert!(out.contains("  _metap_ret = _metap_f(a, k=k)\n"), "{}", out);
    }

    #[test]
    fn ineligible_functions_are_untouched() {
        for src in [
            "def f(x: int = 1) -> int:\n  return x\n",
            "def f(*args: int) -> int:\n  return 1\n",
            "def f(x: int, /) -> int:\n  return x\n",
            "@cache\ndef f(x: int) -> int:\n  return x\n",
        ] {
            let (out, report) = run(src).unwrap();
            assert_eq!(out, render_module(&parse_module(src).unwrap()));
            assert_eq!(report.rewrites, 0, "{}", src);
        }
    }

    #[test]
    fn checks_inside_ineligible_function_bodies_still_apply() {
        let (out, _) = run("def f(x=1):\n  y: int = x\n  return y\n").unwrap();
        assert!(out.contains("  if not isinstance(y, int):\n"), "{}", out);
    }

    #[test]
    fn unsupported_annotations_fail_with_line() {
        let cases = [
            ("\ns: AnyStr = 2\n", "dyn_typecheck: 2: AnyStr annotation is not supported."),
            (
                "\ndef stop() -> NoReturn:\n  raise RuntimeError('no way')\n",
                "dyn_typecheck: 2: NoReturn annotation is not supported.",
            ),
            (
                "\ndef stop(alias: TypeAlias):\n  pass\n",
                "dyn_typecheck: 2: TypeAlias annotation is not supported.",
            ),
            (
                "\ndef stop(alias: Literal[True]):\n  pass\n",
                "dyn_typecheck: 2: Literal annotation is not supported.",
            ),
            (
                "\ndef stop(alias: Concatenate[P, K]):\n  pass\n",
                "dyn_typecheck: 2: Concatenate annotation is not supported.",
            ),
            (
                "\na: foo()[other] = 2\n",
                "dyn_typecheck: 2: foo()[other] annotation is not supported.",
            ),
        ];
        for (src, message) in cases {
            let err = run(src).unwrap_err();
            assert!(matches!(err, PassError::Unsupported { .. }));
            assert_eq!(err.to_string(), message);
        }
    }
}
