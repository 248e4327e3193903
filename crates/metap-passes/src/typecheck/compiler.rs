// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Annotation to runtime-check compiler.
//!
//! Supported annotations and their checks on `obj`:
//!
//! | annotation          | check                                               |
//! |---------------------|-----------------------------------------------------|
//! | `T` (name, dotted)  | `isinstance(obj, T)`                                |
//! | literal `c`         | `obj == c` (`obj is None` for `None`)               |
//! | `Optional[T]`       | `obj is None or <T>`                                |
//! | `Union[A, B]`       | `<A> or <B>`                                        |
//! | `Tuple[T1, ..., Tn]`| `isinstance(obj, tuple) and len(obj) == n and ...`  |
//! | `List[T]`           | `isinstance(obj, list) and all([<T> for ...])`      |
//!
//! `Tuple` needs n >= 2. The container test comes first so a value of the
//! wrong kind makes the check false instead of raising.
//!
//! Everything else is rejected with [`PassError::Unsupported`].

use metap_ast::{render_expr, BoolOp, CmpOp, Comprehension, Constant, Expr, ExprKind};
use metap_core::runtime::names;

use crate::error::{PassError, PassResult};

/// Names that are not nominal types and cannot be checked at run time.
const REJECTED_NAMES: &[&str] = &[
    "Any",
    "AnyStr",
    "NoReturn",
    "Never",
    "Self",
    "LiteralString",
    "TypeAlias",
    "TypeGuard",
    "ClassVar",
    "Final",
    "Optional",
    "Union",
];

/// Compile `annotation` into a boolean check on `obj`.
///
/// `line` is the line reported when the annotation is rejected.
pub fn compile_check(
    pass: &'static str,
    line: u32,
    obj: &Expr,
    annotation: &Expr,
) -> PassResult<Expr> {
    CheckCompiler { pass, line }.check(obj, annotation, 0)
}

struct CheckCompiler {
    pass: &'static str,
    line: u32,
}

impl CheckCompiler {
    fn unsupported(&self, annotation: impl Into<String>) -> PassError {
        PassError::Unsupported {
            pass: self.pass,
            line: self.line,
            annotation: annotation.into(),
        }
    }

    fn check(&self, obj: &Expr, annotation: &Expr, depth: usize) -> PassResult<Expr> {
        let line = obj.line;
        match &annotation.kind {
            ExprKind::Name(name) => {
                if REJECTED_NAMES.contains(&name.as_str()) {
                    return Err(self.unsupported(name.as_str()));
                }
                Ok(isinstance(obj, annotation))
            }
            ExprKind::Attribute { .. } if dotted_name(annotation).is_some() => {
                Ok(isinstance(obj, annotation))
            }
            ExprKind::Constant(Constant::None) => {
                Ok(Expr::compare(obj.clone(), CmpOp::Is, Expr::none(line)))
            }
            ExprKind::Constant(_) => Ok(Expr::compare(obj.clone(), CmpOp::Eq, annotation.clone())),
            ExprKind::Subscript { value, slice } => {
                let Some(head) = subscript_head(value) else {
                    return Err(self.unsupported(render_expr(annotation)));
                };
                let args: Vec<&Expr> = match &slice.kind {
                    ExprKind::Tuple(elts) => elts.iter().collect(),
                    _ => vec![slice.as_ref()],
                };
                self.parametrized(obj, head, &args, depth)
            }
            _ => Err(self.unsupported(render_expr(annotation))),
        }
    }

    fn parametrized(&self, obj: &Expr, head: &str, args: &[&Expr], depth: usize) -> PassResult<Expr> {
        let line = obj.line;
        match (head, args) {
            ("Optional", [inner]) => Ok(Expr::bool_op(
                BoolOp::Or,
                vec![
                    Expr::compare(obj.clone(), CmpOp::Is, Expr::none(line)),
                    self.check(obj, inner, depth)?,
                ],
            )),
            ("Union", [a, b]) => Ok(Expr::bool_op(
                BoolOp::Or,
                vec![self.check(obj, a, depth)?, self.check(obj, b, depth)?],
            )),
            ("Tuple", elts) if elts.len() >= 2 => {
                let len = Expr::call(Expr::name("len", line), vec![obj.clone()]);
                let mut conjuncts = vec![
                    isinstance(obj, &Expr::name("tuple", line)),
                    Expr::compare(len, CmpOp::Eq, Expr::int(elts.len(), line)),
                ];
                for (i, elt) in elts.iter().enumerate() {
                    if matches!(elt.kind, ExprKind::Constant(Constant::Ellipsis)) {
                        return Err(self.unsupported(head));
                    }
                    let item = Expr::subscript(obj.clone(), Expr::int(i, line));
                    conjuncts.push(self.check(&item, elt, depth)?);
                }
                Ok(Expr::bool_op(BoolOp::And, conjuncts))
            }
            ("List", [inner]) => {
                let el = Expr::name(element_name(depth), line);
                let elt = self.check(&el, inner, depth + 1)?;
                let comp = Expr::new(
                    ExprKind::ListComp {
                        elt: Box::new(elt),
                        generators: vec![Comprehension {
                            target: el,
                            iter: obj.clone(),
                            ifs: Vec::new(),
                        }],
                    },
                    line,
                );
                Ok(Expr::bool_op(
                    BoolOp::And,
                    vec![
                        isinstance(obj, &Expr::name("list", line)),
                        Expr::call(Expr::name("all", line), vec![comp]),
                    ],
                ))
            }
            _ => Err(self.unsupported(head)),
        }
    }
}

/// `isinstance(obj, T)`
fn isinstance(obj: &Expr, ty: &Expr) -> Expr {
    let line = obj.line;
    Expr::call(Expr::name("isinstance", line), vec![obj.clone(), ty.clone()])
}

/// `a.b.c` as text, if the expression is a plain dotted name.
fn dotted_name(expr: &Expr) -> Option<String> {
    match &expr.kind {
        ExprKind::Name(id) => Some(id.clone()),
        ExprKind::Attribute { value, attr } => Some(format!("{}.{}", dotted_name(value)?, attr)),
        _ => None,
    }
}

/// The constructor name of `Head[...]`; `typing.Head[...]` counts too.
fn subscript_head(value: &Expr) -> Option<&str> {
    match &value.kind {
        ExprKind::Name(id) => Some(id.as_str()),
        ExprKind::Attribute { attr, .. } if dotted_name(value).is_some() => Some(attr.as_str()),
        _ => None,
    }
}

fn element_name(depth: usize) -> String {
    if depth == 0 {
        format!("{}el", names::GENERATED_PREFIX)
    } else {
        format!("{}el{}", names::GENERATED_PREFIX, depth)
    }
}
