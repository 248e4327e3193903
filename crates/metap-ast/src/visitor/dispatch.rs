// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Walk functions for tree traversal and transformation.
//!
//! Visitor walks are pre-order for `visit_*` and post-order for `leave_*`;
//! children are visited in source order.
//!
//! # Control Flow
//!
//! - `VisitResult::Continue` - traverse into children
//! - `VisitResult::SkipChildren` - skip children but still call `leave_*`
//! - `VisitResult::Stop` - halt traversal immediately (no `leave_*` called)

use super::traits::{Transformer, VisitResult, Visitor};
use crate::nodes::{Comprehension, Expr, ExprKind, Module, Parameters, Stmt, StmtKind};

macro_rules! walk_or_stop {
    ($walk:expr) => {
        if $walk == VisitResult::Stop {
            return VisitResult::Stop;
        }
    };
}

// ============================================================================
// Visitor walks
// ============================================================================

/// Walk a [`Module`] and every statement in it.
pub fn walk_module<V: Visitor + ?Sized>(visitor: &mut V, node: &Module) -> VisitResult {
    match visitor.visit_module(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => walk_or_stop!(walk_body(visitor, &node.body)),
    }
    visitor.leave_module(node);
    VisitResult::Continue
}

/// Walk a statement sequence in order.
pub fn walk_body<V: Visitor + ?Sized>(visitor: &mut V, body: &[Stmt]) -> VisitResult {
    for stmt in body {
        walk_or_stop!(walk_stmt(visitor, stmt));
    }
    VisitResult::Continue
}

fn walk_params<V: Visitor + ?Sized>(visitor: &mut V, params: &Parameters) -> VisitResult {
    for param in params.iter() {
        if let Some(annotation) = &param.annotation {
            walk_or_stop!(walk_expr(visitor, annotation));
        }
        if let Some(default) = &param.default {
            walk_or_stop!(walk_expr(visitor, default));
        }
    }
    VisitResult::Continue
}

fn walk_exprs<'e, V: Visitor + ?Sized>(
    visitor: &mut V,
    exprs: impl IntoIterator<Item = &'e Expr>,
) -> VisitResult {
    for expr in exprs {
        walk_or_stop!(walk_expr(visitor, expr));
    }
    VisitResult::Continue
}

/// Walk a statement: its expressions first, then any nested bodies.
pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, node: &Stmt) -> VisitResult {
    match visitor.visit_stmt(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {
            visitor.leave_stmt(node);
            return VisitResult::Continue;
        }
        VisitResult::Continue => {}
    }
    match &node.kind {
        StmtKind::FunctionDef(def) => {
            walk_or_stop!(walk_exprs(visitor, &def.decorators));
            walk_or_stop!(walk_params(visitor, &def.params));
            walk_or_stop!(walk_exprs(visitor, &def.returns));
            walk_or_stop!(walk_body(visitor, &def.body));
        }
        StmtKind::ClassDef(class) => {
            walk_or_stop!(walk_exprs(visitor, &class.decorators));
            walk_or_stop!(walk_exprs(visitor, &class.bases));
            walk_or_stop!(walk_exprs(visitor, class.keywords.iter().map(|k| &k.value)));
            walk_or_stop!(walk_body(visitor, &class.body));
        }
        StmtKind::Return(value) => walk_or_stop!(walk_exprs(visitor, value)),
        StmtKind::Delete(targets) => walk_or_stop!(walk_exprs(visitor, targets)),
        StmtKind::Assign { targets, value } => {
            walk_or_stop!(walk_exprs(visitor, targets));
            walk_or_stop!(walk_expr(visitor, value));
        }
        StmtKind::AugAssign { target, value, .. } => {
            walk_or_stop!(walk_expr(visitor, target));
            walk_or_stop!(walk_expr(visitor, value));
        }
        StmtKind::AnnAssign {
            target,
            annotation,
            value,
        } => {
            walk_or_stop!(walk_expr(visitor, target));
            walk_or_stop!(walk_expr(visitor, annotation));
            walk_or_stop!(walk_exprs(visitor, value));
        }
        StmtKind::For {
            target,
            iter,
            body,
            orelse,
        } => {
            walk_or_stop!(walk_expr(visitor, target));
            walk_or_stop!(walk_expr(visitor, iter));
            walk_or_stop!(walk_body(visitor, body));
            walk_or_stop!(walk_body(visitor, orelse));
        }
        StmtKind::While { test, body, orelse } => {
            walk_or_stop!(walk_expr(visitor, test));
            walk_or_stop!(walk_body(visitor, body));
            walk_or_stop!(walk_body(visitor, orelse));
        }
        StmtKind::If(node) => {
            walk_or_stop!(walk_expr(visitor, &node.test));
            walk_or_stop!(walk_body(visitor, &node.body));
            walk_or_stop!(walk_body(visitor, &node.orelse));
        }
        StmtKind::With { items, body } => {
            for item in items {
                walk_or_stop!(walk_expr(visitor, &item.context));
                walk_or_stop!(walk_exprs(visitor, &item.target));
            }
            walk_or_stop!(walk_body(visitor, body));
        }
        StmtKind::Raise { exc, cause } => {
            walk_or_stop!(walk_exprs(visitor, exc));
            walk_or_stop!(walk_exprs(visitor, cause));
        }
        StmtKind::Try {
            body,
            handlers,
            orelse,
            finalbody,
        } => {
            walk_or_stop!(walk_body(visitor, body));
            for handler in handlers {
                walk_or_stop!(walk_exprs(visitor, &handler.kind));
                walk_or_stop!(walk_body(visitor, &handler.body));
            }
            walk_or_stop!(walk_body(visitor, orelse));
            walk_or_stop!(walk_body(visitor, finalbody));
        }
        StmtKind::Assert { test, msg } => {
            walk_or_stop!(walk_expr(visitor, test));
            walk_or_stop!(walk_exprs(visitor, msg));
        }
        StmtKind::Expr(value) => walk_or_stop!(walk_expr(visitor, value)),
        StmtKind::Import(_)
        | StmtKind::ImportFrom { .. }
        | StmtKind::Global(_)
        | StmtKind::Nonlocal(_)
        | StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue => {}
    }
    visitor.leave_stmt(node);
    VisitResult::Continue
}

fn walk_generators<V: Visitor + ?Sized>(
    visitor: &mut V,
    generators: &[Comprehension],
) -> VisitResult {
    for comp in generators {
        walk_or_stop!(walk_expr(visitor, &comp.target));
        walk_or_stop!(walk_expr(visitor, &comp.iter));
        walk_or_stop!(walk_exprs(visitor, &comp.ifs));
    }
    VisitResult::Continue
}

/// Walk an expression and its subexpressions.
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, node: &Expr) -> VisitResult {
    match visitor.visit_expr(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {
            visitor.leave_expr(node);
            return VisitResult::Continue;
        }
        VisitResult::Continue => {}
    }
    match &node.kind {
        ExprKind::Name(_) | ExprKind::Constant(_) | ExprKind::Verbatim(_) => {}
        ExprKind::Attribute { value, .. } => walk_or_stop!(walk_expr(visitor, value)),
        ExprKind::Subscript { value, slice } => {
            walk_or_stop!(walk_expr(visitor, value));
            walk_or_stop!(walk_expr(visitor, slice));
        }
        ExprKind::Slice { lower, upper, step } => {
            for part in [lower, upper, step].into_iter().flatten() {
                walk_or_stop!(walk_expr(visitor, part));
            }
        }
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            walk_or_stop!(walk_expr(visitor, func));
            walk_or_stop!(walk_exprs(visitor, args));
            walk_or_stop!(walk_exprs(visitor, keywords.iter().map(|k| &k.value)));
        }
        ExprKind::BinOp { left, right, .. } => {
            walk_or_stop!(walk_expr(visitor, left));
            walk_or_stop!(walk_expr(visitor, right));
        }
        ExprKind::UnaryOp { operand, .. } => walk_or_stop!(walk_expr(visitor, operand)),
        ExprKind::BoolOp { values, .. } => walk_or_stop!(walk_exprs(visitor, values)),
        ExprKind::Compare {
            left, comparators, ..
        } => {
            walk_or_stop!(walk_expr(visitor, left));
            walk_or_stop!(walk_exprs(visitor, comparators));
        }
        ExprKind::IfExp { test, body, orelse } => {
            walk_or_stop!(walk_expr(visitor, body));
            walk_or_stop!(walk_expr(visitor, test));
            walk_or_stop!(walk_expr(visitor, orelse));
        }
        ExprKind::Lambda { params, body } => {
            walk_or_stop!(walk_params(visitor, params));
            walk_or_stop!(walk_expr(visitor, body));
        }
        ExprKind::NamedExpr { target, value } => {
            walk_or_stop!(walk_expr(visitor, target));
            walk_or_stop!(walk_expr(visitor, value));
        }
        ExprKind::Tuple(elts) | ExprKind::List(elts) | ExprKind::Set(elts) => {
            walk_or_stop!(walk_exprs(visitor, elts));
        }
        ExprKind::Dict { keys, values } => {
            for (key, value) in keys.iter().zip(values) {
                walk_or_stop!(walk_exprs(visitor, key));
                walk_or_stop!(walk_expr(visitor, value));
            }
        }
        ExprKind::ListComp { elt, generators }
        | ExprKind::SetComp { elt, generators }
        | ExprKind::GeneratorExp { elt, generators } => {
            walk_or_stop!(walk_expr(visitor, elt));
            walk_or_stop!(walk_generators(visitor, generators));
        }
        ExprKind::DictComp {
            key,
            value,
            generators,
        } => {
            walk_or_stop!(walk_expr(visitor, key));
            walk_or_stop!(walk_expr(visitor, value));
            walk_or_stop!(walk_generators(visitor, generators));
        }
        ExprKind::Starred(value) | ExprKind::YieldFrom(value) => {
            walk_or_stop!(walk_expr(visitor, value));
        }
        ExprKind::Yield(value) => {
            if let Some(value) = value {
                walk_or_stop!(walk_expr(visitor, value));
            }
        }
    }
    visitor.leave_expr(node);
    VisitResult::Continue
}

// ============================================================================
// Transformer walks
// ============================================================================

/// Transform every top-level statement of a module.
pub fn transform_module<T: Transformer + ?Sized>(
    transformer: &mut T,
    module: Module,
) -> Result<Module, T::Error> {
    Ok(Module {
        body: transform_body(transformer, module.body)?,
    })
}

/// Transform a statement sequence, splicing each replacement in place.
pub fn transform_body<T: Transformer + ?Sized>(
    transformer: &mut T,
    body: Vec<Stmt>,
) -> Result<Vec<Stmt>, T::Error> {
    let mut out = Vec::with_capacity(body.len());
    for stmt in body {
        out.extend(transformer.transform_stmt(stmt)?);
    }
    Ok(out)
}

fn transform_opt<T: Transformer + ?Sized>(
    transformer: &mut T,
    expr: Option<Expr>,
) -> Result<Option<Expr>, T::Error> {
    expr.map(|e| transformer.transform_expr(e)).transpose()
}

fn transform_boxed<T: Transformer + ?Sized>(
    transformer: &mut T,
    expr: Box<Expr>,
) -> Result<Box<Expr>, T::Error> {
    Ok(Box::new(transformer.transform_expr(*expr)?))
}

fn transform_all<T: Transformer + ?Sized>(
    transformer: &mut T,
    exprs: Vec<Expr>,
) -> Result<Vec<Expr>, T::Error> {
    exprs
        .into_iter()
        .map(|e| transformer.transform_expr(e))
        .collect()
}

fn transform_params<T: Transformer + ?Sized>(
    transformer: &mut T,
    mut params: Parameters,
) -> Result<Parameters, T::Error> {
    let Parameters {
        posonly,
        args,
        vararg,
        kwonly,
        kwarg,
    } = &mut params;
    let all = posonly
        .iter_mut()
        .chain(args.iter_mut())
        .chain(vararg.iter_mut())
        .chain(kwonly.iter_mut())
        .chain(kwarg.iter_mut());
    for param in all {
        param.annotation = transform_opt(transformer, param.annotation.take())?;
        param.default = transform_opt(transformer, param.default.take())?;
    }
    Ok(params)
}

fn transform_generators<T: Transformer + ?Sized>(
    transformer: &mut T,
    generators: Vec<Comprehension>,
) -> Result<Vec<Comprehension>, T::Error> {
    generators
        .into_iter()
        .map(|comp| -> Result<Comprehension, T::Error> {
            Ok(Comprehension {
                target: transformer.transform_expr(comp.target)?,
                iter: transformer.transform_expr(comp.iter)?,
                ifs: transform_all(transformer, comp.ifs)?,
            })
        })
        .collect()
}

/// Rebuild a statement with its expressions and nested bodies transformed.
pub fn transform_stmt_children<T: Transformer + ?Sized>(
    transformer: &mut T,
    stmt: Stmt,
) -> Result<Stmt, T::Error> {
    let t = transformer;
    let kind = match stmt.kind {
        StmtKind::FunctionDef(mut def) => {
            def.decorators = transform_all(t, std::mem::take(&mut def.decorators))?;
            def.params = transform_params(t, std::mem::take(&mut def.params))?;
            def.returns = transform_opt(t, def.returns.take())?;
            def.body = transform_body(t, std::mem::take(&mut def.body))?;
            StmtKind::FunctionDef(def)
        }
        StmtKind::ClassDef(mut class) => {
            class.decorators = transform_all(t, std::mem::take(&mut class.decorators))?;
            class.bases = transform_all(t, std::mem::take(&mut class.bases))?;
            for kw in &mut class.keywords {
                let value = std::mem::replace(&mut kw.value, Expr::none(None));
                kw.value = t.transform_expr(value)?;
            }
            class.body = transform_body(t, std::mem::take(&mut class.body))?;
            StmtKind::ClassDef(class)
        }
        StmtKind::Return(value) => StmtKind::Return(transform_opt(t, value)?),
        StmtKind::Delete(targets) => StmtKind::Delete(transform_all(t, targets)?),
        StmtKind::Assign { targets, value } => StmtKind::Assign {
            targets: transform_all(t, targets)?,
            value: t.transform_expr(value)?,
        },
        StmtKind::AugAssign { target, op, value } => StmtKind::AugAssign {
            target: t.transform_expr(target)?,
            op,
            value: t.transform_expr(value)?,
        },
        StmtKind::AnnAssign {
            target,
            annotation,
            value,
        } => StmtKind::AnnAssign {
            target: t.transform_expr(target)?,
            annotation: t.transform_expr(annotation)?,
            value: transform_opt(t, value)?,
        },
        StmtKind::For {
            target,
            iter,
            body,
            orelse,
        } => StmtKind::For {
            target: t.transform_expr(target)?,
            iter: t.transform_expr(iter)?,
            body: transform_body(t, body)?,
            orelse: transform_body(t, orelse)?,
        },
        StmtKind::While { test, body, orelse } => StmtKind::While {
            test: t.transform_expr(test)?,
            body: transform_body(t, body)?,
            orelse: transform_body(t, orelse)?,
        },
        StmtKind::If(mut node) => {
            node.test = t.transform_expr(std::mem::replace(&mut node.test, Expr::none(None)))?;
            node.body = transform_body(t, std::mem::take(&mut node.body))?;
            node.orelse = transform_body(t, std::mem::take(&mut node.orelse))?;
            StmtKind::If(node)
        }
        StmtKind::With { items, body } => {
            let mut out = Vec::with_capacity(items.len());
            for mut item in items {
                item.context = t.transform_expr(item.context)?;
                item.target = transform_opt(t, item.target)?;
                out.push(item);
            }
            StmtKind::With {
                items: out,
                body: transform_body(t, body)?,
            }
        }
        StmtKind::Raise { exc, cause } => StmtKind::Raise {
            exc: transform_opt(t, exc)?,
            cause: transform_opt(t, cause)?,
        },
        StmtKind::Try {
            body,
            handlers,
            orelse,
            finalbody,
        } => {
            let body = transform_body(t, body)?;
            let mut out = Vec::with_capacity(handlers.len());
            for mut handler in handlers {
                handler.kind = transform_opt(t, handler.kind)?;
                handler.body = transform_body(t, handler.body)?;
                out.push(handler);
            }
            StmtKind::Try {
                body,
                handlers: out,
                orelse: transform_body(t, orelse)?,
                finalbody: transform_body(t, finalbody)?,
            }
        }
        StmtKind::Assert { test, msg } => StmtKind::Assert {
            test: t.transform_expr(test)?,
            msg: transform_opt(t, msg)?,
        },
        StmtKind::Expr(value) => StmtKind::Expr(t.transform_expr(value)?),
        other @ (StmtKind::Import(_)
        | StmtKind::ImportFrom { .. }
        | StmtKind::Global(_)
        | StmtKind::Nonlocal(_)
        | StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue) => other,
    };
    Ok(Stmt::new(kind, stmt.line))
}

/// Rebuild an expression with each direct subexpression passed through
/// [`Transformer::transform_expr`].
pub fn transform_expr_children<T: Transformer + ?Sized>(
    transformer: &mut T,
    expr: Expr,
) -> Result<Expr, T::Error> {
    let t = transformer;
    let kind = match expr.kind {
        leaf @ (ExprKind::Name(_) | ExprKind::Constant(_) | ExprKind::Verbatim(_)) => leaf,
        ExprKind::Attribute { value, attr } => ExprKind::Attribute {
            value: transform_boxed(t, value)?,
            attr,
        },
        ExprKind::Subscript { value, slice } => ExprKind::Subscript {
            value: transform_boxed(t, value)?,
            slice: transform_boxed(t, slice)?,
        },
        ExprKind::Slice { lower, upper, step } => ExprKind::Slice {
            lower: lower.map(|e| transform_boxed(t, e)).transpose()?,
            upper: upper.map(|e| transform_boxed(t, e)).transpose()?,
            step: step.map(|e| transform_boxed(t, e)).transpose()?,
        },
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            let func = transform_boxed(t, func)?;
            let args = transform_all(t, args)?;
            let mut out = Vec::with_capacity(keywords.len());
            for mut kw in keywords {
                kw.value = t.transform_expr(kw.value)?;
                out.push(kw);
            }
            ExprKind::Call {
                func,
                args,
                keywords: out,
            }
        }
        ExprKind::BinOp { left, op, right } => ExprKind::BinOp {
            left: transform_boxed(t, left)?,
            op,
            right: transform_boxed(t, right)?,
        },
        ExprKind::UnaryOp { op, operand } => ExprKind::UnaryOp {
            op,
            operand: transform_boxed(t, operand)?,
        },
        ExprKind::BoolOp { op, values } => ExprKind::BoolOp {
            op,
            values: transform_all(t, values)?,
        },
        ExprKind::Compare {
            left,
            ops,
            comparators,
        } => ExprKind::Compare {
            left: transform_boxed(t, left)?,
            ops,
            comparators: transform_all(t, comparators)?,
        },
        ExprKind::IfExp { test, body, orelse } => {
            let body = transform_boxed(t, body)?;
            let test = transform_boxed(t, test)?;
            ExprKind::IfExp {
                test,
                body,
                orelse: transform_boxed(t, orelse)?,
            }
        }
        ExprKind::Lambda { params, body } => ExprKind::Lambda {
            params: Box::new(transform_params(t, *params)?),
            body: transform_boxed(t, body)?,
        },
        ExprKind::NamedExpr { target, value } => ExprKind::NamedExpr {
            target: transform_boxed(t, target)?,
            value: transform_boxed(t, value)?,
        },
        ExprKind::Tuple(elts) => ExprKind::Tuple(transform_all(t, elts)?),
        ExprKind::List(elts) => ExprKind::List(transform_all(t, elts)?),
        ExprKind::Set(elts) => ExprKind::Set(transform_all(t, elts)?),
        ExprKind::Dict { keys, values } => {
            let mut new_keys = Vec::with_capacity(keys.len());
            let mut new_values = Vec::with_capacity(values.len());
            for (key, value) in keys.into_iter().zip(values) {
                new_keys.push(transform_opt(t, key)?);
                new_values.push(t.transform_expr(value)?);
            }
            ExprKind::Dict {
                keys: new_keys,
                values: new_values,
            }
        }
        ExprKind::ListComp { elt, generators } => ExprKind::ListComp {
            elt: transform_boxed(t, elt)?,
            generators: transform_generators(t, generators)?,
        },
        ExprKind::SetComp { elt, generators } => ExprKind::SetComp {
            elt: transform_boxed(t, elt)?,
            generators: transform_generators(t, generators)?,
        },
        ExprKind::DictComp {
            key,
            value,
            generators,
        } => ExprKind::DictComp {
            key: transform_boxed(t, key)?,
            value: transform_boxed(t, value)?,
            generators: transform_generators(t, generators)?,
        },
        ExprKind::GeneratorExp { elt, generators } => ExprKind::GeneratorExp {
            elt: transform_boxed(t, elt)?,
            generators: transform_generators(t, generators)?,
        },
        ExprKind::Starred(value) => ExprKind::Starred(transform_boxed(t, value)?),
        ExprKind::Yield(value) => {
            ExprKind::Yield(value.map(|v| transform_boxed(t, v)).transpose()?)
        }
        ExprKind::YieldFrom(value) => ExprKind::YieldFrom(transform_boxed(t, value)?),
    };
    Ok(Expr::new(kind, expr.line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_module, render_module};

    #[derive(Default)]
    struct NameCollector {
        names: Vec<String>,
        stop_at: Option<&'static str>,
    }

    impl Visitor for NameCollector {
        fn visit_expr(&mut self, node: &Expr) -> VisitResult {
            if let Some(id) = node.as_name() {
                self.names.push(id.to_string());
                if self.stop_at == Some(id) {
                    return VisitResult::Stop;
                }
            }
            VisitResult::Continue
        }
    }

    #[test]
    fn test_walk_visits_in_source_order() {
        let module = parse_module("x = f(a, b)\nif c:\n  y = d\n").expect("parse error");
        let mut collector = NameCollector::default();
        assert_eq!(walk_module(&mut collector, &module), VisitResult::Continue);
        assert_eq!(collector.names, vec!["x", "f", "a", "b", "c", "y", "d"]);
    }

    #[test]
    fn test_walk_stop_halts() {
        let module = parse_module("x = f(a, b)\ny = c\n").expect("parse error");
        let mut collector = NameCollector {
            stop_at: Some("a"),
            ..Default::default()
        };
        assert_eq!(walk_module(&mut collector, &module), VisitResult::Stop);
        assert_eq!(collector.names, vec!["x", "f", "a"]);
    }

    struct SkipDefs {
        seen: usize,
    }

    impl Visitor for SkipDefs {
        fn visit_stmt(&mut self, node: &Stmt) -> VisitResult {
            self.seen += 1;
            if node.is_definition() {
                VisitResult::SkipChildren
            } else {
                VisitResult::Continue
            }
        }
    }

    #[test]
    fn test_skip_children() {
        let module = parse_module("def f():\n  a = 1\n  b = 2\nc = 3\n").expect("parse error");
        let mut v = SkipDefs { seen: 0 };
        walk_module(&mut v, &module);
        assert_eq!(v.seen, 2);
    }

    struct Renamer;

    impl Transformer for Renamer {
        type Error = std::convert::Infallible;

        fn transform_expr(&mut self, expr: Expr) -> Result<Expr, Self::Error> {
            let expr = transform_expr_children(self, expr)?;
            if expr.as_name() == Some("old") {
                return Ok(Expr::name("new", expr.line));
            }
            Ok(expr)
        }
    }

    #[test]
    fn test_transform_rewrites_nested_expressions() {
        let module =
            parse_module("def f(a=old):\n  return [old for x in old]\n").expect("parse error");
        let out = transform_module(&mut Renamer, module).expect("infallible");
        assert_eq!(
            render_module(&out),
            "def f(a=new):\n  return [new for x in new]\n"
        );
    }

    struct DropPass;

    impl Transformer for DropPass {
        type Error = std::convert::Infallible;

        fn transform_stmt(&mut self, stmt: Stmt) -> Result<Vec<Stmt>, Self::Error> {
            match stmt.kind {
                StmtKind::Pass => Ok(Vec::new()),
                StmtKind::Break => Ok(vec![stmt.clone(), stmt]),
                _ => Ok(vec![transform_stmt_children(self, stmt)?]),
            }
        }
    }

    #[test]
    fn test_transform_splices_statements() {
        let module = parse_module("while x:\n  pass\n  break\n").expect("parse error");
        let out = transform_module(&mut DropPass, module).expect("infallible");
        assert_eq!(render_module(&out), "while x:\n  break\n  break\n");
    }
}
