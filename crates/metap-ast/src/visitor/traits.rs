// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor and transformer trait definitions for tree traversal.

use super::dispatch::{transform_expr_children, transform_stmt_children};
use crate::nodes::{Expr, Module, Stmt};

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children. `leave_*` is called afterwards.
    #[default]
    Continue,

    /// Skip children, continue with siblings. `leave_*` is still called.
    SkipChildren,

    /// Stop traversal entirely. No further `visit_*` or `leave_*` calls.
    Stop,
}

/// Read-only traversal.
///
/// Every method has a default, so implementors override only the hooks they
/// need. Statements and expressions are visited pre-order, left to right.
pub trait Visitor {
    fn visit_module(&mut self, _node: &Module) -> VisitResult {
        VisitResult::Continue
    }

    fn leave_module(&mut self, _node: &Module) {}

    fn visit_stmt(&mut self, _node: &Stmt) -> VisitResult {
        VisitResult::Continue
    }

    fn leave_stmt(&mut self, _node: &Stmt) {}

    fn visit_expr(&mut self, _node: &Expr) -> VisitResult {
        VisitResult::Continue
    }

    fn leave_expr(&mut self, _node: &Expr) {}
}

/// Owning, fallible tree rewrite.
///
/// `transform_stmt` returns the statements that replace its input: an empty
/// vector removes the statement, several statements are spliced in place.
/// The defaults recurse into children, so an implementor that overrides a
/// method calls [`transform_stmt_children`] / [`transform_expr_children`]
/// itself wherever it wants the recursion to happen.
pub trait Transformer {
    type Error;

    fn transform_stmt(&mut self, stmt: Stmt) -> Result<Vec<Stmt>, Self::Error> {
        Ok(vec![transform_stmt_children(self, stmt)?])
    }

    fn transform_expr(&mut self, expr: Expr) -> Result<Expr, Self::Error> {
        transform_expr_children(self, expr)
    }
}
