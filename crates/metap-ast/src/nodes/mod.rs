// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Syntax tree node types.
//!
//! Statements and expressions are closed sum types ([`StmtKind`],
//! [`ExprKind`]); every pass matches on them exhaustively. Each node carries
//! the 1-indexed source line it starts on.

mod expression;
mod statement;

pub use expression::{
    BinOp, BoolOp, CmpOp, Comprehension, Constant, Expr, ExprKind, Keyword, UnaryOp,
};
pub use statement::{
    prepend_to_body, split_docstring, Alias, ClassDef, ExceptHandler, FunctionDef, If, Module,
    Param, Parameters, Stmt, StmtKind, WithItem,
};
