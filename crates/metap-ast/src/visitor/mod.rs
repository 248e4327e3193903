// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor and transformer infrastructure.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order** for `visit_*` methods
//! - **Post-order** for `leave_*` methods
//! - Children are visited in source order (left-to-right, top-to-bottom)
//!
//! # Visitor Pattern
//!
//! The [`Visitor`] trait provides read-only traversal:
//!
//! ```
//! use metap_ast::visitor::{walk_module, VisitResult, Visitor};
//! use metap_ast::{parse_module, Stmt, StmtKind};
//!
//! struct ReturnCounter {
//!     count: usize,
//! }
//!
//! impl Visitor for ReturnCounter {
//!     fn visit_stmt(&mut self, node: &Stmt) -> VisitResult {
//!         if matches!(node.kind, StmtKind::Return(_)) {
//!             self.count += 1;
//!         }
//!         VisitResult::Continue
//!     }
//! }
//!
//! let module = parse_module("def f(x):\n  if x:\n    return 1\n  return 2\n").unwrap();
//! let mut counter = ReturnCounter { count: 0 };
//! walk_module(&mut counter, &module);
//! assert_eq!(counter.count, 2);
//! ```
//!
//! # Transformer Pattern
//!
//! The [`Transformer`] trait rewrites an owned tree. Statement hooks return
//! a `Vec<Stmt>` that is spliced in place of the input.

mod dispatch;
mod traits;

pub use dispatch::*;
pub use traits::{Transformer, VisitResult, Visitor};
