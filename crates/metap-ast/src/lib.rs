// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A Python parser, syntax tree and code generator for metap.
//!
//! This crate converts Python source text to an owned syntax tree and back.
//! Rewrite passes work on the tree through the [`visitor`] traits.
//!
//! # Overview
//!
//! - **Parsing**: [`parse_module`], [`parse_statement`], [`parse_expression`].
//!   Every node records the line it starts on.
//! - **Code Generation**: [`render_module`] and the [`Codegen`] trait render
//!   a normalized, two-space indented program. Comments and original
//!   spacing are not preserved.
//! - **Traversal**: [`Visitor`] for read-only walks, [`Transformer`] for
//!   owned rewrites that may splice statements.
//!
//! # Quick Start
//!
//! ```
//! use metap_ast::{parse_module, render_module};
//!
//! let module = parse_module("def add_one(n):\n    return n + 1\n").expect("parse error");
//! assert_eq!(render_module(&module), "def add_one(n):\n  return n + 1\n");
//! ```

use std::cmp::min;

// ============================================================================
// Public modules and re-exports
// ============================================================================

/// Tokenizer for Python source code.
pub mod tokenizer;

/// Visitor and transformer infrastructure for tree traversal.
pub mod visitor;
pub use visitor::{Transformer, VisitResult, Visitor};

mod nodes;
pub use nodes::*;

mod parser;
pub use parser::{parse_expression, parse_module, parse_statement, ParserError, Result};

mod codegen;
pub use codegen::{
    render_expr, render_module, render_module_with_indent, repr_str, Codegen, CodegenState,
};

// ============================================================================
// Error formatting
// ============================================================================

/// Returns the byte offset of the beginning of line `n` (1-indexed).
fn bol_offset(source: &str, n: i64) -> usize {
    if n <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth((n - 2) as usize)
        .map(|(index, _)| index + 1)
        .unwrap_or_else(|| source.len())
}

/// Formats a parser error with the offending source line highlighted.
///
/// `label` names the input (usually the file name).
///
/// # Example
///
/// ```
/// use metap_ast::{parse_module, prettify_error};
///
/// let source = "def f(:\n  pass\n";
/// let err = parse_module(source).unwrap_err();
/// let formatted = prettify_error(&err, source, "example.py");
/// assert!(formatted.contains("example.py"));
/// ```
pub fn prettify_error(err: &ParserError, source: &str, label: &str) -> String {
    use annotate_snippets::{Level, Renderer, Snippet};

    let line = i64::from(err.line());
    let context = 1;
    let line_start = line.saturating_sub(context).max(1) as usize;
    let start_offset = bol_offset(source, line - context);
    let end_offset = bol_offset(source, line + context + 1);
    let (start, end) = err.span();
    let start = start.clamp(start_offset, end_offset) - start_offset;
    let end = end.clamp(start_offset, end_offset) - start_offset;
    let window = &source[start_offset..end_offset];
    let end = if start == end {
        min(end + 1, window.len() + 1)
    } else {
        end
    };
    let message = err.to_string();
    let rendered = Renderer::plain()
        .render(
            Level::Error.title(label).snippet(
                Snippet::source(window)
                    .line_start(line_start)
                    .fold(false)
                    .annotations(vec![Level::Error.span(start..end).label(&message)]),
            ),
        )
        .to_string();
    rendered
}

// ============================================================================
// Tests
// ============================================================================
