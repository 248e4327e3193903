// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Source code generation.
//!
//! Rendering is deterministic: comments and original spacing are gone, so
//! the output is normalized. Blocks use a configurable indent unit (two
//! spaces by default). A `def` or `class` that is not the first statement of
//! its block is preceded by two blank lines at module level and one blank
//! line elsewhere; at module level two blank lines also follow it. Strings
//! are rendered the way Python's `repr` does.

use std::fmt;

use crate::nodes::{
    Constant, ExceptHandler, Expr, ExprKind, If, Keyword, Module, Parameters, Stmt, StmtKind,
};

/// Accumulates rendered source text.
#[derive(Debug, Clone)]
pub struct CodegenState {
    tokens: String,
    indent_unit: String,
    depth: usize,
}

impl Default for CodegenState {
    fn default() -> Self {
        CodegenState::with_indent("  ")
    }
}

impl CodegenState {
    pub fn with_indent(unit: impl Into<String>) -> Self {
        CodegenState {
            tokens: String::new(),
            indent_unit: unit.into(),
            depth: 0,
        }
    }

    pub fn add_token(&mut self, tok: &str) {
        self.tokens.push_str(tok);
    }

    pub fn add_indent(&mut self) {
        self.depth += 1;
    }

    pub fn pop_indent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current block nesting depth (0 at module level).
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn begin_line(&mut self) {
        for _ in 0..self.depth {
            self.tokens.push_str(&self.indent_unit);
        }
    }

    fn end_line(&mut self) {
        self.tokens.push('\n');
    }

    fn line(&mut self, text: &str) {
        self.begin_line();
        self.add_token(text);
        self.end_line();
    }

    pub fn into_string(self) -> String {
        self.tokens
    }
}

impl fmt::Display for CodegenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens)
    }
}

/// Nodes that can render themselves as source.
pub trait Codegen {
    fn codegen(&self, state: &mut CodegenState);
}

/// Render a module with the default two-space indent.
pub fn render_module(module: &Module) -> String {
    let mut state = CodegenState::default();
    module.codegen(&mut state);
    state.into_string()
}

/// Render a module with a custom indent unit.
pub fn render_module_with_indent(module: &Module, indent: &str) -> String {
    let mut state = CodegenState::with_indent(indent);
    module.codegen(&mut state);
    state.into_string()
}

/// Render a single expression on one line.
pub fn render_expr(expr: &Expr) -> String {
    let mut state = CodegenState::default();
    expr.codegen(&mut state);
    state.into_string()
}

// ============================================================================
// Precedence
// ============================================================================

const NAMED: u8 = 1;
const TUPLE: u8 = 2;
const YIELD: u8 = 3;
const TEST: u8 = 4;
const OR: u8 = 5;
const AND: u8 = 6;
const NOT: u8 = 7;
const CMP: u8 = 8;
const BOR: u8 = 9;
const BXOR: u8 = 10;
const BAND: u8 = 11;
const SHIFT: u8 = 12;
const ARITH: u8 = 13;
const TERM: u8 = 14;
const FACTOR: u8 = 15;
const POWER: u8 = 16;
const ATOM: u8 = 17;

fn binop_precedence(op: crate::nodes::BinOp) -> u8 {
    use crate::nodes::BinOp::*;
    match op {
        BitOr => BOR,
        BitXor => BXOR,
        BitAnd => BAND,
        LShift | RShift => SHIFT,
        Add | Sub => ARITH,
        Mult | MatMult | Div | FloorDiv | Mod => TERM,
        Pow => POWER,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::NamedExpr { .. } => NAMED,
        ExprKind::Tuple(elts) if !elts.is_empty() => TUPLE,
        ExprKind::Yield(_) | ExprKind::YieldFrom(_) => YIELD,
        ExprKind::IfExp { .. } | ExprKind::Lambda { .. } => TEST,
        ExprKind::BoolOp { op, .. } => match op {
            crate::nodes::BoolOp::Or => OR,
            crate::nodes::BoolOp::And => AND,
        },
        ExprKind::UnaryOp { op, .. } => match op {
            crate::nodes::UnaryOp::Not => NOT,
            _ => FACTOR,
        },
        ExprKind::Compare { .. } => CMP,
        ExprKind::BinOp { op, .. } => binop_precedence(*op),
        // Starred only appears where a full expression is allowed.
        ExprKind::Starred(_) => BOR,
        _ => ATOM,
    }
}

/// Render `expr`, parenthesizing it when it binds looser than `required`.
fn expr_prec(state: &mut CodegenState, expr: &Expr, required: u8) {
    if precedence(expr) < required {
        state.add_token("(");
        write_expr(state, expr);
        state.add_token(")");
    } else {
        write_expr(state, expr);
    }
}

fn comma_separated<T>(
    state: &mut CodegenState,
    items: &[T],
    mut each: impl FnMut(&mut CodegenState, &T),
) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            state.add_token(", ");
        }
        each(state, item);
    }
}

// ============================================================================
// Expressions
// ============================================================================

impl Codegen for Expr {
    fn codegen(&self, state: &mut CodegenState) {
        expr_prec(state, self, TUPLE);
    }
}

/// Python `repr` of a string value.
pub fn repr_str(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xff {
                    out.push_str(&format!("\\x{:02x}", code));
                } else if code <= 0xffff {
                    out.push_str(&format!("\\u{:04x}", code));
                } else {
                    out.push_str(&format!("\\U{:08x}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn write_constant(state: &mut CodegenState, value: &Constant) {
    match value {
        Constant::None => state.add_token("None"),
        Constant::Bool(true) => state.add_token("True"),
        Constant::Bool(false) => state.add_token("False"),
        Constant::Int(text) | Constant::Float(text) => state.add_token(text),
        Constant::Str(s) => state.add_token(&repr_str(s)),
        Constant::Ellipsis => state.add_token("..."),
    }
}

fn write_params(state: &mut CodegenState, params: &Parameters) {
    let mut first = true;
    let mut sep = |state: &mut CodegenState| {
        if !first {
            state.add_token(", ");
        }
        first = false;
    };
    let write_param = |state: &mut CodegenState, p: &crate::nodes::Param| {
        state.add_token(&p.name);
        if let Some(ann) = &p.annotation {
            state.add_token(": ");
            expr_prec(state, ann, TEST);
        }
        if let Some(default) = &p.default {
            state.add_token(if p.annotation.is_some() { " = " } else { "=" });
            expr_prec(state, default, TEST);
        }
    };
    for p in &params.posonly {
        sep(state);
        write_param(state, p);
    }
    if !params.posonly.is_empty() {
        sep(state);
        state.add_token("/");
    }
    for p in &params.args {
        sep(state);
        write_param(state, p);
    }
    if let Some(vararg) = &params.vararg {
        sep(state);
        state.add_token("*");
        write_param(state, vararg);
    } else if !params.kwonly.is_empty() {
        sep(state);
        state.add_token("*");
    }
    for p in &params.kwonly {
        sep(state);
        write_param(state, p);
    }
    if let Some(kwarg) = &params.kwarg {
        sep(state);
        state.add_token("**");
        write_param(state, kwarg);
    }
}

fn write_keyword(state: &mut CodegenState, kw: &Keyword) {
    match &kw.arg {
        Some(arg) => {
            state.add_token(arg);
            state.add_token("=");
            expr_prec(state, &kw.value, TEST);
        }
        None => {
            state.add_token("**");
            expr_prec(state, &kw.value, BOR);
        }
    }
}

fn write_call_args(state: &mut CodegenState, args: &[Expr], keywords: &[Keyword]) {
    // A sole generator argument needs no second pair of parentheses.
    if let ([arg], []) = (args, keywords) {
        if let ExprKind::GeneratorExp { elt, generators } = &arg.kind {
            expr_prec(state, elt, TEST);
            write_generators(state, generators);
            return;
        }
    }
    comma_separated(state, args, |state, arg| expr_prec(state, arg, TEST));
    if !args.is_empty() && !keywords.is_empty() {
        state.add_token(", ");
    }
    comma_separated(state, keywords, write_keyword);
}

fn write_generators(state: &mut CodegenState, generators: &[crate::nodes::Comprehension]) {
    for comp in generators {
        state.add_token(" for ");
        expr_prec(state, &comp.target, TUPLE);
        state.add_token(" in ");
        expr_prec(state, &comp.iter, OR);
        for cond in &comp.ifs {
            state.add_token(" if ");
            expr_prec(state, cond, OR);
        }
    }
}

fn write_slice_item(state: &mut CodegenState, expr: &Expr) {
    match &expr.kind {
        ExprKind::Slice { lower, upper, step } => {
            if let Some(lower) = lower {
                expr_prec(state, lower, TEST);
            }
            state.add_token(":");
            if let Some(upper) = upper {
                expr_prec(state, upper, TEST);
            }
            if let Some(step) = step {
                state.add_token(":");
                expr_prec(state, step, TEST);
            }
        }
        _ => expr_prec(state, expr, TEST),
    }
}

fn write_expr(state: &mut CodegenState, expr: &Expr) {
    match &expr.kind {
        ExprKind::Name(id) => state.add_token(id),
        ExprKind::Constant(value) => write_constant(state, value),
        ExprKind::Verbatim(text) => state.add_token(text),
        ExprKind::Attribute { value, attr } => {
            if matches!(value.kind, ExprKind::Constant(Constant::Int(_))) {
                state.add_token("(");
                write_expr(state, value);
                state.add_token(")");
            } else {
                expr_prec(state, value, ATOM);
            }
            state.add_token(".");
            state.add_token(attr);
        }
        ExprKind::Subscript { value, slice } => {
            expr_prec(state, value, ATOM);
            state.add_token("[");
            match &slice.kind {
                ExprKind::Tuple(elts) if !elts.is_empty() => {
                    comma_separated(state, elts, write_slice_item);
                    if elts.len() == 1 {
                        state.add_token(",");
                    }
                }
                _ => write_slice_item(state, slice),
            }
            state.add_token("]");
        }
        ExprKind::Slice { .. } => write_slice_item(state, expr),
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            expr_prec(state, func, ATOM);
            state.add_token("(");
            write_call_args(state, args, keywords);
            state.add_token(")");
        }
        ExprKind::BinOp { left, op, right } => {
            let prec = binop_precedence(*op);
            // `**` is right-associative.
            let (lp, rp) = if prec == POWER {
                (prec + 1, prec)
            } else {
                (prec, prec + 1)
            };
            expr_prec(state, left, lp);
            state.add_token(" ");
            state.add_token(op.as_str());
            state.add_token(" ");
            expr_prec(state, right, rp);
        }
        ExprKind::UnaryOp { op, operand } => {
            state.add_token(op.as_str());
            expr_prec(state, operand, precedence(expr));
        }
        ExprKind::BoolOp { op, values } => {
            let prec = precedence(expr);
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    state.add_token(" ");
                    state.add_token(op.as_str());
                    state.add_token(" ");
                }
                expr_prec(state, value, prec + 1);
            }
        }
        ExprKind::Compare {
            left,
            ops,
            comparators,
        } => {
            expr_prec(state, left, CMP + 1);
            for (op, right) in ops.iter().zip(comparators) {
                state.add_token(" ");
                state.add_token(op.as_str());
                state.add_token(" ");
                expr_prec(state, right, CMP + 1);
            }
        }
        ExprKind::IfExp { test, body, orelse } => {
            expr_prec(state, body, TEST + 1);
            state.add_token(" if ");
            expr_prec(state, test, TEST + 1);
            state.add_token(" else ");
            expr_prec(state, orelse, TEST);
        }
        ExprKind::Lambda { params, body } => {
            state.add_token("lambda");
            if !params.is_empty() {
                state.add_token(" ");
                write_params(state, params);
            }
            state.add_token(": ");
            expr_prec(state, body, TEST);
        }
        ExprKind::NamedExpr { target, value } => {
            expr_prec(state, target, ATOM);
            state.add_token(" := ");
            expr_prec(state, value, TEST);
        }
        ExprKind::Tuple(elts) => {
            // Parentheses are added by `expr_prec` when the context needs them.
            if elts.is_empty() {
                state.add_token("()");
                return;
            }
            comma_separated(state, elts, |state, e| expr_prec(state, e, TEST));
            if elts.len() == 1 {
                state.add_token(",");
            }
        }
        ExprKind::List(elts) => {
            state.add_token("[");
            comma_separated(state, elts, |state, e| expr_prec(state, e, TEST));
            state.add_token("]");
        }
        ExprKind::Set(elts) => {
            if elts.is_empty() {
                state.add_token("{*()}");
                return;
            }
            state.add_token("{");
            comma_separated(state, elts, |state, e| expr_prec(state, e, TEST));
            state.add_token("}");
        }
        ExprKind::Dict { keys, values } => {
            state.add_token("{");
            let pairs: Vec<_> = keys.iter().zip(values).collect();
            comma_separated(state, &pairs, |state, (key, value)| match key {
                Some(key) => {
                    expr_prec(state, key, TEST);
                    state.add_token(": ");
                    expr_prec(state, value, TEST);
                }
                None => {
                    state.add_token("**");
                    expr_prec(state, value, BOR);
                }
            });
            state.add_token("}");
        }
        ExprKind::ListComp { elt, generators } => {
            state.add_token("[");
            expr_prec(state, elt, TEST);
            write_generators(state, generators);
            state.add_token("]");
        }
        ExprKind::SetComp { elt, generators } => {
            state.add_token("{");
            expr_prec(state, elt, TEST);
            write_generators(state, generators);
            state.add_token("}");
        }
        ExprKind::DictComp {
            key,
            value,
            generators,
        } => {
            state.add_token("{");
            expr_prec(state, key, TEST);
            state.add_token(": ");
            expr_prec(state, value, TEST);
            write_generators(state, generators);
            state.add_token("}");
        }
        ExprKind::GeneratorExp { elt, generators } => {
            state.add_token("(");
            expr_prec(state, elt, TEST);
            write_generators(state, generators);
            state.add_token(")");
        }
        ExprKind::Starred(value) => {
            state.add_token("*");
            expr_prec(state, value, BOR);
        }
        ExprKind::Yield(value) => {
            state.add_token("yield");
            if let Some(value) = value {
                state.add_token(" ");
                expr_prec(state, value, TUPLE);
            }
        }
        ExprKind::YieldFrom(value) => {
            state.add_token("yield from ");
            expr_prec(state, value, TEST);
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

impl Codegen for Module {
    fn codegen(&self, state: &mut CodegenState) {
        write_body(state, &self.body);
    }
}

impl Codegen for Stmt {
    fn codegen(&self, state: &mut CodegenState) {
        write_stmt(state, self);
    }
}

fn write_body(state: &mut CodegenState, body: &[Stmt]) {
    let top_level = state.depth() == 0;
    for (i, stmt) in body.iter().enumerate() {
        let after_def = i > 0 && top_level && body[i - 1].is_definition();
        if i > 0 && (stmt.is_definition() || after_def) {
            let blanks = if top_level { 2 } else { 1 };
            for _ in 0..blanks {
                state.end_line();
            }
        }
        write_stmt(state, stmt);
    }
}

fn write_block(state: &mut CodegenState, body: &[Stmt]) {
    state.add_indent();
    if body.is_empty() {
        state.line("pass");
    } else {
        write_body(state, body);
    }
    state.pop_indent();
}

/// Write `keyword <expr>:` on its own line.
fn header(state: &mut CodegenState, keyword: &str, expr: &Expr) {
    state.begin_line();
    state.add_token(keyword);
    expr_prec(state, expr, TEST);
    state.add_token(":");
    state.end_line();
}

fn else_block(state: &mut CodegenState, orelse: &[Stmt]) {
    if !orelse.is_empty() {
        state.line("else:");
        write_block(state, orelse);
    }
}

fn write_if(state: &mut CodegenState, node: &If) {
    header(state, "if ", &node.test);
    write_block(state, &node.body);
    let mut orelse = &node.orelse;
    loop {
        match orelse.as_slice() {
            [Stmt {
                kind: StmtKind::If(elif),
                ..
            }] if elif.is_elif => {
                header(state, "elif ", &elif.test);
                write_block(state, &elif.body);
                orelse = &elif.orelse;
            }
            _ => break,
        }
    }
    else_block(state, orelse);
}

fn write_handler(state: &mut CodegenState, handler: &ExceptHandler) {
    state.begin_line();
    state.add_token("except");
    if let Some(kind) = &handler.kind {
        state.add_token(" ");
        expr_prec(state, kind, TEST);
        if let Some(name) = &handler.name {
            state.add_token(" as ");
            state.add_token(name);
        }
    }
    state.add_token(":");
    state.end_line();
    write_block(state, &handler.body);
}

fn write_stmt(state: &mut CodegenState, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::FunctionDef(def) => {
            for decorator in &def.decorators {
                state.begin_line();
                state.add_token("@");
                expr_prec(state, decorator, NAMED);
                state.end_line();
            }
            state.begin_line();
            state.add_token("def ");
            state.add_token(&def.name);
            state.add_token("(");
            write_params(state, &def.params);
            state.add_token(")");
            if let Some(returns) = &def.returns {
                state.add_token(" -> ");
                expr_prec(state, returns, TEST);
            }
            state.add_token(":");
            state.end_line();
            write_block(state, &def.body);
        }
        StmtKind::ClassDef(class) => {
            for decorator in &class.decorators {
                state.begin_line();
                state.add_token("@");
                expr_prec(state, decorator, NAMED);
                state.end_line();
            }
            state.begin_line();
            state.add_token("class ");
            state.add_token(&class.name);
            if !class.bases.is_empty() || !class.keywords.is_empty() {
                state.add_token("(");
                write_call_args(state, &class.bases, &class.keywords);
                state.add_token(")");
            }
            state.add_token(":");
            state.end_line();
            write_block(state, &class.body);
        }
        StmtKind::If(node) => write_if(state, node),
        StmtKind::For {
            target,
            iter,
            body,
            orelse,
        } => {
            state.begin_line();
            state.add_token("for ");
            expr_prec(state, target, TUPLE);
            state.add_token(" in ");
            expr_prec(state, iter, TUPLE);
            state.add_token(":");
            state.end_line();
            write_block(state, body);
            else_block(state, orelse);
        }
        StmtKind::While { test, body, orelse } => {
            header(state, "while ", test);
            write_block(state, body);
            else_block(state, orelse);
        }
        StmtKind::With { items, body } => {
            state.begin_line();
            state.add_token("with ");
            comma_separated(state, items, |state, item| {
                expr_prec(state, &item.context, TEST);
                if let Some(target) = &item.target {
                    state.add_token(" as ");
                    expr_prec(state, target, TEST);
                }
            });
            state.add_token(":");
            state.end_line();
            write_block(state, body);
        }
        StmtKind::Try {
            body,
            handlers,
            orelse,
            finalbody,
        } => {
            state.line("try:");
            write_block(state, body);
            for handler in handlers {
                write_handler(state, handler);
            }
            else_block(state, orelse);
            if !finalbody.is_empty() {
                state.line("finally:");
                write_block(state, finalbody);
            }
        }
        simple => {
            state.begin_line();
            write_simple(state, simple);
            state.end_line();
        }
    }
}

fn write_simple(state: &mut CodegenState, kind: &StmtKind) {
    match kind {
        StmtKind::Return(value) => {
            state.add_token("return");
            if let Some(value) = value {
                state.add_token(" ");
                expr_prec(state, value, TUPLE);
            }
        }
        StmtKind::Delete(targets) => {
            state.add_token("del ");
            comma_separated(state, targets, |state, t| expr_prec(state, t, BOR));
        }
        StmtKind::Assign { targets, value } => {
            for target in targets {
                expr_prec(state, target, TUPLE);
                state.add_token(" = ");
            }
            expr_prec(state, value, TUPLE);
        }
        StmtKind::AugAssign { target, op, value } => {
            expr_prec(state, target, TUPLE);
            state.add_token(" ");
            state.add_token(op.as_str());
            state.add_token("= ");
            expr_prec(state, value, TUPLE);
        }
        StmtKind::AnnAssign {
            target,
            annotation,
            value,
        } => {
            expr_prec(state, target, ATOM);
            state.add_token(": ");
            expr_prec(state, annotation, TEST);
            if let Some(value) = value {
                state.add_token(" = ");
                expr_prec(state, value, TUPLE);
            }
        }
        StmtKind::Raise { exc, cause } => {
            state.add_token("raise");
            if let Some(exc) = exc {
                state.add_token(" ");
                expr_prec(state, exc, TEST);
            }
            if let Some(cause) = cause {
                state.add_token(" from ");
                expr_prec(state, cause, TEST);
            }
        }
        StmtKind::Assert { test, msg } => {
            state.add_token("assert ");
            expr_prec(state, test, TEST);
            if let Some(msg) = msg {
                state.add_token(", ");
                expr_prec(state, msg, TEST);
            }
        }
        StmtKind::Import(names) => {
            state.add_token("import ");
            comma_separated(state, names, write_alias);
        }
        StmtKind::ImportFrom {
            module,
            names,
            level,
        } => {
            state.add_token("from ");
            state.add_token(&".".repeat(*level));
            if let Some(module) = module {
                state.add_token(module);
            }
            state.add_token(" import ");
            comma_separated(state, names, write_alias);
        }
        StmtKind::Global(names) => {
            state.add_token("global ");
            state.add_token(&names.join(", "));
        }
        StmtKind::Nonlocal(names) => {
            state.add_token("nonlocal ");
            state.add_token(&names.join(", "));
        }
        StmtKind::Expr(value) => expr_prec(state, value, TUPLE),
        StmtKind::Pass => state.add_token("pass"),
        StmtKind::Break => state.add_token("break"),
        StmtKind::Continue => state.add_token("continue"),
        StmtKind::FunctionDef(_)
        | StmtKind::ClassDef(_)
        | StmtKind::If(_)
        | StmtKind::For { .. }
        | StmtKind::While { .. }
        | StmtKind::With { .. }
        | StmtKind::Try { .. } => {}
    }
}

fn write_alias(state: &mut CodegenState, alias: &crate::nodes::Alias) {
    state.add_token(&alias.name);
    if let Some(asname) = &alias.asname {
        state.add_token(" as ");
        state.add_token(asname);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_expression, parse_module};

    fn roundtrip_expr(src: &str) -> String {
        render_expr(&parse_expression(src).expect("parse error"))
    }

    #[test]
    fn test_repr_str_quotes() {
        assert_eq!(repr_str("abc"), "'abc'");
        assert_eq!(repr_str("it's"), "\"it's\"");
        assert_eq!(repr_str("both ' and \""), "'both \\' and \"'");
        assert_eq!(repr_str("a\nb\\"), "'a\\nb\\\\'");
        assert_eq!(repr_str("\x01"), "'\\x01'");
    }

    #[test]
    fn test_double_quotes_become_single() {
        assert_eq!(roundtrip_expr("\"# test\""), "'# test'");
    }

    #[test]
    fn test_precedence_parentheses() {
        assert_eq!(roundtrip_expr("(a + b) * c"), "(a + b) * c");
        assert_eq!(roundtrip_expr("a + (b * c)"), "a + b * c");
        assert_eq!(roundtrip_expr("a - (b - c)"), "a - (b - c)");
        assert_eq!(roundtrip_expr("(a ** b) ** c"), "(a ** b) ** c");
        assert_eq!(roundtrip_expr("not (a and b)"), "not (a and b)");
        assert_eq!(roundtrip_expr("(a or b) and c"), "(a or b) and c");
        assert_eq!(roundtrip_expr("-x.y"), "-x.y");
    }

    #[test]
    fn test_tuple_contexts() {
        assert_eq!(roundtrip_expr("a, b"), "a, b");
        assert_eq!(roundtrip_expr("f((a, b))"), "f((a, b))");
        assert_eq!(roundtrip_expr("x[1, 2]"), "x[1, 2]");
        assert_eq!(roundtrip_expr("x[1:2, ::3]"), "x[1:2, ::3]");
        assert_eq!(roundtrip_expr("(a,)"), "a,");
        assert_eq!(roundtrip_expr("()"), "()");
    }

    #[test]
    fn test_lambda_and_calls() {
        assert_eq!(roundtrip_expr("lambda: f(x)"), "lambda: f(x)");
        assert_eq!(roundtrip_expr("lambda a, b=1: a"), "lambda a, b=1: a");
        assert_eq!(
            roundtrip_expr("f(a, *b, k=1, **kw)"),
            "f(a, *b, k=1, **kw)"
        );
        assert_eq!(roundtrip_expr("all(x for x in y)"), "all(x for x in y)");
    }

    #[test]
    fn test_comprehensions_and_displays() {
        assert_eq!(
            roundtrip_expr("[f(e) for e in obj if e]"),
            "[f(e) for e in obj if e]"
        );
        assert_eq!(roundtrip_expr("{'a': 1, **m}"), "{'a': 1, **m}");
        assert_eq!(roundtrip_expr("{k: v for k, v in d}"), "{k: v for k, v in d}");
        assert_eq!(roundtrip_expr("{1, 2}"), "{1, 2}");
    }

    #[test]
    fn test_compare_and_ifexp() {
        assert_eq!(roundtrip_expr("a is not None"), "a is not None");
        assert_eq!(roundtrip_expr("'k' not in d"), "'k' not in d");
        assert_eq!(roundtrip_expr("a if b else c"), "a if b else c");
    }

    #[test]
    fn test_module_blank_lines() {
        let src = "import os\ndef f():\n    return 1\ndef g():\n    def h():\n        pass\n    x = 1\n    def k():\n        pass\n";
        let out = render_module(&parse_module(src).expect("parse error"));
        assert_eq!(
            out,
            "import os\n\n\ndef f():\n  return 1\n\n\ndef g():\n  def h():\n    pass\n  x = 1\n\n  def k():\n    pass\n"
        );
    }

    #[test]
    fn test_elif_chain_renders_flat() {
        let src = "if a:\n  x = 1\nelif b:\n  x = 2\nelse:\n  x = 3\n";
        let out = render_module(&parse_module(src).expect("parse error"));
        assert_eq!(out, src);
    }

    #[test]
    fn test_custom_indent() {
        let module = parse_module("while x:\n  pass\n").expect("parse error");
        assert_eq!(
            render_module_with_indent(&module, "    "),
            "while x:\n    pass\n"
        );
    }

    #[test]
    fn test_empty_body_renders_pass() {
        let mut module = parse_module("def f():\n  return\n").expect("parse error");
        if let StmtKind::FunctionDef(def) = &mut module.body[0].kind {
            def.body.clear();
        }
        assert_eq!(render_module(&module), "def f():\n  pass\n");
    }
}
