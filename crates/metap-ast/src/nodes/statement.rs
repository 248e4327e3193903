// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Statement nodes.

use super::expression::{BinOp, Expr, Keyword};

/// A parsed module: an ordered statement sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
}

/// A single function or lambda parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<Expr>,
    pub default: Option<Expr>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }
}

/// The parameter list of a `def` or `lambda`.
///
/// `posonly` are the parameters before `/`, `kwonly` the ones after `*` or
/// `*args`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    pub posonly: Vec<Param>,
    pub args: Vec<Param>,
    pub vararg: Option<Param>,
    pub kwonly: Vec<Param>,
    pub kwarg: Option<Param>,
}

impl Parameters {
    pub fn is_empty(&self) -> bool {
        self.posonly.is_empty()
            && self.args.is_empty()
            && self.vararg.is_none()
            && self.kwonly.is_empty()
            && self.kwarg.is_none()
    }

    /// All named parameters in declaration order (including `*args` and `**kwargs`).
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.posonly
            .iter()
            .chain(self.args.iter())
            .chain(self.vararg.iter())
            .chain(self.kwonly.iter())
            .chain(self.kwarg.iter())
    }

    pub fn has_defaults(&self) -> bool {
        self.iter().any(|p| p.default.is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Parameters,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
    pub returns: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<Expr>,
    pub keywords: Vec<Keyword>,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
}

/// An `if` statement. An `elif` link is an `orelse` holding a single `If`
/// with `is_elif` set; the flag only affects rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub test: Expr,
    pub body: Vec<Stmt>,
    pub orelse: Vec<Stmt>,
    pub is_elif: bool,
}

impl If {
    /// True when `orelse` continues an else-if chain rather than being a
    /// terminal `else`.
    pub fn has_elif(&self) -> bool {
        matches!(self.orelse.as_slice(), [Stmt { kind: StmtKind::If(_), .. }])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithItem {
    pub context: Expr,
    pub target: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    pub kind: Option<Expr>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    FunctionDef(Box<FunctionDef>),
    ClassDef(Box<ClassDef>),
    Return(Option<Expr>),
    Delete(Vec<Expr>),
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: BinOp,
        value: Expr,
    },
    AnnAssign {
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    If(Box<If>),
    With {
        items: Vec<WithItem>,
        body: Vec<Stmt>,
    },
    Raise {
        exc: Option<Expr>,
        cause: Option<Expr>,
    },
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
    },
    Assert {
        test: Expr,
        msg: Option<Expr>,
    },
    Import(Vec<Alias>),
    ImportFrom {
        module: Option<String>,
        names: Vec<Alias>,
        level: usize,
    },
    Global(Vec<String>),
    Nonlocal(Vec<String>),
    Expr(Expr),
    Pass,
    Break,
    Continue,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: Option<u32>) -> Self {
        Stmt { kind, line }
    }

    /// An expression statement on the expression's line.
    pub fn expr(value: Expr) -> Self {
        let line = value.line;
        Stmt::new(StmtKind::Expr(value), line)
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        let line = target.line;
        Stmt::new(
            StmtKind::Assign {
                targets: vec![target],
                value,
            },
            line,
        )
    }

    pub fn if_(test: Expr, body: Vec<Stmt>, orelse: Vec<Stmt>) -> Self {
        let line = test.line;
        Stmt::new(
            StmtKind::If(Box::new(If {
                test,
                body,
                orelse,
                is_elif: false,
            })),
            line,
        )
    }

    pub fn ret(value: Option<Expr>, line: Option<u32>) -> Self {
        Stmt::new(StmtKind::Return(value), line)
    }

    /// True for `def` and `class` statements.
    pub fn is_definition(&self) -> bool {
        matches!(self.kind, StmtKind::FunctionDef(_) | StmtKind::ClassDef(_))
    }

    /// True for a string-literal expression statement (a docstring candidate).
    pub fn is_docstring(&self) -> bool {
        matches!(&self.kind, StmtKind::Expr(e) if e.is_str_constant())
    }
}

/// Split a leading docstring off a body so that prepended statements can be
/// inserted after it.
pub fn split_docstring(mut body: Vec<Stmt>) -> (Option<Stmt>, Vec<Stmt>) {
    if body.first().is_some_and(Stmt::is_docstring) {
        let doc = body.remove(0);
        (Some(doc), body)
    } else {
        (None, body)
    }
}

/// Insert `prefix` at the start of `body`, after a docstring if one exists.
pub fn prepend_to_body(body: Vec<Stmt>, prefix: Vec<Stmt>) -> Vec<Stmt> {
    let (doc, rest) = split_docstring(body);
    doc.into_iter().chain(prefix).chain(rest).collect()
}
