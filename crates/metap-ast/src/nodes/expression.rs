// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expression nodes.

use super::statement::Parameters;

/// Literal constant values.
///
/// Numbers keep their source spelling so that `2_000_000` or `0x1F` render
/// back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    None,
    Bool(bool),
    Int(String),
    Float(String),
    /// A decoded, unprefixed string literal.
    Str(String),
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mult => "*",
            BinOp::MatMult => "@",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::LShift => "<<",
            BinOp::RShift => ">>",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
        }
    }

    /// Map an augmented-assignment operator (`+=`) to its binary operator.
    pub fn from_augmented(op: &str) -> Option<BinOp> {
        let op = op.strip_suffix('=')?;
        Some(match op {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mult,
            "@" => BinOp::MatMult,
            "/" => BinOp::Div,
            "//" => BinOp::FloorDiv,
            "%" => BinOp::Mod,
            "**" => BinOp::Pow,
            "<<" => BinOp::LShift,
            ">>" => BinOp::RShift,
            "|" => BinOp::BitOr,
            "^" => BinOp::BitXor,
            "&" => BinOp::BitAnd,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Invert,
    UAdd,
    USub,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "not ",
            UnaryOp::Invert => "~",
            UnaryOp::UAdd => "+",
            UnaryOp::USub => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}

/// A keyword argument in a call. `arg` is `None` for `**mapping`.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: Expr,
}

/// One `for target in iter if cond...` clause of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
}

/// An expression together with the source line it starts on.
///
/// Nodes produced by the parser always carry a line. Nodes synthesized by a
/// rewrite copy the line of the construct they replace.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Name(String),
    Constant(Constant),
    /// A prefixed string literal (`r'..'`, `b'..'`, `f'..'`) kept as source text.
    Verbatim(String),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        slice: Box<Expr>,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Lambda {
        params: Box<Parameters>,
        body: Box<Expr>,
    },
    NamedExpr {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Set(Vec<Expr>),
    /// `keys[i]` is `None` for a `**mapping` entry.
    Dict {
        keys: Vec<Option<Expr>>,
        values: Vec<Expr>,
    },
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    SetComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    GeneratorExp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    Starred(Box<Expr>),
    Yield(Option<Box<Expr>>),
    YieldFrom(Box<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, line: Option<u32>) -> Self {
        Expr { kind, line }
    }

    pub fn name(id: impl Into<String>, line: Option<u32>) -> Self {
        Expr::new(ExprKind::Name(id.into()), line)
    }

    pub fn constant(value: Constant, line: Option<u32>) -> Self {
        Expr::new(ExprKind::Constant(value), line)
    }

    pub fn none(line: Option<u32>) -> Self {
        Expr::constant(Constant::None, line)
    }

    pub fn bool(value: bool, line: Option<u32>) -> Self {
        Expr::constant(Constant::Bool(value), line)
    }

    pub fn int(value: impl ToString, line: Option<u32>) -> Self {
        Expr::constant(Constant::Int(value.to_string()), line)
    }

    pub fn str(value: impl Into<String>, line: Option<u32>) -> Self {
        Expr::constant(Constant::Str(value.into()), line)
    }

    pub fn attribute(value: Expr, attr: impl Into<String>) -> Self {
        let line = value.line;
        Expr::new(
            ExprKind::Attribute {
                value: Box::new(value),
                attr: attr.into(),
            },
            line,
        )
    }

    pub fn subscript(value: Expr, slice: Expr) -> Self {
        let line = value.line;
        Expr::new(
            ExprKind::Subscript {
                value: Box::new(value),
                slice: Box::new(slice),
            },
            line,
        )
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        let line = func.line;
        Expr::new(
            ExprKind::Call {
                func: Box::new(func),
                args,
                keywords: Vec::new(),
            },
            line,
        )
    }

    pub fn compare(left: Expr, op: CmpOp, right: Expr) -> Self {
        let line = left.line;
        Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops: vec![op],
                comparators: vec![right],
            },
            line,
        )
    }

    pub fn bool_op(op: BoolOp, values: Vec<Expr>) -> Self {
        let line = values.first().and_then(|v| v.line);
        Expr::new(ExprKind::BoolOp { op, values }, line)
    }

    pub fn not(operand: Expr) -> Self {
        let line = operand.line;
        Expr::new(
            ExprKind::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            },
            line,
        )
    }

    /// A zero-parameter `lambda: body`.
    pub fn thunk(body: Expr) -> Self {
        let line = body.line;
        Expr::new(
            ExprKind::Lambda {
                params: Box::default(),
                body: Box::new(body),
            },
            line,
        )
    }

    /// The identifier if this is a bare `Name`.
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name(id) => Some(id),
            _ => None,
        }
    }

    /// The callee name if this is a call to a bare identifier.
    pub fn called_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Call { func, .. } => func.as_name(),
            _ => None,
        }
    }

    pub fn is_str_constant(&self) -> bool {
        matches!(self.kind, ExprKind::Constant(Constant::Str(_)))
    }
}
