// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recursive-descent parser over the token vector.
//!
//! Every node records the line of its first token. The grammar follows
//! CPython's, restricted to the subset listed in the crate docs.

mod errors;

pub use errors::{ParserError, Result};

use crate::nodes::{
    Alias, BinOp, BoolOp, ClassDef, CmpOp, Comprehension, Constant, ExceptHandler, Expr, ExprKind,
    FunctionDef, If, Keyword, Module, Param, Parameters, Stmt, StmtKind, UnaryOp, WithItem,
};
use crate::tokenizer::{TokKind, Token};

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

/// Parse a complete module.
pub fn parse_module(src: &str) -> Result<Module> {
    let tokens = crate::tokenizer::tokenize(src)?;
    tracing::trace!(tokens = tokens.len(), "tokenized module");
    let module = Parser::new(tokens).parse_module()?;
    tracing::debug!(statements = module.body.len(), "parsed module");
    Ok(module)
}

/// Parse a single expression (a bare tuple is allowed).
pub fn parse_expression(src: &str) -> Result<Expr> {
    let tokens = crate::tokenizer::tokenize(src)?;
    Parser::new(tokens).parse_expression_input()
}

/// Parse source holding exactly one statement (which may be compound).
pub fn parse_statement(src: &str) -> Result<Stmt> {
    let tokens = crate::tokenizer::tokenize(src)?;
    let mut parser = Parser::new(tokens);
    let mut body = parser.parse_module()?.body;
    if body.len() != 1 {
        return Err(ParserError::unsupported(
            format!("expected exactly one statement, found {}", body.len()),
            parser.peek(),
        ));
    }
    Ok(body.remove(0))
}

/// Deepest nesting of expressions and blocks the parser descends into.
const MAX_NESTING: usize = 50;

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Run `parse` one nesting level down.
    fn nested<T>(&mut self, parse: fn(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return Err(ParserError::unsupported(
                format!("nesting deeper than {} levels is not supported", MAX_NESTING),
                self.peek(),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn line(&self) -> Option<u32> {
        Some(self.peek().line)
    }

    fn at_end(&self) -> bool {
        matches!(self.peek().kind, TokKind::EndMarker)
    }

    fn is_op(&self, op: &str) -> bool {
        matches!(self.peek().kind, TokKind::Op(o) if o == op)
    }

    fn is_kw(&self, kw: &str) -> bool {
        matches!(&self.peek().kind, TokKind::Name(n) if n == kw)
    }

    fn is_newline(&self) -> bool {
        matches!(self.peek().kind, TokKind::Newline)
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.is_op(op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        if self.is_kw(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_op(&mut self, op: &str) -> Result<Token> {
        if self.is_op(op) {
            Ok(self.advance())
        } else {
            Err(ParserError::unexpected(format!("'{}'", op), self.peek()))
        }
    }

    fn expect_kw(&mut self, kw: &str) -> Result<Token> {
        if self.is_kw(kw) {
            Ok(self.advance())
        } else {
            Err(ParserError::unexpected(format!("'{}'", kw), self.peek()))
        }
    }

    fn expect_name(&mut self) -> Result<String> {
        match &self.peek().kind {
            TokKind::Name(n) if !KEYWORDS.contains(&n.as_str()) => {
                let n = n.clone();
                self.pos += 1;
                Ok(n)
            }
            _ => Err(ParserError::unexpected("identifier", self.peek())),
        }
    }

    fn expect_newline(&mut self) -> Result<()> {
        if self.is_newline() {
            self.pos += 1;
            Ok(())
        } else if self.at_end() {
            Ok(())
        } else {
            Err(ParserError::unexpected("newline", self.peek()))
        }
    }

    /// True when the current token can begin an expression.
    fn starts_expression(&self) -> bool {
        match &self.peek().kind {
            TokKind::Name(n) => {
                !KEYWORDS.contains(&n.as_str())
                    || matches!(
                        n.as_str(),
                        "not" | "lambda" | "None" | "True" | "False" | "await"
                    )
            }
            TokKind::Number(_) | TokKind::Str { .. } => true,
            TokKind::Op(op) => matches!(*op, "(" | "[" | "{" | "-" | "+" | "~" | "*" | "..."),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Module and statements
    // ------------------------------------------------------------------

    pub(crate) fn parse_module(&mut self) -> Result<Module> {
        let mut body = Vec::new();
        while !self.at_end() {
            if self.is_newline() {
                self.pos += 1;
                continue;
            }
            body.extend(self.statement()?);
        }
        Ok(Module { body })
    }

    pub(crate) fn parse_expression_input(&mut self) -> Result<Expr> {
        let expr = self.testlist_star_expr()?;
        while self.is_newline() {
            self.pos += 1;
        }
        if !self.at_end() {
            return Err(ParserError::unexpected("end of input", self.peek()));
        }
        Ok(expr)
    }

    fn statement(&mut self) -> Result<Vec<Stmt>> {
        if self.is_op("@") {
            return Ok(vec![self.decorated()?]);
        }
        let kw = match &self.peek().kind {
            TokKind::Name(n) => n.clone(),
            _ => return self.simple_statements(),
        };
        match kw.as_str() {
            "if" => Ok(vec![self.if_stmt()?]),
            "while" => Ok(vec![self.while_stmt()?]),
            "for" => Ok(vec![self.for_stmt()?]),
            "def" => Ok(vec![self.funcdef(Vec::new())?]),
            "class" => Ok(vec![self.classdef(Vec::new())?]),
            "with" => Ok(vec![self.with_stmt()?]),
            "try" => Ok(vec![self.try_stmt()?]),
            "async" => Err(ParserError::unsupported(
                "async statements are not supported",
                self.peek(),
            )),
            _ => self.simple_statements(),
        }
    }

    fn simple_statements(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = vec![self.small_statement()?];
        while self.eat_op(";") {
            if self.is_newline() || self.at_end() {
                break;
            }
            stmts.push(self.small_statement()?);
        }
        self.expect_newline()?;
        Ok(stmts)
    }

    /// `':' suite` where suite is either an indented block or simple
    /// statements on the same line.
    fn block(&mut self) -> Result<Vec<Stmt>> {
        self.nested(Self::suite)
    }

    fn suite(&mut self) -> Result<Vec<Stmt>> {
        self.expect_op(":")?;
        if !self.is_newline() {
            return self.simple_statements();
        }
        self.pos += 1;
        if !matches!(self.peek().kind, TokKind::Indent) {
            return Err(ParserError::unexpected("indented block", self.peek()));
        }
        self.pos += 1;
        let mut body = Vec::new();
        loop {
            match self.peek().kind {
                TokKind::Dedent => {
                    self.pos += 1;
                    break;
                }
                TokKind::EndMarker => break,
                TokKind::Newline => self.pos += 1,
                _ => body.extend(self.statement()?),
            }
        }
        Ok(body)
    }

    fn if_stmt(&mut self) -> Result<Stmt> {
        let tok = self.advance();
        let is_elif = matches!(&tok.kind, TokKind::Name(n) if n == "elif");
        let test = self.named_expr_test()?;
        let body = self.block()?;
        let orelse = if self.is_kw("elif") {
            vec![self.if_stmt()?]
        } else if self.eat_kw("else") {
            self.block()?
        } else {
            Vec::new()
        };
        Ok(Stmt::new(
            StmtKind::If(Box::new(If {
                test,
                body,
                orelse,
                is_elif,
            })),
            Some(tok.line),
        ))
    }

    fn while_stmt(&mut self) -> Result<Stmt> {
        let line = Some(self.advance().line);
        let test = self.named_expr_test()?;
        let body = self.block()?;
        let orelse = if self.eat_kw("else") {
            self.block()?
        } else {
            Vec::new()
        };
        Ok(Stmt::new(StmtKind::While { test, body, orelse }, line))
    }

    fn for_stmt(&mut self) -> Result<Stmt> {
        let line = Some(self.advance().line);
        let target = self.target_list()?;
        self.expect_kw("in")?;
        let iter = self.testlist_star_expr()?;
        let body = self.block()?;
        let orelse = if self.eat_kw("else") {
            self.block()?
        } else {
            Vec::new()
        };
        Ok(Stmt::new(
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            },
            line,
        ))
    }

    fn with_stmt(&mut self) -> Result<Stmt> {
        let line = Some(self.advance().line);
        let mut items = Vec::new();
        loop {
            let context = self.test()?;
            let target = if self.eat_kw("as") {
                Some(self.star_or_bitor()?)
            } else {
                None
            };
            items.push(WithItem { context, target });
            if !self.eat_op(",") {
                break;
            }
        }
        let body = self.block()?;
        Ok(Stmt::new(StmtKind::With { items, body }, line))
    }

    fn try_stmt(&mut self) -> Result<Stmt> {
        let try_tok = self.advance();
        let body = self.block()?;
        let mut handlers = Vec::new();
        while self.is_kw("except") {
            let line = Some(self.advance().line);
            let mut kind = None;
            let mut name = None;
            if !self.is_op(":") {
                kind = Some(self.test()?);
                if self.eat_kw("as") {
                    name = Some(self.expect_name()?);
                }
            }
            let body = self.block()?;
            handlers.push(ExceptHandler {
                kind,
                name,
                body,
                line,
            });
        }
        let orelse = if self.eat_kw("else") {
            self.block()?
        } else {
            Vec::new()
        };
        let finalbody = if self.eat_kw("finally") {
            self.block()?
        } else {
            Vec::new()
        };
        if handlers.is_empty() && finalbody.is_empty() {
            return Err(ParserError::unexpected("'except' or 'finally'", self.peek()));
        }
        Ok(Stmt::new(
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            },
            Some(try_tok.line),
        ))
    }

    fn decorated(&mut self) -> Result<Stmt> {
        let mut decorators = Vec::new();
        while self.eat_op("@") {
            decorators.push(self.named_expr_test()?);
            self.expect_newline()?;
        }
        if self.is_kw("def") {
            self.funcdef(decorators)
        } else if self.is_kw("class") {
            self.classdef(decorators)
        } else {
            Err(ParserError::unexpected("'def' or 'class'", self.peek()))
        }
    }

    fn funcdef(&mut self, decorators: Vec<Expr>) -> Result<Stmt> {
        let line = Some(self.expect_kw("def")?.line);
        let name = self.expect_name()?;
        self.expect_op("(")?;
        let params = self.parameters(")", true)?;
        self.expect_op(")")?;
        let returns = if self.eat_op("->") {
            Some(self.test()?)
        } else {
            None
        };
        let body = self.block()?;
        Ok(Stmt::new(
            StmtKind::FunctionDef(Box::new(FunctionDef {
                name,
                params,
                body,
                decorators,
                returns,
            })),
            line,
        ))
    }

    fn classdef(&mut self, decorators: Vec<Expr>) -> Result<Stmt> {
        let line = Some(self.expect_kw("class")?.line);
        let name = self.expect_name()?;
        let (bases, keywords) = if self.eat_op("(") {
            self.call_args()?
        } else {
            (Vec::new(), Vec::new())
        };
        let body = self.block()?;
        Ok(Stmt::new(
            StmtKind::ClassDef(Box::new(ClassDef {
                name,
                bases,
                keywords,
                body,
                decorators,
            })),
            line,
        ))
    }

    /// Parameter list up to (not including) `close`. Lambdas pass
    /// `annotated = false`.
    fn parameters(&mut self, close: &str, annotated: bool) -> Result<Parameters> {
        let mut params = Parameters::default();
        let mut after_star = false;
        while !self.is_op(close) {
            if self.eat_op("/") {
                params.posonly = std::mem::take(&mut params.args);
            } else if self.eat_op("**") {
                params.kwarg = Some(self.param(annotated, false)?);
            } else if self.eat_op("*") {
                after_star = true;
                if !self.is_op(",") && !self.is_op(close) {
                    params.vararg = Some(self.param(annotated, false)?);
                }
            } else {
                let param = self.param(annotated, true)?;
                if after_star {
                    params.kwonly.push(param);
                } else {
                    params.args.push(param);
                }
            }
            if !self.eat_op(",") {
                break;
            }
        }
        Ok(params)
    }

    fn param(&mut self, annotated: bool, allow_default: bool) -> Result<Param> {
        let name = self.expect_name()?;
        let annotation = if annotated && self.eat_op(":") {
            Some(self.test()?)
        } else {
            None
        };
        let default = if allow_default && self.eat_op("=") {
            Some(self.test()?)
        } else {
            None
        };
        Ok(Param {
            name,
            annotation,
            default,
        })
    }

    fn small_statement(&mut self) -> Result<Stmt> {
        let line = self.line();
        let kw = match &self.peek().kind {
            TokKind::Name(n) => n.clone(),
            _ => String::new(),
        };
        let kind = match kw.as_str() {
            "pass" => {
                self.pos += 1;
                StmtKind::Pass
            }
            "break" => {
                self.pos += 1;
                StmtKind::Break
            }
            "continue" => {
                self.pos += 1;
                StmtKind::Continue
            }
            "return" => {
                self.pos += 1;
                if self.starts_expression() {
                    StmtKind::Return(Some(self.testlist_star_expr()?))
                } else {
                    StmtKind::Return(None)
                }
            }
            "raise" => {
                self.pos += 1;
                let exc = if self.starts_expression() {
                    Some(self.test()?)
                } else {
                    None
                };
                let cause = if exc.is_some() && self.eat_kw("from") {
                    Some(self.test()?)
                } else {
                    None
                };
                StmtKind::Raise { exc, cause }
            }
            "global" | "nonlocal" => {
                self.pos += 1;
                let mut names = vec![self.expect_name()?];
                while self.eat_op(",") {
                    names.push(self.expect_name()?);
                }
                if kw == "global" {
                    StmtKind::Global(names)
                } else {
                    StmtKind::Nonlocal(names)
                }
            }
            "del" => {
                self.pos += 1;
                let mut targets = vec![self.star_or_bitor()?];
                while self.eat_op(",") {
                    if !self.starts_expression() {
                        break;
                    }
                    targets.push(self.star_or_bitor()?);
                }
                StmtKind::Delete(targets)
            }
            "assert" => {
                self.pos += 1;
                let test = self.test()?;
                let msg = if self.eat_op(",") {
                    Some(self.test()?)
                } else {
                    None
                };
                StmtKind::Assert { test, msg }
            }
            "import" => {
                self.pos += 1;
                let mut names = vec![self.dotted_alias()?];
                while self.eat_op(",") {
                    names.push(self.dotted_alias()?);
                }
                StmtKind::Import(names)
            }
            "from" => self.import_from()?,
            _ => return self.expression_statement(),
        };
        Ok(Stmt::new(kind, line))
    }

    fn dotted_name(&mut self) -> Result<String> {
        let mut name = self.expect_name()?;
        while self.is_op(".") {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.expect_name()?);
        }
        Ok(name)
    }

    fn dotted_alias(&mut self) -> Result<Alias> {
        let name = self.dotted_name()?;
        let asname = if self.eat_kw("as") {
            Some(self.expect_name()?)
        } else {
            None
        };
        Ok(Alias { name, asname })
    }

    fn import_from(&mut self) -> Result<StmtKind> {
        self.expect_kw("from")?;
        let mut level = 0;
        loop {
            if self.eat_op(".") {
                level += 1;
            } else if self.eat_op("...") {
                level += 3;
            } else {
                break;
            }
        }
        let module = if self.is_kw("import") {
            None
        } else {
            Some(self.dotted_name()?)
        };
        self.expect_kw("import")?;
        let mut names = Vec::new();
        if self.eat_op("*") {
            names.push(Alias {
                name: "*".to_string(),
                asname: None,
            });
        } else {
            let parenthesized = self.eat_op("(");
            loop {
                let name = self.expect_name()?;
                let asname = if self.eat_kw("as") {
                    Some(self.expect_name()?)
                } else {
                    None
                };
                names.push(Alias { name, asname });
                if !self.eat_op(",") {
                    break;
                }
                if parenthesized && self.is_op(")") {
                    break;
                }
            }
            if parenthesized {
                self.expect_op(")")?;
            }
        }
        Ok(StmtKind::ImportFrom {
            module,
            names,
            level,
        })
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let line = self.line();
        let first = self.yield_or_testlist()?;
        if self.is_op("=") {
            let mut targets = vec![first];
            let value = loop {
                self.expect_op("=")?;
                let next = self.yield_or_testlist()?;
                if !self.is_op("=") {
                    break next;
                }
                targets.push(next);
            };
            return Ok(Stmt::new(StmtKind::Assign { targets, value }, line));
        }
        if self.eat_op(":") {
            let annotation = self.test()?;
            let value = if self.eat_op("=") {
                Some(self.yield_or_testlist()?)
            } else {
                None
            };
            return Ok(Stmt::new(
                StmtKind::AnnAssign {
                    target: first,
                    annotation,
                    value,
                },
                line,
            ));
        }
        if let TokKind::Op(op) = self.peek().kind {
            if let Some(op) = BinOp::from_augmented(op) {
                self.pos += 1;
                let value = self.yield_or_testlist()?;
                return Ok(Stmt::new(
                    StmtKind::AugAssign {
                        target: first,
                        op,
                        value,
                    },
                    line,
                ));
            }
        }
        Ok(Stmt::new(StmtKind::Expr(first), line))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn yield_or_testlist(&mut self) -> Result<Expr> {
        if self.is_kw("yield") {
            self.yield_expr()
        } else {
            self.testlist_star_expr()
        }
    }

    fn yield_expr(&mut self) -> Result<Expr> {
        let line = Some(self.expect_kw("yield")?.line);
        if self.eat_kw("from") {
            let value = self.test()?;
            return Ok(Expr::new(ExprKind::YieldFrom(Box::new(value)), line));
        }
        let value = if self.starts_expression() {
            Some(Box::new(self.testlist_star_expr()?))
        } else {
            None
        };
        Ok(Expr::new(ExprKind::Yield(value), line))
    }

    /// Comma-separated expressions; a bare comma makes a tuple.
    fn testlist_star_expr(&mut self) -> Result<Expr> {
        let first = self.star_or_test()?;
        if !self.is_op(",") {
            return Ok(first);
        }
        let line = first.line;
        let mut elts = vec![first];
        while self.eat_op(",") {
            if !self.starts_expression() {
                break;
            }
            elts.push(self.star_or_test()?);
        }
        Ok(Expr::new(ExprKind::Tuple(elts), line))
    }

    fn star_or_test(&mut self) -> Result<Expr> {
        if self.is_op("*") {
            let line = Some(self.advance().line);
            let value = self.bitor()?;
            return Ok(Expr::new(ExprKind::Starred(Box::new(value)), line));
        }
        self.test()
    }

    fn star_or_named(&mut self) -> Result<Expr> {
        if self.is_op("*") {
            return self.star_or_test();
        }
        self.named_expr_test()
    }

    fn star_or_bitor(&mut self) -> Result<Expr> {
        if self.is_op("*") {
            let line = Some(self.advance().line);
            let value = self.bitor()?;
            return Ok(Expr::new(ExprKind::Starred(Box::new(value)), line));
        }
        self.bitor()
    }

    /// Assignment targets of `for` and comprehensions; stops before `in`.
    fn target_list(&mut self) -> Result<Expr> {
        let first = self.star_or_bitor()?;
        if !self.is_op(",") {
            return Ok(first);
        }
        let line = first.line;
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.is_kw("in") || !self.starts_expression() {
                break;
            }
            elts.push(self.star_or_bitor()?);
        }
        Ok(Expr::new(ExprKind::Tuple(elts), line))
    }

    fn named_expr_test(&mut self) -> Result<Expr> {
        let expr = self.test()?;
        if self.is_op(":=") {
            if expr.as_name().is_none() {
                return Err(ParserError::unsupported(
                    "assignment expression target must be an identifier",
                    self.peek(),
                ));
            }
            self.pos += 1;
            let value = self.test()?;
            let line = expr.line;
            return Ok(Expr::new(
                ExprKind::NamedExpr {
                    target: Box::new(expr),
                    value: Box::new(value),
                },
                line,
            ));
        }
        Ok(expr)
    }

    fn test(&mut self) -> Result<Expr> {
        self.nested(Self::conditional)
    }

    fn conditional(&mut self) -> Result<Expr> {
        if self.is_kw("lambda") {
            return self.lambda();
        }
        let body = self.or_test()?;
        if !self.is_kw("if") {
            return Ok(body);
        }
        self.pos += 1;
        let test = self.or_test()?;
        self.expect_kw("else")?;
        let orelse = self.test()?;
        let line = body.line;
        Ok(Expr::new(
            ExprKind::IfExp {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            },
            line,
        ))
    }

    fn lambda(&mut self) -> Result<Expr> {
        let line = Some(self.expect_kw("lambda")?.line);
        let params = self.parameters(":", false)?;
        self.expect_op(":")?;
        let body = self.test()?;
        Ok(Expr::new(
            ExprKind::Lambda {
                params: Box::new(params),
                body: Box::new(body),
            },
            line,
        ))
    }

    fn or_test(&mut self) -> Result<Expr> {
        self.bool_chain("or", BoolOp::Or, Self::and_test)
    }

    fn and_test(&mut self) -> Result<Expr> {
        self.bool_chain("and", BoolOp::And, Self::not_test)
    }

    fn bool_chain(
        &mut self,
        kw: &str,
        op: BoolOp,
        operand: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let first = operand(self)?;
        if !self.is_kw(kw) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_kw(kw) {
            values.push(operand(self)?);
        }
        Ok(Expr::bool_op(op, values))
    }

    fn not_test(&mut self) -> Result<Expr> {
        if self.is_kw("not") {
            let line = Some(self.advance().line);
            let operand = self.nested(Self::not_test)?;
            return Ok(Expr::new(
                ExprKind::UnaryOp {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                line,
            ));
        }
        self.comparison()
    }

    fn comparison_op(&mut self) -> Option<CmpOp> {
        let next_is = |p: &Self, kw: &str| matches!(&p.peek_nth(1).kind, TokKind::Name(m) if m == kw);
        let (op, width) = match &self.peek().kind {
            TokKind::Op("==") => (CmpOp::Eq, 1),
            TokKind::Op("!=") => (CmpOp::NotEq, 1),
            TokKind::Op("<") => (CmpOp::Lt, 1),
            TokKind::Op("<=") => (CmpOp::LtE, 1),
            TokKind::Op(">") => (CmpOp::Gt, 1),
            TokKind::Op(">=") => (CmpOp::GtE, 1),
            TokKind::Name(n) if n == "in" => (CmpOp::In, 1),
            TokKind::Name(n) if n == "is" && next_is(self, "not") => (CmpOp::IsNot, 2),
            TokKind::Name(n) if n == "is" => (CmpOp::Is, 1),
            TokKind::Name(n) if n == "not" && next_is(self, "in") => (CmpOp::NotIn, 2),
            _ => return None,
        };
        self.pos += width;
        Some(op)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let left = self.bitor()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some(op) = self.comparison_op() {
            ops.push(op);
            comparators.push(self.bitor()?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        let line = left.line;
        Ok(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
                comparators,
            },
            line,
        ))
    }

    fn binary_level(
        &mut self,
        table: &[(&str, BinOp)],
        operand: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut left = operand(self)?;
        loop {
            let Some(op) = table
                .iter()
                .find(|(text, _)| self.is_op(text))
                .map(|(_, op)| *op)
            else {
                return Ok(left);
            };
            self.pos += 1;
            let right = operand(self)?;
            let line = left.line;
            left = Expr::new(
                ExprKind::BinOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                line,
            );
        }
    }

    fn bitor(&mut self) -> Result<Expr> {
        self.binary_level(&[("|", BinOp::BitOr)], Self::bitxor)
    }

    fn bitxor(&mut self) -> Result<Expr> {
        self.binary_level(&[("^", BinOp::BitXor)], Self::bitand)
    }

    fn bitand(&mut self) -> Result<Expr> {
        self.binary_level(&[("&", BinOp::BitAnd)], Self::shift)
    }

    fn shift(&mut self) -> Result<Expr> {
        self.binary_level(
            &[("<<", BinOp::LShift), (">>", BinOp::RShift)],
            Self::arith,
        )
    }

    fn arith(&mut self) -> Result<Expr> {
        self.binary_level(&[("+", BinOp::Add), ("-", BinOp::Sub)], Self::term)
    }

    fn term(&mut self) -> Result<Expr> {
        self.binary_level(
            &[
                ("*", BinOp::Mult),
                ("/", BinOp::Div),
                ("//", BinOp::FloorDiv),
                ("%", BinOp::Mod),
                ("@", BinOp::MatMult),
            ],
            Self::factor,
        )
    }

    fn factor(&mut self) -> Result<Expr> {
        let op = match self.peek().kind {
            TokKind::Op("-") => UnaryOp::USub,
            TokKind::Op("+") => UnaryOp::UAdd,
            TokKind::Op("~") => UnaryOp::Invert,
            _ => return self.power(),
        };
        let line = Some(self.advance().line);
        let operand = self.nested(Self::factor)?;
        Ok(Expr::new(
            ExprKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            line,
        ))
    }

    fn power(&mut self) -> Result<Expr> {
        if self.is_kw("await") {
            return Err(ParserError::unsupported(
                "await expressions are not supported",
                self.peek(),
            ));
        }
        let base = self.atom_expr()?;
        if !self.eat_op("**") {
            return Ok(base);
        }
        let exponent = self.factor()?;
        let line = base.line;
        Ok(Expr::new(
            ExprKind::BinOp {
                left: Box::new(base),
                op: BinOp::Pow,
                right: Box::new(exponent),
            },
            line,
        ))
    }

    fn atom_expr(&mut self) -> Result<Expr> {
        let mut expr = self.atom()?;
        loop {
            if self.eat_op("(") {
                let (args, keywords) = self.call_args()?;
                let line = expr.line;
                expr = Expr::new(
                    ExprKind::Call {
                        func: Box::new(expr),
                        args,
                        keywords,
                    },
                    line,
                );
            } else if self.eat_op("[") {
                let slice = self.subscript_list()?;
                expr = Expr::subscript(expr, slice);
            } else if self.eat_op(".") {
                let attr = self.expect_name()?;
                expr = Expr::attribute(expr, attr);
            } else {
                return Ok(expr);
            }
        }
    }

    /// Arguments after an opening `(`, consuming the closing `)`.
    fn call_args(&mut self) -> Result<(Vec<Expr>, Vec<Keyword>)> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        while !self.is_op(")") {
            if self.eat_op("**") {
                keywords.push(Keyword {
                    arg: None,
                    value: self.test()?,
                });
            } else if self.is_op("*") {
                args.push(self.star_or_test()?);
            } else if matches!(self.peek().kind, TokKind::Name(_))
                && matches!(self.peek_nth(1).kind, TokKind::Op("="))
            {
                let arg = self.expect_name()?;
                self.pos += 1;
                keywords.push(Keyword {
                    arg: Some(arg),
                    value: self.test()?,
                });
            } else {
                let expr = self.named_expr_test()?;
                if self.is_kw("for") {
                    let generators = self.comprehension()?;
                    let line = expr.line;
                    args.push(Expr::new(
                        ExprKind::GeneratorExp {
                            elt: Box::new(expr),
                            generators,
                        },
                        line,
                    ));
                } else {
                    args.push(expr);
                }
            }
            if !self.eat_op(",") {
                break;
            }
        }
        self.expect_op(")")?;
        Ok((args, keywords))
    }

    /// Subscript contents after `[`, consuming the closing `]`.
    fn subscript_list(&mut self) -> Result<Expr> {
        let first = self.slice_item()?;
        if !self.is_op(",") {
            self.expect_op("]")?;
            return Ok(first);
        }
        let line = first.line;
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.is_op("]") {
                break;
            }
            elts.push(self.slice_item()?);
        }
        self.expect_op("]")?;
        Ok(Expr::new(ExprKind::Tuple(elts), line))
    }

    fn slice_item(&mut self) -> Result<Expr> {
        let line = self.line();
        let lower = if self.is_op(":") {
            None
        } else {
            let expr = self.star_or_test()?;
            if !self.is_op(":") {
                return Ok(expr);
            }
            Some(Box::new(expr))
        };
        self.expect_op(":")?;
        let upper = if self.is_op(":") || self.is_op("]") || self.is_op(",") {
            None
        } else {
            Some(Box::new(self.test()?))
        };
        let step = if self.eat_op(":") && !self.is_op("]") && !self.is_op(",") {
            Some(Box::new(self.test()?))
        } else {
            None
        };
        Ok(Expr::new(ExprKind::Slice { lower, upper, step }, line))
    }

    fn comprehension(&mut self) -> Result<Vec<Comprehension>> {
        let mut generators = Vec::new();
        while self.eat_kw("for") {
            let target = self.target_list()?;
            self.expect_kw("in")?;
            let iter = self.or_test()?;
            let mut ifs = Vec::new();
            while self.eat_kw("if") {
                ifs.push(self.or_test()?);
            }
            generators.push(Comprehension { target, iter, ifs });
        }
        Ok(generators)
    }

    fn atom(&mut self) -> Result<Expr> {
        let tok = self.peek().clone();
        let line = Some(tok.line);
        match &tok.kind {
            TokKind::Op("(") => {
                self.pos += 1;
                self.paren_atom(line)
            }
            TokKind::Op("[") => {
                self.pos += 1;
                self.list_atom(line)
            }
            TokKind::Op("{") => {
                self.pos += 1;
                self.brace_atom(line)
            }
            TokKind::Op("...") => {
                self.pos += 1;
                Ok(Expr::constant(Constant::Ellipsis, line))
            }
            TokKind::Number(text) => {
                self.pos += 1;
                let lower = text.to_ascii_lowercase();
                let is_float = !lower.starts_with("0x")
                    && (lower.contains('.') || lower.contains('e') || lower.ends_with('j'));
                let value = if is_float {
                    Constant::Float(text.clone())
                } else {
                    Constant::Int(text.clone())
                };
                Ok(Expr::constant(value, line))
            }
            TokKind::Str { .. } => self.strings(line),
            TokKind::Name(n) => match n.as_str() {
                "None" => {
                    self.pos += 1;
                    Ok(Expr::none(line))
                }
                "True" | "False" => {
                    self.pos += 1;
                    Ok(Expr::bool(n == "True", line))
                }
                kw if KEYWORDS.contains(&kw) => Err(ParserError::unexpected("expression", &tok)),
                _ => {
                    self.pos += 1;
                    Ok(Expr::name(n.clone(), line))
                }
            },
            _ => Err(ParserError::unexpected("expression", &tok)),
        }
    }

    /// Adjacent string literals concatenate. Mixing in a prefixed literal
    /// keeps the whole run verbatim.
    fn strings(&mut self, line: Option<u32>) -> Result<Expr> {
        let mut values = String::new();
        let mut raws = Vec::new();
        let mut any_prefixed = false;
        while let TokKind::Str {
            value,
            raw,
            prefixed,
        } = &self.peek().kind
        {
            values.push_str(value);
            raws.push(raw.clone());
            any_prefixed |= *prefixed;
            self.pos += 1;
        }
        if any_prefixed {
            Ok(Expr::new(ExprKind::Verbatim(raws.join(" ")), line))
        } else {
            Ok(Expr::str(values, line))
        }
    }

    fn paren_atom(&mut self, line: Option<u32>) -> Result<Expr> {
        if self.eat_op(")") {
            return Ok(Expr::new(ExprKind::Tuple(Vec::new()), line));
        }
        if self.is_kw("yield") {
            let expr = self.yield_expr()?;
            self.expect_op(")")?;
            return Ok(expr);
        }
        let first = self.star_or_named()?;
        if self.is_kw("for") {
            let generators = self.comprehension()?;
            self.expect_op(")")?;
            return Ok(Expr::new(
                ExprKind::GeneratorExp {
                    elt: Box::new(first),
                    generators,
                },
                line,
            ));
        }
        if !self.is_op(",") {
            self.expect_op(")")?;
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.is_op(")") {
                break;
            }
            elts.push(self.star_or_named()?);
        }
        self.expect_op(")")?;
        Ok(Expr::new(ExprKind::Tuple(elts), line))
    }

    fn list_atom(&mut self, line: Option<u32>) -> Result<Expr> {
        if self.eat_op("]") {
            return Ok(Expr::new(ExprKind::List(Vec::new()), line));
        }
        let first = self.star_or_named()?;
        if self.is_kw("for") {
            let generators = self.comprehension()?;
            self.expect_op("]")?;
            return Ok(Expr::new(
                ExprKind::ListComp {
                    elt: Box::new(first),
                    generators,
                },
                line,
            ));
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.is_op("]") {
                break;
            }
            elts.push(self.star_or_named()?);
        }
        self.expect_op("]")?;
        Ok(Expr::new(ExprKind::List(elts), line))
    }

    fn brace_atom(&mut self, line: Option<u32>) -> Result<Expr> {
        if self.eat_op("}") {
            return Ok(Expr::new(
                ExprKind::Dict {
                    keys: Vec::new(),
                    values: Vec::new(),
                },
                line,
            ));
        }
        let (first_key, first_value) = if self.eat_op("**") {
            (None, Some(self.bitor()?))
        } else {
            let key = self.star_or_test()?;
            if self.eat_op(":") {
                (Some(key), Some(self.test()?))
            } else {
                (Some(key), None)
            }
        };
        match (first_key, first_value) {
            (key, Some(value)) => self.dict_rest(key, value, line),
            (Some(elt), None) => self.set_rest(elt, line),
            (None, None) => Err(ParserError::unexpected("expression", self.peek())),
        }
    }

    fn dict_rest(&mut self, key: Option<Expr>, value: Expr, line: Option<u32>) -> Result<Expr> {
        if self.is_kw("for") {
            let Some(key) = key else {
                return Err(ParserError::unsupported(
                    "dict unpacking cannot be used in a comprehension",
                    self.peek(),
                ));
            };
            let generators = self.comprehension()?;
            self.expect_op("}")?;
            return Ok(Expr::new(
                ExprKind::DictComp {
                    key: Box::new(key),
                    value: Box::new(value),
                    generators,
                },
                line,
            ));
        }
        let mut keys = vec![key];
        let mut values = vec![value];
        while self.eat_op(",") {
            if self.is_op("}") {
                break;
            }
            if self.eat_op("**") {
                keys.push(None);
                values.push(self.bitor()?);
            } else {
                keys.push(Some(self.test()?));
                self.expect_op(":")?;
                values.push(self.test()?);
            }
        }
        self.expect_op("}")?;
        Ok(Expr::new(ExprKind::Dict { keys, values }, line))
    }

    fn set_rest(&mut self, first: Expr, line: Option<u32>) -> Result<Expr> {
        if self.is_kw("for") {
            let generators = self.comprehension()?;
            self.expect_op("}")?;
            return Ok(Expr::new(
                ExprKind::SetComp {
                    elt: Box::new(first),
                    generators,
                },
                line,
            ));
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.is_op("}") {
                break;
            }
            elts.push(self.star_or_test()?);
        }
        self.expect_op("}")?;
        Ok(Expr::new(ExprKind::Set(elts), line))
    }
}
