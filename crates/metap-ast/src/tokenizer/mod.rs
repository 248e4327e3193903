// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tokenizer for the supported Python subset.
//!
//! Produces a flat token vector with `Newline`/`Indent`/`Dedent` structure
//! tokens. Blank and comment-only lines produce nothing; newlines inside
//! brackets and after a backslash continuation are skipped.

use thiserror::Error;


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokKind {
    Name(String),
    Number(String),
    /// A string literal. `value` is decoded for unprefixed literals; `raw` is
    /// the exact source spelling.
    Str {
        value: String,
        raw: String,
        prefixed: bool,
    },
    Op(&'static str),
    Newline,
    Indent,
    Dedent,
    EndMarker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokKind,
    /// 1-indexed line.
    pub line: u32,
    /// 0-indexed column.
    pub col: u32,
    /// Byte offsets into the source.
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokError {
    #[error("unexpected character {ch:?}")]
    BadCharacter { ch: char, line: u32, col: u32, offset: usize },
    #[error("unterminated string literal")]
    UnterminatedString { line: u32, col: u32, offset: usize },
    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent { line: u32, col: u32, offset: usize },
    #[error("unmatched closing bracket {ch:?}")]
    UnmatchedBracket { ch: char, line: u32, col: u32, offset: usize },
}

impl TokError {
    /// The (line, column, byte offset) the error points at.
    pub fn position(&self) -> (u32, u32, usize) {
        match *self {
            TokError::BadCharacter {
                line, col, offset, ..
            }
            | TokError::UnterminatedString { line, col, offset }
            | TokError::InconsistentDedent { line, col, offset }
            | TokError::UnmatchedBracket {
                line, col, offset, ..
            } => (line, col, offset),
        }
    }
}

/// Operators, longest first so that greedy matching works.
const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "->", ":=", "**", "//", "<<", ">>", "<=", ">=", "==", "!=",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=", "+", "-", "*", "/", "%", "@", "&", "|",
    "^", "~", "<", ">", "(", ")", "[", "]", "{", "}", ",", ":", ".", ";", "=",
];

const STRING_PREFIXES: &[&str] = &[
    "r", "u", "b", "f", "br", "rb", "fr", "rf", "t", "tr", "rt",
];

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    line_start: usize,
    depth: usize,
    indents: Vec<usize>,
    tokens: Vec<Token>,
}

/// Tokenize Python source text.
pub fn tokenize(src: &str) -> Result<Vec<Token>, TokError> {
    let mut tok = Tokenizer {
        src,
        pos: 0,
        line: 1,
        line_start: 0,
        depth: 0,
        indents: vec![0],
        tokens: Vec::new(),
    };
    tok.run()?;
    Ok(tok.tokens)
}

impl<'a> Tokenizer<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn col(&self) -> u32 {
        (self.pos - self.line_start) as u32
    }

    fn push(&mut self, kind: TokKind, start: usize, line: u32, col: u32) {
        self.tokens.push(Token {
            kind,
            line,
            col,
            start,
            end: self.pos,
        });
    }

    fn newline(&mut self) {
        self.line += 1;
        self.line_start = self.pos;
    }

    fn run(&mut self) -> Result<(), TokError> {
        let mut at_line_start = true;
        while self.pos < self.src.len() {
            if at_line_start && self.depth == 0 {
                at_line_start = false;
                if self.handle_indentation()? {
                    at_line_start = true;
                    continue;
                }
            }
            let Some(ch) = self.peek() else { break };
            match ch {
                ' ' | '\t' | '\x0c' => self.pos += 1,
                '\r' => self.pos += 1,
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.pos += c.len_utf8();
                    }
                }
                '\n' => {
                    let (line, col, start) = (self.line, self.col(), self.pos);
                    self.pos += 1;
                    if self.depth == 0 {
                        self.push(TokKind::Newline, start, line, col);
                        at_line_start = true;
                    }
                    self.newline();
                }
                '\\' if matches!(self.peek_at(1), Some('\n')) => {
                    self.pos += 2;
                    self.newline();
                }
                '\\' if matches!(self.peek_at(1), Some('\r')) && matches!(self.peek_at(2), Some('\n')) => {
                    self.pos += 3;
                    self.newline();
                }
                '\'' | '"' => self.string(self.pos, false)?,
                c if c.is_ascii_digit() => self.number(),
                '.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
                c if c == '_' || c.is_alphabetic() => self.name()?,
                _ => self.operator(ch)?,
            }
        }
        if !matches!(
            self.tokens.last().map(|t| &t.kind),
            None | Some(TokKind::Newline)
        ) {
            let (line, col, start) = (self.line, self.col(), self.pos);
            self.push(TokKind::Newline, start, line, col);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            let (line, col, start) = (self.line, self.col(), self.pos);
            self.push(TokKind::Dedent, start, line, col);
        }
        let (line, col, start) = (self.line, self.col(), self.pos);
        self.push(TokKind::EndMarker, start, line, col);
        Ok(())
    }

    /// Measure the indentation of a logical line and emit `Indent`/`Dedent`.
    /// Returns true when the line was blank or comment-only and was consumed.
    fn handle_indentation(&mut self) -> Result<bool, TokError> {
        let mut width = 0usize;
        let mut scan = self.pos;
        for c in self.src[self.pos..].chars() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / 8 + 1) * 8,
                '\x0c' => width = 0,
                _ => break,
            }
            scan += c.len_utf8();
        }
        let rest = &self.src[scan..];
        if rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n") || rest.starts_with('#')
        {
            // Blank or comment-only line: skip through its newline.
            match rest.find('\n') {
                Some(n) => {
                    self.pos = scan + n + 1;
                    self.newline();
                }
                None => self.pos = self.src.len(),
            }
            return Ok(true);
        }
        self.pos = scan;
        let current = self.indents.last().copied().unwrap_or(0);
        let (line, col, start) = (self.line, self.col(), self.pos);
        if width > current {
            self.indents.push(width);
            self.push(TokKind::Indent, start, line, col);
        } else if width < current {
            while self.indents.last().is_some_and(|&top| top > width) {
                self.indents.pop();
                self.push(TokKind::Dedent, start, line, col);
            }
            if self.indents.last().copied() != Some(width) {
                return Err(TokError::InconsistentDedent {
                    line,
                    col,
                    offset: start,
                });
            }
        }
        Ok(false)
    }

    fn name(&mut self) -> Result<(), TokError> {
        let (start, line, col) = (self.pos, self.line, self.col());
        while let Some(c) = self.peek() {
            if c == '_' || c.is_alphanumeric() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        let text = &self.src[start..self.pos];
        if matches!(self.peek(), Some('\'' | '"'))
            && STRING_PREFIXES.contains(&text.to_ascii_lowercase().as_str())
        {
            let decodable = text.eq_ignore_ascii_case("u");
            return self.string(start, !decodable);
        }
        self.push(TokKind::Name(text.to_string()), start, line, col);
        Ok(())
    }

    fn number(&mut self) {
        let (start, line, col) = (self.pos, self.line, self.col());
        let mut prev = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-')
                && (prev == 'e' || prev == 'E')
                && !self.src[start..self.pos].starts_with("0x")
                && !self.src[start..self.pos].starts_with("0X");
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                self.pos += 1;
                prev = c;
            } else {
                break;
            }
        }
        let text = self.src[start..self.pos].to_string();
        self.push(TokKind::Number(text), start, line, col);
    }

    /// Lex a string literal whose prefix (if any) starts at `start`; the
    /// cursor is on the opening quote.
    fn string(&mut self, start: usize, prefixed: bool) -> Result<(), TokError> {
        let line = self.line;
        let col = (start - self.line_start) as u32;
        let quote = self.peek().unwrap_or('"');
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        let raw_prefix = self.src[start..self.pos].to_ascii_lowercase().contains('r');
        self.pos += if triple { 3 } else { 1 };
        let body_start = self.pos;
        let unterminated = TokError::UnterminatedString {
            line,
            col,
            offset: start,
        };
        loop {
            let Some(c) = self.peek() else {
                return Err(unterminated);
            };
            if c == '\\' {
                self.pos += 1;
                match self.peek() {
                    Some('\n') => {
                        self.pos += 1;
                        self.newline();
                    }
                    Some(next) => self.pos += next.len_utf8(),
                    None => return Err(unterminated),
                }
                continue;
            }
            if c == '\n' {
                if !triple {
                    return Err(unterminated);
                }
                self.pos += 1;
                self.newline();
                continue;
            }
            if c == quote {
                if !triple {
                    break;
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    break;
                }
            }
            self.pos += c.len_utf8();
        }
        let body_end = self.pos;
        self.pos += if triple { 3 } else { 1 };
        let raw = self.src[start..self.pos].to_string();
        let body = &self.src[body_start..body_end];
        let value = if prefixed || raw_prefix {
            body.to_string()
        } else {
            decode_escapes(body)
        };
        self.tokens.push(Token {
            kind: TokKind::Str {
                value,
                raw,
                prefixed,
            },
            line,
            col,
            start,
            end: self.pos,
        });
        Ok(())
    }

    fn operator(&mut self, ch: char) -> Result<(), TokError> {
        let (start, line, col) = (self.pos, self.line, self.col());
        let rest = &self.src[self.pos..];
        let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
            return Err(TokError::BadCharacter {
                ch,
                line,
                col,
                offset: start,
            });
        };
        match *op {
            "(" | "[" | "{" => self.depth += 1,
            ")" | "]" | "}" => {
                if self.depth == 0 {
                    return Err(TokError::UnmatchedBracket {
                        ch,
                        line,
                        col,
                        offset: start,
                    });
                }
                self.depth -= 1;
            }
            _ => {}
        }
        self.pos += op.len();
        self.push(TokKind::Op(op), start, line, col);
        Ok(())
    }
}

/// Decode the backslash escapes of a non-raw string body.
fn decode_escapes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            'x' | 'u' | 'U' => {
                let len = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..len).filter_map(|_| chars.next()).collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == len => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}
