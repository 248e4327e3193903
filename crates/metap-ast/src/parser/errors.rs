// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::tokenizer::{TokError, TokKind, Token};

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("tokenizer error: {0}")]
    TokenizerError(#[from] TokError),
    #[error("expected {expected}, found {found} at line {line}, column {col}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: u32,
        col: u32,
        start: usize,
        end: usize,
    },
    #[error("{message} at line {line}")]
    UnsupportedSyntax {
        message: String,
        line: u32,
        col: u32,
        start: usize,
        end: usize,
    },
}

impl ParserError {
    pub(crate) fn unexpected(expected: impl Into<String>, tok: &Token) -> Self {
        ParserError::UnexpectedToken {
            expected: expected.into(),
            found: describe(&tok.kind),
            line: tok.line,
            col: tok.col,
            start: tok.start,
            end: tok.end,
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>, tok: &Token) -> Self {
        ParserError::UnsupportedSyntax {
            message: message.into(),
            line: tok.line,
            col: tok.col,
            start: tok.start,
            end: tok.end,
        }
    }

    /// 1-indexed line the error points at.
    pub fn line(&self) -> u32 {
        match self {
            ParserError::TokenizerError(e) => e.position().0,
            ParserError::UnexpectedToken { line, .. }
            | ParserError::UnsupportedSyntax { line, .. } => *line,
        }
    }

    /// Byte range the error points at.
    pub fn span(&self) -> (usize, usize) {
        match self {
            ParserError::TokenizerError(e) => {
                let offset = e.position().2;
                (offset, offset)
            }
            ParserError::UnexpectedToken { start, end, .. }
            | ParserError::UnsupportedSyntax { start, end, .. } => (*start, *end),
        }
    }
}

fn describe(kind: &TokKind) -> String {
    match kind {
        TokKind::Name(n) => format!("'{}'", n),
        TokKind::Number(n) => format!("'{}'", n),
        TokKind::Str { .. } => "string literal".to_string(),
        TokKind::Op(op) => format!("'{}'", op),
        TokKind::Newline => "newline".to_string(),
        TokKind::Indent => "indent".to_string(),
        TokKind::Dedent => "dedent".to_string(),
        TokKind::EndMarker => "end of input".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;
