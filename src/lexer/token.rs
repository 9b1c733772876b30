use std::fmt::{self, Display};

use serde::Serialize;

/// Every distinct kind of token the grammar in `spec.md` §4.2 can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LParen,
    RParen,
    IntType,
    StringType,
    BooleanType,
    If,
    Else,
    While,
    Print,
    Assign,
    Equals,
    NotEquals,
    Plus,
    /// A single digit `0`–`9`, stored as its numeric value.
    Digit(u8),
    Quote,
    /// A single accepted character inside a string literal (a space or
    /// `a`–`z`); emitted one-per-character between two `Quote` tokens.
    Char(char),
    BooleanValue(bool),
    /// A single-character identifier. The grammar restricts identifiers to
    /// one lowercase letter; the lexer tolerates keyword-prefixed runs by
    /// emitting one identifier token per un-consumed leading character
    /// (spec.md §4.1).
    Identifier(char),
    Eop,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::IntType => write!(f, "int"),
            TokenKind::StringType => write!(f, "string"),
            TokenKind::BooleanType => write!(f, "boolean"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::While => write!(f, "while"),
            TokenKind::Print => write!(f, "print"),
            TokenKind::Assign => write!(f, "="),
            TokenKind::Equals => write!(f, "=="),
            TokenKind::NotEquals => write!(f, "!="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Digit(d) => write!(f, "{d}"),
            TokenKind::Quote => write!(f, "\""),
            TokenKind::Char(c) => write!(f, "{c}"),
            TokenKind::BooleanValue(b) => write!(f, "{b}"),
            TokenKind::Identifier(c) => write!(f, "{c}"),
            TokenKind::Eop => write!(f, "$"),
        }
    }
}

/// A tagged, position-carrying token (spec.md §3 "Token").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        let lexeme = kind.to_string();
        Self {
            kind,
            lexeme,
            line,
            column,
        }
    }

    /// Whether this token can begin a `statement` production; used by the
    /// parser's error-recovery synchronization (spec.md §4.2).
    pub fn starts_statement(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::IntType
                | TokenKind::StringType
                | TokenKind::BooleanType
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
        )
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}
