use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::lexer::Token;

/// A concrete syntax tree node: either a terminal (carrying the matched
/// token) or a non-terminal (carrying only children) — spec.md §3.
#[derive(Debug, Clone, Serialize)]
pub struct CstNode {
    pub name: &'static str,
    pub token: Option<Token>,
    pub children: Vec<CstNode>,
}

impl CstNode {
    pub fn terminal(name: &'static str, token: Token) -> Self {
        Self {
            name,
            token: Some(token),
            children: Vec::new(),
        }
    }

    pub fn non_terminal(name: &'static str, children: Vec<CstNode>) -> Self {
        Self {
            name,
            token: None,
            children,
        }
    }

    /// Indented `name: value` tree dump (spec.md §6 item 3).
    pub fn pretty_print(&self) -> String {
        let mut out = String::new();
        self.write_indented(&mut out, 0);
        out
    }

    fn write_indented(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match &self.token {
            Some(token) => {
                let _ = writeln!(out, "{indent}{}: {}", self.name, token.lexeme);
            }
            None => {
                let _ = writeln!(out, "{indent}{}", self.name);
                for child in &self.children {
                    child.write_indented(out, depth + 1);
                }
            }
        }
    }
}

impl fmt::Display for CstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print())
    }
}
