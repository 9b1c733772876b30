//! CST → AST lowering (spec.md §4.3).
//!
//! Collapses the concrete tree (parentheses, braces, keywords, list
//! wrappers) into the abstract node set the semantic analyzer and code
//! generator operate on. A `None` CST (catastrophic parse failure) lowers
//! to a `None` AST; the analyzer treats that as a missing-AST error.

use serde::Serialize;

use crate::lexer::TokenKind;
use crate::parser::CstNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarType {
    Int,
    String,
    Boolean,
    /// Produced when the `Type` CST child is missing or malformed; carried
    /// forward so the analyzer can still report a precise error instead of
    /// panicking on an incomplete tree.
    Unknown,
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VarType::Int => "int",
            VarType::String => "string",
            VarType::Boolean => "boolean",
            VarType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Equals,
    NotEquals,
    Plus,
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Plus => "+",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum AstNode {
    Program {
        line: usize,
        column: usize,
        body: Box<AstNode>,
    },
    Block {
        line: usize,
        column: usize,
        statements: Vec<AstNode>,
    },
    VarDeclaration {
        line: usize,
        column: usize,
        var_type: VarType,
        var_name: char,
    },
    PrintStatement {
        line: usize,
        column: usize,
        expression: Box<AstNode>,
    },
    WhileStatement {
        line: usize,
        column: usize,
        condition: Box<AstNode>,
        body: Box<AstNode>,
    },
    IfStatement {
        line: usize,
        column: usize,
        condition: Box<AstNode>,
        then_branch: Box<AstNode>,
        else_branch: Option<Box<AstNode>>,
    },
    AssignmentStatement {
        line: usize,
        column: usize,
        identifier: Box<AstNode>,
        expression: Box<AstNode>,
    },
    BinaryExpression {
        line: usize,
        column: usize,
        operator: BinaryOperator,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    Identifier {
        line: usize,
        column: usize,
        name: char,
    },
    IntegerLiteral {
        line: usize,
        column: usize,
        value: u8,
    },
    StringLiteral {
        line: usize,
        column: usize,
        value: String,
    },
    BooleanLiteral {
        line: usize,
        column: usize,
        value: bool,
    },
}

impl AstNode {
    pub fn line(&self) -> usize {
        match self {
            AstNode::Program { line, .. }
            | AstNode::Block { line, .. }
            | AstNode::VarDeclaration { line, .. }
            | AstNode::PrintStatement { line, .. }
            | AstNode::WhileStatement { line, .. }
            | AstNode::IfStatement { line, .. }
            | AstNode::AssignmentStatement { line, .. }
            | AstNode::BinaryExpression { line, .. }
            | AstNode::Identifier { line, .. }
            | AstNode::IntegerLiteral { line, .. }
            | AstNode::StringLiteral { line, .. }
            | AstNode::BooleanLiteral { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            AstNode::Program { column, .. }
            | AstNode::Block { column, .. }
            | AstNode::VarDeclaration { column, .. }
            | AstNode::PrintStatement { column, .. }
            | AstNode::WhileStatement { column, .. }
            | AstNode::IfStatement { column, .. }
            | AstNode::AssignmentStatement { column, .. }
            | AstNode::BinaryExpression { column, .. }
            | AstNode::Identifier { column, .. }
            | AstNode::IntegerLiteral { column, .. }
            | AstNode::StringLiteral { column, .. }
            | AstNode::BooleanLiteral { column, .. } => *column,
        }
    }

    /// Stylized angle-bracket dump (spec.md §6 item 4).
    pub fn pretty_print(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        use std::fmt::Write as _;
        let indent = "  ".repeat(depth);
        match self {
            AstNode::Program { body, .. } => {
                let _ = writeln!(out, "{indent}< PROGRAM >");
                body.write_pretty(out, depth + 1);
            }
            AstNode::Block { statements, .. } => {
                let _ = writeln!(out, "{indent}< BLOCK >");
                for stmt in statements {
                    stmt.write_pretty(out, depth + 1);
                }
            }
            AstNode::VarDeclaration {
                var_type, var_name, ..
            } => {
                let _ = writeln!(out, "{indent}< Variable Declaration >");
                let _ = writeln!(out, "{indent}--[ {var_type} ]");
                let _ = writeln!(out, "{indent}--[ {var_name} ]");
            }
            AstNode::PrintStatement { expression, .. } => {
                let _ = writeln!(out, "{indent}< Print Statement >");
                expression.write_pretty(out, depth + 1);
            }
            AstNode::WhileStatement {
                condition, body, ..
            } => {
                let _ = writeln!(out, "{indent}< While Statement >");
                condition.write_pretty(out, depth + 1);
                body.write_pretty(out, depth + 1);
            }
            AstNode::IfStatement {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let _ = writeln!(out, "{indent}< If Statement >");
                condition.write_pretty(out, depth + 1);
                then_branch.write_pretty(out, depth + 1);
                if let Some(else_branch) = else_branch {
                    let _ = writeln!(out, "{indent}< Else >");
                    else_branch.write_pretty(out, depth + 1);
                }
            }
            AstNode::AssignmentStatement {
                identifier,
                expression,
                ..
            } => {
                let _ = writeln!(out, "{indent}< Assignment Statement >");
                identifier.write_pretty(out, depth + 1);
                expression.write_pretty(out, depth + 1);
            }
            AstNode::BinaryExpression {
                operator,
                left,
                right,
                ..
            } => {
                let _ = writeln!(out, "{indent}< Binary Expression ({operator}) >");
                left.write_pretty(out, depth + 1);
                right.write_pretty(out, depth + 1);
            }
            AstNode::Identifier { name, .. } => {
                let _ = writeln!(out, "{indent}--[ {name} ]");
            }
            AstNode::IntegerLiteral { value, .. } => {
                let _ = writeln!(out, "{indent}--[ {value} ]");
            }
            AstNode::StringLiteral { value, .. } => {
                let _ = writeln!(out, "{indent}--[ \"{value}\" ]");
            }
            AstNode::BooleanLiteral { value, .. } => {
                let _ = writeln!(out, "{indent}--[ {value} ]");
            }
        }
    }
}

impl std::fmt::Display for AstNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pretty_print())
    }
}

fn var_type_from_terminal(name: &str) -> VarType {
    match name {
        "IntType" => VarType::Int,
        "StringType" => VarType::String,
        "BooleanType" => VarType::Boolean,
        _ => VarType::Unknown,
    }
}

fn identifier_char(node: &CstNode) -> char {
    match node.token.as_ref().map(|t| &t.kind) {
        Some(TokenKind::Identifier(c)) => *c,
        _ => '?',
    }
}

/// True for CST node names that head an expression subtree (as opposed to
/// punctuation/keyword terminals), used to locate expressions among a
/// statement's children positionally.
fn is_expression_node(node: &CstNode) -> bool {
    matches!(node.name, "Equality" | "Term" | "Primary" | "StringLit")
}

/// Lower a full `Program` CST node into the AST root.
pub fn lower_program(cst: &CstNode) -> AstNode {
    let block_cst = cst
        .children
        .iter()
        .find(|c| c.name == "Block")
        .expect("Program always has a Block child (parser invariant)");
    let body = lower_block(block_cst);
    AstNode::Program {
        line: body.line(),
        column: body.column(),
        body: Box::new(body),
    }
}

fn lower_block(cst: &CstNode) -> AstNode {
    let (line, column) = cst
        .children
        .iter()
        .find(|c| c.name == "LBrace")
        .and_then(|c| c.token.as_ref())
        .map(|t| (t.line, t.column))
        .unwrap_or((0, 0));

    let mut statements = Vec::new();
    for child in &cst.children {
        if child.name == "LBrace" || child.name == "RBrace" {
            continue;
        }
        statements.extend(lower_statement(child));
    }

    AstNode::Block {
        line,
        column,
        statements,
    }
}

fn lower_statement(cst: &CstNode) -> Vec<AstNode> {
    match cst.name {
        "VarDeclaration" => lower_var_declaration(cst),
        "PrintStatement" => vec![lower_print_statement(cst)],
        "WhileStatement" => vec![lower_while_statement(cst)],
        "IfStatement" => vec![lower_if_statement(cst)],
        "AssignmentStatement" => vec![lower_assignment_statement(cst)],
        "Block" => vec![lower_block(cst)],
        "ExprStatement" => cst
            .children
            .first()
            .map(|e| {
                // Evaluated for its side effects on the symbol table (e.g.
                // marking a variable used) but has no dedicated AST variant
                // and emits no code (spec.md's AST node set has no bare
                // expression-statement form).
                lower_expression(e)
            })
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

fn lower_var_declaration(cst: &CstNode) -> Vec<AstNode> {
    let type_terminal = cst.children.first();
    let (line, column) = type_terminal
        .and_then(|c| c.token.as_ref())
        .map(|t| (t.line, t.column))
        .unwrap_or((0, 0));
    let var_type = type_terminal.map(|c| var_type_from_terminal(c.name)).unwrap_or(VarType::Unknown);

    let ident_node = cst.children.get(1);
    let var_name = ident_node.map(identifier_char).unwrap_or('?');

    let decl = AstNode::VarDeclaration {
        line,
        column,
        var_type,
        var_name,
    };

    let mut out = vec![decl];

    if let Some(expr_cst) = cst.children.iter().find(|c| is_expression_node(c)) {
        let expr = lower_expression(expr_cst);
        let identifier = AstNode::Identifier {
            line,
            column,
            name: var_name,
        };
        out.push(AstNode::AssignmentStatement {
            line,
            column,
            identifier: Box::new(identifier),
            expression: Box::new(expr),
        });
    }

    out
}

fn lower_assignment_statement(cst: &CstNode) -> AstNode {
    let ident_node = cst.children.first();
    let (line, column) = ident_node
        .and_then(|c| c.token.as_ref())
        .map(|t| (t.line, t.column))
        .unwrap_or((0, 0));
    let name = ident_node.map(identifier_char).unwrap_or('?');
    let identifier = AstNode::Identifier { line, column, name };

    let expr_cst = cst.children.iter().find(|c| is_expression_node(c));
    let expression = expr_cst
        .map(lower_expression)
        .unwrap_or(AstNode::StringLiteral {
            line,
            column,
            value: String::new(),
        });

    AstNode::AssignmentStatement {
        line,
        column,
        identifier: Box::new(identifier),
        expression: Box::new(expression),
    }
}

fn lower_print_statement(cst: &CstNode) -> AstNode {
    let (line, column) = cst
        .children
        .first()
        .and_then(|c| c.token.as_ref())
        .map(|t| (t.line, t.column))
        .unwrap_or((0, 0));

    let expression = cst
        .children
        .iter()
        .find(|c| is_expression_node(c))
        .map(lower_expression)
        .unwrap_or(AstNode::StringLiteral {
            line,
            column,
            value: String::new(),
        });

    AstNode::PrintStatement {
        line,
        column,
        expression: Box::new(expression),
    }
}

fn lower_while_statement(cst: &CstNode) -> AstNode {
    let (line, column) = cst
        .children
        .first()
        .and_then(|c| c.token.as_ref())
        .map(|t| (t.line, t.column))
        .unwrap_or((0, 0));

    let condition = cst
        .children
        .iter()
        .find(|c| is_expression_node(c))
        .map(lower_expression)
        .unwrap_or_else(|| default_boolean(line, column));

    let body = cst
        .children
        .iter()
        .find(|c| c.name == "Block")
        .map(lower_block)
        .unwrap_or_else(|| empty_block(line, column));

    AstNode::WhileStatement {
        line,
        column,
        condition: Box::new(condition),
        body: Box::new(body),
    }
}

fn lower_if_statement(cst: &CstNode) -> AstNode {
    let (line, column) = cst
        .children
        .first()
        .and_then(|c| c.token.as_ref())
        .map(|t| (t.line, t.column))
        .unwrap_or((0, 0));

    let condition = cst
        .children
        .iter()
        .find(|c| is_expression_node(c))
        .map(lower_expression)
        .unwrap_or_else(|| default_boolean(line, column));

    let blocks: Vec<_> = cst.children.iter().filter(|c| c.name == "Block").collect();
    let then_branch = blocks
        .first()
        .map(|b| lower_block(b))
        .unwrap_or_else(|| empty_block(line, column));
    let else_branch = blocks.get(1).map(|b| Box::new(lower_block(b)));

    AstNode::IfStatement {
        line,
        column,
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch,
    }
}

fn empty_block(line: usize, column: usize) -> AstNode {
    AstNode::Block {
        line,
        column,
        statements: Vec::new(),
    }
}

fn default_boolean(line: usize, column: usize) -> AstNode {
    AstNode::BooleanLiteral {
        line,
        column,
        value: false,
    }
}

fn lower_expression(cst: &CstNode) -> AstNode {
    match cst.name {
        "Equality" => {
            let left = lower_expression(&cst.children[0]);
            let operator = match cst.children[1].token.as_ref().map(|t| &t.kind) {
                Some(TokenKind::NotEquals) => BinaryOperator::NotEquals,
                _ => BinaryOperator::Equals,
            };
            let right = lower_expression(&cst.children[2]);
            AstNode::BinaryExpression {
                line: left.line(),
                column: left.column(),
                operator,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        "Term" => {
            let left = lower_expression(&cst.children[0]);
            let right = lower_expression(&cst.children[2]);
            AstNode::BinaryExpression {
                line: left.line(),
                column: left.column(),
                operator: BinaryOperator::Plus,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        "Primary" => lower_primary(cst),
        "StringLit" => lower_string_literal(cst),
        _ => lower_primary(cst),
    }
}

fn lower_primary(cst: &CstNode) -> AstNode {
    if let Some(inner) = cst.children.first() {
        if inner.token.is_none() {
            // Parenthesized or nested expression/string-literal subtree.
            return lower_expression(inner);
        }
        let token = inner.token.as_ref().expect("checked above");
        return match &token.kind {
            TokenKind::Digit(d) => AstNode::IntegerLiteral {
                line: token.line,
                column: token.column,
                value: *d,
            },
            TokenKind::BooleanValue(b) => AstNode::BooleanLiteral {
                line: token.line,
                column: token.column,
                value: *b,
            },
            TokenKind::Identifier(c) => AstNode::Identifier {
                line: token.line,
                column: token.column,
                name: *c,
            },
            TokenKind::LParen => {
                // `( expr )`: the expression subtree is the second child.
                cst.children
                    .get(1)
                    .map(lower_expression)
                    .unwrap_or(AstNode::BooleanLiteral {
                        line: token.line,
                        column: token.column,
                        value: false,
                    })
            }
            _ => AstNode::BooleanLiteral {
                line: token.line,
                column: token.column,
                value: false,
            },
        };
    }
    AstNode::BooleanLiteral {
        line: 0,
        column: 0,
        value: false,
    }
}

fn lower_string_literal(cst: &CstNode) -> AstNode {
    let (line, column) = cst
        .children
        .first()
        .and_then(|c| c.token.as_ref())
        .map(|t| (t.line, t.column))
        .unwrap_or((0, 0));

    let value: String = cst
        .children
        .iter()
        .filter_map(|c| match c.token.as_ref().map(|t| &t.kind) {
            Some(TokenKind::Char(ch)) => Some(*ch),
            _ => None,
        })
        .collect();

    AstNode::StringLiteral {
        line,
        column,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn lower(src: &str) -> AstNode {
        let tokens = Lexer::new(src).lex().tokens;
        let cst = Parser::new(tokens).parse().cst.unwrap();
        lower_program(&cst)
    }

    #[test]
    fn empty_block_lowers_to_empty_block() {
        let ast = lower("{}$");
        match ast {
            AstNode::Program { body, .. } => match *body {
                AstNode::Block { statements, .. } => assert!(statements.is_empty()),
                other => panic!("expected Block, got {other:?}"),
            },
            other => panic!("expected Program, got {other:?}"),
        }
    }

    #[test]
    fn inline_initializer_splits_into_decl_and_assignment() {
        let ast = lower("{ int a = 3 }$");
        let AstNode::Program { body, .. } = ast else {
            panic!("expected Program")
        };
        let AstNode::Block { statements, .. } = *body else {
            panic!("expected Block")
        };
        assert_eq!(statements.len(), 2);
        assert!(matches!(statements[0], AstNode::VarDeclaration { .. }));
        assert!(matches!(statements[1], AstNode::AssignmentStatement { .. }));
    }

    #[test]
    fn string_literal_reconstructs_from_chars() {
        let ast = lower("{ print(\"hi\") }$");
        let AstNode::Program { body, .. } = ast else {
            panic!()
        };
        let AstNode::Block { statements, .. } = *body else {
            panic!()
        };
        let AstNode::PrintStatement { expression, .. } = &statements[0] else {
            panic!()
        };
        assert!(matches!(
            expression.as_ref(),
            AstNode::StringLiteral { value, .. } if value == "hi"
        ));
    }
}
