//! Single-pass code generator emitting a fixed 256-byte 6502-family image
//! with static-address back-patching (spec.md §4.5).
//!
//! Two open questions from spec.md §4.5/§9 are resolved here (see
//! DESIGN.md for the full rationale):
//!
//! - `staticStart = 0x003C`, carried as a [`CodegenOptions`] field rather
//!   than a hardcoded literal. The other documented value, `0x001F`, leaves
//!   too little room for the code region once comparisons and branches are
//!   emitted at their real (non-fixed-distance) size.
//! - Booleans use a single runtime encoding, `false = 0x00`, `true = 0x01`,
//!   everywhere (comparison results, literals, stored variables, and the
//!   if/while branch test). spec.md §4.5 mentions an alternate `0xF5`/`0xF0`
//!   encoding for boolean *literals* that conflicts with the `0`/`1`
//!   encoding the same section uses for comparison results and branch
//!   testing; unifying on `0`/`1` keeps the whole stage internally
//!   consistent and lets a single branch-test routine serve if/while
//!   conditions, boolean literals, and boolean variables alike.

use std::collections::HashMap;

use serde::Serialize;

use crate::ast::{AstNode, BinaryOperator, VarType};
use crate::diagnostics::{Diagnostic, DiagnosticLog, Level};

mod opcode {
    pub const LDA_IMM: u8 = 0xA9;
    pub const LDA_ABS: u8 = 0xAD;
    pub const STA_ABS: u8 = 0x8D;
    pub const ADC_ABS: u8 = 0x6D;
    pub const LDX_IMM: u8 = 0xA2;
    pub const LDX_ABS: u8 = 0xAE;
    pub const LDY_IMM: u8 = 0xA0;
    pub const LDY_ABS: u8 = 0xAC;
    pub const NOP: u8 = 0xEA;
    pub const BRK: u8 = 0x00;
    pub const CPX_ABS: u8 = 0xEC;
    pub const CPX_IMM: u8 = 0xE0;
    pub const BNE: u8 = 0xD0;
    pub const SYS: u8 = 0xFF;
}

const SYS_PRINT_INT: u8 = 1;
const SYS_PRINT_STR: u8 = 2;

const BOOL_FALSE: u8 = 0x00;
const BOOL_TRUE: u8 = 0x01;

/// Overridable constants the code generator's layout depends on.
#[derive(Debug, Clone, Copy)]
pub struct CodegenOptions {
    pub static_start: u16,
    pub heap_start: u16,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            static_start: 0x003C,
            heap_start: 0x00E0,
        }
    }
}

impl CodegenOptions {
    /// One reserved zero-page-style scratch cell just below the heap,
    /// used for the ADC accumulator pattern and for staging comparison
    /// operands (spec.md §4.5 "tempZeroPage").
    fn temp_address(&self) -> u16 {
        self.heap_start - 1
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenOutput {
    pub image: Vec<u8>,
    pub static_table: Vec<(char, u16)>,
    pub string_pool: Vec<(String, u16)>,
    pub log: DiagnosticLog,
}

impl CodegenOutput {
    /// space-separated, 2-hex-digit, upper-case bytes (spec.md §6 item 5).
    pub fn code_dump(&self) -> String {
        self.image
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `name: 0xNNNN` / `"lit": 0xNNNN` lines (spec.md §6 item 6).
    pub fn memory_map_dump(&self) -> String {
        let mut out = String::new();
        for (name, addr) in &self.static_table {
            out.push_str(&format!("{name}: {addr:#06x}\n"));
        }
        for (lit, addr) in &self.string_pool {
            out.push_str(&format!("\"{lit}\": {addr:#06x}\n"));
        }
        out
    }
}

enum PlaceholderKind {
    Static(char),
    StringPool(String),
}

struct Placeholder {
    /// Byte offset of the first (low) byte of the 2-byte operand.
    offset: usize,
    kind: PlaceholderKind,
}

pub struct CodeGenerator {
    options: CodegenOptions,
    code: Vec<u8>,
    static_table: HashMap<char, u16>,
    static_order: Vec<char>,
    /// Declared type of each static variable, tracked locally so codegen
    /// does not need to re-consult the semantic analyzer's symbol table
    /// (spec.md's stages are otherwise fully decoupled).
    types: HashMap<char, VarType>,
    string_pool: HashMap<String, u16>,
    string_order: Vec<String>,
    next_heap_addr: u16,
    placeholders: Vec<Placeholder>,
    log: DiagnosticLog,
    aborted: bool,
}

impl CodeGenerator {
    pub fn new(options: CodegenOptions) -> Self {
        let next_heap_addr = options.heap_start;
        Self {
            options,
            code: Vec::new(),
            static_table: HashMap::new(),
            static_order: Vec::new(),
            types: HashMap::new(),
            string_pool: HashMap::new(),
            string_order: Vec::new(),
            next_heap_addr,
            placeholders: Vec::new(),
            log: DiagnosticLog::new(),
            aborted: false,
        }
    }

    pub fn generate(mut self, ast: Option<&AstNode>) -> CodegenOutput {
        match ast {
            Some(AstNode::Program { body, .. }) => {
                self.emit_byte(opcode::LDA_IMM);
                self.emit_byte(0x00);
                self.emit_block(body);
            }
            _ => {
                self.log.push(Diagnostic::new(
                    Level::Error,
                    "Code generation aborted: no AST to compile",
                ));
                self.aborted = true;
            }
        }

        if !self.aborted {
            self.code.push(opcode::BRK);
        } else {
            self.code.clear();
            self.code.push(opcode::BRK);
        }

        self.finalize()
    }

    fn finalize(mut self) -> CodegenOutput {
        for placeholder in &self.placeholders {
            let addr = match &placeholder.kind {
                PlaceholderKind::Static(name) => *self.static_table.get(name).unwrap_or(&0),
                PlaceholderKind::StringPool(lit) => *self.string_pool.get(lit).unwrap_or(&0),
            };
            let lo = (addr & 0x00FF) as u8;
            let hi = ((addr >> 8) & 0x00FF) as u8;
            self.code[placeholder.offset] = lo;
            self.code[placeholder.offset + 1] = hi;
        }

        let mut image = vec![0u8; 256];
        let code_len = self.code.len().min(self.options.static_start as usize);
        if self.code.len() > self.options.static_start as usize {
            self.log.push(Diagnostic::new(
                Level::Error,
                "Emitted code overflows the static-variable region; image truncated",
            ));
        }
        image[..code_len].copy_from_slice(&self.code[..code_len]);

        let mut strings: Vec<(String, u16)> = self
            .string_order
            .iter()
            .map(|lit| (lit.clone(), self.string_pool[lit]))
            .collect();
        strings.sort_by_key(|(_, addr)| *addr);
        for (literal, addr) in &strings {
            let base = *addr as usize;
            for (i, byte) in literal.bytes().enumerate() {
                if base + i < image.len() {
                    image[base + i] = byte;
                }
            }
            let nul_at = base + literal.len();
            if nul_at < image.len() {
                image[nul_at] = 0;
            }
        }

        self.log.info("Code Generation complete");

        let mut static_table: Vec<(char, u16)> = self
            .static_order
            .iter()
            .map(|name| (*name, self.static_table[name]))
            .collect();
        static_table.sort_by_key(|(_, addr)| *addr);

        CodegenOutput {
            image,
            static_table,
            string_pool: strings,
            log: self.log,
        }
    }

    fn emit_byte(&mut self, byte: u8) {
        self.code.push(byte);
    }

    fn emit_opcode(&mut self, op: u8) {
        self.code.push(op);
    }

    fn emit_abs_placeholder(&mut self, kind: PlaceholderKind) {
        let offset = self.code.len();
        self.code.push(0);
        self.code.push(0);
        self.placeholders.push(Placeholder { offset, kind });
    }

    fn emit_abs_known(&mut self, addr: u16) {
        self.code.push((addr & 0xFF) as u8);
        self.code.push(((addr >> 8) & 0xFF) as u8);
    }

    fn lda_abs_static(&mut self, name: char) {
        self.emit_opcode(opcode::LDA_ABS);
        self.emit_abs_placeholder(PlaceholderKind::Static(name));
    }

    fn sta_abs_static(&mut self, name: char) {
        self.emit_opcode(opcode::STA_ABS);
        self.emit_abs_placeholder(PlaceholderKind::Static(name));
    }

    fn intern_string(&mut self, literal: &str) -> u16 {
        if let Some(addr) = self.string_pool.get(literal) {
            return *addr;
        }
        let addr = self.next_heap_addr;
        self.next_heap_addr += literal.len() as u16 + 1; // + NUL terminator
        self.string_pool.insert(literal.to_string(), addr);
        self.string_order.push(literal.to_string());
        addr
    }

    fn bool_string_addr(&mut self, value: bool) -> u16 {
        self.intern_string(if value { "true" } else { "false" })
    }

    /// Relative operand for a branch instruction whose 1-byte operand sits
    /// at `operand_offset`, targeting `target` (spec.md §9 "Branch-distance
    /// arithmetic" — computed precisely from actual emitted lengths rather
    /// than the fixed constants the original source used).
    fn relative_offset(operand_offset: usize, target: usize) -> u8 {
        let next_instr = operand_offset as i32 + 1;
        let delta = target as i32 - next_instr;
        (delta as i8) as u8
    }

    fn emit_bne_placeholder(&mut self) -> usize {
        self.emit_opcode(opcode::BNE);
        let offset = self.code.len();
        self.code.push(0);
        offset
    }

    fn patch_branch(&mut self, operand_offset: usize, target: usize) {
        self.code[operand_offset] = Self::relative_offset(operand_offset, target);
    }

    fn declared_type(&self, name: char) -> VarType {
        self.types.get(&name).copied().unwrap_or(VarType::Unknown)
    }

    /// Best-effort static type of an expression, enough to pick a syscall
    /// and addressing mode; mirrors (without duplicating state from) the
    /// semantic analyzer's `infer_expr_type`.
    fn infer_type(&self, expr: &AstNode) -> VarType {
        match expr {
            AstNode::IntegerLiteral { .. } => VarType::Int,
            AstNode::StringLiteral { .. } => VarType::String,
            AstNode::BooleanLiteral { .. } => VarType::Boolean,
            AstNode::Identifier { name, .. } => self.declared_type(*name),
            AstNode::BinaryExpression {
                operator,
                left,
                right,
                ..
            } => match operator {
                BinaryOperator::Equals | BinaryOperator::NotEquals => VarType::Boolean,
                BinaryOperator::Plus => {
                    let lt = self.infer_type(left);
                    let rt = self.infer_type(right);
                    if lt == VarType::String && rt == VarType::String {
                        VarType::String
                    } else {
                        VarType::Int
                    }
                }
            },
            _ => VarType::Unknown,
        }
    }

    // ---- statements ----------------------------------------------------

    fn emit_block(&mut self, node: &AstNode) {
        let AstNode::Block { statements, .. } = node else {
            return;
        };
        if statements.is_empty() {
            self.emit_opcode(opcode::NOP);
            return;
        }
        for stmt in statements {
            self.emit_statement(stmt);
        }
    }

    fn emit_statement(&mut self, stmt: &AstNode) {
        match stmt {
            AstNode::VarDeclaration {
                var_type, var_name, ..
            } => self.emit_var_declaration(*var_type, *var_name),
            AstNode::AssignmentStatement {
                identifier,
                expression,
                ..
            } => self.emit_assignment(identifier, expression),
            AstNode::PrintStatement { expression, .. } => self.emit_print(expression),
            AstNode::WhileStatement {
                condition, body, ..
            } => self.emit_while(condition, body),
            AstNode::IfStatement {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.emit_if(condition, then_branch, else_branch.as_deref()),
            AstNode::Block { .. } => self.emit_block(stmt),
            _ => {}
        }
    }

    fn emit_var_declaration(&mut self, var_type: VarType, var_name: char) {
        // A shadowing inner-scope declaration of the same name reuses the
        // same physical static slot rather than allocating a second one;
        // the semantic analyzer tracks shadowed names per-scope, but this
        // target has one flat static region addressed by name alone.
        if !self.static_table.contains_key(&var_name) {
            let index = self.static_order.len() as u16;
            let addr = self.options.static_start + index;
            self.static_table.insert(var_name, addr);
            self.static_order.push(var_name);
        }
        self.types.insert(var_name, var_type);
        self.sta_abs_static(var_name);
    }

    fn emit_assignment(&mut self, identifier: &AstNode, expression: &AstNode) {
        let AstNode::Identifier { name, .. } = identifier else {
            return;
        };
        self.emit_expr_into_a(expression);
        self.sta_abs_static(*name);
    }

    fn emit_print(&mut self, expr: &AstNode) {
        let ty = self.infer_type(expr);
        match (expr, ty) {
            (AstNode::StringLiteral { value, .. }, _) => {
                let addr = self.intern_string(value);
                self.emit_opcode(opcode::LDY_IMM);
                self.emit_byte((addr & 0xFF) as u8);
            }
            (AstNode::BooleanLiteral { value, .. }, _) => {
                let addr = self.bool_string_addr(*value);
                self.emit_opcode(opcode::LDY_IMM);
                self.emit_byte((addr & 0xFF) as u8);
            }
            (AstNode::Identifier { name, .. }, VarType::String) => {
                self.emit_opcode(opcode::LDY_ABS);
                self.emit_abs_placeholder(PlaceholderKind::Static(*name));
            }
            (AstNode::Identifier { name, .. }, VarType::Boolean) => {
                self.lda_abs_static(*name);
                self.emit_select_bool_string_from_a();
            }
            (_, VarType::Boolean) => {
                self.emit_expr_into_a(expr);
                self.emit_select_bool_string_from_a();
            }
            (AstNode::Identifier { name, .. }, _) => {
                self.emit_opcode(opcode::LDY_ABS);
                self.emit_abs_placeholder(PlaceholderKind::Static(*name));
                self.emit_opcode(opcode::LDX_IMM);
                self.emit_byte(SYS_PRINT_INT);
                self.emit_opcode(opcode::SYS);
                return;
            }
            _ => {
                // Arithmetic expression: evaluate, stash, reload into Y.
                self.emit_expr_into_a(expr);
                self.sta_abs_temp();
                self.emit_opcode(opcode::LDY_ABS);
                self.emit_abs_known_temp();
                self.emit_opcode(opcode::LDX_IMM);
                self.emit_byte(SYS_PRINT_INT);
                self.emit_opcode(opcode::SYS);
                return;
            }
        }

        let syscall = match ty {
            VarType::Int => SYS_PRINT_INT,
            _ => SYS_PRINT_STR,
        };
        self.emit_opcode(opcode::LDX_IMM);
        self.emit_byte(syscall);
        self.emit_opcode(opcode::SYS);
    }

    fn sta_abs_temp(&mut self) {
        self.emit_opcode(opcode::STA_ABS);
        let temp = self.options.temp_address();
        self.emit_abs_known(temp);
    }

    fn emit_abs_known_temp(&mut self) {
        let temp = self.options.temp_address();
        self.emit_abs_known(temp);
    }

    /// Given a 0/1 boolean value already loaded in A, select and load into
    /// Y the pool address of `"true"`/`"false"` accordingly.
    fn emit_select_bool_string_from_a(&mut self) {
        let true_addr = self.bool_string_addr(true);
        let false_addr = self.bool_string_addr(false);

        self.sta_abs_temp();
        self.emit_opcode(opcode::LDX_ABS);
        self.emit_abs_known_temp();
        self.emit_opcode(opcode::CPX_IMM);
        self.emit_byte(BOOL_TRUE);
        let skip_true = self.emit_bne_placeholder();

        self.emit_opcode(opcode::LDY_IMM);
        self.emit_byte((true_addr & 0xFF) as u8);
        self.emit_opcode(opcode::LDA_IMM);
        self.emit_byte(1); // force Z=0 so the next branch is unconditional
        let skip_false = self.emit_bne_placeholder();

        let false_path = self.code.len();
        self.patch_branch(skip_true, false_path);
        self.emit_opcode(opcode::LDY_IMM);
        self.emit_byte((false_addr & 0xFF) as u8);

        let after = self.code.len();
        self.patch_branch(skip_false, after);
    }

    fn emit_while(&mut self, condition: &AstNode, body: &AstNode) {
        let loop_start = self.code.len();
        let skip_body = self.emit_condition_test(condition);
        self.emit_block(body);

        self.emit_opcode(opcode::LDA_IMM);
        self.emit_byte(1); // force Z=0: the backward branch is unconditional
        let backward_operand = self.emit_bne_placeholder();
        self.patch_branch(backward_operand, loop_start);

        let after_loop = self.code.len();
        self.patch_branch(skip_body, after_loop);
    }

    fn emit_if(&mut self, condition: &AstNode, then_branch: &AstNode, else_branch: Option<&AstNode>) {
        let skip_then = self.emit_condition_test(condition);

        self.emit_block(then_branch);

        match else_branch {
            Some(else_block) => {
                self.emit_opcode(opcode::LDA_IMM);
                self.emit_byte(1); // force Z=0: unconditional skip over else
                let skip_else = self.emit_bne_placeholder();

                let else_start = self.code.len();
                self.patch_branch(skip_then, else_start);

                self.emit_block(else_block);
                let after = self.code.len();
                self.patch_branch(skip_else, after);
            }
            None => {
                let after = self.code.len();
                self.patch_branch(skip_then, after);
            }
        }
    }

    /// Evaluates `condition` into A (0/1), stores it, and emits a `BNE`
    /// placeholder that is taken when the condition is false. Returns the
    /// branch's operand offset for the caller to patch once the skipped
    /// region has been emitted.
    fn emit_condition_test(&mut self, condition: &AstNode) -> usize {
        self.emit_expr_into_a(condition);
        self.sta_abs_temp();
        self.emit_opcode(opcode::LDX_ABS);
        self.emit_abs_known_temp();
        self.emit_opcode(opcode::CPX_IMM);
        self.emit_byte(BOOL_TRUE);
        self.emit_bne_placeholder()
    }

    // ---- expressions -----------------------------------------------------

    fn emit_expr_into_a(&mut self, expr: &AstNode) {
        match expr {
            AstNode::IntegerLiteral { value, .. } => {
                self.emit_opcode(opcode::LDA_IMM);
                self.emit_byte(*value);
            }
            AstNode::BooleanLiteral { value, .. } => {
                self.emit_opcode(opcode::LDA_IMM);
                self.emit_byte(if *value { BOOL_TRUE } else { BOOL_FALSE });
            }
            AstNode::StringLiteral { value, .. } => {
                let addr = self.intern_string(value);
                self.emit_opcode(opcode::LDA_IMM);
                self.emit_byte((addr & 0xFF) as u8);
            }
            AstNode::Identifier { name, .. } => self.lda_abs_static(*name),
            AstNode::BinaryExpression {
                operator,
                left,
                right,
                ..
            } => match operator {
                BinaryOperator::Plus => self.emit_plus_chain(expr, left, right),
                BinaryOperator::Equals | BinaryOperator::NotEquals => {
                    self.emit_comparison(*operator, left, right)
                }
            },
            _ => {}
        }
    }

    fn emit_plus_chain(&mut self, node: &AstNode, _left: &AstNode, _right: &AstNode) {
        if self.infer_type(node) == VarType::String {
            match Self::fold_string_chain(node) {
                Some(literal) => {
                    let addr = self.intern_string(&literal);
                    self.emit_opcode(opcode::LDA_IMM);
                    self.emit_byte((addr & 0xFF) as u8);
                }
                None => {
                    self.log.push(Diagnostic::new(
                        Level::Error,
                        "Runtime string concatenation of non-literal operands is unsupported",
                    ));
                    self.emit_opcode(opcode::LDA_IMM);
                    self.emit_byte(0);
                }
            }
            return;
        }

        let operands = Self::flatten_plus_chain(node);
        let temp = self.options.temp_address();

        let (last, rest) = operands.split_last().expect("a '+' chain has >=2 operands");
        self.emit_expr_into_a(last);
        self.emit_opcode(opcode::STA_ABS);
        self.emit_abs_known(temp);

        for operand in rest.iter().rev() {
            self.emit_expr_into_a(operand);
            self.emit_opcode(opcode::ADC_ABS);
            self.emit_abs_known(temp);
            self.emit_opcode(opcode::STA_ABS);
            self.emit_abs_known(temp);
        }
    }

    fn flatten_plus_chain(node: &AstNode) -> Vec<&AstNode> {
        match node {
            AstNode::BinaryExpression {
                operator: BinaryOperator::Plus,
                left,
                right,
                ..
            } => {
                let mut operands = Self::flatten_plus_chain(left);
                operands.push(right);
                operands
            }
            other => vec![other],
        }
    }

    fn fold_string_chain(node: &AstNode) -> Option<String> {
        match node {
            AstNode::StringLiteral { value, .. } => Some(value.clone()),
            AstNode::BinaryExpression {
                operator: BinaryOperator::Plus,
                left,
                right,
                ..
            } => {
                let mut s = Self::fold_string_chain(left)?;
                s.push_str(&Self::fold_string_chain(right)?);
                Some(s)
            }
            _ => None,
        }
    }

    fn emit_comparison(&mut self, operator: BinaryOperator, left: &AstNode, right: &AstNode) {
        let temp = self.options.temp_address();

        self.emit_load_into_x(left);

        self.emit_expr_into_a(right);
        self.emit_opcode(opcode::STA_ABS);
        self.emit_abs_known(temp);
        self.emit_opcode(opcode::CPX_ABS);
        self.emit_abs_known(temp);

        let (default, on_equal) = match operator {
            BinaryOperator::Equals => (BOOL_FALSE, BOOL_TRUE),
            BinaryOperator::NotEquals => (BOOL_TRUE, BOOL_FALSE),
        };
        self.emit_opcode(opcode::LDA_IMM);
        self.emit_byte(default);
        let skip = self.emit_bne_placeholder();
        self.emit_opcode(opcode::LDA_IMM);
        self.emit_byte(on_equal);
        let after = self.code.len();
        self.patch_branch(skip, after);
    }

    /// Loads `expr` into X: immediate for literals, absolute for
    /// identifiers, or (for an arbitrary sub-expression) via A then a
    /// transfer through the shared temp cell.
    fn emit_load_into_x(&mut self, expr: &AstNode) {
        match expr {
            AstNode::IntegerLiteral { value, .. } => {
                self.emit_opcode(opcode::LDX_IMM);
                self.emit_byte(*value);
            }
            AstNode::BooleanLiteral { value, .. } => {
                self.emit_opcode(opcode::LDX_IMM);
                self.emit_byte(if *value { BOOL_TRUE } else { BOOL_FALSE });
            }
            AstNode::Identifier { name, .. } => {
                self.emit_opcode(opcode::LDX_ABS);
                self.emit_abs_placeholder(PlaceholderKind::Static(*name));
            }
            _ => {
                self.emit_expr_into_a(expr);
                self.sta_abs_temp();
                self.emit_opcode(opcode::LDX_ABS);
                self.emit_abs_known_temp();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::lower_program;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn compile(src: &str) -> CodegenOutput {
        let tokens = Lexer::new(src).lex().tokens;
        let cst = Parser::new(tokens).parse().cst.unwrap();
        let ast = lower_program(&cst);
        CodeGenerator::new(CodegenOptions::default()).generate(Some(&ast))
    }

    #[test]
    fn empty_block_prelude_and_brk() {
        let out = compile("{}$");
        assert_eq!(out.image.len(), 256);
        assert_eq!(&out.image[0..4], &[0xA9, 0x00, 0xEA, 0x00]);
        assert!(out.image[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn var_decl_allocates_static_slot() {
        let out = compile("{ int a }$");
        assert_eq!(out.static_table, vec![('a', 0x003C)]);
    }

    #[test]
    fn assignment_and_print_emit_expected_fragment() {
        let out = compile("{ int a  a = 3  print(a) }$");
        let a_lo = 0x3Cu8;
        let expected = [
            opcode::LDA_IMM,
            0x03,
            opcode::STA_ABS,
            a_lo,
            0x00,
            opcode::LDY_ABS,
            a_lo,
            0x00,
            opcode::LDX_IMM,
            1,
            opcode::SYS,
        ];
        let haystack = &out.image;
        let found = haystack
            .windows(expected.len())
            .any(|w| w == expected);
        assert!(found, "expected fragment not found in {:02X?}", haystack);
    }

    #[test]
    fn string_literal_is_interned_in_heap_region() {
        let out = compile("{ print(\"hi\") }$");
        assert_eq!(out.string_pool, vec![("hi".to_string(), 0x00E0)]);
        assert_eq!(&out.image[0xE0..0xE3], &[b'h', b'i', 0]);
    }

    #[test]
    fn byte_after_brk_is_always_zero() {
        let out = compile("{ int a  a = 3 }$");
        let brk_index = out.image.iter().position(|&b| b == opcode::BRK).unwrap();
        assert!(out.image[brk_index + 1..0x003C].iter().all(|&b| b == 0));
    }

    #[test]
    fn running_codegen_twice_is_deterministic() {
        let src = "{ int a  a = 3  if (a == 3) { print(\"hi\") } }$";
        let out1 = compile(src);
        let out2 = compile(src);
        assert_eq!(out1.image, out2.image);
    }
}
