//! Top-level pipeline driver (spec.md §2, §5).
//!
//! Splits a source text on one-or-more consecutive `$` delimiters into
//! independent sub-programs (discarding empty segments), then runs each
//! through the four-stage pipeline in order. Each stage gates the next
//! exactly as spec.md §2 describes: the parser runs once the lexer has
//! produced a token stream (it always does, even alongside lex errors —
//! spec.md §4.1 never aborts); the semantic analyzer runs only if parsing
//! produced no `ERROR`-level diagnostics; the code generator runs only if
//! semantic analysis produced no errors (warnings never block either
//! transition). No state is shared across sub-programs: each is lexed,
//! parsed, analyzed, and generated by a fresh instance of every stage.

use anyhow::{bail, Result};
use log::{debug, info, trace};

use crate::ast::{self, AstNode};
use crate::codegen::{CodeGenerator, CodegenOptions, CodegenOutput};
use crate::diagnostics::DiagnosticLog;
use crate::lexer::Lexer;
use crate::parser::{CstNode, Parser};
use crate::semantic::{self, SymbolTable};

/// Everything produced by compiling one `$`-delimited sub-program: the four
/// diagnostic logs plus each stage's pretty-printable artifact. This is the
/// Rust-idiomatic shape of spec.md §6's "four text sinks" for an in-process
/// caller; [`CompileOutput`]'s `*_dump` methods render exactly the text
/// those sinks describe.
pub struct CompileOutput {
    pub lexer_log: DiagnosticLog,
    pub parser_log: DiagnosticLog,
    pub semantic_log: DiagnosticLog,
    pub codegen_log: DiagnosticLog,
    pub cst: Option<CstNode>,
    pub ast: Option<AstNode>,
    pub symbol_table: SymbolTable,
    pub code: Vec<u8>,
    pub static_table: Vec<(char, u16)>,
    pub string_pool: Vec<(String, u16)>,
}

impl CompileOutput {
    /// Sink 3 (spec.md §6): the CST pretty-print, or empty on catastrophic
    /// parse failure.
    pub fn cst_dump(&self) -> String {
        self.cst.as_ref().map(CstNode::pretty_print).unwrap_or_default()
    }

    /// Sink 4 (spec.md §6): the stylized angle-bracket AST dump.
    pub fn ast_dump(&self) -> String {
        self.ast.as_ref().map(AstNode::pretty_print).unwrap_or_default()
    }

    /// Sink 4 (spec.md §6): the symbol-table table, sorted by (scope, line).
    pub fn symbol_table_dump(&self) -> String {
        self.symbol_table.pretty_print()
    }

    /// Sink 5 (spec.md §6): space-separated, 2-hex-digit, upper-case bytes.
    pub fn code_dump(&self) -> String {
        self.code
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Sink 6 (spec.md §6): `name: 0xNNNN` / `"lit": 0xNNNN` lines.
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

    /// Whether this sub-program reached code generation at all (as opposed
    /// to being halted by a lexical/syntactic/semantic error).
    pub fn reached_codegen(&self) -> bool {
        !self.semantic_log.has_errors() && self.ast.is_some() && !self.parser_log.has_errors()
    }
}

/// Drives the pipeline over a whole source text.
///
/// Stateless across calls to [`Driver::compile`] beyond the fixed
/// [`CodegenOptions`] each sub-program's code generator is constructed with
/// (spec.md §5: "no shared mutable state crosses sub-program boundaries").
pub struct Driver {
    options: CodegenOptions,
}

impl Driver {
    pub fn new() -> Self {
        Self {
            options: CodegenOptions::default(),
        }
    }

    /// Construct a driver with overridden codegen constants, rejecting a
    /// layout that cannot fit in the fixed 256-byte image (spec.md §4.5's
    /// `staticStart`/`heapStart` open question, resolved in DESIGN.md as an
    /// overridable, validated field rather than a hardcoded literal).
    pub fn try_with_options(options: CodegenOptions) -> Result<Self> {
        if options.static_start >= options.heap_start {
            bail!(
                "staticStart ({:#06x}) must precede heapStart ({:#06x})",
                options.static_start,
                options.heap_start
            );
        }
        if options.heap_start as usize >= 0x100 {
            bail!("heapStart ({:#06x}) must leave room in the 256-byte image", options.heap_start);
        }
        Ok(Self { options })
    }

    /// Split `source` on one-or-more consecutive `$`, discard empty
    /// segments, and compile each as an independent sub-program (spec.md §6
    /// "Input").
    pub fn compile(&self, source: &str) -> Vec<CompileOutput> {
        let sub_programs = split_sub_programs(source);
        info!("driver: {} sub-program(s) to compile", sub_programs.len());
        sub_programs
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                debug!("compiling sub-program {index}");
                self.compile_one(segment)
            })
            .collect()
    }

    fn compile_one(&self, segment: &str) -> CompileOutput {
        trace!("lexing sub-program");
        let lex_output = Lexer::new(segment).lex();
        debug!(
            "lexer produced {} tokens ({} errors)",
            lex_output.tokens.len(),
            lex_output.log.error_count()
        );

        trace!("parsing sub-program");
        let parse_output = Parser::new(lex_output.tokens).parse();

        if parse_output.log.has_errors() {
            debug!("halting before semantic analysis: parser reported errors");
            return CompileOutput {
                lexer_log: lex_output.log,
                parser_log: parse_output.log,
                semantic_log: DiagnosticLog::new(),
                codegen_log: DiagnosticLog::new(),
                cst: parse_output.cst,
                ast: None,
                symbol_table: SymbolTable::default(),
                code: minimal_image(),
                static_table: Vec::new(),
                string_pool: Vec::new(),
            };
        }

        let ast = parse_output.cst.as_ref().map(ast::lower_program);

        trace!("running semantic analysis");
        let analysis = semantic::analyze(ast);

        if analysis.log.has_errors() {
            debug!("halting before code generation: semantic analysis reported errors");
            return CompileOutput {
                lexer_log: lex_output.log,
                parser_log: parse_output.log,
                semantic_log: analysis.log,
                codegen_log: DiagnosticLog::new(),
                cst: parse_output.cst,
                ast: analysis.ast,
                symbol_table: analysis.symbol_table,
                code: minimal_image(),
                static_table: Vec::new(),
                string_pool: Vec::new(),
            };
        }

        trace!("running code generation");
        let CodegenOutput {
            image,
            static_table,
            string_pool,
            log: codegen_log,
        } = CodeGenerator::new(self.options).generate(analysis.ast.as_ref());

        CompileOutput {
            lexer_log: lex_output.log,
            parser_log: parse_output.log,
            semantic_log: analysis.log,
            codegen_log,
            cst: parse_output.cst,
            ast: analysis.ast,
            symbol_table: analysis.symbol_table,
            code: image,
            static_table,
            string_pool,
        }
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

/// A minimal `[BRK]` image, zero-padded to 256 bytes, for sub-programs that
/// never reach code generation (spec.md §7: a code-generation-level error
/// "aborts that sub-program's code only"; the same fallback covers earlier
/// stage failures, since there is no AST to compile from in either case).
fn minimal_image() -> Vec<u8> {
    vec![0u8; 256]
}

/// Splits `source` on runs of one-or-more `$` characters, re-attaching a
/// single trailing `$` to every segment that had one in the original text.
/// A segment with no trailing `$` (the source ended without a terminator)
/// is passed through unterminated so the lexer's own "missing EOP" warning
/// fires, exactly as it would for a lone sub-program missing its `$`.
fn split_sub_programs(source: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    for ch in source.chars() {
        if ch == '$' {
            if !current.is_empty() {
                current.push('$');
                segments.push(std::mem::take(&mut current));
            }
            // A `$` with nothing accumulated since the last one is a run of
            // consecutive delimiters; the empty segment between them is
            // discarded (spec.md §6 "empty segments are discarded").
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Convenience free function equivalent to `Driver::new().compile(source)`.
pub fn compile(source: &str) -> Vec<CompileOutput> {
    Driver::new().compile(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_dollar_and_keeps_terminator() {
        assert_eq!(split_sub_programs("{}$"), vec!["{}$"]);
        assert_eq!(split_sub_programs("{}$ {1}$"), vec!["{}$", " {1}$"]);
    }

    #[test]
    fn consecutive_dollars_discard_the_empty_segment_between() {
        assert_eq!(split_sub_programs("{}$$"), vec!["{}$"]);
    }

    #[test]
    fn missing_trailing_dollar_is_kept_unterminated() {
        assert_eq!(split_sub_programs("{}"), vec!["{}"]);
    }

    #[test]
    fn independent_sub_programs_do_not_leak_symbols() {
        let outputs = Driver::new().compile("{ int a }$ { string a }$");
        assert_eq!(outputs.len(), 2);
        for out in &outputs {
            assert!(!out.semantic_log.has_errors());
            assert_eq!(out.symbol_table.rows_sorted().len(), 1);
        }
    }

    #[test]
    fn a_failing_sub_program_does_not_block_the_next() {
        let outputs = Driver::new().compile("{ int a  boolean b  a = b }$ { int c  c = 1  print(c) }$");
        assert_eq!(outputs.len(), 2);
        assert!(outputs[0].semantic_log.has_errors());
        assert!(!outputs[1].semantic_log.has_errors());
        assert!(outputs[1].reached_codegen());
    }

    #[test]
    fn try_with_options_rejects_an_inverted_layout() {
        let bad = CodegenOptions {
            static_start: 0x00E0,
            heap_start: 0x001F,
        };
        assert!(Driver::try_with_options(bad).is_err());
    }
}
