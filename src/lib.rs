//! Compiler for the Alan++ teaching language.
//!
//! Four pipeline stages, run independently per `$`-delimited sub-program
//! and composed by [`driver`]: [`lexer`] scans source text into tokens,
//! [`parser`] builds a concrete syntax tree by recursive descent, [`ast`]
//! lowers the CST into an abstract syntax tree, [`semantic`] type- and
//! scope-checks it against a lexically-scoped symbol table, and [`codegen`]
//! emits a fixed 256-byte 6502-family machine-code image with back-patched
//! static addressing. [`diagnostics`] defines the log type every stage
//! appends to instead of failing fast.
//!
//! There is no CLI and no persistent state: this crate is a library of
//! pipeline stages invoked by an embedding application, not a standalone
//! tool.

pub mod ast;
pub mod codegen;
pub mod diagnostics;
pub mod driver;
pub mod lexer;
pub mod parser;
pub mod semantic;

pub use driver::{compile, CompileOutput, Driver};
