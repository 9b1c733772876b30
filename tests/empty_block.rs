//! spec.md §8 end-to-end scenario 1: `{}$`.

use alanpp_compiler::Driver;

#[test]
fn empty_block_compiles_to_prelude_and_brk() {
    let outputs = Driver::new().compile("{}$");
    assert_eq!(outputs.len(), 1);
    let out = &outputs[0];

    assert!(!out.lexer_log.has_errors());
    assert!(out
        .lexer_log
        .iter()
        .any(|d| d.message.contains("Lex completed with 0 errors")));

    let cst = out.cst.as_ref().expect("parse produced a CST");
    assert_eq!(cst.name, "Program");
    assert_eq!(cst.children[0].name, "Block");

    let ast = out.ast.as_ref().expect("semantic analysis produced an AST");
    let dump = ast.pretty_print();
    assert!(dump.contains("< PROGRAM >"));
    assert!(dump.contains("< BLOCK >"));

    assert!(out.symbol_table.rows_sorted().is_empty());

    assert_eq!(out.code.len(), 256);
    assert_eq!(&out.code[0..4], &[0xA9, 0x00, 0xEA, 0x00]);
    assert!(out.code[4..0xDF].iter().all(|&b| b == 0));
    assert!(out.code[0xDF..].iter().all(|&b| b == 0));
}
