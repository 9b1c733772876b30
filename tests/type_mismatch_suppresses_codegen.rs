//! spec.md §8 end-to-end scenario 4:
//! `{ int a  boolean b  b = true  a = b }$`.

use alanpp_compiler::Driver;

#[test]
fn type_mismatch_is_an_error_with_no_symbol_table_or_code() {
    let outputs = Driver::new().compile("{ int a  boolean b  b = true  a = b }$");
    let out = &outputs[0];

    assert!(out.semantic_log.has_errors());
    assert!(out
        .semantic_log
        .iter()
        .any(|d| d.message.contains("Cannot assign boolean to int")));

    assert!(out.symbol_table.rows_sorted().is_empty());

    // No code generation ran; the fallback image is an all-zero (BRK) page.
    assert_eq!(out.code.len(), 256);
    assert!(out.code.iter().all(|&b| b == 0));
    assert!(out.codegen_log.iter().next().is_none());
}
