//! spec.md §8 end-to-end scenario 2: `{ int a }$`.

use alanpp_compiler::Driver;

#[test]
fn unused_declaration_warns_but_still_generates_code() {
    let outputs = Driver::new().compile("{ int a }$");
    let out = &outputs[0];

    assert!(!out.semantic_log.has_errors());
    assert!(out
        .semantic_log
        .iter()
        .any(|d| d.message == "Variable 'a' declared but never used"));

    let rows = out.symbol_table.rows_sorted();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, 'a');
    assert!(!rows[0].is_initialized);
    assert!(!rows[0].is_used);
    assert_eq!(rows[0].scope, 1);
    assert_eq!(rows[0].line, 1);

    // Warnings don't block code generation.
    assert_eq!(out.static_table.len(), 1);
    assert_eq!(out.static_table[0].0, 'a');
    assert_eq!(out.static_table[0].1, 0x003C);
}
