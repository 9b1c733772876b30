//! spec.md §8 end-to-end scenario 5: `{ int a { int a } }$`.

use alanpp_compiler::Driver;

#[test]
fn inner_declaration_shadows_without_redeclaration_error() {
    let outputs = Driver::new().compile("{ int a { int a } }$");
    let out = &outputs[0];

    assert!(!out.semantic_log.has_errors());

    let rows = out.symbol_table.rows_sorted();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].scope, 1);
    assert_eq!(rows[1].scope, 2);
    assert!(rows.iter().all(|r| r.name == 'a'));

    let unused_warnings = out
        .semantic_log
        .iter()
        .filter(|d| d.message == "Variable 'a' declared but never used")
        .count();
    assert_eq!(unused_warnings, 2);
}
