//! spec.md §8 end-to-end scenario 3: `{ int a  a = 3  print(a) }$`.

use alanpp_compiler::Driver;

#[test]
fn declare_assign_print_round_trips_through_the_symbol_table() {
    let outputs = Driver::new().compile("{ int a  a = 3  print(a) }$");
    let out = &outputs[0];

    assert!(!out.semantic_log.has_errors());

    let rows = out.symbol_table.rows_sorted();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, 'a');
    assert!(rows[0].is_initialized);
    assert!(rows[0].is_used);
    assert_eq!(rows[0].scope, 1);

    assert_eq!(out.static_table, vec![('a', 0x003C)]);

    // LDA #3; STA a; LDY a; LDX #1; SYS
    let expected: [u8; 11] = [0xA9, 0x03, 0x8D, 0x3C, 0x00, 0xAC, 0x3C, 0x00, 0xA2, 0x01, 0xFF];
    assert!(
        out.code.windows(expected.len()).any(|w| w == expected),
        "expected fragment not found in {:02X?}",
        out.code
    );
}
