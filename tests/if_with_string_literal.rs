//! spec.md §8 end-to-end scenario 6: `{ if (1 == 1) { print("hi") } }$`.

use alanpp_compiler::Driver;

#[test]
fn if_condition_emits_branch_test_and_interned_string() {
    let outputs = Driver::new().compile("{ if (1 == 1) { print(\"hi\") } }$");
    let out = &outputs[0];

    assert!(!out.semantic_log.has_errors());

    assert_eq!(out.string_pool, vec![("hi".to_string(), 0x00E0)]);
    assert_eq!(&out.code[0x00E0..0x00E3], &[b'h', b'i', 0]);

    const CPX_IMM: u8 = 0xE0;
    const BNE: u8 = 0xD0;
    assert!(out.code.windows(2).any(|w| w == [CPX_IMM, BNE]) || {
        // Either the two opcodes are adjacent or separated by the CPX
        // immediate operand byte; check both shapes rather than pin one.
        out.code.windows(3).any(|w| w[0] == CPX_IMM && w[2] == BNE)
    });

    // print("hi"): LDY #0xE0; LDX #2; SYS
    let expected = [0xA0u8, 0xE0, 0xA2, 0x02, 0xFF];
    assert!(
        out.code.windows(expected.len()).any(|w| w == expected),
        "expected print fragment not found in {:02X?}",
        out.code
    );
}
