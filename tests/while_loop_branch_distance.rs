//! spec.md §9 flags the source's fixed-distance branch bug; this pins that
//! the reimplementation computes branch offsets from the actual emitted
//! body length instead of a hardcoded constant.

use alanpp_compiler::Driver;

/// Decode a signed 6502-style relative branch operand.
fn branch_target(code: &[u8], bne_opcode_offset: usize) -> i64 {
    let operand = code[bne_opcode_offset + 1] as i8;
    let next_instr = bne_opcode_offset as i64 + 2;
    next_instr + operand as i64
}

#[test]
fn while_loop_backward_branch_lands_exactly_on_loop_start() {
    let outputs = Driver::new().compile("{ int a  a = 0  while (a == 1) { a = 1 } }$");
    let out = &outputs[0];
    assert!(!out.semantic_log.has_errors());

    const BNE: u8 = 0xD0;
    let bne_offsets: Vec<usize> = out
        .code
        .iter()
        .enumerate()
        .filter(|(_, &b)| b == BNE)
        .map(|(i, _)| i)
        .collect();
    // The `==` comparison itself emits one internal branch to pick its
    // result; the loop then emits a forward branch (skip the body when
    // false) and a backward branch (return to the condition test).
    assert_eq!(bne_offsets.len(), 3);

    let forward = bne_offsets[1];
    let backward = bne_offsets[2];

    // The forward branch must land just past the backward branch (the
    // first instruction after the loop), not at some fixed distance.
    let forward_target = branch_target(&out.code, forward);
    assert_eq!(forward_target, backward as i64 + 2);

    // The backward branch must land exactly on the loop's first emitted
    // instruction: `a == 1`'s left operand `a` is loaded via `LDX abs`
    // (0xAE) as the very first byte of the condition re-test.
    let backward_target = branch_target(&out.code, backward);
    assert!(backward_target >= 0 && (backward_target as usize) < forward);
    const LDX_ABS: u8 = 0xAE;
    assert_eq!(out.code[backward_target as usize], LDX_ABS);
}
