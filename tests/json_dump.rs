//! Exercises the `serde::Serialize` derives on the wire-visible types
//! (spec.md §6 "four text sinks" — `SPEC_FULL.md` §3 adds JSON as an
//! alternative rendering for an embedding host UI). No part of the library
//! itself constructs JSON; this is the host-side usage the derives exist
//! for, so it lives in `dev-dependencies`/tests rather than runtime code.

use alanpp_compiler::Driver;

#[test]
fn diagnostic_log_round_trips_through_json() {
    let outputs = Driver::new().compile("{ int a }$");
    let out = &outputs[0];

    let json = serde_json::to_string(&out.semantic_log).expect("DiagnosticLog serializes");
    assert!(json.contains("WARNING") || json.contains("\"Warning\""));

    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert!(value.is_array());
}

#[test]
fn symbol_table_and_cst_serialize_too() {
    let outputs = Driver::new().compile("{ int a  a = 1 }$");
    let out = &outputs[0];

    let table_json = serde_json::to_string(&out.symbol_table).expect("SymbolTable serializes");
    assert!(table_json.contains('a'));

    let cst_json = serde_json::to_string(out.cst.as_ref().unwrap()).expect("CstNode serializes");
    assert!(cst_json.contains("Program"));
}
