//! Netlists in the shape the synthesizer actually writes them: attribute
//! lines, scalar wire declarations ahead of the ports, bus-typed port wires,
//! sequential cells outside the library and escaped identifiers.

use std::collections::BTreeMap;

use gateflat_conformance::{all_patterns, flatten_module, FlatModule};
use gateflat_diagnostics::Severity;
use gateflat_netlist::UNSUPPORTED_CELL;

/// A 2-element compare-and-swap stage over 2-bit keys: `out[1:0]` gets the
/// smaller key, `out[3:2]` the larger.
const COMPARE_SWAP: &str = r#"/* Generated by Yosys 0.9 (git sha1 UNKNOWN, gcc 9.3.0 -fPIC -Os) */

(* top =  1  *)
(* src = "sort.v:1.1-20.10" *)
module bitonic_sort_inc(in_array, out_array);
  wire _00_;
  wire _01_;
  wire _02_;
  wire _03_;
  wire _04_;
  wire _05_;
  wire _06_;
  wire _07_;
  wire _08_;
  wire _09_;
  (* src = "sort.v:3.22-3.30" *)
  input [3:0] in_array;
  wire [3:0] in_array;
  (* src = "sort.v:4.22-4.31" *)
  output [3:0] out_array;
  wire [3:0] out_array;
  // a_hi < b_hi
  IV _10_ (
    .A(in_array[1]),
    .Z(_00_)
  );
  AND _11_ (
    .A(_00_),
    .B(in_array[3]),
    .Z(_01_)
  );
  // a_hi == b_hi
  XNOR _12_ (
    .A(in_array[1]),
    .B(in_array[3]),
    .Z(_02_)
  );
  IV _13_ (
    .A(in_array[0]),
    .Z(_03_)
  );
  AND _14_ (
    .A(_03_),
    .B(in_array[2]),
    .Z(_04_)
  );
  AND _15_ (
    .A(_02_),
    .B(_04_),
    .Z(_05_)
  );
  // swap = ~(a < b) & (a != b), i.e. a > b
  OR _16_ (
    .A(_01_),
    .B(_05_),
    .Z(_06_)
  );
  XOR _17_ (
    .A(in_array[0]),
    .B(in_array[2]),
    .Z(_07_)
  );
  XOR _18_ (
    .A(in_array[1]),
    .B(in_array[3]),
    .Z(_08_)
  );
  OR _19_ (
    .A(_07_),
    .B(_08_),
    .Z(_09_)
  );
  NOR \swap_n (
    .A(_06_),
    .B(\neq_n )
  ,
    .Z(\swap )
  );
  IV \neq_inv (
    .A(_09_),
    .Z(\neq_n )
  );
  (* src = "sort.v:12.3-14.6" *)
  DFF_P \state_reg (
    .C(clk),
    .D(\swap ),
    .Q(state)
  );
  // mux per bit: lo = swap ? b : a, hi = swap ? a : b
  AND _20_ (.A(\swap ), .B(in_array[2]), .Z(_21_));
  IV _22_ (.A(\swap ), .Z(_23_));
  AND _24_ (.A(_23_), .B(in_array[0]), .Z(_25_));
  OR _26_ (.A(_21_), .B(_25_), .Z(out_array[0]));
  AND _27_ (.A(\swap ), .B(in_array[3]), .Z(_28_));
  AND _29_ (.A(_23_), .B(in_array[1]), .Z(_30_));
  OR _31_ (.A(_28_), .B(_30_), .Z(out_array[1]));
  AND _32_ (.A(\swap ), .B(in_array[0]), .Z(_33_));
  AND _34_ (.A(_23_), .B(in_array[2]), .Z(_35_));
  OR _36_ (.A(_33_), .B(_35_), .Z(out_array[2]));
  AND _37_ (.A(\swap ), .B(in_array[1]), .Z(_38_));
  AND _39_ (.A(_23_), .B(in_array[3]), .Z(_40_));
  OR _41_ (.A(_38_), .B(_40_), .Z(out_array[3]));
endmodule
"#;

#[test]
fn compare_swap_flattens_cleanly() {
    let run = flatten_module(COMPARE_SWAP, "bitonic_sort_inc", 4);
    let text = run.text();
    assert!(text.starts_with(
        "module bitonic_sort_inc(in_array_0, in_array_1, in_array_2, in_array_3, \
         out_array_0, out_array_1, out_array_2, out_array_3);\n"
    ));
    assert_eq!(text.matches("\nwire ").count(), 1);
    assert!(!text.contains('['));
    assert!(!text.contains("state"));
    assert!(!text.contains("clk"));

    assert_eq!(run.diagnostics.len(), 1);
    assert_eq!(run.diagnostics[0].code, UNSUPPORTED_CELL);
    assert_eq!(run.count(Severity::Warning), 0);

    let stats = &run.result.as_ref().unwrap().stats;
    assert_eq!(stats.skipped_cells.get("DFF_P"), Some(&1));
    assert_eq!(stats.translated.get("XNOR"), Some(&1));
    assert_eq!(stats.translated.get("NOR"), Some(&1));
    assert_eq!(stats.auxiliary_wires, 2);
}

#[test]
fn compare_swap_escaped_names_survive() {
    let run = flatten_module(COMPARE_SWAP, "bitonic_sort_inc", 4);
    let flat = FlatModule::parse(run.text());
    assert!(flat.wires.contains(&"\\swap".to_string()));
    assert!(flat.wires.contains(&"\\swap_neg".to_string()));
    assert!(run.text().contains("assign \\swap  = ~\\swap_neg ;\n"));
}

#[test]
fn compare_swap_sorts() {
    let run = flatten_module(COMPARE_SWAP, "bitonic_sort_inc", 4);
    let flat = FlatModule::parse(run.text());
    for pattern in all_patterns(4) {
        let mut env: BTreeMap<String, bool> = pattern
            .iter()
            .enumerate()
            .map(|(i, b)| (format!("in_array_{i}"), *b))
            .collect();
        // \neq_n is driven after its first read; a second pass settles it
        env.insert("\\neq_n".to_string(), false);
        let first = flat.eval(&env);
        env.insert("\\neq_n".to_string(), first["\\neq_n"]);
        let out = flat.eval(&env);

        let key = |lo: bool, hi: bool| u8::from(lo) | u8::from(hi) << 1;
        let a = key(pattern[0], pattern[1]);
        let b = key(pattern[2], pattern[3]);
        let lo = key(out["out_array_0"], out["out_array_1"]);
        let hi = key(out["out_array_2"], out["out_array_3"]);
        assert_eq!((lo, hi), (a.min(b), a.max(b)), "a={a} b={b}");
    }
}

#[test]
fn crlf_line_endings() {
    let crlf = COMPARE_SWAP.replace('\n', "\r\n");
    let unix = flatten_module(COMPARE_SWAP, "bitonic_sort_inc", 4);
    let dos = flatten_module(&crlf, "bitonic_sort_inc", 4);
    assert_eq!(unix.text(), dos.text());
}

#[test]
fn repeated_runs_are_byte_identical() {
    let first = flatten_module(COMPARE_SWAP, "bitonic_sort_inc", 4);
    for _ in 0..5 {
        let again = flatten_module(COMPARE_SWAP, "bitonic_sort_inc", 4);
        assert_eq!(first.text(), again.text());
    }
}
