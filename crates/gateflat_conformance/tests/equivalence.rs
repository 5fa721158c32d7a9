//! The flattened module computes the same function as the gate netlist it
//! came from, checked exhaustively over every input pattern.

use std::collections::BTreeMap;

use gateflat_conformance::{
    all_patterns, build_netlist, flatten_module, reference_eval, FlatModule, GateSpec,
};

const CELLS: [&str; 7] = ["IV", "INV", "AND", "OR", "XOR", "XNOR", "NOR"];

/// Compares every driven output bit of `gates` against the flattened text.
fn assert_equivalent(gates: &[GateSpec], width: u32) {
    let src = build_netlist("top", width, gates);
    let run = flatten_module(&src, "top", width);
    let flat = FlatModule::parse(run.text());

    let driven: Vec<u32> = (0..width)
        .filter(|k| gates.iter().any(|g| g.output == format!("out_array[{k}]")))
        .collect();
    assert!(!driven.is_empty());

    for pattern in all_patterns(width) {
        let mut netlist_env = BTreeMap::new();
        let mut flat_env = BTreeMap::new();
        for (i, bit) in pattern.iter().enumerate() {
            netlist_env.insert(format!("in_array[{i}]"), *bit);
            flat_env.insert(format!("in_array_{i}"), *bit);
        }
        let expected = reference_eval(gates, &netlist_env);
        let actual = flat.eval(&flat_env);
        for k in &driven {
            assert_eq!(
                actual[&format!("out_array_{k}")],
                expected[&format!("out_array[{k}]")],
                "out_array[{k}] differs for inputs {pattern:?}\n{src}"
            );
        }
    }
}

#[test]
fn two_bit_adder() {
    let gates = vec![
        GateSpec::new("XOR", &["in_array[0]", "in_array[2]"], "out_array[0]"),
        GateSpec::new("AND", &["in_array[0]", "in_array[2]"], "_00_"),
        GateSpec::new("XOR", &["in_array[1]", "in_array[3]"], "_01_"),
        GateSpec::new("XOR", &["_01_", "_00_"], "out_array[1]"),
        GateSpec::new("AND", &["in_array[1]", "in_array[3]"], "_02_"),
        GateSpec::new("AND", &["_01_", "_00_"], "_03_"),
        GateSpec::new("OR", &["_02_", "_03_"], "out_array[2]"),
    ];
    assert_equivalent(&gates, 4);

    let src = build_netlist("top", 4, &gates);
    let flat = FlatModule::parse(flatten_module(&src, "top", 4).text());
    for pattern in all_patterns(4) {
        let env: BTreeMap<String, bool> = pattern
            .iter()
            .enumerate()
            .map(|(i, b)| (format!("in_array_{i}"), *b))
            .collect();
        let out = flat.eval(&env);
        let bit = |b: bool, w: u32| u32::from(b) << w;
        let a = bit(pattern[0], 0) | bit(pattern[1], 1);
        let b = bit(pattern[2], 0) | bit(pattern[3], 1);
        let sum = bit(out["out_array_0"], 0) | bit(out["out_array_1"], 1) | bit(out["out_array_2"], 2);
        assert_eq!(sum, a + b);
    }
}

#[test]
fn equality_comparator_with_negated_cells() {
    let gates = vec![
        GateSpec::new("XNOR", &["in_array[0]", "in_array[2]"], "_e0_"),
        GateSpec::new("XNOR", &["in_array[1]", "in_array[3]"], "_e1_"),
        GateSpec::new("AND", &["_e0_", "_e1_"], "out_array[0]"),
        GateSpec::new("NOR", &["_e0_", "_e1_"], "out_array[1]"),
        GateSpec::new("INV", &["_e1_"], "out_array[2]"),
    ];
    assert_equivalent(&gates, 4);
}

#[test]
fn negated_cell_driving_a_port() {
    let gates = vec![
        GateSpec::new("XNOR", &["in_array[0]", "in_array[1]"], "out_array[0]"),
        GateSpec::new("NOR", &["in_array[0]", "in_array[1]"], "out_array[1]"),
    ];
    assert_equivalent(&gates, 2);
}

/// xorshift32; keeps the generated circuits stable across runs.
struct Rng(u32);

impl Rng {
    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next() as usize % items.len()]
    }
}

/// `internal` gates over the input bus, then one gate per output bit.
fn random_circuit(rng: &mut Rng, width: u32, internal: usize) -> Vec<GateSpec> {
    let mut pool: Vec<String> = (0..width).map(|i| format!("in_array[{i}]")).collect();
    let mut gates = Vec::new();
    for g in 0..internal + width as usize {
        let cell = *rng.pick(&CELLS);
        let arity = if matches!(cell, "IV" | "INV") { 1 } else { 2 };
        let inputs: Vec<String> = (0..arity).map(|_| rng.pick(&pool).clone()).collect();
        let output = if g < internal {
            format!("_{g:02}_")
        } else {
            format!("out_array[{}]", g - internal)
        };
        gates.push(GateSpec {
            cell,
            inputs,
            output: output.clone(),
        });
        if g < internal {
            pool.push(output);
        }
    }
    gates
}

#[test]
fn generated_circuits() {
    let mut rng = Rng(0x9e37_79b9);
    for _ in 0..40 {
        let gates = random_circuit(&mut rng, 4, 12);
        assert_equivalent(&gates, 4);
    }
}

#[test]
fn generated_deep_chains() {
    let mut rng = Rng(0x1234_5678);
    for _ in 0..10 {
        let gates = random_circuit(&mut rng, 3, 60);
        assert_equivalent(&gates, 3);
    }
}
