//! End-to-end runs from files on disk: `gateflat.toml` discovery, config
//! resolution and source loading.

use std::fs;

use gateflat_config::{find_config, load_config, resolve_config, ConfigError, ConfigOverrides};
use gateflat_diagnostics::DiagnosticSink;
use gateflat_source::SourceDb;
use tempfile::TempDir;

const NETLIST: &str = "\
module adder(a, s);
  input [1:0] a;
  output [1:0] s;
  XOR g0 (.A(a[0]), .B(a[1]), .Z(s[0]));
  AND g1 (.A(a[0]), .B(a[1]), .Z(s[1]));
endmodule
";

#[test]
fn project_file_drives_the_run() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("gateflat.toml"),
        "[module]\nname = \"adder\"\n\n[bus]\ninput = \"a\"\noutput = \"s\"\nwidth = 2\n",
    )
    .unwrap();
    let netlist = tmp.path().join("adder.v");
    fs::write(&netlist, NETLIST).unwrap();

    let config_path = find_config(tmp.path()).unwrap();
    let file = load_config(&config_path).unwrap();
    let config = resolve_config(Some(&file), &ConfigOverrides::default()).unwrap();

    let mut db = SourceDb::new();
    let id = db.load_file(&netlist).unwrap();
    let sink = DiagnosticSink::new();
    let output = gateflat_netlist::flatten(db.get_file(id), &config, &sink).unwrap();

    assert_eq!(
        output.text,
        "\
module adder(a_0, a_1, s_0, s_1);
input a_0, a_1;
output s_0, s_1;
assign s_0 = a_0 ^ a_1;
assign s_1 = a_0 & a_1;
endmodule
"
    );
    assert!(!sink.has_errors());
}

#[test]
fn overrides_replace_project_values() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("gateflat.toml");
    fs::write(&path, "[module]\nname = \"adder\"\n\n[bus]\nwidth = 8\n").unwrap();
    let file = load_config(&path).unwrap();
    let overrides = ConfigOverrides {
        input_bus: Some("a".to_string()),
        output_bus: Some("s".to_string()),
        width: Some(2),
        ..ConfigOverrides::default()
    };
    let config = resolve_config(Some(&file), &overrides).unwrap();
    assert_eq!(config.width, 2);

    let mut db = SourceDb::new();
    let id = db.add_source("adder.v", NETLIST.to_string());
    let output =
        gateflat_netlist::flatten(db.get_file(id), &config, &DiagnosticSink::new()).unwrap();
    assert_eq!(output.stats.gates(), 2);
}

#[test]
fn invalid_project_file_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("gateflat.toml");
    fs::write(&path, "[module]\nname = \"adder\"\n\n[bus]\ninput = \"x\"\noutput = \"x\"\n").unwrap();
    let file = load_config(&path).unwrap();
    assert!(matches!(
        resolve_config(Some(&file), &ConfigOverrides::default()),
        Err(ConfigError::ValidationError(_))
    ));

    fs::write(&path, "[module]\nname = \"adder\"\ncolour = \"red\"\n").unwrap();
    assert!(matches!(load_config(&path), Err(ConfigError::ParseError(_))));
}

#[test]
fn no_project_file_found() {
    let tmp = TempDir::new().unwrap();
    assert!(find_config(tmp.path()).is_none());
    assert!(matches!(
        resolve_config(None, &ConfigOverrides::default()),
        Err(ConfigError::MissingField(_))
    ));
}
