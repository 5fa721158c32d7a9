//! `gateflat clean`: flatten one netlist.
//!
//! 1. Resolve the flattening parameters (`gateflat.toml` plus overrides)
//! 2. Read the whole input
//! 3. Flatten it
//! 4. Render diagnostics
//! 5. On success, write the module to `--output` or stdout

use std::path::Path;

use crate::pipeline::{flatten_file, locate_config, report, resolve_flatten_config, write_output};
use crate::{CleanArgs, GlobalArgs, ReportFormat};

/// Runs the `gateflat clean` command.
///
/// Returns exit code 0 when the module was written, 1 when flattening
/// failed. Nothing is written on failure.
pub fn run(args: &CleanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    if args.format == ReportFormat::Json && args.output.is_none() {
        return Err("--format json needs --output; stdout carries the report".into());
    }

    let config_path = locate_config(global)?;
    let config = resolve_flatten_config(config_path.as_deref(), &args.overrides)?;

    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!("   Flattening {} (module `{}`)", args.input, config.module);
    }

    let run = flatten_file(Path::new(&args.input), &config)
        .map_err(|e| format!("cannot read {}: {e}", args.input))?;
    report(std::slice::from_ref(&run), args.format, global);

    let Some(ref output) = run.output else {
        return Ok(1);
    };
    match args.output {
        Some(ref path) => {
            write_output(Path::new(path), &output.text)
                .map_err(|e| format!("cannot write {path}: {e}"))?;
            if !global.quiet && args.format == ReportFormat::Text {
                eprintln!("     Wrote {path}: {}", output.stats);
            }
        }
        None => {
            print!("{}", output.text);
            if !global.quiet {
                eprintln!("   Result: {}", output.stats);
            }
        }
    }
    Ok(0)
}
