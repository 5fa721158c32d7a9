//! `gateflat batch`: flatten many netlists in parallel.
//!
//! Every input gets its own worker, source database and diagnostic sink.
//! Files succeed or fail independently; the exit code is 1 if any failed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gateflat_config::FlattenConfig;
use rayon::prelude::*;

use crate::pipeline::{
    flatten_file, locate_config, report, resolve_flatten_config, write_output, FileRun,
};
use crate::{BatchArgs, GlobalArgs, ReportFormat};

/// Runs the `gateflat batch` command.
pub fn run(args: &BatchArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config_path = locate_config(global)?;
    let config = resolve_flatten_config(config_path.as_deref(), &args.overrides)?;

    let out_dir = PathBuf::from(&args.out_dir);
    let targets = output_paths(&args.inputs, &out_dir)?;
    std::fs::create_dir_all(&out_dir)?;

    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!(
            "   Flattening {} file(s) (module `{}`)",
            targets.len(),
            config.module
        );
    }

    let results: Vec<Result<FileRun, String>> = targets
        .par_iter()
        .map(|(input, output)| process(input, output, &config))
        .collect();

    let mut runs = Vec::with_capacity(results.len());
    let mut io_failures = 0usize;
    for result in results {
        match result {
            Ok(run) => runs.push(run),
            Err(message) => {
                eprintln!("error: {message}");
                io_failures += 1;
            }
        }
    }
    report(&runs, args.format, global);

    let failed = io_failures + runs.iter().filter(|r| r.failed()).count();
    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!(
            "   Result: {} flattened, {} failed",
            targets.len() - failed,
            failed
        );
    }
    Ok(if failed > 0 { 1 } else { 0 })
}

/// One worker: read, flatten and, on success, write.
fn process(input: &Path, output: &Path, config: &FlattenConfig) -> Result<FileRun, String> {
    let run = flatten_file(input, config).map_err(|e| {
        log::error!("skipping {}: failed to read: {e}", input.display());
        format!("cannot read {}: {e}", input.display())
    })?;
    if let Some(ref flat) = run.output {
        write_output(output, &flat.text)
            .map_err(|e| format!("cannot write {}: {e}", output.display()))?;
        log::info!("{}: {}", input.display(), flat.stats);
    }
    Ok(run)
}

/// Pairs every input with `<out_dir>/<file name>`. Two inputs sharing a
/// file name would overwrite each other and are rejected up front.
fn output_paths(
    inputs: &[String],
    out_dir: &Path,
) -> Result<Vec<(PathBuf, PathBuf)>, Box<dyn std::error::Error>> {
    let mut seen: BTreeMap<PathBuf, &str> = BTreeMap::new();
    let mut targets = Vec::with_capacity(inputs.len());
    for input in inputs {
        let input_path = PathBuf::from(input);
        let name = input_path
            .file_name()
            .ok_or_else(|| format!("{input} does not name a file"))?;
        let output = out_dir.join(name);
        if let Some(previous) = seen.insert(output.clone(), input) {
            return Err(format!(
                "{previous} and {input} would both be written to {}",
                output.display()
            )
            .into());
        }
        targets.push((input_path, output));
    }
    Ok(targets)
}
