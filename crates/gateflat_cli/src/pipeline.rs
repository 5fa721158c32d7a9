//! Shared pipeline helpers for CLI commands.
//!
//! Configuration lookup, logging setup, the per-file flatten step and
//! diagnostic rendering used by both `clean` and `batch`.

use std::path::{Path, PathBuf};

use gateflat_config::{ConfigOverrides, FlattenConfig, ProjectFile};
use gateflat_diagnostics::{Diagnostic, DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use gateflat_netlist::{FlattenError, FlattenOutput};
use gateflat_source::SourceDb;

use crate::{ConfigArgs, GlobalArgs, ReportFormat};

/// Installs the `env_logger` backend. `RUST_LOG` takes precedence over the
/// level implied by `--verbose`/`--quiet`.
pub fn init_logging(global: &GlobalArgs) {
    let level = if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

/// Finds the configuration file for this run.
///
/// `--config` must name an existing file; otherwise `./gateflat.toml` is used
/// when present.
pub fn locate_config(global: &GlobalArgs) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if !p.is_file() {
            return Err(format!("config file {} does not exist", p.display()).into());
        }
        return Ok(Some(p));
    }
    Ok(gateflat_config::find_config(&std::env::current_dir()?))
}

/// Builds the flattening parameters from the config file and CLI overrides.
pub fn resolve_flatten_config(
    config_path: Option<&Path>,
    args: &ConfigArgs,
) -> Result<FlattenConfig, Box<dyn std::error::Error>> {
    let file: Option<ProjectFile> = match config_path {
        Some(path) => {
            log::debug!("loading {}", path.display());
            Some(gateflat_config::load_config(path)?)
        }
        None => None,
    };
    let overrides = ConfigOverrides {
        module: args.module.clone(),
        input_bus: args.input_bus.clone(),
        output_bus: args.output_bus.clone(),
        width: args.width,
    };
    Ok(gateflat_config::resolve_config(file.as_ref(), &overrides)?)
}

/// Result of flattening one file, with everything needed to report it.
pub struct FileRun {
    /// The input path.
    pub path: PathBuf,
    /// Database holding the input, for rendering diagnostic snippets.
    pub source_db: SourceDb,
    /// Sink notes and warnings, followed by the fatal error if there was one.
    pub diagnostics: Vec<Diagnostic>,
    /// The flattened module, if the pass succeeded.
    pub output: Option<FlattenOutput>,
}

impl FileRun {
    /// Whether flattening failed.
    pub fn failed(&self) -> bool {
        self.output.is_none()
    }
}

/// Reads `path` and flattens it. Only I/O failures are returned as `Err`;
/// flattening failures are recorded in the [`FileRun`].
pub fn flatten_file(path: &Path, config: &FlattenConfig) -> std::io::Result<FileRun> {
    let mut source_db = SourceDb::new();
    let file_id = source_db.load_file(path)?;
    let sink = DiagnosticSink::new();

    let result = gateflat_netlist::flatten(source_db.get_file(file_id), config, &sink);
    let mut diagnostics = sink.take_all();
    let output = match result {
        Ok(output) => Some(output),
        Err(err) => {
            log::debug!("{}: {err}", path.display());
            diagnostics.push(failure_diagnostic(&err));
            None
        }
    };

    Ok(FileRun {
        path: path.to_path_buf(),
        source_db,
        diagnostics,
        output,
    })
}

fn failure_diagnostic(err: &FlattenError) -> Diagnostic {
    err.to_diagnostic()
        .with_help("no output was written; fix the netlist and rerun")
}

/// Renders one file's diagnostics as text on stderr.
pub fn render_text(run: &FileRun, global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color);
    for diag in &run.diagnostics {
        if global.quiet && !diag.severity.is_error() {
            continue;
        }
        eprintln!("{}", renderer.render(diag, &run.source_db));
    }
}

/// Renders the diagnostics of `runs` in the requested format.
pub fn report(runs: &[FileRun], format: ReportFormat, global: &GlobalArgs) {
    match format {
        ReportFormat::Text => {
            for run in runs {
                render_text(run, global);
            }
        }
        ReportFormat::Json => {
            let files: Vec<serde_json::Value> = runs
                .iter()
                .map(|run| {
                    serde_json::json!({
                        "file": run.path.display().to_string(),
                        "ok": !run.failed(),
                        "stats": run.output.as_ref().map(|o| &o.stats),
                        "diagnostics": run.diagnostics,
                    })
                })
                .collect();
            let json = serde_json::to_string_pretty(&files).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Writes `text` to `path` through a sibling temporary file so that an
/// existing file is replaced in one step.
pub fn write_output(path: &Path, text: &str) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, text)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const NETLIST: &str = "\
module top(in_array, out_array);
  input [1:0] in_array;
  output [1:0] out_array;
  XOR g0 (.A(in_array[0]), .B(in_array[1]), .Z(out_array[0]));
endmodule
";

    fn global(config: Option<String>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config,
        }
    }

    fn overrides(module: &str, width: u32) -> ConfigArgs {
        ConfigArgs {
            module: Some(module.to_string()),
            width: Some(width),
            ..ConfigArgs::default()
        }
    }

    #[test]
    fn explicit_config_must_exist() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("gateflat.toml");
        let g = global(Some(missing.display().to_string()));
        assert!(locate_config(&g).is_err());
    }

    #[test]
    fn explicit_config_is_used() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gateflat.toml");
        fs::write(&path, "[module]\nname = \"top\"\n").unwrap();
        let g = global(Some(path.display().to_string()));
        assert_eq!(locate_config(&g).unwrap(), Some(path));
    }

    #[test]
    fn overrides_beat_file_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gateflat.toml");
        fs::write(
            &path,
            "[module]\nname = \"from_file\"\n\n[bus]\nwidth = 4\ninput = \"a\"\n",
        )
        .unwrap();
        let config = resolve_flatten_config(Some(&path), &overrides("top", 2)).unwrap();
        assert_eq!(config.module, "top");
        assert_eq!(config.width, 2);
        assert_eq!(config.input_bus, "a");
        assert_eq!(config.output_bus, "out_array");
    }

    #[test]
    fn module_is_required_without_file() {
        assert!(resolve_flatten_config(None, &ConfigArgs::default()).is_err());
    }

    #[test]
    fn flatten_file_success() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("top.v");
        fs::write(&input, NETLIST).unwrap();
        let config = FlattenConfig::new("top", "in_array", "out_array", 2).unwrap();
        let run = flatten_file(&input, &config).unwrap();
        assert!(!run.failed());
        assert!(run.diagnostics.is_empty());
        let text = &run.output.unwrap().text;
        assert!(text.contains("assign out_array_0 = in_array_0 ^ in_array_1;"));
    }

    #[test]
    fn flatten_file_failure_is_recorded() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("top.v");
        fs::write(&input, "module top(in_array, out_array);\n").unwrap();
        let config = FlattenConfig::new("top", "in_array", "out_array", 2).unwrap();
        let run = flatten_file(&input, &config).unwrap();
        assert!(run.failed());
        let last = run.diagnostics.last().unwrap();
        assert_eq!(last.code, gateflat_netlist::UNEXPECTED_EOF);
    }

    #[test]
    fn flatten_file_missing_input() {
        let config = FlattenConfig::with_defaults("top").unwrap();
        assert!(flatten_file(Path::new("/nonexistent/top.v"), &config).is_err());
    }

    #[test]
    fn write_output_replaces_existing_file() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("flat.v");
        fs::write(&out, "stale").unwrap();
        write_output(&out, "module top();\nendmodule\n").unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "module top();\nendmodule\n");
        assert!(!tmp.path().join("flat.v.tmp").exists());
    }
}
