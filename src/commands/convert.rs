//! `markwav convert`: CSV logs in, marker WAVs out.
//!
//! Several logs are converted in parallel. Each file's result is reported
//! on its own, and the command fails if any of them failed.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use humansize::{format_size, BINARY};
use rayon::prelude::*;

use markwav::bwf::Layout;
use markwav::cli::ConvertArgs;
use markwav::files::filename::{self, Options};
use markwav::hook::{run_hooks, CommandHook, ImportHook};
use markwav::markers::detect_time_column;
use markwav::{Config, Conversion, ConvertRequest, CsvTable, Timecode};

/// Output path argument meaning "write to stdout".
const STDOUT_PATH: &str = "-";

/// Where the converted files go.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    /// Next to each input, named by the filename template.
    NextToInput,
    /// Into a directory, named by the filename template.
    Dir(PathBuf),
    /// Exactly this file (single input only).
    File(PathBuf),
    Stdout,
}

impl Target {
    fn resolve(output: Option<&Path>, input_count: usize) -> Result<Self> {
        let Some(output) = output else {
            return Ok(Target::NextToInput);
        };
        if output == Path::new(STDOUT_PATH) {
            if input_count > 1 {
                bail!("Only one input can be written to stdout");
            }
            return Ok(Target::Stdout);
        }
        if input_count > 1 || output.is_dir() {
            return Ok(Target::Dir(output.to_path_buf()));
        }
        Ok(Target::File(output.to_path_buf()))
    }

    fn path_for(&self, input: &Path, config: &Config) -> Result<Option<PathBuf>> {
        let dir = match self {
            Target::Stdout => return Ok(None),
            Target::File(path) => return Ok(Some(path.clone())),
            Target::Dir(dir) => dir.clone(),
            Target::NextToInput => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let options = Options::new(config.output.stem_max_length);
        let name = filename::generate(&stem, &config.output.filename_template, &options)?;
        Ok(Some(dir.join(name)))
    }
}

/// A finished conversion.
struct Written {
    input: PathBuf,
    output: PathBuf,
    markers: usize,
    rows: usize,
    frame_rate: f64,
    session_start: Option<Timecode>,
    layout: Layout,
}

#[cfg(not(tarpaulin_include))]
pub fn handle(args: &ConvertArgs, config: &Config) -> Result<()> {
    let config = effective_config(args, config);
    let target = Target::resolve(args.output.as_deref(), args.inputs.len())?;

    if target == Target::Stdout {
        return convert_to_stdout(&args.inputs[0], args, &config);
    }
    if let Target::Dir(dir) = &target {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let results: Vec<(PathBuf, Result<Written>)> = args
        .inputs
        .par_iter()
        .map(|input| {
            let result = convert_to_file(input, &target, args, &config);
            (input.clone(), result)
        })
        .collect();

    let hooks = hooks(args, &config);
    let mut failed = 0;
    for (input, result) in &results {
        match result {
            Ok(written) => {
                report(written);
                let start = written.session_start.unwrap_or(Timecode::from_hours(0));
                run_hooks(&hooks, &written.output, &start);
            }
            Err(err) => {
                failed += 1;
                eprintln!("{}: {:#}", input.display(), err);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} conversions failed", failed, results.len());
    }
    Ok(())
}

/// Config with command-line overrides applied.
fn effective_config(args: &ConvertArgs, config: &Config) -> Config {
    let mut config = config.clone();
    if let Some(policy) = args.time_reference {
        config.encoder.time_reference = policy.into();
    }
    if args.max_duration.is_some() {
        config.encoder.max_duration_secs = args.max_duration;
    }
    if args.fps.is_some() {
        config.csv.frame_rate = args.fps;
    }
    config
}

fn hooks(args: &ConvertArgs, config: &Config) -> Vec<Box<dyn ImportHook>> {
    if args.no_hook {
        return Vec::new();
    }
    CommandHook::from_command(&config.hook.command)
        .map(|hook| Box::new(hook) as Box<dyn ImportHook>)
        .into_iter()
        .collect()
}

/// Build the request for one log, filling in detected columns.
fn request_for(csv_text: &str, args: &ConvertArgs, config: &Config) -> Result<ConvertRequest> {
    let table = CsvTable::parse(csv_text)?;
    let headers = table.headers();

    let time_column = match &args.time_column {
        Some(column) => column.clone(),
        None => detect_time_column(headers)
            .context("CSV has no columns")?
            .to_string(),
    };
    let label_columns = if args.labels.is_empty() {
        headers
            .iter()
            .filter(|h| **h != time_column)
            .cloned()
            .collect()
    } else {
        args.labels.clone()
    };
    tracing::debug!(%time_column, ?label_columns, "selected columns");

    let mut request = ConvertRequest::new(time_column, label_columns).allow_empty(args.allow_empty);
    request.frame_rate = config.csv.frame_rate;
    Ok(request)
}

fn convert(input: &Path, args: &ConvertArgs, config: &Config) -> Result<Conversion> {
    let text =
        fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let request = request_for(&text, args, config)?;
    let conversion = request.run(&text)?;
    tracing::info!(
        input = %input.display(),
        markers = conversion.markers.len(),
        frame_rate = conversion.frame_rate,
        "extracted markers"
    );
    Ok(conversion)
}

fn convert_to_file(
    input: &Path,
    target: &Target,
    args: &ConvertArgs,
    config: &Config,
) -> Result<Written> {
    let conversion = convert(input, args, config)?;
    let output = target
        .path_for(input, config)?
        .context("No output path for this target")?;
    let encoder = config.encoder(conversion.session_start);
    let layout = conversion
        .save(&encoder, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(Written {
        input: input.to_path_buf(),
        output,
        markers: conversion.markers.len(),
        rows: conversion.rows,
        frame_rate: conversion.frame_rate,
        session_start: conversion.session_start,
        layout,
    })
}

fn convert_to_stdout(input: &Path, args: &ConvertArgs, config: &Config) -> Result<()> {
    if atty::is(atty::Stream::Stdout) {
        bail!("Refusing to write WAV data to a terminal; redirect stdout or use -o <file>");
    }
    let conversion = convert(input, args, config)?;
    let encoder = config.encoder(conversion.session_start);

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let layout = conversion.write_to(&encoder, &mut writer)?;
    writer.flush()?;
    tracing::info!(bytes = layout.file_len(), "wrote marker file to stdout");
    Ok(())
}

fn report(written: &Written) {
    println!(
        "{} -> {} ({} of {} rows, {} fps, {})",
        written.input.display(),
        written.output.display(),
        written.markers,
        written.rows,
        written.frame_rate,
        format_size(written.layout.file_len(), BINARY)
    );
    if let Some(start) = written.session_start {
        if start.hours > 0 {
            println!("  Set the session start to {} before importing", start);
        }
    }
}
