//! herzog: CLI tool to convert between herzog Python scripts and Jupyter notebooks

mod config;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};

use config::{CONFIG_FILE_NAME, Config, LineEndingSetting};
use herzog_core::{ConvertOptions, Format, convert};

#[derive(Parser, Debug)]
#[command(name = "herzog")]
#[command(about = "Convert between herzog Python scripts and Jupyter notebooks")]
#[command(version)]
#[command(after_help = "Examples:
  herzog convert analysis.py -o analysis.ipynb   # Script to notebook
  herzog convert analysis.ipynb                  # Notebook to script on stdout
  cat analysis.py | herzog convert - --to ipynb  # Read from stdin
  herzog convert notebooks/ -o scripts/ --to py  # Convert a directory
  herzog init                                    # Write a sample _herzog.toml")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a script to a notebook or a notebook to a script
    Convert(ConvertArgs),
    /// Write a sample configuration file
    Init(InitArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input .py or .ipynb file, directory, or "-" for stdin
    input: PathBuf,

    /// Output file or directory (defaults to stdout for a single file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target format (required for directories and stdin)
    #[arg(short, long, value_enum)]
    to: Option<TargetFormat>,

    /// Process directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Number of parallel jobs (defaults to number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Module name of the cell blocks
    #[arg(long)]
    namespace: Option<String>,

    /// Indentation width of cell bodies in generated scripts
    #[arg(long)]
    indent: Option<usize>,

    /// Do not emit `import <namespace>` in generated scripts
    #[arg(long)]
    no_import: bool,

    /// JSON file replacing the bundled notebook boilerplate
    #[arg(long)]
    template: Option<PathBuf>,

    /// Line terminator inside notebook cell sources
    #[arg(long, value_enum)]
    line_ending: Option<LineEndingSetting>,

    /// Configuration file (defaults to _herzog.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Path of the configuration file to write
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    output: PathBuf,

    /// Print the JSON schema of the configuration file instead
    #[arg(long)]
    schema: bool,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TargetFormat {
    /// herzog Python script
    Py,
    /// Jupyter notebook
    Ipynb,
}

impl From<TargetFormat> for Format {
    fn from(format: TargetFormat) -> Self {
        match format {
            TargetFormat::Py => Format::Script,
            TargetFormat::Ipynb => Format::Notebook,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Command::Convert(args) => run_convert(args, cli.quiet),
        Command::Init(args) => run_init(args, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber
///
/// `--verbose` and `--quiet` take precedence over `RUST_LOG`.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else if quiet {
        tracing_subscriber::EnvFilter::new("error")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run_convert(args: &ConvertArgs, quiet: bool) -> Result<()> {
    let (config, config_dir) = load_config(args.config.as_deref())?;
    let options = convert_options(args, &config, &config_dir)?;
    let to = args.to.map(Format::from);

    if args.input.as_os_str() == "-" {
        convert_stdin(args.output.as_deref(), to, &options, quiet)
    } else if args.input.is_file() {
        convert_file(&args.input, args.output.as_deref(), to, &options, quiet)
    } else if args.input.is_dir() {
        let Some(to) = to else {
            bail!("--to is required when converting a directory");
        };
        convert_directory(
            &args.input,
            args.output.as_deref(),
            to,
            args.recursive,
            args.jobs,
            &options,
            quiet,
        )
    } else {
        bail!("Input path does not exist: {}", args.input.display());
    }
}

/// Load the explicit config file, or `_herzog.toml` from the current directory
fn load_config(path: Option<&Path>) -> Result<(Config, PathBuf)> {
    match path {
        Some(path) => {
            let config = Config::load(path)?;
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            Ok((config, dir))
        }
        None => {
            let dir = std::env::current_dir().context("Failed to get current directory")?;
            let config = Config::load_from_dir(&dir)?.unwrap_or_default();
            Ok((config, dir))
        }
    }
}

/// Merge command line flags over config file values
fn convert_options(args: &ConvertArgs, config: &Config, config_dir: &Path) -> Result<ConvertOptions> {
    let namespace = args
        .namespace
        .clone()
        .or_else(|| config.script.namespace.clone())
        .unwrap_or_else(|| "herzog".to_string());
    if !is_identifier(&namespace) {
        bail!("Invalid namespace \"{namespace}\": expected a Python identifier");
    }

    let mut options = ConvertOptions::default().with_namespace(namespace);

    if let Some(indent) = args.indent.or(config.script.indent) {
        if indent == 0 {
            bail!("Indentation width must be at least 1");
        }
        options.writer.indent = indent;
    }
    options.writer.import = !args.no_import && config.script.import.unwrap_or(true);

    if let Some(line_ending) = args.line_ending.or(config.notebook.line_ending) {
        options.notebook.line_ending = line_ending.into();
    }

    let template = args
        .template
        .clone()
        .or_else(|| config.notebook.template.as_ref().map(|p| config_dir.join(p)));
    if let Some(path) = template {
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template: {}", path.display()))?;
        let boilerplate = herzog_nbformat::template::from_json(&json)
            .with_context(|| format!("Invalid template: {}", path.display()))?;
        options.notebook.template = Some(boilerplate);
    }

    Ok(options)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Work out the input format from the input path, output path and `--to`
fn source_format(input: Option<&Path>, output: Option<&Path>, to: Option<Format>) -> Result<Format> {
    let output_format = match output {
        Some(path) => Some(Format::from_path(path).with_context(|| {
            format!(
                "Unsupported output file extension: {} (expected .py or .ipynb)",
                path.display()
            )
        })?),
        None => None,
    };
    if let (Some(target), Some(out)) = (to, output_format) {
        if target != out {
            bail!(
                "--to {} conflicts with output file extension .{}",
                target.extension(),
                out.extension()
            );
        }
    }
    let target = to.or(output_format);

    let from = match input {
        Some(path) => Format::from_path(path).with_context(|| {
            format!(
                "Unsupported input file extension: {} (expected .py or .ipynb)",
                path.display()
            )
        })?,
        None => match target {
            Some(target) => target.target(),
            None => bail!("--to is required when reading from stdin"),
        },
    };

    if let Some(target) = target {
        if target == from {
            bail!(
                "Cannot convert .{} to .{}: input and output must differ in type",
                from.extension(),
                target.extension()
            );
        }
    }

    Ok(from)
}

/// Convert a single file, to `output` or stdout
fn convert_file(
    input: &Path,
    output: Option<&Path>,
    to: Option<Format>,
    options: &ConvertOptions,
    quiet: bool,
) -> Result<()> {
    let from = source_format(Some(input), output, to)?;

    match output {
        Some(output) => {
            tracing::info!("Converting: {} -> {}", input.display(), output.display());
            convert_file_inner(input, output, from, options)?;
            if !quiet {
                println!("{}", output.display());
            }
        }
        None => {
            let content = fs::read_to_string(input)
                .with_context(|| format!("Failed to read: {}", input.display()))?;
            let converted = convert(&content, from, options)
                .with_context(|| format!("Failed to convert: {}", input.display()))?;
            write_stdout(&converted)?;
        }
    }

    Ok(())
}

/// Convert stdin, to `output` or stdout
fn convert_stdin(
    output: Option<&Path>,
    to: Option<Format>,
    options: &ConvertOptions,
    quiet: bool,
) -> Result<()> {
    let from = source_format(None, output, to)?;

    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read stdin")?;
    let converted = convert(&content, from, options).context("Failed to convert stdin")?;

    match output {
        Some(output) => {
            write_file(output, &converted)?;
            if !quiet {
                println!("{}", output.display());
            }
        }
        None => write_stdout(&converted)?,
    }

    Ok(())
}

/// Convert every file of the opposite format in a directory
fn convert_directory(
    input: &Path,
    output: Option<&Path>,
    to: Format,
    recursive: bool,
    jobs: Option<usize>,
    options: &ConvertOptions,
    quiet: bool,
) -> Result<()> {
    let output_dir = output.unwrap_or(input);
    let from = to.target();

    let files = collect_files(input, from, recursive)?;

    if files.is_empty() {
        if !quiet {
            eprintln!("No .{} files found in {}", from.extension(), input.display());
        }
        return Ok(());
    }

    let total = files.len();
    tracing::info!("Found {} .{} files", total, from.extension());

    // Configure thread pool if jobs specified
    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    // Atomic counters for thread-safe progress tracking
    let success = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    // Parallel conversion
    let errors: Vec<_> = files
        .par_iter()
        .filter_map(|file| {
            let relative = file.strip_prefix(input).unwrap_or(file);
            let output_file = output_dir.join(relative).with_extension(to.extension());

            match convert_file_inner(file, &output_file, from, options) {
                Ok(()) => {
                    success.fetch_add(1, Ordering::Relaxed);
                    if !quiet {
                        println!("{}", output_file.display());
                    }
                    None
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    Some((file.clone(), e))
                }
            }
        })
        .collect();

    // Report errors
    for (file, e) in &errors {
        eprintln!("Error converting {}: {:#}", file.display(), e);
    }

    let success_count = success.load(Ordering::Relaxed);
    let failed_count = failed.load(Ordering::Relaxed);

    if !quiet {
        eprintln!("Converted {} files, {} failed", success_count, failed_count);
    }

    if failed_count > 0 {
        bail!("{} files failed to convert", failed_count);
    }

    Ok(())
}

/// Inner conversion function that doesn't print (for parallel use)
///
/// Nothing is written unless the whole document converts.
fn convert_file_inner(
    input: &Path,
    output: &Path,
    from: Format,
    options: &ConvertOptions,
) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read: {}", input.display()))?;

    let converted = convert(&content, from, options)
        .with_context(|| format!("Failed to convert: {}", input.display()))?;

    write_file(output, &converted)
}

fn write_file(output: &Path, content: &str) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(output, content).with_context(|| format!("Failed to write: {}", output.display()))
}

fn write_stdout(content: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(content.as_bytes())
        .and_then(|()| stdout.flush())
        .context("Failed to write to stdout")
}

/// Collect all files of `format` in a directory
fn collect_files(dir: &Path, format: Format, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if Format::from_path(&path) == Some(format) {
                files.push(path);
            }
        } else if path.is_dir() && recursive {
            files.extend(collect_files(&path, format, recursive)?);
        }
    }

    files.sort();
    Ok(files)
}

fn run_init(args: &InitArgs, quiet: bool) -> Result<()> {
    if args.schema {
        let schema = Config::json_schema_string()?;
        return write_stdout(&format!("{schema}\n"));
    }

    if args.output.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        );
    }

    let content = Config::sample().to_toml_with_schema()?;
    write_file(&args.output, &content)?;

    if !quiet {
        println!("{}", args.output.display());
    }

    Ok(())
}
