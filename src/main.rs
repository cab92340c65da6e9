//! pymddoc: generate Markdown API documentation from Python docstrings.
//!
//! - **generate**: `pymddoc generate -i pkg -o docs [files...]`
//! - **inherit**: `pymddoc inherit pkg -o docs`, merging ancestor members into subclasses
//! - **render**: `pymddoc render pkg/thing.py` (or stdin) to stdout
//! - **vars**: `pymddoc vars pkg/constants.py`, a table of documented module variables

mod config;
mod error;
mod generate;
mod inherit;
mod model;
mod naming;
mod parser;
mod render;
mod sections;
mod sort;
mod text;
mod toc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{CategoryConfig, Settings};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "pymddoc",
    version,
    about = "Generate Markdown API documentation from Python docstrings"
)]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug details
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one document per Python file
    Generate(GenerateArgs),
    /// Generate documents with ancestor members merged into each class
    Inherit(InheritArgs),
    /// Render a single file (or stdin) to stdout
    Render(RenderArgs),
    /// Print or write the documented module variables of a file
    Vars(VarsArgs),
}

/// Options shared by every subcommand that renders classes.
#[derive(Args)]
struct CommonArgs {
    /// Category metadata JSON file
    #[arg(short = 'm', long)]
    metadata: Option<PathBuf>,

    /// Replace the module path of every import example, e.g. "from pkg"
    #[arg(long)]
    import_prefix: Option<String>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Package directory holding the Python files
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Output directory (created if missing)
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Output format: markdown (default) or json
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    #[command(flatten)]
    common: CommonArgs,

    /// Files relative to the input directory (glob patterns supported).
    /// If omitted, every .py file except __init__.py is documented.
    files: Vec<String>,
}

#[derive(Args)]
struct InheritArgs {
    /// Package directory holding the Python files
    input: PathBuf,

    /// Output directory (created if missing)
    #[arg(short = 'o', long)]
    output: PathBuf,

    #[command(flatten)]
    common: CommonArgs,

    /// Name override as EXPECTED=ACTUAL, for classes or file stems that
    /// do not follow the snake_case/CamelCase convention
    #[arg(long = "override", value_name = "EXPECTED=ACTUAL")]
    overrides: Vec<String>,

    /// Skip this file name. Can be specified multiple times.
    #[arg(long)]
    exclude: Vec<String>,

    /// Only document these file names. Can be specified multiple times.
    #[arg(long)]
    include: Vec<String>,
}

#[derive(Args)]
struct RenderArgs {
    /// Python file to render. If omitted, reads from stdin.
    file: Option<PathBuf>,

    /// Output format: markdown (default) or json
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct VarsArgs {
    /// Python file to scan
    file: PathBuf,

    /// Write the table here instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        Command::Generate(args) => generate_mode(&args),
        Command::Inherit(args) => inherit_mode(&args),
        Command::Render(args) => render_mode(&args),
        Command::Vars(args) => vars_mode(&args),
    }
}

fn init_logging(quiet: bool, verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// Build settings for a package directory plus the shared CLI options.
fn load_settings(package_dir: Option<&Path>, common: &CommonArgs) -> Result<Settings> {
    let mut settings = match package_dir {
        Some(dir) => Settings::for_package(dir)
            .with_context(|| format!("failed to read package {}", dir.display()))?,
        None => Settings::default(),
    };
    if let Some(ref path) = common.metadata {
        settings.categories = CategoryConfig::load(path)
            .with_context(|| format!("failed to load metadata {}", path.display()))?;
    }
    settings.import_prefix = common.import_prefix.clone();
    Ok(settings)
}

/// generate: document selected files of a package directory.
fn generate_mode(args: &GenerateArgs) -> Result<()> {
    let settings = load_settings(Some(&args.input), &args.common)?;
    let renderer = render::create_renderer(&args.format)?;

    let files = if args.files.is_empty() {
        generate::python_files(&args.input, &[], &[])?
    } else {
        expand_globs(&args.input, &args.files)?
    };
    if files.is_empty() {
        log::warn!("no Python files found in {}", args.input.display());
    }

    generate::generate(&files, &args.output, renderer.as_ref(), &settings)
        .context("documentation generation failed")?;
    Ok(())
}

/// inherit: document a package directory with class inheritance.
fn inherit_mode(args: &InheritArgs) -> Result<()> {
    let settings = load_settings(Some(&args.input), &args.common)?;
    let opts = generate::InheritOptions {
        input_dir: args.input.clone(),
        output_dir: args.output.clone(),
        overrides: naming::Overrides::parse(&args.overrides)?,
        excludes: args.exclude.clone(),
        includes: args.include.clone(),
    };
    generate::inherit_directory(&opts, &settings)
        .context("inheritance generation failed")?;
    Ok(())
}

/// render: one file or stdin to stdout.
fn render_mode(args: &RenderArgs) -> Result<()> {
    let renderer = render::create_renderer(&args.format)?;
    let (module, settings) = match args.file {
        Some(ref path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let package = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let settings = load_settings(Some(package), &args.common)?;
            (parser::parse_file(path, &content, &settings)?, settings)
        }
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            let settings = load_settings(None, &args.common)?;
            (parser::python::parse("module", &input, &settings), settings)
        }
    };
    print!("{}", renderer.render(&module, &settings)?);
    Ok(())
}

/// vars: module variable table.
fn vars_mode(args: &VarsArgs) -> Result<()> {
    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let table = parser::variables::table(&content);
    if table.is_empty() {
        log::warn!("no documented variables in {}", args.file.display());
    }
    match args.output {
        Some(ref out) => fs::write(out, &table)
            .with_context(|| format!("failed to write {}", out.display()))?,
        None => print!("{}", table),
    }
    Ok(())
}

/// Characters that make a file argument a glob pattern.
const GLOB_CHARS: &[char] = &['*', '?', '['];

/// Resolve file arguments against the input directory.
///
/// Plain names are kept even when missing so generation can report them;
/// glob patterns that match nothing only produce a warning.
fn expand_globs(input_dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let joined = input_dir.join(path);
        if !pattern.contains(GLOB_CHARS) {
            files.push(joined);
            continue;
        }
        let joined = joined.to_string_lossy().to_string();
        let matches: Vec<_> = glob::glob(&joined)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            log::warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}
