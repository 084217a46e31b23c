//! CLI command definitions, routing, and tracing setup.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use sheetlist::batch::{run_batch, scan};
use sheetlist::config::{Config, CONFIG_FILE_NAME};
use sheetlist::io::csv_writer::CsvWriter;
use sheetlist::io::files::list_drawing_files;
use sheetlist::plot::{CommandPlotter, Plotter};
use sheetlist::titleblock::TitleBlockRules;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// sheetlist: plot drawing layouts and build a drawing list from title blocks.
#[derive(Parser)]
#[command(
    name = "sheetlist",
    version,
    about = "Batch plot CAD layouts to PDF and build a drawing list from their title blocks.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./sheetlist.toml when present).
    #[arg(short, long, global = true, env = "SHEETLIST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Process a folder: stage, read title blocks, plot, merge and write the CSV.
    Run {
        /// Folder containing the drawings.
        input: PathBuf,

        /// Output folder (defaults to the input folder).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Project name used for output file names.
        #[arg(short, long)]
        project: Option<String>,

        /// Search subfolders for drawings.
        #[arg(short, long)]
        recursive: bool,

        /// Accepted title block name (repeatable, replaces the configured list).
        #[arg(long = "block-name", value_name = "NAME")]
        block_names: Vec<String>,

        /// Plot command (overrides `[plot] command`).
        #[arg(long, value_name = "PROGRAM")]
        plot_command: Option<String>,

        /// Skip plotting and merging, only write the drawing list.
        #[arg(long)]
        no_plot: bool,

        /// Read drawings in place instead of copying them first.
        #[arg(long)]
        no_stage: bool,
    },

    /// Read title blocks only and print the drawing list CSV to stdout.
    Scan {
        /// Drawing files or folders.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Omit the `DWG File` and `Layout` columns.
        #[arg(long)]
        no_source_columns: bool,
    },

    /// Write the default configuration as TOML.
    InitConfig {
        /// Target file (defaults to ./sheetlist.toml).
        path: Option<PathBuf>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialise the tracing subscriber. Logs go to stderr so `scan` output
/// stays clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "sheetlist=info",
        1 => "sheetlist=debug",
        _ => "sheetlist=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Run {
            input,
            output,
            project,
            recursive,
            block_names,
            plot_command,
            no_plot,
            no_stage,
        } => {
            let mut config = load_config(config_path)?;
            if project.is_some() {
                config.output.project_name = project;
            }
            if recursive {
                config.output.recursive = true;
            }
            if !block_names.is_empty() {
                config.matching.block_names = block_names;
            }
            if plot_command.is_some() {
                config.plot.command = plot_command;
            }
            if no_stage {
                config.output.stage_drawings = false;
            }
            let output = output.unwrap_or_else(|| input.clone());
            cmd_run(&config, &input, &output, no_plot)
        }
        Command::Scan {
            files,
            no_source_columns,
        } => {
            let config = load_config(config_path)?;
            cmd_scan(&config, &files, !no_source_columns)
        }
        Command::InitConfig { path, force } => {
            cmd_init_config(path.as_deref().unwrap_or(Path::new(CONFIG_FILE_NAME)), force)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load_or_default(path).context("failed to load configuration")
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_run(config: &Config, input: &Path, output: &Path, no_plot: bool) -> Result<()> {
    let mut plotter = if no_plot {
        None
    } else {
        let plotter = CommandPlotter::from_config(&config.plot);
        if plotter.is_none() {
            warn!("no plot command configured, only the drawing list is written");
        }
        plotter
    };

    let report = run_batch(
        config,
        input,
        output,
        plotter.as_mut().map(|p| p as &mut dyn Plotter),
    )
    .with_context(|| format!("batch failed for {}", input.display()))?;

    info!(
        project = %report.project_name,
        drawings = report.drawings.len(),
        sheets = report.list.rows.len(),
        pdfs = report.pdfs.len(),
        "run complete"
    );

    println!("Drawing list: {}", report.csv_path.display());
    if let Some(combined) = &report.combined_pdf {
        println!("Combined PDF: {}", combined.display());
    }
    println!(
        "{} drawing(s), {} sheet(s) listed, {} PDF(s) plotted",
        report.drawings.len(),
        report.list.rows.len(),
        report.pdfs.len()
    );
    println!("{}", report.list.notifications.summary());
    Ok(())
}

fn cmd_scan(config: &Config, inputs: &[PathBuf], source_columns: bool) -> Result<()> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(
                list_drawing_files(input, config.output.recursive, &config.output.extensions)
                    .with_context(|| format!("cannot list {}", input.display()))?,
            );
        } else {
            files.push(input.clone());
        }
    }

    let rules = TitleBlockRules::from_config(config).context("invalid matching rules")?;
    let list = scan(&files, &rules);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    CsvWriter::new()
        .with_bom(false)
        .with_source_columns(source_columns)
        .write_to(&list, &mut handle)
        .context("failed to write CSV")?;
    handle.flush()?;

    eprintln!("{}", list.notifications.summary());
    Ok(())
}

fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default()
        .save(path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
