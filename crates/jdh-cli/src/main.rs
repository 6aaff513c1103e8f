#![allow(
    clippy::needless_pass_by_value, // clap hands over owned values
    clippy::fn_params_excessive_bools, // CLI commands have several flags
)]

//! jdh - prepare Jupyter notebook articles for submission
//!
//! Scans notebooks for figure/table/cover cells, writes citation metadata
//! from a curated source description file, anonymizes author names and
//! exports charts to SVG or PNG.

mod config;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use config::{Config, CONFIG_FILE_NAME, DEFAULT_CONFIG_TEMPLATE};
use jdh_chart::{load_chart_spec, save_chart, ChartFormat, VlConvert};
use jdh_notebook::{
    add_metadata_to_notebook, anonymize_notebook, find_figure_cells, load_source_descriptions,
    AnnotationReport, Anonymizer, ScanOptions, SourceDescription,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Verbosity level for output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output (default)
    Normal,
    /// Verbose output with extra details
    Verbose,
}

impl Verbosity {
    /// Create from CLI flags
    const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if output should be shown (not quiet)
    const fn should_show_output(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Default `env_logger` filter; `RUST_LOG` still wins
    const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "jdh",
    version,
    about = "Prepare Jupyter notebook articles: tag figures, add citation metadata, anonymize authors, export charts",
    long_about = None
)]
struct Args {
    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Use this config file instead of ./.jdh.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find cells tagged as figures, tables or covers and write a source description stub list
    #[command(after_help = "An existing output file is reused as-is unless --force is given.")]
    Scan {
        /// Notebook to scan
        notebook: PathBuf,

        /// Source description file [default: figure_cells.json]
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Rescan and overwrite an existing output file
        #[arg(short, long)]
        force: bool,

        /// Tag substring to look for (repeatable) [default: figure, table, cover]
        #[arg(long = "keyword", value_name = "TEXT")]
        keywords: Vec<String>,
    },

    /// Add jdh citation metadata to tagged cells from a source description file
    Annotate {
        /// Notebook to annotate in place
        notebook: PathBuf,

        /// Source description JSON file
        descriptions: PathBuf,
    },

    /// Replace author names in markdown and code cells
    Anonymize {
        /// Notebook to anonymize in place
        notebook: PathBuf,

        /// Author surname (repeatable, in Author1, Author2, ... order)
        #[arg(long = "author", value_name = "NAME")]
        authors: Vec<String>,
    },

    /// Scan (or reuse the description file), annotate, and optionally anonymize
    Prepare {
        /// Notebook to prepare in place
        notebook: PathBuf,

        /// Source description file [default: figure_cells.json]
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Rescan and overwrite an existing description file
        #[arg(short, long)]
        force: bool,

        /// Anonymize author names afterwards
        #[arg(long)]
        anonymize: bool,
    },

    /// Export a Vega-Lite chart specification to SVG or PNG
    #[command(after_help = "The output format follows the file extension: .svg or .png.")]
    ExportChart {
        /// Vega-Lite JSON specification
        spec: PathBuf,

        /// Output image file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// PNG resolution multiplier (ignored for SVG)
        #[arg(long)]
        scale: Option<f64>,

        /// Converter executable [default: vl-convert]
        #[arg(long, value_name = "PROGRAM")]
        converter: Option<String>,
    },

    /// Manage .jdh.toml configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Create a .jdh.toml configuration file with commented defaults
    Init {
        /// Create in the home directory (~/.jdh.toml) instead of the current directory
        #[arg(long)]
        user: bool,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,
}

fn init_logging(verbosity: Verbosity) {
    let env = env_logger::Env::default().default_filter_or(verbosity.log_filter());
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}

fn main() {
    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    init_logging(verbosity);

    if let Err(e) = run(args, verbosity) {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

fn run(args: Args, verbosity: Verbosity) -> Result<()> {
    let config = Config::discover(args.config.as_deref())?;
    log::debug!("Loaded configuration: {config:?}");

    match args.command {
        Commands::Scan {
            notebook,
            output,
            force,
            keywords,
        } => {
            let output = output.unwrap_or_else(|| config.descriptions_path());
            let keywords = if keywords.is_empty() {
                config.scan_keywords()
            } else {
                keywords
            };
            let options = ScanOptions {
                keywords,
                force_rescan: force,
            };
            cmd_scan(&notebook, &output, &options, verbosity)?;
            Ok(())
        }
        Commands::Annotate {
            notebook,
            descriptions,
        } => cmd_annotate(&notebook, &descriptions, verbosity),
        Commands::Anonymize { notebook, authors } => {
            let authors = if authors.is_empty() {
                config.authors()
            } else {
                authors
            };
            cmd_anonymize(&notebook, &authors, verbosity)
        }
        Commands::Prepare {
            notebook,
            output,
            force,
            anonymize,
        } => {
            let output = output.unwrap_or_else(|| config.descriptions_path());
            let options = ScanOptions {
                keywords: config.scan_keywords(),
                force_rescan: force,
            };
            let records = cmd_scan(&notebook, &output, &options, verbosity)?;
            annotate_with(&notebook, &records, verbosity)?;
            if anonymize {
                cmd_anonymize(&notebook, &config.authors(), verbosity)?;
            }
            Ok(())
        }
        Commands::ExportChart {
            spec,
            output,
            scale,
            converter,
        } => {
            let program = converter.unwrap_or_else(|| config.chart_converter());
            let mut renderer = VlConvert::new(program);
            if let Some(version) = config.vl_version() {
                renderer = renderer.with_vl_version(version);
            }
            let scale = scale.unwrap_or_else(|| config.chart_scale());
            cmd_export_chart(&renderer, &spec, &output, scale, verbosity)
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { user, force } => config_init(user, force, verbosity),
            ConfigAction::Show => config_show(&config),
        },
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            generate(shell, &mut cmd, "jdh", &mut io::stdout());
            Ok(())
        }
    }
}

/// Scan a notebook (or reuse the description file) and list the records
fn cmd_scan(
    notebook: &Path,
    output: &Path,
    options: &ScanOptions,
    verbosity: Verbosity,
) -> Result<Vec<SourceDescription>> {
    let outcome = find_figure_cells(notebook, output, options)
        .with_context(|| format!("Failed to scan {}", notebook.display()))?;

    if verbosity.should_show_output() {
        if outcome.reused_cache {
            eprintln!(
                "{} Using existing {} ({} records, --force to rescan)",
                "Reused:".cyan().bold(),
                output.display(),
                outcome.records.len()
            );
        } else {
            eprintln!(
                "{} {} cells need a source, written to {}",
                "Scanned:".green().bold(),
                outcome.records.len(),
                output.display()
            );
        }
        for record in &outcome.records {
            let index = record
                .cell_index
                .map_or_else(|| "-".to_string(), |i| i.to_string());
            let status = if record.is_stub() {
                "needs source".yellow()
            } else {
                "ready".green()
            };
            println!("{index:>5}  {:<40}  {status}", record.tag);
        }
    }

    Ok(outcome.records)
}

fn cmd_annotate(notebook: &Path, descriptions: &Path, verbosity: Verbosity) -> Result<()> {
    let records = load_source_descriptions(descriptions)
        .with_context(|| format!("Failed to load source descriptions {}", descriptions.display()))?;
    annotate_with(notebook, &records, verbosity)
}

fn annotate_with(
    notebook: &Path,
    records: &[SourceDescription],
    verbosity: Verbosity,
) -> Result<()> {
    let report = add_metadata_to_notebook(notebook, records)
        .with_context(|| format!("Failed to annotate {}", notebook.display()))?;

    if verbosity.should_show_output() {
        print_report(notebook, &report);
    }
    Ok(())
}

fn print_report(notebook: &Path, report: &AnnotationReport) {
    eprintln!(
        "{} {}: {} of {} tagged cells annotated ({} cells, {} unmatched tags)",
        "Annotated:".green().bold(),
        notebook.display(),
        report.annotated_cells,
        report.tagged_cells,
        report.cells,
        report.unmatched_tags
    );
}

fn cmd_anonymize(notebook: &Path, authors: &[String], verbosity: Verbosity) -> Result<()> {
    let anonymizer = Anonymizer::for_authors(authors);
    let changed = anonymize_notebook(notebook, &anonymizer)
        .with_context(|| format!("Failed to anonymize {}", notebook.display()))?;

    if verbosity.should_show_output() {
        eprintln!(
            "{} {}: {changed} cells rewritten ({} authors)",
            "Anonymized:".green().bold(),
            notebook.display(),
            authors.len()
        );
    }
    Ok(())
}

fn cmd_export_chart(
    renderer: &VlConvert,
    spec_path: &Path,
    output: &Path,
    scale: f64,
    verbosity: Verbosity,
) -> Result<()> {
    // Reject the extension before reading the spec or starting the converter.
    let format = ChartFormat::from_path(output)?;
    log::debug!(
        "Exporting {} as {format} with {}",
        spec_path.display(),
        renderer.program().display()
    );
    let spec = load_chart_spec(spec_path)
        .with_context(|| format!("Failed to read chart specification {}", spec_path.display()))?;

    save_chart(renderer, &spec, output, scale)
        .with_context(|| format!("Failed to export chart to {}", output.display()))?;

    if verbosity.should_show_output() {
        let detail = if format.is_raster() {
            format!(" at scale {scale}")
        } else {
            String::new()
        };
        eprintln!(
            "{} {} ({format}{detail})",
            "Saved:".green().bold(),
            output.display()
        );
    }
    Ok(())
}

/// Create a new configuration file with commented defaults
fn config_init(user: bool, force: bool, verbosity: Verbosity) -> Result<()> {
    let config_path = if user {
        Config::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
    } else {
        PathBuf::from(CONFIG_FILE_NAME)
    };

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists: {} (use --force to overwrite)",
            config_path.display()
        );
    }

    fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    if verbosity.should_show_output() {
        eprintln!(
            "{} {}",
            "Created:".green().bold(),
            config_path.display()
        );
    }
    Ok(())
}

fn config_show(config: &Config) -> Result<()> {
    let toml = toml::to_string_pretty(&config.effective())?;
    print!("{toml}");
    Ok(())
}
