//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use qamerge_core::pipeline::{MergeReport, ProgressReporter};
use qamerge_core::summary::MergeSummary;
use qamerge_shared::{AppConfig, MergeConfig, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// qamerge: merge curated Q&A rows into the chatbot knowledge base.
#[derive(Parser)]
#[command(
    name = "qamerge",
    version,
    about = "Merge manually curated Q&A rows into the chatbot knowledge-base collection.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./qamerge.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Tabular input with manual Q&A rows.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Existing collection to merge into.
    #[arg(long)]
    pub collection: Option<PathBuf>,

    /// Where to write the merged collection.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Report what would change without writing the output.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Optional subcommands. Without one, the merge runs.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Write a blank tabular template at the input path.
    Template {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write qamerge.toml with defaults in the working directory.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "qamerge=info",
        1 => "qamerge=debug",
        _ => "qamerge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let cwd =
        std::env::current_dir().map_err(|e| eyre!("cannot determine working directory: {e}"))?;
    let config = resolve_config(&cli, &cwd)?;

    match cli.command {
        None => {
            let merge = merge_config(&cli, &config)?;
            cmd_merge(&merge, cli.json)
        }
        Some(Command::Template { force }) => {
            let merge = merge_config(&cli, &config)?;
            cmd_template(&merge, force)
        }
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(&cwd),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

/// Load the config file named by `--config`, or `./qamerge.toml` if present.
fn resolve_config(cli: &Cli, cwd: &Path) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                return Err(eyre!("config file '{}' not found", path.display()));
            }
            load_config_from(path)?
        }
        None => load_config(cwd)?,
    };
    Ok(config)
}

/// Apply CLI overrides on top of the file config.
fn merge_config(cli: &Cli, config: &AppConfig) -> Result<MergeConfig> {
    let mut merge = MergeConfig::try_from(config)?;
    if let Some(input) = &cli.input {
        merge.input = input.clone();
    }
    if let Some(collection) = &cli.collection {
        merge.collection = collection.clone();
    }
    if let Some(output) = &cli.output {
        merge.output = output.clone();
    }
    merge.dry_run = cli.dry_run;
    Ok(merge)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_merge(config: &MergeConfig, json: bool) -> Result<()> {
    info!(
        input = %config.input.display(),
        collection = %config.collection.display(),
        output = %config.output.display(),
        dry_run = config.dry_run,
        "merging Q&A data"
    );

    let reporter = CliProgress::new();
    let report = qamerge_core::pipeline::run_merge(config, &reporter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &MergeReport) {
    let s: &MergeSummary = &report.summary;

    println!();
    if s.dry_run {
        println!("  Dry run: nothing written.");
    } else {
        println!("  Q&A data merged successfully!");
    }
    println!("  Before:     {}", s.before);
    println!("  After:      {}", s.after);
    println!("  Rows read:  {}", s.manual_rows);
    println!("  Replaced:   {}", s.replaced);
    println!("  Added:      {}", s.added);
    if s.superseded > 0 {
        println!("  Superseded: {} (repeated questions in the input)", s.superseded);
    }
    if s.base_duplicates_collapsed > 0 {
        println!(
            "  Collapsed:  {} (duplicate questions in the existing collection)",
            s.base_duplicates_collapsed
        );
    }
    if !report.base_found {
        println!("  (no existing collection found, started from empty)");
    }
    println!("  Time:       {:.1}s", report.elapsed.as_secs_f64());

    print_breakdown("By category", &s.by_category);
    print_breakdown("By priority", &s.by_priority);
    print_breakdown("By source", &s.by_source);

    println!();
    if let Some(hash) = &s.output_sha256 {
        println!("  Output: {}", s.output_path.display());
        println!("  SHA256: {hash}");
        println!();
        println!("  Next: rebuild the knowledge base from {}", s.output_path.display());
        println!();
    }
}

fn print_breakdown(title: &str, counts: &std::collections::BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    println!();
    println!("  {title}:");
    for (label, count) in counts {
        println!("    {label}: {count}");
    }
}

fn cmd_template(config: &MergeConfig, force: bool) -> Result<()> {
    qamerge_core::template::write_template(&config.input, config.delimiter, force)?;
    println!("Template written to: {}", config.input.display());
    println!("Fill in one row per question, then run qamerge.");
    Ok(())
}

fn cmd_config_init(cwd: &Path) -> Result<()> {
    let path = init_config(cwd)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
        self.spinner.tick();
    }

    fn done(&self, _report: &MergeReport) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // Clear the line on error paths too.
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
