//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use jobfeed_core::pipeline::{ListingSource, ProgressReporter, RunOptions, RunReport};
use jobfeed_core::query::build_query;
use jobfeed_search::{BoardFetcher, JobSearchClient};
use jobfeed_shared::{AppConfig, Credentials, OutputMode, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// jobfeed: keep a README table of open job listings up to date.
#[derive(Parser)]
#[command(
    name = "jobfeed",
    version,
    about = "Fetch job listings, filter them by title, and render them into a Markdown table.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./jobfeed.toml, then ~/.jobfeed/jobfeed.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Where `update` gets its listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum Source {
    /// The keyed search API (needs the API key variable).
    #[default]
    Jsearch,
    /// Public JSON job boards, no key required.
    Boards,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch listings and rewrite the output file.
    Update(UpdateArgs),

    /// Print the search query that `update` would send.
    Query,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `update`. Each one overrides the matching config value.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct UpdateArgs {
    /// Listing source.
    #[arg(long, value_enum, default_value_t = Source::Jsearch)]
    pub source: Source,

    /// Template file.
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Output file.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Rewrite only the JOBS-START/JOBS-END region of the output file.
    #[arg(long)]
    pub inject: bool,

    /// Keep every fetched listing, skipping the title filter.
    #[arg(long)]
    pub no_filter: bool,

    /// Print the document instead of writing it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default ./jobfeed.toml in the current directory.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "jobfeed=info",
        1 => "jobfeed=debug",
        _ => "jobfeed=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
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
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Update(args) => cmd_update(cli.config, args).await,
        Command::Query => cmd_query(cli.config),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(Path::new(".")),
            ConfigAction::Show => cmd_config_show(cli.config),
        },
    }
}

/// Fold `update` flags into the loaded config.
fn apply_overrides(config: &mut AppConfig, args: &UpdateArgs) {
    if let Some(template) = &args.template {
        config.output.template_path = template.clone();
    }
    if let Some(output) = &args.output {
        config.output.output_path = output.clone();
    }
    if args.inject {
        config.output.mode = OutputMode::Inject;
    }
    if args.no_filter {
        config.filter.enabled = false;
    }
}

/// Build the listing source. Credentials are checked here, before any network
/// call or file write, so a missing key fails the run with nothing written.
fn build_source(config: &AppConfig, source: Source) -> Result<ListingSource> {
    Ok(match source {
        Source::Jsearch => {
            let credentials = Credentials::from_env(&config.search.api_key_env)?;
            ListingSource::Search(JobSearchClient::new(config.search.clone(), credentials)?)
        }
        Source::Boards => ListingSource::Boards(BoardFetcher::new(config.boards.clone())?),
    })
}

async fn cmd_update(config_path: Option<PathBuf>, args: UpdateArgs) -> Result<()> {
    let mut config = load_config(config_path.as_deref())?;
    apply_overrides(&mut config, &args);

    let source = build_source(&config, args.source)?;
    let opts = RunOptions {
        dry_run: args.dry_run,
    };

    info!(
        source = source.name(),
        output = %config.output.output_path.display(),
        dry_run = opts.dry_run,
        "updating job listings"
    );

    let reporter = CliProgress::new();
    let result = jobfeed_core::pipeline::run(&config, &source, &opts, Utc::now(), &reporter).await;
    reporter.spinner.finish_and_clear();
    let report = result?;

    if opts.dry_run {
        if let Some(document) = &report.document {
            println!("{document}");
        }
        return Ok(());
    }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!();
    match &report.written_to {
        Some(path) => {
            println!("  Job listings updated!");
            println!("  Output:   {}", path.display());
        }
        None => println!("  Nothing written (no JOBS-START/JOBS-END region found)."),
    }
    println!("  Source:   {}", report.source);
    println!("  Fetched:  {}", report.fetched);
    println!("  Kept:     {}", report.kept);
    println!("  Rendered: {}", report.rendered);
    for err in &report.upstream_errors {
        println!("  Warning:  {err}");
    }
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());
    println!();
}

fn cmd_query(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    println!("{}", build_query(&config.query));
    Ok(())
}

fn cmd_config_init(dir: &Path) -> Result<()> {
    let path = init_config(dir)?;
    println!("Config file created at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn listings_fetched(&self, source: &str, count: usize) {
        self.spinner
            .set_message(format!("Fetched {count} listings from {source}"));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}
